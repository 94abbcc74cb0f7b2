use axum::{extract::{Path, State}, http::StatusCode, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::extractors::auth::AdminSession;
use crate::api::extractors::json::AppJson;
use crate::api::dtos::{
    requests::{CreateTeacherRequest, UpdateTeacherRequest},
    responses::{DataResponse, MessageResponse},
};
use crate::api::handlers::conflict::non_blank;
use crate::domain::models::teacher::Teacher;
use crate::domain::services::validation::{is_valid_email, require_non_blank};
use crate::error::AppError;
use std::sync::Arc;
use chrono::Utc;
use sqlx::types::Json as JsonColumn;
use tracing::info;

async fn validate_teacher(state: &AppState, teacher: &Teacher) -> Result<(), AppError> {
    require_non_blank("name", &teacher.name)?;
    if let Some(email) = &teacher.email
        && !is_valid_email(email)
    {
        return Err(AppError::Validation(format!("Invalid email address: {}", email)));
    }
    if let Some(venue_id) = &teacher.venue_id
        && state.venue_repo.find_by_id(venue_id).await?.is_none()
    {
        return Err(AppError::Validation(format!("Venue {} does not exist", venue_id)));
    }
    Ok(())
}

pub async fn list_teachers(
    State(state): State<Arc<AppState>>,
    AdminSession(_session): AdminSession,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(DataResponse::new(state.teacher_repo.list().await?)))
}

pub async fn create_teacher(
    State(state): State<Arc<AppState>>,
    AdminSession(_session): AdminSession,
    AppJson(payload): AppJson<CreateTeacherRequest>,
) -> Result<impl IntoResponse, AppError> {
    let mut teacher = Teacher::new(payload.name.trim().to_string());
    teacher.email = non_blank(payload.email);
    teacher.phone = non_blank(payload.phone);
    teacher.bio = non_blank(payload.bio);
    teacher.specialties = JsonColumn(payload.specialties.unwrap_or_default());
    teacher.languages = JsonColumn(payload.languages.unwrap_or_default());
    teacher.venue_id = non_blank(payload.venue_id);
    teacher.is_active = payload.is_active.unwrap_or(true);
    teacher.featured = payload.featured.unwrap_or(false);
    teacher.display_order = payload.display_order.unwrap_or(0);

    validate_teacher(&state, &teacher).await?;
    let created = state.teacher_repo.create(&teacher).await?;
    info!(teacher_id = %created.id, "Created teacher {}", created.name);

    Ok((StatusCode::CREATED, Json(DataResponse::new(created))))
}

pub async fn get_teacher(
    State(state): State<Arc<AppState>>,
    AdminSession(_session): AdminSession,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let teacher = state.teacher_repo.find_by_id(&id).await?
        .ok_or(AppError::NotFound("Teacher not found".into()))?;
    Ok(Json(DataResponse::new(teacher)))
}

pub async fn update_teacher(
    State(state): State<Arc<AppState>>,
    AdminSession(_session): AdminSession,
    Path(id): Path<String>,
    AppJson(payload): AppJson<UpdateTeacherRequest>,
) -> Result<impl IntoResponse, AppError> {
    let mut teacher = state.teacher_repo.find_by_id(&id).await?
        .ok_or(AppError::NotFound("Teacher not found".into()))?;

    if let Some(name) = payload.name { teacher.name = name.trim().to_string(); }
    if payload.email.is_some() { teacher.email = non_blank(payload.email); }
    if payload.phone.is_some() { teacher.phone = non_blank(payload.phone); }
    if payload.bio.is_some() { teacher.bio = non_blank(payload.bio); }
    if let Some(specialties) = payload.specialties { teacher.specialties = JsonColumn(specialties); }
    if let Some(languages) = payload.languages { teacher.languages = JsonColumn(languages); }
    if payload.venue_id.is_some() { teacher.venue_id = non_blank(payload.venue_id); }
    if let Some(active) = payload.is_active { teacher.is_active = active; }
    if let Some(featured) = payload.featured { teacher.featured = featured; }
    if let Some(order) = payload.display_order { teacher.display_order = order; }
    teacher.updated_at = Utc::now();

    validate_teacher(&state, &teacher).await?;
    let updated = state.teacher_repo.update(&teacher).await?;
    info!(teacher_id = %id, "Updated teacher");

    Ok(Json(DataResponse::new(updated)))
}

pub async fn delete_teacher(
    State(state): State<Arc<AppState>>,
    AdminSession(_session): AdminSession,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    state.teacher_repo.delete(&id).await?;
    info!(teacher_id = %id, "Deleted teacher");
    Ok(Json(MessageResponse::new("Teacher deleted")))
}
