use axum::{extract::{Path, State}, http::StatusCode, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::extractors::auth::AdminSession;
use crate::api::extractors::json::AppJson;
use crate::api::dtos::{
    requests::{CreateServiceTypeRequest, UpdateServiceTypeRequest},
    responses::{DataResponse, MessageResponse},
};
use crate::api::handlers::conflict::non_blank;
use crate::domain::models::service_type::ServiceType;
use crate::domain::services::validation::require_non_blank;
use crate::error::AppError;
use std::sync::Arc;
use chrono::Utc;
use tracing::info;

fn validate_service_type(service_type: &ServiceType) -> Result<(), AppError> {
    require_non_blank("name", &service_type.name)?;
    if service_type.duration_min < 1 {
        return Err(AppError::Validation("durationMin must be at least 1".into()));
    }
    if !service_type.participant_bounds_valid() {
        return Err(AppError::Validation("minParticipants must be at least 1 and not above maxParticipants".into()));
    }
    Ok(())
}

pub async fn list_service_types(
    State(state): State<Arc<AppState>>,
    AdminSession(_session): AdminSession,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(DataResponse::new(state.service_type_repo.list().await?)))
}

pub async fn create_service_type(
    State(state): State<Arc<AppState>>,
    AdminSession(_session): AdminSession,
    AppJson(payload): AppJson<CreateServiceTypeRequest>,
) -> Result<impl IntoResponse, AppError> {
    let mut service_type = ServiceType::new(payload.name.trim().to_string(), payload.category, payload.duration_min);
    service_type.description = non_blank(payload.description);
    service_type.min_participants = payload.min_participants.unwrap_or(1);
    service_type.max_participants = payload.max_participants;
    service_type.is_active = payload.is_active.unwrap_or(true);

    validate_service_type(&service_type)?;
    let created = state.service_type_repo.create(&service_type).await?;
    info!(service_type_id = %created.id, category = created.category.as_str(), "Created service type {}", created.name);

    Ok((StatusCode::CREATED, Json(DataResponse::new(created))))
}

pub async fn get_service_type(
    State(state): State<Arc<AppState>>,
    AdminSession(_session): AdminSession,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let service_type = state.service_type_repo.find_by_id(&id).await?
        .ok_or(AppError::NotFound("Service type not found".into()))?;
    Ok(Json(DataResponse::new(service_type)))
}

pub async fn update_service_type(
    State(state): State<Arc<AppState>>,
    AdminSession(_session): AdminSession,
    Path(id): Path<String>,
    AppJson(payload): AppJson<UpdateServiceTypeRequest>,
) -> Result<impl IntoResponse, AppError> {
    let mut service_type = state.service_type_repo.find_by_id(&id).await?
        .ok_or(AppError::NotFound("Service type not found".into()))?;

    if let Some(name) = payload.name { service_type.name = name.trim().to_string(); }
    if payload.description.is_some() { service_type.description = non_blank(payload.description); }
    if let Some(category) = payload.category { service_type.category = category; }
    if let Some(duration) = payload.duration_min { service_type.duration_min = duration; }
    if let Some(min) = payload.min_participants { service_type.min_participants = min; }
    if payload.max_participants.is_some() { service_type.max_participants = payload.max_participants; }
    if let Some(active) = payload.is_active { service_type.is_active = active; }
    service_type.updated_at = Utc::now();

    validate_service_type(&service_type)?;
    let updated = state.service_type_repo.update(&service_type).await?;
    info!(service_type_id = %id, "Updated service type");

    Ok(Json(DataResponse::new(updated)))
}

pub async fn delete_service_type(
    State(state): State<Arc<AppState>>,
    AdminSession(_session): AdminSession,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    state.service_type_repo.delete(&id).await?;
    info!(service_type_id = %id, "Deleted service type");
    Ok(Json(MessageResponse::new("Service type deleted")))
}
