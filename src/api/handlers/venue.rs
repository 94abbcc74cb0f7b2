use axum::{extract::{Path, State}, http::StatusCode, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::extractors::auth::AdminSession;
use crate::api::extractors::json::AppJson;
use crate::api::dtos::{
    requests::{CreateVenueRequest, UpdateVenueRequest},
    responses::{DataResponse, MessageResponse},
};
use crate::api::handlers::conflict::non_blank;
use crate::domain::models::venue::Venue;
use crate::domain::services::validation::require_non_blank;
use crate::error::AppError;
use std::sync::Arc;
use chrono::Utc;
use sqlx::types::Json as JsonColumn;
use tracing::info;

fn validate_venue(venue: &Venue) -> Result<(), AppError> {
    require_non_blank("name", &venue.name)?;
    if venue.capacity < 1 {
        return Err(AppError::Validation("capacity must be at least 1".into()));
    }
    Ok(())
}

pub async fn list_venues(
    State(state): State<Arc<AppState>>,
    AdminSession(_session): AdminSession,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(DataResponse::new(state.venue_repo.list().await?)))
}

pub async fn create_venue(
    State(state): State<Arc<AppState>>,
    AdminSession(_session): AdminSession,
    AppJson(payload): AppJson<CreateVenueRequest>,
) -> Result<impl IntoResponse, AppError> {
    let mut venue = Venue::new(payload.name.trim().to_string(), payload.capacity);
    venue.description = non_blank(payload.description);
    venue.address = non_blank(payload.address);
    venue.city = non_blank(payload.city);
    venue.country = non_blank(payload.country);
    venue.amenities = JsonColumn(payload.amenities.unwrap_or_default());
    venue.is_active = payload.is_active.unwrap_or(true);

    validate_venue(&venue)?;
    let created = state.venue_repo.create(&venue).await?;
    info!(venue_id = %created.id, capacity = created.capacity, "Created venue {}", created.name);

    Ok((StatusCode::CREATED, Json(DataResponse::new(created))))
}

pub async fn get_venue(
    State(state): State<Arc<AppState>>,
    AdminSession(_session): AdminSession,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let venue = state.venue_repo.find_by_id(&id).await?
        .ok_or(AppError::NotFound("Venue not found".into()))?;
    Ok(Json(DataResponse::new(venue)))
}

pub async fn update_venue(
    State(state): State<Arc<AppState>>,
    AdminSession(_session): AdminSession,
    Path(id): Path<String>,
    AppJson(payload): AppJson<UpdateVenueRequest>,
) -> Result<impl IntoResponse, AppError> {
    let mut venue = state.venue_repo.find_by_id(&id).await?
        .ok_or(AppError::NotFound("Venue not found".into()))?;

    if let Some(name) = payload.name { venue.name = name.trim().to_string(); }
    if payload.description.is_some() { venue.description = non_blank(payload.description); }
    if payload.address.is_some() { venue.address = non_blank(payload.address); }
    if payload.city.is_some() { venue.city = non_blank(payload.city); }
    if payload.country.is_some() { venue.country = non_blank(payload.country); }
    if let Some(capacity) = payload.capacity { venue.capacity = capacity; }
    if let Some(amenities) = payload.amenities { venue.amenities = JsonColumn(amenities); }
    if let Some(active) = payload.is_active { venue.is_active = active; }
    venue.updated_at = Utc::now();

    validate_venue(&venue)?;
    let updated = state.venue_repo.update(&venue).await?;
    info!(venue_id = %id, "Updated venue");

    Ok(Json(DataResponse::new(updated)))
}

pub async fn delete_venue(
    State(state): State<Arc<AppState>>,
    AdminSession(_session): AdminSession,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    state.venue_repo.delete(&id).await?;
    info!(venue_id = %id, "Deleted venue");
    Ok(Json(MessageResponse::new("Venue deleted")))
}
