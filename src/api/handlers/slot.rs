use axum::{extract::{Path, State}, http::StatusCode, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::extractors::auth::AdminSession;
use crate::api::extractors::json::{AppJson, AppQuery};
use crate::api::dtos::{
    requests::{GenerateSlotsRequest, SlotListQuery},
    responses::{ScheduleSlotsResponse, SlotAvailabilityResponse},
};
use crate::api::handlers::conflict::non_blank;
use crate::domain::models::slot::{SlotAvailability, SlotQuery};
use crate::domain::services::calendar::{week_end, week_start};
use crate::domain::services::recurrence::{expand_slots, local_day_start, validate_expansion_window};
use crate::error::AppError;
use std::sync::Arc;
use chrono::{Duration, Utc};
use tracing::info;

/// Public slot listing. Without `from`/`to` it covers the current Monday-based week in studio time.
pub async fn list_available_slots(
    State(state): State<Arc<AppState>>,
    AppQuery(query): AppQuery<SlotListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let tz = state.config.studio_timezone;
    let today = Utc::now().with_timezone(&tz).date_naive();

    let from = query.from.unwrap_or_else(|| week_start(today));
    let to = query.to.unwrap_or_else(|| week_end(from));
    validate_expansion_window(from, to)?;

    let slot_query = SlotQuery {
        available_only: query.available.unwrap_or(false),
        teacher_id: non_blank(query.teacher_id),
        venue_id: non_blank(query.venue_id),
        service_type_id: non_blank(query.service_type_id),
    };

    let listings = state.slot_repo
        .list_in_range(local_day_start(&tz, from), local_day_start(&tz, to + Duration::days(1)), &slot_query)
        .await?;

    let slots: Vec<SlotAvailability> = listings
        .into_iter()
        .map(|listing| SlotAvailability::from_listing(listing, &tz))
        .collect();

    Ok(Json(SlotAvailabilityResponse { success: true, slots }))
}

pub async fn list_schedule_slots(
    State(state): State<Arc<AppState>>,
    AdminSession(_session): AdminSession,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    if state.schedule_repo.find_by_id(&id).await?.is_none() {
        return Err(AppError::NotFound("Schedule not found".into()));
    }
    let slots = state.slot_repo.list_by_schedule(&id).await?;
    Ok(Json(ScheduleSlotsResponse { success: true, created: None, slots }))
}

/// Materializes the schedule between two studio-local dates. Re-running over the same window adds nothing.
pub async fn generate_schedule_slots(
    State(state): State<Arc<AppState>>,
    AdminSession(session): AdminSession,
    Path(id): Path<String>,
    AppJson(payload): AppJson<GenerateSlotsRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_expansion_window(payload.from, payload.to)?;

    let schedule = state.schedule_repo.find_by_id(&id).await?
        .ok_or(AppError::NotFound("Schedule not found".into()))?;

    let expanded = expand_slots(&schedule, payload.from, payload.to, &state.config.studio_timezone);
    let created = state.slot_repo.insert_many(&expanded).await?;
    let slots = state.slot_repo.list_by_schedule(&id).await?;

    info!(
        admin = %session.user_id,
        schedule_id = %id,
        from = %payload.from,
        to = %payload.to,
        created,
        "Generated slots"
    );

    Ok((StatusCode::CREATED, Json(ScheduleSlotsResponse { success: true, created: Some(created), slots })))
}
