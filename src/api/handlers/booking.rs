use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use crate::state::AppState;
use crate::api::extractors::auth::{AdminSession, AuthSession};
use crate::api::extractors::json::{AppJson, AppQuery};
use crate::api::dtos::{
    requests::{BookingListQuery, UpdateBookingStatusRequest},
    responses::{BookingListResponse, BookingResponse, PackagesResponse},
};
use crate::api::handlers::conflict::non_blank;
use crate::domain::models::auth::Session;
use crate::domain::models::booking::{Booking, BookingRequest, BookingStatus, NewBookingParams};
use crate::domain::services::calendar::generate_ics;
use crate::error::AppError;
use std::sync::Arc;
use chrono::Utc;
use tracing::{info, warn};

const DEFAULT_SESSION_TYPE: &str = "class";

/// Bookings are visible to their owner and to admins only. Others get a 404.
fn ensure_owner(session: &Session, booking: &Booking) -> Result<(), AppError> {
    if booking.user_id == session.user_id || session.is_admin() {
        Ok(())
    } else {
        Err(AppError::NotFound("Booking not found".into()))
    }
}

pub async fn create_booking(
    State(state): State<Arc<AppState>>,
    AuthSession(session): AuthSession,
    AppJson(payload): AppJson<BookingRequest>,
) -> Result<impl IntoResponse, AppError> {
    let now = Utc::now();

    let package = state.client_repo.find_user_package(&payload.user_package_id).await?
        .filter(|p| p.user_id == session.user_id)
        .ok_or(AppError::NotFound("Package not found".into()))?;
    if !package.summary().is_usable_at(now) {
        return Err(AppError::Validation("Package has no remaining sessions or has expired".into()));
    }

    let slot = state.slot_repo.find_by_id(&payload.schedule_slot_id).await?
        .ok_or(AppError::NotFound("Slot not found".into()))?;
    if slot.start_time <= now {
        return Err(AppError::Validation("Cannot book a slot that has already started".into()));
    }

    let booking = Booking::new(NewBookingParams {
        user_id: session.user_id.clone(),
        user_package_id: package.id,
        schedule_slot_id: slot.id,
        session_type: non_blank(payload.session_type).unwrap_or_else(|| DEFAULT_SESSION_TYPE.to_string()),
        notes: non_blank(payload.notes),
        phone_number: non_blank(payload.phone_number),
        payment_method: payload.payment_method,
    });

    let created = state.booking_repo.create_atomic(&booking).await.inspect_err(|e| {
        warn!(slot_id = %booking.schedule_slot_id, "Booking rejected: {}", e);
    })?;

    info!(
        booking_id = %created.id,
        reference = %created.reference,
        status = created.status.as_str(),
        "Booking created"
    );
    Ok((StatusCode::CREATED, Json(BookingResponse { success: true, booking: created })))
}

pub async fn list_my_bookings(
    State(state): State<Arc<AppState>>,
    AuthSession(session): AuthSession,
) -> Result<impl IntoResponse, AppError> {
    let bookings = state.booking_repo.list_by_user(&session.user_id).await?;
    Ok(Json(BookingListResponse { success: true, bookings }))
}

pub async fn cancel_my_booking(
    State(state): State<Arc<AppState>>,
    AuthSession(session): AuthSession,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let booking = state.booking_repo.find_by_id(&id).await?
        .ok_or(AppError::NotFound("Booking not found".into()))?;
    ensure_owner(&session, &booking)?;

    let cancelled = state.booking_repo.cancel(&id).await?;
    info!(booking_id = %id, "Booking cancelled by customer");
    Ok(Json(BookingResponse { success: true, booking: cancelled }))
}

pub async fn booking_ics(
    State(state): State<Arc<AppState>>,
    AuthSession(session): AuthSession,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let details = state.booking_repo.find_details(&id).await?
        .ok_or(AppError::NotFound("Booking not found".into()))?;
    ensure_owner(&session, &details.booking)?;

    let filename = format!("attachment; filename=\"booking-{}.ics\"", details.booking.reference);
    Ok((
        [
            (header::CONTENT_TYPE, "text/calendar; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, filename),
        ],
        generate_ics(&details),
    ))
}

pub async fn list_my_packages(
    State(state): State<Arc<AppState>>,
    AuthSession(session): AuthSession,
) -> Result<impl IntoResponse, AppError> {
    let packages = state.client_repo.list_user_packages(&session.user_id).await?
        .iter()
        .map(|p| p.summary())
        .collect();
    Ok(Json(PackagesResponse { success: true, packages }))
}

pub async fn list_all_bookings(
    State(state): State<Arc<AppState>>,
    AdminSession(_session): AdminSession,
    AppQuery(query): AppQuery<BookingListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let bookings = state.booking_repo.list_all(query.status).await?;
    Ok(Json(BookingListResponse { success: true, bookings }))
}

pub async fn update_booking_status(
    State(state): State<Arc<AppState>>,
    AdminSession(session): AdminSession,
    Path(id): Path<String>,
    AppJson(payload): AppJson<UpdateBookingStatusRequest>,
) -> Result<impl IntoResponse, AppError> {
    let booking = state.booking_repo.find_by_id(&id).await?
        .ok_or(AppError::NotFound("Booking not found".into()))?;

    if !booking.status.can_transition_to(payload.status) {
        return Err(AppError::Validation(format!(
            "Cannot change booking from {} to {}",
            booking.status.as_str(),
            payload.status.as_str()
        )));
    }

    let updated = match payload.status {
        BookingStatus::Cancelled => state.booking_repo.cancel(&id).await?,
        next => state.booking_repo.update_status(&id, booking.status, next).await?,
    };

    info!(
        admin = %session.user_id,
        booking_id = %id,
        from = booking.status.as_str(),
        to = updated.status.as_str(),
        "Booking status changed"
    );
    Ok(Json(BookingResponse { success: true, booking: updated }))
}
