use axum::{
    body::Body,
    extract::Request,
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use crate::state::AppState;
use crate::api::handlers::{booking, client, conflict, health, package, schedule, service_type, slot, teacher, venue};
use tower_http::{
    trace::TraceLayer,
    classify::ServerErrorsFailureClass,
};
use tracing::{info_span, Span, error, info};
use uuid::Uuid;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health::health_check))

        // Public availability
        .route("/api/teacher-schedule-slots", get(slot::list_available_slots))

        // Unified schedules
        .route("/api/admin/unified-schedules", get(schedule::list_schedules).post(schedule::create_schedule))
        .route("/api/admin/unified-schedules/calendar", get(schedule::schedule_calendar))
        .route("/api/admin/unified-schedules/{id}", get(schedule::get_schedule).put(schedule::update_schedule).delete(schedule::delete_schedule))
        .route("/api/admin/unified-schedules/{id}/toggle", post(schedule::toggle_schedule))
        .route("/api/admin/unified-schedules/{id}/slots", get(slot::list_schedule_slots).post(slot::generate_schedule_slots))
        .route("/api/admin/schedule-conflicts", post(conflict::check_schedule_conflicts))

        // Customer bookings
        .route("/api/client/bookings", get(booking::list_my_bookings).post(booking::create_booking))
        .route("/api/client/bookings/{id}/cancel", post(booking::cancel_my_booking))
        .route("/api/client/bookings/{id}/ics", get(booking::booking_ics))
        .route("/api/client/packages", get(booking::list_my_packages))

        // Admin bookings
        .route("/api/admin/bookings", get(booking::list_all_bookings))
        .route("/api/admin/bookings/{id}/status", put(booking::update_booking_status))

        // Catalogue
        .route("/api/admin/teachers", get(teacher::list_teachers).post(teacher::create_teacher))
        .route("/api/admin/teachers/{id}", get(teacher::get_teacher).put(teacher::update_teacher).delete(teacher::delete_teacher))
        .route("/api/admin/venues", get(venue::list_venues).post(venue::create_venue))
        .route("/api/admin/venues/{id}", get(venue::get_venue).put(venue::update_venue).delete(venue::delete_venue))
        .route("/api/admin/service-types", get(service_type::list_service_types).post(service_type::create_service_type))
        .route("/api/admin/service-types/{id}", get(service_type::get_service_type).put(service_type::update_service_type).delete(service_type::delete_service_type))
        .route("/api/admin/package-definitions", get(package::list_definitions).post(package::create_definition))
        .route("/api/admin/package-definitions/{id}", get(package::get_definition).put(package::update_definition).delete(package::delete_definition))
        .route("/api/admin/package-prices", get(package::list_prices).post(package::create_price))
        .route("/api/admin/package-prices/{id}", get(package::get_price).put(package::update_price).delete(package::delete_price))

        // Clients & packages
        .route("/api/admin/clients", get(client::list_clients).post(client::create_client))
        .route("/api/admin/clients/{id}/summary", get(client::client_summary))
        .route("/api/admin/user-packages", post(package::grant_user_package))

        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<Body>| {
                    let request_id = Uuid::new_v4().to_string();
                    info_span!(
                        "http_request",
                        request_id = %request_id,
                        method = ?request.method(),
                        uri = ?request.uri(),
                        version = ?request.version(),
                        user_id = tracing::field::Empty,
                    )
                })
                .on_request(|request: &Request<Body>, _span: &Span| {
                    info!("started processing request: {} {}", request.method(), request.uri().path());
                })
                .on_response(|response: &axum::http::Response<Body>, latency: Duration, _span: &Span| {
                    info!(
                        status = response.status().as_u16(),
                        latency_ms = latency.as_millis(),
                        "finished processing request"
                    );
                })
                .on_failure(|error: ServerErrorsFailureClass, _latency: Duration, _span: &Span| {
                    error!("request failed: {:?}", error);
                })
        )
        .with_state(state)
}
