use axum::{extract::{Path, State}, http::StatusCode, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::extractors::auth::AdminSession;
use crate::api::extractors::json::{AppJson, AppQuery};
use crate::api::dtos::{
    requests::{CalendarQuery, ScheduleListQuery, ScheduleTemplateRequest, UpdateScheduleRequest},
    responses::{CalendarResponse, MessageResponse, ScheduleListResponse, ScheduleResponse, ScheduleWriteResponse},
};
use crate::api::handlers::conflict::{assess, non_blank, parse_time_field, template_draft};
use crate::domain::models::schedule::{ScheduleKind, UnifiedSchedule};
use crate::domain::services::aggregator::{paginate, sort_schedules, ScheduleFilter};
use crate::domain::services::calendar::build_calendar;
use crate::domain::services::conflicts::ConflictReport;
use crate::domain::services::recurrence::{build_schedules, validate_template};
use crate::domain::services::validation::require_non_blank;
use crate::error::AppError;
use std::sync::Arc;
use chrono::Utc;
use tracing::{info, warn};

const INCLUDE_OPTIONS: [&str; 5] = ["teacher", "venue", "serviceType", "slots", "all"];

fn validate_include(include: Option<&str>) -> Result<(), AppError> {
    let Some(include) = include else { return Ok(()) };
    for part in include.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        if !INCLUDE_OPTIONS.contains(&part) {
            return Err(AppError::Validation(format!("Unknown include '{}'", part)));
        }
    }
    Ok(())
}

pub async fn list_schedules(
    State(state): State<Arc<AppState>>,
    AdminSession(_session): AdminSession,
    AppQuery(query): AppQuery<ScheduleListQuery>,
) -> Result<impl IntoResponse, AppError> {
    validate_include(query.include.as_deref())?;

    let filter = ScheduleFilter {
        schedule_type: query.schedule_type,
        teacher_id: non_blank(query.teacher_id),
        venue_id: non_blank(query.venue_id),
        day_of_week: query.day_of_week,
        is_available: query.is_available,
        search: query.search,
    };

    let mut schedules = filter.apply(state.schedule_repo.list().await?);
    sort_schedules(&mut schedules);
    let (schedules, pagination) = paginate(schedules, query.page, query.limit);

    Ok(Json(ScheduleListResponse { success: true, schedules, pagination }))
}

pub async fn create_schedule(
    State(state): State<Arc<AppState>>,
    AdminSession(session): AdminSession,
    AppJson(payload): AppJson<ScheduleTemplateRequest>,
) -> Result<impl IntoResponse, AppError> {
    let schedules = build_schedules(template_draft(&payload)?)?;

    let mut report = ConflictReport::default();
    for candidate in &schedules {
        report.merge(assess(&state, candidate).await?);
    }

    if report.blocks(state.config.venue_conflict_policy) {
        warn!(conflicts = report.conflicts.len(), "Rejected schedule creation due to venue conflicts");
        return Err(AppError::ScheduleConflict(report));
    }

    let created = state.schedule_repo.create_batch(&schedules).await?;
    info!(
        admin = %session.user_id,
        count = created.len(),
        warnings = report.conflicts.len(),
        "Created {} schedule(s)",
        payload.schedule_type.as_str()
    );

    Ok((StatusCode::CREATED, Json(ScheduleWriteResponse { success: true, schedules: created, conflicts: report })))
}

pub async fn get_schedule(
    State(state): State<Arc<AppState>>,
    AdminSession(_session): AdminSession,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let schedule = state.schedule_repo.find_by_id(&id).await?
        .ok_or(AppError::NotFound("Schedule not found".into()))?;
    Ok(Json(ScheduleResponse { success: true, schedule, conflicts: None }))
}

/// Applies the present fields. References that do not belong to the schedule's kind are ignored.
fn apply_update(schedule: &mut UnifiedSchedule, payload: UpdateScheduleRequest) -> Result<(), AppError> {
    match &mut schedule.kind {
        ScheduleKind::Teacher { teacher_id, venue_id, service_type_id, .. } => {
            if let Some(id) = payload.teacher_id {
                require_non_blank("teacherId", &id)?;
                *teacher_id = id.trim().to_string();
            }
            if payload.venue_id.is_some() {
                *venue_id = non_blank(payload.venue_id);
            }
            if payload.service_type_id.is_some() {
                *service_type_id = non_blank(payload.service_type_id);
            }
        }
        ScheduleKind::Venue { venue_id, session_duration_min, .. } => {
            if let Some(id) = payload.venue_id {
                require_non_blank("venueId", &id)?;
                *venue_id = id.trim().to_string();
            }
            if let Some(duration) = payload.session_duration_min {
                if duration < 1 {
                    return Err(AppError::Validation("sessionDurationMin must be at least 1".into()));
                }
                *session_duration_min = Some(duration);
            }
        }
        ScheduleKind::General { name, description } => {
            if let Some(value) = payload.name {
                require_non_blank("name", &value)?;
                *name = value.trim().to_string();
            }
            if payload.description.is_some() {
                *description = non_blank(payload.description);
            }
        }
    }

    if let Some(day) = payload.day_of_week {
        schedule.day_of_week = day;
    }
    if let Some(start) = payload.start_time {
        schedule.start_time = parse_time_field("startTime", &start)?;
    }
    if let Some(end) = payload.end_time {
        schedule.end_time = parse_time_field("endTime", &end)?;
    }
    if let Some(max) = payload.max_bookings {
        schedule.max_bookings = max;
    }
    if let Some(available) = payload.is_available {
        schedule.is_available = available;
    }
    if let Some(recurrent) = payload.is_recurrent {
        schedule.is_recurrent = recurrent;
        if !recurrent {
            schedule.end_date = None;
        }
    }
    if payload.end_date.is_some() {
        schedule.end_date = payload.end_date;
    }

    validate_template(
        schedule.start_time,
        schedule.end_time,
        schedule.max_bookings,
        schedule.is_recurrent,
        schedule.end_date,
    )
}

pub async fn update_schedule(
    State(state): State<Arc<AppState>>,
    AdminSession(session): AdminSession,
    Path(id): Path<String>,
    AppJson(payload): AppJson<UpdateScheduleRequest>,
) -> Result<impl IntoResponse, AppError> {
    let mut schedule = state.schedule_repo.find_by_id(&id).await?
        .ok_or(AppError::NotFound("Schedule not found".into()))?;

    apply_update(&mut schedule, payload)?;
    schedule.updated_at = Utc::now();

    let report = assess(&state, &schedule).await?;
    if report.blocks(state.config.venue_conflict_policy) {
        warn!(schedule_id = %id, "Rejected schedule update due to venue conflicts");
        return Err(AppError::ScheduleConflict(report));
    }

    let updated = state.schedule_repo.update(&schedule).await?;
    info!(admin = %session.user_id, schedule_id = %id, "Updated schedule");

    Ok(Json(ScheduleResponse { success: true, schedule: updated, conflicts: Some(report) }))
}

pub async fn delete_schedule(
    State(state): State<Arc<AppState>>,
    AdminSession(session): AdminSession,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    state.schedule_repo.delete(&id).await?;
    info!(admin = %session.user_id, schedule_id = %id, "Deleted schedule");
    Ok(Json(MessageResponse::new("Schedule deleted")))
}

pub async fn toggle_schedule(
    State(state): State<Arc<AppState>>,
    AdminSession(_session): AdminSession,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let current = state.schedule_repo.find_by_id(&id).await?
        .ok_or(AppError::NotFound("Schedule not found".into()))?;

    let schedule = state.schedule_repo.set_availability(&id, !current.is_available, Utc::now()).await?
        .ok_or(AppError::NotFound("Schedule not found".into()))?;

    info!(schedule_id = %id, available = schedule.is_available, "Toggled schedule availability");
    Ok(Json(ScheduleResponse { success: true, schedule, conflicts: None }))
}

pub async fn schedule_calendar(
    State(state): State<Arc<AppState>>,
    AdminSession(_session): AdminSession,
    AppQuery(query): AppQuery<CalendarQuery>,
) -> Result<impl IntoResponse, AppError> {
    let tz = state.config.studio_timezone;
    let reference = query.date.unwrap_or_else(|| Utc::now().with_timezone(&tz).date_naive());

    let filter = ScheduleFilter {
        schedule_type: query.schedule_type,
        teacher_id: non_blank(query.teacher_id),
        venue_id: non_blank(query.venue_id),
        day_of_week: None,
        is_available: query.is_available,
        search: query.search,
    };
    let schedules = filter.apply(state.schedule_repo.list().await?);

    let calendar = build_calendar(query.mode.unwrap_or_default(), reference, &schedules, &tz);
    Ok(Json(CalendarResponse { success: true, calendar }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::schedule::DayOfWeek;
    use chrono::NaiveTime;

    fn general() -> UnifiedSchedule {
        UnifiedSchedule::new(
            ScheduleKind::General { name: "Open mat".into(), description: None },
            DayOfWeek::Monday,
            NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
            10,
        )
    }

    #[test]
    fn test_include_accepts_known_relations() {
        assert!(validate_include(None).is_ok());
        assert!(validate_include(Some("teacher, venue,slots")).is_ok());
        assert!(validate_include(Some("payments")).is_err());
    }

    #[test]
    fn test_update_rejects_inverted_times() {
        let mut schedule = general();
        let payload = UpdateScheduleRequest { start_time: Some("11:00".into()), ..Default::default() };
        assert!(matches!(apply_update(&mut schedule, payload), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_update_clears_end_date_when_no_longer_recurrent() {
        let mut schedule = general();
        schedule.is_recurrent = true;
        schedule.end_date = chrono::NaiveDate::from_ymd_opt(2025, 12, 31);

        let payload = UpdateScheduleRequest {
            is_recurrent: Some(false),
            name: Some("  Yin  ".into()),
            ..Default::default()
        };
        apply_update(&mut schedule, payload).unwrap();

        assert_eq!(schedule.end_date, None);
        assert_eq!(schedule.label(), "Yin");
    }
}
