use axum::{extract::State, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::extractors::auth::AdminSession;
use crate::api::extractors::json::AppJson;
use crate::api::dtos::requests::{ConflictCheckRequest, ScheduleTemplateRequest};
use crate::domain::models::schedule::{parse_clock_time, DayOfWeek, ScheduleKind, ScheduleType, UnifiedSchedule};
use crate::domain::services::conflicts::{check_conflicts, ConflictContext, ConflictReport};
use crate::domain::services::recurrence::{build_schedules, ScheduleDraft};
use crate::error::AppError;
use std::sync::Arc;
use tracing::info;

pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

pub(crate) fn parse_time_field(field: &str, value: &str) -> Result<chrono::NaiveTime, AppError> {
    parse_clock_time(value).ok_or_else(|| AppError::Validation(format!("{} must be a HH:MM time, got '{}'", field, value)))
}

fn template_kind(payload: &ScheduleTemplateRequest) -> Result<ScheduleKind, AppError> {
    match payload.schedule_type {
        ScheduleType::Teacher => Ok(ScheduleKind::Teacher {
            teacher_id: non_blank(payload.teacher_id.clone())
                .ok_or_else(|| AppError::Validation("teacherId is required for teacher schedules".into()))?,
            venue_id: non_blank(payload.venue_id.clone()),
            service_type_id: non_blank(payload.service_type_id.clone()),
            teacher_name: None,
            venue_name: None,
            service_type_name: None,
        }),
        ScheduleType::Venue => {
            if payload.session_duration_min.is_some_and(|d| d < 1) {
                return Err(AppError::Validation("sessionDurationMin must be at least 1".into()));
            }
            Ok(ScheduleKind::Venue {
                venue_id: non_blank(payload.venue_id.clone())
                    .ok_or_else(|| AppError::Validation("venueId is required for venue schedules".into()))?,
                session_duration_min: payload.session_duration_min,
                venue_name: None,
            })
        }
        ScheduleType::General => Ok(ScheduleKind::General {
            name: non_blank(payload.name.clone())
                .ok_or_else(|| AppError::Validation("name is required for general schedules".into()))?,
            description: non_blank(payload.description.clone()),
        }),
    }
}

/// Turns a create or check request into a draft. `selectedDays` wins over `dayOfWeek`.
pub(crate) fn template_draft(payload: &ScheduleTemplateRequest) -> Result<ScheduleDraft, AppError> {
    let days: Vec<DayOfWeek> = match (&payload.selected_days, payload.day_of_week) {
        (Some(days), _) if !days.is_empty() => days.clone(),
        (_, Some(day)) => vec![day],
        _ => Vec::new(),
    };

    Ok(ScheduleDraft {
        kind: template_kind(payload)?,
        days,
        start_time: parse_time_field("startTime", &payload.start_time)?,
        end_time: parse_time_field("endTime", &payload.end_time)?,
        max_bookings: payload.max_bookings.unwrap_or(1),
        is_available: payload.is_available.unwrap_or(true),
        is_recurrent: payload.is_recurrent.unwrap_or(true),
        end_date: payload.end_date,
    })
}

/// Loads what the candidate references and checks it against the schedules on the same weekday.
pub(crate) async fn assess(state: &AppState, candidate: &UnifiedSchedule) -> Result<ConflictReport, AppError> {
    let teacher = match candidate.teacher_id() {
        Some(id) => Some(
            state.teacher_repo.find_by_id(id).await?
                .ok_or_else(|| AppError::Validation(format!("Teacher {} does not exist", id)))?,
        ),
        None => None,
    };
    let venue = match candidate.venue_id() {
        Some(id) => Some(
            state.venue_repo.find_by_id(id).await?
                .ok_or_else(|| AppError::Validation(format!("Venue {} does not exist", id)))?,
        ),
        None => None,
    };
    if let ScheduleKind::Teacher { service_type_id: Some(id), .. } = &candidate.kind
        && state.service_type_repo.find_by_id(id).await?.is_none()
    {
        return Err(AppError::Validation(format!("Service type {} does not exist", id)));
    }

    let existing = state.schedule_repo.list_by_day(candidate.day_of_week).await?;
    let ctx = ConflictContext {
        teacher: teacher.as_ref(),
        venue: venue.as_ref(),
        policy: state.config.venue_conflict_policy,
    };

    Ok(check_conflicts(candidate, &existing, &ctx))
}

pub async fn check_schedule_conflicts(
    State(state): State<Arc<AppState>>,
    AdminSession(_session): AdminSession,
    AppJson(ConflictCheckRequest { schedule: payload }): AppJson<ConflictCheckRequest>,
) -> Result<impl IntoResponse, AppError> {
    let mut candidates = build_schedules(template_draft(&payload)?)?;
    if let Some(id) = non_blank(payload.schedule_id.clone()) {
        for candidate in &mut candidates {
            candidate.id = id.clone();
        }
    }

    let mut report = ConflictReport::default();
    for candidate in &candidates {
        report.merge(assess(&state, candidate).await?);
    }

    info!(
        days = candidates.len(),
        conflicts = report.conflicts.len(),
        "Checked {} schedule for conflicts",
        payload.schedule_type.as_str()
    );
    Ok(Json(report))
}
