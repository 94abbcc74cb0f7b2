use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use crate::domain::models::schedule::{DayOfWeek, ScheduleKind, UnifiedSchedule};
use crate::domain::models::slot::ScheduleSlot;
use crate::error::AppError;

/// Longest window a single expansion call may cover.
pub const MAX_EXPANSION_DAYS: i64 = 366;

/// A schedule as submitted by an admin, before it is split per weekday.
#[derive(Debug, Clone)]
pub struct ScheduleDraft {
    pub kind: ScheduleKind,
    pub days: Vec<DayOfWeek>,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub max_bookings: i32,
    pub is_available: bool,
    pub is_recurrent: bool,
    pub end_date: Option<NaiveDate>,
}

pub fn validate_time_range(start: NaiveTime, end: NaiveTime) -> Result<(), AppError> {
    if start >= end {
        return Err(AppError::Validation(format!(
            "startTime {} must be before endTime {}",
            start.format("%H:%M"),
            end.format("%H:%M")
        )));
    }
    Ok(())
}

pub fn validate_template(
    start: NaiveTime,
    end: NaiveTime,
    max_bookings: i32,
    is_recurrent: bool,
    end_date: Option<NaiveDate>,
) -> Result<(), AppError> {
    validate_time_range(start, end)?;
    if max_bookings < 1 {
        return Err(AppError::Validation("maxBookings must be at least 1".into()));
    }
    if end_date.is_some() && !is_recurrent {
        return Err(AppError::Validation("endDate is only allowed on recurrent schedules".into()));
    }
    Ok(())
}

/// Splits a draft into one schedule per selected weekday, all sharing the same time range.
pub fn build_schedules(draft: ScheduleDraft) -> Result<Vec<UnifiedSchedule>, AppError> {
    validate_template(draft.start_time, draft.end_time, draft.max_bookings, draft.is_recurrent, draft.end_date)?;

    let mut days: Vec<DayOfWeek> = Vec::with_capacity(draft.days.len());
    for day in draft.days {
        if !days.contains(&day) {
            days.push(day);
        }
    }
    if days.is_empty() {
        return Err(AppError::Validation("At least one day of the week must be selected".into()));
    }

    Ok(days
        .into_iter()
        .map(|day| {
            let mut schedule = UnifiedSchedule::new(
                draft.kind.clone(),
                day,
                draft.start_time,
                draft.end_time,
                draft.max_bookings,
            );
            schedule.is_available = draft.is_available;
            schedule.is_recurrent = draft.is_recurrent;
            schedule.end_date = draft.end_date;
            schedule
        })
        .collect())
}

/// A one-off schedule happens once, on the first matching weekday on or after the studio-local day it was created.
pub fn one_off_date(schedule: &UnifiedSchedule, tz: &Tz) -> NaiveDate {
    let created = schedule.created_at.with_timezone(tz).date_naive();
    next_on_or_after(created, schedule.day_of_week)
}

fn next_on_or_after(date: NaiveDate, day: DayOfWeek) -> NaiveDate {
    let target = day.to_weekday().num_days_from_monday() as i64;
    let offset = (7 + target - date.weekday().num_days_from_monday() as i64) % 7;
    date + Duration::days(offset)
}

/// Whether the schedule's template lands on `date`, regardless of availability.
pub fn occurs_on(schedule: &UnifiedSchedule, date: NaiveDate, tz: &Tz) -> bool {
    if DayOfWeek::from(date.weekday()) != schedule.day_of_week {
        return false;
    }
    if !schedule.is_recurrent {
        return date == one_off_date(schedule, tz);
    }
    schedule.end_date.is_none_or(|last| date <= last)
}

/// Dates in `[from, to]` on which the schedule occurs.
pub fn occurrence_dates(schedule: &UnifiedSchedule, from: NaiveDate, to: NaiveDate, tz: &Tz) -> Vec<NaiveDate> {
    if !schedule.is_available || from > to {
        return Vec::new();
    }

    if !schedule.is_recurrent {
        let date = one_off_date(schedule, tz);
        return if from <= date && date <= to { vec![date] } else { Vec::new() };
    }

    let last = match schedule.end_date {
        Some(end) if end < to => end,
        _ => to,
    };

    let mut date = next_on_or_after(from, schedule.day_of_week);
    let mut dates = Vec::new();
    while date <= last {
        dates.push(date);
        date += Duration::weeks(1);
    }
    dates
}

/// Resolves a studio-local wall-clock time to UTC. Times skipped by a DST change yield `None`.
pub fn local_to_utc(tz: &Tz, date: NaiveDate, time: NaiveTime) -> Option<DateTime<Utc>> {
    tz.from_local_datetime(&date.and_time(time))
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
}

/// First instant of a studio-local day, falling back to UTC midnight when local midnight is skipped.
pub fn local_day_start(tz: &Tz, date: NaiveDate) -> DateTime<Utc> {
    local_to_utc(tz, date, NaiveTime::MIN).unwrap_or_else(|| Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN)))
}

/// Materializes the schedule into dated slots for every occurrence in `[from, to]`.
pub fn expand_slots(schedule: &UnifiedSchedule, from: NaiveDate, to: NaiveDate, tz: &Tz) -> Vec<ScheduleSlot> {
    let length = schedule.end_time - schedule.start_time;

    occurrence_dates(schedule, from, to, tz)
        .into_iter()
        .filter_map(|date| {
            let start = local_to_utc(tz, date, schedule.start_time)?;
            Some(ScheduleSlot::new(schedule.id.clone(), start, start + length, schedule.max_bookings))
        })
        .collect()
}

pub fn validate_expansion_window(from: NaiveDate, to: NaiveDate) -> Result<(), AppError> {
    if from > to {
        return Err(AppError::Validation("from must not be after to".into()));
    }
    if (to - from).num_days() >= MAX_EXPANSION_DAYS {
        return Err(AppError::Validation(format!(
            "Slot generation window is limited to {} days",
            MAX_EXPANSION_DAYS
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn general() -> ScheduleKind {
        ScheduleKind::General { name: "Open mat".into(), description: None }
    }

    fn draft(days: Vec<DayOfWeek>) -> ScheduleDraft {
        ScheduleDraft {
            kind: general(),
            days,
            start_time: t(9, 0),
            end_time: t(10, 0),
            max_bookings: 3,
            is_available: true,
            is_recurrent: true,
            end_date: None,
        }
    }

    #[test]
    fn test_multi_day_creates_one_schedule_per_day() {
        let schedules = build_schedules(draft(vec![
            DayOfWeek::Monday,
            DayOfWeek::Wednesday,
            DayOfWeek::Friday,
            DayOfWeek::Monday,
        ]))
        .unwrap();

        assert_eq!(schedules.len(), 3);
        let days: Vec<_> = schedules.iter().map(|s| s.day_of_week).collect();
        assert_eq!(days, vec![DayOfWeek::Monday, DayOfWeek::Wednesday, DayOfWeek::Friday]);
        assert!(schedules.iter().all(|s| s.start_time == t(9, 0) && s.end_time == t(10, 0)));
    }

    #[test]
    fn test_rejects_invalid_templates() {
        assert!(matches!(build_schedules(draft(vec![])), Err(AppError::Validation(_))));

        let mut inverted = draft(vec![DayOfWeek::Monday]);
        inverted.end_time = t(9, 0);
        assert!(matches!(build_schedules(inverted), Err(AppError::Validation(_))));

        let mut empty_capacity = draft(vec![DayOfWeek::Monday]);
        empty_capacity.max_bookings = 0;
        assert!(matches!(build_schedules(empty_capacity), Err(AppError::Validation(_))));

        let mut one_off_with_end = draft(vec![DayOfWeek::Monday]);
        one_off_with_end.is_recurrent = false;
        one_off_with_end.end_date = Some(d(2025, 12, 31));
        assert!(matches!(build_schedules(one_off_with_end), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_expands_one_slot_per_week() {
        let schedule = build_schedules(draft(vec![DayOfWeek::Monday])).unwrap().remove(0);
        // Five Mondays: Oct 6, 13, 20, 27, Nov 3
        let slots = expand_slots(&schedule, d(2025, 10, 6), d(2025, 11, 9), &chrono_tz::America::Lima);

        assert_eq!(slots.len(), 5);
        for slot in &slots {
            assert_eq!(slot.capacity, 3);
            assert_eq!(slot.booked_count, 0);
            assert!(slot.is_available);
            assert_eq!(slot.end_time - slot.start_time, Duration::hours(1));
        }
        // Lima is UTC-5 all year
        assert_eq!(slots[0].start_time.hour(), 14);
    }

    #[test]
    fn test_expansion_respects_end_date_and_recurrence() {
        let lima = chrono_tz::America::Lima;
        let mut schedule = build_schedules(draft(vec![DayOfWeek::Monday])).unwrap().remove(0);
        schedule.end_date = Some(d(2025, 10, 20));
        assert_eq!(occurrence_dates(&schedule, d(2025, 10, 1), d(2025, 11, 30), &lima).len(), 3);

        // Created on Thursday 2025-10-02 in Lima: the one-off lands on the following Monday.
        schedule.is_recurrent = false;
        schedule.end_date = None;
        schedule.created_at = Utc.with_ymd_and_hms(2025, 10, 2, 15, 0, 0).unwrap();
        assert_eq!(occurrence_dates(&schedule, d(2025, 10, 1), d(2025, 11, 30), &lima), vec![d(2025, 10, 6)]);

        schedule.is_available = false;
        assert!(occurrence_dates(&schedule, d(2025, 10, 1), d(2025, 11, 30), &lima).is_empty());
    }

    #[test]
    fn test_one_off_occurs_once_across_windows() {
        let lima = chrono_tz::America::Lima;
        let mut schedule = build_schedules(draft(vec![DayOfWeek::Monday])).unwrap().remove(0);
        schedule.is_recurrent = false;
        // 2025-10-07 03:00 UTC is still Monday 2025-10-06 in Lima.
        schedule.created_at = Utc.with_ymd_and_hms(2025, 10, 7, 3, 0, 0).unwrap();

        assert_eq!(one_off_date(&schedule, &lima), d(2025, 10, 6));
        assert_eq!(expand_slots(&schedule, d(2025, 10, 6), d(2025, 10, 12), &lima).len(), 1);
        assert!(expand_slots(&schedule, d(2025, 10, 13), d(2025, 10, 19), &lima).is_empty());
        assert!(expand_slots(&schedule, d(2025, 9, 29), d(2025, 10, 5), &lima).is_empty());

        assert!(occurs_on(&schedule, d(2025, 10, 6), &lima));
        assert!(!occurs_on(&schedule, d(2025, 10, 13), &lima));
    }

    #[test]
    fn test_skips_nonexistent_local_times() {
        let mut schedule = build_schedules(draft(vec![DayOfWeek::Sunday])).unwrap().remove(0);
        schedule.start_time = t(2, 30);
        schedule.end_time = t(3, 30);
        // 2025-03-09 02:30 does not exist in New York
        let slots = expand_slots(&schedule, d(2025, 3, 2), d(2025, 3, 16), &chrono_tz::America::New_York);
        assert_eq!(slots.len(), 2);
    }

    #[test]
    fn test_expansion_window_limits() {
        assert!(validate_expansion_window(d(2025, 1, 1), d(2025, 12, 31)).is_ok());
        assert!(validate_expansion_window(d(2025, 2, 1), d(2025, 1, 1)).is_err());
        assert!(validate_expansion_window(d(2025, 1, 1), d(2026, 6, 1)).is_err());
    }

    #[test]
    fn test_local_day_start_in_studio_zone() {
        let start = local_day_start(&chrono_tz::America::Lima, d(2025, 10, 6));
        assert_eq!(start.to_rfc3339(), "2025-10-06T05:00:00+00:00");
        assert_eq!(start.hour(), 5);
    }
}
