use chrono::{Datelike, Duration, NaiveDate, NaiveTime};
use chrono_tz::Tz;
use icalendar::{Calendar, Component, Event as IcalEvent, EventLike, EventStatus};
use serde::{Deserialize, Serialize};
use crate::domain::models::booking::{BookingDetails, BookingStatus};
use crate::domain::models::schedule::{hhmm, DayOfWeek, ScheduleType, UnifiedSchedule};
use crate::domain::services::recurrence::occurs_on;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CalendarMode {
    #[default]
    Week,
    Month,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEntry {
    pub schedule_id: String,
    #[serde(rename = "type")]
    pub schedule_type: ScheduleType,
    pub label: String,
    #[serde(with = "hhmm")]
    pub start_time: NaiveTime,
    #[serde(with = "hhmm")]
    pub end_time: NaiveTime,
    pub is_available: bool,
    pub max_bookings: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub day_of_week: DayOfWeek,
    pub in_current_period: bool,
    pub schedules: Vec<CalendarEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarView {
    pub mode: CalendarMode,
    pub reference_date: NaiveDate,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub days: Vec<CalendarDay>,
}

pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

pub fn week_end(date: NaiveDate) -> NaiveDate {
    week_start(date) + Duration::days(6)
}

/// First and last displayed date. Months are padded out to whole Monday-Sunday weeks.
pub fn visible_range(mode: CalendarMode, reference: NaiveDate) -> (NaiveDate, NaiveDate) {
    match mode {
        CalendarMode::Week => (week_start(reference), week_end(reference)),
        CalendarMode::Month => {
            let first = reference.with_day(1).unwrap_or(reference);
            let next_month_first = if first.month() == 12 {
                NaiveDate::from_ymd_opt(first.year() + 1, 1, 1)
            } else {
                NaiveDate::from_ymd_opt(first.year(), first.month() + 1, 1)
            };
            let last = next_month_first.map(|d| d - Duration::days(1)).unwrap_or(first);
            (week_start(first), week_end(last))
        }
    }
}

/// Places each schedule on the displayed dates it occurs on. One-off schedules show up once at most.
pub fn build_calendar(mode: CalendarMode, reference: NaiveDate, schedules: &[UnifiedSchedule], tz: &Tz) -> CalendarView {
    let (start, end) = visible_range(mode, reference);

    let days = start
        .iter_days()
        .take_while(|date| *date <= end)
        .map(|date| {
            let day_of_week = DayOfWeek::from(date.weekday());
            let mut entries: Vec<CalendarEntry> = schedules
                .iter()
                .filter(|s| occurs_on(s, date, tz))
                .map(|s| CalendarEntry {
                    schedule_id: s.id.clone(),
                    schedule_type: s.schedule_type(),
                    label: s.label(),
                    start_time: s.start_time,
                    end_time: s.end_time,
                    is_available: s.is_available,
                    max_bookings: s.max_bookings,
                })
                .collect();
            entries.sort_by_key(|e| e.start_time);

            CalendarDay {
                date,
                day_of_week,
                in_current_period: match mode {
                    CalendarMode::Week => true,
                    CalendarMode::Month => date.month() == reference.month() && date.year() == reference.year(),
                },
                schedules: entries,
            }
        })
        .collect();

    CalendarView { mode, reference_date: reference, start, end, days }
}

/// Generates an iCalendar (.ics) string for a specific booking
pub fn generate_ics(details: &BookingDetails) -> String {
    let mut calendar = Calendar::new();

    let mut description = format!("Booking reference: {}", details.booking.reference);
    if let Some(notes) = &details.booking.notes {
        description.push('\n');
        description.push_str(notes);
    }

    let mut ical_event = IcalEvent::new();
    ical_event
        .summary(&details.title())
        .description(&description)
        .starts(details.start_time)
        .ends(details.end_time)
        .uid(&details.booking.id);

    if let Some(venue) = &details.venue_name {
        ical_event.location(venue);
    }

    ical_event.status(match details.booking.status {
        BookingStatus::Pending => EventStatus::Tentative,
        BookingStatus::Cancelled => EventStatus::Cancelled,
        _ => EventStatus::Confirmed,
    });

    calendar.push(ical_event.done());
    calendar.to_string()
}
