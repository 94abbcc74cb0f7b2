use serde::{Deserialize, Serialize};
use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use sqlx::FromRow;
use uuid::Uuid;
use crate::domain::models::schedule::{hhmm, DayOfWeek};

#[derive(Debug, Serialize, Deserialize, FromRow, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleSlot {
    pub id: String,
    pub schedule_id: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub capacity: i32,
    pub booked_count: i32,
    pub is_available: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ScheduleSlot {
    pub fn new(schedule_id: String, start: DateTime<Utc>, end: DateTime<Utc>, capacity: i32) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            schedule_id,
            start_time: start,
            end_time: end,
            capacity,
            booked_count: 0,
            is_available: true,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_full(&self) -> bool {
        self.booked_count >= self.capacity
    }

    pub fn is_bookable(&self) -> bool {
        self.is_available && !self.is_full()
    }
}

/// A slot joined with the schedule it was generated from.
#[derive(Debug, FromRow, Clone)]
pub struct SlotListing {
    pub id: String,
    pub schedule_id: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub capacity: i32,
    pub booked_count: i32,
    pub is_available: bool,
    pub teacher_id: Option<String>,
    pub teacher_name: Option<String>,
    pub venue_id: Option<String>,
    pub venue_name: Option<String>,
    pub service_type_id: Option<String>,
    pub service_type_name: Option<String>,
    pub service_duration_min: Option<i32>,
}

#[derive(Debug, Default, Clone)]
pub struct SlotQuery {
    pub available_only: bool,
    pub teacher_id: Option<String>,
    pub venue_id: Option<String>,
    pub service_type_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct EntityRef {
    pub id: String,
    pub name: String,
}

impl EntityRef {
    fn from_parts(id: Option<String>, name: Option<String>) -> Option<Self> {
        match (id, name) {
            (Some(id), Some(name)) => Some(Self { id, name }),
            _ => None,
        }
    }
}

/// Customer-facing view of a bookable slot, expressed in studio-local time.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SlotAvailability {
    pub id: String,
    pub date: NaiveDate,
    #[serde(with = "hhmm")]
    pub time: chrono::NaiveTime,
    pub is_available: bool,
    pub capacity: i32,
    pub booked_count: i32,
    pub duration: i32,
    pub teacher: Option<EntityRef>,
    pub service_type: Option<EntityRef>,
    pub venue: Option<EntityRef>,
    pub day_of_week: DayOfWeek,
}

impl SlotAvailability {
    pub fn from_listing(listing: SlotListing, tz: &Tz) -> Self {
        let local_start = listing.start_time.with_timezone(tz);
        let duration = listing
            .service_duration_min
            .unwrap_or_else(|| (listing.end_time - listing.start_time).num_minutes() as i32);

        Self {
            id: listing.id,
            date: local_start.date_naive(),
            time: local_start.time(),
            is_available: listing.is_available && listing.booked_count < listing.capacity,
            capacity: listing.capacity,
            booked_count: listing.booked_count,
            duration,
            teacher: EntityRef::from_parts(listing.teacher_id, listing.teacher_name),
            service_type: EntityRef::from_parts(listing.service_type_id, listing.service_type_name),
            venue: EntityRef::from_parts(listing.venue_id, listing.venue_name),
            day_of_week: DayOfWeek::from(chrono::Datelike::weekday(&local_start)),
        }
    }

    pub fn is_bookable(&self) -> bool {
        self.is_available && self.booked_count < self.capacity
    }
}
