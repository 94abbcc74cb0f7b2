use serde::{Deserialize, Serialize};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc, Weekday};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
#[error("unknown {kind} value: {value}")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

impl ParseEnumError {
    pub fn new(kind: &'static str, value: &str) -> Self {
        Self { kind, value: value.to_string() }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DayOfWeek {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl DayOfWeek {
    pub const ALL: [DayOfWeek; 7] = [
        DayOfWeek::Monday,
        DayOfWeek::Tuesday,
        DayOfWeek::Wednesday,
        DayOfWeek::Thursday,
        DayOfWeek::Friday,
        DayOfWeek::Saturday,
        DayOfWeek::Sunday,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DayOfWeek::Monday => "Monday",
            DayOfWeek::Tuesday => "Tuesday",
            DayOfWeek::Wednesday => "Wednesday",
            DayOfWeek::Thursday => "Thursday",
            DayOfWeek::Friday => "Friday",
            DayOfWeek::Saturday => "Saturday",
            DayOfWeek::Sunday => "Sunday",
        }
    }

    /// Zero-based position in a Monday-first week.
    pub fn index(&self) -> u32 {
        self.to_weekday().num_days_from_monday()
    }

    pub fn to_weekday(self) -> Weekday {
        match self {
            DayOfWeek::Monday => Weekday::Mon,
            DayOfWeek::Tuesday => Weekday::Tue,
            DayOfWeek::Wednesday => Weekday::Wed,
            DayOfWeek::Thursday => Weekday::Thu,
            DayOfWeek::Friday => Weekday::Fri,
            DayOfWeek::Saturday => Weekday::Sat,
            DayOfWeek::Sunday => Weekday::Sun,
        }
    }
}

impl From<Weekday> for DayOfWeek {
    fn from(day: Weekday) -> Self {
        match day {
            Weekday::Mon => DayOfWeek::Monday,
            Weekday::Tue => DayOfWeek::Tuesday,
            Weekday::Wed => DayOfWeek::Wednesday,
            Weekday::Thu => DayOfWeek::Thursday,
            Weekday::Fri => DayOfWeek::Friday,
            Weekday::Sat => DayOfWeek::Saturday,
            Weekday::Sun => DayOfWeek::Sunday,
        }
    }
}

impl FromStr for DayOfWeek {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DayOfWeek::ALL
            .into_iter()
            .find(|d| d.as_str() == s)
            .ok_or_else(|| ParseEnumError::new("dayOfWeek", s))
    }
}

impl TryFrom<String> for DayOfWeek {
    type Error = ParseEnumError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for DayOfWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parses a wall-clock time in `HH:MM` (seconds tolerated).
pub fn parse_clock_time(value: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(value, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
        .ok()
}

pub mod hhmm {
    use chrono::NaiveTime;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&time.format("%H:%M").to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_clock_time(&raw)
            .ok_or_else(|| de::Error::custom(format!("invalid time '{}', expected HH:MM", raw)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScheduleType {
    Teacher,
    Venue,
    General,
}

impl ScheduleType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScheduleType::Teacher => "teacher",
            ScheduleType::Venue => "venue",
            ScheduleType::General => "general",
        }
    }
}

impl FromStr for ScheduleType {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "teacher" => Ok(ScheduleType::Teacher),
            "venue" => Ok(ScheduleType::Venue),
            "general" => Ok(ScheduleType::General),
            other => Err(ParseEnumError::new("type", other)),
        }
    }
}

/// Owner-specific part of a schedule. Each kind carries exactly the references it owns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ScheduleKind {
    #[serde(rename_all = "camelCase")]
    Teacher {
        teacher_id: String,
        venue_id: Option<String>,
        service_type_id: Option<String>,
        teacher_name: Option<String>,
        venue_name: Option<String>,
        service_type_name: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    Venue {
        venue_id: String,
        session_duration_min: Option<i32>,
        venue_name: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    General {
        name: String,
        description: Option<String>,
    },
}

impl ScheduleKind {
    pub fn schedule_type(&self) -> ScheduleType {
        match self {
            ScheduleKind::Teacher { .. } => ScheduleType::Teacher,
            ScheduleKind::Venue { .. } => ScheduleType::Venue,
            ScheduleKind::General { .. } => ScheduleType::General,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnifiedSchedule {
    pub id: String,
    #[serde(flatten)]
    pub kind: ScheduleKind,
    pub day_of_week: DayOfWeek,
    #[serde(with = "hhmm")]
    pub start_time: NaiveTime,
    #[serde(with = "hhmm")]
    pub end_time: NaiveTime,
    pub is_available: bool,
    pub max_bookings: i32,
    pub is_recurrent: bool,
    pub end_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UnifiedSchedule {
    pub fn new(
        kind: ScheduleKind,
        day_of_week: DayOfWeek,
        start_time: NaiveTime,
        end_time: NaiveTime,
        max_bookings: i32,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            kind,
            day_of_week,
            start_time,
            end_time,
            is_available: true,
            max_bookings,
            is_recurrent: false,
            end_date: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn schedule_type(&self) -> ScheduleType {
        self.kind.schedule_type()
    }

    pub fn teacher_id(&self) -> Option<&str> {
        match &self.kind {
            ScheduleKind::Teacher { teacher_id, .. } => Some(teacher_id),
            _ => None,
        }
    }

    /// The venue the schedule takes place at, owned or not.
    pub fn venue_id(&self) -> Option<&str> {
        match &self.kind {
            ScheduleKind::Teacher { venue_id, .. } => venue_id.as_deref(),
            ScheduleKind::Venue { venue_id, .. } => Some(venue_id),
            ScheduleKind::General { .. } => None,
        }
    }

    pub fn teacher_name(&self) -> Option<&str> {
        match &self.kind {
            ScheduleKind::Teacher { teacher_name, .. } => teacher_name.as_deref(),
            _ => None,
        }
    }

    pub fn venue_name(&self) -> Option<&str> {
        match &self.kind {
            ScheduleKind::Teacher { venue_name, .. } | ScheduleKind::Venue { venue_name, .. } => venue_name.as_deref(),
            ScheduleKind::General { .. } => None,
        }
    }

    pub fn label(&self) -> String {
        match &self.kind {
            ScheduleKind::Teacher { teacher_name, venue_name, .. } => format!(
                "{} at {}",
                teacher_name.as_deref().unwrap_or("teacher"),
                venue_name.as_deref().unwrap_or("unassigned venue")
            ),
            ScheduleKind::Venue { venue_name, .. } => venue_name.clone().unwrap_or_else(|| "venue".to_string()),
            ScheduleKind::General { name, .. } => name.clone(),
        }
    }

    pub fn sort_key(&self) -> (u32, NaiveTime) {
        (self.day_of_week.index(), self.start_time)
    }
}

/// Flat storage shape of a schedule, joined with the display names of its references.
#[derive(Debug, FromRow)]
pub struct ScheduleRow {
    pub id: String,
    pub kind: String,
    pub teacher_id: Option<String>,
    pub venue_id: Option<String>,
    pub service_type_id: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub session_duration_min: Option<i32>,
    #[sqlx(try_from = "String")]
    pub day_of_week: DayOfWeek,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub is_available: bool,
    pub max_bookings: i32,
    pub is_recurrent: bool,
    pub end_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub teacher_name: Option<String>,
    pub venue_name: Option<String>,
    pub service_type_name: Option<String>,
}

impl TryFrom<ScheduleRow> for UnifiedSchedule {
    type Error = String;

    fn try_from(row: ScheduleRow) -> Result<Self, Self::Error> {
        let kind = match row.kind.as_str() {
            "teacher" => ScheduleKind::Teacher {
                teacher_id: row.teacher_id.ok_or_else(|| format!("teacher schedule {} has no teacher", row.id))?,
                venue_id: row.venue_id,
                service_type_id: row.service_type_id,
                teacher_name: row.teacher_name,
                venue_name: row.venue_name,
                service_type_name: row.service_type_name,
            },
            "venue" => ScheduleKind::Venue {
                venue_id: row.venue_id.ok_or_else(|| format!("venue schedule {} has no venue", row.id))?,
                session_duration_min: row.session_duration_min,
                venue_name: row.venue_name,
            },
            "general" => ScheduleKind::General {
                name: row.name.unwrap_or_default(),
                description: row.description,
            },
            other => return Err(format!("schedule {} has unknown kind {}", row.id, other)),
        };

        Ok(Self {
            id: row.id,
            kind,
            day_of_week: row.day_of_week,
            start_time: row.start_time,
            end_time: row.end_time,
            is_available: row.is_available,
            max_bookings: row.max_bookings,
            is_recurrent: row.is_recurrent,
            end_date: row.end_date,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Column values bound when persisting a schedule.
pub struct ScheduleColumns<'a> {
    pub kind: &'static str,
    pub teacher_id: Option<&'a str>,
    pub venue_id: Option<&'a str>,
    pub service_type_id: Option<&'a str>,
    pub name: Option<&'a str>,
    pub description: Option<&'a str>,
    pub session_duration_min: Option<i32>,
}

impl UnifiedSchedule {
    pub fn columns(&self) -> ScheduleColumns<'_> {
        match &self.kind {
            ScheduleKind::Teacher { teacher_id, venue_id, service_type_id, .. } => ScheduleColumns {
                kind: "teacher",
                teacher_id: Some(teacher_id),
                venue_id: venue_id.as_deref(),
                service_type_id: service_type_id.as_deref(),
                name: None,
                description: None,
                session_duration_min: None,
            },
            ScheduleKind::Venue { venue_id, session_duration_min, .. } => ScheduleColumns {
                kind: "venue",
                teacher_id: None,
                venue_id: Some(venue_id),
                service_type_id: None,
                name: None,
                description: None,
                session_duration_min: *session_duration_min,
            },
            ScheduleKind::General { name, description } => ScheduleColumns {
                kind: "general",
                teacher_id: None,
                venue_id: None,
                service_type_id: None,
                name: Some(name),
                description: description.as_deref(),
                session_duration_min: None,
            },
        }
    }
}
