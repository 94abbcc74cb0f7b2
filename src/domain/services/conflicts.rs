use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use crate::domain::models::schedule::{ParseEnumError, UnifiedSchedule};
use crate::domain::models::teacher::Teacher;
use crate::domain::models::venue::Venue;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictType {
    TeacherDoubleBooked,
    VenueOverlap,
    CapacityExceeded,
    TeacherInactive,
    VenueInactive,
}

impl ConflictType {
    pub fn is_venue_related(&self) -> bool {
        matches!(self, ConflictType::VenueOverlap | ConflictType::CapacityExceeded | ConflictType::VenueInactive)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conflict {
    #[serde(rename = "type")]
    pub conflict_type: ConflictType,
    pub message: String,
    pub severity: Severity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conflicting_schedule_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConflictReport {
    pub has_conflicts: bool,
    pub conflicts: Vec<Conflict>,
}

impl ConflictReport {
    fn push(&mut self, conflict: Conflict) {
        self.conflicts.push(conflict);
        self.has_conflicts = true;
    }

    pub fn has_errors(&self) -> bool {
        self.conflicts.iter().any(|c| c.severity == Severity::Error)
    }

    /// Whether the report should stop a write under the given venue policy.
    pub fn blocks(&self, policy: VenuePolicy) -> bool {
        policy == VenuePolicy::Blocking
            && self
                .conflicts
                .iter()
                .any(|c| c.severity == Severity::Error && c.conflict_type.is_venue_related())
    }

    pub fn merge(&mut self, other: ConflictReport) {
        for conflict in other.conflicts {
            if !self.conflicts.contains(&conflict) {
                self.push(conflict);
            }
        }
    }
}

/// How venue-level overlaps are treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VenuePolicy {
    #[default]
    Advisory,
    Blocking,
}

impl VenuePolicy {
    fn severity(&self) -> Severity {
        match self {
            VenuePolicy::Advisory => Severity::Warning,
            VenuePolicy::Blocking => Severity::Error,
        }
    }
}

impl FromStr for VenuePolicy {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "advisory" => Ok(VenuePolicy::Advisory),
            "blocking" => Ok(VenuePolicy::Blocking),
            _ => Err(ParseEnumError::new("venue policy", s)),
        }
    }
}

/// Entities referenced by the candidate, loaded by the caller.
#[derive(Debug, Default)]
pub struct ConflictContext<'a> {
    pub teacher: Option<&'a Teacher>,
    pub venue: Option<&'a Venue>,
    pub policy: VenuePolicy,
}

/// Half-open ranges `[s1, e1)` and `[s2, e2)` overlap; touching ends do not.
pub fn ranges_overlap(s1: NaiveTime, e1: NaiveTime, s2: NaiveTime, e2: NaiveTime) -> bool {
    s1 < e2 && s2 < e1
}

pub fn check_conflicts(candidate: &UnifiedSchedule, existing: &[UnifiedSchedule], ctx: &ConflictContext<'_>) -> ConflictReport {
    let mut report = ConflictReport::default();

    if let Some(teacher) = ctx.teacher
        && !teacher.is_active
    {
        report.push(Conflict {
            conflict_type: ConflictType::TeacherInactive,
            message: format!("Teacher {} is inactive", teacher.name),
            severity: Severity::Error,
            conflicting_schedule_id: None,
        });
    }

    if let Some(venue) = ctx.venue
        && !venue.is_active
    {
        report.push(Conflict {
            conflict_type: ConflictType::VenueInactive,
            message: format!("Venue {} is inactive", venue.name),
            severity: Severity::Error,
            conflicting_schedule_id: None,
        });
    }

    let overlapping = existing.iter().filter(|other| {
        other.is_available
            && other.id != candidate.id
            && other.day_of_week == candidate.day_of_week
            && ranges_overlap(candidate.start_time, candidate.end_time, other.start_time, other.end_time)
    });

    let mut venue_load = candidate.max_bookings;
    for other in overlapping {
        let same_teacher = matches!((candidate.teacher_id(), other.teacher_id()), (Some(a), Some(b)) if a == b);
        let same_venue = matches!((candidate.venue_id(), other.venue_id()), (Some(a), Some(b)) if a == b);

        if same_venue {
            venue_load += other.max_bookings;
        }

        if same_teacher {
            report.push(Conflict {
                conflict_type: ConflictType::TeacherDoubleBooked,
                message: format!(
                    "{} is already scheduled on {} {}-{}",
                    other.teacher_name().unwrap_or("This teacher"),
                    other.day_of_week,
                    other.start_time.format("%H:%M"),
                    other.end_time.format("%H:%M")
                ),
                severity: Severity::Error,
                conflicting_schedule_id: Some(other.id.clone()),
            });
        } else if same_venue {
            report.push(Conflict {
                conflict_type: ConflictType::VenueOverlap,
                message: format!(
                    "{} is already in use on {} {}-{} ({})",
                    other.venue_name().unwrap_or("The venue"),
                    other.day_of_week,
                    other.start_time.format("%H:%M"),
                    other.end_time.format("%H:%M"),
                    other.label()
                ),
                severity: ctx.policy.severity(),
                conflicting_schedule_id: Some(other.id.clone()),
            });
        }
    }

    if let Some(venue) = ctx.venue
        && candidate.venue_id() == Some(venue.id.as_str())
        && venue_load > venue.capacity
    {
        report.push(Conflict {
            conflict_type: ConflictType::CapacityExceeded,
            message: format!(
                "Combined bookings ({}) exceed the capacity of {} ({})",
                venue_load, venue.name, venue.capacity
            ),
            severity: ctx.policy.severity(),
            conflicting_schedule_id: None,
        });
    }

    report
}
