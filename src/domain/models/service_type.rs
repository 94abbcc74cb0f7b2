use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use std::str::FromStr;
use uuid::Uuid;
use crate::domain::models::schedule::ParseEnumError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceCategory {
    Class,
    Workshop,
    TrainingProgram,
}

impl ServiceCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceCategory::Class => "class",
            ServiceCategory::Workshop => "workshop",
            ServiceCategory::TrainingProgram => "training_program",
        }
    }
}

impl FromStr for ServiceCategory {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "class" => Ok(ServiceCategory::Class),
            "workshop" => Ok(ServiceCategory::Workshop),
            "training_program" => Ok(ServiceCategory::TrainingProgram),
            other => Err(ParseEnumError::new("category", other)),
        }
    }
}

impl TryFrom<String> for ServiceCategory {
    type Error = ParseEnumError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ServiceType {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    #[sqlx(try_from = "String")]
    pub category: ServiceCategory,
    pub duration_min: i32,
    pub min_participants: i32,
    pub max_participants: Option<i32>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ServiceType {
    pub fn new(name: String, category: ServiceCategory, duration_min: i32) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            name,
            description: None,
            category,
            duration_min,
            min_participants: 1,
            max_participants: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn participant_bounds_valid(&self) -> bool {
        self.min_participants >= 1 && self.max_participants.is_none_or(|max| self.min_participants <= max)
    }
}
