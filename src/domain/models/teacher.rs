use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::{types::Json, FromRow};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Teacher {
    pub id: String,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub bio: Option<String>,
    pub specialties: Json<Vec<String>>,
    pub languages: Json<Vec<String>>,
    pub venue_id: Option<String>,
    pub is_active: bool,
    pub featured: bool,
    pub display_order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Teacher {
    pub fn new(name: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            name,
            email: None,
            phone: None,
            bio: None,
            specialties: Json(Vec::new()),
            languages: Json(Vec::new()),
            venue_id: None,
            is_active: true,
            featured: false,
            display_order: 0,
            created_at: now,
            updated_at: now,
        }
    }
}
