use serde::{Deserialize, Serialize};
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;
use std::str::FromStr;
use uuid::Uuid;
use crate::domain::models::package::UserPackageSummary;
use crate::domain::models::schedule::ParseEnumError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ClientStatus {
    Active,
    Pending,
    Confirmed,
    Completed,
    Cancelled,
    NoShow,
    Inactive,
}

impl ClientStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClientStatus::Active => "active",
            ClientStatus::Pending => "pending",
            ClientStatus::Confirmed => "confirmed",
            ClientStatus::Completed => "completed",
            ClientStatus::Cancelled => "cancelled",
            ClientStatus::NoShow => "no-show",
            ClientStatus::Inactive => "inactive",
        }
    }
}

impl FromStr for ClientStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(ClientStatus::Active),
            "pending" => Ok(ClientStatus::Pending),
            "confirmed" => Ok(ClientStatus::Confirmed),
            "completed" => Ok(ClientStatus::Completed),
            "cancelled" => Ok(ClientStatus::Cancelled),
            "no-show" => Ok(ClientStatus::NoShow),
            "inactive" => Ok(ClientStatus::Inactive),
            other => Err(ParseEnumError::new("status", other)),
        }
    }
}

impl TryFrom<String> for ClientStatus {
    type Error = ParseEnumError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub birth_place: Option<String>,
    #[sqlx(try_from = "String")]
    pub status: ClientStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Client {
    pub fn new(name: String, email: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            name,
            email: email.trim().to_lowercase(),
            phone: None,
            birth_date: None,
            birth_place: None,
            status: ClientStatus::Active,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Admin list row: a client with the number of bookings that were not cancelled.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ClientListing {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub client: Client,
    pub booking_count: i64,
}

impl ClientListing {
    /// A client is recurrent once they have booked more than once.
    pub fn is_recurrent(&self) -> bool {
        self.booking_count > 1
    }
}

#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ClientSummary {
    pub client: Client,
    pub booking_count: i64,
    pub is_recurrent: bool,
    pub packages: Vec<UserPackageSummary>,
}
