use serde::{Deserialize, Serialize};
use chrono::{DateTime, Duration, Utc};
use sqlx::FromRow;
use std::str::FromStr;
use uuid::Uuid;
use crate::domain::models::schedule::ParseEnumError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageType {
    Individual,
    Group,
    Mixed,
}

impl PackageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PackageType::Individual => "individual",
            PackageType::Group => "group",
            PackageType::Mixed => "mixed",
        }
    }
}

impl FromStr for PackageType {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "individual" => Ok(PackageType::Individual),
            "group" => Ok(PackageType::Group),
            "mixed" => Ok(PackageType::Mixed),
            other => Err(ParseEnumError::new("packageType", other)),
        }
    }
}

impl TryFrom<String> for PackageType {
    type Error = ParseEnumError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PricingMode {
    Custom,
    Calculated,
}

impl PricingMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            PricingMode::Custom => "custom",
            PricingMode::Calculated => "calculated",
        }
    }
}

impl FromStr for PricingMode {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "custom" => Ok(PricingMode::Custom),
            "calculated" => Ok(PricingMode::Calculated),
            other => Err(ParseEnumError::new("pricingMode", other)),
        }
    }
}

impl TryFrom<String> for PricingMode {
    type Error = ParseEnumError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PackageDefinition {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub sessions_count: i32,
    pub session_duration_min: i32,
    #[sqlx(try_from = "String")]
    pub package_type: PackageType,
    pub validity_days: i32,
    pub base_price_cents: Option<i64>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PackageDefinition {
    pub fn new(name: String, sessions_count: i32, session_duration_min: i32, validity_days: i32) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            name,
            description: None,
            sessions_count,
            session_duration_min,
            package_type: PackageType::Individual,
            validity_days,
            base_price_cents: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PackagePrice {
    pub id: String,
    pub package_definition_id: String,
    pub currency_code: String,
    pub amount_cents: i64,
    #[sqlx(try_from = "String")]
    pub pricing_mode: PricingMode,
    pub exchange_rate: Option<f64>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PackagePrice {
    pub fn new(package_definition_id: String, currency_code: String, amount_cents: i64, pricing_mode: PricingMode) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            package_definition_id,
            currency_code,
            amount_cents,
            pricing_mode,
            exchange_rate: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Amount in major units with two decimals, e.g. `190.00`.
    pub fn display_amount(&self) -> String {
        format!("{}.{:02}", self.amount_cents / 100, (self.amount_cents % 100).abs())
    }
}

/// Converts a base price into another currency for `calculated` pricing.
pub fn calculated_amount(base_price_cents: i64, exchange_rate: f64) -> Option<i64> {
    if base_price_cents < 0 || !exchange_rate.is_finite() || exchange_rate <= 0.0 {
        return None;
    }
    Some((base_price_cents as f64 * exchange_rate).round() as i64)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserPackageStatus {
    Active,
    Expired,
    Cancelled,
}

impl UserPackageStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserPackageStatus::Active => "active",
            UserPackageStatus::Expired => "expired",
            UserPackageStatus::Cancelled => "cancelled",
        }
    }
}

impl FromStr for UserPackageStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(UserPackageStatus::Active),
            "expired" => Ok(UserPackageStatus::Expired),
            "cancelled" => Ok(UserPackageStatus::Cancelled),
            other => Err(ParseEnumError::new("status", other)),
        }
    }
}

impl TryFrom<String> for UserPackageStatus {
    type Error = ParseEnumError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
#[serde(rename_all = "camelCase")]
pub struct UserPackage {
    pub id: String,
    pub user_id: String,
    pub package_definition_id: String,
    pub package_name: String,
    pub total_sessions: i32,
    pub sessions_used: i32,
    pub expires_at: DateTime<Utc>,
    #[sqlx(try_from = "String")]
    pub status: UserPackageStatus,
    pub purchased_at: DateTime<Utc>,
}

impl UserPackage {
    pub fn purchase(user_id: String, definition: &PackageDefinition) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            user_id,
            package_definition_id: definition.id.clone(),
            package_name: definition.name.clone(),
            total_sessions: definition.sessions_count,
            sessions_used: 0,
            expires_at: now + Duration::days(definition.validity_days as i64),
            status: UserPackageStatus::Active,
            purchased_at: now,
        }
    }

    pub fn sessions_remaining(&self) -> i32 {
        (self.total_sessions - self.sessions_used).max(0)
    }

    pub fn summary(&self) -> UserPackageSummary {
        UserPackageSummary {
            id: self.id.clone(),
            name: self.package_name.clone(),
            total_sessions: self.total_sessions,
            sessions_remaining: self.sessions_remaining(),
            expires_at: self.expires_at,
            status: self.status,
        }
    }
}

/// What a customer sees when choosing which package to book with.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserPackageSummary {
    pub id: String,
    pub name: String,
    pub total_sessions: i32,
    pub sessions_remaining: i32,
    pub expires_at: DateTime<Utc>,
    pub status: UserPackageStatus,
}

impl UserPackageSummary {
    pub fn is_usable_at(&self, now: DateTime<Utc>) -> bool {
        self.status == UserPackageStatus::Active && self.sessions_remaining > 0 && self.expires_at > now
    }
}
