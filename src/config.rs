use std::env;
use std::str::FromStr;
use chrono_tz::Tz;
use dotenvy::dotenv;
use crate::domain::services::conflicts::VenuePolicy;
use crate::error::AppError;

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub jwt_secret: String,
    pub auth_issuer: String,
    pub studio_timezone: Tz,
    pub venue_conflict_policy: VenuePolicy,
    pub slot_horizon_weeks: u32,
    pub slot_worker_interval_secs: u64,
}

impl Config {
    /// Reads the process environment, after loading `.env` when present.
    pub fn from_env() -> Result<Self, AppError> {
        dotenv().ok();

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            port: parsed("PORT", 3000)?,
            jwt_secret: required("JWT_SECRET")?,
            auth_issuer: env::var("AUTH_ISSUER").unwrap_or_else(|_| "studio-booking".to_string()),
            studio_timezone: parsed("STUDIO_TIMEZONE", chrono_tz::America::Lima)?,
            venue_conflict_policy: parsed("VENUE_CONFLICT_POLICY", VenuePolicy::Advisory)?,
            slot_horizon_weeks: parsed("SLOT_HORIZON_WEEKS", 4)?,
            slot_worker_interval_secs: parsed("SLOT_WORKER_INTERVAL_SECS", 3600)?,
        })
    }
}

fn required(key: &str) -> Result<String, AppError> {
    env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| AppError::Config(format!("{} must be set", key)))
}

fn parsed<T>(key: &str, default: T) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| AppError::Config(format!("{} has invalid value '{}': {}", key, raw, e))),
        Err(_) => Ok(default),
    }
}
