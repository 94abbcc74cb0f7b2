use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use rand::{distributions::Alphanumeric, Rng};
use std::str::FromStr;
use crate::domain::models::schedule::ParseEnumError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Completed,
    Cancelled,
    NoShow,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Completed => "completed",
            BookingStatus::Cancelled => "cancelled",
            BookingStatus::NoShow => "no-show",
        }
    }

    pub fn can_transition_to(&self, next: BookingStatus) -> bool {
        use BookingStatus::*;
        matches!(
            (self, next),
            (Pending, Confirmed) | (Pending, Cancelled) | (Confirmed, Completed) | (Confirmed, Cancelled) | (Confirmed, NoShow)
        )
    }
}

impl FromStr for BookingStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(BookingStatus::Pending),
            "confirmed" => Ok(BookingStatus::Confirmed),
            "completed" => Ok(BookingStatus::Completed),
            "cancelled" => Ok(BookingStatus::Cancelled),
            "no-show" => Ok(BookingStatus::NoShow),
            other => Err(ParseEnumError::new("status", other)),
        }
    }
}

impl TryFrom<String> for BookingStatus {
    type Error = ParseEnumError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    #[default]
    Card,
    Cash,
    BankTransfer,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Card => "card",
            PaymentMethod::Cash => "cash",
            PaymentMethod::BankTransfer => "bank_transfer",
        }
    }

    /// Cash and transfers are settled outside the app and confirmed later by staff.
    pub fn requires_confirmation(&self) -> bool {
        !matches!(self, PaymentMethod::Card)
    }

    pub fn initial_status(&self) -> BookingStatus {
        if self.requires_confirmation() {
            BookingStatus::Pending
        } else {
            BookingStatus::Confirmed
        }
    }
}

impl FromStr for PaymentMethod {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "card" => Ok(PaymentMethod::Card),
            "cash" => Ok(PaymentMethod::Cash),
            "bank_transfer" => Ok(PaymentMethod::BankTransfer),
            other => Err(ParseEnumError::new("paymentMethod", other)),
        }
    }
}

impl TryFrom<String> for PaymentMethod {
    type Error = ParseEnumError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: String,
    pub user_id: String,
    pub user_package_id: String,
    pub schedule_slot_id: String,
    #[sqlx(try_from = "String")]
    pub status: BookingStatus,
    pub session_type: String,
    pub notes: Option<String>,
    pub phone_number: Option<String>,
    #[sqlx(try_from = "String")]
    pub payment_method: PaymentMethod,
    pub reference: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub struct NewBookingParams {
    pub user_id: String,
    pub user_package_id: String,
    pub schedule_slot_id: String,
    pub session_type: String,
    pub notes: Option<String>,
    pub phone_number: Option<String>,
    pub payment_method: PaymentMethod,
}

impl Booking {
    pub fn new(params: NewBookingParams) -> Self {
        let reference: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(8)
            .map(char::from)
            .collect::<String>()
            .to_uppercase();

        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            user_id: params.user_id,
            user_package_id: params.user_package_id,
            schedule_slot_id: params.schedule_slot_id,
            status: params.payment_method.initial_status(),
            session_type: params.session_type,
            notes: params.notes,
            phone_number: params.phone_number,
            payment_method: params.payment_method,
            reference,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Body a customer submits to book a slot with one of their packages.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BookingRequest {
    pub user_package_id: String,
    pub schedule_slot_id: String,
    /// Card when omitted: the card form settles before the booking is posted.
    #[serde(default)]
    pub payment_method: PaymentMethod,
    pub session_type: Option<String>,
    pub notes: Option<String>,
    pub phone_number: Option<String>,
}

/// A booking joined with the slot and schedule it occupies.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
#[serde(rename_all = "camelCase")]
pub struct BookingDetails {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub booking: Booking,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub package_name: String,
    pub teacher_name: Option<String>,
    pub venue_name: Option<String>,
    pub schedule_name: Option<String>,
}

impl BookingDetails {
    pub fn title(&self) -> String {
        match (&self.teacher_name, &self.schedule_name) {
            (Some(teacher), _) => format!("{} with {}", self.booking.session_type, teacher),
            (None, Some(name)) => name.clone(),
            (None, None) => self.booking.session_type.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_transitions_follow_lifecycle() {
        use BookingStatus::*;
        assert!(Pending.can_transition_to(Confirmed));
        assert!(Pending.can_transition_to(Cancelled));
        assert!(Confirmed.can_transition_to(NoShow));
        assert!(Confirmed.can_transition_to(Completed));
        assert!(!Pending.can_transition_to(Completed));
        assert!(!Cancelled.can_transition_to(Confirmed));
        assert!(!Completed.can_transition_to(Cancelled));
        assert!(!Confirmed.can_transition_to(Confirmed));
    }

    #[test]
    fn test_card_bookings_skip_confirmation() {
        assert_eq!(PaymentMethod::Card.initial_status(), BookingStatus::Confirmed);
        assert_eq!(PaymentMethod::Cash.initial_status(), BookingStatus::Pending);
        assert_eq!(PaymentMethod::BankTransfer.initial_status(), BookingStatus::Pending);
    }

    #[test]
    fn test_reference_is_eight_uppercase_chars() {
        let booking = Booking::new(NewBookingParams {
            user_id: "u".into(),
            user_package_id: "p".into(),
            schedule_slot_id: "s".into(),
            session_type: "group".into(),
            notes: None,
            phone_number: None,
            payment_method: PaymentMethod::Card,
        });
        assert_eq!(booking.reference.len(), 8);
        assert!(booking.reference.chars().all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()));
    }
}
