//! Customer booking wizard.
//!
//! Holds everything a client needs to walk a customer from choosing a package to a confirmed
//! booking. It never talks to the server itself: callers submit [`BookingFlow::booking_request`]
//! and report the outcome back through [`BookingFlow::booking_succeeded`] or
//! [`BookingFlow::booking_failed`].

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use crate::domain::models::booking::{Booking, BookingRequest, PaymentMethod};
use crate::domain::models::package::UserPackageSummary;
use crate::domain::models::slot::SlotAvailability;
use crate::domain::services::validation::is_valid_email;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BookingStep {
    SelectPackage,
    SelectSchedule,
    EnterDetails,
    Payment,
    ExternalConfirmation,
    Success,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerDetails {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub birth_place: String,
    pub question: String,
    pub special_requests: Option<String>,
}

impl CustomerDetails {
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.name.trim().is_empty() {
            missing.push("name");
        }
        if !is_valid_email(&self.email) {
            missing.push("email");
        }
        if self.birth_date.is_none() {
            missing.push("birthDate");
        }
        if self.birth_place.trim().is_empty() {
            missing.push("birthPlace");
        }
        if self.question.trim().is_empty() {
            missing.push("question");
        }
        missing
    }

    pub fn is_complete(&self) -> bool {
        self.missing_fields().is_empty()
    }

    fn notes(&self) -> String {
        match self.special_requests.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            Some(requests) => format!("{}\n\nSpecial requests: {}", self.question.trim(), requests),
            None => self.question.trim().to_string(),
        }
    }
}

/// Why a server round-trip failed, as seen by the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "message", rename_all = "camelCase")]
pub enum FlowFailure {
    Validation(String),
    Conflict(String),
    Capacity(String),
    Network(String),
    Auth(String),
}

impl FlowFailure {
    /// Classifies an error envelope returned by the API.
    pub fn from_response(status: u16, code: &str, message: impl Into<String>) -> Self {
        let message = message.into();
        match (status, code) {
            (401 | 403, _) => FlowFailure::Auth(message),
            (_, "capacity_exceeded") => FlowFailure::Capacity(message),
            (409, _) => FlowFailure::Conflict(message),
            (400..=499, _) => FlowFailure::Validation(message),
            _ => FlowFailure::Network(message),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FlowError {
    #[error("cannot leave {0:?} yet")]
    CannotProceed(BookingStep),
    #[error("no step before {0:?}")]
    NoPreviousStep(BookingStep),
    #[error("action not allowed during {actual:?}, expected {expected:?}")]
    WrongStep { expected: BookingStep, actual: BookingStep },
    #[error("package {0} is not available for booking")]
    PackageUnavailable(String),
    #[error("slot {0} is not available for booking")]
    SlotUnavailable(String),
    #[error("missing details: {0}")]
    IncompleteDetails(String),
    #[error("no payment method selected")]
    NoPaymentMethod,
}

#[derive(Debug, Clone)]
pub struct BookingFlow {
    now: DateTime<Utc>,
    today: NaiveDate,
    step: BookingStep,
    packages: Vec<UserPackageSummary>,
    selected_package: Option<UserPackageSummary>,
    slots: Vec<SlotAvailability>,
    show_other_dates: bool,
    selected_slot: Option<SlotAvailability>,
    details: CustomerDetails,
    payment_method: Option<PaymentMethod>,
    booking: Option<Booking>,
    confirmation_acknowledged: bool,
    last_error: Option<FlowFailure>,
    needs_reauth: bool,
}

impl BookingFlow {
    pub fn new(now: DateTime<Utc>, tz: Tz, packages: Vec<UserPackageSummary>) -> Self {
        Self {
            now,
            today: now.with_timezone(&tz).date_naive(),
            step: BookingStep::SelectPackage,
            packages,
            selected_package: None,
            slots: Vec::new(),
            show_other_dates: false,
            selected_slot: None,
            details: CustomerDetails::default(),
            payment_method: None,
            booking: None,
            confirmation_acknowledged: false,
            last_error: None,
            needs_reauth: false,
        }
    }

    pub fn step(&self) -> BookingStep {
        self.step
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    pub fn selected_package(&self) -> Option<&UserPackageSummary> {
        self.selected_package.as_ref()
    }

    pub fn selected_slot(&self) -> Option<&SlotAvailability> {
        self.selected_slot.as_ref()
    }

    pub fn booking(&self) -> Option<&Booking> {
        self.booking.as_ref()
    }

    pub fn last_error(&self) -> Option<&FlowFailure> {
        self.last_error.as_ref()
    }

    pub fn needs_reauth(&self) -> bool {
        self.needs_reauth
    }

    pub fn can_proceed(&self) -> bool {
        match self.step {
            BookingStep::SelectPackage => self
                .selected_package
                .as_ref()
                .is_some_and(|p| p.is_usable_at(self.now)),
            BookingStep::SelectSchedule => self.selected_slot.as_ref().is_some_and(|s| s.is_bookable()),
            BookingStep::EnterDetails => self.details.is_complete(),
            BookingStep::Payment => self.booking.is_some(),
            BookingStep::ExternalConfirmation => self.confirmation_acknowledged,
            BookingStep::Success => false,
        }
    }

    /// Moves one step forward if the current step is satisfied.
    pub fn next(&mut self) -> Result<BookingStep, FlowError> {
        if !self.can_proceed() {
            return Err(FlowError::CannotProceed(self.step));
        }
        self.step = match self.step {
            BookingStep::SelectPackage => BookingStep::SelectSchedule,
            BookingStep::SelectSchedule => BookingStep::EnterDetails,
            BookingStep::EnterDetails => BookingStep::Payment,
            BookingStep::Payment => {
                if self.payment_method.is_some_and(|m| m.requires_confirmation()) {
                    BookingStep::ExternalConfirmation
                } else {
                    BookingStep::Success
                }
            }
            BookingStep::ExternalConfirmation => BookingStep::Success,
            BookingStep::Success => return Err(FlowError::CannotProceed(BookingStep::Success)),
        };
        self.last_error = None;
        Ok(self.step)
    }

    pub fn back(&mut self) -> Result<BookingStep, FlowError> {
        self.step = match self.step {
            BookingStep::SelectSchedule => BookingStep::SelectPackage,
            BookingStep::EnterDetails => BookingStep::SelectSchedule,
            BookingStep::Payment => BookingStep::EnterDetails,
            BookingStep::ExternalConfirmation => BookingStep::Payment,
            step @ (BookingStep::SelectPackage | BookingStep::Success) => {
                return Err(FlowError::NoPreviousStep(step));
            }
        };
        Ok(self.step)
    }

    fn expect_step(&self, expected: BookingStep) -> Result<(), FlowError> {
        if self.step != expected {
            return Err(FlowError::WrongStep { expected, actual: self.step });
        }
        Ok(())
    }

    pub fn select_package(&mut self, package_id: &str) -> Result<(), FlowError> {
        self.expect_step(BookingStep::SelectPackage)?;
        let package = self
            .packages
            .iter()
            .find(|p| p.id == package_id)
            .filter(|p| p.is_usable_at(self.now))
            .cloned()
            .ok_or_else(|| FlowError::PackageUnavailable(package_id.to_string()))?;
        self.selected_package = Some(package);
        Ok(())
    }

    /// Replaces the known slots, e.g. after fetching availability for the selected package.
    pub fn load_slots(&mut self, slots: Vec<SlotAvailability>) {
        if let Some(selected) = &self.selected_slot
            && !slots.iter().any(|s| s.id == selected.id && s.is_bookable())
        {
            self.selected_slot = None;
        }
        self.slots = slots;
    }

    pub fn todays_slots(&self) -> Vec<&SlotAvailability> {
        self.slots
            .iter()
            .filter(|s| s.date == self.today && s.is_bookable())
            .collect()
    }

    /// Bookable slots on other dates; empty until revealed.
    pub fn other_slots(&self) -> Vec<&SlotAvailability> {
        if !self.show_other_dates {
            return Vec::new();
        }
        self.slots
            .iter()
            .filter(|s| s.date != self.today && s.is_bookable())
            .collect()
    }

    pub fn reveal_other_dates(&mut self) {
        self.show_other_dates = true;
    }

    pub fn shows_other_dates(&self) -> bool {
        self.show_other_dates
    }

    /// Picks a visible, bookable slot and advances to the details step.
    pub fn select_slot(&mut self, slot_id: &str) -> Result<BookingStep, FlowError> {
        self.expect_step(BookingStep::SelectSchedule)?;
        let slot = self
            .todays_slots()
            .into_iter()
            .chain(self.other_slots())
            .find(|s| s.id == slot_id)
            .cloned()
            .ok_or_else(|| FlowError::SlotUnavailable(slot_id.to_string()))?;
        self.selected_slot = Some(slot);
        self.next()
    }

    pub fn set_details(&mut self, details: CustomerDetails) {
        self.details = details;
    }

    pub fn choose_payment(&mut self, method: PaymentMethod) -> Result<(), FlowError> {
        self.expect_step(BookingStep::Payment)?;
        self.payment_method = Some(method);
        Ok(())
    }

    /// Request to submit to `POST /api/client/bookings`.
    pub fn booking_request(&self) -> Result<BookingRequest, FlowError> {
        self.expect_step(BookingStep::Payment)?;
        let package = self.selected_package.as_ref().ok_or(FlowError::CannotProceed(BookingStep::SelectPackage))?;
        let slot = self.selected_slot.as_ref().ok_or(FlowError::CannotProceed(BookingStep::SelectSchedule))?;
        let missing = self.details.missing_fields();
        if !missing.is_empty() {
            return Err(FlowError::IncompleteDetails(missing.join(", ")));
        }
        let payment_method = self.payment_method.ok_or(FlowError::NoPaymentMethod)?;

        Ok(BookingRequest {
            user_package_id: package.id.clone(),
            schedule_slot_id: slot.id.clone(),
            payment_method,
            session_type: slot.service_type.as_ref().map(|s| s.name.clone()),
            notes: Some(self.details.notes()),
            phone_number: self.details.phone.clone().filter(|p| !p.trim().is_empty()),
        })
    }

    /// Records the created booking and moves to confirmation or success.
    pub fn booking_succeeded(&mut self, booking: Booking) -> Result<BookingStep, FlowError> {
        self.expect_step(BookingStep::Payment)?;
        self.payment_method = Some(booking.payment_method);
        self.booking = Some(booking);
        self.next()
    }

    /// Annotates the failure and stays on the current step.
    pub fn booking_failed(&mut self, failure: FlowFailure) {
        if matches!(failure, FlowFailure::Auth(_)) {
            self.needs_reauth = true;
        }
        self.last_error = Some(failure);
    }

    pub fn acknowledge_confirmation(&mut self) -> Result<BookingStep, FlowError> {
        self.expect_step(BookingStep::ExternalConfirmation)?;
        self.confirmation_acknowledged = true;
        self.next()
    }

    /// Clears every transient choice and starts over at package selection.
    pub fn book_another(&mut self) {
        self.step = BookingStep::SelectPackage;
        self.selected_package = None;
        self.slots.clear();
        self.show_other_dates = false;
        self.selected_slot = None;
        self.details = CustomerDetails::default();
        self.payment_method = None;
        self.booking = None;
        self.confirmation_acknowledged = false;
        self.last_error = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::booking::NewBookingParams;
    use crate::domain::models::package::UserPackageStatus;
    use crate::domain::models::schedule::DayOfWeek;
    use crate::domain::models::slot::EntityRef;
    use chrono::{Duration, NaiveTime, TimeZone};

    fn now() -> DateTime<Utc> {
        // 2025-10-06 08:00 in Lima
        Utc.with_ymd_and_hms(2025, 10, 6, 13, 0, 0).unwrap()
    }

    fn package(id: &str, remaining: i32) -> UserPackageSummary {
        UserPackageSummary {
            id: id.into(),
            name: "04 MATPASS".into(),
            total_sessions: 4,
            sessions_remaining: remaining,
            expires_at: now() + Duration::days(30),
            status: UserPackageStatus::Active,
        }
    }

    fn slot(id: &str, date: NaiveDate, booked: i32) -> SlotAvailability {
        SlotAvailability {
            id: id.into(),
            date,
            time: NaiveTime::from_hms_opt(13, 15, 0).unwrap(),
            is_available: true,
            capacity: 15,
            booked_count: booked,
            duration: 60,
            teacher: Some(EntityRef { id: "t1".into(), name: "Lucía".into() }),
            service_type: Some(EntityRef { id: "st1".into(), name: "Hatha".into() }),
            venue: None,
            day_of_week: DayOfWeek::Monday,
        }
    }

    fn details() -> CustomerDetails {
        CustomerDetails {
            name: "Ana Pérez".into(),
            email: "ana@example.com".into(),
            phone: Some("+51 999 888 777".into()),
            birth_date: NaiveDate::from_ymd_opt(1990, 4, 12),
            birth_place: "Lima".into(),
            question: "First time, any advice?".into(),
            special_requests: None,
        }
    }

    fn flow() -> BookingFlow {
        BookingFlow::new(now(), chrono_tz::America::Lima, vec![package("p1", 4), package("empty", 0)])
    }

    fn booking_for(request: &BookingRequest) -> Booking {
        Booking::new(NewBookingParams {
            user_id: "u1".into(),
            user_package_id: request.user_package_id.clone(),
            schedule_slot_id: request.schedule_slot_id.clone(),
            session_type: "Hatha".into(),
            notes: request.notes.clone(),
            phone_number: request.phone_number.clone(),
            payment_method: request.payment_method,
        })
    }

    #[test]
    fn test_exhausted_package_cannot_proceed() {
        let mut flow = flow();
        assert!(!flow.can_proceed());
        assert_eq!(flow.select_package("empty"), Err(FlowError::PackageUnavailable("empty".into())));
        assert!(!flow.can_proceed());
        assert_eq!(flow.next(), Err(FlowError::CannotProceed(BookingStep::SelectPackage)));
    }

    #[test]
    fn test_card_payment_goes_straight_to_success() {
        let today = NaiveDate::from_ymd_opt(2025, 10, 6).unwrap();
        let mut flow = flow();
        flow.select_package("p1").unwrap();
        assert_eq!(flow.next(), Ok(BookingStep::SelectSchedule));

        flow.load_slots(vec![slot("s1", today, 0), slot("full", today, 15)]);
        assert_eq!(flow.todays_slots().len(), 1);
        assert_eq!(flow.select_slot("full"), Err(FlowError::SlotUnavailable("full".into())));
        assert_eq!(flow.select_slot("s1"), Ok(BookingStep::EnterDetails));

        assert!(!flow.can_proceed());
        flow.set_details(details());
        assert_eq!(flow.next(), Ok(BookingStep::Payment));

        flow.choose_payment(PaymentMethod::Card).unwrap();
        let request = flow.booking_request().unwrap();
        assert_eq!(request.user_package_id, "p1");
        assert_eq!(request.schedule_slot_id, "s1");
        assert_eq!(request.session_type.as_deref(), Some("Hatha"));

        let booking = booking_for(&request);
        assert_eq!(flow.booking_succeeded(booking), Ok(BookingStep::Success));
        assert!(flow.back().is_err());
    }

    #[test]
    fn test_cash_payment_waits_for_confirmation() {
        let today = NaiveDate::from_ymd_opt(2025, 10, 6).unwrap();
        let mut flow = flow();
        flow.select_package("p1").unwrap();
        flow.next().unwrap();
        flow.load_slots(vec![slot("s1", today, 3)]);
        flow.select_slot("s1").unwrap();
        flow.set_details(details());
        flow.next().unwrap();
        flow.choose_payment(PaymentMethod::Cash).unwrap();

        let booking = booking_for(&flow.booking_request().unwrap());
        assert_eq!(flow.booking_succeeded(booking), Ok(BookingStep::ExternalConfirmation));
        assert!(!flow.can_proceed());
        assert_eq!(flow.acknowledge_confirmation(), Ok(BookingStep::Success));

        flow.book_another();
        assert_eq!(flow.step(), BookingStep::SelectPackage);
        assert!(flow.selected_package().is_none());
        assert!(flow.selected_slot().is_none());
        assert!(flow.booking().is_none());
    }

    #[test]
    fn test_other_dates_hidden_until_revealed() {
        let today = NaiveDate::from_ymd_opt(2025, 10, 6).unwrap();
        let tomorrow = today.succ_opt().unwrap();
        let mut flow = flow();
        flow.select_package("p1").unwrap();
        flow.next().unwrap();
        flow.load_slots(vec![slot("today", today, 0), slot("later", tomorrow, 0)]);

        assert!(flow.other_slots().is_empty());
        assert!(flow.select_slot("later").is_err());

        flow.reveal_other_dates();
        assert_eq!(flow.other_slots().len(), 1);
        assert_eq!(flow.select_slot("later"), Ok(BookingStep::EnterDetails));
    }

    #[test]
    fn test_failures_keep_step_and_flag_reauth() {
        let mut flow = flow();
        flow.select_package("p1").unwrap();
        flow.next().unwrap();

        flow.booking_failed(FlowFailure::from_response(409, "capacity_exceeded", "Slot is full"));
        assert_eq!(flow.step(), BookingStep::SelectSchedule);
        assert_eq!(flow.last_error(), Some(&FlowFailure::Capacity("Slot is full".into())));
        assert!(!flow.needs_reauth());

        flow.booking_failed(FlowFailure::from_response(401, "unauthorized", "Unauthorized"));
        assert!(flow.needs_reauth());
        assert_eq!(flow.step(), BookingStep::SelectSchedule);
    }

    #[test]
    fn test_back_moves_one_step() {
        let mut flow = flow();
        assert_eq!(flow.back(), Err(FlowError::NoPreviousStep(BookingStep::SelectPackage)));
        flow.select_package("p1").unwrap();
        flow.next().unwrap();
        assert_eq!(flow.back(), Ok(BookingStep::SelectPackage));
        // selection survives going back
        assert!(flow.can_proceed());
    }

    #[test]
    fn test_details_validation() {
        let mut incomplete = details();
        incomplete.email = "not-an-email".into();
        incomplete.birth_date = None;
        assert_eq!(incomplete.missing_fields(), vec!["email", "birthDate"]);
        assert!(details().is_complete());
    }
}
