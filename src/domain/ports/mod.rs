use crate::domain::models::{
    booking::{Booking, BookingDetails, BookingStatus},
    client::{Client, ClientListing},
    package::{PackageDefinition, PackagePrice, UserPackage},
    schedule::{DayOfWeek, UnifiedSchedule},
    service_type::ServiceType,
    slot::{ScheduleSlot, SlotListing, SlotQuery},
    teacher::Teacher,
    venue::Venue,
};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

#[async_trait]
pub trait TeacherRepository: Send + Sync {
    async fn create(&self, teacher: &Teacher) -> Result<Teacher, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Teacher>, AppError>;
    async fn list(&self) -> Result<Vec<Teacher>, AppError>;
    async fn update(&self, teacher: &Teacher) -> Result<Teacher, AppError>;
    /// Fails with `ReferentialIntegrity` while schedules still reference the teacher.
    async fn delete(&self, id: &str) -> Result<(), AppError>;
}

#[async_trait]
pub trait VenueRepository: Send + Sync {
    async fn create(&self, venue: &Venue) -> Result<Venue, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Venue>, AppError>;
    async fn list(&self) -> Result<Vec<Venue>, AppError>;
    async fn update(&self, venue: &Venue) -> Result<Venue, AppError>;
    /// Fails with `ReferentialIntegrity` while schedules or teachers still reference the venue.
    async fn delete(&self, id: &str) -> Result<(), AppError>;
}

#[async_trait]
pub trait ServiceTypeRepository: Send + Sync {
    async fn create(&self, service_type: &ServiceType) -> Result<ServiceType, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<ServiceType>, AppError>;
    async fn list(&self) -> Result<Vec<ServiceType>, AppError>;
    async fn update(&self, service_type: &ServiceType) -> Result<ServiceType, AppError>;
    async fn delete(&self, id: &str) -> Result<(), AppError>;
}

#[async_trait]
pub trait PackageRepository: Send + Sync {
    async fn create_definition(&self, definition: &PackageDefinition) -> Result<PackageDefinition, AppError>;
    async fn find_definition(&self, id: &str) -> Result<Option<PackageDefinition>, AppError>;
    async fn list_definitions(&self) -> Result<Vec<PackageDefinition>, AppError>;
    async fn update_definition(&self, definition: &PackageDefinition) -> Result<PackageDefinition, AppError>;
    /// Fails with `ReferentialIntegrity` while prices or purchased packages reference it.
    async fn delete_definition(&self, id: &str) -> Result<(), AppError>;

    async fn create_price(&self, price: &PackagePrice) -> Result<PackagePrice, AppError>;
    async fn find_price(&self, id: &str) -> Result<Option<PackagePrice>, AppError>;
    async fn list_prices(&self, definition_id: Option<&str>) -> Result<Vec<PackagePrice>, AppError>;
    async fn update_price(&self, price: &PackagePrice) -> Result<PackagePrice, AppError>;
    async fn delete_price(&self, id: &str) -> Result<(), AppError>;
}

#[async_trait]
pub trait ClientRepository: Send + Sync {
    async fn create(&self, client: &Client) -> Result<Client, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Client>, AppError>;
    async fn list(&self, search: Option<&str>) -> Result<Vec<ClientListing>, AppError>;
    /// Bookings of the client that were not cancelled.
    async fn booking_count(&self, id: &str) -> Result<i64, AppError>;

    async fn create_user_package(&self, package: &UserPackage) -> Result<UserPackage, AppError>;
    async fn find_user_package(&self, id: &str) -> Result<Option<UserPackage>, AppError>;
    async fn list_user_packages(&self, user_id: &str) -> Result<Vec<UserPackage>, AppError>;
}

#[async_trait]
pub trait ScheduleRepository: Send + Sync {
    /// Inserts every schedule in one transaction; nothing is written if any row fails.
    async fn create_batch(&self, schedules: &[UnifiedSchedule]) -> Result<Vec<UnifiedSchedule>, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<UnifiedSchedule>, AppError>;
    async fn list(&self) -> Result<Vec<UnifiedSchedule>, AppError>;
    async fn list_by_day(&self, day: DayOfWeek) -> Result<Vec<UnifiedSchedule>, AppError>;
    async fn update(&self, schedule: &UnifiedSchedule) -> Result<UnifiedSchedule, AppError>;
    /// Deactivating also closes every slot of the schedule that starts after `now`.
    async fn set_availability(&self, id: &str, available: bool, now: DateTime<Utc>) -> Result<Option<UnifiedSchedule>, AppError>;
    /// Fails with `ReferentialIntegrity` once slots have been generated.
    async fn delete(&self, id: &str) -> Result<(), AppError>;
}

#[async_trait]
pub trait SlotRepository: Send + Sync {
    /// Returns the number of slots actually inserted; existing `(schedule, start)` pairs are skipped.
    async fn insert_many(&self, slots: &[ScheduleSlot]) -> Result<u64, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<ScheduleSlot>, AppError>;
    async fn list_by_schedule(&self, schedule_id: &str) -> Result<Vec<ScheduleSlot>, AppError>;
    async fn list_in_range(&self, from: DateTime<Utc>, to: DateTime<Utc>, query: &SlotQuery) -> Result<Vec<SlotListing>, AppError>;
}

#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// Reserves a seat, consumes a package session and inserts the booking in one transaction.
    async fn create_atomic(&self, booking: &Booking) -> Result<Booking, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Booking>, AppError>;
    async fn find_details(&self, id: &str) -> Result<Option<BookingDetails>, AppError>;
    async fn list_by_user(&self, user_id: &str) -> Result<Vec<BookingDetails>, AppError>;
    async fn list_all(&self, status: Option<BookingStatus>) -> Result<Vec<BookingDetails>, AppError>;
    /// Releases the seat and refunds the session. Only pending or confirmed bookings can be cancelled.
    async fn cancel(&self, id: &str) -> Result<Booking, AppError>;
    async fn update_status(&self, id: &str, from: BookingStatus, to: BookingStatus) -> Result<Booking, AppError>;
}
