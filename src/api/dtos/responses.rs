use serde::Serialize;
use crate::domain::models::booking::{Booking, BookingDetails};
use crate::domain::models::client::ClientListing;
use crate::domain::models::package::UserPackageSummary;
use crate::domain::models::schedule::UnifiedSchedule;
use crate::domain::models::slot::{ScheduleSlot, SlotAvailability};
use crate::domain::services::aggregator::Pagination;
use crate::domain::services::calendar::CalendarView;
use crate::domain::services::conflicts::ConflictReport;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[derive(Serialize)]
pub struct DataResponse<T: Serialize> {
    pub success: bool,
    pub data: T,
}

impl<T: Serialize> DataResponse<T> {
    pub fn new(data: T) -> Self {
        Self { success: true, data }
    }
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self { success: true, message: message.into() }
    }
}

#[derive(Serialize)]
pub struct ScheduleListResponse {
    pub success: bool,
    pub schedules: Vec<UnifiedSchedule>,
    pub pagination: Pagination,
}

#[derive(Serialize)]
pub struct ScheduleResponse {
    pub success: bool,
    pub schedule: UnifiedSchedule,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conflicts: Option<ConflictReport>,
}

#[derive(Serialize)]
pub struct ScheduleWriteResponse {
    pub success: bool,
    pub schedules: Vec<UnifiedSchedule>,
    pub conflicts: ConflictReport,
}

#[derive(Serialize)]
pub struct CalendarResponse {
    pub success: bool,
    pub calendar: CalendarView,
}

#[derive(Serialize)]
pub struct SlotAvailabilityResponse {
    pub success: bool,
    pub slots: Vec<SlotAvailability>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleSlotsResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<u64>,
    pub slots: Vec<ScheduleSlot>,
}

#[derive(Serialize)]
pub struct BookingResponse {
    pub success: bool,
    pub booking: Booking,
}

#[derive(Serialize)]
pub struct BookingListResponse {
    pub success: bool,
    pub bookings: Vec<BookingDetails>,
}

#[derive(Serialize)]
pub struct PackagesResponse {
    pub success: bool,
    pub packages: Vec<UserPackageSummary>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientListItem {
    #[serde(flatten)]
    pub listing: ClientListing,
    pub is_recurrent: bool,
}

impl From<ClientListing> for ClientListItem {
    fn from(listing: ClientListing) -> Self {
        let is_recurrent = listing.is_recurrent();
        Self { listing, is_recurrent }
    }
}
