use chrono::NaiveDate;
use serde::Deserialize;
use crate::domain::models::booking::BookingStatus;
use crate::domain::models::client::ClientStatus;
use crate::domain::models::package::{PackageType, PricingMode};
use crate::domain::models::schedule::{DayOfWeek, ScheduleType};
use crate::domain::models::service_type::ServiceCategory;
use crate::domain::services::calendar::CalendarMode;

/// Shared by schedule creation and the standalone conflict check.
#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleTemplateRequest {
    #[serde(rename = "type")]
    pub schedule_type: ScheduleType,
    pub teacher_id: Option<String>,
    pub venue_id: Option<String>,
    pub service_type_id: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub session_duration_min: Option<i32>,
    pub day_of_week: Option<DayOfWeek>,
    pub selected_days: Option<Vec<DayOfWeek>>,
    pub start_time: String,
    pub end_time: String,
    pub max_bookings: Option<i32>,
    pub is_available: Option<bool>,
    pub is_recurrent: Option<bool>,
    pub end_date: Option<NaiveDate>,
    /// Schedule being edited; ignored by creation.
    pub schedule_id: Option<String>,
}

/// Body of the conflict check: the candidate template under `schedule`.
#[derive(Deserialize, Debug, Clone)]
pub struct ConflictCheckRequest {
    pub schedule: ScheduleTemplateRequest,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateScheduleRequest {
    pub teacher_id: Option<String>,
    pub venue_id: Option<String>,
    pub service_type_id: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub session_duration_min: Option<i32>,
    pub day_of_week: Option<DayOfWeek>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub max_bookings: Option<i32>,
    pub is_available: Option<bool>,
    pub is_recurrent: Option<bool>,
    pub end_date: Option<NaiveDate>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleListQuery {
    #[serde(rename = "type")]
    pub schedule_type: Option<ScheduleType>,
    pub teacher_id: Option<String>,
    pub venue_id: Option<String>,
    pub day_of_week: Option<DayOfWeek>,
    pub is_available: Option<bool>,
    pub search: Option<String>,
    pub include: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct CalendarQuery {
    pub date: Option<NaiveDate>,
    pub mode: Option<CalendarMode>,
    #[serde(rename = "type")]
    pub schedule_type: Option<ScheduleType>,
    pub teacher_id: Option<String>,
    pub venue_id: Option<String>,
    pub is_available: Option<bool>,
    pub search: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct GenerateSlotsRequest {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct SlotListQuery {
    pub available: Option<bool>,
    pub teacher_id: Option<String>,
    pub venue_id: Option<String>,
    pub service_type_id: Option<String>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

#[derive(Deserialize, Debug)]
pub struct UpdateBookingStatusRequest {
    pub status: BookingStatus,
}

#[derive(Deserialize, Debug, Default)]
pub struct BookingListQuery {
    pub status: Option<BookingStatus>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CreateTeacherRequest {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub bio: Option<String>,
    pub specialties: Option<Vec<String>>,
    pub languages: Option<Vec<String>>,
    pub venue_id: Option<String>,
    pub is_active: Option<bool>,
    pub featured: Option<bool>,
    pub display_order: Option<i32>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTeacherRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub bio: Option<String>,
    pub specialties: Option<Vec<String>>,
    pub languages: Option<Vec<String>>,
    pub venue_id: Option<String>,
    pub is_active: Option<bool>,
    pub featured: Option<bool>,
    pub display_order: Option<i32>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CreateVenueRequest {
    pub name: String,
    pub description: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub capacity: i32,
    pub amenities: Option<Vec<String>>,
    pub is_active: Option<bool>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateVenueRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub capacity: Option<i32>,
    pub amenities: Option<Vec<String>>,
    pub is_active: Option<bool>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CreateServiceTypeRequest {
    pub name: String,
    pub description: Option<String>,
    pub category: ServiceCategory,
    pub duration_min: i32,
    pub min_participants: Option<i32>,
    pub max_participants: Option<i32>,
    pub is_active: Option<bool>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateServiceTypeRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<ServiceCategory>,
    pub duration_min: Option<i32>,
    pub min_participants: Option<i32>,
    pub max_participants: Option<i32>,
    pub is_active: Option<bool>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CreatePackageDefinitionRequest {
    pub name: String,
    pub description: Option<String>,
    pub sessions_count: i32,
    pub session_duration_min: i32,
    pub package_type: Option<PackageType>,
    pub validity_days: i32,
    pub base_price_cents: Option<i64>,
    pub is_active: Option<bool>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePackageDefinitionRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub sessions_count: Option<i32>,
    pub session_duration_min: Option<i32>,
    pub package_type: Option<PackageType>,
    pub validity_days: Option<i32>,
    pub base_price_cents: Option<i64>,
    pub is_active: Option<bool>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CreatePackagePriceRequest {
    pub package_definition_id: String,
    pub currency_code: String,
    pub pricing_mode: PricingMode,
    pub amount_cents: Option<i64>,
    pub exchange_rate: Option<f64>,
    pub is_active: Option<bool>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePackagePriceRequest {
    pub currency_code: Option<String>,
    pub pricing_mode: Option<PricingMode>,
    pub amount_cents: Option<i64>,
    pub exchange_rate: Option<f64>,
    pub is_active: Option<bool>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct PriceListQuery {
    pub package_definition_id: Option<String>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CreateClientRequest {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub birth_place: Option<String>,
    pub status: Option<ClientStatus>,
}

#[derive(Deserialize, Debug, Default)]
pub struct ClientListQuery {
    pub search: Option<String>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct GrantPackageRequest {
    pub user_id: String,
    pub package_definition_id: String,
}
