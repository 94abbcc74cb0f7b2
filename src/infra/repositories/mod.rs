pub mod sqlite_booking_repo;
pub mod sqlite_client_repo;
pub mod sqlite_package_repo;
pub mod sqlite_schedule_repo;
pub mod sqlite_service_type_repo;
pub mod sqlite_slot_repo;
pub mod sqlite_teacher_repo;
pub mod sqlite_venue_repo;

pub mod postgres_booking_repo;
pub mod postgres_client_repo;
pub mod postgres_package_repo;
pub mod postgres_schedule_repo;
pub mod postgres_service_type_repo;
pub mod postgres_slot_repo;
pub mod postgres_teacher_repo;
pub mod postgres_venue_repo;
