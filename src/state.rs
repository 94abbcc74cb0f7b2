use std::sync::Arc;
use crate::domain::ports::{
    BookingRepository, ClientRepository, PackageRepository, ScheduleRepository,
    ServiceTypeRepository, SlotRepository, TeacherRepository, VenueRepository,
};
use crate::config::Config;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub teacher_repo: Arc<dyn TeacherRepository>,
    pub venue_repo: Arc<dyn VenueRepository>,
    pub service_type_repo: Arc<dyn ServiceTypeRepository>,
    pub package_repo: Arc<dyn PackageRepository>,
    pub client_repo: Arc<dyn ClientRepository>,
    pub schedule_repo: Arc<dyn ScheduleRepository>,
    pub slot_repo: Arc<dyn SlotRepository>,
    pub booking_repo: Arc<dyn BookingRepository>,
}
