pub mod auth;
pub mod booking;
pub mod client;
pub mod package;
pub mod schedule;
pub mod service_type;
pub mod slot;
pub mod teacher;
pub mod venue;
