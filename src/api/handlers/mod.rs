pub mod booking;
pub mod client;
pub mod conflict;
pub mod health;
pub mod package;
pub mod schedule;
pub mod service_type;
pub mod slot;
pub mod teacher;
pub mod venue;
