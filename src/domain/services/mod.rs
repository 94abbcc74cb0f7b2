pub mod aggregator;
pub mod booking_flow;
pub mod calendar;
pub mod conflicts;
pub mod recurrence;
pub mod validation;
