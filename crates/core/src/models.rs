pub mod booking;
pub mod schedule;
pub mod service_point;
pub mod slot;
