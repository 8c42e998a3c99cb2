/// Availability views over a service point's day
pub mod availability;
/// Booking admission and status changes
pub mod booking;
