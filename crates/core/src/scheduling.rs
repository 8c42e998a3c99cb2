//! Availability pipeline: resolve each post's window, walk it into slots,
//! subtract occupancy, aggregate per point.

pub mod availability;
pub mod occupancy;
pub mod resolver;
pub mod slots;

#[cfg(test)]
pub(crate) mod testing;
