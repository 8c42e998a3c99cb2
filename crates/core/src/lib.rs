//! # TireBook core
//!
//! Domain model and scheduling core of the tire-service booking backend:
//! per-post schedule resolution, slot generation, occupancy, point-level
//! availability views and booking admission control.
//!
//! Persistence and notification delivery are reached through the ports in
//! [`store`]; this crate performs no I/O of its own.

pub mod admission;
pub mod config;
pub mod context;
pub mod errors;
pub mod models;
pub mod scheduling;
pub mod store;
pub mod time;
