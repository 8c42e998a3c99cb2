use chrono::{NaiveDate, NaiveTime};
use thiserror::Error;
use uuid::Uuid;

use crate::models::booking::BookingStatus;

#[derive(Error, Debug)]
pub enum BookingError {
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not available: {reason}")]
    NotWorking { reason: String },

    #[error("All posts occupied: {occupied} of {total} in use, {available} available")]
    CapacityExceeded {
        total: usize,
        occupied: usize,
        available: usize,
    },

    #[error("Slot no longer available: {0}")]
    Conflict(String),

    #[error("Invalid status transition from {from} to {to}")]
    InvalidTransition {
        from: BookingStatus,
        to: BookingStatus,
    },

    #[error("Database error: {0}")]
    Database(#[from] eyre::Report),

    #[error("Internal server error: {0}")]
    Internal(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl BookingError {
    pub fn not_working(reason: impl Into<String>) -> Self {
        BookingError::NotWorking {
            reason: reason.into(),
        }
    }

    /// Whether the client should re-query availability and try again.
    pub fn is_retryable(&self) -> bool {
        matches!(self, BookingError::Conflict(_))
    }
}

pub type BookingResult<T> = Result<T, BookingError>;

/// A post's stored hours cannot be turned into a working window.
///
/// Recovered inside the scheduling pipeline: the post is treated as
/// non-working for the date and the fault is logged.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScheduleConfigError {
    #[error("malformed time {value:?} for post {post_id} on {date}")]
    MalformedTime {
        post_id: Uuid,
        date: NaiveDate,
        value: String,
    },

    #[error("missing {what} for post {post_id} on {date}")]
    MissingHours {
        post_id: Uuid,
        date: NaiveDate,
        what: &'static str,
    },

    #[error("empty working window {open}-{close} for post {post_id} on {date}")]
    EmptyWindow {
        post_id: Uuid,
        date: NaiveDate,
        open: NaiveTime,
        close: NaiveTime,
    },

    #[error("slot duration {minutes} is not positive for post {post_id}")]
    InvalidSlotDuration { post_id: Uuid, minutes: i32 },
}
