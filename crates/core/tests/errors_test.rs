use std::error::Error;
use tirebook_core::errors::{BookingError, BookingResult, ScheduleConfigError};
use tirebook_core::models::booking::BookingStatus;
use uuid::Uuid;

#[test]
fn test_booking_error_display() {
    let not_found = BookingError::NotFound("Service point not found".to_string());
    let validation = BookingError::Validation("Invalid input".to_string());
    let not_working = BookingError::not_working("outside working hours");
    let capacity = BookingError::CapacityExceeded {
        total: 2,
        occupied: 2,
        available: 0,
    };
    let conflict = BookingError::Conflict("lost a concurrent write".to_string());
    let transition = BookingError::InvalidTransition {
        from: BookingStatus::Completed,
        to: BookingStatus::Confirmed,
    };
    let database = BookingError::Database(eyre::eyre!("Database connection failed"));

    assert_eq!(
        not_found.to_string(),
        "Resource not found: Service point not found"
    );
    assert_eq!(validation.to_string(), "Validation error: Invalid input");
    assert_eq!(not_working.to_string(), "Not available: outside working hours");
    assert_eq!(
        capacity.to_string(),
        "All posts occupied: 2 of 2 in use, 0 available"
    );
    assert_eq!(
        conflict.to_string(),
        "Slot no longer available: lost a concurrent write"
    );
    assert_eq!(
        transition.to_string(),
        "Invalid status transition from completed to confirmed"
    );
    assert!(database.to_string().contains("Database error:"));
}

#[test]
fn test_only_races_are_retryable() {
    assert!(BookingError::Conflict("x".into()).is_retryable());
    assert!(!BookingError::CapacityExceeded {
        total: 1,
        occupied: 1,
        available: 0
    }
    .is_retryable());
    assert!(!BookingError::not_working("non-working day").is_retryable());
    assert!(!BookingError::Validation("x".into()).is_retryable());
    assert!(!BookingError::Database(eyre::eyre!("down")).is_retryable());
}

#[test]
fn test_error_conversion() {
    let io_error = std::io::Error::new(std::io::ErrorKind::Other, "IO error");
    let booking_error: BookingError = BookingError::from(Box::new(io_error) as Box<dyn Error + Send + Sync>);
    assert!(matches!(booking_error, BookingError::Internal(_)));
    assert!(booking_error.source().is_some());

    let report: BookingError = eyre::eyre!("pool closed").into();
    assert!(matches!(report, BookingError::Database(_)));
}

#[test]
fn test_booking_result() {
    let result: BookingResult<i32> = Ok(42);
    assert_eq!(result.unwrap(), 42);

    let result: BookingResult<i32> = Err(BookingError::NotFound("Not found".to_string()));
    assert!(result.is_err());
}

#[test]
fn test_schedule_config_error_display() {
    let post_id = Uuid::nil();
    let date = chrono::NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();

    let malformed = ScheduleConfigError::MalformedTime {
        post_id,
        date,
        value: "9am".to_string(),
    };
    assert_eq!(
        malformed.to_string(),
        format!("malformed time \"9am\" for post {post_id} on 2024-01-02")
    );

    let duration = ScheduleConfigError::InvalidSlotDuration { post_id, minutes: 0 };
    assert!(duration.to_string().contains("not positive"));
}
