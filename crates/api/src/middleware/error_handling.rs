//! # Error Handling Middleware
//!
//! Maps `BookingError` to HTTP status codes and JSON error bodies so every
//! handler reports failures the same way.
//!
//! Only a lost admission race carries `"retryable": true`: the client should
//! re-query availability and try again rather than resubmit blindly. A full
//! window carries the post counts instead, so the client can offer other
//! times.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use tirebook_core::errors::BookingError;
use tracing::error;

/// Application error wrapper that provides HTTP status code mapping.
///
/// # Example
///
/// ```
/// use axum::Json;
/// use tirebook_api::middleware::error_handling::AppError;
/// use tirebook_core::errors::BookingError;
/// use uuid::Uuid;
///
/// async fn handler(id: Uuid) -> Result<Json<()>, AppError> {
///     let lookup: Result<(), BookingError> =
///         Err(BookingError::NotFound(format!("Booking with ID {} not found", id)));
///     lookup?;
///     Ok(Json(()))
/// }
/// # fn main() {}
/// ```
#[derive(Debug)]
pub struct AppError(pub BookingError);

impl AppError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            BookingError::NotFound(_) => StatusCode::NOT_FOUND,
            BookingError::Validation(_) => StatusCode::BAD_REQUEST,
            BookingError::NotWorking { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            BookingError::CapacityExceeded { .. } => StatusCode::CONFLICT,
            BookingError::Conflict(_) => StatusCode::CONFLICT,
            BookingError::InvalidTransition { .. } => StatusCode::CONFLICT,
            BookingError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            BookingError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn body(&self) -> Value {
        let message = self.0.to_string();
        match &self.0 {
            BookingError::CapacityExceeded {
                total,
                occupied,
                available,
            } => json!({
                "error": message,
                "retryable": false,
                "total": total,
                "occupied": occupied,
                "available": available,
            }),
            BookingError::Conflict(_) => json!({ "error": message, "retryable": true }),
            BookingError::NotWorking { reason } => json!({ "error": message, "reason": reason }),
            BookingError::InvalidTransition { from, to } => {
                json!({ "error": message, "from": from, "to": to })
            }
            _ => json!({ "error": message }),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self.0, "request failed");
        }
        (status, Json(self.body())).into_response()
    }
}

/// Allows `?` on `BookingResult` inside handlers.
impl From<BookingError> for AppError {
    fn from(err: BookingError) -> Self {
        AppError(err)
    }
}

impl From<eyre::Report> for AppError {
    fn from(err: eyre::Report) -> Self {
        AppError(BookingError::Database(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tirebook_core::models::booking::BookingStatus;

    #[test]
    fn statuses_follow_the_error_kind() {
        let cases = [
            (BookingError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (BookingError::Validation("x".into()), StatusCode::BAD_REQUEST),
            (BookingError::not_working("non-working day"), StatusCode::UNPROCESSABLE_ENTITY),
            (BookingError::Conflict("x".into()), StatusCode::CONFLICT),
            (
                BookingError::InvalidTransition {
                    from: BookingStatus::Completed,
                    to: BookingStatus::Pending,
                },
                StatusCode::CONFLICT,
            ),
            (BookingError::Database(eyre::eyre!("down")), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(AppError(err).status(), status);
        }
    }

    #[test]
    fn capacity_body_carries_counts() {
        let body = AppError(BookingError::CapacityExceeded {
            total: 3,
            occupied: 3,
            available: 0,
        })
        .body();

        assert_eq!(body["retryable"], false);
        assert_eq!(body["total"], 3);
        assert_eq!(body["occupied"], 3);
        assert_eq!(body["available"], 0);
    }
}
