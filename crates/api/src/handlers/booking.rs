//! # Booking Handlers
//!
//! Booking creation runs the authoritative capacity re-check under the
//! (service point, date) lock. A lost race answers `409` with
//! `"retryable": true`.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use tirebook_core::{
    admission::BookingRequest,
    models::booking::{Booking, BookingStatus},
};
use uuid::Uuid;

use crate::{middleware::context::Ctx, middleware::error_handling::AppError, ApiState};

#[derive(Debug, Deserialize)]
pub struct StatusUpdate {
    pub status: BookingStatus,
}

/// `POST /api/bookings`
pub async fn create_booking(
    State(state): State<Arc<ApiState>>,
    Ctx(ctx): Ctx,
    Json(request): Json<BookingRequest>,
) -> Result<(StatusCode, Json<Booking>), AppError> {
    let booking = state.admission.create(&ctx, request).await?;
    Ok((StatusCode::CREATED, Json(booking)))
}

/// `POST /api/bookings/:id/status`
pub async fn update_status(
    State(state): State<Arc<ApiState>>,
    Ctx(ctx): Ctx,
    Path(booking_id): Path<Uuid>,
    Json(update): Json<StatusUpdate>,
) -> Result<Json<Booking>, AppError> {
    let booking = state
        .admission
        .transition(&ctx, booking_id, update.status)
        .await?;
    Ok(Json(booking))
}
