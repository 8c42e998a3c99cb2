//! # Availability Handlers
//!
//! Read-only views of a service point's capacity on a date: free slots,
//! start times with free post counts, a day summary, a probe for one
//! window, and the next free time. Views are advisory; only booking
//! admission decides.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tirebook_core::{
    errors::BookingError,
    models::slot::Slot,
    scheduling::availability::{DaySummary, NextAvailable, TimeAvailability},
    scheduling::occupancy::WindowCheck,
    time::parse_clock,
};
use uuid::Uuid;

use crate::{middleware::context::Ctx, middleware::error_handling::AppError, ApiState};

#[derive(Debug, Deserialize)]
pub struct TimesQuery {
    /// Only count slots at least this many minutes long
    pub min_duration: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct CheckQuery {
    /// Start of the window, `HH:MM` or `HH:MM:SS`
    pub time: String,
    /// Length of the window in minutes
    pub duration: i32,
}

#[derive(Debug, Deserialize)]
pub struct NextQuery {
    /// Search start, `YYYY-MM-DDTHH:MM[:SS]`; defaults to now
    pub from: Option<String>,
    pub min_duration: Option<i32>,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct CheckResponse {
    pub available: bool,
    pub total_posts: usize,
    pub occupied_posts: usize,
    pub available_posts: usize,
    pub reason: Option<&'static str>,
}

impl From<WindowCheck> for CheckResponse {
    fn from(check: WindowCheck) -> Self {
        Self {
            available: check.is_available(),
            total_posts: check.total_posts,
            occupied_posts: check.occupied_posts,
            available_posts: check.available_posts,
            reason: check.reason(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct NextResponse {
    pub next: Option<NextAvailable>,
}

/// `GET /api/service_points/:id/availability/:date/slots`
pub async fn get_slots(
    State(state): State<Arc<ApiState>>,
    Ctx(ctx): Ctx,
    Path((service_point_id, date)): Path<(Uuid, NaiveDate)>,
) -> Result<Json<Vec<Slot>>, AppError> {
    let slots = state
        .availability
        .available_slots(&ctx, service_point_id, date)
        .await?;
    Ok(Json(slots))
}

/// `GET /api/service_points/:id/availability/:date/times?min_duration=`
pub async fn get_times(
    State(state): State<Arc<ApiState>>,
    Ctx(ctx): Ctx,
    Path((service_point_id, date)): Path<(Uuid, NaiveDate)>,
    Query(query): Query<TimesQuery>,
) -> Result<Json<Vec<TimeAvailability>>, AppError> {
    let times = state
        .availability
        .available_times(&ctx, service_point_id, date, query.min_duration)
        .await?;
    Ok(Json(times))
}

pub async fn get_summary(
    State(state): State<Arc<ApiState>>,
    Ctx(ctx): Ctx,
    Path((service_point_id, date)): Path<(Uuid, NaiveDate)>,
) -> Result<Json<DaySummary>, AppError> {
    let summary = state
        .availability
        .day_summary(&ctx, service_point_id, date)
        .await?;
    Ok(Json(summary))
}

/// `GET /api/service_points/:id/availability/:date/check?time=&duration=`
///
/// Answers with the same verdict booking admission would reach right now.
pub async fn check_window(
    State(state): State<Arc<ApiState>>,
    Ctx(ctx): Ctx,
    Path((service_point_id, date)): Path<(Uuid, NaiveDate)>,
    Query(query): Query<CheckQuery>,
) -> Result<Json<CheckResponse>, AppError> {
    let start = parse_clock(&query.time)
        .ok_or_else(|| BookingError::Validation(format!("Invalid time {:?}", query.time)))?;
    let check = state
        .availability
        .check_window(&ctx, service_point_id, date, start, query.duration)
        .await?;
    Ok(Json(check.into()))
}

/// `GET /api/service_points/:id/next_available?from=&min_duration=`
pub async fn next_available(
    State(state): State<Arc<ApiState>>,
    Ctx(ctx): Ctx,
    Path(service_point_id): Path<Uuid>,
    Query(query): Query<NextQuery>,
) -> Result<Json<NextResponse>, AppError> {
    let from = match query.from.as_deref() {
        Some(raw) => parse_datetime(raw)?,
        None => ctx.now,
    };
    let next = state
        .availability
        .next_available(&ctx, service_point_id, from, query.min_duration)
        .await?;
    Ok(Json(NextResponse { next }))
}

fn parse_datetime(raw: &str) -> Result<NaiveDateTime, BookingError> {
    ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw.trim(), format).ok())
        .ok_or_else(|| BookingError::Validation(format!("Invalid date-time {:?}", raw)))
}
