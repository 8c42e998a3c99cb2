use axum::{routing::get, Router};
use std::sync::Arc;

use crate::{handlers, ApiState};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route(
            "/api/service_points/:id/availability/:date/slots",
            get(handlers::availability::get_slots),
        )
        .route(
            "/api/service_points/:id/availability/:date/times",
            get(handlers::availability::get_times),
        )
        .route(
            "/api/service_points/:id/availability/:date/summary",
            get(handlers::availability::get_summary),
        )
        .route(
            "/api/service_points/:id/availability/:date/check",
            get(handlers::availability::check_window),
        )
        .route(
            "/api/service_points/:id/next_available",
            get(handlers::availability::next_available),
        )
}
