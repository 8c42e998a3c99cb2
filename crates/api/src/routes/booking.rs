use axum::{routing::post, Router};
use std::sync::Arc;

use crate::{handlers, ApiState};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route("/api/bookings", post(handlers::booking::create_booking))
        .route(
            "/api/bookings/:id/status",
            post(handlers::booking::update_status),
        )
}
