//! # Tirebook API
//!
//! HTTP adapter over the tire-service booking core. It exposes the
//! availability views and booking admission of `tirebook-core` on top of a
//! store from `tirebook-db`.
//!
//! ## Architecture
//!
//! - **Routes**: endpoint paths
//! - **Handlers**: extract, call the core, serialize
//! - **Middleware**: request context and error mapping
//! - **Notify**: background delivery of booking events
//! - **Config**: environment configuration

/// Configuration module for API settings
pub mod config;
/// Request handlers calling into the booking core
pub mod handlers;
/// Request context extraction and error handling
pub mod middleware;
/// Booking event delivery
pub mod notify;
/// Route definitions and API endpoint structure
pub mod routes;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    error_handling::HandleErrorLayer,
    http::{header, HeaderValue, Method, StatusCode},
    BoxError, Json, Router,
};
use eyre::{Result, WrapErr};
use serde_json::json;
use tirebook_core::{
    admission::BookingAdmission,
    config::SchedulingConfig,
    scheduling::availability::Availability,
    store::{BookingStore, CalendarStore, NotificationSink},
};
use tirebook_db::{DbPool, PgStore};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::FmtSubscriber;

/// Shared application state that is accessible to all request handlers.
///
/// Both services hold the same stores; the state is cheap to build for any
/// store implementation, including `tirebook_db::MemoryStore` in tests.
pub struct ApiState {
    pub availability: Availability,
    pub admission: BookingAdmission,
}

impl ApiState {
    pub fn new(
        calendar: Arc<dyn CalendarStore>,
        bookings: Arc<dyn BookingStore>,
        notifier: Arc<dyn NotificationSink>,
        scheduling: SchedulingConfig,
    ) -> Self {
        let availability = Availability::new(calendar.clone(), bookings.clone(), scheduling);
        let admission = BookingAdmission::new(availability.clone(), calendar, bookings, notifier);
        Self {
            availability,
            admission,
        }
    }

    /// State over one store serving both ports.
    pub fn with_store<S>(store: Arc<S>, notifier: Arc<dyn NotificationSink>, scheduling: SchedulingConfig) -> Self
    where
        S: CalendarStore + BookingStore + 'static,
    {
        Self::new(store.clone(), store, notifier, scheduling)
    }
}

/// Builds the router with every route and the request tracing layer.
pub fn app(state: Arc<ApiState>) -> Router {
    Router::new()
        // Health check endpoints
        .merge(routes::health::routes())
        // Availability views
        .merge(routes::availability::routes())
        // Booking admission and transitions
        .merge(routes::booking::routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Starts the API server with the provided configuration and database
/// connection.
///
/// Installs the tracing subscriber, bootstraps the notification drain,
/// applies CORS and the request deadline, and serves until the listener
/// fails.
pub async fn start_server(config: config::ApiConfig, db_pool: DbPool) -> Result<()> {
    // Initialize tracing for logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(config.log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let (notifier, events) = notify::ChannelNotifier::new();
    let _drain = notify::spawn_drain(events);

    let store = Arc::new(PgStore::new(db_pool));
    let state = Arc::new(ApiState::with_store(store, Arc::new(notifier), config.scheduling));

    let app = app(state);

    // Apply CORS configuration if origins are specified
    let app = match &config.cors_origins {
        Some(origins) => {
            let origins = origins
                .iter()
                .map(|origin| origin.parse::<HeaderValue>())
                .collect::<Result<Vec<_>, _>>()
                .wrap_err("Invalid API_CORS_ORIGINS entry")?;
            let cors = CorsLayer::new()
                .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
                .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
                .allow_origin(origins);
            app.layer(cors)
        }
        None => app,
    };

    // Add request timeout middleware
    let app = app.layer(
        ServiceBuilder::new()
            .layer(HandleErrorLayer::new(handle_timeout))
            .timeout(Duration::from_secs(config.request_timeout)),
    );

    // Start the HTTP server
    let addr = config.server_addr();
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}

async fn handle_timeout(err: BoxError) -> (StatusCode, Json<serde_json::Value>) {
    if err.is::<tower::timeout::error::Elapsed>() {
        (
            StatusCode::REQUEST_TIMEOUT,
            Json(json!({ "error": "Request timed out" })),
        )
    } else {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": format!("Unhandled internal error: {}", err) })),
        )
    }
}
