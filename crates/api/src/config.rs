//! # API Configuration Module
//!
//! Loads the server configuration from environment variables, with defaults
//! where a value is optional.
//!
//! ## Environment Variables
//!
//! - `API_HOST`: host address to bind (default: "0.0.0.0")
//! - `API_PORT`: port to listen on (default: 3000)
//! - `DATABASE_URL`: PostgreSQL connection string (required)
//! - `DATABASE_MAX_CONNECTIONS`: pool size (default: 5)
//! - `LOG_LEVEL`: logging level (default: "info")
//! - `API_CORS_ORIGINS`: comma-separated list of allowed CORS origins
//! - `API_REQUEST_TIMEOUT_SECONDS`: per-request deadline (default: 30)
//! - `SCHEDULING_SCAN_INTERVAL_MINUTES`: capacity scan step (default: 15)
//! - `SCHEDULING_SEARCH_HORIZON_DAYS`: next-available search depth (default: 30)

use eyre::{eyre, Result, WrapErr};
use std::env;
use std::str::FromStr;
use tirebook_core::config::{
    SchedulingConfig, DEFAULT_SCAN_INTERVAL_MINUTES, DEFAULT_SEARCH_HORIZON_DAYS,
};
use tracing::Level;

/// Configuration for the booking API server.
///
/// # Example
///
/// ```no_run
/// use eyre::Result;
/// use tirebook_api::config::ApiConfig;
///
/// fn example() -> Result<()> {
///     let config = ApiConfig::from_env()?;
///     println!("Starting server on {}", config.server_addr());
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Host address for the API server (e.g., "127.0.0.1", "0.0.0.0")
    pub host: String,

    /// Port for the API server to listen on
    pub port: u16,

    /// PostgreSQL database connection string
    pub database_url: String,

    /// Maximum number of pooled database connections
    pub database_max_connections: u32,

    /// Log level for the application
    pub log_level: Level,

    /// CORS allowed origins (optional)
    pub cors_origins: Option<Vec<String>>,

    /// Request timeout in seconds
    pub request_timeout: u64,

    /// Tunables for availability and admission
    pub scheduling: SchedulingConfig,
}

impl ApiConfig {
    /// Creates a new ApiConfig from environment variables.
    ///
    /// # Errors
    ///
    /// Fails when `DATABASE_URL` is not set, when a numeric value cannot be
    /// parsed, or when the scheduling values are zero.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        // Network settings
        let host = lookup("API_HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = parse_or(&lookup, "API_PORT", 3000)?;

        // Database settings
        let database_url = lookup("DATABASE_URL")
            .ok_or_else(|| eyre!("DATABASE_URL environment variable must be set"))?;
        let database_max_connections = parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", 5)?;

        // Logging settings
        let log_level = match lookup("LOG_LEVEL")
            .unwrap_or_else(|| "info".to_string())
            .to_lowercase()
            .as_str()
        {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        };

        // CORS settings
        let cors_origins = lookup("API_CORS_ORIGINS").map(|origins| {
            origins
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect()
        });

        // Performance settings
        let request_timeout = lookup("API_REQUEST_TIMEOUT_SECONDS")
            .and_then(|v| v.parse().ok())
            .unwrap_or(30);

        // Scheduling settings
        let scheduling = SchedulingConfig {
            scan_interval_minutes: parse_or(
                &lookup,
                "SCHEDULING_SCAN_INTERVAL_MINUTES",
                DEFAULT_SCAN_INTERVAL_MINUTES,
            )?,
            search_horizon_days: parse_or(
                &lookup,
                "SCHEDULING_SEARCH_HORIZON_DAYS",
                DEFAULT_SEARCH_HORIZON_DAYS,
            )?,
        };
        scheduling
            .validate()
            .map_err(|err| eyre!("Invalid scheduling configuration: {}", err))?;

        Ok(Self {
            host,
            port,
            database_url,
            database_max_connections,
            log_level,
            cors_origins,
            request_timeout,
            scheduling,
        })
    }

    /// Returns the server address as a string (e.g., "127.0.0.1:8080")
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(value) => value
            .trim()
            .parse()
            .wrap_err_with(|| format!("Invalid {} value", key)),
        None => Ok(default),
    }
}
