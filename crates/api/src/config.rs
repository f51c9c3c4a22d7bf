//! # API Configuration Module
//!
//! This module handles loading configuration for the Timetabler API server.
//! It retrieves configuration values from environment variables and provides
//! defaults where appropriate.
//!
//! ## Environment Variables
//!
//! - `API_HOST`: The host address to bind the server to (default: "0.0.0.0")
//! - `API_PORT`: The port to listen on (default: 3000)
//! - `DATABASE_URL`: PostgreSQL connection string (required)
//! - `LOG_LEVEL`: Logging level (default: "info")
//! - `API_CORS_ORIGINS`: Comma-separated list of allowed CORS origins
//! - `API_REQUEST_TIMEOUT_SECONDS`: Request timeout (default: 30)
//! - `SCHOOL_DAY_START` / `SCHOOL_DAY_END`: Hours used for schools without
//!   configured hours, as `HH:MM` (default: 08:00 to 17:00)

use chrono::NaiveTime;
use eyre::{Result, WrapErr, eyre};
use std::env;
use timetabler_core::models::catalog::SchoolDay;
use tracing::Level;

/// Configuration for the Timetabler API server
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Host address for the API server (e.g., "127.0.0.1", "0.0.0.0")
    pub host: String,

    /// Port for the API server to listen on
    pub port: u16,

    /// PostgreSQL database connection string
    pub database_url: String,

    /// Log level for the application
    pub log_level: Level,

    /// CORS allowed origins (optional)
    pub cors_origins: Option<Vec<String>>,

    /// Request timeout in seconds
    pub request_timeout: u64,

    /// Fallback opening hours
    pub school_day: SchoolDay,
}

impl ApiConfig {
    /// Creates a new ApiConfig from environment variables
    ///
    /// # Errors
    ///
    /// This function will return an error if:
    /// - The DATABASE_URL environment variable is not set
    /// - The API_PORT value cannot be parsed as a u16
    /// - SCHOOL_DAY_START or SCHOOL_DAY_END is not a valid `HH:MM` time, or
    ///   the day they describe is empty
    pub fn from_env() -> Result<Self> {
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Builds the configuration from any variable source.
    pub fn from_vars<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Network settings
        let host = lookup("API_HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = lookup("API_PORT")
            .unwrap_or_else(|| "3000".to_string())
            .parse()
            .wrap_err("Invalid API_PORT value")?;

        // Database settings
        let database_url =
            lookup("DATABASE_URL").ok_or_else(|| eyre!("DATABASE_URL environment variable must be set"))?;

        // Logging settings
        let log_level = match lookup("LOG_LEVEL").unwrap_or_else(|| "info".to_string()).as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        };

        // CORS settings
        let cors_origins = lookup("API_CORS_ORIGINS")
            .map(|origins| origins.split(',').map(|s| s.trim().to_string()).collect());

        // Performance settings
        let request_timeout = lookup("API_REQUEST_TIMEOUT_SECONDS")
            .unwrap_or_else(|| "30".to_string())
            .parse()
            .unwrap_or(30);

        // Scheduling settings
        let defaults = SchoolDay::default();
        let school_day = SchoolDay {
            start_time: parse_time(lookup("SCHOOL_DAY_START"), "SCHOOL_DAY_START", defaults.start_time)?,
            end_time: parse_time(lookup("SCHOOL_DAY_END"), "SCHOOL_DAY_END", defaults.end_time)?,
        };
        if school_day.end_time <= school_day.start_time {
            return Err(eyre!(
                "SCHOOL_DAY_END ({}) must be after SCHOOL_DAY_START ({})",
                school_day.end_time,
                school_day.start_time
            ));
        }

        Ok(Self {
            host,
            port,
            database_url,
            log_level,
            cors_origins,
            request_timeout,
            school_day,
        })
    }

    /// Returns the server address as a string (e.g., "127.0.0.1:8080")
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_time(value: Option<String>, name: &str, default: NaiveTime) -> Result<NaiveTime> {
    match value {
        Some(value) => NaiveTime::parse_from_str(value.trim(), "%H:%M")
            .wrap_err_with(|| format!("Invalid {} value: {}", name, value)),
        None => Ok(default),
    }
}
