//! # Timetabler API
//!
//! The API crate provides the web server for the timetable scheduling engine.
//! It exposes per-school endpoints for editing timetable entries, checking
//! conflicts, suggesting slots and generating a week.
//!
//! ## Architecture
//!
//! This crate follows a layered architecture:
//!
//! - **Routes**: Define API endpoints and URL structure
//! - **Handlers**: Translate HTTP requests into scheduling service calls
//! - **Middleware**: Map engine errors onto HTTP responses
//! - **Config**: Handle environment and application configuration
//!
//! The API uses Axum as the web framework. Persistence is injected as a
//! [`TimetableStore`], so the same router runs against PostgreSQL or the
//! in-memory store.

/// Configuration module for API settings
pub mod config;
/// Request handlers that call into the scheduling service
pub mod handlers;
/// Middleware for error handling
pub mod middleware;
/// Route definitions and API endpoint structure
pub mod routes;

use std::{sync::Arc, time::Duration};

use axum::{
    BoxError, Router,
    error_handling::HandleErrorLayer,
    http::{HeaderValue, StatusCode},
};
use eyre::{Result, WrapErr};
use timetabler_core::{scheduler::TimetableService, store::TimetableStore};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::FmtSubscriber;

/// Shared application state that is accessible to all request handlers
///
/// # Example
///
/// ```ignore
/// let service = TimetableService::new(store, config.school_day);
/// let state = Arc::new(ApiState { timetable: service });
/// let app = Router::new().with_state(state);
/// ```
pub struct ApiState {
    /// Scheduling engine bound to the configured store
    pub timetable: TimetableService,
}

/// Builds the application router with every route attached to `state`.
pub fn app(state: Arc<ApiState>) -> Router {
    Router::new()
        // Health check endpoints
        .merge(routes::health::routes())
        // Timetable entry endpoints
        .merge(routes::timetable::routes())
        // Suggestion and generation endpoints
        .merge(routes::scheduling::routes())
        // Attach shared state to all routes
        .with_state(state)
}

/// Starts the API server with the provided configuration and store
///
/// This function sets up logging, builds the scheduling service and router,
/// and serves HTTP until the process stops.
///
/// # Example
///
/// ```ignore
/// let config = ApiConfig::from_env()?;
/// let pool = timetabler_db::create_pool(&config.database_url).await?;
/// start_server(config, Arc::new(PgTimetableStore::new(pool))).await?;
/// ```
pub async fn start_server(config: config::ApiConfig, store: Arc<dyn TimetableStore>) -> Result<()> {
    // Initialize tracing for logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(config.log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    // Create shared state with dependencies
    let state = Arc::new(ApiState {
        timetable: TimetableService::new(store, config.school_day),
    });
    let app = app(state).layer(TraceLayer::new_for_http());

    // Apply CORS configuration if origins are specified
    let app = if let Some(origins) = &config.cors_origins {
        let origins = origins
            .iter()
            .map(|origin| HeaderValue::from_str(origin))
            .collect::<Result<Vec<_>, _>>()
            .wrap_err("Invalid API_CORS_ORIGINS value")?;
        let cors = tower_http::cors::CorsLayer::new()
            .allow_methods([
                axum::http::Method::GET,
                axum::http::Method::POST,
                axum::http::Method::PUT,
                axum::http::Method::DELETE,
                axum::http::Method::OPTIONS,
            ])
            .allow_headers([axum::http::header::CONTENT_TYPE, axum::http::header::ACCEPT])
            .allow_origin(origins);

        app.layer(cors)
    } else {
        app
    };

    // Add request timeout middleware
    let app = app.layer(
        ServiceBuilder::new()
            .layer(HandleErrorLayer::new(|_: BoxError| async { StatusCode::REQUEST_TIMEOUT }))
            .timeout(Duration::from_secs(config.request_timeout)),
    );

    // Start the HTTP server
    let addr = config.server_addr();
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
