//! # Error Handling Middleware
//!
//! Maps scheduling errors to HTTP status codes and JSON error bodies so every
//! endpoint fails the same way:
//!
//! ```json
//! { "error": "Scheduling conflict: ROOM_BUSY", "code": "CONFLICT", "reasons": ["ROOM_BUSY"] }
//! ```
//!
//! `reasons` is present only for conflicts.

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use timetabler_core::errors::TimetableError;
use tracing::error;

/// Application error wrapper that provides HTTP status code mapping
///
/// # Example
///
/// ```ignore
/// async fn handler(State(state): State<Arc<ApiState>>) -> Result<Json<TimetableEntry>, AppError> {
///     let entry = state.timetable.get_entry(school_id, id).await?;
///     Ok(Json(entry))
/// }
/// ```
#[derive(Debug)]
pub struct AppError(pub TimetableError);

impl AppError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            TimetableError::Validation(_) => StatusCode::BAD_REQUEST,
            TimetableError::NotFound(_) => StatusCode::NOT_FOUND,
            TimetableError::NoSlotAvailable => StatusCode::NOT_FOUND,
            TimetableError::Conflict(_) => StatusCode::CONFLICT,
            TimetableError::Busy(_) => StatusCode::CONFLICT,
            TimetableError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            TimetableError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("Request failed: {:?}", self.0);
        }

        let message = self.0.to_string();
        let code = self.0.code();
        let body = match &self.0 {
            TimetableError::Conflict(reasons) => json!({
                "error": message,
                "code": code,
                "reasons": reasons,
            }),
            _ => json!({ "error": message, "code": code }),
        };

        (status, Json(body)).into_response()
    }
}

/// Allows `?` on `TimetableResult` inside handlers.
impl From<TimetableError> for AppError {
    fn from(err: TimetableError) -> Self {
        AppError(err)
    }
}

impl From<eyre::Report> for AppError {
    fn from(err: eyre::Report) -> Self {
        AppError(TimetableError::Database(err))
    }
}

/// Malformed or mistyped request bodies are validation failures.
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError(TimetableError::Validation(rejection.body_text()))
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError(TimetableError::Validation(rejection.body_text()))
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError(TimetableError::Validation(rejection.body_text()))
    }
}

/// Maps a TimetableError to an HTTP response
pub fn map_error(err: TimetableError) -> Response {
    AppError(err).into_response()
}
