use axum::{
    Json,
    body::Bytes,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
};
use std::sync::Arc;
use timetabler_core::{
    errors::TimetableError,
    models::scheduling::{GenerateOptions, GenerationReport, SuggestRequest, SuggestedSlot},
};
use tracing::info;
use uuid::Uuid;

use crate::{ApiState, middleware::error_handling::AppError};

#[axum::debug_handler]
pub async fn suggest_slot(
    State(state): State<Arc<ApiState>>,
    path: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<SuggestRequest>, JsonRejection>,
) -> Result<Json<SuggestedSlot>, AppError> {
    let Path(school_id) = path?;
    let Json(request) = payload?;

    let slot = state.timetable.suggest(school_id, &request).await?;

    Ok(Json(slot))
}

/// Runs the weekly generator. An empty body uses the default options.
#[axum::debug_handler]
pub async fn generate(
    State(state): State<Arc<ApiState>>,
    path: Result<Path<Uuid>, PathRejection>,
    body: Bytes,
) -> Result<Json<GenerationReport>, AppError> {
    let Path(school_id) = path?;
    let options = parse_options(&body)?;

    let report = state.timetable.generate(school_id, &options).await?;
    info!(
        "Generation request for school {} finished: {} placed, {} unsatisfied",
        school_id,
        report.placed_count,
        report.unsatisfied.len()
    );

    Ok(Json(report))
}

fn parse_options(body: &[u8]) -> Result<GenerateOptions, AppError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(GenerateOptions::default());
    }
    serde_json::from_slice(body)
        .map_err(|err| AppError(TimetableError::Validation(format!("Invalid generate options: {}", err))))
}
