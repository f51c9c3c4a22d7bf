use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
};
use std::sync::Arc;
use timetabler_core::models::{
    conflict::{CheckConflictRequest, CheckConflictResponse},
    entry::{DeleteEntryResponse, EntryFilter, PlacementRequest, TimetableEntry},
};
use tracing::debug;
use uuid::Uuid;

use crate::{ApiState, middleware::error_handling::AppError};

#[axum::debug_handler]
pub async fn list_entries(
    State(state): State<Arc<ApiState>>,
    path: Result<Path<Uuid>, PathRejection>,
    query: Result<Query<EntryFilter>, QueryRejection>,
) -> Result<Json<Vec<TimetableEntry>>, AppError> {
    let Path(school_id) = path?;
    let Query(filter) = query?;

    let entries = state.timetable.list_entries(school_id, &filter).await?;
    debug!("Listed {} entries for school {}", entries.len(), school_id);

    Ok(Json(entries))
}

#[axum::debug_handler]
pub async fn create_entry(
    State(state): State<Arc<ApiState>>,
    path: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<PlacementRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<TimetableEntry>), AppError> {
    let Path(school_id) = path?;
    let Json(request) = payload?;

    let entry = state.timetable.create_entry(school_id, request).await?;

    Ok((StatusCode::CREATED, Json(entry)))
}

#[axum::debug_handler]
pub async fn get_entry(
    State(state): State<Arc<ApiState>>,
    path: Result<Path<(Uuid, Uuid)>, PathRejection>,
) -> Result<Json<TimetableEntry>, AppError> {
    let Path((school_id, id)) = path?;

    let entry = state.timetable.get_entry(school_id, id).await?;

    Ok(Json(entry))
}

#[axum::debug_handler]
pub async fn update_entry(
    State(state): State<Arc<ApiState>>,
    path: Result<Path<(Uuid, Uuid)>, PathRejection>,
    payload: Result<Json<PlacementRequest>, JsonRejection>,
) -> Result<Json<TimetableEntry>, AppError> {
    let Path((school_id, id)) = path?;
    let Json(request) = payload?;

    let entry = state.timetable.update_entry(school_id, id, request).await?;

    Ok(Json(entry))
}

#[axum::debug_handler]
pub async fn delete_entry(
    State(state): State<Arc<ApiState>>,
    path: Result<Path<(Uuid, Uuid)>, PathRejection>,
) -> Result<Json<DeleteEntryResponse>, AppError> {
    let Path((school_id, id)) = path?;

    state.timetable.delete_entry(school_id, id).await?;

    Ok(Json(DeleteEntryResponse { id, deleted: true }))
}

/// Reports what would block a placement without writing anything.
#[axum::debug_handler]
pub async fn check_conflicts(
    State(state): State<Arc<ApiState>>,
    path: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<CheckConflictRequest>, JsonRejection>,
) -> Result<Json<CheckConflictResponse>, AppError> {
    let Path(school_id) = path?;
    let Json(request) = payload?;

    let conflicts = state.timetable.check_conflicts(school_id, &request).await?;

    Ok(Json(CheckConflictResponse { conflicts }))
}
