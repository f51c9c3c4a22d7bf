use std::sync::Arc;

use axum::{body::to_bytes, http::StatusCode};
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::{Value, json};
use timetabler_api::middleware::error_handling::{AppError, map_error};
use timetabler_core::{errors::TimetableError, models::conflict::ConflictReason};
use timetabler_db::mock::MockStore;
use uuid::Uuid;

use crate::test_utils::test_server;

async fn body_json(error: TimetableError) -> (StatusCode, Value) {
    let response = map_error(error);
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[rstest]
#[case(TimetableError::Validation("Invalid input".to_string()), StatusCode::BAD_REQUEST)]
#[case(TimetableError::NotFound("Section not found".to_string()), StatusCode::NOT_FOUND)]
#[case(TimetableError::NoSlotAvailable, StatusCode::NOT_FOUND)]
#[case(TimetableError::Conflict(vec![ConflictReason::RoomBusy]), StatusCode::CONFLICT)]
#[case(TimetableError::Busy("generation running".to_string()), StatusCode::CONFLICT)]
#[case(TimetableError::Database(eyre::eyre!("Database error")), StatusCode::INTERNAL_SERVER_ERROR)]
#[case(
    TimetableError::Internal(Box::new(std::io::Error::new(std::io::ErrorKind::Other, "Internal error"))),
    StatusCode::INTERNAL_SERVER_ERROR
)]
fn test_error_status_mapping(#[case] error: TimetableError, #[case] expected: StatusCode) {
    assert_eq!(AppError(error).status(), expected);
}

#[tokio::test]
async fn test_conflict_body_lists_reasons() {
    let (status, body) = body_json(TimetableError::Conflict(vec![
        ConflictReason::StaffBusy,
        ConflictReason::PinnedConflict,
    ]))
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(
        body,
        json!({
            "error": "Scheduling conflict: STAFF_BUSY, PINNED_CONFLICT",
            "code": "CONFLICT",
            "reasons": ["STAFF_BUSY", "PINNED_CONFLICT"],
        })
    );
}

#[tokio::test]
async fn test_error_body_without_reasons() {
    let (status, body) = body_json(TimetableError::Busy("School has a generation in progress".to_string())).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "BUSY");
    assert_eq!(body["error"], "Generation already running: School has a generation in progress");
    assert!(body.get("reasons").is_none());
}

#[tokio::test]
async fn test_internal_errors_use_internal_code() {
    let (status, body) = body_json(TimetableError::Database(eyre::eyre!("connection refused"))).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["code"], "INTERNAL");
}

#[test_log::test(tokio::test)]
async fn test_store_failure_becomes_server_error() {
    let mut store = MockStore::new();
    store
        .expect_list_entries()
        .times(1)
        .returning(|_, _| Err(eyre::eyre!("connection refused")));
    let server = test_server(Arc::new(store));

    let response = server
        .get(&format!("/api/schools/{}/timetable", Uuid::new_v4()))
        .await;

    assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.json::<Value>()["code"], "INTERNAL");
}

#[tokio::test]
async fn test_health_endpoints() {
    let server = test_server(Arc::new(MockStore::new()));

    let response = server.get("/health").await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let response = server.get("/version").await;
    assert_eq!(response.status_code(), StatusCode::OK);
}
