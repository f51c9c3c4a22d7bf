use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use timetabler_core::models::{
    conflict::{CheckConflictResponse, ConflictReason},
    entry::{DeleteEntryResponse, TimetableEntry},
};
use uuid::Uuid;

use crate::test_utils::{TestContext, time};

#[tokio::test]
async fn test_create_entry_returns_created() {
    let ctx = TestContext::new();
    let server = ctx.server();

    let response = server
        .post(&ctx.timetable_path())
        .json(&ctx.placement(Some(ctx.room_id), 0, "08:00:00", "09:00:00"))
        .await;

    assert_eq!(response.status_code(), StatusCode::CREATED);
    let entry: TimetableEntry = response.json();
    assert_eq!(entry.school_id, ctx.school_id);
    assert_eq!(entry.section_id, ctx.section_id);
    assert_eq!(entry.room_id, Some(ctx.room_id));
    assert_eq!(entry.start_time, time(8, 0));
    assert_eq!(ctx.store.entries(ctx.school_id), vec![entry]);
}

#[tokio::test]
async fn test_create_entry_conflict_lists_reasons() {
    let mut ctx = TestContext::new();
    let other_section = ctx.add_section("7B");
    let server = ctx.server();
    let path = ctx.timetable_path();

    server
        .post(&path)
        .json(&ctx.placement(Some(ctx.room_id), 0, "08:00:00", "09:00:00"))
        .await
        .assert_status(StatusCode::CREATED);

    // Same teacher and room, other section, overlapping half hour
    let mut body = ctx.placement(Some(ctx.room_id), 0, "08:30:00", "09:30:00");
    body["section_id"] = json!(other_section);
    let response = server.post(&path).json(&body).await;

    assert_eq!(response.status_code(), StatusCode::CONFLICT);
    let error: Value = response.json();
    assert_eq!(error["code"], "CONFLICT");
    assert_eq!(error["reasons"], json!(["STAFF_BUSY", "ROOM_BUSY"]));
    assert_eq!(ctx.store.entries(ctx.school_id).len(), 1);
}

#[tokio::test]
async fn test_back_to_back_entries_do_not_conflict() {
    let ctx = TestContext::new();
    let server = ctx.server();
    let path = ctx.timetable_path();

    server
        .post(&path)
        .json(&ctx.placement(Some(ctx.room_id), 2, "08:00:00", "09:00:00"))
        .await
        .assert_status(StatusCode::CREATED);
    server
        .post(&path)
        .json(&ctx.placement(Some(ctx.room_id), 2, "09:00:00", "10:00:00"))
        .await
        .assert_status(StatusCode::CREATED);

    assert_eq!(ctx.store.entries(ctx.school_id).len(), 2);
}

#[tokio::test]
async fn test_override_replaces_blocking_entry() {
    let ctx = TestContext::new();
    let server = ctx.server();
    let path = ctx.timetable_path();

    let first: TimetableEntry = server
        .post(&path)
        .json(&ctx.placement(None, 1, "10:00:00", "11:00:00"))
        .await
        .json();

    let mut body = ctx.placement(None, 1, "10:30:00", "11:30:00");
    body["override_conflict"] = json!(true);
    let response = server.post(&path).json(&body).await;

    assert_eq!(response.status_code(), StatusCode::CREATED);
    let second: TimetableEntry = response.json();
    let stored = ctx.store.entries(ctx.school_id);
    assert_eq!(stored, vec![second]);
    assert!(stored.iter().all(|entry| entry.id != first.id));
}

#[tokio::test]
async fn test_override_refused_for_pinned_slot() {
    let mut ctx = TestContext::new();
    ctx.pin(3, time(8, 0), time(9, 0));
    let server = ctx.server();

    let mut body = ctx.placement(None, 3, "08:00:00", "09:00:00");
    body["override_conflict"] = json!(true);
    let response = server.post(&ctx.timetable_path()).json(&body).await;

    assert_eq!(response.status_code(), StatusCode::CONFLICT);
    let error: Value = response.json();
    assert!(
        error["reasons"]
            .as_array()
            .expect("reasons array")
            .contains(&json!("PINNED_CONFLICT"))
    );
    assert!(ctx.store.entries(ctx.school_id).is_empty());
}

#[tokio::test]
async fn test_create_entry_validation_errors() {
    let ctx = TestContext::new();
    let server = ctx.server();
    let path = ctx.timetable_path();

    // End before start
    let response = server
        .post(&path)
        .json(&ctx.placement(None, 0, "10:00:00", "09:00:00"))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["code"], "VALIDATION");

    // Day out of range
    let response = server
        .post(&path)
        .json(&ctx.placement(None, 7, "09:00:00", "10:00:00"))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

    // Missing fields
    let response = server.post(&path).json(&json!({ "day_of_week": 0 })).await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_create_entry_unknown_room() {
    let ctx = TestContext::new();
    let server = ctx.server();

    let response = server
        .post(&ctx.timetable_path())
        .json(&ctx.placement(Some(Uuid::new_v4()), 0, "08:00:00", "09:00:00"))
        .await;

    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    assert_eq!(response.json::<Value>()["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_update_entry_moves_lesson() {
    let ctx = TestContext::new();
    let server = ctx.server();
    let path = ctx.timetable_path();

    let created: TimetableEntry = server
        .post(&path)
        .json(&ctx.placement(None, 0, "08:00:00", "09:00:00"))
        .await
        .json();

    // Moving onto its own old slot is not a conflict with itself
    let response = server
        .put(&format!("{}/{}", path, created.id))
        .json(&ctx.placement(Some(ctx.room_id), 0, "08:30:00", "09:30:00"))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let updated: TimetableEntry = response.json();
    assert_eq!(updated.id, created.id);
    assert_eq!(updated.created_at, created.created_at);
    assert_eq!(updated.start_time, time(8, 30));
    assert_eq!(updated.room_id, Some(ctx.room_id));
    assert_eq!(ctx.store.entries(ctx.school_id), vec![updated]);
}

#[tokio::test]
async fn test_update_missing_entry() {
    let ctx = TestContext::new();
    let server = ctx.server();

    let response = server
        .put(&format!("{}/{}", ctx.timetable_path(), Uuid::new_v4()))
        .json(&ctx.placement(None, 0, "08:00:00", "09:00:00"))
        .await;

    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_entry() {
    let ctx = TestContext::new();
    let server = ctx.server();
    let path = ctx.timetable_path();

    let created: TimetableEntry = server
        .post(&path)
        .json(&ctx.placement(None, 4, "13:00:00", "14:00:00"))
        .await
        .json();

    let response = server.delete(&format!("{}/{}", path, created.id)).await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let deleted: DeleteEntryResponse = response.json();
    assert_eq!(deleted.id, created.id);
    assert!(deleted.deleted);
    assert!(ctx.store.entries(ctx.school_id).is_empty());

    // A second delete has nothing left to remove
    let response = server.delete(&format!("{}/{}", path, created.id)).await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_malformed_entry_id() {
    let ctx = TestContext::new();
    let server = ctx.server();

    let response = server
        .delete(&format!("{}/not-a-uuid", ctx.timetable_path()))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["code"], "VALIDATION");
}

#[tokio::test]
async fn test_check_conflicts_is_advisory() {
    let ctx = TestContext::new();
    let server = ctx.server();
    let path = ctx.timetable_path();

    let created: TimetableEntry = server
        .post(&path)
        .json(&ctx.placement(Some(ctx.room_id), 0, "08:00:00", "09:00:00"))
        .await
        .json();

    let mut candidate = ctx.placement(Some(ctx.room_id), 0, "08:30:00", "09:30:00");
    let response = server
        .post(&format!("{}/check", path))
        .json(&candidate)
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let check: CheckConflictResponse = response.json();
    assert_eq!(
        check.conflicts,
        vec![ConflictReason::SectionBusy, ConflictReason::StaffBusy, ConflictReason::RoomBusy]
    );

    // Excluding the entry being edited clears every reason
    candidate["exclude_entry_id"] = json!(created.id);
    let check: CheckConflictResponse = server
        .post(&format!("{}/check", path))
        .json(&candidate)
        .await
        .json();
    assert!(check.conflicts.is_empty());

    assert_eq!(ctx.store.entries(ctx.school_id), vec![created]);
}

#[tokio::test]
async fn test_list_entries_filters_and_orders() {
    let mut ctx = TestContext::new();
    let other_section = ctx.add_section("7B");
    let server = ctx.server();
    let path = ctx.timetable_path();

    for (day, start, end) in [(1, "10:00:00", "11:00:00"), (0, "09:00:00", "10:00:00"), (1, "08:00:00", "09:00:00")] {
        server
            .post(&path)
            .json(&ctx.placement(None, day, start, end))
            .await
            .assert_status(StatusCode::CREATED);
    }
    let mut body = ctx.placement(None, 0, "13:00:00", "14:00:00");
    body["section_id"] = json!(other_section);
    server.post(&path).json(&body).await.assert_status(StatusCode::CREATED);

    let all: Vec<TimetableEntry> = server.get(&path).await.json();
    let slots: Vec<(u8, _)> = all.iter().map(|entry| (entry.day_of_week, entry.start_time)).collect();
    assert_eq!(
        slots,
        vec![(0, time(9, 0)), (0, time(13, 0)), (1, time(8, 0)), (1, time(10, 0))]
    );

    let monday: Vec<TimetableEntry> = server
        .get(&path)
        .add_query_param("section_id", ctx.section_id)
        .add_query_param("day_of_week", 0)
        .await
        .json();
    assert_eq!(monday.len(), 1);
    assert_eq!(monday[0].start_time, time(9, 0));
}

#[tokio::test]
async fn test_list_entries_bad_filter() {
    let ctx = TestContext::new();
    let server = ctx.server();

    let response = server
        .get(&ctx.timetable_path())
        .add_query_param("day_of_week", "monday")
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_get_entry() {
    let ctx = TestContext::new();
    let server = ctx.server();
    let path = ctx.timetable_path();

    let created: TimetableEntry = server
        .post(&path)
        .json(&ctx.placement(Some(ctx.room_id), 5, "11:00:00", "12:00:00"))
        .await
        .json();

    let response = server.get(&format!("{}/{}", path, created.id)).await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.json::<TimetableEntry>(), created);

    let response = server.get(&format!("{}/{}", path, Uuid::new_v4())).await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_check_conflicts_unknown_staff() {
    let ctx = TestContext::new();
    let server = ctx.server();

    let mut candidate = ctx.placement(None, 0, "08:00:00", "09:00:00");
    candidate["staff_id"] = json!(Uuid::new_v4());
    let response = server
        .post(&format!("{}/check", ctx.timetable_path()))
        .json(&candidate)
        .await;

    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    assert_eq!(response.json::<Value>()["code"], "NOT_FOUND");
}
