use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use timetabler_core::models::{
    entry::TimetableEntry,
    scheduling::{GenerationReport, SuggestedSlot},
};
use uuid::Uuid;

use crate::test_utils::{TestContext, time};

fn suggest_path(ctx: &TestContext) -> String {
    format!("{}/suggest", ctx.timetable_path())
}

fn generate_path(ctx: &TestContext) -> String {
    format!("{}/generate", ctx.timetable_path())
}

#[tokio::test]
async fn test_suggest_skips_occupied_slot() {
    let ctx = TestContext::new();
    let server = ctx.server();

    server
        .post(&ctx.timetable_path())
        .json(&ctx.placement(None, 0, "08:00:00", "09:00:00"))
        .await
        .assert_status(StatusCode::CREATED);

    let response = server
        .post(&suggest_path(&ctx))
        .json(&json!({
            "section_id": ctx.section_id,
            "staff_id": ctx.staff_id,
            "duration_minutes": 60,
        }))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let slot: SuggestedSlot = response.json();
    assert_eq!(
        slot,
        SuggestedSlot {
            day_of_week: 0,
            start_time: time(9, 0),
            end_time: time(10, 0),
            room_id: None,
        }
    );
}

#[tokio::test]
async fn test_suggest_on_requested_day_with_room() {
    let ctx = TestContext::new();
    let server = ctx.server();

    let slot: SuggestedSlot = server
        .post(&suggest_path(&ctx))
        .json(&json!({
            "staff_id": ctx.staff_id,
            "day_of_week": 4,
            "duration_minutes": 90,
            "preferred_room_id": ctx.room_id,
        }))
        .await
        .json();

    assert_eq!(slot.day_of_week, 4);
    assert_eq!(slot.start_time, time(8, 0));
    assert_eq!(slot.end_time, time(9, 30));
    assert_eq!(slot.room_id, Some(ctx.room_id));
}

#[tokio::test]
async fn test_suggest_without_fitting_slot() {
    let ctx = TestContext::new();
    let server = ctx.server();

    // Ten hours never fit an 08:00 to 17:00 day
    let response = server
        .post(&suggest_path(&ctx))
        .json(&json!({ "section_id": ctx.section_id, "duration_minutes": 600 }))
        .await;

    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    assert_eq!(response.json::<Value>()["code"], "NO_SLOT_AVAILABLE");
}

#[tokio::test]
async fn test_suggest_unknown_references() {
    let ctx = TestContext::new();
    let server = ctx.server();

    for criteria in [
        json!({ "section_id": Uuid::new_v4(), "duration_minutes": 60 }),
        json!({ "staff_id": Uuid::new_v4(), "duration_minutes": 60 }),
        json!({ "section_id": ctx.section_id, "preferred_room_id": Uuid::new_v4(), "duration_minutes": 60 }),
    ] {
        let response = server.post(&suggest_path(&ctx)).json(&criteria).await;

        assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(response.json::<Value>()["code"], "NOT_FOUND");
    }
}

#[tokio::test]
async fn test_suggest_rejects_off_grid_duration() {
    let ctx = TestContext::new();
    let server = ctx.server();

    let response = server
        .post(&suggest_path(&ctx))
        .json(&json!({ "duration_minutes": 45 }))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["code"], "VALIDATION");
}

#[tokio::test]
async fn test_generate_with_empty_body_uses_defaults() {
    let mut ctx = TestContext::new();
    ctx.add_requirement(ctx.section_id, 3, 60);
    let server = ctx.server();

    let response = server.post(&generate_path(&ctx)).await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let report: GenerationReport = response.json();
    assert_eq!(report.placed_count, 3);
    assert!(report.unsatisfied.is_empty());
    let days: Vec<u8> = report.placements.iter().map(|entry| entry.day_of_week).collect();
    assert_eq!(days, vec![0, 1, 2]);

    let listed: Vec<TimetableEntry> = server.get(&ctx.timetable_path()).await.json();
    assert_eq!(listed.len(), 3);
}

#[tokio::test]
async fn test_generate_twice_adds_nothing() {
    let mut ctx = TestContext::new();
    ctx.add_requirement(ctx.section_id, 4, 60);
    let server = ctx.server();

    let first: GenerationReport = server.post(&generate_path(&ctx)).json(&json!({})).await.json();
    let second: GenerationReport = server.post(&generate_path(&ctx)).json(&json!({})).await.json();

    assert_eq!(first.placed_count, 4);
    assert_eq!(second.placed_count, 0);
    assert!(second.unsatisfied.is_empty());
    assert_eq!(ctx.store.entries(ctx.school_id).len(), 4);
}

#[tokio::test]
async fn test_generate_reports_unsatisfied_requirement() {
    let mut ctx = TestContext::new();
    // One eight-hour lesson fits per day, so a week holds seven
    ctx.add_requirement(ctx.section_id, 10, 480);
    let server = ctx.server();

    let report: GenerationReport = server.post(&generate_path(&ctx)).await.json();

    assert_eq!(report.placed_count, 7);
    assert_eq!(report.unsatisfied.len(), 1);
    assert_eq!(report.unsatisfied[0].missing, 3);
    assert_eq!(report.unsatisfied[0].requirement.section_id, ctx.section_id);
}

#[tokio::test]
async fn test_generate_for_target_sections() {
    let mut ctx = TestContext::new();
    let other_section = ctx.add_section("7B");
    ctx.add_requirement(ctx.section_id, 2, 60);
    ctx.add_requirement(other_section, 2, 60);
    let server = ctx.server();

    let report: GenerationReport = server
        .post(&generate_path(&ctx))
        .json(&json!({ "target_section_ids": [other_section] }))
        .await
        .json();

    assert_eq!(report.placed_count, 2);
    assert!(report.placements.iter().all(|entry| entry.section_id == other_section));
}

#[tokio::test]
async fn test_generate_unknown_target_section() {
    let ctx = TestContext::new();
    let server = ctx.server();

    let response = server
        .post(&generate_path(&ctx))
        .json(&json!({ "target_section_ids": [Uuid::new_v4()] }))
        .await;

    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_generate_rejects_malformed_options() {
    let ctx = TestContext::new();
    let server = ctx.server();

    let response = server
        .post(&generate_path(&ctx))
        .text("{\"include_pinned\": \"yes\"")
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["code"], "VALIDATION");
    assert!(ctx.store.entries(ctx.school_id).is_empty());
}
