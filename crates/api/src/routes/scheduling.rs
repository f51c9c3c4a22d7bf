use axum::{Router, routing::post};
use std::sync::Arc;

use crate::{ApiState, handlers};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route(
            "/api/schools/:school_id/timetable/suggest",
            post(handlers::scheduling::suggest_slot),
        )
        .route(
            "/api/schools/:school_id/timetable/generate",
            post(handlers::scheduling::generate),
        )
}
