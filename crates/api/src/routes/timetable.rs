use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;

use crate::{ApiState, handlers};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route(
            "/api/schools/:school_id/timetable",
            get(handlers::timetable::list_entries).post(handlers::timetable::create_entry),
        )
        .route(
            "/api/schools/:school_id/timetable/check",
            post(handlers::timetable::check_conflicts),
        )
        .route(
            "/api/schools/:school_id/timetable/:id",
            get(handlers::timetable::get_entry)
                .put(handlers::timetable::update_entry)
                .delete(handlers::timetable::delete_entry),
        )
}
