//! # Timetabler Core
//!
//! Domain models, the error type, the storage contract and the timetable
//! scheduling engine. Nothing in this crate knows about HTTP or SQL.

pub mod errors;
pub mod models;
pub mod scheduler;
pub mod store;
