//! Timetable scheduling engine.
//!
//! Leaves first: [`grid`] turns school hours into candidate slots,
//! [`availability`] indexes what is occupied, [`conflict`] explains why a
//! candidate is blocked, [`suggest`] finds the next free slot, [`generator`]
//! plans a whole week, and [`writer`] is the single path that persists
//! entries. [`service`] wires them to a store per request.

pub mod availability;
pub mod conflict;
pub mod generator;
pub mod grid;
pub mod lock;
pub mod service;
pub mod suggest;
pub mod writer;

pub use service::TimetableService;
