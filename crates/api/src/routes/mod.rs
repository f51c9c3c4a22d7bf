pub mod health;
pub mod scheduling;
pub mod timetable;
