pub mod scheduling;
pub mod timetable;
