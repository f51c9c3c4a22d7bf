pub mod catalog;
pub mod conflict;
pub mod constraints;
pub mod entry;
pub mod scheduling;
pub mod time;
