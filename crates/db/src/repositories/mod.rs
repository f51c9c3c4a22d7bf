pub mod catalog;
pub mod constraints;
pub mod entries;
