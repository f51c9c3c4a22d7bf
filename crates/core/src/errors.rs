use thiserror::Error;

use crate::models::conflict::{ConflictReason, format_reasons};

#[derive(Error, Debug)]
pub enum TimetableError {
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Scheduling conflict: {}", format_reasons(.0))]
    Conflict(Vec<ConflictReason>),

    #[error("No slot available for the requested criteria")]
    NoSlotAvailable,

    #[error("Generation already running: {0}")]
    Busy(String),

    #[error("Database error: {0}")]
    Database(#[from] eyre::Report),

    #[error("Internal server error: {0}")]
    Internal(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl TimetableError {
    /// Stable machine-readable code for the error class.
    pub fn code(&self) -> &'static str {
        match self {
            TimetableError::NotFound(_) => "NOT_FOUND",
            TimetableError::Validation(_) => "VALIDATION",
            TimetableError::Conflict(_) => "CONFLICT",
            TimetableError::NoSlotAvailable => "NO_SLOT_AVAILABLE",
            TimetableError::Busy(_) => "BUSY",
            TimetableError::Database(_) | TimetableError::Internal(_) => "INTERNAL",
        }
    }
}

pub type TimetableResult<T> = Result<T, TimetableError>;
