//! crates/challenge_core/src/error.rs
//!
//! Error types for the progression engine and the program definition loader.

use crate::domain::DayNumber;
use crate::ports::PortError;

/// Failures surfaced by `ProgressionEngine` operations.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// A per-day operation was called with a day outside `1..=total`.
    /// Raised before any storage access.
    #[error("Day {day} is outside the program range 1..={total}")]
    InvalidDay { day: DayNumber, total: DayNumber },

    #[error("No challenge is in progress")]
    NotStarted,

    /// `start` was called on a finished run; only `reset` leaves that state.
    #[error("The challenge is already completed; reset it to start again")]
    AlreadyCompleted,

    #[error("The streak freeze has already been used")]
    FreezeUnavailable,

    /// The progress store failed to read, write or delete.
    #[error("Storage error: {0}")]
    Storage(#[source] PortError),

    /// The content resolver failed while assembling a day bundle.
    #[error("Content resolution error: {0}")]
    Content(#[source] PortError),

    #[error("Stored progress record is malformed: {0}")]
    MalformedRecord(#[from] serde_json::Error),
}

pub type EngineResult<T> = Result<T, EngineError>;

/// Failures while loading or validating a program definition.
#[derive(Debug, thiserror::Error)]
pub enum ProgramError {
    #[error("Failed to read program definition: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse program definition: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid program definition: {0}")]
    Invalid(String),
}
