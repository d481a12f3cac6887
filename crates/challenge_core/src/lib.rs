pub mod calendar;
pub mod domain;
pub mod engine;
pub mod error;
pub mod ports;
pub mod program;
pub mod record;
pub mod streak;

pub use domain::{
    Badge, CompletionOutcome, ContentRef, DayBundle, DayDescriptor, DayNumber, ProgramStatus,
    ProgressOverview, ProgressRecord, ResolvedContent, Theme,
};
pub use engine::ProgressionEngine;
pub use error::{EngineError, EngineResult, ProgramError};
pub use ports::{Clock, ContentResolver, PortError, PortResult, ProgressStore, SystemClock};
pub use program::Program;
