//! crates/challenge_core/src/ports.rs
//!
//! Defines the service contracts (traits) the progression engine depends on.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to stay independent of concrete storage backends, content catalogs and clocks.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{ContentRef, ResolvedContent};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., database, files).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// Durable storage for one serialized progress record per key.
///
/// `get` returns `Ok(None)` only when the key is absent. Any failure to read must be
/// an `Err`, so callers can tell "not started" apart from "storage is down".
/// `set` replaces the whole value; implementations must never merge fields.
#[async_trait]
pub trait ProgressStore: Send + Sync {
    async fn get(&self, key: &str) -> PortResult<Option<String>>;

    async fn set(&self, key: &str, value: &str) -> PortResult<()>;

    async fn delete(&self, key: &str) -> PortResult<()>;
}

#[async_trait]
pub trait ContentResolver: Send + Sync {
    /// Hydrates every reference, in order. Fails with `NotFound` if any is unknown.
    async fn resolve(&self, refs: &[ContentRef]) -> PortResult<Vec<ResolvedContent>>;
}

/// Source of "now" for all calendar arithmetic.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// The wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
