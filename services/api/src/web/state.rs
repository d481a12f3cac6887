//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::config::Config;
use challenge_core::ports::{Clock, ContentResolver, ProgressStore};
use challenge_core::{Program, ProgressionEngine};
use std::sync::Arc;
use uuid::Uuid;

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub program: Arc<Program>,
    pub store: Arc<dyn ProgressStore>,
    pub content: Arc<dyn ContentResolver>,
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    /// An engine bound to the progress record of `user_id`.
    pub fn engine_for(&self, user_id: Uuid) -> ProgressionEngine {
        ProgressionEngine::new(
            self.program.clone(),
            self.store.clone(),
            self.clock.clone(),
            record_key(user_id),
        )
        .with_utc_offset(self.config.day_boundary)
    }
}

/// Storage key of a user's progress record.
pub fn record_key(user_id: Uuid) -> String {
    format!("challenge-progress:{}", user_id)
}
