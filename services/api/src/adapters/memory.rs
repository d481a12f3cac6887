//! services/api/src/adapters/memory.rs
//!
//! A process-local `ProgressStore`, used when no database is configured.

use async_trait::async_trait;
use challenge_core::ports::{PortResult, ProgressStore};
use std::collections::HashMap;
use tokio::sync::RwLock;

#[derive(Default)]
pub struct InMemoryProgressStore {
    records: RwLock<HashMap<String, String>>,
}

impl InMemoryProgressStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProgressStore for InMemoryProgressStore {
    async fn get(&self, key: &str) -> PortResult<Option<String>> {
        Ok(self.records.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> PortResult<()> {
        self.records
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn delete(&self, key: &str) -> PortResult<()> {
        self.records.write().await.remove(key);
        Ok(())
    }
}
