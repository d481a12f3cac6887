//! services/api/src/adapters/content.rs
//!
//! A `ContentResolver` backed by a JSON catalog file mapping `kind:id` keys to
//! hydrated content.

use async_trait::async_trait;
use challenge_core::domain::{ContentRef, ResolvedContent};
use challenge_core::ports::{ContentResolver, PortError, PortResult};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

#[derive(Deserialize)]
struct CatalogFile {
    entries: HashMap<String, CatalogEntry>,
}

#[derive(Deserialize, Clone)]
struct CatalogEntry {
    #[serde(default)]
    title: Option<String>,
    body: String,
    #[serde(default)]
    source: Option<String>,
}

pub struct JsonContentResolver {
    entries: HashMap<String, CatalogEntry>,
}

impl JsonContentResolver {
    pub fn from_json_str(json: &str) -> PortResult<Self> {
        let file: CatalogFile = serde_json::from_str(json)
            .map_err(|e| PortError::Unexpected(format!("Invalid content catalog: {}", e)))?;
        Ok(Self {
            entries: file.entries,
        })
    }

    pub fn load(path: impl AsRef<Path>) -> PortResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            PortError::Unexpected(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_json_str(&json)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl ContentResolver for JsonContentResolver {
    async fn resolve(&self, refs: &[ContentRef]) -> PortResult<Vec<ResolvedContent>> {
        refs.iter()
            .map(|reference| {
                let key = reference.key();
                let entry = self
                    .entries
                    .get(&key)
                    .ok_or_else(|| PortError::NotFound(format!("Content {} not found", key)))?;
                Ok(ResolvedContent {
                    reference: reference.clone(),
                    title: entry.title.clone(),
                    body: entry.body.clone(),
                    source: entry.source.clone(),
                })
            })
            .collect()
    }
}
