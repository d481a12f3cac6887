//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the `ProgressStore` port from the `core` crate. It keeps one serialized
//! progress record per key in PostgreSQL using `sqlx`.

use async_trait::async_trait;
use challenge_core::ports::{PortError, PortResult, ProgressStore};
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use tracing::debug;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `ProgressStore` port.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::Error> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

//=========================================================================================
// Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct ProgressRow {
    payload: String,
    updated_at: DateTime<Utc>,
}

fn unexpected(e: sqlx::Error) -> PortError {
    PortError::Unexpected(e.to_string())
}

//=========================================================================================
// `ProgressStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl ProgressStore for DbAdapter {
    async fn get(&self, key: &str) -> PortResult<Option<String>> {
        let row = sqlx::query_as::<_, ProgressRow>(
            "SELECT payload, updated_at FROM progress_records WHERE record_key = $1",
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;

        Ok(row.map(|row| {
            debug!(key, updated_at = %row.updated_at, "Loaded progress record");
            row.payload
        }))
    }

    async fn set(&self, key: &str, value: &str) -> PortResult<()> {
        sqlx::query(
            "INSERT INTO progress_records (record_key, payload, updated_at) VALUES ($1, $2, NOW()) \
             ON CONFLICT (record_key) DO UPDATE SET payload = EXCLUDED.payload, updated_at = NOW()",
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> PortResult<()> {
        sqlx::query("DELETE FROM progress_records WHERE record_key = $1")
            .bind(key)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }
}
