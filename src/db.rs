//! Persistence substrate for the appointment store.
//!
//! The store only needs "load everything" and "store everything" under one
//! named slot, so the seam is a tiny key/value blob interface. Production runs
//! keep slots in a SQLite table managed by sqlx; tests and ephemeral runs use
//! the in-memory implementation.

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::RwLock;

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use thiserror::Error;

/// Type alias for the application database pool.
pub type AppDb = SqlitePool;

#[derive(Debug, Error)]
pub enum SlotError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("slot storage unavailable: {0}")]
    Unavailable(String),
}

/// Named blob storage: load-all / store-all per slot.
#[async_trait]
pub trait SlotStore: Send + Sync {
    /// Stored blob for `slot`, or `None` if nothing was ever saved there.
    async fn load(&self, slot: &str) -> Result<Option<String>, SlotError>;

    /// Replace the blob stored under `slot`.
    async fn save(&self, slot: &str, blob: &str) -> Result<(), SlotError>;
}

/// Open (creating if needed) the SQLite database at `url` and run migrations.
pub async fn connect(url: &str) -> Result<AppDb, SlotError> {
    let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;
    Ok(pool)
}

// ============================================================================
// SQLite
// ============================================================================

#[derive(Debug, Clone)]
pub struct SqliteSlotStore {
    pool: AppDb,
}

impl SqliteSlotStore {
    pub fn new(pool: AppDb) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SlotStore for SqliteSlotStore {
    async fn load(&self, slot: &str) -> Result<Option<String>, SlotError> {
        let value = sqlx::query_scalar::<_, String>("SELECT value FROM kv_slots WHERE slot = ?")
            .bind(slot)
            .fetch_optional(&self.pool)
            .await?;
        Ok(value)
    }

    async fn save(&self, slot: &str, blob: &str) -> Result<(), SlotError> {
        sqlx::query(
            r#"
            INSERT INTO kv_slots (slot, value, updated_at)
            VALUES (?, ?, CURRENT_TIMESTAMP)
            ON CONFLICT(slot) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(slot)
        .bind(blob)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

// ============================================================================
// In-memory
// ============================================================================

#[derive(Debug, Default)]
pub struct MemorySlotStore {
    slots: RwLock<HashMap<String, String>>,
}

impl MemorySlotStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SlotStore for MemorySlotStore {
    async fn load(&self, slot: &str) -> Result<Option<String>, SlotError> {
        let slots = self
            .slots
            .read()
            .map_err(|_| SlotError::Unavailable("slot map lock poisoned".into()))?;
        Ok(slots.get(slot).cloned())
    }

    async fn save(&self, slot: &str, blob: &str) -> Result<(), SlotError> {
        let mut slots = self
            .slots
            .write()
            .map_err(|_| SlotError::Unavailable("slot map lock poisoned".into()))?;
        slots.insert(slot.to_string(), blob.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_slot_roundtrip() {
        let slots = MemorySlotStore::new();
        assert_eq!(slots.load("appointments").await.unwrap(), None);

        slots.save("appointments", "[]").await.unwrap();
        slots.save("appointments", "[1]").await.unwrap();
        assert_eq!(slots.load("appointments").await.unwrap().as_deref(), Some("[1]"));
        assert_eq!(slots.load("other").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_sqlite_slot_upsert_survives_reconnect() {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}", dir.path().join("slots.db").display());

        let pool = connect(&url).await.unwrap();
        let slots = SqliteSlotStore::new(pool.clone());
        slots.save("appointments", "[]").await.unwrap();
        slots.save("appointments", r#"[{"a":1}]"#).await.unwrap();
        pool.close().await;

        let reopened = SqliteSlotStore::new(connect(&url).await.unwrap());
        assert_eq!(
            reopened.load("appointments").await.unwrap().as_deref(),
            Some(r#"[{"a":1}]"#)
        );
        assert_eq!(reopened.load("missing").await.unwrap(), None);
    }
}
