//! libSQL-backed local cache — the persisted single-slot profile mirror.
//!
//! One `profile_cache` table keyed by slot name. `cached_at` records when
//! the slot was last overwritten; it is bookkeeping only and is never
//! consulted for staleness (the mirror may be arbitrarily old by design).

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use libsql::{Connection, Database as LibSqlDatabase, params};
use tracing::info;

use crate::error::StoreError;
use crate::store::traits::ProfileCache;

/// libSQL cache backend. Local file or in-memory.
///
/// Stores a single connection that is reused for all operations.
/// `libsql::Connection` is `Send + Sync` and safe for concurrent async use.
pub struct LibSqlCache {
    #[allow(dead_code)]
    db: Arc<LibSqlDatabase>,
    conn: Connection,
}

impl LibSqlCache {
    /// Open (or create) a local cache file and initialize the schema.
    pub async fn new_local(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| StoreError::Cache(format!("Failed to create cache directory: {e}")))?;
        }

        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(|e| StoreError::Cache(format!("Failed to open cache database: {e}")))?;

        let conn = db
            .connect()
            .map_err(|e| StoreError::Cache(format!("Failed to create connection: {e}")))?;

        let cache = Self {
            db: Arc::new(db),
            conn,
        };
        cache.init_schema().await?;
        info!(path = %path.display(), "Profile cache opened");
        Ok(cache)
    }

    /// Create an in-memory cache (for tests).
    pub async fn new_memory() -> Result<Self, StoreError> {
        let db = libsql::Builder::new_local(":memory:")
            .build()
            .await
            .map_err(|e| StoreError::Cache(format!("Failed to create in-memory cache: {e}")))?;

        let conn = db
            .connect()
            .map_err(|e| StoreError::Cache(format!("Failed to create connection: {e}")))?;

        let cache = Self {
            db: Arc::new(db),
            conn,
        };
        cache.init_schema().await?;
        Ok(cache)
    }

    async fn init_schema(&self) -> Result<(), StoreError> {
        self.conn
            .execute(
                "CREATE TABLE IF NOT EXISTS profile_cache (
                    key TEXT PRIMARY KEY,
                    value TEXT NOT NULL,
                    cached_at TEXT NOT NULL
                )",
                (),
            )
            .await
            .map_err(|e| StoreError::Cache(format!("init_schema: {e}")))?;
        Ok(())
    }
}

#[async_trait]
impl ProfileCache for LibSqlCache {
    async fn put(&self, key: &str, serialized: &str) -> Result<(), StoreError> {
        let now = Utc::now().to_rfc3339();
        self.conn
            .execute(
                "INSERT INTO profile_cache (key, value, cached_at) VALUES (?1, ?2, ?3)
                 ON CONFLICT (key) DO UPDATE SET value = ?2, cached_at = ?3",
                params![key, serialized, now],
            )
            .await
            .map_err(|e| StoreError::Cache(format!("put: {e}")))?;
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let mut rows = self
            .conn
            .query(
                "SELECT value FROM profile_cache WHERE key = ?1",
                params![key],
            )
            .await
            .map_err(|e| StoreError::Cache(format!("get: {e}")))?;

        match rows.next().await {
            Ok(Some(row)) => {
                let value: String = row
                    .get(0)
                    .map_err(|e| StoreError::Cache(format!("get: {e}")))?;
                Ok(Some(value))
            }
            Ok(None) => Ok(None),
            Err(e) => Err(StoreError::Cache(format!("get: {e}"))),
        }
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.conn
            .execute("DELETE FROM profile_cache WHERE key = ?1", params![key])
            .await
            .map_err(|e| StoreError::Cache(format!("remove: {e}")))?;
        Ok(())
    }
}
