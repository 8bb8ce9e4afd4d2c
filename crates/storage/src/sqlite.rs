//! SQLite-backed key/value storage.

use std::path::Path;

use anyhow::Context;
use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Row, SqlitePool};
use tokio::runtime::Runtime;

use crate::backend::CartStorage;
use crate::error::StorageResult;

/// SQLite storage behind the synchronous [`CartStorage`] API.
///
/// Owns a single-threaded runtime and blocks on it, so it must not be
/// called from inside another tokio runtime.
#[derive(Debug)]
pub struct SqliteStorage {
    pool: SqlitePool,
    runtime: Runtime,
}

impl SqliteStorage {
    /// Open (or create) a database file.
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create storage directory at {parent:?}"))?;
        }
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);
        Self::connect(options, 4)
    }

    /// Private in-memory database (tests/dev).
    pub fn open_in_memory() -> StorageResult<Self> {
        let options = SqliteConnectOptions::new().in_memory(true);
        // Every connection to :memory: is its own database.
        Self::connect(options, 1)
    }

    fn connect(options: SqliteConnectOptions, max_connections: u32) -> StorageResult<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .context("failed to create runtime for SqliteStorage")?;

        let pool = runtime.block_on(async {
            let pool = SqlitePoolOptions::new()
                .max_connections(max_connections)
                .connect_with(options)
                .await
                .context("failed to create SQLite pool")?;

            sqlx::query(
                r#"
                CREATE TABLE IF NOT EXISTS kv_store (
                    key        TEXT PRIMARY KEY,
                    value      TEXT NOT NULL,
                    updated_at TEXT NOT NULL
                )
                "#,
            )
            .execute(&pool)
            .await
            .context("failed to create kv_store table")?;

            Ok::<_, anyhow::Error>(pool)
        })?;

        Ok(Self { pool, runtime })
    }
}

impl CartStorage for SqliteStorage {
    fn load(&self, key: &str) -> StorageResult<Option<String>> {
        let row = self.runtime.block_on(async {
            sqlx::query("SELECT value FROM kv_store WHERE key = ?1")
                .bind(key)
                .fetch_optional(&self.pool)
                .await
                .with_context(|| format!("failed to fetch {key} from kv_store"))
        })?;

        match row {
            Some(row) => {
                let value: String = row.try_get("value").context("kv_store.value is not text")?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    fn save(&self, key: &str, value: &str) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        self.runtime.block_on(async {
            sqlx::query(
                r#"
                INSERT INTO kv_store (key, value, updated_at)
                VALUES (?1, ?2, ?3)
                ON CONFLICT(key)
                DO UPDATE SET
                    value = excluded.value,
                    updated_at = excluded.updated_at
                "#,
            )
            .bind(key)
            .bind(value)
            .bind(&now)
            .execute(&self.pool)
            .await
            .with_context(|| format!("failed to upsert {key} in kv_store"))
        })?;
        Ok(())
    }
}
