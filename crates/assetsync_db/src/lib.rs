//! Durable record store for assetsync
//!
//! One SQLite table keyed by asset name holds what the system believes about
//! every asset: when it was last modified and when it was last processed.
//! All other components read and write asset state through [`RecordStore`].
//!
//! # Usage
//!
//! ```rust,ignore
//! use assetsync_db::{RecordStore, StoreOptions};
//!
//! let store = RecordStore::open("/library/Shaders/materials.db").await?;
//! store.upsert("wood", 1_700_000_000.0).await?;
//! let stale: Vec<_> = store.list().await?.into_iter().filter(|r| r.is_stale()).collect();
//! store.mark_processed(&["wood".to_string()], 1_700_000_100.0).await?;
//! store.close().await;
//! ```

mod error;
mod records;
mod schema;
mod types;

pub use error::{DbError, Result};
pub use schema::ASSET_TABLE;
pub use types::*;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteSynchronous};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

/// Connection settings for [`RecordStore::open_with`].
#[derive(Debug, Clone)]
pub struct StoreOptions {
    /// How long to wait for a pooled connection and for SQLite locks
    pub timeout: Duration,
    /// Maximum pooled connections
    pub max_connections: u32,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            max_connections: 4,
        }
    }
}

/// Handle to the asset record table.
///
/// Cloning is cheap and shares the underlying pool.
#[derive(Clone)]
pub struct RecordStore {
    pool: SqlitePool,
    location: PathBuf,
}

impl RecordStore {
    /// Open or create the store at the given path with default options.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with(path, StoreOptions::default()).await
    }

    /// Open or create the store at the given path.
    ///
    /// Creates the parent directory and the schema if they don't exist.
    pub async fn open_with(path: impl AsRef<Path>, options: StoreOptions) -> Result<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let connect_options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(options.timeout);

        let pool = SqlitePoolOptions::new()
            .max_connections(options.max_connections.max(1))
            .acquire_timeout(options.timeout)
            .connect_with(connect_options)
            .await?;

        let store = Self {
            pool,
            location: path.to_path_buf(),
        };
        store.ensure_schema().await?;

        info!(path = %path.display(), "Record store opened");

        Ok(store)
    }

    /// Where the store lives on disk.
    pub fn location(&self) -> &Path {
        &self.location
    }

    /// Get the underlying connection pool (escape hatch for tests and tooling).
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close the store. Safe to call more than once.
    pub async fn close(&self) {
        if !self.pool.is_closed() {
            self.pool.close().await;
            info!(path = %self.location.display(), "Record store closed");
        }
    }

    /// Whether [`RecordStore::close`] has been called.
    pub fn is_closed(&self) -> bool {
        self.pool.is_closed()
    }
}

// Timestamp utilities
impl RecordStore {
    /// Current time as fractional seconds since the Unix epoch.
    pub fn now_secs() -> f64 {
        let now = chrono::Utc::now();
        now.timestamp() as f64 + f64::from(now.timestamp_subsec_micros()) / 1_000_000.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_open_creates_database() {
        let tmp = TempDir::new().unwrap();
        let db_path = tmp.path().join("nested").join("materials.db");

        let store = RecordStore::open(&db_path).await.unwrap();
        assert!(db_path.exists());
        assert_eq!(store.location(), db_path.as_path());

        store.close().await;
    }

    #[tokio::test]
    async fn test_reopen_keeps_rows() {
        let tmp = TempDir::new().unwrap();
        let db_path = tmp.path().join("materials.db");

        let store = RecordStore::open(&db_path).await.unwrap();
        store.upsert("wood", 100.0).await.unwrap();
        store.close().await;

        let store = RecordStore::open(&db_path).await.unwrap();
        let records = store.list().await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "wood");
        store.close().await;
    }

    #[tokio::test]
    async fn test_close_is_idempotent() {
        let tmp = TempDir::new().unwrap();
        let store = RecordStore::open(tmp.path().join("materials.db")).await.unwrap();

        store.close().await;
        store.close().await;
        assert!(store.is_closed());

        let err = store.list().await.unwrap_err();
        assert!(matches!(err, DbError::Closed), "unexpected error: {err}");
    }

    #[tokio::test]
    async fn test_open_fails_when_location_is_a_directory() {
        let tmp = TempDir::new().unwrap();
        let result = RecordStore::open(tmp.path()).await;
        assert!(result.is_err());
    }

    #[test]
    fn test_now_secs_is_recent() {
        // 2020-01-01T00:00:00Z
        assert!(RecordStore::now_secs() > 1_577_836_800.0);
    }
}
