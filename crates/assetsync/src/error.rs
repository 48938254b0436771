//! Error types for assetsync

use assetsync_db::{DbError, RecordStore};
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that abort a reconciliation cycle.
///
/// Per-asset processing failures are not errors; they are reported by the
/// processor and leave the asset stale for the next cycle.
#[derive(Error, Debug)]
pub enum AssetSyncError {
    #[error("Record store unavailable at {}: {source}", location.display())]
    StoreUnavailable {
        location: PathBuf,
        #[source]
        source: DbError,
    },

    #[error("Directory unavailable: {}: {source}", path.display())]
    DirectoryUnavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Config error: {0}")]
    Config(String),
}

impl AssetSyncError {
    /// Wrap a store failure with the store's location.
    pub fn store(store: &RecordStore, source: DbError) -> Self {
        Self::StoreUnavailable {
            location: store.location().to_path_buf(),
            source,
        }
    }

    /// Wrap a failure to open the store at `location`.
    pub fn store_at(location: &Path, source: DbError) -> Self {
        Self::StoreUnavailable {
            location: location.to_path_buf(),
            source,
        }
    }

    /// Wrap a directory read failure.
    pub fn directory(path: &Path, source: io::Error) -> Self {
        Self::DirectoryUnavailable {
            path: path.to_path_buf(),
            source,
        }
    }

    /// Create a config error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Whether this is a directory failure.
    pub fn is_directory_unavailable(&self) -> bool {
        matches!(self, Self::DirectoryUnavailable { .. })
    }

    /// Whether this is a store failure.
    pub fn is_store_unavailable(&self) -> bool {
        matches!(self, Self::StoreUnavailable { .. })
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, AssetSyncError>;
