//! Batch completion tracker
//!
//! Stamps a processed batch with one shared timestamp. Only names the
//! processor reported as succeeded belong here; anything left out stays
//! stale and comes back in the next task list.

use crate::error::{AssetSyncError, Result};
use assetsync_db::RecordStore;
use serde::Serialize;
use tracing::{info, warn};

/// Outcome of marking a batch processed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionReport {
    /// Names passed in
    pub requested: usize,
    /// Records that matched and were stamped
    pub marked: usize,
    /// Timestamp shared by the whole batch
    pub processed_at: f64,
}

/// Mark `names` processed as of now.
pub async fn complete(store: &RecordStore, names: &[String]) -> Result<CompletionReport> {
    complete_at(store, names, RecordStore::now_secs()).await
}

/// Mark `names` processed as of `at`, atomically.
pub async fn complete_at(store: &RecordStore, names: &[String], at: f64) -> Result<CompletionReport> {
    if names.is_empty() {
        return Ok(CompletionReport {
            requested: 0,
            marked: 0,
            processed_at: at,
        });
    }

    let marked = store
        .mark_processed(names, at)
        .await
        .map_err(|e| AssetSyncError::store(store, e))?;

    if marked < names.len() {
        warn!(
            requested = names.len(),
            marked,
            "Some completed names have no record; they were ignored"
        );
    }
    info!(marked, processed_at = at, "Batch marked processed");

    Ok(CompletionReport {
        requested: names.len(),
        marked,
        processed_at: at,
    })
}
