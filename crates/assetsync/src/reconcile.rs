//! Reconciler
//!
//! `sync` brings the record store in line with the asset directory;
//! `generate_tasks` turns the store snapshot plus the output directory into
//! the task list for the current cycle.

use crate::error::{AssetSyncError, Result};
use crate::scanner::DirectoryScanner;
use assetsync_db::{AssetRecord, RecordStore};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use tracing::info;

/// Summary text when nothing needs processing.
pub const UP_TO_DATE_MESSAGE: &str = "All files are up to date, no tasks to render.";

/// What a `sync` pass changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    /// Assets present in the asset directory
    pub observed: usize,
    /// New records created for assets seen for the first time
    pub inserted: usize,
    /// Records whose `modified_at` advanced
    pub updated: usize,
    /// Records removed because their asset is gone
    pub pruned: usize,
}

/// Asset names requiring processing in the current cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TaskList {
    tasks: BTreeSet<String>,
    stale: BTreeSet<String>,
    missing_artifacts: BTreeSet<String>,
    summary: String,
}

impl TaskList {
    fn new(stale: BTreeSet<String>, missing_artifacts: BTreeSet<String>) -> Self {
        let tasks: BTreeSet<String> = stale.union(&missing_artifacts).cloned().collect();
        let summary = summarize(&tasks);
        Self {
            tasks,
            stale,
            missing_artifacts,
            summary,
        }
    }

    /// All task names, ordered.
    pub fn names(&self) -> &BTreeSet<String> {
        &self.tasks
    }

    pub fn into_names(self) -> BTreeSet<String> {
        self.tasks
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tasks.contains(name)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Names whose record says `modified_at > processed_at`.
    pub fn stale(&self) -> &BTreeSet<String> {
        &self.stale
    }

    /// Names whose artifact is absent from the output directory.
    pub fn missing_artifacts(&self) -> &BTreeSet<String> {
        &self.missing_artifacts
    }

    /// Human-readable summary for the operator.
    pub fn summary(&self) -> &str {
        &self.summary
    }
}

fn summarize(tasks: &BTreeSet<String>) -> String {
    if tasks.is_empty() {
        return UP_TO_DATE_MESSAGE.to_string();
    }
    let names: Vec<&str> = tasks.iter().map(String::as_str).collect();
    format!(
        "There are {} new or updated assets in the task list: {}.",
        tasks.len(),
        names.join(", ")
    )
}

/// Synchronize the record store with the asset directory.
///
/// Upserts every observed asset, then prunes records whose asset is gone.
/// Pruning uses exactly the freshly observed names, so an asset present in
/// the directory is never deleted and re-inserted with a reset
/// `processed_at`.
pub async fn sync<S>(store: &RecordStore, scanner: &S, asset_dir: &Path) -> Result<SyncReport>
where
    S: DirectoryScanner,
{
    let assets = scanner.list_assets(asset_dir).await?;

    let upserts = store
        .upsert_many(assets.iter().map(|a| (a.name.as_str(), a.modified_at)))
        .await
        .map_err(|e| AssetSyncError::store(store, e))?;

    let observed: BTreeSet<String> = assets.into_iter().map(|a| a.name).collect();
    let pruned = store
        .delete_missing(&observed)
        .await
        .map_err(|e| AssetSyncError::store(store, e))?;

    let report = SyncReport {
        observed: observed.len(),
        inserted: upserts.inserted,
        updated: upserts.updated,
        pruned,
    };
    info!(
        asset_dir = %asset_dir.display(),
        observed = report.observed,
        inserted = report.inserted,
        updated = report.updated,
        pruned = report.pruned,
        "Record store synchronized"
    );
    Ok(report)
}

/// Compute the task list: stale records plus records missing their artifact.
///
/// Trusts the store snapshot; an asset deleted since the last `sync` can
/// still appear until the next `sync` prunes it.
pub async fn generate_tasks<S>(store: &RecordStore, scanner: &S, output_dir: &Path) -> Result<TaskList>
where
    S: DirectoryScanner,
{
    let records: BTreeMap<String, AssetRecord> = store
        .list()
        .await
        .map_err(|e| AssetSyncError::store(store, e))?
        .into_iter()
        .map(|record| (record.name.clone(), record))
        .collect();

    let present_outputs = scanner.list_output_names(output_dir).await?;

    let stale: BTreeSet<String> = records
        .values()
        .filter(|record| record.is_stale())
        .map(|record| record.name.clone())
        .collect();
    let missing_artifacts: BTreeSet<String> = records
        .keys()
        .filter(|name| !present_outputs.contains(*name))
        .cloned()
        .collect();

    let tasks = TaskList::new(stale, missing_artifacts);
    info!(
        tasks = tasks.len(),
        stale = tasks.stale().len(),
        missing_artifacts = tasks.missing_artifacts().len(),
        "Task list generated"
    );
    Ok(tasks)
}
