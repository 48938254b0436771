//! Reconciliation cycle
//!
//! sync → generate_tasks → processor → complete. The record store is opened
//! at the start of a cycle and closed on every exit path. A store or
//! directory failure aborts the cycle; whatever atomic step already
//! committed stays committed.

use crate::config::Library;
use crate::error::{AssetSyncError, Result};
use crate::processor::{ProcessReport, ProcessingParams, Processor, RenderTask};
use crate::reconcile::{self, SyncReport, TaskList};
use crate::scanner::DirectoryScanner;
use crate::tracker::{self, CompletionReport};
use assetsync_db::RecordStore;
use serde::Serialize;
use std::collections::BTreeSet;
use std::io;
use std::path::Path;
use tracing::{info, warn};

/// Result of `update`: the store is in sync and the task list is known.
#[derive(Debug, Clone, Serialize)]
pub struct UpdateReport {
    pub sync: SyncReport,
    pub tasks: TaskList,
}

/// Result of a full cycle.
#[derive(Debug, Clone, Serialize)]
pub struct CycleReport {
    pub sync: SyncReport,
    pub tasks: TaskList,
    /// `None` when there was nothing to process
    pub processed: Option<ProcessReport>,
    pub completion: Option<CompletionReport>,
    /// Operator-facing lines, in display order
    pub messages: Vec<String>,
}

/// Fail with `DirectoryUnavailable` unless every path is an existing directory.
pub async fn check_directories(dirs: &[&Path]) -> Result<()> {
    for dir in dirs {
        match tokio::fs::metadata(dir).await {
            Ok(metadata) if metadata.is_dir() => {}
            Ok(_) => {
                return Err(AssetSyncError::directory(
                    dir,
                    io::Error::new(io::ErrorKind::Other, "not a directory"),
                ))
            }
            Err(err) => return Err(AssetSyncError::directory(dir, err)),
        }
    }
    Ok(())
}

/// Open the library's record store.
pub async fn open_store(library: &Library) -> Result<RecordStore> {
    RecordStore::open_with(&library.database_path, library.store_options())
        .await
        .map_err(|e| AssetSyncError::store_at(&library.database_path, e))
}

/// Synchronize the store and compute the task list without processing.
pub async fn update<S>(library: &Library, scanner: &S) -> Result<UpdateReport>
where
    S: DirectoryScanner,
{
    check_directories(&[library.asset_dir.as_path(), library.output_dir.as_path()]).await?;

    let store = open_store(library).await?;
    let result = update_with_store(&store, library, scanner).await;
    store.close().await;
    result
}

async fn update_with_store<S>(store: &RecordStore, library: &Library, scanner: &S) -> Result<UpdateReport>
where
    S: DirectoryScanner,
{
    let sync = reconcile::sync(store, scanner, &library.asset_dir).await?;
    let tasks = reconcile::generate_tasks(store, scanner, &library.output_dir).await?;
    info!(summary = tasks.summary(), "Update complete");
    Ok(UpdateReport { sync, tasks })
}

/// Run one full cycle with `processor`.
pub async fn run_cycle<S, P>(
    library: &Library,
    scanner: &S,
    processor: &P,
    params: &ProcessingParams,
) -> Result<CycleReport>
where
    S: DirectoryScanner,
    P: Processor,
{
    check_directories(&[library.asset_dir.as_path(), library.output_dir.as_path()]).await?;

    let store = open_store(library).await?;
    let result = cycle_with_store(&store, library, scanner, processor, params).await;
    store.close().await;
    result
}

async fn cycle_with_store<S, P>(
    store: &RecordStore,
    library: &Library,
    scanner: &S,
    processor: &P,
    params: &ProcessingParams,
) -> Result<CycleReport>
where
    S: DirectoryScanner,
    P: Processor,
{
    let UpdateReport { sync, tasks } = update_with_store(store, library, scanner).await?;
    let mut messages = vec![tasks.summary().to_string()];

    if tasks.is_empty() {
        return Ok(CycleReport {
            sync,
            tasks,
            processed: None,
            completion: None,
            messages,
        });
    }

    let batch: Vec<RenderTask> = tasks
        .names()
        .iter()
        .map(|name| RenderTask {
            name: name.clone(),
            asset_path: library.asset_path(name),
            output_path: library.output_path(name),
        })
        .collect();

    // Stamped with the batch start so edits made while processing stay stale.
    let started_at = RecordStore::now_secs();
    let report = processor.process(&batch, params).await;
    messages.extend(report.messages(batch.len()));

    let succeeded = accepted_successes(&tasks, &report);
    let completion = tracker::complete_at(store, &succeeded, started_at).await?;

    Ok(CycleReport {
        sync,
        tasks,
        processed: Some(report),
        completion: Some(completion),
        messages,
    })
}

/// Succeeded names that were actually in the task list and not also failed.
fn accepted_successes(tasks: &TaskList, report: &ProcessReport) -> Vec<String> {
    let failed: BTreeSet<&str> = report.failed.iter().map(String::as_str).collect();
    let mut accepted = BTreeSet::new();

    for name in &report.succeeded {
        if !tasks.contains(name) {
            warn!(task = %name, "Processor reported a task that was not requested");
        } else if failed.contains(name.as_str()) {
            warn!(task = %name, "Processor reported a task as both succeeded and failed");
        } else {
            accepted.insert(name.clone());
        }
    }

    accepted.into_iter().collect()
}
