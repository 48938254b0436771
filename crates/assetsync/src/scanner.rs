//! Directory scanner
//!
//! Snapshots the asset and output directories. Nothing is cached: every call
//! re-reads the directory, so results reflect the directory at call time.

use crate::error::{AssetSyncError, Result};
use crate::naming::NamingConvention;
use std::collections::BTreeSet;
use std::fs::{self, Metadata};
use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, UNIX_EPOCH};
use tracing::{debug, trace, warn};

/// An asset file seen in the asset directory.
#[derive(Debug, Clone, PartialEq)]
pub struct ScannedAsset {
    pub name: String,
    /// Filesystem mtime, seconds since the Unix epoch
    pub modified_at: f64,
}

/// Source of directory snapshots for the reconciler.
pub trait DirectoryScanner: Send + Sync {
    /// Assets in `asset_dir` with their modification times, sorted by name.
    fn list_assets(
        &self,
        asset_dir: &Path,
    ) -> impl Future<Output = Result<Vec<ScannedAsset>>> + Send;

    /// Asset names whose artifact exists in `output_dir`.
    fn list_output_names(
        &self,
        output_dir: &Path,
    ) -> impl Future<Output = Result<BTreeSet<String>>> + Send;
}

/// Local filesystem scanner.
///
/// Listings run on the blocking pool and give up after `timeout`, so a hung
/// network mount surfaces as `DirectoryUnavailable` instead of a stuck cycle.
#[derive(Debug, Clone)]
pub struct FsScanner {
    naming: NamingConvention,
    timeout: Duration,
}

impl FsScanner {
    pub fn new(naming: NamingConvention) -> Self {
        Self {
            naming,
            timeout: Duration::from_secs(30),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn naming(&self) -> &NamingConvention {
        &self.naming
    }

    async fn run_blocking<T, F>(&self, dir: &Path, op: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&Path, &NamingConvention) -> io::Result<T> + Send + 'static,
    {
        let owned_dir: PathBuf = dir.to_path_buf();
        let naming = self.naming.clone();
        let task = tokio::task::spawn_blocking(move || op(&owned_dir, &naming));

        match tokio::time::timeout(self.timeout, task).await {
            Ok(Ok(Ok(value))) => Ok(value),
            Ok(Ok(Err(err))) => Err(AssetSyncError::directory(dir, err)),
            Ok(Err(join_err)) => Err(AssetSyncError::directory(
                dir,
                io::Error::new(io::ErrorKind::Other, format!("listing task failed: {join_err}")),
            )),
            Err(_) => Err(AssetSyncError::directory(
                dir,
                io::Error::new(
                    io::ErrorKind::TimedOut,
                    format!("listing did not finish within {:?}", self.timeout),
                ),
            )),
        }
    }
}

impl DirectoryScanner for FsScanner {
    async fn list_assets(&self, asset_dir: &Path) -> Result<Vec<ScannedAsset>> {
        let assets = self.run_blocking(asset_dir, read_assets).await?;
        debug!(dir = %asset_dir.display(), count = assets.len(), "Listed assets");
        Ok(assets)
    }

    async fn list_output_names(&self, output_dir: &Path) -> Result<BTreeSet<String>> {
        let names = self.run_blocking(output_dir, read_output_names).await?;
        debug!(dir = %output_dir.display(), count = names.len(), "Listed output artifacts");
        Ok(names)
    }
}

fn read_assets(dir: &Path, naming: &NamingConvention) -> io::Result<Vec<ScannedAsset>> {
    let mut assets = Vec::new();

    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let file_name = entry.file_name();
        let Some(file_name) = file_name.to_str() else {
            warn!(entry = ?entry.path(), "Skipping asset candidate with a non UTF-8 file name; it will not be tracked");
            continue;
        };
        let Some(name) = naming.asset_name(file_name) else {
            trace!(file_name, "Not an asset");
            continue;
        };
        let Some(metadata) = stat(&entry.path())? else {
            continue;
        };
        if !metadata.is_file() {
            continue;
        }

        assets.push(ScannedAsset {
            name: name.to_string(),
            modified_at: mtime_secs(&metadata)?,
        });
    }

    assets.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(assets)
}

fn read_output_names(dir: &Path, naming: &NamingConvention) -> io::Result<BTreeSet<String>> {
    let mut names = BTreeSet::new();

    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let file_name = entry.file_name();
        let Some(file_name) = file_name.to_str() else {
            debug!(entry = ?entry.path(), "Skipping non UTF-8 file name");
            continue;
        };
        let Some(owner) = naming.artifact_owner(file_name) else {
            trace!(file_name, "Ignoring entry outside the artifact convention");
            continue;
        };
        let Some(metadata) = stat(&entry.path())? else {
            continue;
        };
        if metadata.is_dir() {
            continue;
        }

        names.insert(owner.to_string());
    }

    Ok(names)
}

/// Metadata following symlinks; `None` if the entry vanished mid-scan.
fn stat(path: &Path) -> io::Result<Option<Metadata>> {
    match fs::metadata(path) {
        Ok(metadata) => Ok(Some(metadata)),
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "Entry disappeared during scan");
            Ok(None)
        }
        Err(err) => Err(err),
    }
}

fn mtime_secs(metadata: &Metadata) -> io::Result<f64> {
    let modified = metadata.modified()?;
    Ok(match modified.duration_since(UNIX_EPOCH) {
        Ok(since) => since.as_secs_f64(),
        Err(before) => -before.duration().as_secs_f64(),
    })
}
