//! Shared fixtures for assetsync integration tests

#![allow(dead_code)]

use assetsync::{Library, NamingConvention, RecordStore};
use filetime::{set_file_mtime, FileTime};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

pub const T1: i64 = 1_600_000_000;
pub const T2: i64 = 1_600_000_500;

/// Asset directory, output directory and record store under one temp dir.
pub struct TestEnv {
    _temp: TempDir,
    pub asset_dir: PathBuf,
    pub output_dir: PathBuf,
    pub db_path: PathBuf,
}

impl TestEnv {
    pub fn new() -> Self {
        let temp = TempDir::new().expect("Failed to create temp dir");
        let asset_dir = temp.path().join("Shaders");
        let output_dir = asset_dir.join(".swatches");
        let db_path = temp.path().join("state").join("materials.db");

        fs::create_dir_all(&output_dir).expect("Failed to create output dir");

        Self {
            _temp: temp,
            asset_dir,
            output_dir,
            db_path,
        }
    }

    pub fn naming() -> NamingConvention {
        NamingConvention::new(".asset", ".asset.SWATCH").unwrap()
    }

    pub fn library(&self) -> Library {
        Library::new(&self.asset_dir, &self.output_dir)
            .with_database_path(&self.db_path)
            .with_naming(Self::naming())
    }

    pub async fn store(&self) -> RecordStore {
        RecordStore::open(&self.db_path).await.unwrap()
    }

    /// Write `<name>.asset` with an explicit mtime.
    pub fn write_asset(&self, name: &str, mtime: i64) -> PathBuf {
        let path = self.asset_dir.join(format!("{name}.asset"));
        fs::write(&path, name).expect("Failed to write asset");
        set_file_mtime(&path, FileTime::from_unix_time(mtime, 0)).unwrap();
        path
    }

    pub fn remove_asset(&self, name: &str) {
        fs::remove_file(self.asset_dir.join(format!("{name}.asset"))).unwrap();
    }

    pub fn write_artifact(&self, name: &str) -> PathBuf {
        let path = self.output_dir.join(format!("{name}.asset.SWATCH"));
        fs::write(&path, b"swatch").expect("Failed to write artifact");
        path
    }

    pub fn remove_artifact(&self, name: &str) {
        fs::remove_file(self.output_dir.join(format!("{name}.asset.SWATCH"))).unwrap();
    }
}

pub fn names(items: &[&str]) -> std::collections::BTreeSet<String> {
    items.iter().map(|s| s.to_string()).collect()
}
