//! CLI commands for assetsync

pub mod complete;
pub mod config;
pub mod output;
pub mod render;
pub mod status;
pub mod update;

use anyhow::{Context, Result};
use assetsync::{AssetSyncConfig, Library};
use std::path::PathBuf;

/// Values given on the command line that win over the config file.
#[derive(Debug, Default)]
pub struct Overrides {
    pub config: Option<PathBuf>,
    pub asset_dir: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub database_path: Option<PathBuf>,
}

impl Overrides {
    /// Load the config file and apply command-line overrides.
    pub fn load_config(&self) -> Result<AssetSyncConfig> {
        let mut config = AssetSyncConfig::load_or_default(self.config.as_deref())
            .context("Failed to load configuration")?;

        if let Some(dir) = &self.asset_dir {
            config.asset_dir = Some(dir.clone());
        }
        if let Some(dir) = &self.output_dir {
            config.output_dir = Some(dir.clone());
        }
        if let Some(path) = &self.database_path {
            config.database_path = Some(path.clone());
        }
        Ok(config)
    }

    /// Load config and resolve the library it describes.
    pub fn library(&self) -> Result<(AssetSyncConfig, Library)> {
        let config = self.load_config()?;
        let library = config
            .library()
            .context("Set asset_dir and output_dir in the config file or with --asset-dir/--output-dir")?;
        Ok((config, library))
    }
}
