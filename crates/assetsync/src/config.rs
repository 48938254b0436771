//! Configuration for assetsync
//!
//! Loaded from TOML. Every field has a default so a partial file is valid;
//! the directories must be set either in the file or on the command line.

use crate::error::{AssetSyncError, Result};
use crate::naming::{NamingConvention, DEFAULT_ARTIFACT_SUFFIX, DEFAULT_ASSET_EXTENSION};
use crate::scanner::FsScanner;
use assetsync_db::StoreOptions;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Store file created inside the asset directory when no path is configured.
pub const DEFAULT_DATABASE_FILE: &str = "materials.db";

/// Main configuration file contents.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetSyncConfig {
    /// Directory holding the source assets
    #[serde(default)]
    pub asset_dir: Option<PathBuf>,

    /// Directory holding the derived artifacts
    #[serde(default)]
    pub output_dir: Option<PathBuf>,

    /// Record store path (default: `<asset_dir>/materials.db`)
    #[serde(default)]
    pub database_path: Option<PathBuf>,

    /// Extension that marks a file as an asset
    #[serde(default = "default_asset_extension")]
    pub asset_extension: String,

    /// Literal appended to an asset name to form its artifact file name
    #[serde(default = "default_artifact_suffix")]
    pub artifact_suffix: String,

    /// Upper bound for a single directory listing
    #[serde(default = "default_scan_timeout")]
    pub scan_timeout_secs: u64,

    /// Upper bound for acquiring the record store
    #[serde(default = "default_store_timeout")]
    pub store_timeout_secs: u64,

    /// External processor invoked by `render`
    #[serde(default)]
    pub processor: ProcessorConfig,
}

/// How the external processor is run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessorConfig {
    /// Program to run once per task
    #[serde(default)]
    pub command: Option<String>,

    /// Arguments; `{name}`, `{asset}`, `{output}` and `{param.KEY}` are substituted
    #[serde(default)]
    pub args: Vec<String>,

    /// Per-task time limit
    #[serde(default = "default_task_timeout")]
    pub task_timeout_secs: u64,

    /// Parameters handed to every task
    #[serde(default = "default_params")]
    pub params: BTreeMap<String, String>,
}

fn default_asset_extension() -> String {
    DEFAULT_ASSET_EXTENSION.to_string()
}

fn default_artifact_suffix() -> String {
    DEFAULT_ARTIFACT_SUFFIX.to_string()
}

fn default_scan_timeout() -> u64 {
    30
}

fn default_store_timeout() -> u64 {
    10
}

fn default_task_timeout() -> u64 {
    600
}

fn default_params() -> BTreeMap<String, String> {
    BTreeMap::from([
        ("camera".to_string(), "RenderCamShape".to_string()),
        ("shape".to_string(), "shaderballShape".to_string()),
    ])
}

impl Default for AssetSyncConfig {
    fn default() -> Self {
        Self {
            asset_dir: None,
            output_dir: None,
            database_path: None,
            asset_extension: default_asset_extension(),
            artifact_suffix: default_artifact_suffix(),
            scan_timeout_secs: default_scan_timeout(),
            store_timeout_secs: default_store_timeout(),
            processor: ProcessorConfig::default(),
        }
    }
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            command: None,
            args: Vec::new(),
            task_timeout_secs: default_task_timeout(),
            params: default_params(),
        }
    }
}

/// Default config location: `<assetsync home>/config.toml`.
pub fn default_config_path() -> PathBuf {
    assetsync_logging::assetsync_home().join("config.toml")
}

impl AssetSyncConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            AssetSyncError::config(format!("cannot read {}: {e}", path.display()))
        })?;
        toml::from_str(&content)
            .map_err(|e| AssetSyncError::config(format!("invalid {}: {e}", path.display())))
    }

    /// Load `path` if given, else the default location if it exists, else defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => {
                let default_path = default_config_path();
                if default_path.is_file() {
                    Self::load(&default_path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Save configuration to a TOML file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| AssetSyncError::config(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| {
            AssetSyncError::config(format!("cannot write {}: {e}", path.display()))
        })
    }

    /// Resolve into the settings a cycle runs with.
    pub fn library(&self) -> Result<Library> {
        let asset_dir = self
            .asset_dir
            .clone()
            .ok_or_else(|| AssetSyncError::config("asset_dir is not set"))?;
        let output_dir = self
            .output_dir
            .clone()
            .ok_or_else(|| AssetSyncError::config("output_dir is not set"))?;
        let database_path = self
            .database_path
            .clone()
            .unwrap_or_else(|| asset_dir.join(DEFAULT_DATABASE_FILE));

        Ok(Library {
            asset_dir,
            output_dir,
            database_path,
            naming: NamingConvention::new(&self.asset_extension, &self.artifact_suffix)?,
            scan_timeout: Duration::from_secs(self.scan_timeout_secs.max(1)),
            store_timeout: Duration::from_secs(self.store_timeout_secs.max(1)),
        })
    }
}

/// Resolved locations and conventions for one asset library.
#[derive(Debug, Clone)]
pub struct Library {
    pub asset_dir: PathBuf,
    pub output_dir: PathBuf,
    pub database_path: PathBuf,
    pub naming: NamingConvention,
    pub scan_timeout: Duration,
    pub store_timeout: Duration,
}

impl Library {
    /// Library with default conventions and timeouts.
    pub fn new(asset_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        let asset_dir = asset_dir.into();
        Self {
            database_path: asset_dir.join(DEFAULT_DATABASE_FILE),
            asset_dir,
            output_dir: output_dir.into(),
            naming: NamingConvention::default(),
            scan_timeout: Duration::from_secs(default_scan_timeout()),
            store_timeout: Duration::from_secs(default_store_timeout()),
        }
    }

    pub fn with_database_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.database_path = path.into();
        self
    }

    pub fn with_naming(mut self, naming: NamingConvention) -> Self {
        self.naming = naming;
        self
    }

    /// Filesystem scanner bound to this library's convention.
    pub fn scanner(&self) -> FsScanner {
        FsScanner::new(self.naming.clone()).with_timeout(self.scan_timeout)
    }

    pub fn store_options(&self) -> StoreOptions {
        StoreOptions {
            timeout: self.store_timeout,
            ..StoreOptions::default()
        }
    }

    /// Path of the asset file for `name`.
    pub fn asset_path(&self, name: &str) -> PathBuf {
        self.asset_dir.join(self.naming.asset_file_name(name))
    }

    /// Path of the artifact file for `name`.
    pub fn output_path(&self, name: &str) -> PathBuf {
        self.output_dir.join(self.naming.artifact_file_name(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AssetSyncConfig::default();
        assert_eq!(config.asset_extension, ".mb");
        assert_eq!(config.artifact_suffix, ".mb.SWATCH");
        assert_eq!(config.scan_timeout_secs, 30);
        assert_eq!(config.processor.params.get("camera").map(String::as_str), Some("RenderCamShape"));
        assert!(config.library().is_err(), "directories are required");
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: AssetSyncConfig = toml::from_str(
            r#"
            asset_dir = "/library/Shaders"
            output_dir = "/library/Shaders/.mayaSwatches"

            [processor]
            command = "render-swatch"
            args = ["--camera", "{param.camera}", "{asset}", "{output}"]
            "#,
        )
        .unwrap();

        let library = config.library().unwrap();
        assert_eq!(library.database_path, PathBuf::from("/library/Shaders/materials.db"));
        assert_eq!(
            library.output_path("wood"),
            PathBuf::from("/library/Shaders/.mayaSwatches/wood.mb.SWATCH")
        );
        assert_eq!(config.processor.task_timeout_secs, 600);
        assert_eq!(config.processor.params.len(), 2);
    }

    #[test]
    fn test_config_round_trip_through_file() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");

        let mut config = AssetSyncConfig::default();
        config.asset_dir = Some(PathBuf::from("/assets"));
        config.output_dir = Some(PathBuf::from("/swatches"));
        config.database_path = Some(PathBuf::from("/state/assets.db"));
        config.save(&path).unwrap();

        let loaded = AssetSyncConfig::load(&path).unwrap();
        assert_eq!(loaded.database_path, config.database_path);
        assert_eq!(loaded.library().unwrap().database_path, PathBuf::from("/state/assets.db"));
    }

    #[test]
    fn test_invalid_toml_is_a_config_error() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        std::fs::write(&path, "asset_dir = [").unwrap();

        let err = AssetSyncConfig::load(&path).unwrap_err();
        assert!(matches!(err, AssetSyncError::Config(_)));
    }
}
