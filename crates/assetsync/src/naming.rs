//! Naming convention linking asset files to their output artifacts
//!
//! An asset file is `<name><asset_extension>`; its artifact is
//! `<name><artifact_suffix>`. Matching is exact and case-sensitive. File
//! names that do not follow the convention are never truncated into an
//! asset identity.

use crate::error::{AssetSyncError, Result};
use serde::Serialize;

/// Extension of Maya scene files holding one material each.
pub const DEFAULT_ASSET_EXTENSION: &str = ".mb";

/// Swatch files are named after the full asset file name plus `.SWATCH`.
pub const DEFAULT_ARTIFACT_SUFFIX: &str = ".mb.SWATCH";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NamingConvention {
    asset_extension: String,
    artifact_suffix: String,
}

impl Default for NamingConvention {
    fn default() -> Self {
        Self {
            asset_extension: DEFAULT_ASSET_EXTENSION.to_string(),
            artifact_suffix: DEFAULT_ARTIFACT_SUFFIX.to_string(),
        }
    }
}

impl NamingConvention {
    pub fn new(asset_extension: impl Into<String>, artifact_suffix: impl Into<String>) -> Result<Self> {
        let asset_extension = asset_extension.into();
        let artifact_suffix = artifact_suffix.into();

        if asset_extension.is_empty() {
            return Err(AssetSyncError::config("asset extension must not be empty"));
        }
        if artifact_suffix.is_empty() {
            return Err(AssetSyncError::config("artifact suffix must not be empty"));
        }
        if asset_extension.contains(['/', '\\']) || artifact_suffix.contains(['/', '\\']) {
            return Err(AssetSyncError::config(
                "asset extension and artifact suffix must not contain path separators",
            ));
        }

        Ok(Self {
            asset_extension,
            artifact_suffix,
        })
    }

    pub fn asset_extension(&self) -> &str {
        &self.asset_extension
    }

    pub fn artifact_suffix(&self) -> &str {
        &self.artifact_suffix
    }

    /// Asset name for an asset file name, if it follows the convention.
    pub fn asset_name<'a>(&self, file_name: &'a str) -> Option<&'a str> {
        strip_non_empty(file_name, &self.asset_extension)
    }

    /// Asset name owning an artifact file name, if it follows the convention.
    pub fn artifact_owner<'a>(&self, file_name: &'a str) -> Option<&'a str> {
        strip_non_empty(file_name, &self.artifact_suffix)
    }

    pub fn asset_file_name(&self, name: &str) -> String {
        format!("{name}{}", self.asset_extension)
    }

    pub fn artifact_file_name(&self, name: &str) -> String {
        format!("{name}{}", self.artifact_suffix)
    }
}

fn strip_non_empty<'a>(file_name: &'a str, suffix: &str) -> Option<&'a str> {
    file_name
        .strip_suffix(suffix)
        .filter(|stem| !stem.is_empty())
}
