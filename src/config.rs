//! Run configuration
//!
//! Every field has a default, so a config file only needs the keys it
//! changes:
//!
//! ```yaml
//! root: .
//! include_private: false
//! exclude_patterns: ["legacy_*"]
//! retention_threshold: 2
//! ```

use crate::error::{Result, SurfaceError};
use crate::selection::MergePolicy;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default store location, relative to the repository root
pub const DEFAULT_SELECTIONS_FILE: &str = ".apisurface/selections.yaml";

/// Configuration for one extraction + reconciliation run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SurfaceConfig {
    /// Repository root to scan
    pub root: PathBuf,
    /// Keep underscore-prefixed names in the tree
    pub include_private: bool,
    /// Scan test sources too
    pub include_tests: bool,
    /// Extra glob patterns matched against path components
    pub exclude_patterns: Vec<String>,
    /// Selection store path; relative paths resolve against `root`
    pub selections_file: PathBuf,
    /// Decision given to components seen for the first time
    pub default_included: bool,
    /// Consecutive missed runs before a record is dropped
    pub retention_threshold: u32,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            include_private: false,
            include_tests: false,
            exclude_patterns: Vec::new(),
            selections_file: PathBuf::from(DEFAULT_SELECTIONS_FILE),
            default_included: true,
            retention_threshold: 1,
        }
    }
}

impl SurfaceConfig {
    /// Defaults for a given repository root
    pub fn for_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Self::default()
        }
    }

    /// Load a YAML config file
    ///
    /// A relative `root` inside the file resolves against the file's directory.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            SurfaceError::Config(format!("Failed to read config {}: {}", path.display(), e))
        })?;
        let mut config: SurfaceConfig = serde_yaml::from_str(&content).map_err(|e| {
            SurfaceError::Config(format!("Failed to parse config {}: {}", path.display(), e))
        })?;

        if config.root.is_relative() {
            if let Some(dir) = path.parent() {
                config.root = dir.join(&config.root);
            }
        }

        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Absolute store location
    pub fn selections_path(&self) -> PathBuf {
        if self.selections_file.is_absolute() {
            self.selections_file.clone()
        } else {
            self.root.join(&self.selections_file)
        }
    }

    /// Merge policy derived from this config
    pub fn merge_policy(&self) -> MergePolicy {
        MergePolicy {
            default_included: self.default_included,
            retention_threshold: self.retention_threshold,
        }
    }
}
