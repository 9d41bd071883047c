//! User settings file.
//!
//! Settings live in `<config_dir>/dirkit/config.toml` and hold default ignore
//! lists per tool. Values given on the command line are added to these.
//!
//! ```toml
//! [flatten]
//! ignore = ["node_modules", ".git"]
//! ignore_ext = [".log", "tmp"]
//!
//! [annotate]
//! extensions = [".ts", ".tsx", ".py"]
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ToolError;
use crate::ignore::IgnoreSet;

/// Defaults for one tool.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolDefaults {
    /// Folder names to ignore.
    pub ignore: Vec<String>,
    /// Extensions to ignore.
    pub ignore_ext: Vec<String>,
    /// Extensions to include (annotator only).
    pub extensions: Vec<String>,
}

impl ToolDefaults {
    /// Ignore set built from these defaults.
    pub fn ignore_set(&self) -> IgnoreSet {
        IgnoreSet::from_lists(self.ignore.iter().cloned(), &self.ignore_ext)
    }
}

/// All persisted settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub flatten: ToolDefaults,
    pub tree: ToolDefaults,
    pub annotate: ToolDefaults,
}

impl Settings {
    /// Default settings file location.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("dirkit")
            .join("config.toml")
    }

    /// Parse settings from TOML text.
    pub fn from_toml(text: &str) -> Result<Self, ToolError> {
        toml::from_str(text).map_err(|e| ToolError::Config {
            message: e.to_string(),
        })
    }

    /// Load settings from `path`; a missing file yields defaults.
    pub fn load(path: &Path) -> Result<Self, ToolError> {
        match std::fs::read_to_string(path) {
            Ok(text) => {
                tracing::debug!("Loaded settings from {}", path.display());
                Self::from_toml(&text)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(ToolError::io(path, e)),
        }
    }

    /// Load from the default location.
    pub fn load_default() -> Result<Self, ToolError> {
        Self::load(&Self::default_path())
    }
}
