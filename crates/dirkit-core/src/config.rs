//! Per-tool configuration types.

use std::path::PathBuf;

use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::ignore::{IgnoreSet, normalize_extension};

/// Extensions annotated when none are given.
pub const DEFAULT_ANNOTATE_EXTENSIONS: &[&str] = &[".ts", ".tsx"];

/// Folders skipped by the annotator when none are given.
pub const DEFAULT_ANNOTATE_IGNORES: &[&str] = &["node_modules", "public", ".git", ".husky", ".next"];

/// What to do when two files map to the same flat name in one run.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum CollisionPolicy {
    /// Last write wins.
    #[default]
    Overwrite,
    /// Keep the first file, skip later ones.
    Skip,
    /// Append ` (1)`, ` (2)`, ... to the later file's stem.
    #[strum(to_string = "rename")]
    #[serde(rename = "rename")]
    AutoRename,
}

/// Configuration for a flatten run.
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct FlattenConfig {
    /// Directory to flatten.
    pub source: PathBuf,

    /// Directory receiving the renamed copies.
    pub destination: PathBuf,

    /// Folder names and extensions to leave out.
    #[builder(default)]
    #[serde(default)]
    pub ignore: IgnoreSet,

    /// Handling of duplicate flat names.
    #[builder(default)]
    #[serde(default)]
    pub collision: CollisionPolicy,

    /// Compute names without touching the destination.
    #[builder(default = "false")]
    #[serde(default)]
    pub dry_run: bool,

    /// Carry timestamps over to the copies.
    #[builder(default = "true")]
    #[serde(default = "default_true")]
    pub preserve_timestamps: bool,
}

fn default_true() -> bool {
    true
}

impl FlattenConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        match self.source {
            Some(ref source) if source.as_os_str().is_empty() => {
                return Err("Source path cannot be empty".to_string());
            }
            None => return Err("Source path is required".to_string()),
            _ => {}
        }
        match self.destination {
            Some(ref dest) if dest.as_os_str().is_empty() => {
                Err("Destination path cannot be empty".to_string())
            }
            None => Err("Destination path is required".to_string()),
            _ => Ok(()),
        }
    }
}

impl FlattenConfig {
    /// Create a new flatten config builder.
    pub fn builder() -> FlattenConfigBuilder {
        FlattenConfigBuilder::default()
    }

    /// Create a config with no ignores.
    pub fn new(source: impl Into<PathBuf>, destination: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
            ignore: IgnoreSet::new(),
            collision: CollisionPolicy::default(),
            dry_run: false,
            preserve_timestamps: true,
        }
    }
}

/// Configuration for the tree printer.
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[builder(setter(into))]
pub struct TreeConfig {
    /// Root to list.
    pub root: PathBuf,

    /// Folder names shown but not descended, extensions hidden.
    #[builder(default)]
    #[serde(default)]
    pub ignore: IgnoreSet,
}

impl TreeConfig {
    pub fn builder() -> TreeConfigBuilder {
        TreeConfigBuilder::default()
    }

    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ignore: IgnoreSet::new(),
        }
    }
}

/// Configuration for the path annotator.
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct AnnotateConfig {
    /// Folder whose files get annotated.
    pub base: PathBuf,

    /// Extensions to annotate, normalized.
    #[builder(default = "default_extensions()")]
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    /// Folder names to skip.
    #[builder(default = "default_ignored_folders()")]
    #[serde(default = "default_ignored_folders")]
    pub ignore: IgnoreSet,

    /// Annotate a fresh `<base>_copy` instead of the original.
    #[builder(default = "false")]
    #[serde(default)]
    pub make_copy: bool,
}

fn default_extensions() -> Vec<String> {
    DEFAULT_ANNOTATE_EXTENSIONS.iter().map(|s| s.to_string()).collect()
}

fn default_ignored_folders() -> IgnoreSet {
    IgnoreSet::from_lists(DEFAULT_ANNOTATE_IGNORES.iter().copied(), Vec::<String>::new())
}

impl AnnotateConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        match self.base {
            Some(ref base) if base.as_os_str().is_empty() => {
                Err("Base folder cannot be empty".to_string())
            }
            None => Err("Base folder is required".to_string()),
            _ => Ok(()),
        }
    }
}

impl AnnotateConfig {
    pub fn builder() -> AnnotateConfigBuilder {
        AnnotateConfigBuilder::default()
    }

    /// Create a config with the default extensions and ignored folders.
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self {
            base: base.into(),
            extensions: default_extensions(),
            ignore: default_ignored_folders(),
            make_copy: false,
        }
    }

    /// Whether a file name has one of the configured extensions.
    pub fn includes(&self, name: &str) -> bool {
        let Some(ext) = crate::ignore::extension_of(name).and_then(normalize_extension) else {
            return false;
        };
        self.extensions
            .iter()
            .filter_map(|e| normalize_extension(e))
            .any(|e| e == ext)
    }
}
