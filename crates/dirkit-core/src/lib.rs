//! Core types and configuration for dirkit.
//!
//! This crate provides the data structures shared by the dirkit tools:
//! ignore sets, per-tool configuration, the settings file, error types and
//! the directory tree used by the tree printer.

mod config;
mod error;
mod ignore;
mod settings;
mod tree;

pub use config::{
    AnnotateConfig, AnnotateConfigBuilder, CollisionPolicy, FlattenConfig, FlattenConfigBuilder,
    TreeConfig, TreeConfigBuilder, DEFAULT_ANNOTATE_EXTENSIONS, DEFAULT_ANNOTATE_IGNORES,
};
pub use error::{ToolError, ToolWarning, WarningKind};
pub use ignore::{IgnoreSet, extension_of, normalize_extension};
pub use settings::{Settings, ToolDefaults};
pub use tree::{DirTree, EntryKind, TreeEntry, TreeStats};
