//! Directory walking for dirkit.
//!
//! Walks are serial and sorted by name. Ignored folders are pruned by a
//! predicate applied to each directory's children before the walker descends,
//! so nothing below an ignored folder is ever read.
//!
//! ```rust,no_run
//! use dirkit_scan::{DirWalker, IgnoreSet, WalkItem};
//!
//! let ignore = IgnoreSet::from_lists(["node_modules"], ["log"]);
//! for item in DirWalker::new("/path/to/project", ignore).walk() {
//!     if let WalkItem::File(entry) = item {
//!         println!("{}", entry.relative.display());
//!     }
//! }
//! ```

mod builder;
mod walker;

pub use builder::build_tree;
pub use walker::{DirWalker, Walk, WalkEntry, WalkItem};

// Re-export core types for convenience
pub use dirkit_core::{DirTree, EntryKind, IgnoreSet, ToolError, ToolWarning, TreeConfig, TreeEntry};
