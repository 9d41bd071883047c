//! Directory tree produced for the tree printer.

use std::path::PathBuf;

use compact_str::CompactString;
use serde::{Deserialize, Serialize};

/// What an entry in the listing is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EntryKind {
    /// A directory that was descended into.
    Directory { children: Vec<TreeEntry> },
    /// A directory listed by name only because it is ignored.
    IgnoredDirectory,
    /// A regular file.
    File,
    /// A symbolic link (not followed).
    Symlink { target: CompactString },
    /// Placeholder for a directory that could not be read.
    PermissionDenied,
}

/// One entry of a [`DirTree`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeEntry {
    /// Base name of the entry.
    pub name: CompactString,
    #[serde(flatten)]
    pub kind: EntryKind,
}

impl TreeEntry {
    pub fn file(name: impl Into<CompactString>) -> Self {
        Self {
            name: name.into(),
            kind: EntryKind::File,
        }
    }

    pub fn directory(name: impl Into<CompactString>, children: Vec<TreeEntry>) -> Self {
        Self {
            name: name.into(),
            kind: EntryKind::Directory { children },
        }
    }

    pub fn ignored_directory(name: impl Into<CompactString>) -> Self {
        Self {
            name: name.into(),
            kind: EntryKind::IgnoredDirectory,
        }
    }

    pub fn symlink(name: impl Into<CompactString>, target: impl Into<CompactString>) -> Self {
        Self {
            name: name.into(),
            kind: EntryKind::Symlink {
                target: target.into(),
            },
        }
    }

    pub fn permission_denied() -> Self {
        Self {
            name: CompactString::new("[Permission Denied]"),
            kind: EntryKind::PermissionDenied,
        }
    }

    /// Children of a descended directory; empty for everything else.
    pub fn children(&self) -> &[TreeEntry] {
        match &self.kind {
            EntryKind::Directory { children } => children,
            _ => &[],
        }
    }

    pub fn is_dir(&self) -> bool {
        matches!(
            self.kind,
            EntryKind::Directory { .. } | EntryKind::IgnoredDirectory
        )
    }

    /// Find a direct child by name.
    pub fn child(&self, name: &str) -> Option<&TreeEntry> {
        self.children().iter().find(|c| c.name == name)
    }
}

/// Summary counts for a [`DirTree`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeStats {
    pub files: u64,
    pub dirs: u64,
    pub ignored_dirs: u64,
    pub denied: u64,
}

impl TreeStats {
    fn record(&mut self, entry: &TreeEntry) {
        match &entry.kind {
            EntryKind::Directory { children } => {
                self.dirs += 1;
                for child in children {
                    self.record(child);
                }
            }
            EntryKind::IgnoredDirectory => self.ignored_dirs += 1,
            EntryKind::File | EntryKind::Symlink { .. } => self.files += 1,
            EntryKind::PermissionDenied => self.denied += 1,
        }
    }
}

/// Nested listing of a directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirTree {
    /// Root path as given by the caller.
    pub root_path: PathBuf,
    /// The root directory; its name is the displayed root label.
    pub root: TreeEntry,
}

impl DirTree {
    pub fn new(root_path: PathBuf, root: TreeEntry) -> Self {
        Self { root_path, root }
    }

    /// Counts over the whole tree, excluding the root itself.
    pub fn stats(&self) -> TreeStats {
        let mut stats = TreeStats::default();
        for child in self.root.children() {
            stats.record(child);
        }
        stats
    }
}
