//! Serial jwalk-based walker with ignore pruning.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use compact_str::CompactString;
use jwalk::{DirEntry, Parallelism, WalkDir};

use dirkit_core::{IgnoreSet, ToolWarning};

type Entry = DirEntry<((), ())>;

/// An entry met during a walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkEntry {
    /// Full path (the walk root joined with `relative`).
    pub path: PathBuf,
    /// Path relative to the walk root.
    pub relative: PathBuf,
    /// Base name.
    pub name: CompactString,
    /// Depth below the root; root children are at depth 1.
    pub depth: usize,
}

impl WalkEntry {
    /// Relative directory containing this entry (empty at the root level).
    pub fn relative_dir(&self) -> &Path {
        self.relative.parent().unwrap_or(Path::new(""))
    }
}

/// Item yielded by [`Walk`].
#[derive(Debug)]
pub enum WalkItem {
    /// A directory that will be descended.
    Directory(WalkEntry),
    /// An ignored directory; only yielded when pruned folders are kept.
    Pruned(WalkEntry),
    /// A regular file.
    File(WalkEntry),
    /// A symbolic link, not followed.
    Symlink(WalkEntry),
    /// A directory or entry that could not be read.
    Error(ToolWarning),
}

/// Walks a directory tree, pruning ignored folders by name.
#[derive(Debug, Clone)]
pub struct DirWalker {
    root: PathBuf,
    ignore: Arc<IgnoreSet>,
    keep_pruned: bool,
}

impl DirWalker {
    /// Create a walker; ignored folders are dropped entirely.
    pub fn new(root: impl Into<PathBuf>, ignore: IgnoreSet) -> Self {
        Self {
            root: root.into(),
            ignore: Arc::new(ignore),
            keep_pruned: false,
        }
    }

    /// Still yield ignored folders (as [`WalkItem::Pruned`]) without descending.
    pub fn keep_pruned(mut self, keep: bool) -> Self {
        self.keep_pruned = keep;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn ignore(&self) -> &IgnoreSet {
        &self.ignore
    }

    /// Start walking.
    pub fn walk(&self) -> Walk {
        let ignore = Arc::clone(&self.ignore);
        let keep_pruned = self.keep_pruned;

        let walker = WalkDir::new(&self.root)
            .parallelism(Parallelism::Serial)
            .skip_hidden(false)
            .follow_links(false)
            .sort(true)
            .process_read_dir(move |depth, _path, _state, children| {
                // `None` is the root's own entry, which is never pruned
                if depth.is_none() {
                    return;
                }
                prune_children(&ignore, keep_pruned, children);
            });

        Walk {
            inner: Box::new(walker.into_iter()),
            root: self.root.clone(),
            ignore: Arc::clone(&self.ignore),
        }
    }
}

/// Drop (or stop descending into) ignored directories among `children`.
fn prune_children(
    ignore: &IgnoreSet,
    keep_pruned: bool,
    children: &mut Vec<jwalk::Result<Entry>>,
) {
    if keep_pruned {
        for entry in children.iter_mut().flatten() {
            if is_ignored_dir(ignore, entry) {
                entry.read_children_path = None;
            }
        }
    } else {
        children.retain(|child| !child.as_ref().is_ok_and(|entry| is_ignored_dir(ignore, entry)));
    }
}

fn is_ignored_dir(ignore: &IgnoreSet, entry: &Entry) -> bool {
    entry.file_type().is_dir() && ignore.skips_dir(&entry.file_name.to_string_lossy())
}

/// Iterator over the entries of a [`DirWalker`].
pub struct Walk {
    inner: Box<dyn Iterator<Item = jwalk::Result<Entry>>>,
    root: PathBuf,
    ignore: Arc<IgnoreSet>,
}

impl Walk {
    fn to_walk_entry(&self, entry: &Entry) -> WalkEntry {
        let path = entry.path();
        let relative = path
            .strip_prefix(&self.root)
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| PathBuf::from(entry.file_name()));

        WalkEntry {
            name: CompactString::new(entry.file_name.to_string_lossy()),
            relative,
            path,
            depth: entry.depth,
        }
    }
}

impl Iterator for Walk {
    type Item = WalkItem;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let entry = match self.inner.next()? {
                Ok(entry) => entry,
                Err(err) => {
                    let path = err.path().map(Path::to_path_buf).unwrap_or_default();
                    let warning = match err.io_error() {
                        Some(io) => ToolWarning::read_error(path, io),
                        None => ToolWarning::new(
                            path,
                            err.to_string(),
                            dirkit_core::WarningKind::ReadError,
                        ),
                    };
                    tracing::debug!("{}: {}", warning.path.display(), warning.message);
                    return Some(WalkItem::Error(warning));
                }
            };

            // The root itself is not reported
            if entry.depth == 0 {
                continue;
            }

            let file_type = entry.file_type();
            let walk_entry = self.to_walk_entry(&entry);

            if file_type.is_dir() {
                if self.ignore.skips_dir(&walk_entry.name) {
                    return Some(WalkItem::Pruned(walk_entry));
                }
                return Some(WalkItem::Directory(walk_entry));
            } else if file_type.is_symlink() {
                return Some(WalkItem::Symlink(walk_entry));
            } else if file_type.is_file() {
                return Some(WalkItem::File(walk_entry));
            }
            // Sockets, fifos and devices are not reported
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn create_test_tree() -> TempDir {
        let temp = TempDir::new().unwrap();
        let root = temp.path();

        fs::create_dir_all(root.join("src/nested")).unwrap();
        fs::create_dir_all(root.join("node_modules/pkg")).unwrap();
        fs::create_dir_all(root.join("src/node_modules/deep")).unwrap();

        fs::write(root.join("README.md"), "readme").unwrap();
        fs::write(root.join(".env"), "SECRET=1").unwrap();
        fs::write(root.join("src/main.ts"), "main").unwrap();
        fs::write(root.join("src/nested/util.ts"), "util").unwrap();
        fs::write(root.join("node_modules/pkg/index.js"), "pkg").unwrap();
        fs::write(root.join("src/node_modules/deep/x.js"), "deep").unwrap();

        temp
    }

    fn files(walker: &DirWalker) -> Vec<String> {
        walker
            .walk()
            .filter_map(|item| match item {
                WalkItem::File(e) => Some(e.relative.to_string_lossy().replace('\\', "/")),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_walk_prunes_ignored_at_any_depth() {
        let temp = create_test_tree();
        let walker = DirWalker::new(temp.path(), IgnoreSet::from_lists(["node_modules"], Vec::<String>::new()));

        let mut found = files(&walker);
        found.sort();
        assert_eq!(found, vec![".env", "README.md", "src/main.ts", "src/nested/util.ts"]);
    }

    #[test]
    fn test_walk_without_ignores_sees_everything() {
        let temp = create_test_tree();
        let walker = DirWalker::new(temp.path(), IgnoreSet::new());
        assert_eq!(files(&walker).len(), 6);
    }

    #[test]
    fn test_keep_pruned_yields_but_does_not_descend() {
        let temp = create_test_tree();
        let walker = DirWalker::new(temp.path(), IgnoreSet::from_lists(["node_modules"], Vec::<String>::new()))
            .keep_pruned(true);

        let items: Vec<WalkItem> = walker.walk().collect();
        let pruned: Vec<&WalkEntry> = items
            .iter()
            .filter_map(|item| match item {
                WalkItem::Pruned(e) => Some(e),
                _ => None,
            })
            .collect();
        assert_eq!(pruned.len(), 2);

        assert!(!items.iter().any(|item| matches!(
            item,
            WalkItem::File(e) if e.name == "index.js" || e.name == "x.js"
        )));
    }

    #[test]
    fn test_walk_entry_relative_dir() {
        let temp = create_test_tree();
        let walker = DirWalker::new(temp.path(), IgnoreSet::new());

        let util = walker
            .walk()
            .find_map(|item| match item {
                WalkItem::File(e) if e.name == "util.ts" => Some(e),
                _ => None,
            })
            .unwrap();

        assert_eq!(util.relative_dir(), Path::new("src").join("nested"));
        assert_eq!(util.depth, 3);
        assert_eq!(util.path, temp.path().join("src/nested/util.ts"));
    }

    #[test]
    fn test_root_named_like_ignored_folder_is_walked() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("proj");
        fs::create_dir_all(root.join("sub")).unwrap();
        fs::write(root.join("sub/a.txt"), "a").unwrap();

        for keep_pruned in [false, true] {
            let walker = DirWalker::new(&root, IgnoreSet::from_lists(["proj"], Vec::<String>::new()))
                .keep_pruned(keep_pruned);
            assert_eq!(files(&walker), vec!["sub/a.txt"]);
        }
    }
}
