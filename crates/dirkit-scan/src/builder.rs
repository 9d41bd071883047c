//! Build a nested [`DirTree`] from a walk.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use dirkit_core::{DirTree, ToolError, TreeConfig, TreeEntry};

use crate::walker::{DirWalker, WalkItem};

/// Entry collected during the walk, before nesting.
enum Collected {
    Dir(PathBuf, String),
    Pruned(String),
    File(String),
    Symlink(String, String),
}

/// List `config.root` as a nested tree.
///
/// Ignored folders appear as leaves, files with ignored extensions are left
/// out and unreadable directories get a permission-denied marker child.
pub fn build_tree(config: &TreeConfig) -> Result<DirTree, ToolError> {
    ToolError::require_dir(&config.root)?;

    let walker = DirWalker::new(&config.root, config.ignore.clone()).keep_pruned(true);
    let ignore = walker.ignore().clone();

    // Map from parent path to children, in walk (sorted) order
    let mut entries_by_parent: HashMap<PathBuf, Vec<Collected>> = HashMap::new();
    let mut unreadable: HashSet<PathBuf> = HashSet::new();

    for item in walker.walk() {
        let (parent, collected) = match item {
            WalkItem::Directory(e) => (parent_of(&e.path), Collected::Dir(e.path, e.name.into())),
            WalkItem::Pruned(e) => (parent_of(&e.path), Collected::Pruned(e.name.into())),
            WalkItem::File(e) => {
                if ignore.skips_file(&e.name) {
                    continue;
                }
                (parent_of(&e.path), Collected::File(e.name.into()))
            }
            WalkItem::Symlink(e) => {
                if ignore.skips_file(&e.name) {
                    continue;
                }
                let target = std::fs::read_link(&e.path)
                    .map(|p| p.to_string_lossy().to_string())
                    .unwrap_or_default();
                (parent_of(&e.path), Collected::Symlink(e.name.into(), target))
            }
            WalkItem::Error(warning) => {
                unreadable.insert(warning.path);
                continue;
            }
        };
        entries_by_parent.entry(parent).or_default().push(collected);
    }

    let label = config.root.display().to_string();
    let root = build_node(&config.root, label, &mut entries_by_parent, &unreadable);

    Ok(DirTree::new(config.root.clone(), root))
}

fn parent_of(path: &Path) -> PathBuf {
    path.parent().map(Path::to_path_buf).unwrap_or_default()
}

/// Recursively build a directory node and its children.
fn build_node(
    path: &Path,
    name: String,
    entries_by_parent: &mut HashMap<PathBuf, Vec<Collected>>,
    unreadable: &HashSet<PathBuf>,
) -> TreeEntry {
    let mut children = Vec::new();

    if unreadable.contains(path) {
        children.push(TreeEntry::permission_denied());
    }

    for entry in entries_by_parent.remove(path).unwrap_or_default() {
        let child = match entry {
            Collected::Dir(child_path, name) => {
                build_node(&child_path, name, entries_by_parent, unreadable)
            }
            Collected::Pruned(name) => TreeEntry::ignored_directory(name),
            Collected::File(name) => TreeEntry::file(name),
            Collected::Symlink(name, target) => TreeEntry::symlink(name, target),
        };
        children.push(child);
    }

    TreeEntry::directory(name, children)
}
