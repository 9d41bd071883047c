//! Text rendering of a [`DirTree`].

use std::fmt::Write;

use crossterm::style::Stylize;

use dirkit_core::{DirTree, EntryKind, TreeEntry};

const BRANCH: &str = "├── ";
const LAST_BRANCH: &str = "└── ";
const PIPE: &str = "│   ";
const SPACE: &str = "    ";

/// Options for [`render_tree`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderOptions {
    /// Emit ANSI colors.
    pub color: bool,
}

impl RenderOptions {
    pub fn colored() -> Self {
        Self { color: true }
    }
}

/// Draw the tree with box drawing guides, one entry per line.
///
/// ```text
/// proj/
/// ├── node_modules/ (ignored folder)
/// ├── src/
/// │   └── main.ts
/// └── README.md
/// ```
pub fn render_tree(tree: &DirTree, options: RenderOptions) -> String {
    let mut out = String::new();
    let mut root = tree.root.name.to_string();
    if !root.ends_with(std::path::MAIN_SEPARATOR) && !root.ends_with('/') {
        root.push('/');
    }
    if options.color {
        let _ = writeln!(out, "{}", root.green().bold());
    } else {
        let _ = writeln!(out, "{root}");
    }
    render_children(&tree.root, "", options, &mut out);
    out
}

fn render_children(entry: &TreeEntry, prefix: &str, options: RenderOptions, out: &mut String) {
    let children = entry.children();
    for (i, child) in children.iter().enumerate() {
        let is_last = i + 1 == children.len();
        let branch = if is_last { LAST_BRANCH } else { BRANCH };
        let _ = writeln!(out, "{prefix}{branch}{}", label(child, options));

        if let EntryKind::Directory { .. } = child.kind {
            let next = format!("{prefix}{}", if is_last { SPACE } else { PIPE });
            render_children(child, &next, options, out);
        }
    }
}

fn label(entry: &TreeEntry, options: RenderOptions) -> String {
    let color = options.color;
    match &entry.kind {
        EntryKind::Directory { .. } => {
            let text = format!("{}/", entry.name);
            if color { text.blue().bold().to_string() } else { text }
        }
        EntryKind::IgnoredDirectory => {
            let text = format!("{}/ (ignored folder)", entry.name);
            if color { text.yellow().to_string() } else { text }
        }
        EntryKind::File => entry.name.to_string(),
        EntryKind::Symlink { target } => {
            let text = format!("{} -> {}", entry.name, target);
            if color { text.cyan().to_string() } else { text }
        }
        EntryKind::PermissionDenied => {
            if color {
                entry.name.as_str().red().to_string()
            } else {
                entry.name.to_string()
            }
        }
    }
}
