//! Ignore sets for folder names and file extensions.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Folder names and file extensions excluded from a run.
///
/// Folder names are matched exactly against a directory's base name, at any
/// depth. Extensions are stored lower-cased with a leading dot and compared
/// case-insensitively.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IgnoreSet {
    folders: BTreeSet<String>,
    extensions: BTreeSet<String>,
    /// Entries given with a leading dot and no further dot, e.g. `.env`.
    #[serde(default)]
    dotfiles: BTreeSet<String>,
}

impl IgnoreSet {
    /// Create an empty ignore set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an ignore set from folder names and (possibly unnormalized) extensions.
    pub fn from_lists<F, E>(folders: F, extensions: E) -> Self
    where
        F: IntoIterator,
        F::Item: Into<String>,
        E: IntoIterator,
        E::Item: AsRef<str>,
    {
        let mut set = Self::new();
        for folder in folders {
            set.add_folder(folder);
        }
        for ext in extensions {
            set.add_extension(ext.as_ref());
        }
        set
    }

    /// Add a folder name.
    pub fn add_folder(&mut self, name: impl Into<String>) {
        let name = name.into();
        if !name.is_empty() {
            self.folders.insert(name);
        }
    }

    /// Add an extension; `log`, `.log` and `.LOG` are equivalent.
    ///
    /// An entry written with its dot, like `.env`, also matches the dot-file
    /// of that exact name.
    pub fn add_extension(&mut self, ext: &str) {
        let Some(normalized) = normalize_extension(ext) else {
            return;
        };
        if ext.trim().starts_with('.') && !normalized[1..].contains('.') {
            self.dotfiles.insert(normalized.clone());
        }
        self.extensions.insert(normalized);
    }

    /// Merge another set into this one.
    pub fn extend(&mut self, other: &IgnoreSet) {
        self.folders.extend(other.folders.iter().cloned());
        self.extensions.extend(other.extensions.iter().cloned());
        self.dotfiles.extend(other.dotfiles.iter().cloned());
    }

    /// Folder names in this set.
    pub fn folders(&self) -> impl Iterator<Item = &str> {
        self.folders.iter().map(String::as_str)
    }

    /// Normalized extensions in this set.
    pub fn extensions(&self) -> impl Iterator<Item = &str> {
        self.extensions.iter().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.folders.is_empty() && self.extensions.is_empty()
    }

    /// Whether a directory with this base name is pruned.
    pub fn skips_dir(&self, name: &str) -> bool {
        self.folders.contains(name)
    }

    /// Whether a file with this name is excluded by extension.
    ///
    /// Dot-files without an extension (`.DS_Store`) match when their whole
    /// name is listed with its leading dot; `env` alone does not hide `.env`.
    pub fn skips_file(&self, name: &str) -> bool {
        if self.extensions.is_empty() {
            return false;
        }
        let by_ext = extension_of(name).is_some_and(|ext| self.extensions.contains(&ext.to_lowercase()));
        if by_ext {
            return true;
        }
        name.starts_with('.') && self.dotfiles.contains(&name.to_lowercase())
    }
}

/// Normalize an extension to lower case with exactly one leading dot.
///
/// Returns `None` for empty input.
pub fn normalize_extension(ext: &str) -> Option<String> {
    let trimmed = ext.trim();
    let bare = trimmed.strip_prefix('.').unwrap_or(trimmed);
    if bare.is_empty() {
        return None;
    }
    Some(format!(".{}", bare.to_lowercase()))
}

/// The extension of a file name, including its dot.
///
/// Leading dots do not start an extension, so `.bashrc` has none while
/// `.eslintrc.json` has `.json`.
pub fn extension_of(name: &str) -> Option<&str> {
    let leading = name.len() - name.trim_start_matches('.').len();
    let rest = &name[leading..];
    rest.rfind('.').map(|idx| &rest[idx..])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_extension() {
        assert_eq!(normalize_extension("log").as_deref(), Some(".log"));
        assert_eq!(normalize_extension(".log").as_deref(), Some(".log"));
        assert_eq!(normalize_extension(".LOG").as_deref(), Some(".log"));
        assert_eq!(normalize_extension(" png ").as_deref(), Some(".png"));
        assert_eq!(normalize_extension(""), None);
        assert_eq!(normalize_extension("."), None);
    }

    #[test]
    fn test_extension_of() {
        assert_eq!(extension_of("c.txt"), Some(".txt"));
        assert_eq!(extension_of("a.tar.gz"), Some(".gz"));
        assert_eq!(extension_of(".bashrc"), None);
        assert_eq!(extension_of(".eslintrc.json"), Some(".json"));
        assert_eq!(extension_of("Makefile"), None);
    }

    #[test]
    fn test_skips_file_case_insensitive() {
        let set = IgnoreSet::from_lists(Vec::<String>::new(), ["log"]);
        assert!(set.skips_file("server.log"));
        assert!(set.skips_file("SERVER.LOG"));
        assert!(set.skips_file("debug.Log"));
        assert!(!set.skips_file("logfile.txt"));
        assert!(!set.skips_file("log"));
    }

    #[test]
    fn test_skips_dotfile_by_name() {
        let set = IgnoreSet::from_lists(Vec::<String>::new(), [".DS_Store"]);
        assert!(set.skips_file(".DS_Store"));
        assert!(!set.skips_file("notes.txt"));
    }

    #[test]
    fn test_skips_dir_exact_name() {
        let set = IgnoreSet::from_lists(["node_modules"], Vec::<String>::new());
        assert!(set.skips_dir("node_modules"));
        assert!(!set.skips_dir("node_modules_old"));
        assert!(!set.skips_dir("Node_Modules"));
    }

    #[test]
    fn test_bare_extension_does_not_hide_dotfile() {
        let set = IgnoreSet::from_lists(Vec::<String>::new(), ["env"]);
        assert!(set.skips_file("prod.env"));
        assert!(!set.skips_file(".env"));

        let set = IgnoreSet::from_lists(Vec::<String>::new(), [".env"]);
        assert!(set.skips_file(".env"));
        assert!(set.skips_file("prod.ENV"));
    }

    #[test]
    fn test_extend_keeps_dotfile_entries() {
        let mut set = IgnoreSet::from_lists(Vec::<String>::new(), ["log"]);
        set.extend(&IgnoreSet::from_lists(Vec::<String>::new(), [".DS_Store"]));
        assert!(set.skips_file(".DS_Store"));
        assert!(set.skips_file("a.log"));
    }
}
