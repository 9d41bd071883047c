//! Flat file name construction.
//!
//! A file at `proj/a/b/c.txt` is named `proj_a_b_c.txt`: the source folder's
//! base name, then each relative directory component, then the file name, all
//! joined by `_`. The result is sanitized and, when the full destination path
//! would get too long, shortened with its extension kept.

use std::borrow::Cow;
use std::path::{Component, Path};

use itertools::Itertools;

use dirkit_core::extension_of;

/// Upper bound for a destination path, in characters.
pub const MAX_PATH_LEN: usize = 250;

/// Upper bound for a single file name, in bytes.
pub const MAX_NAME_LEN: usize = 255;

/// Room left below [`MAX_PATH_LEN`] when a name has to be shortened.
pub const SAFETY_MARGIN: usize = 10;

/// Shortest name produced by truncation, even under a very long destination.
pub const MIN_NAME_LEN: usize = 32;

/// Characters rejected by common filesystems.
pub const ILLEGAL_CHARS: &[char] = &['<', '>', ':', '"', '|', '?', '*'];

/// Label used as the first name segment: the source directory's base name.
///
/// Expects a canonical path; the filesystem root has no base name and is
/// labelled `root`.
pub fn source_label(source: &Path) -> String {
    source
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "root".to_string())
}

/// Join the label and every component of `relative` with `_`.
pub fn flat_name(label: &str, relative: &Path) -> String {
    let parts = relative.components().filter_map(|c| match c {
        Component::Normal(part) => Some(part.to_string_lossy()),
        _ => None,
    });
    std::iter::once(Cow::Borrowed(label)).chain(parts).join("_")
}

/// Replace characters that are illegal in file names with `_`.
pub fn sanitize_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if ILLEGAL_CHARS.contains(&c) || c == '/' || c == '\\' || c.is_control() {
                '_'
            } else {
                c
            }
        })
        .collect()
}

/// Result of fitting a name below a destination directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameFit {
    /// The name is within the limits as is.
    Fits,
    /// The stem was cut; the extension is intact.
    Shortened(String),
    /// No stem length fits, e.g. the extension alone is over the limit.
    TooLong,
}

/// Shorten `name` if `dest_dir/name` would exceed the path or name limits.
///
/// The extension is never cut.
pub fn fit_name(name: &str, dest_dir: &Path) -> NameFit {
    let ext = extension_of(name).unwrap_or("");
    let stem = &name[..name.len() - ext.len()];

    match fit_stem(stem, ext, dest_dir) {
        Some(fitted) if fitted == name => NameFit::Fits,
        Some(fitted) => NameFit::Shortened(fitted),
        None => NameFit::TooLong,
    }
}

/// Join `stem` and `tail`, cutting only the stem so the result fits.
///
/// `tail` is an extension, possibly preceded by a ` (n)` counter. Returns
/// `None` when even a one-character stem does not fit.
pub fn fit_stem(stem: &str, tail: &str, dest_dir: &Path) -> Option<String> {
    let dest_len = dest_dir.as_os_str().to_string_lossy().chars().count();
    let tail_len = tail.chars().count();

    if dest_len + 1 + stem.chars().count() + tail_len <= MAX_PATH_LEN
        && stem.len() + tail.len() <= MAX_NAME_LEN
    {
        return Some(format!("{stem}{tail}"));
    }

    let budget = MAX_PATH_LEN
        .saturating_sub(dest_len + 1 + SAFETY_MARGIN)
        .max(MIN_NAME_LEN);
    let stem_budget = budget.saturating_sub(tail_len).max(1);

    let mut short: String = stem.chars().take(stem_budget).collect();
    while short.len() + tail.len() > MAX_NAME_LEN && short.chars().count() > 1 {
        short.pop();
    }
    if short.len() + tail.len() > MAX_NAME_LEN {
        return None;
    }
    short.push_str(tail);
    Some(short)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_flat_name_nested() {
        let relative = Path::new("a").join("b").join("c.txt");
        assert_eq!(flat_name("proj", &relative), "proj_a_b_c.txt");
    }

    #[test]
    fn test_flat_name_root_level() {
        assert_eq!(flat_name("proj", Path::new("c.txt")), "proj_c.txt");
    }

    #[test]
    fn test_source_label() {
        assert_eq!(source_label(Path::new("/home/user/proj")), "proj");
        assert_eq!(source_label(Path::new("/")), "root");
    }

    #[test]
    fn test_sanitize_name() {
        assert_eq!(sanitize_name("proj_what?.txt"), "proj_what_.txt");
        assert_eq!(sanitize_name("proj_a:b.txt"), "proj_a_b.txt");
        assert_eq!(sanitize_name(r#"<x>"y"|z*"#), "_x__y__z_");
        assert_eq!(sanitize_name("plain_name.rs"), "plain_name.rs");
    }

    #[test]
    fn test_fit_name_short_is_untouched() {
        assert_eq!(fit_name("proj_a.txt", Path::new("/tmp/out")), NameFit::Fits);
    }

    #[test]
    fn test_fit_name_keeps_extension() {
        let dest = PathBuf::from("/tmp/out");
        let name = format!("proj_{}.txt", "x".repeat(300));

        let NameFit::Shortened(short) = fit_name(&name, &dest) else {
            panic!("expected a shortened name");
        };
        assert!(short.ends_with(".txt"));
        assert!(short.starts_with("proj_xxx"));
        assert!(dest.join(&short).as_os_str().len() <= MAX_PATH_LEN);
        assert!(short.len() <= MAX_NAME_LEN);
    }

    #[test]
    fn test_fit_name_long_destination() {
        let dest = PathBuf::from(format!("/{}", "d".repeat(240)));
        let name = format!("proj_{}.json", "n".repeat(60));

        let NameFit::Shortened(short) = fit_name(&name, &dest) else {
            panic!("expected a shortened name");
        };
        assert!(short.ends_with(".json"));
        assert_eq!(short.chars().count(), MIN_NAME_LEN);
    }

    #[test]
    fn test_fit_name_multibyte() {
        let dest = PathBuf::from("/tmp/out");
        let name = format!("proj_{}.md", "é".repeat(200));

        let NameFit::Shortened(short) = fit_name(&name, &dest) else {
            panic!("expected a shortened name");
        };
        assert!(short.ends_with(".md"));
        assert!(short.len() <= MAX_NAME_LEN);
    }

    #[test]
    fn test_fit_name_extension_over_limit() {
        let name = format!("a.{}", "e".repeat(MAX_NAME_LEN));
        assert_eq!(fit_name(&name, Path::new("/tmp/out")), NameFit::TooLong);
    }

    #[test]
    fn test_fit_stem_keeps_counter() {
        let dest = PathBuf::from(format!("/{}", "d".repeat(230)));
        let stem = format!("proj_{}", "y".repeat(60));

        let plain = fit_stem(&stem, ".txt", &dest).unwrap();
        let numbered = fit_stem(&stem, " (1).txt", &dest).unwrap();

        assert!(numbered.ends_with(" (1).txt"));
        assert_ne!(plain, numbered);
        assert_eq!(numbered.chars().count(), MIN_NAME_LEN);
    }
}
