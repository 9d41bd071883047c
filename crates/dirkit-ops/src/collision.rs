//! Resolution of duplicate flat names.

use std::path::Path;

use dirkit_core::extension_of;

use crate::naming::fit_stem;

/// Pick a free variant of `name` by numbering its stem.
///
/// For "file.txt", tries "file (1).txt", "file (2).txt", etc. until
/// `is_taken` rejects none. The counter and extension are kept whole and the
/// stem is cut when the numbered name would not fit below `dest_dir`.
/// Returns `None` if no numbered name fits at all.
pub fn auto_rename(name: &str, dest_dir: &Path, is_taken: impl Fn(&str) -> bool) -> Option<String> {
    let ext = extension_of(name).unwrap_or("");
    let stem = &name[..name.len() - ext.len()];

    for i in 1u64.. {
        let candidate = fit_stem(stem, &format!(" ({i}){ext}"), dest_dir)?;
        if !is_taken(&candidate) {
            return Some(candidate);
        }
    }
    None
}
