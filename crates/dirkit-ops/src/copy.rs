//! Blocking copy helpers that keep file metadata.

use std::fs;
use std::io;
use std::path::Path;

use filetime::FileTime;

/// Copy a single file with its permissions and, optionally, its timestamps.
///
/// Symlinks are followed. Returns the number of bytes copied.
pub fn copy_file(source: &Path, dest: &Path, preserve_timestamps: bool) -> io::Result<u64> {
    let bytes = fs::copy(source, dest)?;

    if preserve_timestamps {
        let metadata = fs::metadata(source)?;
        filetime::set_file_times(
            dest,
            FileTime::from_last_access_time(&metadata),
            FileTime::from_last_modification_time(&metadata),
        )?;
    }

    Ok(bytes)
}

/// Recursively copy a directory, keeping timestamps.
///
/// Symlinks to files are copied by content; other symlinks are skipped.
pub fn copy_dir_recursive(source: &Path, dest: &Path) -> io::Result<u64> {
    fs::create_dir_all(dest)?;

    let mut total_bytes = 0u64;

    for entry in fs::read_dir(source)? {
        let entry = entry?;
        let path = entry.path();
        let dest_path = dest.join(entry.file_name());
        let file_type = entry.file_type()?;

        if file_type.is_dir() {
            total_bytes += copy_dir_recursive(&path, &dest_path)?;
        } else if file_type.is_file() || path.is_file() {
            total_bytes += copy_file(&path, &dest_path, true)?;
        } else {
            tracing::debug!("Not copying {}", path.display());
        }
    }

    Ok(total_bytes)
}
