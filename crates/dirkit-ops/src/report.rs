//! Result types for flatten runs.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use dirkit_core::{ToolWarning, WarningKind};

/// A per-file failure that did not stop the run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationError {
    /// The path that caused the error.
    pub path: PathBuf,
    /// A human-readable error message.
    pub message: String,
}

impl OperationError {
    pub fn new(path: PathBuf, message: impl Into<String>) -> Self {
        Self {
            path,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for OperationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path.display(), self.message)
    }
}

/// Where one source file went.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenameRecord {
    /// Original file.
    pub source: PathBuf,
    /// Original path relative to the source root.
    pub relative: PathBuf,
    /// Flat file name inside the destination.
    pub flat_name: String,
    /// Full destination path.
    pub destination: PathBuf,
}

/// Outcome of a flatten run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlattenReport {
    /// Canonical source directory.
    pub source: PathBuf,
    /// Destination directory.
    pub destination: PathBuf,
    /// Whether copying was skipped.
    pub dry_run: bool,
    /// Files copied (or planned, in a dry run).
    pub copied: usize,
    /// Files that failed to copy.
    pub failed: usize,
    /// Files left out by extension or collision policy.
    pub skipped: usize,
    /// Total bytes copied.
    pub bytes_copied: u64,
    /// One record per copied file, in walk order.
    pub records: Vec<RenameRecord>,
    /// Per-file failures.
    pub errors: Vec<OperationError>,
    /// Non-fatal warnings (truncated names, collisions, unreadable entries).
    pub warnings: Vec<ToolWarning>,
    /// Wall time of the run.
    pub duration: Duration,
}

impl FlattenReport {
    pub fn new(source: PathBuf, destination: PathBuf, dry_run: bool) -> Self {
        Self {
            source,
            destination,
            dry_run,
            copied: 0,
            failed: 0,
            skipped: 0,
            bytes_copied: 0,
            records: Vec::new(),
            errors: Vec::new(),
            warnings: Vec::new(),
            duration: Duration::ZERO,
        }
    }

    /// Record a successful copy.
    pub fn record_copy(&mut self, record: RenameRecord, bytes: u64) {
        self.copied += 1;
        self.bytes_copied += bytes;
        self.records.push(record);
    }

    /// Record a failed copy.
    pub fn add_error(&mut self, error: OperationError) {
        self.failed += 1;
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, warning: ToolWarning) {
        self.warnings.push(warning);
    }

    /// Check if every attempted copy succeeded.
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }

    /// Number of warnings of one kind.
    pub fn warning_count(&self, kind: WarningKind) -> usize {
        self.warnings.iter().filter(|w| w.kind == kind).count()
    }

    /// Find the record for a source path relative to the source root.
    pub fn record_for(&self, relative: impl AsRef<std::path::Path>) -> Option<&RenameRecord> {
        self.records.iter().find(|r| r.relative == relative.as_ref())
    }

    /// Get a human-readable summary of the run.
    pub fn summary(&self) -> String {
        let action = if self.dry_run { "Would copy" } else { "Copied" };
        let mut summary = format!(
            "{} {} files ({})",
            action,
            self.copied,
            humansize::format_size(self.bytes_copied, humansize::BINARY)
        );
        if self.failed > 0 {
            summary.push_str(&format!(", {} failed", self.failed));
        }
        if self.skipped > 0 {
            summary.push_str(&format!(", {} skipped", self.skipped));
        }
        if !self.warnings.is_empty() {
            summary.push_str(&format!(", {} warning(s)", self.warnings.len()));
        }
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(relative: &str) -> RenameRecord {
        RenameRecord {
            source: PathBuf::from("/src/proj").join(relative),
            relative: PathBuf::from(relative),
            flat_name: format!("proj_{}", relative.replace('/', "_")),
            destination: PathBuf::from("/out").join(relative.replace('/', "_")),
        }
    }

    #[test]
    fn test_report_counts_and_summary() {
        let mut report = FlattenReport::new("/src/proj".into(), "/out".into(), false);
        report.record_copy(record("a.txt"), 2048);
        report.record_copy(record("b/c.txt"), 0);
        report.add_error(OperationError::new("/src/proj/d.txt".into(), "denied"));
        report.skipped = 1;

        assert_eq!(report.copied, 2);
        assert_eq!(report.failed, 1);
        assert!(!report.is_success());
        assert_eq!(report.summary(), "Copied 2 files (2 KiB), 1 failed, 1 skipped");
        assert_eq!(report.record_for("b/c.txt").unwrap().flat_name, "proj_b_c.txt");
    }

    #[test]
    fn test_dry_run_summary() {
        let report = FlattenReport::new("/src".into(), "/out".into(), true);
        assert!(report.is_success());
        assert!(report.summary().starts_with("Would copy 0 files"));
    }

    #[test]
    fn test_operation_error_display() {
        let err = OperationError::new("/x/y".into(), "boom");
        assert_eq!(err.to_string(), "/x/y: boom");
    }
}
