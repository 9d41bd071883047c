//! Path-based flattening of a directory tree.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use tracing::{debug, error, info, warn};

use dirkit_core::{CollisionPolicy, FlattenConfig, ToolError, ToolWarning, WarningKind};
use dirkit_scan::{DirWalker, WalkEntry, WalkItem};

use crate::collision::auto_rename;
use crate::copy::copy_file;
use crate::naming::{NameFit, fit_name, flat_name, sanitize_name, source_label};
use crate::report::{FlattenReport, OperationError, RenameRecord};

/// Copies every non-ignored file of a tree into a single directory.
///
/// Each copy is named after its path relative to the source root, prefixed
/// with the source folder's name. Per-file failures are logged and recorded;
/// only invalid input or an uncreatable destination abort the run.
#[derive(Debug, Clone)]
pub struct Flattener {
    config: FlattenConfig,
}

impl Flattener {
    pub fn new(config: FlattenConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FlattenConfig {
        &self.config
    }

    /// Run the flatten operation.
    pub fn run(&self) -> Result<FlattenReport, ToolError> {
        let start = Instant::now();
        let config = &self.config;

        ToolError::require_dir(&config.source)?;
        let source = config
            .source
            .canonicalize()
            .map_err(|e| ToolError::io(&config.source, e))?;
        let label = source_label(&source);

        let destination = config.destination.clone();
        if destination.exists() && !destination.is_dir() {
            return Err(ToolError::invalid_input(
                &destination,
                "destination exists and is not a directory",
            ));
        }
        if !config.dry_run && !destination.exists() {
            fs::create_dir_all(&destination).map_err(|e| ToolError::io(&destination, e))?;
            info!("Created destination {}", destination.display());
        }
        // Copies must not be picked up again when the destination sits inside the source
        let destination_canonical = destination.canonicalize().ok();

        let mut report = FlattenReport::new(source.clone(), destination.clone(), config.dry_run);
        let mut taken: HashMap<String, PathBuf> = HashMap::new();

        let walker = DirWalker::new(&source, config.ignore.clone());
        for item in walker.walk() {
            let entry = match item {
                WalkItem::File(entry) => entry,
                WalkItem::Symlink(entry) => {
                    if !entry.path.is_file() {
                        debug!("Skipping symlink {}", entry.path.display());
                        report.add_warning(ToolWarning::new(
                            &entry.path,
                            "symlink does not point to a file",
                            WarningKind::Skipped,
                        ));
                        continue;
                    }
                    entry
                }
                WalkItem::Error(warning) => {
                    warn!("{}: {}", warning.path.display(), warning.message);
                    report.add_warning(warning);
                    continue;
                }
                WalkItem::Directory(_) | WalkItem::Pruned(_) => continue,
            };

            if destination_canonical
                .as_ref()
                .is_some_and(|dest| entry.path.starts_with(dest))
            {
                continue;
            }

            if config.ignore.skips_file(&entry.name) {
                debug!("Ignored: {}", entry.path.display());
                report.skipped += 1;
                continue;
            }

            let Some(name) = self.plan_name(&label, &entry, &destination, &mut taken, &mut report)
            else {
                report.skipped += 1;
                continue;
            };

            let dest_path = destination.join(&name);
            let record = RenameRecord {
                source: entry.path.clone(),
                relative: entry.relative.clone(),
                flat_name: name,
                destination: dest_path.clone(),
            };

            if config.dry_run {
                info!("Would copy: {} -> {}", entry.path.display(), dest_path.display());
                report.record_copy(record, 0);
                continue;
            }

            match copy_file(&entry.path, &dest_path, config.preserve_timestamps) {
                Ok(bytes) => {
                    info!("Copied: {} -> {}", entry.path.display(), dest_path.display());
                    report.record_copy(record, bytes);
                }
                Err(e) => {
                    error!("Failed to copy {}: {}", entry.path.display(), e);
                    report.add_error(OperationError::new(entry.path, e.to_string()));
                }
            }
        }

        report.duration = start.elapsed();
        Ok(report)
    }

    /// Compute the flat name for `entry`, applying truncation and the
    /// collision policy. `None` means the file is skipped.
    fn plan_name(
        &self,
        label: &str,
        entry: &WalkEntry,
        destination: &Path,
        taken: &mut HashMap<String, PathBuf>,
        report: &mut FlattenReport,
    ) -> Option<String> {
        let mut name = sanitize_name(&flat_name(label, &entry.relative));

        match fit_name(&name, destination) {
            NameFit::Fits => {}
            NameFit::Shortened(short) => {
                debug!("Truncated {} to {}", name, short);
                report.add_warning(ToolWarning::new(
                    &entry.path,
                    format!("name truncated to {short}"),
                    WarningKind::NameTruncated,
                ));
                name = short;
            }
            NameFit::TooLong => {
                warn!("Cannot shorten {} to fit under {}", name, destination.display());
                report.add_warning(ToolWarning::new(
                    &entry.path,
                    "name cannot be shortened to fit",
                    WarningKind::Skipped,
                ));
                return None;
            }
        }

        if let Some(first) = taken.get(&name) {
            warn!(
                "Name collision: {} and {} both map to {}",
                first.display(),
                entry.path.display(),
                name
            );
            report.add_warning(ToolWarning::new(
                &entry.path,
                format!("collides with {} as {}", first.display(), name),
                WarningKind::NameCollision,
            ));

            match self.config.collision {
                CollisionPolicy::Overwrite => {}
                CollisionPolicy::Skip => return None,
                CollisionPolicy::AutoRename => {
                    match auto_rename(&name, destination, |candidate| taken.contains_key(candidate)) {
                        Some(renamed) => name = renamed,
                        None => {
                            report.add_warning(ToolWarning::new(
                                &entry.path,
                                "no numbered name fits",
                                WarningKind::Skipped,
                            ));
                            return None;
                        }
                    }
                }
            }
        }

        taken.insert(name.clone(), entry.path.clone());
        Some(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_source_is_invalid_input() {
        let temp = TempDir::new().unwrap();
        let config = FlattenConfig::new(temp.path().join("missing"), temp.path().join("out"));

        let err = Flattener::new(config).run().unwrap_err();
        assert!(matches!(err, ToolError::InvalidInput { .. }));
        assert!(!temp.path().join("out").exists());
    }

    #[test]
    fn test_destination_inside_source_is_not_recopied() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("proj");
        fs::create_dir_all(source.join("sub")).unwrap();
        fs::write(source.join("sub/a.txt"), "a").unwrap();

        let config = FlattenConfig::new(&source, source.join("flat"));
        let report = Flattener::new(config.clone()).run().unwrap();
        assert_eq!(report.copied, 1);

        // A second run must not pick up proj/flat/proj_sub_a.txt
        let report = Flattener::new(config).run().unwrap();
        assert_eq!(report.copied, 1);
        assert!(!source.join("flat/proj_flat_proj_sub_a.txt").exists());
    }

    #[test]
    fn test_dry_run_touches_nothing() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("proj");
        fs::create_dir_all(&source).unwrap();
        fs::write(source.join("a.txt"), "a").unwrap();

        let mut config = FlattenConfig::new(&source, temp.path().join("out"));
        config.dry_run = true;
        let report = Flattener::new(config).run().unwrap();

        assert_eq!(report.copied, 1);
        assert_eq!(report.records[0].flat_name, "proj_a.txt");
        assert!(!temp.path().join("out").exists());
    }

    #[test]
    fn test_unfittable_name_is_skipped_with_warning() {
        let name = format!("a.{}", "e".repeat(300));
        let entry = WalkEntry {
            path: PathBuf::from("/src/proj").join(&name),
            relative: PathBuf::from(&name),
            name: name.as_str().into(),
            depth: 1,
        };
        let flattener = Flattener::new(FlattenConfig::new("/src/proj", "/tmp/out"));
        let mut taken = HashMap::new();
        let mut report = FlattenReport::new("/src/proj".into(), "/tmp/out".into(), true);

        let planned = flattener.plan_name("proj", &entry, Path::new("/tmp/out"), &mut taken, &mut report);

        assert_eq!(planned, None);
        assert!(taken.is_empty());
        assert_eq!(report.warning_count(WarningKind::Skipped), 1);
    }
}
