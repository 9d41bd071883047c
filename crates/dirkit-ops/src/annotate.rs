//! Relative path marker comments.
//!
//! Each matching file carries a comment such as `// File: src/app.ts` within
//! its first few lines. Running the annotator again is a no-op for files whose
//! marker already names their current path.

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use strum::Display;
use tracing::{error, info, warn};

use dirkit_core::{AnnotateConfig, ToolError, extension_of};
use dirkit_scan::{DirWalker, WalkItem};

use crate::copy::copy_dir_recursive;

/// Number of leading lines searched for an existing marker.
pub const MARKER_SEARCH_LINES: usize = 5;

static SLASH_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^// File: (.+)$").expect("valid regex"));
static HASH_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^# File: (.+)$").expect("valid regex"));
static HTML_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^<!-- File: (.+) -->$").expect("valid regex"));
static BLOCK_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^/\* File: (.+) \*/$").expect("valid regex"));

/// Comment syntax used for the marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum CommentStyle {
    /// `// File: path`
    DoubleSlash,
    /// `# File: path`
    Hash,
    /// `<!-- File: path -->`
    Html,
    /// `/* File: path */`
    Block,
}

impl CommentStyle {
    /// Style for a normalized extension (`.ts`, `.py`, ...).
    pub fn for_extension(ext: &str) -> Option<Self> {
        match ext {
            ".ts" | ".tsx" | ".js" | ".json" => Some(Self::DoubleSlash),
            ".py" => Some(Self::Hash),
            ".html" | ".md" => Some(Self::Html),
            ".css" => Some(Self::Block),
            _ => None,
        }
    }

    /// Style for a file name.
    pub fn for_file(name: &str) -> Option<Self> {
        extension_of(name).and_then(|ext| Self::for_extension(&ext.to_lowercase()))
    }

    /// Render the marker line (without line ending).
    pub fn render(self, relative: &str) -> String {
        match self {
            Self::DoubleSlash => format!("// File: {relative}"),
            Self::Hash => format!("# File: {relative}"),
            Self::Html => format!("<!-- File: {relative} -->"),
            Self::Block => format!("/* File: {relative} */"),
        }
    }

    /// Extract the path from a marker line, if it is one.
    pub fn parse(self, line: &str) -> Option<&str> {
        let regex = match self {
            Self::DoubleSlash => &*SLASH_MARKER,
            Self::Hash => &*HASH_MARKER,
            Self::Html => &*HTML_MARKER,
            Self::Block => &*BLOCK_MARKER,
        };
        regex
            .captures(line.trim())
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
    }
}

/// What happened to one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum AnnotationOutcome {
    /// A new marker was inserted as the first line.
    Added,
    /// An existing marker named a different path and was replaced.
    Updated { previous: String },
    /// The marker already names the current path.
    UpToDate,
    /// The file was empty and now holds only the marker.
    AnnotatedEmpty,
    /// No comment style is known for this extension.
    Unsupported,
    /// Reading or writing failed.
    Failed { message: String },
}

/// Result for one file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileAnnotation {
    pub path: PathBuf,
    pub relative: String,
    #[serde(flatten)]
    pub outcome: AnnotationOutcome,
}

/// Outcome of an annotation run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnnotateReport {
    /// Folder that was annotated (the copy when one was made).
    pub root: PathBuf,
    /// Original folder when a copy was annotated.
    pub copied_from: Option<PathBuf>,
    pub files: Vec<FileAnnotation>,
}

impl AnnotateReport {
    fn count(&self, pred: impl Fn(&AnnotationOutcome) -> bool) -> usize {
        self.files.iter().filter(|f| pred(&f.outcome)).count()
    }

    /// Files that received a new or updated marker.
    pub fn changed(&self) -> usize {
        self.count(|o| {
            matches!(
                o,
                AnnotationOutcome::Added
                    | AnnotationOutcome::Updated { .. }
                    | AnnotationOutcome::AnnotatedEmpty
            )
        })
    }

    pub fn up_to_date(&self) -> usize {
        self.count(|o| *o == AnnotationOutcome::UpToDate)
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, AnnotationOutcome::Failed { .. }))
    }

    pub fn outcome_for(&self, relative: &str) -> Option<&AnnotationOutcome> {
        self.files
            .iter()
            .find(|f| f.relative == relative)
            .map(|f| &f.outcome)
    }

    pub fn summary(&self) -> String {
        format!(
            "{} files annotated, {} already up-to-date, {} failed",
            self.changed(),
            self.up_to_date(),
            self.failed()
        )
    }
}

/// Insert or update the marker in one file.
pub fn annotate_file(path: &Path, relative: &str, style: CommentStyle) -> io::Result<AnnotationOutcome> {
    let content = fs::read_to_string(path)?;
    let marker = style.render(relative);

    if content.is_empty() {
        fs::write(path, format!("{marker}\n"))?;
        return Ok(AnnotationOutcome::AnnotatedEmpty);
    }

    let lines: Vec<&str> = content.split_inclusive('\n').collect();
    let existing = lines
        .iter()
        .take(MARKER_SEARCH_LINES)
        .enumerate()
        .find_map(|(idx, line)| style.parse(line).map(|found| (idx, found)));

    let mut output = String::with_capacity(content.len() + marker.len() + 2);
    let outcome = match existing {
        Some((_, found)) if found == relative => return Ok(AnnotationOutcome::UpToDate),
        Some((idx, found)) => {
            for (i, line) in lines.iter().enumerate() {
                if i == idx {
                    output.push_str(&marker);
                    output.push_str(line_ending(line));
                } else {
                    output.push_str(line);
                }
            }
            AnnotationOutcome::Updated {
                previous: found.to_string(),
            }
        }
        None => {
            let ending = match line_ending(lines[0]) {
                "\r\n" => "\r\n",
                _ => "\n",
            };
            output.push_str(&marker);
            output.push_str(ending);
            output.push_str(&content);
            AnnotationOutcome::Added
        }
    };

    fs::write(path, output)?;
    Ok(outcome)
}

fn line_ending(line: &str) -> &str {
    if line.ends_with("\r\n") {
        "\r\n"
    } else if line.ends_with('\n') {
        "\n"
    } else {
        ""
    }
}

/// Relative path with `/` separators regardless of platform.
fn slash_path(relative: &Path) -> String {
    relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Annotates every matching file below a base folder.
#[derive(Debug, Clone)]
pub struct Annotator {
    config: AnnotateConfig,
}

impl Annotator {
    pub fn new(config: AnnotateConfig) -> Self {
        Self { config }
    }

    /// Path of the copy made when `make_copy` is set.
    pub fn copy_path(base: &Path) -> Option<PathBuf> {
        let name = base.file_name()?;
        Some(base.with_file_name(format!("{}_copy", name.to_string_lossy())))
    }

    /// Run the annotation.
    pub fn run(&self) -> Result<AnnotateReport, ToolError> {
        let config = &self.config;
        ToolError::require_dir(&config.base)?;
        let base = config
            .base
            .canonicalize()
            .map_err(|e| ToolError::io(&config.base, e))?;

        let mut report = AnnotateReport::default();
        let root = if config.make_copy {
            let copy = Self::copy_path(&base)
                .ok_or_else(|| ToolError::invalid_input(&base, "cannot copy a filesystem root"))?;
            if copy.exists() {
                fs::remove_dir_all(&copy).map_err(|e| ToolError::io(&copy, e))?;
            }
            copy_dir_recursive(&base, &copy).map_err(|e| ToolError::io(&copy, e))?;
            info!("Copied {} to {}", base.display(), copy.display());
            report.copied_from = Some(base);
            copy
        } else {
            base
        };
        report.root = root.clone();

        let walker = DirWalker::new(&root, config.ignore.clone());
        for item in walker.walk() {
            let entry = match item {
                WalkItem::File(entry) => entry,
                WalkItem::Error(warning) => {
                    warn!("{}: {}", warning.path.display(), warning.message);
                    continue;
                }
                _ => continue,
            };
            if !config.includes(&entry.name) {
                continue;
            }

            let relative = slash_path(&entry.relative);
            let outcome = match CommentStyle::for_file(&entry.name) {
                None => {
                    info!("Skipping unsupported extension: {}", entry.path.display());
                    AnnotationOutcome::Unsupported
                }
                Some(style) => match annotate_file(&entry.path, &relative, style) {
                    Ok(outcome) => {
                        log_outcome(&entry.path, &relative, &outcome);
                        outcome
                    }
                    Err(e) => {
                        error!("Failed to process {}: {}", entry.path.display(), e);
                        AnnotationOutcome::Failed {
                            message: e.to_string(),
                        }
                    }
                },
            };

            report.files.push(FileAnnotation {
                path: entry.path,
                relative,
                outcome,
            });
        }

        Ok(report)
    }
}

fn log_outcome(path: &Path, relative: &str, outcome: &AnnotationOutcome) {
    match outcome {
        AnnotationOutcome::Added => info!("Added new comment: {}", path.display()),
        AnnotationOutcome::Updated { previous } => info!(
            "Updated path comment: {} (was: {}, now: {})",
            path.display(),
            previous,
            relative
        ),
        AnnotationOutcome::UpToDate => info!("Already up-to-date: {}", path.display()),
        AnnotationOutcome::AnnotatedEmpty => info!("Annotated empty file: {}", path.display()),
        AnnotationOutcome::Unsupported | AnnotationOutcome::Failed { .. } => {}
    }
}
