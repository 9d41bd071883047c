//! Tool invocations built from form-style inputs.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};

use dirkit_core::ToolError;

/// Folder names offered as one-click ignores for the flattener.
pub const COMMON_IGNORE_FOLDERS: &[&str] = &[
    "node_modules",
    ".git",
    ".vscode",
    "__pycache__",
    "dist",
    "build",
    ".next",
    ".nuxt",
    "target",
    "bin",
    "obj",
];

/// Extensions offered as one-click ignores for the flattener.
pub const COMMON_IGNORE_EXTENSIONS: &[&str] = &[
    ".log",
    ".tmp",
    ".cache",
    ".lock",
    ".DS_Store",
    ".thumbs.db",
    ".exe",
    ".dll",
    ".so",
    ".o",
    ".pyc",
];

/// Which tool a request runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
pub enum ToolKind {
    Flatten,
    Tree,
    Annotate,
}

/// One tool invocation with its parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "tool", rename_all = "lowercase")]
pub enum ToolRequest {
    Flatten {
        source: PathBuf,
        destination: PathBuf,
        #[serde(default)]
        ignore: Vec<String>,
        #[serde(default)]
        ignore_ext: Vec<String>,
    },
    Tree {
        path: PathBuf,
        #[serde(default)]
        ignore: Vec<String>,
        #[serde(default)]
        ignore_ext: Vec<String>,
    },
    Annotate {
        base: PathBuf,
        #[serde(default)]
        extensions: Vec<String>,
        #[serde(default)]
        ignore: Vec<String>,
        #[serde(default)]
        make_copy: bool,
    },
}

impl ToolRequest {
    pub fn kind(&self) -> ToolKind {
        match self {
            Self::Flatten { .. } => ToolKind::Flatten,
            Self::Tree { .. } => ToolKind::Tree,
            Self::Annotate { .. } => ToolKind::Annotate,
        }
    }

    /// Add the preset folder ignores, keeping entries already present.
    ///
    /// Only flatten requests take presets; other requests are unchanged.
    pub fn with_common_folders(mut self) -> Self {
        if let Self::Flatten { ignore, .. } = &mut self {
            merge(ignore, COMMON_IGNORE_FOLDERS);
        }
        self
    }

    /// Add the preset extension ignores, keeping entries already present.
    pub fn with_common_extensions(mut self) -> Self {
        if let Self::Flatten { ignore_ext, .. } = &mut self {
            merge(ignore_ext, COMMON_IGNORE_EXTENSIONS);
        }
        self
    }

    /// Check required inputs before anything is spawned.
    ///
    /// Input folders must exist; a flatten destination may be missing since
    /// the flattener creates it.
    pub fn validate(&self) -> Result<(), ToolError> {
        match self {
            Self::Flatten {
                source,
                destination,
                ..
            } => {
                require_value(source, "source directory")?;
                require_value(destination, "destination directory")?;
                ToolError::require_dir(source)?;
                if destination.exists() && !destination.is_dir() {
                    return Err(ToolError::invalid_input(
                        destination,
                        "destination exists and is not a directory",
                    ));
                }
                Ok(())
            }
            Self::Tree { path, .. } => {
                require_value(path, "path")?;
                ToolError::require_dir(path)
            }
            Self::Annotate { base, .. } => {
                require_value(base, "base folder")?;
                ToolError::require_dir(base)
            }
        }
    }

    /// Arguments for the child command, starting with the tool name.
    ///
    /// Optional flags are left out when their lists are empty.
    pub fn to_args(&self) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![<&str>::from(self.kind()).into()];
        match self {
            Self::Flatten {
                source,
                destination,
                ignore,
                ignore_ext,
            } => {
                args.push(source.into());
                args.push(destination.into());
                push_list(&mut args, "--ignore", ignore);
                push_list(&mut args, "--ignore-ext", ignore_ext);
            }
            Self::Tree {
                path,
                ignore,
                ignore_ext,
            } => {
                args.push(path.into());
                push_list(&mut args, "--ignore", ignore);
                push_list(&mut args, "--ignore-ext", ignore_ext);
            }
            Self::Annotate {
                base,
                extensions,
                ignore,
                make_copy,
            } => {
                args.push(base.into());
                if *make_copy {
                    args.push("--make-copy".into());
                }
                push_list(&mut args, "--extensions", extensions);
                push_list(&mut args, "--ignore", ignore);
            }
        }
        args
    }
}

fn require_value(path: &Path, name: &str) -> Result<(), ToolError> {
    if path.as_os_str().to_string_lossy().trim().is_empty() {
        return Err(ToolError::invalid_input(
            path,
            format!("please provide a value for '{name}'"),
        ));
    }
    Ok(())
}

fn push_list(args: &mut Vec<OsString>, flag: &str, values: &[String]) {
    let values: Vec<&str> = values
        .iter()
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .collect();
    if values.is_empty() {
        return;
    }
    args.push(flag.into());
    args.extend(values.into_iter().map(OsString::from));
}

fn merge(list: &mut Vec<String>, presets: &[&str]) {
    for preset in presets {
        if !list.iter().any(|v| v == preset) {
            list.push((*preset).to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn strings(args: &[OsString]) -> Vec<String> {
        args.iter().map(|a| a.to_string_lossy().into_owned()).collect()
    }

    #[test]
    fn test_flatten_args() {
        let request = ToolRequest::Flatten {
            source: "/src/proj".into(),
            destination: "/out".into(),
            ignore: vec!["node_modules".into(), " ".into()],
            ignore_ext: vec![],
        };
        assert_eq!(
            strings(&request.to_args()),
            vec!["flatten", "/src/proj", "/out", "--ignore", "node_modules"]
        );
    }

    #[test]
    fn test_annotate_args() {
        let request = ToolRequest::Annotate {
            base: "/site".into(),
            extensions: vec![".ts".into(), ".css".into()],
            ignore: vec![],
            make_copy: true,
        };
        assert_eq!(
            strings(&request.to_args()),
            vec!["annotate", "/site", "--make-copy", "--extensions", ".ts", ".css"]
        );
    }

    #[test]
    fn test_presets_merge_without_duplicates() {
        let request = ToolRequest::Flatten {
            source: "/a".into(),
            destination: "/b".into(),
            ignore: vec!["node_modules".into(), "vendor".into()],
            ignore_ext: vec![],
        }
        .with_common_folders()
        .with_common_extensions();

        let ToolRequest::Flatten {
            ignore, ignore_ext, ..
        } = request
        else {
            panic!("expected flatten request");
        };
        assert_eq!(ignore.iter().filter(|v| *v == "node_modules").count(), 1);
        assert_eq!(ignore.len(), COMMON_IGNORE_FOLDERS.len() + 1);
        assert_eq!(ignore_ext.len(), COMMON_IGNORE_EXTENSIONS.len());
    }

    #[test]
    fn test_presets_ignored_for_tree() {
        let request = ToolRequest::Tree {
            path: "/a".into(),
            ignore: vec![],
            ignore_ext: vec![],
        };
        assert_eq!(request.clone().with_common_folders(), request);
    }

    #[test]
    fn test_validate() {
        let temp = TempDir::new().unwrap();
        let ok = ToolRequest::Flatten {
            source: temp.path().into(),
            destination: temp.path().join("not-yet"),
            ignore: vec![],
            ignore_ext: vec![],
        };
        assert!(ok.validate().is_ok());

        let empty = ToolRequest::Tree {
            path: PathBuf::new(),
            ignore: vec![],
            ignore_ext: vec![],
        };
        let err = empty.validate().unwrap_err();
        assert!(err.to_string().contains("'path'"));

        let missing = ToolRequest::Annotate {
            base: temp.path().join("missing"),
            extensions: vec![],
            ignore: vec![],
            make_copy: false,
        };
        assert!(matches!(missing.validate(), Err(ToolError::InvalidInput { .. })));
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(ToolKind::Annotate.to_string(), "annotate");
        assert_eq!("tree".parse::<ToolKind>().unwrap(), ToolKind::Tree);
    }
}
