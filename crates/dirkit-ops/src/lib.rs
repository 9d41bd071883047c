//! File operations for dirkit.
//!
//! - **Flattening**: copy every non-ignored file of a tree into one directory,
//!   naming each copy after its original relative path
//!   (`proj/a/b/c.txt` becomes `proj_a_b_c.txt`).
//! - **Annotation**: keep a `File: <relative path>` comment near the top of
//!   source files.
//! - **Tree rendering**: draw a [`DirTree`](dirkit_core::DirTree) with box
//!   drawing guides.
//!
//! ```rust,no_run
//! use dirkit_core::{FlattenConfig, IgnoreSet};
//! use dirkit_ops::Flattener;
//!
//! let config = FlattenConfig::builder()
//!     .source("/path/to/proj")
//!     .destination("/tmp/flat")
//!     .ignore(IgnoreSet::from_lists(["node_modules", ".git"], ["log"]))
//!     .build()
//!     .unwrap();
//!
//! let report = Flattener::new(config).run().unwrap();
//! println!("{}", report.summary());
//! ```

mod annotate;
mod collision;
mod copy;
mod flatten;
pub mod naming;
mod render;
mod report;

pub use annotate::{
    AnnotateReport, AnnotationOutcome, Annotator, CommentStyle, FileAnnotation, annotate_file,
};
pub use collision::auto_rename;
pub use copy::{copy_dir_recursive, copy_file};
pub use flatten::Flattener;
pub use render::{RenderOptions, render_tree};
pub use report::{FlattenReport, OperationError, RenameRecord};
