//! Run dirkit tools as child processes.
//!
//! A [`ToolRequest`] is validated and turned into a command line, then
//! [`spawn`] starts it and streams [`RunEvent`]s until the child exits or is
//! cancelled.
//!
//! ```rust,no_run
//! use dirkit_runner::{RunEvent, ToolRequest, spawn};
//!
//! # async fn demo() -> Result<(), dirkit_core::ToolError> {
//! let request = ToolRequest::Tree {
//!     path: ".".into(),
//!     ignore: vec![".git".into()],
//!     ignore_ext: vec![],
//! };
//! request.validate()?;
//!
//! let mut handle = spawn("dirkit", request.to_args())?;
//! while let Some(event) = handle.recv().await {
//!     if let RunEvent::Output { line, .. } = event {
//!         println!("{line}");
//!     }
//! }
//! # Ok(())
//! # }
//! ```

mod process;
mod request;

pub use process::{OutputStream, RunEvent, RunHandle, RunOutcome, command_line, spawn};
pub use request::{COMMON_IGNORE_EXTENSIONS, COMMON_IGNORE_FOLDERS, ToolKind, ToolRequest};
