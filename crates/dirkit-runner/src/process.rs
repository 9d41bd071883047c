//! Spawning a tool as a child process and streaming its output.

use std::ffi::OsStr;
use std::process::Stdio;

use chrono::{DateTime, Local};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use strum::Display;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use dirkit_core::ToolError;

/// Which pipe a line came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum OutputStream {
    Stdout,
    Stderr,
}

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RunOutcome {
    /// Exit status zero.
    Success,
    /// Non-zero exit; `code` is `None` when the child died from a signal.
    Failed { code: Option<i32> },
    /// Stopped through [`RunHandle::cancel`].
    Cancelled,
    /// Waiting on the child failed.
    Error { message: String },
}

impl RunOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

/// Progress of a child process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunEvent {
    Started {
        pid: Option<u32>,
        at: DateTime<Local>,
    },
    Output {
        stream: OutputStream,
        line: String,
    },
    /// Always the last event; every output line is sent before it.
    Finished(RunOutcome),
}

/// A running child process.
pub struct RunHandle {
    events: mpsc::UnboundedReceiver<RunEvent>,
    cancel: CancellationToken,
    supervisor: JoinHandle<()>,
}

impl RunHandle {
    /// Next event, or `None` once [`RunEvent::Finished`] has been received.
    pub async fn recv(&mut self) -> Option<RunEvent> {
        self.events.recv().await
    }

    /// Kill the child. A [`RunOutcome::Cancelled`] event follows.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Token that cancels this run when triggered.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Discard remaining output and return the outcome.
    pub async fn wait(mut self) -> RunOutcome {
        let mut outcome = None;
        while let Some(event) = self.events.recv().await {
            if let RunEvent::Finished(o) = event {
                outcome = Some(o);
            }
        }
        let _ = self.supervisor.await;
        outcome.unwrap_or(RunOutcome::Error {
            message: "child supervisor stopped without a result".to_string(),
        })
    }
}

/// Render a command line for display.
pub fn command_line<I, S>(program: impl AsRef<OsStr>, args: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    std::iter::once(program.as_ref().to_string_lossy().into_owned())
        .chain(args.into_iter().map(|a| a.as_ref().to_string_lossy().into_owned()))
        .join(" ")
}

/// Start `program` with piped stdout and stderr.
///
/// Must be called inside a tokio runtime. Every line of both streams is
/// forwarded as a [`RunEvent::Output`].
pub fn spawn<I, S>(program: impl AsRef<OsStr>, args: I) -> Result<RunHandle, ToolError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let program = program.as_ref();
    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|source| ToolError::Spawn {
            program: program.to_string_lossy().into_owned(),
            source,
        })?;

    let (tx, events) = mpsc::unbounded_channel();
    let _ = tx.send(RunEvent::Started {
        pid: child.id(),
        at: Local::now(),
    });
    debug!("Started child process {:?}", child.id());

    let readers: Vec<JoinHandle<()>> = [
        child
            .stdout
            .take()
            .map(|out| tokio::spawn(forward_lines(out, OutputStream::Stdout, tx.clone()))),
        child
            .stderr
            .take()
            .map(|err| tokio::spawn(forward_lines(err, OutputStream::Stderr, tx.clone()))),
    ]
    .into_iter()
    .flatten()
    .collect();

    let cancel = CancellationToken::new();
    let token = cancel.clone();

    let supervisor = tokio::spawn(async move {
        let outcome = tokio::select! {
            status = child.wait() => match status {
                Ok(status) if status.success() => RunOutcome::Success,
                Ok(status) => RunOutcome::Failed { code: status.code() },
                Err(e) => RunOutcome::Error { message: e.to_string() },
            },
            _ = token.cancelled() => {
                if let Err(e) = child.kill().await {
                    warn!("Failed to stop child process: {}", e);
                }
                RunOutcome::Cancelled
            }
        };

        for reader in readers {
            if outcome == RunOutcome::Cancelled {
                // Grandchildren may still hold the pipes open
                reader.abort();
            } else {
                let _ = reader.await;
            }
        }

        debug!("Child process finished: {:?}", outcome);
        let _ = tx.send(RunEvent::Finished(outcome));
    });

    Ok(RunHandle {
        events,
        cancel,
        supervisor,
    })
}

async fn forward_lines<R>(reader: R, stream: OutputStream, tx: mpsc::UnboundedSender<RunEvent>)
where
    R: AsyncRead + Unpin,
{
    let mut segments = BufReader::new(reader).split(b'\n');
    loop {
        match segments.next_segment().await {
            Ok(Some(mut bytes)) => {
                if bytes.last() == Some(&b'\r') {
                    bytes.pop();
                }
                let line = String::from_utf8_lossy(&bytes).into_owned();
                if tx.send(RunEvent::Output { stream, line }).is_err() {
                    break;
                }
            }
            Ok(None) => break,
            Err(e) => {
                warn!("Failed to read child {}: {}", stream, e);
                break;
            }
        }
    }
}
