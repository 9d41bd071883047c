#![cfg(unix)]

use std::time::Duration;

use dirkit_runner::{OutputStream, RunEvent, RunHandle, RunOutcome, spawn};

async fn collect(mut handle: RunHandle) -> Vec<RunEvent> {
    let mut events = Vec::new();
    while let Some(event) = handle.recv().await {
        events.push(event);
    }
    events
}

fn lines(events: &[RunEvent], wanted: OutputStream) -> Vec<String> {
    events
        .iter()
        .filter_map(|e| match e {
            RunEvent::Output { stream, line } if *stream == wanted => Some(line.clone()),
            _ => None,
        })
        .collect()
}

#[tokio::test]
async fn test_forwards_both_streams_and_success() {
    let handle = spawn("sh", ["-c", "echo one; echo two >&2; echo three"]).unwrap();
    let events = collect(handle).await;

    assert!(matches!(events.first(), Some(RunEvent::Started { .. })));
    assert_eq!(events.last(), Some(&RunEvent::Finished(RunOutcome::Success)));
    assert_eq!(lines(&events, OutputStream::Stdout), vec!["one", "three"]);
    assert_eq!(lines(&events, OutputStream::Stderr), vec!["two"]);
}

#[tokio::test]
async fn test_reports_exit_code() {
    let handle = spawn("sh", ["-c", "echo failing; exit 3"]).unwrap();
    assert_eq!(handle.wait().await, RunOutcome::Failed { code: Some(3) });
}

#[tokio::test]
async fn test_crlf_and_unterminated_lines() {
    let handle = spawn("sh", ["-c", "printf 'a\\r\\nb'"]).unwrap();
    let events = collect(handle).await;
    assert_eq!(lines(&events, OutputStream::Stdout), vec!["a", "b"]);
}

#[tokio::test]
async fn test_cancel_stops_long_running_child() {
    let handle = spawn("sleep", ["30"]).unwrap();
    let token = handle.cancellation_token();

    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        token.cancel();
    });

    let outcome = tokio::time::timeout(Duration::from_secs(10), handle.wait())
        .await
        .expect("cancelled child should finish quickly");
    assert_eq!(outcome, RunOutcome::Cancelled);
}
