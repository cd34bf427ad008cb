//! Terminal shell around the store.
//!
//! Interactive mode treats every line on stdin as a click on the status
//! indicator and prints a status line whenever the state changes.

use tokio::io::{self, AsyncBufReadExt, BufReader};
use tokio_stream::StreamExt;

use crate::app::{AppAction, AppState, AppStore};

pub fn status_line(state: &AppState) -> String {
    if state.capture.is_capturing {
        return "capturing…".to_string();
    }
    if state.detection.is_detecting {
        return "detecting…".to_string();
    }
    if let Some(err) = state.capture.failure() {
        return format!("capture failed: {err}");
    }
    if let Some(err) = state.detection.failure() {
        return format!("detection failed: {err}");
    }
    match state.detection.text() {
        Some(text) => format!("copied {} chars: {text}", text.chars().count()),
        None => "idle".to_string(),
    }
}

/// Whether the last run made it to the clipboard.
pub fn succeeded(state: &AppState) -> bool {
    state.capture.failure().is_none()
        && state.detection.failure().is_none()
        && state.detection.text().is_some()
}

fn render(state: &AppState, json: bool) -> anyhow::Result<String> {
    if json {
        Ok(serde_json::to_string(state)?)
    } else {
        Ok(status_line(state))
    }
}

/// Trigger once, wait for every effect, print the final state.
pub async fn run_once(store: &AppStore, json: bool) -> anyhow::Result<bool> {
    store.dispatch(AppAction::Trigger);
    store.settled().await;

    let state = store.state();
    println!("{}", render(&state, json)?);
    Ok(succeeded(&state))
}

pub async fn run_interactive(store: AppStore, json: bool) -> anyhow::Result<()> {
    let mut states = store.states();
    let watcher = tokio::spawn(async move {
        let mut last = String::new();
        while let Some(state) = states.next().await {
            match render(&state, json) {
                Ok(line) if line != last => {
                    println!("{line}");
                    last = line;
                }
                Ok(_) => {}
                Err(err) => tracing::warn!(%err, "failed to render state"),
            }
        }
    });

    eprintln!("press Enter to capture, q to quit");
    let mut lines = BufReader::new(io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match line.trim() {
            "q" | "quit" => break,
            _ => store.dispatch(AppAction::Trigger),
        }
    }

    tracing::debug!(in_flight = store.in_flight(), "shutting down");
    watcher.abort();
    Ok(())
}
