//! Capture domain: run an interactive screen-capture tool into a file.
//!
//! `idle -> capturing -> {succeeded(path) | failed(error)}`. A new
//! `StartCapture` resets the state to capturing from any terminal state.

use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitStatus;
use std::sync::Arc;

use async_trait::async_trait;
use rex_dispatch::{attempt, on_action, Action, Effect, GetState, Middleware};
use serde::{Deserialize, Serialize};
use tokio::process::Command;

use crate::error::ExitError;

#[derive(Action, Clone, Debug, PartialEq)]
pub enum CaptureAction {
    /// Capture into the given file, overwriting it.
    StartCapture(PathBuf),
    CaptureSucceeded(PathBuf),
    CaptureFailed(ExitError),
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CaptureState {
    pub is_capturing: bool,
    #[serde(with = "crate::encoding", default)]
    pub last_attempt: Option<Result<PathBuf, ExitError>>,
}

impl CaptureState {
    pub fn failure(&self) -> Option<&ExitError> {
        self.last_attempt.as_ref().and_then(|attempt| attempt.as_ref().err())
    }
}

pub fn reducer(state: &mut CaptureState, action: &CaptureAction) -> bool {
    let next = match action {
        CaptureAction::StartCapture(_) => CaptureState {
            is_capturing: true,
            last_attempt: None,
        },
        CaptureAction::CaptureSucceeded(path) => CaptureState {
            is_capturing: false,
            last_attempt: Some(Ok(path.clone())),
        },
        CaptureAction::CaptureFailed(err) => CaptureState {
            is_capturing: false,
            last_attempt: Some(Err(err.clone())),
        },
    };
    let changed = *state != next;
    *state = next;
    changed
}

/// Runs the interactive capture and writes a single image to `path`.
#[async_trait]
pub trait ScreenCapture: Send + Sync {
    async fn capture(&self, path: &Path) -> Result<PathBuf, ExitError>;
}

pub fn middleware(capture: Arc<dyn ScreenCapture>) -> impl Middleware<CaptureState, CaptureAction> {
    on_action(
        move |action: &CaptureAction, _state: &GetState<CaptureState>| match action {
            CaptureAction::StartCapture(path) => {
                tracing::info!(path = %path.display(), "capture started");
                let capture = Arc::clone(&capture);
                let path = path.clone();
                attempt(async move { capture.capture(&path).await })
                    .map_ok(CaptureAction::CaptureSucceeded)
                    .catch(|err| {
                        tracing::info!(exit_code = err.exit_code, "capture failed");
                        CaptureAction::CaptureFailed(err)
                    })
            }
            CaptureAction::CaptureSucceeded(path) => {
                tracing::info!(path = %path.display(), "capture finished");
                Effect::none()
            }
            CaptureAction::CaptureFailed(_) => Effect::none(),
        },
    )
}

/// Live capture: spawns an external program with the target path appended
/// to its arguments.
#[derive(Debug, Clone)]
pub struct CommandCapture {
    program: String,
    args: Vec<String>,
}

impl CommandCapture {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }
}

#[async_trait]
impl ScreenCapture for CommandCapture {
    async fn capture(&self, path: &Path) -> Result<PathBuf, ExitError> {
        // the scratch file is reused; a leftover image must not pass for a new one
        match tokio::fs::remove_file(path).await {
            Ok(()) => {}
            Err(err) if err.kind() == io::ErrorKind::NotFound => {}
            Err(err) => {
                tracing::warn!(path = %path.display(), %err, "failed to clear capture target");
                return Err(ExitError::new(ExitError::NOT_LAUNCHED));
            }
        }

        let status = Command::new(&self.program)
            .args(&self.args)
            .arg(path)
            .kill_on_drop(true)
            .status()
            .await
            .map_err(|err| {
                tracing::warn!(program = %self.program, %err, "failed to launch capture program");
                ExitError::new(ExitError::NOT_LAUNCHED)
            })?;

        check_status(status, path)
    }
}

fn check_status(status: ExitStatus, path: &Path) -> Result<PathBuf, ExitError> {
    if !status.success() {
        return Err(ExitError::new(status.code().unwrap_or(ExitError::SIGNALED)));
    }
    // some tools exit cleanly when the selection is cancelled
    if !path.exists() {
        tracing::debug!(path = %path.display(), "capture wrote no file; treating as cancelled");
        return Err(ExitError::new(1));
    }
    Ok(path.to_path_buf())
}
