//! Clipboard domain. Stateless; writing is fire-and-forget.

use std::sync::Arc;

use async_trait::async_trait;
use rex_dispatch::{on_action, Action, Effect, GetState, Middleware};

use crate::error::{ClipboardError, ClipboardResult};

#[derive(Action, Clone, Debug, PartialEq)]
pub enum ClipboardAction {
    SetText(String),
}

/// Replaces the textual clipboard contents, clearing other representations.
#[async_trait]
pub trait ClipboardWriter: Send + Sync {
    async fn write_text(&self, text: String) -> ClipboardResult<()>;
}

/// No action is produced on completion; failures are only logged.
pub fn middleware(writer: Arc<dyn ClipboardWriter>) -> impl Middleware<(), ClipboardAction> {
    on_action(
        move |action: &ClipboardAction, _state: &GetState<()>| match action {
            ClipboardAction::SetText(text) => {
                let writer = Arc::clone(&writer);
                let text = text.clone();
                Effect::fire_and_forget(async move {
                    let chars = text.chars().count();
                    match writer.write_text(text).await {
                        Ok(()) => tracing::info!(chars, "text copied to clipboard"),
                        Err(err) => tracing::warn!(%err, "clipboard write failed"),
                    }
                })
            }
        },
    )
}

/// System clipboard through `arboard`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClipboard;

#[async_trait]
impl ClipboardWriter for SystemClipboard {
    async fn write_text(&self, text: String) -> ClipboardResult<()> {
        tokio::task::spawn_blocking(move || {
            let mut clipboard = arboard::Clipboard::new()
                .map_err(|err| ClipboardError::Unavailable(err.to_string()))?;
            // set_text clears every other registered representation
            clipboard
                .set_text(text)
                .map_err(|err| ClipboardError::Write(err.to_string()))
        })
        .await
        .map_err(|err| ClipboardError::Worker(err.to_string()))?
    }
}
