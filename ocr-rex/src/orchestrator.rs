//! Pipeline sequencing: trigger -> capture -> detect -> clipboard.
//!
//! [`next_action`] is a pure function of the processed action and the
//! post-reducer state. [`middleware`] wraps it and must sit last in the
//! application chain, so it only sees actions the domains already handled.

use rex_dispatch::{on_action, Action, Effect, GetState, Middleware};
use serde::{Deserialize, Serialize};

use crate::app::{AppAction, AppState};
use crate::capture::CaptureAction;
use crate::clipboard::ClipboardAction;
use crate::detection::DetectionAction;

/// What to do with a trigger that arrives while a chain is in flight.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerPolicy {
    /// Ignore the trigger while capturing or detecting.
    #[default]
    RejectWhileBusy,
    /// Start another chain anyway. Both chains share the scratch file, so a
    /// second capture may overwrite the image the first detection is reading.
    AllowOverlap,
}

/// The action that follows `action`, if any.
///
/// Failures never advance the pipeline.
pub fn next_action(action: &AppAction, state: &AppState, policy: TriggerPolicy) -> Option<AppAction> {
    match action {
        AppAction::Trigger => {
            if policy == TriggerPolicy::RejectWhileBusy && state.is_busy() {
                tracing::warn!(
                    capturing = state.capture.is_capturing,
                    detecting = state.detection.is_detecting,
                    "trigger ignored: pipeline busy"
                );
                return None;
            }
            Some(AppAction::Capture(CaptureAction::StartCapture(
                state.scratch_file.clone(),
            )))
        }
        AppAction::Capture(CaptureAction::CaptureSucceeded(path)) => {
            Some(AppAction::Detection(DetectionAction::StartDetect(path.clone())))
        }
        AppAction::Detection(DetectionAction::DetectSucceeded { text, .. }) => {
            Some(AppAction::Clipboard(ClipboardAction::SetText(text.clone())))
        }
        _ => None,
    }
}

pub fn middleware(policy: TriggerPolicy) -> impl Middleware<AppState, AppAction> {
    on_action(move |action: &AppAction, state: &GetState<AppState>| {
        match next_action(action, &state.get(), policy) {
            Some(next) => {
                tracing::debug!(from = action.name(), to = next.name(), "pipeline advanced");
                Effect::just(next)
            }
            None => Effect::none(),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{DetectionError, ExitError};
    use std::path::PathBuf;

    fn idle() -> AppState {
        AppState::new(PathBuf::from("/tmp/ocr.png"))
    }

    #[test]
    fn test_trigger_starts_capture_into_scratch_file() {
        assert_eq!(
            next_action(&AppAction::Trigger, &idle(), TriggerPolicy::default()),
            Some(AppAction::Capture(CaptureAction::StartCapture(
                "/tmp/ocr.png".into()
            )))
        );
    }

    #[test]
    fn test_stages_advance_on_success() {
        let state = idle();
        let policy = TriggerPolicy::default();

        assert_eq!(
            next_action(
                &AppAction::Capture(CaptureAction::CaptureSucceeded("/tmp/p.png".into())),
                &state,
                policy
            ),
            Some(AppAction::Detection(DetectionAction::StartDetect(
                "/tmp/p.png".into()
            )))
        );
        assert_eq!(
            next_action(
                &AppAction::Detection(DetectionAction::DetectSucceeded {
                    image: "/tmp/p.png".into(),
                    text: "a b".into(),
                }),
                &state,
                policy
            ),
            Some(AppAction::Clipboard(ClipboardAction::SetText("a b".into())))
        );
    }

    #[test]
    fn test_failures_and_intents_stop_the_pipeline() {
        let state = idle();
        let policy = TriggerPolicy::default();
        let terminal = [
            AppAction::Capture(CaptureAction::CaptureFailed(ExitError::new(1))),
            AppAction::Detection(DetectionAction::DetectFailed(
                DetectionError::NoTextRegionsReturned,
            )),
            AppAction::Capture(CaptureAction::StartCapture("/tmp/ocr.png".into())),
            AppAction::Detection(DetectionAction::StartDetect("/tmp/ocr.png".into())),
            AppAction::Clipboard(ClipboardAction::SetText("x".into())),
        ];
        for action in &terminal {
            assert_eq!(next_action(action, &state, policy), None, "{action:?}");
        }
    }

    #[test]
    fn test_busy_pipeline_rejects_trigger_unless_overlap_allowed() {
        let mut state = idle();
        state.detection.is_detecting = true;

        assert_eq!(
            next_action(&AppAction::Trigger, &state, TriggerPolicy::RejectWhileBusy),
            None
        );
        assert!(next_action(&AppAction::Trigger, &state, TriggerPolicy::AllowOverlap).is_some());
    }

    #[test]
    fn test_policy_uses_snake_case_names() {
        assert_eq!(
            serde_json::to_string(&TriggerPolicy::AllowOverlap).expect("serialize"),
            r#""allow_overlap""#
        );
        let policy: TriggerPolicy =
            serde_json::from_str(r#""reject_while_busy""#).expect("parse");
        assert_eq!(policy, TriggerPolicy::RejectWhileBusy);
    }
}
