//! Application composition: root action, root state, and the wiring of the
//! domain reducers and middleware into one store.

use std::path::PathBuf;

use rex_dispatch::{
    middleware, reducer, Action, ActionLoggerConfig, ActionLoggerMiddleware, ActionSummary,
    BoxMiddleware, Lens, Middleware, Prism, Reducer, Store, StoreConfig,
};
use serde::Serialize;

use crate::capture::{self, CaptureAction, CaptureState};
use crate::clipboard::{self, ClipboardAction};
use crate::config::Settings;
use crate::detection::{self, DetectionAction, DetectionState};
use crate::orchestrator::{self, TriggerPolicy};
use crate::world::World;

pub type AppStore = Store<AppState, AppAction>;

#[derive(Action, Clone, Debug, PartialEq)]
pub enum AppAction {
    /// Run the whole pipeline once.
    Trigger,
    #[action(lift)]
    Capture(CaptureAction),
    #[action(lift)]
    Detection(DetectionAction),
    #[action(lift)]
    Clipboard(ClipboardAction),
}

const SUMMARY_TEXT_CHARS: usize = 32;

fn clip(text: &str) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(SUMMARY_TEXT_CHARS).collect();
    if chars.next().is_some() {
        format!("{head:?}…")
    } else {
        format!("{head:?}")
    }
}

impl ActionSummary for AppAction {
    fn summary(&self) -> String {
        match self {
            AppAction::Detection(DetectionAction::DetectSucceeded { image, text }) => {
                format!("DetectSucceeded {{ image: {}, text: {} }}", image.display(), clip(text))
            }
            AppAction::Clipboard(ClipboardAction::SetText(text)) => {
                format!("SetText({})", clip(text))
            }
            other => format!("{other:?}"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AppState {
    pub capture: CaptureState,
    pub detection: DetectionState,
    /// Fixed for the lifetime of the process.
    pub scratch_file: PathBuf,
}

impl AppState {
    pub fn new(scratch_file: PathBuf) -> Self {
        Self {
            capture: CaptureState::default(),
            detection: DetectionState::default(),
            scratch_file,
        }
    }

    pub fn is_busy(&self) -> bool {
        self.capture.is_capturing || self.detection.is_detecting
    }
}

fn extract_capture(action: &AppAction) -> Option<CaptureAction> {
    match action {
        AppAction::Capture(action) => Some(action.clone()),
        _ => None,
    }
}

fn extract_detection(action: &AppAction) -> Option<DetectionAction> {
    match action {
        AppAction::Detection(action) => Some(action.clone()),
        _ => None,
    }
}

fn extract_clipboard(action: &AppAction) -> Option<ClipboardAction> {
    match action {
        AppAction::Clipboard(action) => Some(action.clone()),
        _ => None,
    }
}

pub const CAPTURE_ACTION: Prism<AppAction, CaptureAction> =
    Prism::new(extract_capture, AppAction::Capture);
pub const DETECTION_ACTION: Prism<AppAction, DetectionAction> =
    Prism::new(extract_detection, AppAction::Detection);
pub const CLIPBOARD_ACTION: Prism<AppAction, ClipboardAction> =
    Prism::new(extract_clipboard, AppAction::Clipboard);

pub const CAPTURE_STATE: Lens<AppState, CaptureState> =
    Lens::new(|s| s.capture.clone(), |s, c| s.capture = c);
pub const DETECTION_STATE: Lens<AppState, DetectionState> =
    Lens::new(|s| s.detection.clone(), |s, d| s.detection = d);

/// The capture and detection reducers lifted into the root.
///
/// Clipboard has no state and therefore no reducer.
pub fn reducer() -> impl Reducer<AppState, AppAction> {
    reducer::merge([
        reducer::lift(capture::reducer, CAPTURE_ACTION, CAPTURE_STATE).boxed(),
        reducer::lift(detection::reducer, DETECTION_ACTION, DETECTION_STATE).boxed(),
    ])
}

/// Logger first, domains next, orchestrator last.
pub fn middleware(
    world: &World,
    policy: TriggerPolicy,
    logger: ActionLoggerConfig,
) -> impl Middleware<AppState, AppAction> {
    let logger: BoxMiddleware<AppState, AppAction> = ActionLoggerMiddleware::new(logger).boxed();
    middleware::merge([
        logger,
        middleware::lift(
            capture::middleware(world.capture.clone()),
            CAPTURE_ACTION,
            CAPTURE_STATE,
        )
        .boxed(),
        middleware::lift(
            detection::middleware(world.detection.clone()),
            DETECTION_ACTION,
            DETECTION_STATE,
        )
        .boxed(),
        middleware::lift(
            clipboard::middleware(world.clipboard.clone()),
            CLIPBOARD_ACTION,
            Lens::unit(),
        )
        .boxed(),
        orchestrator::middleware(policy).boxed(),
    ])
}

pub fn build_store(world: &World, settings: &Settings) -> AppStore {
    let logger = ActionLoggerConfig::new(
        settings.log_actions.as_deref(),
        settings.log_actions_exclude.as_deref(),
    );
    Store::with_config(
        AppState::new(settings.scratch_file.clone()),
        reducer(),
        middleware(world, settings.trigger_policy, logger),
        StoreConfig {
            max_chain_depth: settings.max_chain_depth,
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ExitError;

    #[test]
    fn test_prisms_round_trip_and_reject_other_domains() {
        let capture = CaptureAction::CaptureFailed(ExitError::new(1));
        assert_eq!(
            CAPTURE_ACTION.extract(&CAPTURE_ACTION.embed(capture.clone())),
            Some(capture)
        );

        let detect = DetectionAction::StartDetect("/tmp/ocr.png".into());
        assert_eq!(CAPTURE_ACTION.extract(&DETECTION_ACTION.embed(detect.clone())), None);
        assert_eq!(CLIPBOARD_ACTION.extract(&AppAction::Trigger), None);
        assert_eq!(
            DETECTION_ACTION.extract(&DETECTION_ACTION.embed(detect.clone())),
            Some(detect)
        );
    }

    #[test]
    fn test_root_reducer_routes_to_domain_state() {
        let reducer = reducer();
        let mut state = AppState::new("/tmp/ocr.png".into());

        assert!(!reducer.reduce(&mut state, &AppAction::Trigger));
        assert!(reducer.reduce(
            &mut state,
            &AppAction::Capture(CaptureAction::StartCapture("/tmp/ocr.png".into()))
        ));
        assert!(state.capture.is_capturing);
        assert_eq!(state.detection, DetectionState::default());
        assert!(state.is_busy());
    }

    #[test]
    fn test_store_takes_depth_limit_and_scratch_file_from_settings() {
        let settings = Settings {
            scratch_file: "/tmp/shot.png".into(),
            max_chain_depth: 7,
            ..Settings::default()
        };
        let store = build_store(&World::live(&settings), &settings);

        assert_eq!(store.config().max_chain_depth, 7);
        assert_eq!(store.state().scratch_file, PathBuf::from("/tmp/shot.png"));
        assert!(!store.state().is_busy());
    }

    #[test]
    fn test_summary_clips_long_text() {
        let long = "x".repeat(100);
        let summary = AppAction::Clipboard(ClipboardAction::SetText(long)).summary();
        assert!(summary.len() < 60, "{summary}");
        assert!(summary.ends_with("…)"));

        assert_eq!(AppAction::Trigger.summary(), "Trigger");
    }

    #[test]
    fn test_lifted_actions_keep_inner_names_and_domain_categories() {
        use rex_dispatch::ActionCategory;

        let action = AppAction::Capture(CaptureAction::StartCapture("/tmp/ocr.png".into()));
        assert_eq!(action.name(), "StartCapture");
        assert_eq!(action.category(), Some("capture"));
        assert_eq!(AppAction::Trigger.category(), None);
    }
}
