//! End-to-end runs of the pipeline against stub capabilities.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use ocr_rex::app::{self, AppAction, AppState};
use ocr_rex::capture::{CaptureAction, CaptureState, ScreenCapture};
use ocr_rex::clipboard::{ClipboardAction, ClipboardWriter};
use ocr_rex::detection::{Detected, DetectionAction, DetectionState, TextDetector};
use ocr_rex::error::{ClipboardError, ClipboardResult, DetectionError, ExitError};
use ocr_rex::{shell, Settings, TriggerPolicy, World};
use rex_dispatch::{
    assert_emitted, assert_not_emitted, count_emitted, Action, ActionLoggerConfig, StoreConfig,
    TestHarness,
};

const SCRATCH: &str = "/tmp/ocr-rex-test.png";

struct StubCapture {
    outcome: Result<(), ExitError>,
    calls: Mutex<Vec<PathBuf>>,
}

#[async_trait]
impl ScreenCapture for StubCapture {
    async fn capture(&self, path: &Path) -> Result<PathBuf, ExitError> {
        self.calls.lock().expect("calls").push(path.to_path_buf());
        self.outcome.clone().map(|()| path.to_path_buf())
    }
}

struct StubDetector {
    outcome: Result<Vec<String>, DetectionError>,
    calls: Mutex<Vec<PathBuf>>,
}

#[async_trait]
impl TextDetector for StubDetector {
    async fn detect(&self, image: &Path) -> Result<Vec<String>, DetectionError> {
        self.calls.lock().expect("calls").push(image.to_path_buf());
        self.outcome.clone()
    }
}

#[derive(Default)]
struct StubClipboard {
    fail: bool,
    written: Mutex<Vec<String>>,
}

#[async_trait]
impl ClipboardWriter for StubClipboard {
    async fn write_text(&self, text: String) -> ClipboardResult<()> {
        if self.fail {
            return Err(ClipboardError::Unavailable("headless".into()));
        }
        self.written.lock().expect("written").push(text);
        Ok(())
    }
}

struct Stubs {
    capture: Arc<StubCapture>,
    detector: Arc<StubDetector>,
    clipboard: Arc<StubClipboard>,
}

impl Stubs {
    fn new(capture: Result<(), ExitError>, detect: Result<Vec<String>, DetectionError>) -> Self {
        Self {
            capture: Arc::new(StubCapture {
                outcome: capture,
                calls: Mutex::default(),
            }),
            detector: Arc::new(StubDetector {
                outcome: detect,
                calls: Mutex::default(),
            }),
            clipboard: Arc::new(StubClipboard::default()),
        }
    }

    fn happy() -> Self {
        Self::new(Ok(()), Ok(vec!["Total: 42".into()]))
    }

    fn world(&self) -> World {
        World::new(
            self.capture.clone(),
            self.detector.clone(),
            self.clipboard.clone(),
        )
    }

    fn captures(&self) -> usize {
        self.capture.calls.lock().expect("calls").len()
    }

    fn detections(&self) -> usize {
        self.detector.calls.lock().expect("calls").len()
    }

    fn written(&self) -> Vec<String> {
        self.clipboard.written.lock().expect("written").clone()
    }
}

fn harness(stubs: &Stubs, policy: TriggerPolicy) -> TestHarness<AppState, AppAction> {
    harness_with(stubs, policy, StoreConfig::default())
}

fn harness_with(
    stubs: &Stubs,
    policy: TriggerPolicy,
    config: StoreConfig,
) -> TestHarness<AppState, AppAction> {
    TestHarness::with_config(
        AppState::new(SCRATCH.into()),
        app::reducer(),
        app::middleware(&stubs.world(), policy, ActionLoggerConfig::default()),
        config,
    )
}

#[tokio::test]
async fn test_happy_path_copies_recognized_text() {
    let stubs = Stubs::happy();
    let harness = harness(&stubs, TriggerPolicy::default());

    let actions = harness.dispatch_and_settle(AppAction::Trigger).await;

    let names: Vec<_> = actions.iter().map(Action::name).collect();
    assert_eq!(
        names,
        [
            "Trigger",
            "StartCapture",
            "CaptureSucceeded",
            "StartDetect",
            "DetectSucceeded",
            "SetText"
        ]
    );
    assert_eq!(stubs.written(), vec!["Total: 42".to_string()]);

    let state = harness.state();
    assert_eq!(
        state.capture,
        CaptureState {
            is_capturing: false,
            last_attempt: Some(Ok(SCRATCH.into())),
        }
    );
    assert_eq!(
        state.detection,
        DetectionState {
            is_detecting: false,
            last_attempt: Some(Ok(Detected {
                image: SCRATCH.into(),
                text: "Total: 42".into(),
            })),
        }
    );
    assert!(shell::succeeded(&state));
}

#[tokio::test]
async fn test_cancelled_capture_never_reaches_detection() {
    let stubs = Stubs::new(Err(ExitError::new(1)), Ok(vec!["unused".into()]));
    let harness = harness(&stubs, TriggerPolicy::default());

    let actions = harness.dispatch_and_settle(AppAction::Trigger).await;

    assert_emitted!(
        actions,
        AppAction::Capture(CaptureAction::CaptureFailed(ExitError { exit_code: 1 }))
    );
    assert_not_emitted!(actions, AppAction::Detection(_));
    assert_eq!(stubs.detections(), 0);

    let state = harness.state();
    assert_eq!(state.capture.failure(), Some(&ExitError::new(1)));
    assert_eq!(state.detection, DetectionState::default());
    assert!(stubs.written().is_empty());
}

#[tokio::test]
async fn test_unreadable_image_never_reaches_clipboard() {
    let stubs = Stubs::new(
        Ok(()),
        Err(DetectionError::UnreadableImage(SCRATCH.into())),
    );
    let harness = harness(&stubs, TriggerPolicy::default());

    let actions = harness.dispatch_and_settle(AppAction::Trigger).await;

    assert_not_emitted!(actions, AppAction::Clipboard(_));
    assert!(stubs.written().is_empty());
    assert_eq!(
        harness.state().detection.failure(),
        Some(&DetectionError::UnreadableImage(SCRATCH.into()))
    );
    assert!(!shell::succeeded(&harness.state()));
}

#[tokio::test]
async fn test_trigger_while_busy_is_ignored() {
    let stubs = Stubs::happy();
    let harness = harness(&stubs, TriggerPolicy::RejectWhileBusy);

    // the capture effect has not run yet, so the second trigger finds the
    // pipeline capturing
    harness.dispatch(AppAction::Trigger);
    assert!(harness.state().capture.is_capturing);
    harness.dispatch(AppAction::Trigger);
    harness.settled().await;

    let actions = harness.drain_emitted();
    assert_eq!(count_emitted!(actions, AppAction::Trigger), 2);
    assert_eq!(
        count_emitted!(actions, AppAction::Capture(CaptureAction::StartCapture(_))),
        1
    );
    assert_eq!(stubs.captures(), 1);
    assert_eq!(stubs.written().len(), 1);
}

#[tokio::test]
async fn test_overlap_policy_runs_both_chains() {
    let stubs = Stubs::happy();
    let harness = harness(&stubs, TriggerPolicy::AllowOverlap);

    harness.dispatch(AppAction::Trigger);
    harness.dispatch(AppAction::Trigger);
    harness.settled().await;

    assert_eq!(stubs.captures(), 2);
    assert_eq!(stubs.detections(), 2);
    assert_eq!(stubs.written().len(), 2);
    assert!(!harness.state().is_busy());
}

#[tokio::test]
async fn test_idle_pipeline_accepts_a_new_trigger() {
    let stubs = Stubs::happy();
    let harness = harness(&stubs, TriggerPolicy::RejectWhileBusy);

    harness.dispatch_and_settle(AppAction::Trigger).await;
    harness.dispatch_and_settle(AppAction::Trigger).await;

    assert_eq!(stubs.captures(), 2);
    assert_eq!(stubs.written(), vec!["Total: 42".to_string(); 2]);
}

#[tokio::test]
async fn test_chain_depth_limit_stops_the_pipeline() {
    let stubs = Stubs::happy();
    // Trigger (0) -> StartCapture (1) -> CaptureSucceeded (2) -> StartDetect (3)
    let harness = harness_with(
        &stubs,
        TriggerPolicy::default(),
        StoreConfig { max_chain_depth: 2 },
    );

    let actions = harness.dispatch_and_settle(AppAction::Trigger).await;

    assert_emitted!(actions, AppAction::Capture(CaptureAction::CaptureSucceeded(_)));
    assert_not_emitted!(actions, AppAction::Detection(DetectionAction::StartDetect(_)));
    assert_eq!(stubs.detections(), 0);
    assert_eq!(harness.state().detection, DetectionState::default());
}

#[tokio::test]
async fn test_clipboard_failure_leaves_state_successful() {
    let stubs = Stubs {
        clipboard: Arc::new(StubClipboard {
            fail: true,
            ..StubClipboard::default()
        }),
        ..Stubs::happy()
    };
    let harness = harness(&stubs, TriggerPolicy::default());

    let actions = harness.dispatch_and_settle(AppAction::Trigger).await;

    assert_emitted!(
        actions,
        AppAction::Clipboard(ClipboardAction::SetText(text)) if text == "Total: 42"
    );
    assert_eq!(actions.last().map(Action::name), Some("SetText"));
    assert_eq!(harness.state().detection.text(), Some("Total: 42"));
}

#[tokio::test]
async fn test_run_once_reports_the_outcome() {
    let settings = Settings {
        scratch_file: SCRATCH.into(),
        ..Settings::default()
    };

    let stubs = Stubs::happy();
    let store = app::build_store(&stubs.world(), &settings);
    assert!(shell::run_once(&store, false).await.expect("run"));

    let stubs = Stubs::new(Err(ExitError::new(1)), Ok(vec![]));
    let store = app::build_store(&stubs.world(), &settings);
    assert!(!shell::run_once(&store, true).await.expect("run"));
}
