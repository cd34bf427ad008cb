use std::fmt;
use std::sync::Arc;

use crate::capture::{CommandCapture, ScreenCapture};
use crate::clipboard::{ClipboardWriter, SystemClipboard};
use crate::config::Settings;
use crate::detection::{ImageDetector, TextDetector};
use crate::recognizer::TesseractRecognizer;

/// The capabilities injected into the domain middleware.
///
/// Built once at startup and handed to [`crate::app::build_store`]; tests
/// substitute their own implementations.
#[derive(Clone)]
pub struct World {
    pub capture: Arc<dyn ScreenCapture>,
    pub detection: Arc<dyn TextDetector>,
    pub clipboard: Arc<dyn ClipboardWriter>,
}

impl World {
    pub fn new(
        capture: Arc<dyn ScreenCapture>,
        detection: Arc<dyn TextDetector>,
        clipboard: Arc<dyn ClipboardWriter>,
    ) -> Self {
        Self {
            capture,
            detection,
            clipboard,
        }
    }

    /// External capture tool, Tesseract and the system clipboard.
    pub fn live(settings: &Settings) -> Self {
        let recognizer = TesseractRecognizer::new(
            settings.recognizer_program.clone(),
            settings.recognizer_args.clone(),
        );
        Self::new(
            Arc::new(CommandCapture::new(
                settings.capture_program.clone(),
                settings.capture_args.clone(),
            )),
            Arc::new(ImageDetector::new(Arc::new(recognizer))),
            Arc::new(SystemClipboard),
        )
    }
}

impl fmt::Debug for World {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("World").finish_non_exhaustive()
    }
}
