//! Detection domain: recognize the text in a captured image.
//!
//! The state machine mirrors capture:
//! `idle -> detecting -> {succeeded(path, text) | failed(error)}`.
//!
//! The live detector decodes the image with the `image` crate, converts it to
//! RGBA8 and hands it to a [`TextRecognizer`]. Every recognized region
//! contributes its top-ranked candidate; the middleware joins them with a
//! single space, in detection order.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use image::{DynamicImage, ImageError, ImageReader, RgbaImage};
use rex_dispatch::{attempt, on_action, Action, Effect, GetState, Middleware};
use serde::{Deserialize, Serialize};

use crate::error::{DetectionError, RecognizeError};

#[derive(Action, Clone, Debug, PartialEq)]
pub enum DetectionAction {
    StartDetect(PathBuf),
    DetectSucceeded { image: PathBuf, text: String },
    DetectFailed(DetectionError),
}

/// Text recognized in an image.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Detected {
    pub image: PathBuf,
    pub text: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DetectionState {
    pub is_detecting: bool,
    #[serde(with = "crate::encoding", default)]
    pub last_attempt: Option<Result<Detected, DetectionError>>,
}

impl DetectionState {
    pub fn failure(&self) -> Option<&DetectionError> {
        self.last_attempt.as_ref().and_then(|attempt| attempt.as_ref().err())
    }

    pub fn text(&self) -> Option<&str> {
        match &self.last_attempt {
            Some(Ok(detected)) => Some(&detected.text),
            _ => None,
        }
    }
}

pub fn reducer(state: &mut DetectionState, action: &DetectionAction) -> bool {
    let next = match action {
        DetectionAction::StartDetect(_) => DetectionState {
            is_detecting: true,
            last_attempt: None,
        },
        DetectionAction::DetectSucceeded { image, text } => DetectionState {
            is_detecting: false,
            last_attempt: Some(Ok(Detected {
                image: image.clone(),
                text: text.clone(),
            })),
        },
        DetectionAction::DetectFailed(err) => DetectionState {
            is_detecting: false,
            last_attempt: Some(Err(err.clone())),
        },
    };
    let changed = *state != next;
    *state = next;
    changed
}

/// Returns the top candidate string of every text region, in detection order.
#[async_trait]
pub trait TextDetector: Send + Sync {
    async fn detect(&self, image: &Path) -> Result<Vec<String>, DetectionError>;
}

pub fn middleware(
    detector: Arc<dyn TextDetector>,
) -> impl Middleware<DetectionState, DetectionAction> {
    on_action(
        move |action: &DetectionAction, _state: &GetState<DetectionState>| match action {
            DetectionAction::StartDetect(image) => {
                tracing::info!(image = %image.display(), "detection started");
                let detector = Arc::clone(&detector);
                let image = image.clone();
                attempt(async move {
                    let texts = detector.detect(&image).await?;
                    Ok::<_, DetectionError>(DetectionAction::DetectSucceeded {
                        text: texts.join(" "),
                        image,
                    })
                })
                .catch(|err| {
                    tracing::info!(%err, "detection failed");
                    DetectionAction::DetectFailed(err)
                })
            }
            DetectionAction::DetectSucceeded { text, .. } => {
                tracing::info!(chars = text.chars().count(), "detection finished");
                Effect::none()
            }
            DetectionAction::DetectFailed(_) => Effect::none(),
        },
    )
}

/// A recognized candidate string for one region.
#[derive(Clone, Debug, PartialEq)]
pub struct Candidate {
    pub text: String,
    pub confidence: f32,
}

/// One text region; candidates are ordered best first.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TextRegion {
    pub candidates: Vec<Candidate>,
}

impl TextRegion {
    pub fn single(text: impl Into<String>, confidence: f32) -> Self {
        Self {
            candidates: vec![Candidate {
                text: text.into(),
                confidence,
            }],
        }
    }

    pub fn top_candidate(&self) -> Option<&str> {
        self.candidates.first().map(|c| c.text.as_str())
    }
}

/// OCR engine over a decoded RGBA8 image. Called on a blocking thread.
pub trait TextRecognizer: Send + Sync {
    fn recognize(&self, image: &RgbaImage) -> Result<Vec<TextRegion>, RecognizeError>;
}

/// Live detector: decode, convert, recognize.
pub struct ImageDetector {
    recognizer: Arc<dyn TextRecognizer>,
}

impl ImageDetector {
    pub fn new(recognizer: Arc<dyn TextRecognizer>) -> Self {
        Self { recognizer }
    }
}

#[async_trait]
impl TextDetector for ImageDetector {
    async fn detect(&self, image: &Path) -> Result<Vec<String>, DetectionError> {
        let recognizer = Arc::clone(&self.recognizer);
        let path = image.to_path_buf();
        tokio::task::spawn_blocking(move || detect_blocking(recognizer.as_ref(), &path))
            .await
            .map_err(|err| DetectionError::RecognitionSchedulingFailed(err.to_string()))?
    }
}

/// Synchronous detection pipeline behind [`ImageDetector`].
pub fn detect_blocking(
    recognizer: &dyn TextRecognizer,
    path: &Path,
) -> Result<Vec<String>, DetectionError> {
    let image = load_rgba(path)?;
    let regions = recognizer.recognize(&image)?;
    top_candidates(&regions)
}

/// Decode the file at `path` into the recognizer's pixel format.
pub fn load_rgba(path: &Path) -> Result<RgbaImage, DetectionError> {
    let unreadable = || DetectionError::UnreadableImage(path.to_path_buf());

    let reader = ImageReader::open(path)
        .and_then(|reader| reader.with_guessed_format())
        .map_err(|_| unreadable())?;
    // neither the content nor the extension names an image format
    if reader.format().is_none() {
        return Err(unreadable());
    }
    let decoded = reader.decode().map_err(|err| match err {
        ImageError::Unsupported(_) => DetectionError::UnsupportedImageFormat(path.to_path_buf()),
        _ => unreadable(),
    })?;

    to_rgba(decoded, path)
}

/// Convert a decoded image; an image without pixels cannot be recognized.
pub fn to_rgba(decoded: DynamicImage, path: &Path) -> Result<RgbaImage, DetectionError> {
    if decoded.width() == 0 || decoded.height() == 0 {
        return Err(DetectionError::UnsupportedImageFormat(path.to_path_buf()));
    }
    Ok(decoded.into_rgba8())
}

/// Pick the top candidate per region, discarding alternates.
///
/// Regions without any candidate are skipped; if nothing is left the
/// result is [`DetectionError::NoTextRegionsReturned`].
pub fn top_candidates(regions: &[TextRegion]) -> Result<Vec<String>, DetectionError> {
    let texts: Vec<String> = regions
        .iter()
        .filter_map(TextRegion::top_candidate)
        .map(String::from)
        .collect();
    if texts.is_empty() {
        return Err(DetectionError::NoTextRegionsReturned);
    }
    Ok(texts)
}
