use std::io;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The capture tool terminated abnormally or the user cancelled the selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("capture process exited with status {exit_code}")]
pub struct ExitError {
    pub exit_code: i32,
}

impl ExitError {
    /// Exit code reported when the process was killed by a signal.
    pub const SIGNALED: i32 = -1;
    /// Exit code reported when the capture program could not be started.
    pub const NOT_LAUNCHED: i32 = 127;

    pub fn new(exit_code: i32) -> Self {
        Self { exit_code }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(rename_all = "snake_case")]
pub enum DetectionError {
    #[error("could not decode image at {}", .0.display())]
    UnreadableImage(PathBuf),
    #[error("image at {} is not in a pixel format the recognizer accepts", .0.display())]
    UnsupportedImageFormat(PathBuf),
    #[error("text recognition could not be scheduled: {0}")]
    RecognitionSchedulingFailed(String),
    #[error("text recognition failed: {0}")]
    RecognitionResultFailed(String),
    #[error("recognizer returned no text regions")]
    NoTextRegionsReturned,
}

/// Failure reported by a [`TextRecognizer`](crate::detection::TextRecognizer).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecognizeError {
    #[error("request could not be scheduled: {0}")]
    Scheduling(String),
    #[error("recognizer failed: {0}")]
    Result(String),
    /// The recognizer answered, but not with a list of text regions.
    #[error("result holds no text observations")]
    NoTextObservations,
}

impl From<RecognizeError> for DetectionError {
    fn from(err: RecognizeError) -> Self {
        match err {
            RecognizeError::Scheduling(cause) => DetectionError::RecognitionSchedulingFailed(cause),
            RecognizeError::Result(cause) => DetectionError::RecognitionResultFailed(cause),
            RecognizeError::NoTextObservations => DetectionError::NoTextRegionsReturned,
        }
    }
}

#[derive(Debug, Error)]
pub enum ClipboardError {
    #[error("clipboard is unavailable: {0}")]
    Unavailable(String),
    #[error("failed to set clipboard text: {0}")]
    Write(String),
    #[error("clipboard worker stopped: {0}")]
    Worker(String),
}

pub type ClipboardResult<T> = std::result::Result<T, ClipboardError>;

/// Startup failures of the binary.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("failed to read settings {}: {source}", .path.display())]
    ReadSettings {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse settings {}: {source}", .path.display())]
    ParseSettings {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

pub type AppResult<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recognize_errors_map_onto_detection_errors() {
        assert_eq!(
            DetectionError::from(RecognizeError::Scheduling("busy".into())),
            DetectionError::RecognitionSchedulingFailed("busy".into())
        );
        assert_eq!(
            DetectionError::from(RecognizeError::Result("model".into())),
            DetectionError::RecognitionResultFailed("model".into())
        );
        assert_eq!(
            DetectionError::from(RecognizeError::NoTextObservations),
            DetectionError::NoTextRegionsReturned
        );
    }

    #[test]
    fn test_detection_error_serializes_with_snake_case_tags() {
        let json = serde_json::to_string(&DetectionError::UnreadableImage("/tmp/ocr.png".into()))
            .expect("serialize");
        assert_eq!(json, r#"{"unreadable_image":"/tmp/ocr.png"}"#);

        let json = serde_json::to_string(&DetectionError::NoTextRegionsReturned).expect("serialize");
        assert_eq!(json, r#""no_text_regions_returned""#);
    }

    #[test]
    fn test_exit_error_message_names_status() {
        assert_eq!(
            ExitError::new(1).to_string(),
            "capture process exited with status 1"
        );
    }
}
