//! Settings file and command line.
//!
//! Settings are read from `<config dir>/ocr-rex/settings.json` unless
//! `--config` names another file. Every field is optional in the file;
//! command-line flags override whatever the file says.

use std::fs;
use std::path::{Path, PathBuf};

use clap::Parser;
use rex_dispatch::DEFAULT_MAX_CHAIN_DEPTH;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::orchestrator::TriggerPolicy;

const APP_DIR: &str = "ocr-rex";
const SETTINGS_FILE: &str = "settings.json";
const SCRATCH_FILE: &str = "ocr.png";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Image the capture tool writes and detection reads, reused every run.
    pub scratch_file: PathBuf,
    /// The scratch path is appended after these arguments.
    pub capture_program: String,
    pub capture_args: Vec<String>,
    pub recognizer_program: String,
    /// Passed between `stdin stdout` and `tsv`.
    pub recognizer_args: Vec<String>,
    pub max_chain_depth: usize,
    pub trigger_policy: TriggerPolicy,
    /// Comma separated glob patterns of action names to log.
    pub log_actions: Option<String>,
    pub log_actions_exclude: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            scratch_file: std::env::temp_dir().join(SCRATCH_FILE),
            capture_program: "screencapture".into(),
            capture_args: vec!["-i".into(), "-r".into()],
            recognizer_program: "tesseract".into(),
            recognizer_args: vec!["-l".into(), "eng".into()],
            max_chain_depth: DEFAULT_MAX_CHAIN_DEPTH,
            trigger_policy: TriggerPolicy::default(),
            log_actions: None,
            log_actions_exclude: None,
        }
    }
}

pub fn default_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join(SETTINGS_FILE))
}

/// Load settings from `path`, or from [`default_path`] when `None`.
///
/// A missing file at the default location yields the defaults; a missing
/// file that was asked for explicitly is an error.
pub fn load_settings(path: Option<&Path>) -> AppResult<Settings> {
    match path {
        Some(path) => read_settings(path),
        None => match default_path() {
            Some(path) if path.is_file() => read_settings(&path),
            _ => Ok(Settings::default()),
        },
    }
}

fn read_settings(path: &Path) -> AppResult<Settings> {
    let raw = fs::read_to_string(path).map_err(|source| AppError::ReadSettings {
        path: path.to_path_buf(),
        source,
    })?;
    let settings = serde_json::from_str(&raw).map_err(|source| AppError::ParseSettings {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(path = %path.display(), "settings loaded");
    Ok(settings)
}

/// Capture a screen region, recognize its text and copy it to the clipboard
#[derive(Parser, Debug)]
#[command(name = "ocr-rex", version)]
pub struct Args {
    /// Settings file (default: <config dir>/ocr-rex/settings.json)
    #[arg(long, short)]
    pub config: Option<PathBuf>,

    /// Scratch image path
    #[arg(long)]
    pub scratch_file: Option<PathBuf>,

    /// Accept a trigger while a previous run is still in flight
    #[arg(long)]
    pub allow_overlap: bool,

    /// Longest allowed chain of effect-produced actions
    #[arg(long)]
    pub max_chain_depth: Option<usize>,

    /// Run the pipeline once and exit; non-zero status if a stage failed
    #[arg(long)]
    pub once: bool,

    /// Print state snapshots as JSON
    #[arg(long)]
    pub json: bool,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, default_value = "info")]
    pub log: String,

    /// Action names to log, comma separated globs (e.g. "Start*,Detect*")
    #[arg(long)]
    pub log_actions: Option<String>,
}

impl Args {
    /// Apply command-line overrides on top of `settings`.
    pub fn apply(&self, mut settings: Settings) -> Settings {
        if let Some(path) = &self.scratch_file {
            settings.scratch_file = path.clone();
        }
        if self.allow_overlap {
            settings.trigger_policy = TriggerPolicy::AllowOverlap;
        }
        if let Some(depth) = self.max_chain_depth {
            settings.max_chain_depth = depth;
        }
        if let Some(patterns) = &self.log_actions {
            settings.log_actions = Some(patterns.clone());
        }
        settings
    }
}
