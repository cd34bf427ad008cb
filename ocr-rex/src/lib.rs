//! ocr-rex: capture a screen region, recognize its text, copy it.
//!
//! Each stage is a domain module with its own action, state, reducer and
//! middleware over an injected capability. [`app`] lifts the domains into
//! one store and [`orchestrator`] sequences them:
//!
//! ```text
//! Trigger -> StartCapture -> CaptureSucceeded -> StartDetect
//!         -> DetectSucceeded -> SetText
//! ```

pub mod app;
pub mod capture;
pub mod clipboard;
pub mod config;
pub mod detection;
pub mod encoding;
pub mod error;
pub mod orchestrator;
pub mod recognizer;
pub mod shell;
pub mod world;

pub use app::{build_store, AppAction, AppState, AppStore};
pub use config::{load_settings, Args, Settings};
pub use orchestrator::TriggerPolicy;
pub use world::World;
