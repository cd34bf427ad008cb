//! Action trait for type-safe state mutations

use std::fmt::Debug;

/// Marker trait for actions that can be dispatched to the store
///
/// Actions represent events to be processed by the store. They should be:
/// - Clone: Actions are handed to every reducer and middleware in a chain
/// - Debug: For debugging and logging
/// - Send + 'static: Effects produce actions on other tasks
///
/// Use `#[derive(Action)]` from `rex-dispatch-macros` to auto-implement this trait.
pub trait Action: Clone + Debug + Send + Sync + 'static {
    /// Get the action name for logging and filtering
    ///
    /// For nested action enums this is the name of the innermost variant,
    /// e.g. `StartCapture` rather than `Capture`.
    fn name(&self) -> &'static str;
}

/// Category of an action, usually the domain a nested action belongs to.
///
/// Generated by `#[derive(Action)]` for variants carrying `#[action(lift)]`
/// or `#[action(category = "...")]`.
pub trait ActionCategory: Action {
    /// The category name, or `None` for uncategorized (root-level) actions.
    fn category(&self) -> Option<&'static str>;
}

/// Concise action rendering for logs.
///
/// The default uses `Debug`; override it for actions carrying large payloads.
pub trait ActionSummary: Action {
    fn summary(&self) -> String {
        format!("{:?}", self)
    }
}
