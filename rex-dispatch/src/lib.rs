//! rex-dispatch: Redux-style state management with async effects
//!
//! All state lives in one store and changes only through dispatched actions.
//! Reducers are pure; middleware turns actions into effects, whose results
//! are dispatched back. Domain modules are written against their own action
//! and state types and lifted into the application through prisms and lenses.
//!
//! # Example
//! ```ignore
//! use rex_dispatch::prelude::*;
//!
//! #[derive(Action, Clone, Debug)]
//! enum AppAction {
//!     Trigger,
//!     #[action(lift)]
//!     Capture(CaptureAction),
//! }
//!
//! let reducer = reducer::merge([
//!     reducer::lift(capture::reducer, CAPTURE_ACTION, CAPTURE_STATE).boxed(),
//! ]);
//! let store = Store::new(AppState::default(), reducer, middleware);
//! store.dispatch(AppAction::Trigger);
//! ```

// Re-export everything from core
pub use rex_dispatch_core::*;

// Re-export derive macros
pub use rex_dispatch_macros::Action;

/// Prelude for convenient imports
pub mod prelude {
    pub use rex_dispatch_core::prelude::*;

    // Derive macros
    pub use rex_dispatch_macros::Action;
}
