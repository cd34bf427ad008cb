//! Core traits and types for rex-dispatch
//!
//! This crate provides the building blocks for applications built around a
//! single state, a pure reducer and a middleware chain producing effects,
//! following a Redux/Elm-inspired architecture.
//!
//! # Core Concepts
//!
//! - **Action**: Events that describe state changes
//! - **Reducer**: Pure state transition, see [`reducer`]
//! - **Middleware**: Side-effect producing logic, see [`middleware`]
//! - **Effect**: Follow-up work returned by middleware, see [`effect`]
//! - **Store**: Serialized dispatch loop tying it all together
//! - **Lens / Prism**: Projections used to lift domain modules into the app
//!
//! # Basic Example
//!
//! ```ignore
//! use rex_dispatch_core::prelude::*;
//!
//! #[derive(Action, Clone, Debug)]
//! enum MyAction {
//!     Increment,
//!     IncrementLater,
//! }
//!
//! fn reducer(state: &mut i32, action: &MyAction) -> bool {
//!     match action {
//!         MyAction::Increment => { *state += 1; true }
//!         MyAction::IncrementLater => false,
//!     }
//! }
//!
//! let later = on_action(|action: &MyAction, _: &GetState<i32>| match action {
//!     MyAction::IncrementLater => Effect::future(async { MyAction::Increment }),
//!     _ => Effect::none(),
//! });
//!
//! let store = Store::new(0, reducer, later);
//! store.dispatch(MyAction::IncrementLater);
//! store.settled().await;
//! assert_eq!(*store.state(), 1);
//! ```
//!
//! # Async Pattern
//!
//! Capability calls use a two-phase action pattern:
//!
//! 1. **Intent actions** trigger async work (e.g., `StartCapture`)
//! 2. **Result actions** carry the outcome back (e.g., `CaptureSucceeded`,
//!    `CaptureFailed`)
//!
//! The middleware handling the intent returns an effect built with
//! [`attempt`], mapping both arms into result actions. The reducer records
//! the outcome and an orchestrating middleware decides what comes next.

pub mod action;
pub mod effect;
pub mod logger;
pub mod middleware;
pub mod optics;
pub mod reducer;
pub mod store;
pub mod testing;

// Core trait exports
pub use action::{Action, ActionCategory, ActionSummary};

// Composition exports
pub use optics::{Lens, Prism};
pub use reducer::{BoxReducer, Reducer};

// Middleware exports
pub use middleware::{on_action, BoxMiddleware, GetState, Middleware, Next, NoopMiddleware};

// Effect exports
pub use effect::{attempt, Attempt, Effect};

// Store exports
pub use store::{Store, StoreConfig, DEFAULT_MAX_CHAIN_DEPTH};

// Logging exports
pub use logger::{ActionLoggerConfig, ActionLoggerMiddleware};

// Testing exports
pub use testing::{ActionRecorder, TestHarness};

/// Prelude module for convenient imports
///
/// `lift` and `merge` exist for both reducers and middleware, so they are
/// reached through their modules: `reducer::lift`, `middleware::merge`.
pub mod prelude {
    pub use crate::action::{Action, ActionCategory, ActionSummary};
    pub use crate::effect::{attempt, Attempt, Effect};
    pub use crate::logger::{ActionLoggerConfig, ActionLoggerMiddleware};
    pub use crate::middleware::{
        self, on_action, BoxMiddleware, GetState, Middleware, Next, NoopMiddleware,
    };
    pub use crate::optics::{Lens, Prism};
    pub use crate::reducer::{self, BoxReducer, Reducer};
    pub use crate::store::{Store, StoreConfig};
}
