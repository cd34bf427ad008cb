//! Reducers and reducer composition
//!
//! A reducer is a pure state transition: given the current state and an
//! action it updates the state and reports whether anything changed. It must
//! not perform side effects; those belong in [`Middleware`](crate::Middleware).
//!
//! Domain reducers are written against their own action and state types and
//! lifted into the application with [`lift`], then combined with [`merge`]:
//!
//! ```ignore
//! let reducer = merge(vec![
//!     lift(capture::reducer, CAPTURE_ACTION, CAPTURE_STATE).boxed(),
//!     lift(detection::reducer, DETECTION_ACTION, DETECTION_STATE).boxed(),
//! ]);
//! ```
//!
//! # Merge order
//!
//! [`Merged`] runs every member in insertion order against the same action.
//! Lifted reducers only fire on the action variant their prism extracts, and
//! no two domains may claim the same variant, so merge order is commutative
//! in practice. This is a construction-time invariant; it is not checked at
//! runtime.

use std::marker::PhantomData;

use crate::optics::{Lens, Prism};

/// A pure state transition.
///
/// Returns `true` if the state changed.
pub trait Reducer<S, A>: Send + Sync {
    fn reduce(&self, state: &mut S, action: &A) -> bool;

    /// Erase the reducer type.
    fn boxed(self) -> BoxReducer<S, A>
    where
        Self: Sized + 'static,
    {
        Box::new(self)
    }
}

/// A type-erased reducer.
pub type BoxReducer<S, A> = Box<dyn Reducer<S, A>>;

impl<S, A, F> Reducer<S, A> for F
where
    F: Fn(&mut S, &A) -> bool + Send + Sync,
{
    fn reduce(&self, state: &mut S, action: &A) -> bool {
        self(state, action)
    }
}

/// A child reducer running in the parent's action and state space.
///
/// Created by [`lift`].
pub struct Lifted<R, PS, PA, CS, CA> {
    reducer: R,
    action: Prism<PA, CA>,
    state: Lens<PS, CS>,
    _marker: PhantomData<fn() -> (PS, CS)>,
}

/// Lift a child reducer into the parent's action and state space.
///
/// The lifted reducer extracts the child action through `action`; if
/// extraction fails the parent state is left untouched and `false` is
/// returned. Otherwise the child state is read through `state`, reduced,
/// and written back.
pub fn lift<R, PS, PA, CS, CA>(
    reducer: R,
    action: Prism<PA, CA>,
    state: Lens<PS, CS>,
) -> Lifted<R, PS, PA, CS, CA>
where
    R: Reducer<CS, CA>,
{
    Lifted {
        reducer,
        action,
        state,
        _marker: PhantomData,
    }
}

impl<R, PS, PA, CS, CA> Reducer<PS, PA> for Lifted<R, PS, PA, CS, CA>
where
    R: Reducer<CS, CA>,
{
    fn reduce(&self, state: &mut PS, action: &PA) -> bool {
        let Some(child_action) = self.action.extract(action) else {
            return false;
        };
        self.state
            .modify(state, |child| self.reducer.reduce(child, &child_action))
    }
}

/// Several reducers applied in order to every action.
///
/// Created by [`merge`].
pub struct Merged<S, A> {
    reducers: Vec<BoxReducer<S, A>>,
}

/// Combine reducers so that each sees every action.
///
/// The result reports a change if any member did.
pub fn merge<S, A>(reducers: impl IntoIterator<Item = BoxReducer<S, A>>) -> Merged<S, A> {
    Merged {
        reducers: reducers.into_iter().collect(),
    }
}

impl<S, A> Merged<S, A> {
    /// Number of merged reducers.
    pub fn len(&self) -> usize {
        self.reducers.len()
    }

    /// Whether nothing has been merged.
    pub fn is_empty(&self) -> bool {
        self.reducers.is_empty()
    }
}

impl<S, A> Reducer<S, A> for Merged<S, A> {
    fn reduce(&self, state: &mut S, action: &A) -> bool {
        // every member runs; no short-circuit on the first change
        self.reducers
            .iter()
            .fold(false, |changed, r| r.reduce(state, action) | changed)
    }
}

impl<S, A> std::fmt::Debug for Merged<S, A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Merged")
            .field("reducers_count", &self.reducers.len())
            .finish()
    }
}
