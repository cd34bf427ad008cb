//! Middleware: side-effect producing logic run after the reducer
//!
//! Every dispatched action first goes through the reducer, then through the
//! middleware chain. A middleware receives the action, a read-only
//! [`GetState`] accessor bound to the post-reducer state, and a [`Next`]
//! handle for the rest of the chain. It returns an [`Effect`].
//!
//! Most middleware never intercepts anything and is best written with
//! [`on_action`], which always forwards to `next` and merges the effects:
//!
//! ```ignore
//! let clipboard = on_action(|action: &ClipboardAction, _state: &GetState<()>| match action {
//!     ClipboardAction::SetText(text) => write_clipboard(text.clone()),
//! });
//! ```
//!
//! Domain middleware is lifted into the application exactly like reducers,
//! through a [`Prism`] for actions and a [`Lens`] for state.

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::effect::Effect;
use crate::optics::{Lens, Prism};

/// Read-only access to the latest state.
///
/// Effects may hold on to a `GetState` and call [`get`](Self::get) after an
/// `await`; they always observe the most recently published snapshot, never
/// a mutable handle.
pub struct GetState<S> {
    read: Arc<dyn Fn() -> S + Send + Sync>,
}

impl<S> Clone for GetState<S> {
    fn clone(&self) -> Self {
        Self {
            read: Arc::clone(&self.read),
        }
    }
}

impl<S> fmt::Debug for GetState<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GetState")
            .field("state", &std::any::type_name::<S>())
            .finish()
    }
}

impl<S: 'static> GetState<S> {
    /// Build an accessor from a snapshot function.
    pub fn new(read: impl Fn() -> S + Send + Sync + 'static) -> Self {
        Self {
            read: Arc::new(read),
        }
    }

    /// An accessor that always returns `state`.
    pub fn constant(state: S) -> Self
    where
        S: Clone + Send + Sync,
    {
        Self::new(move || state.clone())
    }

    /// Read the current state.
    #[inline]
    pub fn get(&self) -> S {
        (self.read)()
    }

    /// Focus the accessor on a child state.
    pub fn project<C: 'static>(&self, lens: Lens<S, C>) -> GetState<C> {
        let parent = self.clone();
        GetState::new(move || lens.get(&parent.get()))
    }
}

/// Logic run for every processed action.
pub trait Middleware<S, A>: Send + Sync {
    /// Handle `action` and return follow-up work.
    ///
    /// Call `next.run(action, state)` to continue the chain; not calling it
    /// stops the action from reaching the remaining middleware.
    fn handle(&self, action: &A, state: &GetState<S>, next: Next<'_, S, A>) -> Effect<A>;

    /// Erase the middleware type.
    fn boxed(self) -> BoxMiddleware<S, A>
    where
        Self: Sized + 'static,
    {
        Box::new(self)
    }
}

/// A type-erased middleware.
pub type BoxMiddleware<S, A> = Box<dyn Middleware<S, A>>;

/// The remainder of a middleware chain.
pub struct Next<'a, S, A> {
    chain: &'a [BoxMiddleware<S, A>],
}

impl<'a, S, A: Send + 'static> Next<'a, S, A> {
    /// The empty chain.
    pub fn end() -> Self {
        Self { chain: &[] }
    }

    /// A chain over the given middleware, run in order.
    pub fn new(chain: &'a [BoxMiddleware<S, A>]) -> Self {
        Self { chain }
    }

    /// Forward the action to the remaining middleware.
    pub fn run(self, action: &A, state: &GetState<S>) -> Effect<A> {
        match self.chain.split_first() {
            Some((head, rest)) => head.handle(action, state, Next { chain: rest }),
            None => Effect::none(),
        }
    }
}

/// Middleware built from a closure. See [`on_action`].
pub struct OnAction<F> {
    f: F,
}

/// Build a middleware from `(action, state) -> Effect`.
///
/// The resulting middleware always forwards the action down the chain and
/// merges its own effect with the downstream effect.
pub fn on_action<S, A, F>(f: F) -> OnAction<F>
where
    F: Fn(&A, &GetState<S>) -> Effect<A> + Send + Sync,
{
    OnAction { f }
}

impl<S, A, F> Middleware<S, A> for OnAction<F>
where
    A: Send + 'static,
    F: Fn(&A, &GetState<S>) -> Effect<A> + Send + Sync,
{
    fn handle(&self, action: &A, state: &GetState<S>, next: Next<'_, S, A>) -> Effect<A> {
        (self.f)(action, state).merge(next.run(action, state))
    }
}

/// A child middleware running in the parent's action and state space.
///
/// Created by [`lift`].
pub struct Lifted<M, PS, PA, CS, CA> {
    middleware: M,
    action: Prism<PA, CA>,
    state: Lens<PS, CS>,
    _marker: PhantomData<fn() -> (PS, CS)>,
}

/// Lift a child middleware into the parent's action and state space.
///
/// The child runs only when `action` extracts a child action; it sees the
/// child state through `state` and its produced actions are embedded back
/// into the parent union. The parent chain always continues.
pub fn lift<M, PS, PA, CS, CA>(
    middleware: M,
    action: Prism<PA, CA>,
    state: Lens<PS, CS>,
) -> Lifted<M, PS, PA, CS, CA>
where
    M: Middleware<CS, CA>,
{
    Lifted {
        middleware,
        action,
        state,
        _marker: PhantomData,
    }
}

impl<M, PS, PA, CS, CA> Middleware<PS, PA> for Lifted<M, PS, PA, CS, CA>
where
    M: Middleware<CS, CA>,
    PS: 'static,
    CS: 'static,
    PA: Send + 'static,
    CA: Send + 'static,
{
    fn handle(&self, action: &PA, state: &GetState<PS>, next: Next<'_, PS, PA>) -> Effect<PA> {
        let own = match self.action.extract(action) {
            Some(child) => {
                let child_state = state.project(self.state);
                let prism = self.action;
                self.middleware
                    .handle(&child, &child_state, Next::end())
                    .map(move |produced| prism.embed(produced))
            }
            None => Effect::none(),
        };
        own.merge(next.run(action, state))
    }
}

/// Several middleware run as one nested chain.
///
/// Created by [`merge`]. Members run in insertion order; after the nested
/// chain, the outer chain continues regardless of whether a member stopped
/// forwarding.
pub struct Merged<S, A> {
    chain: Vec<BoxMiddleware<S, A>>,
}

/// Combine middleware into a single chain.
pub fn merge<S, A>(middlewares: impl IntoIterator<Item = BoxMiddleware<S, A>>) -> Merged<S, A> {
    Merged {
        chain: middlewares.into_iter().collect(),
    }
}

impl<S, A> Merged<S, A> {
    /// Number of merged middleware.
    pub fn len(&self) -> usize {
        self.chain.len()
    }

    /// Whether nothing has been merged.
    pub fn is_empty(&self) -> bool {
        self.chain.is_empty()
    }
}

impl<S, A> fmt::Debug for Merged<S, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Merged")
            .field("middlewares_count", &self.chain.len())
            .finish()
    }
}

impl<S, A: Send + 'static> Middleware<S, A> for Merged<S, A> {
    fn handle(&self, action: &A, state: &GetState<S>, next: Next<'_, S, A>) -> Effect<A> {
        Next::new(&self.chain)
            .run(action, state)
            .merge(next.run(action, state))
    }
}

/// A middleware that does nothing but forward.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopMiddleware;

impl<S, A: Send + 'static> Middleware<S, A> for NoopMiddleware {
    fn handle(&self, action: &A, state: &GetState<S>, next: Next<'_, S, A>) -> Effect<A> {
        next.run(action, state)
    }
}
