//! Centralized state store with reducer and middleware pipeline
//!
//! The store owns the single authoritative state. Every action goes through
//! the same pipeline:
//!
//! 1. the reducer transitions a copy of the state, which then replaces the
//!    published snapshot
//! 2. the middleware chain runs against the new snapshot and returns an
//!    [`Effect`](crate::Effect)
//! 3. immediate actions from the effect are processed next, in order, within
//!    the same `dispatch` call; asynchronous parts are spawned and their
//!    actions re-enter the store when they complete
//!
//! State transitions are serialized: only one action is reduced at a time,
//! regardless of how many effects complete concurrently.
//!
//! # Chain depth
//!
//! Every action carries the depth of the chain that produced it: externally
//! dispatched actions have depth 0 and each action produced by an effect has
//! its parent's depth plus one. Actions past
//! [`StoreConfig::max_chain_depth`] are dropped with a warning, which bounds
//! middleware that keep feeding each other.
//!
//! # Example
//! ```ignore
//! let store = Store::new(AppState::default(), reducer, middleware);
//! store.dispatch(AppAction::Trigger);
//! store.settled().await;
//! assert!(store.state().detection.last_attempt.is_some());
//! ```

use std::collections::VecDeque;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError, Weak};

use futures::future::BoxFuture;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio_util::task::TaskTracker;

use crate::middleware::{GetState, Middleware, Next};
use crate::reducer::Reducer;
use crate::Action;

/// Default limit for [`StoreConfig::max_chain_depth`].
pub const DEFAULT_MAX_CHAIN_DEPTH: usize = 32;

/// Store tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreConfig {
    /// Longest allowed chain of effect-produced actions.
    pub max_chain_depth: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            max_chain_depth: DEFAULT_MAX_CHAIN_DEPTH,
        }
    }
}

/// Centralized state store.
///
/// Cloning a `Store` yields another handle to the same state.
pub struct Store<S, A> {
    inner: Arc<Inner<S, A>>,
}

struct Inner<S, A> {
    reducer: Box<dyn Reducer<S, A>>,
    middleware: Box<dyn Middleware<S, A>>,
    state: watch::Sender<Arc<S>>,
    get_state: GetState<S>,
    dispatch_lock: Mutex<()>,
    tasks: TaskTracker,
    config: StoreConfig,
}

impl<S, A> Clone for Store<S, A> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S, A> fmt::Debug for Store<S, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("config", &self.inner.config)
            .field("in_flight", &self.inner.tasks.len())
            .finish_non_exhaustive()
    }
}

impl<S, A> Store<S, A>
where
    S: Clone + Send + Sync + 'static,
    A: Action,
{
    /// Create a store with the default [`StoreConfig`].
    pub fn new(
        state: S,
        reducer: impl Reducer<S, A> + 'static,
        middleware: impl Middleware<S, A> + 'static,
    ) -> Self {
        Self::with_config(state, reducer, middleware, StoreConfig::default())
    }

    pub fn with_config(
        state: S,
        reducer: impl Reducer<S, A> + 'static,
        middleware: impl Middleware<S, A> + 'static,
        config: StoreConfig,
    ) -> Self {
        let (tx, rx) = watch::channel(Arc::new(state));
        let get_state = GetState::new(move || S::clone(&rx.borrow()));
        Self {
            inner: Arc::new(Inner {
                reducer: Box::new(reducer),
                middleware: Box::new(middleware),
                state: tx,
                get_state,
                dispatch_lock: Mutex::new(()),
                tasks: TaskTracker::new(),
                config,
            }),
        }
    }

    /// Dispatch an action from outside the pipeline.
    ///
    /// Returns once the action and every immediate action it produced have
    /// been processed. Asynchronous effects keep running on the Tokio
    /// runtime; see [`settled`](Self::settled).
    pub fn dispatch(&self, action: A) {
        self.inner.process(action, 0);
    }

    /// The current state snapshot.
    pub fn state(&self) -> Arc<S> {
        Arc::clone(&self.inner.state.borrow())
    }

    /// Watch state snapshots; the receiver is notified on every change.
    pub fn subscribe(&self) -> watch::Receiver<Arc<S>> {
        self.inner.state.subscribe()
    }

    /// State snapshots as a stream, starting with the current one.
    #[cfg(feature = "subscriptions")]
    pub fn states(&self) -> tokio_stream::wrappers::WatchStream<Arc<S>> {
        tokio_stream::wrappers::WatchStream::new(self.subscribe())
    }

    /// Number of asynchronous effects still running.
    pub fn in_flight(&self) -> usize {
        self.inner.tasks.len()
    }

    /// The tuning this store was built with.
    pub fn config(&self) -> StoreConfig {
        self.inner.config
    }

    /// Wait until no asynchronous effect is running.
    ///
    /// Effects spawned by effects are waited for too, so on return every
    /// chain started so far has run to completion.
    pub async fn settled(&self) {
        let tasks = &self.inner.tasks;
        while !tasks.is_empty() {
            tasks.close();
            tasks.wait().await;
            tasks.reopen();
        }
    }
}

impl<S, A> Inner<S, A>
where
    S: Clone + Send + Sync + 'static,
    A: Action,
{
    fn process(self: &Arc<Self>, action: A, depth: usize) {
        let mut queue = VecDeque::from([(action, depth)]);
        let _guard = self
            .dispatch_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        while let Some((action, depth)) = queue.pop_front() {
            if depth > self.config.max_chain_depth {
                tracing::warn!(
                    action = %action.name(),
                    depth,
                    max_chain_depth = self.config.max_chain_depth,
                    "chain depth exceeded; dropping action"
                );
                continue;
            }

            let mut next = S::clone(&self.state.borrow());
            let changed = self.reducer.reduce(&mut next, &action);
            if changed {
                self.state.send_replace(Arc::new(next));
            }
            tracing::trace!(action = %action.name(), depth, changed, "action reduced");

            let effect = self
                .middleware
                .handle(&action, &self.get_state, Next::end());
            let (immediate, pending) = effect.into_parts();
            queue.extend(immediate.into_iter().map(|produced| (produced, depth + 1)));
            for task in pending {
                self.spawn(task, depth + 1);
            }
        }
    }

    fn spawn(self: &Arc<Self>, task: BoxFuture<'static, Vec<A>>, depth: usize) {
        let Ok(handle) = Handle::try_current() else {
            tracing::error!(depth, "no Tokio runtime; dropping asynchronous effect");
            return;
        };
        let store: Weak<Self> = Arc::downgrade(self);
        self.tasks.spawn_on(
            async move {
                let actions = task.await;
                // the store may be gone by the time the effect completes
                let Some(store) = store.upgrade() else {
                    return;
                };
                for action in actions {
                    store.process(action, depth);
                }
            },
            &handle,
        );
    }
}
