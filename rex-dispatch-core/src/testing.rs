//! Test utilities for rex-dispatch applications
//!
//! - [`ActionRecorder`]: middleware that records every processed action
//! - [`TestHarness`]: a store wrapped with a recorder, with settle helpers
//! - Assertion macros for verifying processed actions
//!
//! # Example
//!
//! ```ignore
//! use rex_dispatch::testing::{assert_emitted, TestHarness};
//!
//! let harness = TestHarness::new(AppState::default(), app_reducer(), app_middleware(world));
//! let recorded = harness.dispatch_and_settle(AppAction::Trigger).await;
//! assert_emitted!(recorded, AppAction::Capture(CaptureAction::CaptureSucceeded(_)));
//! ```

use std::sync::{Arc, Mutex, PoisonError};

use crate::effect::Effect;
use crate::middleware::{merge, GetState, Middleware, Next};
use crate::reducer::Reducer;
use crate::store::{Store, StoreConfig};
use crate::{Action, ActionCategory};

/// Middleware that records every action it sees, in processing order.
#[derive(Debug)]
pub struct ActionRecorder<A> {
    actions: Arc<Mutex<Vec<A>>>,
}

impl<A> Clone for ActionRecorder<A> {
    fn clone(&self) -> Self {
        Self {
            actions: Arc::clone(&self.actions),
        }
    }
}

impl<A> Default for ActionRecorder<A> {
    fn default() -> Self {
        Self {
            actions: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl<A: Clone> ActionRecorder<A> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything recorded so far.
    pub fn actions(&self) -> Vec<A> {
        self.lock().clone()
    }

    /// Take everything recorded so far.
    pub fn drain(&self) -> Vec<A> {
        std::mem::take(&mut *self.lock())
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<A>> {
        self.actions.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<S, A: Action> Middleware<S, A> for ActionRecorder<A> {
    fn handle(&self, action: &A, state: &GetState<S>, next: Next<'_, S, A>) -> Effect<A> {
        self.lock().push(action.clone());
        next.run(action, state)
    }
}

/// A store with an [`ActionRecorder`] in front of its middleware.
///
/// # Example
///
/// ```ignore
/// let harness = TestHarness::new(Counter::default(), reducer, NoopMiddleware);
/// harness.dispatch(CounterAction::Add(1));
/// assert_eq!(harness.state().total, 1);
/// ```
pub struct TestHarness<S, A> {
    store: Store<S, A>,
    recorder: ActionRecorder<A>,
}

impl<S, A> TestHarness<S, A>
where
    S: Clone + Send + Sync + 'static,
    A: Action,
{
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
        let recorder = ActionRecorder::new();
        let chain = merge([recorder.clone().boxed(), middleware.boxed()]);
        Self {
            store: Store::with_config(state, reducer, chain, config),
            recorder,
        }
    }

    pub fn store(&self) -> &Store<S, A> {
        &self.store
    }

    pub fn state(&self) -> Arc<S> {
        self.store.state()
    }

    pub fn dispatch(&self, action: A) {
        self.store.dispatch(action);
    }

    /// Dispatch, wait for every effect to finish, and drain the recording.
    pub async fn dispatch_and_settle(&self, action: A) -> Vec<A> {
        self.store.dispatch(action);
        self.store.settled().await;
        self.recorder.drain()
    }

    pub async fn settled(&self) {
        self.store.settled().await;
    }

    /// Drain all recorded actions.
    pub fn drain_emitted(&self) -> Vec<A> {
        self.recorder.drain()
    }

    pub fn recorder(&self) -> &ActionRecorder<A> {
        &self.recorder
    }
}

impl<S, A> TestHarness<S, A>
where
    S: Clone + Send + Sync + 'static,
    A: ActionCategory,
{
    /// Drain the recorded actions that belong to `category`.
    ///
    /// Other actions stay recorded.
    pub fn drain_category(&self, category: &str) -> Vec<A> {
        let (matching, rest): (Vec<A>, Vec<A>) = self
            .recorder
            .drain()
            .into_iter()
            .partition(|action| action.category() == Some(category));
        self.recorder.lock().extend(rest);
        matching
    }
}

/// Assert that a specific action was emitted.
///
/// # Example
///
/// ```ignore
/// let actions = harness.drain_emitted();
/// assert_emitted!(actions, AppAction::Trigger);
/// assert_emitted!(actions, AppAction::Clipboard(ClipboardAction::SetText(t)) if t == "Hello");
/// ```
#[macro_export]
macro_rules! assert_emitted {
    ($actions:expr, $pattern:pat $(if $guard:expr)?) => {
        assert!(
            $actions.iter().any(|a| matches!(a, $pattern $(if $guard)?)),
            "Expected action matching `{}` to be emitted, but got: {:?}",
            stringify!($pattern),
            $actions
        );
    };
}

/// Assert that a specific action was NOT emitted.
#[macro_export]
macro_rules! assert_not_emitted {
    ($actions:expr, $pattern:pat $(if $guard:expr)?) => {
        assert!(
            !$actions.iter().any(|a| matches!(a, $pattern $(if $guard)?)),
            "Expected action matching `{}` NOT to be emitted, but it was: {:?}",
            stringify!($pattern),
            $actions
        );
    };
}

/// Find and return the first action matching a pattern.
#[macro_export]
macro_rules! find_emitted {
    ($actions:expr, $pattern:pat $(if $guard:expr)?) => {
        $actions.iter().find(|a| matches!(a, $pattern $(if $guard)?))
    };
}

/// Count how many actions match a pattern.
#[macro_export]
macro_rules! count_emitted {
    ($actions:expr, $pattern:pat $(if $guard:expr)?) => {
        $actions.iter().filter(|a| matches!(a, $pattern $(if $guard)?)).count()
    };
}

/// Assert that an action of a specific category was emitted.
///
/// This requires the action type to implement [`ActionCategory`].
#[macro_export]
macro_rules! assert_category_emitted {
    ($actions:expr, $category:expr) => {
        assert!(
            $actions.iter().any(|a| {
                use $crate::ActionCategory;
                a.category() == Some($category)
            }),
            "Expected action with category `{}` to be emitted, but got: {:?}",
            $category,
            $actions
        );
    };
}

/// Count how many actions belong to a specific category.
#[macro_export]
macro_rules! count_category {
    ($actions:expr, $category:expr) => {{
        use $crate::ActionCategory;
        $actions
            .iter()
            .filter(|a| a.category() == Some($category))
            .count()
    }};
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::{on_action, NoopMiddleware};

    #[derive(Clone, Debug, PartialEq)]
    enum TestAction {
        Foo,
        Bar(i32),
    }

    impl Action for TestAction {
        fn name(&self) -> &'static str {
            match self {
                TestAction::Foo => "Foo",
                TestAction::Bar(_) => "Bar",
            }
        }
    }

    impl ActionCategory for TestAction {
        fn category(&self) -> Option<&'static str> {
            match self {
                TestAction::Foo => None,
                TestAction::Bar(_) => Some("bar"),
            }
        }
    }

    fn count(state: &mut i32, action: &TestAction) -> bool {
        match action {
            TestAction::Bar(n) => {
                *state += n;
                true
            }
            TestAction::Foo => false,
        }
    }

    #[test]
    fn test_recorder_keeps_processing_order() {
        let foo_to_bar = on_action(|action: &TestAction, _state: &GetState<i32>| match action {
            TestAction::Foo => Effect::many([TestAction::Bar(1), TestAction::Bar(2)]),
            TestAction::Bar(_) => Effect::none(),
        });
        let harness = TestHarness::new(0, count, foo_to_bar);

        harness.dispatch(TestAction::Foo);
        assert_eq!(
            harness.drain_emitted(),
            vec![TestAction::Foo, TestAction::Bar(1), TestAction::Bar(2)]
        );
        assert_eq!(*harness.state(), 3);
        assert!(harness.recorder().is_empty());
    }

    #[tokio::test]
    async fn test_dispatch_and_settle_waits_for_effects() {
        let delayed = on_action(|action: &TestAction, _state: &GetState<i32>| match action {
            TestAction::Foo => Effect::future(async { TestAction::Bar(5) }),
            TestAction::Bar(_) => Effect::none(),
        });
        let harness = TestHarness::new(0, count, delayed);

        let recorded = harness.dispatch_and_settle(TestAction::Foo).await;
        assert_eq!(recorded, vec![TestAction::Foo, TestAction::Bar(5)]);
        assert_eq!(*harness.state(), 5);
    }

    #[test]
    fn test_drain_category_leaves_the_rest() {
        let harness = TestHarness::new(0, count, NoopMiddleware);
        harness.dispatch(TestAction::Foo);
        harness.dispatch(TestAction::Bar(1));

        assert_eq!(harness.drain_category("bar"), vec![TestAction::Bar(1)]);
        assert_eq!(harness.drain_emitted(), vec![TestAction::Foo]);
    }

    #[test]
    fn test_assert_macros() {
        let actions = vec![TestAction::Foo, TestAction::Bar(42)];

        assert_emitted!(actions, TestAction::Foo);
        assert_emitted!(actions, TestAction::Bar(n) if *n == 42);
        assert_not_emitted!(actions, TestAction::Bar(99));

        let found = find_emitted!(actions, TestAction::Bar(_));
        assert!(found.is_some());
        assert_eq!(count_emitted!(actions, TestAction::Bar(_)), 1);

        assert_category_emitted!(actions, "bar");
        assert_eq!(count_category!(actions, "bar"), 1);
    }
}
