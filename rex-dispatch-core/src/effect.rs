//! Effects: asynchronous work produced by middleware
//!
//! An [`Effect`] describes what should happen *after* an action has reduced
//! the state. It is a value: middleware returns it, the store runs it. An
//! effect is made of zero or more parts:
//!
//! - immediate actions ([`Effect::just`], [`Effect::many`]), processed in the
//!   same dispatch as the action that produced them
//! - asynchronous tasks ([`Effect::task`], [`Effect::future`]) whose output
//!   actions re-enter the store when they complete
//! - fire-and-forget work ([`Effect::fire_and_forget`]) that is only run for
//!   its side effect and never produces an action
//!
//! Fallible capability calls go through [`attempt`], which keeps the
//! success and error arms separate until both are mapped into actions:
//!
//! ```ignore
//! attempt(async move { capture.capture(&path).await })
//!     .map_ok(CaptureAction::CaptureSucceeded)
//!     .catch(CaptureAction::CaptureFailed)
//! ```

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::future::{join_all, BoxFuture};
use futures::FutureExt;

enum Part<A> {
    Actions(Vec<A>),
    Task(BoxFuture<'static, Vec<A>>),
    FireAndForget(BoxFuture<'static, ()>),
}

/// A description of follow-up work for a processed action.
#[must_use = "effects do nothing unless returned to the store"]
pub struct Effect<A> {
    parts: Vec<Part<A>>,
}

impl<A: Send + 'static> Default for Effect<A> {
    fn default() -> Self {
        Self::none()
    }
}

impl<A> fmt::Debug for Effect<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut actions = 0;
        let mut tasks = 0;
        let mut fire_and_forget = 0;
        for part in &self.parts {
            match part {
                Part::Actions(list) => actions += list.len(),
                Part::Task(_) => tasks += 1,
                Part::FireAndForget(_) => fire_and_forget += 1,
            }
        }
        f.debug_struct("Effect")
            .field("actions", &actions)
            .field("tasks", &tasks)
            .field("fire_and_forget", &fire_and_forget)
            .finish()
    }
}

impl<A: Send + 'static> Effect<A> {
    /// No follow-up work.
    #[inline]
    pub fn none() -> Self {
        Self { parts: Vec::new() }
    }

    /// Dispatch a single action immediately.
    #[inline]
    pub fn just(action: A) -> Self {
        Self {
            parts: vec![Part::Actions(vec![action])],
        }
    }

    /// Dispatch several actions immediately, in order.
    pub fn many(actions: impl IntoIterator<Item = A>) -> Self {
        let actions: Vec<A> = actions.into_iter().collect();
        if actions.is_empty() {
            return Self::none();
        }
        Self {
            parts: vec![Part::Actions(actions)],
        }
    }

    /// Run a future that yields any number of actions.
    pub fn task<F>(future: F) -> Self
    where
        F: Future<Output = Vec<A>> + Send + 'static,
    {
        Self {
            parts: vec![Part::Task(future.boxed())],
        }
    }

    /// Run a future that yields exactly one action.
    pub fn future<F>(future: F) -> Self
    where
        F: Future<Output = A> + Send + 'static,
    {
        Self::task(future.map(|action| vec![action]))
    }

    /// Run a future only for its side effect.
    pub fn fire_and_forget<F>(future: F) -> Self
    where
        F: Future<Output = ()> + Send + 'static,
    {
        Self {
            parts: vec![Part::FireAndForget(future.boxed())],
        }
    }

    /// Combine two effects; both run.
    pub fn merge(mut self, other: Effect<A>) -> Self {
        self.parts.extend(other.parts);
        self
    }

    /// Whether this effect has no parts at all.
    pub fn is_none(&self) -> bool {
        self.parts.is_empty()
    }

    /// Convert every produced action, e.g. to embed a child action into the
    /// parent union.
    pub fn map<B, F>(self, f: F) -> Effect<B>
    where
        B: Send + 'static,
        F: Fn(A) -> B + Send + Sync + 'static,
    {
        let f = Arc::new(f);
        let parts = self
            .parts
            .into_iter()
            .map(|part| match part {
                Part::Actions(actions) => Part::Actions(actions.into_iter().map(&*f).collect()),
                Part::Task(task) => {
                    let f = Arc::clone(&f);
                    Part::Task(
                        task.map(move |actions| actions.into_iter().map(&*f).collect::<Vec<B>>())
                            .boxed(),
                    )
                }
                Part::FireAndForget(work) => Part::FireAndForget(work),
            })
            .collect();
        Effect { parts }
    }

    /// Split into immediate actions and asynchronous work.
    ///
    /// Fire-and-forget parts become tasks producing no action.
    pub fn into_parts(self) -> (Vec<A>, Vec<BoxFuture<'static, Vec<A>>>) {
        let mut immediate = Vec::new();
        let mut pending = Vec::new();
        for part in self.parts {
            match part {
                Part::Actions(actions) => immediate.extend(actions),
                Part::Task(task) => pending.push(task),
                Part::FireAndForget(work) => pending.push(work.map(|()| Vec::new()).boxed()),
            }
        }
        (immediate, pending)
    }

    /// Run the whole effect to completion and collect the produced actions.
    ///
    /// Immediate actions come first, then task outputs in declaration order.
    /// Meant for exercising middleware without a store.
    pub async fn collect(self) -> Vec<A> {
        let (mut actions, pending) = self.into_parts();
        for produced in join_all(pending).await {
            actions.extend(produced);
        }
        actions
    }
}

/// Start building an effect from a fallible future.
pub fn attempt<T, E, F>(future: F) -> Attempt<T, E>
where
    T: Send + 'static,
    E: Send + 'static,
    F: Future<Output = Result<T, E>> + Send + 'static,
{
    Attempt {
        future: future.boxed(),
    }
}

/// A fallible future on its way to becoming an [`Effect`].
///
/// `map_ok` and `map_err` transform the two arms independently; `catch`
/// collapses them into a single action type.
#[must_use = "an attempt does nothing until turned into an effect"]
pub struct Attempt<T, E> {
    future: BoxFuture<'static, Result<T, E>>,
}

impl<T, E> fmt::Debug for Attempt<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Attempt").finish_non_exhaustive()
    }
}

impl<T: Send + 'static, E: Send + 'static> Attempt<T, E> {
    /// Map the success value.
    pub fn map_ok<U, F>(self, f: F) -> Attempt<U, E>
    where
        U: Send + 'static,
        F: FnOnce(T) -> U + Send + 'static,
    {
        Attempt {
            future: self.future.map(|result| result.map(f)).boxed(),
        }
    }

    /// Map the error value.
    pub fn map_err<E2, F>(self, f: F) -> Attempt<T, E2>
    where
        E2: Send + 'static,
        F: FnOnce(E) -> E2 + Send + 'static,
    {
        Attempt {
            future: self.future.map(|result| result.map_err(f)).boxed(),
        }
    }

    /// Turn the error into an action of the success type, producing an
    /// effect that yields exactly one action either way.
    pub fn catch<F>(self, f: F) -> Effect<T>
    where
        F: FnOnce(E) -> T + Send + 'static,
    {
        Effect::future(self.future.map(|result| result.unwrap_or_else(f)))
    }

    /// Run the attempt for its side effect only, ignoring both arms.
    pub fn discard<A: Send + 'static>(self) -> Effect<A> {
        Effect::fire_and_forget(self.future.map(|_| ()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Clone, Debug, PartialEq)]
    enum TestAction {
        Loaded(u32),
        Failed(String),
        Wrapped(Box<TestAction>),
    }

    #[tokio::test]
    async fn test_none_and_just() {
        assert!(Effect::<TestAction>::none().is_none());
        assert!(Effect::<TestAction>::many(vec![]).is_none());

        let actions = Effect::just(TestAction::Loaded(1)).collect().await;
        assert_eq!(actions, vec![TestAction::Loaded(1)]);
    }

    #[tokio::test]
    async fn test_attempt_success_arm() {
        let effect = attempt(async { Ok::<_, String>(7) })
            .map_ok(TestAction::Loaded)
            .catch(TestAction::Failed);

        assert_eq!(effect.collect().await, vec![TestAction::Loaded(7)]);
    }

    #[tokio::test]
    async fn test_attempt_error_arm() {
        let effect = attempt(async { Err::<u32, _>(404) })
            .map_err(|code| format!("status {code}"))
            .map_ok(TestAction::Loaded)
            .catch(TestAction::Failed);

        assert_eq!(
            effect.collect().await,
            vec![TestAction::Failed("status 404".into())]
        );
    }

    #[tokio::test]
    async fn test_fire_and_forget_runs_without_actions() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let effect = Effect::<TestAction>::fire_and_forget(async move {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        assert!(effect.collect().await.is_empty());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_discard_ignores_result() {
        let effect: Effect<TestAction> = attempt(async { Err::<(), _>("boom") }).discard();
        assert!(effect.collect().await.is_empty());
    }

    #[tokio::test]
    async fn test_merge_keeps_immediate_actions_first() {
        let effect = Effect::future(async { TestAction::Loaded(2) })
            .merge(Effect::just(TestAction::Loaded(1)));

        assert_eq!(
            effect.collect().await,
            vec![TestAction::Loaded(1), TestAction::Loaded(2)]
        );
    }

    #[tokio::test]
    async fn test_map_wraps_every_arm() {
        let effect = Effect::just(TestAction::Loaded(1))
            .merge(Effect::future(async { TestAction::Loaded(2) }))
            .map(|a| TestAction::Wrapped(Box::new(a)));

        assert_eq!(
            effect.collect().await,
            vec![
                TestAction::Wrapped(Box::new(TestAction::Loaded(1))),
                TestAction::Wrapped(Box::new(TestAction::Loaded(2))),
            ]
        );
    }

    #[test]
    fn test_into_parts_separates_async_work() {
        let effect = Effect::just(TestAction::Loaded(1))
            .merge(Effect::fire_and_forget(async {}))
            .merge(Effect::task(async { vec![] }));

        let (immediate, pending) = effect.into_parts();
        assert_eq!(immediate, vec![TestAction::Loaded(1)]);
        assert_eq!(pending.len(), 2);
    }
}
