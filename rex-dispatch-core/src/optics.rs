//! Lenses and prisms for composing domain modules into an application
//!
//! A [`Lens`] focuses a parent *state* on one of its child states. A [`Prism`]
//! focuses a parent *action* union on one of its child action variants.
//! Reducers and middleware written against a child domain are lifted into the
//! parent through these two types, see [`crate::reducer::lift`] and
//! [`crate::middleware::lift`].
//!
//! Both are plain pairs of function pointers so they can be declared as
//! `const` items next to the types they project.
//!
//! # Example
//!
//! ```
//! use rex_dispatch_core::{Lens, Prism};
//!
//! #[derive(Clone, Debug, PartialEq)]
//! enum Child { Ping }
//!
//! #[derive(Clone, Debug, PartialEq)]
//! enum Parent { Child(Child), Other }
//!
//! fn extract(parent: &Parent) -> Option<Child> {
//!     match parent {
//!         Parent::Child(child) => Some(child.clone()),
//!         _ => None,
//!     }
//! }
//!
//! const CHILD: Prism<Parent, Child> = Prism::new(extract, Parent::Child);
//!
//! assert_eq!(CHILD.extract(&CHILD.embed(Child::Ping)), Some(Child::Ping));
//! assert_eq!(CHILD.extract(&Parent::Other), None);
//!
//! #[derive(Clone, Default)]
//! struct State { count: u32 }
//!
//! const COUNT: Lens<State, u32> = Lens::new(|s| s.count, |s, c| s.count = c);
//! let mut state = State::default();
//! COUNT.set(&mut state, 4);
//! assert_eq!(COUNT.get(&state), 4);
//! ```

use std::fmt;

/// Total, bidirectional projection of a parent state onto a child state.
///
/// Laws: `get(set(p, c)) == c` and `set(p, get(p)) == p`.
pub struct Lens<P, C> {
    get: fn(&P) -> C,
    set: fn(&mut P, C),
}

impl<P, C> Lens<P, C> {
    /// Create a lens from a getter and a setter.
    pub const fn new(get: fn(&P) -> C, set: fn(&mut P, C)) -> Self {
        Self { get, set }
    }

    /// Read the child state out of the parent.
    #[inline]
    pub fn get(&self, parent: &P) -> C {
        (self.get)(parent)
    }

    /// Write a child state back into the parent.
    #[inline]
    pub fn set(&self, parent: &mut P, child: C) {
        (self.set)(parent, child)
    }

    /// Apply `f` to the focused child and write the result back.
    ///
    /// Returns whatever `f` returns.
    pub fn modify<R>(&self, parent: &mut P, f: impl FnOnce(&mut C) -> R) -> R {
        let mut child = self.get(parent);
        let out = f(&mut child);
        self.set(parent, child);
        out
    }
}

impl<P: Clone> Lens<P, P> {
    /// The lens that focuses on the whole value.
    pub fn identity() -> Self {
        Self::new(P::clone, |parent, child| *parent = child)
    }
}

impl<P> Lens<P, ()> {
    /// A lens onto no state at all, for stateless domains.
    pub fn unit() -> Self {
        Self::new(|_| (), |_, _| {})
    }
}

impl<P, C> Clone for Lens<P, C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<P, C> Copy for Lens<P, C> {}

impl<P, C> fmt::Debug for Lens<P, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lens")
            .field("parent", &std::any::type_name::<P>())
            .field("child", &std::any::type_name::<C>())
            .finish()
    }
}

/// Partial, bidirectional projection of a parent action onto a child action.
///
/// Law: `extract(embed(a)) == Some(a)` for every child action `a`, and
/// `extract` returns `None` for parent actions built from any other variant.
pub struct Prism<P, C> {
    extract: fn(&P) -> Option<C>,
    embed: fn(C) -> P,
}

impl<P, C> Prism<P, C> {
    /// Create a prism from an extractor and an embedding constructor.
    ///
    /// Enum tuple-variant constructors work directly as the `embed` argument.
    pub const fn new(extract: fn(&P) -> Option<C>, embed: fn(C) -> P) -> Self {
        Self { extract, embed }
    }

    /// Try to pull the child action out of a parent action.
    #[inline]
    pub fn extract(&self, parent: &P) -> Option<C> {
        (self.extract)(parent)
    }

    /// Wrap a child action into the parent union.
    #[inline]
    pub fn embed(&self, child: C) -> P {
        (self.embed)(child)
    }

    /// Whether the parent action is the variant this prism focuses on.
    #[inline]
    pub fn matches(&self, parent: &P) -> bool {
        self.extract(parent).is_some()
    }
}

impl<P, C> Clone for Prism<P, C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<P, C> Copy for Prism<P, C> {}

impl<P, C> fmt::Debug for Prism<P, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Prism")
            .field("parent", &std::any::type_name::<P>())
            .field("child", &std::any::type_name::<C>())
            .finish()
    }
}
