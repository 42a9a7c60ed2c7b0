//! Host effect abstractions.
//!
//! A channel is generic over the context in which its effectful nodes run.
//! Rust has no higher-kinded types, so that context is named by a marker type
//! implementing [`Effect`], whose generic associated type [`Effect::Of`] plays
//! the role of `F<A>`.
//!
//! Three contexts ship with the crate:
//!
//! | Marker | `Of<A>` | Notes |
//! |--------|---------|-------|
//! | [`Identity`] | `A` | no effects at all; handy for checking laws |
//! | [`Fallible<E>`] | `Result<A, E>` | short-circuits on the first `Err` |
//! | [`Io`] | [`Action<A>`] | lazy, re-runnable side effects |
//!
//! ```rust
//! use cochan::{Action, Effect, Io};
//! use std::{cell::Cell, rc::Rc};
//!
//! let hits = Rc::new(Cell::new(0));
//! let counter = Rc::clone(&hits);
//! let tick = Action::new(move || counter.set(counter.get() + 1));
//! let twice = Io::then(tick.clone(), Io::map(tick, |()| "done"));
//!
//! assert_eq!(hits.get(), 0);
//! assert_eq!(twice.run(), "done");
//! assert_eq!(hits.get(), 2);
//! ```

use std::{convert::Infallible, fmt, marker::PhantomData, rc::Rc};

/// Payloads carried by channels and effects.
///
/// Channels are persistent values that may be driven more than once, so
/// everything they hold must be cloneable and own its data.
pub trait Value: Clone + 'static {}

impl<T: Clone + 'static> Value for T {}

/// A computational context `F` able to wrap pure values and sequence
/// computations.
pub trait Effect: Sized + 'static {
    /// The type of a computation in this context producing an `A`.
    type Of<A: Value>: Value;

    /// Wrap a pure value.
    fn pure<A: Value>(a: A) -> Self::Of<A>;

    /// Sequence `fa` with a computation depending on its result.
    fn flat_map<A, B, K>(fa: Self::Of<A>, k: K) -> Self::Of<B>
    where
        A: Value,
        B: Value,
        K: Fn(A) -> Self::Of<B> + 'static;

    /// Transform the result of `fa`.
    fn map<A, B, K>(fa: Self::Of<A>, f: K) -> Self::Of<B>
    where
        A: Value,
        B: Value,
        K: Fn(A) -> B + 'static,
    {
        Self::flat_map(fa, move |a| Self::pure(f(a)))
    }

    /// Run `fa`, discard its result, then run `fb`.
    fn then<A: Value, B: Value>(fa: Self::Of<A>, fb: Self::Of<B>) -> Self::Of<B> {
        Self::flat_map(fa, move |_| fb.clone())
    }

    /// Run `fa` then `fb`, combining both results with `f`.
    fn zip_with<A, B, C, K>(fa: Self::Of<A>, fb: Self::Of<B>, f: K) -> Self::Of<C>
    where
        A: Value,
        B: Value,
        C: Value,
        K: Fn(A, B) -> C + 'static,
    {
        let f = Rc::new(f);
        Self::flat_map(fa, move |a| {
            let f = Rc::clone(&f);
            Self::map(fb.clone(), move |b| f(a.clone(), b))
        })
    }
}

/// Effects that can be executed synchronously, in place.
///
/// Drivers built on `Exec` run without recursing through [`Effect::flat_map`],
/// so the number of effect nodes a channel passes through does not grow the
/// stack.
pub trait Exec: Effect {
    /// Why an execution stopped short of producing a value.
    type Halt;

    fn exec<A: Value>(fa: Self::Of<A>) -> Result<A, Self::Halt>;
}

/// Effects whose computations can be folded over and traversed.
pub trait Traverse: Effect {
    /// Fold the (at most one) value held by `fa`.
    fn fold<A, B, K>(fa: &Self::Of<A>, init: B, f: K) -> B
    where
        A: Value,
        K: FnOnce(B, &A) -> B;

    /// Turn `F<A>` inside out into `G<F<B>>`.
    fn traverse<G, A, B, K>(fa: Self::Of<A>, f: K) -> G::Of<Self::Of<B>>
    where
        G: Effect,
        A: Value,
        B: Value,
        K: Fn(A) -> G::Of<B> + 'static;
}

/// The trivial context: a computation is just its value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Identity;

impl Effect for Identity {
    type Of<A: Value> = A;

    fn pure<A: Value>(a: A) -> A {
        a
    }

    fn flat_map<A, B, K>(fa: A, k: K) -> B
    where
        A: Value,
        B: Value,
        K: Fn(A) -> B + 'static,
    {
        k(fa)
    }
}

impl Exec for Identity {
    type Halt = Infallible;

    fn exec<A: Value>(fa: A) -> Result<A, Infallible> {
        Ok(fa)
    }
}

impl Traverse for Identity {
    fn fold<A, B, K>(fa: &A, init: B, f: K) -> B
    where
        A: Value,
        K: FnOnce(B, &A) -> B,
    {
        f(init, fa)
    }

    fn traverse<G, A, B, K>(fa: A, f: K) -> G::Of<B>
    where
        G: Effect,
        A: Value,
        B: Value,
        K: Fn(A) -> G::Of<B> + 'static,
    {
        f(fa)
    }
}

/// Computations that may fail with an `E`.
pub struct Fallible<E>(PhantomData<fn() -> E>);

impl<E> fmt::Debug for Fallible<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Fallible")
    }
}

impl<E: Value> Effect for Fallible<E> {
    type Of<A: Value> = Result<A, E>;

    fn pure<A: Value>(a: A) -> Result<A, E> {
        Ok(a)
    }

    fn flat_map<A, B, K>(fa: Result<A, E>, k: K) -> Result<B, E>
    where
        A: Value,
        B: Value,
        K: Fn(A) -> Result<B, E> + 'static,
    {
        fa.and_then(k)
    }
}

impl<E: Value> Exec for Fallible<E> {
    type Halt = E;

    fn exec<A: Value>(fa: Result<A, E>) -> Result<A, E> {
        fa
    }
}

impl<E: Value> Traverse for Fallible<E> {
    fn fold<A, B, K>(fa: &Result<A, E>, init: B, f: K) -> B
    where
        A: Value,
        K: FnOnce(B, &A) -> B,
    {
        match fa {
            Ok(a) => f(init, a),
            Err(_) => init,
        }
    }

    fn traverse<G, A, B, K>(fa: Result<A, E>, f: K) -> G::Of<Result<B, E>>
    where
        G: Effect,
        A: Value,
        B: Value,
        K: Fn(A) -> G::Of<B> + 'static,
    {
        match fa {
            Ok(a) => G::map(f(a), Ok::<B, E>),
            Err(e) => G::pure(Err::<B, E>(e)),
        }
    }
}

/// Lazy side-effecting computations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Io;

/// A deferred, re-runnable side effect producing an `A` each time it runs.
pub struct Action<A>(Rc<dyn Fn() -> A>);

impl<A> Clone for Action<A> {
    fn clone(&self) -> Self {
        Action(Rc::clone(&self.0))
    }
}

impl<A> fmt::Debug for Action<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Action(..)")
    }
}

impl<A: 'static> Action<A> {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn() -> A + 'static,
    {
        Action(Rc::new(f))
    }

    /// Perform the action.
    pub fn run(&self) -> A {
        (self.0)()
    }
}

impl Effect for Io {
    type Of<A: Value> = Action<A>;

    fn pure<A: Value>(a: A) -> Action<A> {
        Action::new(move || a.clone())
    }

    fn flat_map<A, B, K>(fa: Action<A>, k: K) -> Action<B>
    where
        A: Value,
        B: Value,
        K: Fn(A) -> Action<B> + 'static,
    {
        Action::new(move || k(fa.run()).run())
    }
}

impl Exec for Io {
    type Halt = Infallible;

    fn exec<A: Value>(fa: Action<A>) -> Result<A, Infallible> {
        Ok(fa.run())
    }
}
