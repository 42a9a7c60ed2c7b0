//! Algebraic instances.
//!
//! Channels and effectables are functors through `map`, monads through
//! `and_then`, and applicatives through `zip_with`/`apply`, all as inherent
//! methods. They satisfy the usual laws when two channels are compared by
//! driving them under [`Identity`](crate::Identity) and looking at the
//! outputs, the final result, and the terminator reported at every step:
//!
//! * `c.map(|r| r)` behaves like `c`
//! * `c.map(f).map(g)` behaves like `c.map(|r| g(f(r)))`
//! * `stop(r).and_then(k)` behaves like `k(r)`
//! * `c.and_then(stop)` behaves like `c`
//! * `c.and_then(f).and_then(g)` behaves like `c.and_then(|r| f(r).and_then(g))`
//! * `f.apply(&c)` behaves like `f.and_then(|f| c.map(f))`
//!
//! This module adds [`Monoid`], whose channel instance combines results
//! left to right and whose identity element is `Stop(R::empty())`.

use crate::{
    build::stop,
    channel::Channel,
    effect::{Effect, Value},
    effectable::Effectable,
};

/// An associative combination with an identity element.
///
/// `empty().combine(a) == a`, `a.combine(empty()) == a`, and `combine` is
/// associative.
pub trait Monoid: Sized {
    fn empty() -> Self;

    fn combine(self, other: Self) -> Self;

    /// Combine every item, left to right.
    fn concat<T>(items: T) -> Self
    where
        T: IntoIterator<Item = Self>,
    {
        items.into_iter().fold(Self::empty(), Self::combine)
    }
}

impl Monoid for () {
    fn empty() -> Self {}

    fn combine(self, _: Self) -> Self {}
}

impl Monoid for String {
    fn empty() -> Self {
        String::new()
    }

    fn combine(mut self, other: Self) -> Self {
        self.push_str(&other);
        self
    }
}

impl<T> Monoid for Vec<T> {
    fn empty() -> Self {
        Vec::new()
    }

    fn combine(mut self, mut other: Self) -> Self {
        self.append(&mut other);
        self
    }
}

impl<A: Monoid, B: Monoid> Monoid for (A, B) {
    fn empty() -> Self {
        (A::empty(), B::empty())
    }

    fn combine(self, other: Self) -> Self {
        (self.0.combine(other.0), self.1.combine(other.1))
    }
}

/// Resolves both sides in order and combines their values inside `F`.
impl<F: Effect, A: Value + Monoid> Monoid for Effectable<F, A> {
    fn empty() -> Self {
        Effectable::Pure(A::empty())
    }

    fn combine(self, other: Self) -> Self {
        self.zip_with(&other, A::combine)
    }
}

/// Runs the left channel to `Stop`, then the right one, combining results.
///
/// ```rust
/// use cochan::*;
///
/// let hello: Channel<(), u8, Identity, String> = emit(Effectable::pure(String::new()), 1)
///     .then(&stop("hello ".to_string()));
/// let world: Channel<(), u8, Identity, String> = emit(Effectable::pure(String::new()), 2)
///     .then(&stop("world".to_string()));
///
/// let mut outputs = Monoid::concat([hello, Channel::empty(), world]).outputs();
/// assert_eq!(outputs.by_ref().collect::<Vec<_>>(), vec![1, 2]);
/// assert_eq!(outputs.into_return(), Some(Ok("hello world".to_string())));
/// ```
impl<I, O, F, R> Monoid for Channel<I, O, F, R>
where
    I: Value,
    O: Value,
    F: Effect,
    R: Value + Monoid,
{
    fn empty() -> Self {
        stop(R::empty())
    }

    fn combine(self, other: Self) -> Self {
        self.zip_with(&other, R::combine)
    }
}
