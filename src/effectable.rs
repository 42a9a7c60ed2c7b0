//! Values obtainable now, through one host effect, or later.
//!
//! [`Effectable`] is what a channel node reports when a driver abandons it.
//! Most of those fallback results are plain values; `Effectable` lets them
//! stay plain instead of being wrapped in a full effect computation up front.

use std::{fmt, rc::Rc};

use crate::effect::{Effect, Traverse, Value};

/// A value of type `A` in the context `F`, possibly not yet computed.
///
/// Forcing a [`Deferred`](Effectable::Deferred) must eventually reach
/// [`Pure`](Effectable::Pure) or [`Effect`](Effectable::Effect). A thunk that
/// keeps producing itself diverges; nothing here detects that.
pub enum Effectable<F: Effect, A: Value> {
    /// Available immediately.
    Pure(A),
    /// Obtained by running one host effect.
    Effect(F::Of<A>),
    /// Computed on demand. Not memoized: every resolution forces again.
    Deferred(Rc<dyn Fn() -> Effectable<F, A>>),
}

impl<F: Effect, A: Value> Clone for Effectable<F, A> {
    fn clone(&self) -> Self {
        match self {
            Effectable::Pure(a) => Effectable::Pure(a.clone()),
            Effectable::Effect(fa) => Effectable::Effect(fa.clone()),
            Effectable::Deferred(thunk) => Effectable::Deferred(Rc::clone(thunk)),
        }
    }
}

impl<F: Effect, A: Value + fmt::Debug> fmt::Debug for Effectable<F, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Effectable::Pure(a) => f.debug_tuple("Pure").field(a).finish(),
            Effectable::Effect(_) => f.write_str("Effect(..)"),
            Effectable::Deferred(_) => f.write_str("Deferred(..)"),
        }
    }
}

impl<F: Effect, A: Value> From<A> for Effectable<F, A> {
    fn from(a: A) -> Self {
        Effectable::Pure(a)
    }
}

impl<F: Effect, A: Value> Effectable<F, A> {
    pub fn pure(a: A) -> Self {
        Effectable::Pure(a)
    }

    pub fn effect(fa: F::Of<A>) -> Self {
        Effectable::Effect(fa)
    }

    pub fn defer<T>(thunk: T) -> Self
    where
        T: Fn() -> Effectable<F, A> + 'static,
    {
        Effectable::Deferred(Rc::new(thunk))
    }

    /// Returns `true` if the value is available without running anything.
    pub fn is_pure(&self) -> bool {
        matches!(self, Effectable::Pure(_))
    }

    /// Peel off `Deferred` layers until `Pure` or `Effect` is reached.
    pub fn force(&self) -> Self {
        let mut current = self.clone();
        while let Effectable::Deferred(thunk) = current {
            current = thunk();
        }
        current
    }

    /// Collapse into the host effect.
    ///
    /// `Pure(a)` becomes `F::pure(a)`, `Effect(fa)` is returned unchanged and
    /// `Deferred` is forced first. Resolving is iterative, so long chains of
    /// deferrals do not grow the stack.
    ///
    /// ```rust
    /// use cochan::{Effectable, Fallible};
    ///
    /// let later: Effectable<Fallible<String>, i32> =
    ///     Effectable::defer(|| Effectable::defer(|| Effectable::pure(3)));
    /// assert_eq!(later.resolve(), Ok(3));
    /// ```
    pub fn resolve(&self) -> F::Of<A> {
        let mut current = self.clone();
        loop {
            match current {
                Effectable::Pure(a) => return F::pure(a),
                Effectable::Effect(fa) => return fa,
                Effectable::Deferred(thunk) => current = thunk(),
            }
        }
    }

    /// Rewrite the contained value without running any effect.
    ///
    /// The shape is preserved: a mapped `Deferred` is another `Deferred`.
    pub fn map<B, K>(&self, f: K) -> Effectable<F, B>
    where
        B: Value,
        K: Fn(A) -> B + 'static,
    {
        self.map_shared(Rc::new(f))
    }

    pub(crate) fn map_shared<B: Value>(&self, f: Rc<dyn Fn(A) -> B>) -> Effectable<F, B> {
        match self {
            Effectable::Pure(a) => Effectable::Pure(f(a.clone())),
            Effectable::Effect(fa) => {
                Effectable::Effect(F::map::<A, B, _>(fa.clone(), move |a| f(a)))
            }
            Effectable::Deferred(thunk) => {
                let thunk = Rc::clone(thunk);
                Effectable::defer(move || thunk().map_shared(Rc::clone(&f)))
            }
        }
    }

    /// Sequence with a continuation producing another `Effectable`.
    ///
    /// Both sides are resolved into `F` and recombined there, behind a single
    /// `Deferred` layer; nothing runs until the result is resolved.
    pub fn and_then<B, K>(&self, k: K) -> Effectable<F, B>
    where
        B: Value,
        K: Fn(A) -> Effectable<F, B> + 'static,
    {
        let this = self.clone();
        let k = Rc::new(k);
        Effectable::defer(move || {
            let k = Rc::clone(&k);
            Effectable::Effect(F::flat_map::<A, B, _>(this.resolve(), move |a| {
                k(a).resolve()
            }))
        })
    }

    /// Resolve `self` and then `other`, combining both values with `f`.
    pub fn zip_with<B, C, K>(&self, other: &Effectable<F, B>, f: K) -> Effectable<F, C>
    where
        B: Value,
        C: Value,
        K: Fn(A, B) -> C + 'static,
    {
        let (this, other) = (self.clone(), other.clone());
        let f = Rc::new(f);
        Effectable::defer(move || {
            let f = Rc::clone(&f);
            Effectable::Effect(F::zip_with::<A, B, C, _>(
                this.resolve(),
                other.resolve(),
                move |a, b| f(a, b),
            ))
        })
    }

    /// Resolve `self`, discard its value, then resolve `other`.
    pub fn then<B: Value>(&self, other: &Effectable<F, B>) -> Effectable<F, B> {
        self.zip_with(other, |_, b| b)
    }
}

impl<F: Traverse, A: Value> Effectable<F, A> {
    /// Fold over the resolved value, if the host effect holds one.
    pub fn fold<B, K>(&self, init: B, f: K) -> B
    where
        K: FnOnce(B, &A) -> B,
    {
        F::fold(&self.resolve(), init, f)
    }

    /// Traverse the resolved value with an effect in another context `G`.
    pub fn traverse<G, B, K>(&self, f: K) -> G::Of<Effectable<F, B>>
    where
        G: Effect,
        B: Value,
        K: Fn(A) -> G::Of<B> + 'static,
    {
        let traversed = F::traverse::<G, A, B, K>(self.resolve(), f);
        G::map::<F::Of<B>, Effectable<F, B>, _>(traversed, Effectable::Effect)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effect::{Action, Fallible, Identity, Io};
    use std::cell::Cell;

    fn counting(hits: &Rc<Cell<u32>>, value: i32) -> Action<i32> {
        let hits = Rc::clone(hits);
        Action::new(move || {
            hits.set(hits.get() + 1);
            value
        })
    }

    #[test]
    fn test_resolve_each_shape() {
        let pure: Effectable<Identity, i32> = Effectable::pure(1);
        let effect: Effectable<Identity, i32> = Effectable::effect(2);
        let deferred: Effectable<Identity, i32> =
            Effectable::defer(|| Effectable::defer(|| Effectable::pure(3)));

        assert_eq!(pure.resolve(), 1);
        assert_eq!(effect.resolve(), 2);
        assert_eq!(deferred.resolve(), 3);
    }

    #[test]
    fn test_deferred_is_forced_on_every_resolve() {
        let forced = Rc::new(Cell::new(0));
        let counter = Rc::clone(&forced);
        let deferred: Effectable<Identity, i32> = Effectable::defer(move || {
            counter.set(counter.get() + 1);
            Effectable::pure(5)
        });

        assert_eq!(deferred.resolve(), 5);
        assert_eq!(deferred.resolve(), 5);
        assert_eq!(forced.get(), 2);
    }

    #[test]
    fn test_force_stops_at_pure_or_effect() {
        let hits = Rc::new(Cell::new(0));
        let effect = counting(&hits, 9);
        let deferred: Effectable<Io, i32> = Effectable::defer(move || {
            let effect = effect.clone();
            Effectable::defer(move || Effectable::effect(effect.clone()))
        });

        let forced = deferred.force();
        assert!(matches!(forced, Effectable::Effect(_)));
        assert_eq!(hits.get(), 0);
        assert_eq!(forced.resolve().run(), 9);

        let pure: Effectable<Io, i32> = Effectable::defer(|| Effectable::pure(2));
        assert!(pure.force().is_pure());
    }

    #[test]
    fn test_map_preserves_shape() {
        let pure: Effectable<Identity, i32> = Effectable::pure(2);
        assert!(matches!(pure.map(|x| x * 10), Effectable::Pure(20)));

        let deferred: Effectable<Identity, i32> = Effectable::defer(|| Effectable::pure(2));
        let mapped = deferred.map(|x| x + 1);
        assert!(matches!(mapped, Effectable::Deferred(_)));
        assert_eq!(mapped.resolve(), 3);
    }

    #[test]
    fn test_map_does_not_run_effects() {
        let hits = Rc::new(Cell::new(0));
        let effect: Effectable<Io, i32> = Effectable::effect(counting(&hits, 4));

        let mapped = effect.map(|x| x * 2);
        assert_eq!(hits.get(), 0);
        assert_eq!(mapped.resolve().run(), 8);
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn test_and_then_is_lazy_and_sequenced() {
        let hits = Rc::new(Cell::new(0));
        let first: Effectable<Io, i32> = Effectable::effect(counting(&hits, 4));
        let inner = Rc::clone(&hits);

        let bound = first.and_then(move |x| Effectable::effect(counting(&inner, x + 1)));
        assert!(matches!(bound, Effectable::Deferred(_)));
        assert_eq!(hits.get(), 0);

        assert_eq!(bound.resolve().run(), 5);
        assert_eq!(hits.get(), 2);
    }

    #[test]
    fn test_and_then_short_circuits_in_host() {
        let failed: Effectable<Fallible<&str>, i32> = Effectable::effect(Err("nope"));
        let bound = failed.and_then(|x| Effectable::pure(x + 1));
        assert_eq!(bound.resolve(), Err("nope"));
    }

    #[test]
    fn test_zip_with_and_then() {
        let a: Effectable<Identity, i32> = Effectable::pure(2);
        let b: Effectable<Identity, i32> = Effectable::defer(|| Effectable::pure(5));

        assert_eq!(a.zip_with(&b, |x, y| x * y).resolve(), 10);
        assert_eq!(a.then(&b).resolve(), 5);
    }

    #[test]
    fn test_fold_and_traverse() {
        let ok: Effectable<Fallible<String>, i32> = Effectable::pure(3);
        let err: Effectable<Fallible<String>, i32> = Effectable::effect(Err("bad".into()));

        assert_eq!(ok.fold(1, |acc, x| acc + x), 4);
        assert_eq!(err.fold(1, |acc, x| acc + x), 1);

        let traversed = ok.traverse::<Identity, _, _>(|x| x * 2);
        assert_eq!(traversed.resolve(), Ok(6));
    }
}
