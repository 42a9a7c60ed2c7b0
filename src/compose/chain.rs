use std::rc::Rc;

use crate::{
    channel::{Channel, Node},
    compose::bound::bind,
    effect::{Effect, Value},
};

impl<I: Value, O: Value, F: Effect, R: Value> Channel<I, O, F, R> {
    /// Continue with the channel produced from this channel's result.
    ///
    /// Every `Stop(r)` becomes `k(r)`. Every other node keeps its shape, and
    /// its terminator becomes "this terminator's value, then whatever `k` of
    /// that value would itself report on termination". Abandoning the
    /// composed channel before `k` is reached therefore still reports a
    /// result in terms of `k`.
    ///
    /// Chains of `and_then` stay flat however they are nested, so driving or
    /// terminating a long pipeline does not grow the stack.
    ///
    /// ```rust
    /// use cochan::*;
    ///
    /// let first: Channel<(), &str, Identity, u32> = emit(Effectable::pure(1), "a");
    /// let both = first.and_then(|n| emit(Effectable::pure(n + 10), "b"));
    ///
    /// // abandoned at "a": 1 flows into the second stage's terminator
    /// assert_eq!(both.terminate().resolve(), 11);
    ///
    /// let mut outputs = both.outputs();
    /// assert_eq!(outputs.by_ref().collect::<Vec<_>>(), vec!["a", "b"]);
    /// assert_eq!(outputs.into_return(), Some(Ok(11)));
    /// ```
    pub fn and_then<R2, K>(&self, k: K) -> Channel<I, O, F, R2>
    where
        R2: Value,
        K: Fn(R) -> Channel<I, O, F, R2> + 'static,
    {
        match self.node() {
            Node::Stop(result) => k(result.clone()),
            _ => bind(self, Rc::new(k)),
        }
    }

    /// Run this channel, discard its result, then continue with `other`.
    pub fn then<R2: Value>(&self, other: &Channel<I, O, F, R2>) -> Channel<I, O, F, R2> {
        let other = other.clone();
        self.and_then(move |_| other.clone())
    }

    /// Run this channel then `other`, combining both results with `f`.
    ///
    /// Left-biased: `other` starts only once this channel has stopped.
    pub fn zip_with<R2, R3, K>(&self, other: &Channel<I, O, F, R2>, f: K) -> Channel<I, O, F, R3>
    where
        R2: Value,
        R3: Value,
        K: Fn(R, R2) -> R3 + 'static,
    {
        let other = other.clone();
        let f = Rc::new(f);
        self.and_then(move |left| {
            let f = Rc::clone(&f);
            other.map(move |right| f(left.clone(), right))
        })
    }

    /// Run this channel then `other`, pairing both results.
    pub fn zip<R2: Value>(&self, other: &Channel<I, O, F, R2>) -> Channel<I, O, F, (R, R2)> {
        self.zip_with(other, |left, right| (left, right))
    }
}

impl<I: Value, O: Value, F: Effect, R: Value, R2: Value> Channel<I, O, F, Rc<dyn Fn(R) -> R2>> {
    /// Apply the function this channel stops with to the result of `other`.
    pub fn apply(&self, other: &Channel<I, O, F, R>) -> Channel<I, O, F, R2> {
        self.zip_with(other, |f, r| f(r))
    }
}
