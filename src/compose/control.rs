//! Restarting, re-terminating, and finalizing channels.

use std::rc::Rc;

use crate::{
    build::{defer, receive, stop_with},
    channel::{Channel, Node},
    effect::{Effect, Value},
    effectable::Effectable,
};

impl<I: Value, O: Value, F: Effect, R: Value> Channel<I, O, F, R> {
    /// Restart from the beginning every time the channel would stop.
    ///
    /// Terminators are untouched, so a driver can still abandon the cycle at
    /// any node and receive that node's fallback. Cycling a channel that is
    /// nothing but `Stop` diverges once driven.
    ///
    /// ```rust
    /// use cochan::*;
    ///
    /// let tick: Channel<(), &str, Identity, i32> = emit(Effectable::pure(0), "x");
    /// let mut outputs = tick.cycle().outputs();
    ///
    /// assert!(outputs.by_ref().take(50).all(|o| o == "x"));
    /// assert_eq!(outputs.terminate(), Ok(Exit::Terminated(0)));
    /// ```
    pub fn cycle(&self) -> Self {
        self.restart_at(self.clone())
    }

    fn restart_at(&self, origin: Self) -> Self {
        match self.node() {
            Node::Stop(_) => defer(move || origin.cycle()),
            Node::Yield {
                output,
                next,
                terminator,
            } => {
                let next = next.clone();
                Channel::new(Node::Yield {
                    output: output.clone(),
                    next: defer(move || next.restart_at(origin.clone())),
                    terminator: terminator.clone(),
                })
            }
            Node::Await {
                handler,
                terminator,
            } => {
                let handler = Rc::clone(handler);
                receive(terminator.clone(), move |input| {
                    handler(input).restart_at(origin.clone())
                })
            }
            Node::Effectful { effect, terminator } => Channel::new(Node::Effectful {
                effect: F::map::<Self, Self, _>(effect.clone(), move |next| {
                    next.restart_at(origin.clone())
                }),
                terminator: terminator.clone(),
            }),
            Node::Deferred(_) => {
                let this = self.clone();
                defer(move || this.force().restart_at(origin.clone()))
            }
        }
    }

    /// Replace the terminator of every node with `terminator`.
    ///
    /// `Stop` nodes carry no terminator and keep reporting their own result.
    pub fn with_terminator(&self, terminator: Effectable<F, R>) -> Self {
        match self.node() {
            Node::Stop(_) => self.clone(),
            Node::Yield { output, next, .. } => {
                let next = next.clone();
                let replacement = terminator.clone();
                Channel::new(Node::Yield {
                    output: output.clone(),
                    next: defer(move || next.with_terminator(replacement.clone())),
                    terminator,
                })
            }
            Node::Await { handler, .. } => {
                let handler = Rc::clone(handler);
                let replacement = terminator.clone();
                receive(terminator, move |input| {
                    handler(input).with_terminator(replacement.clone())
                })
            }
            Node::Effectful { effect, .. } => {
                let replacement = terminator.clone();
                Channel::new(Node::Effectful {
                    effect: F::map::<Self, Self, _>(effect.clone(), move |next| {
                        next.with_terminator(replacement.clone())
                    }),
                    terminator,
                })
            }
            Node::Deferred(_) => {
                let this = self.clone();
                defer(move || this.force().with_terminator(terminator.clone()))
            }
        }
    }

    /// Attach `finalizer` to whichever exit the channel actually takes.
    ///
    /// Reaching `Stop(r)` runs the finalizer and then stops with `r`.
    /// Abandoning the channel at any other node runs the finalizer ahead of
    /// that node's terminator. Either way it runs once per exit taken; the
    /// branches that are never reached never run it.
    ///
    /// Finalizers stacked with `c.finalize(inner).finalize(outer)` run
    /// `inner` then `outer` when `c` stops, since `inner` is part of the
    /// stopping step that `outer` waits for. When the channel is abandoned
    /// they run `outer` then `inner`: each one runs ahead of the terminator it
    /// guards, and `inner` is part of that terminator.
    ///
    /// ```rust
    /// use cochan::*;
    /// use std::{cell::Cell, rc::Rc};
    ///
    /// let closed = Rc::new(Cell::new(0));
    /// let counter = Rc::clone(&closed);
    /// let close = Action::new(move || counter.set(counter.get() + 1));
    ///
    /// let channel: Channel<(), char, Io, u8> = emit(Effectable::pure(1), 'a');
    /// let guarded = channel.finalize(close);
    ///
    /// assert_eq!(handle(guarded.clone(), Recorder::new([])), Ok(Exit::Stopped(1)));
    /// assert_eq!(closed.get(), 1);
    ///
    /// assert_eq!(guarded.terminate().resolve().run(), 1);
    /// assert_eq!(closed.get(), 2);
    /// ```
    pub fn finalize(&self, finalizer: F::Of<()>) -> Self {
        match self.node() {
            Node::Stop(result) => {
                let result = result.clone();
                stop_with(F::map::<(), R, _>(finalizer, move |()| result.clone()))
            }
            Node::Yield {
                output,
                next,
                terminator,
            } => {
                let next = next.clone();
                let terminator = guard(terminator, &finalizer);
                Channel::new(Node::Yield {
                    output: output.clone(),
                    next: defer(move || next.finalize(finalizer.clone())),
                    terminator,
                })
            }
            Node::Await {
                handler,
                terminator,
            } => {
                let handler = Rc::clone(handler);
                receive(guard(terminator, &finalizer), move |input| {
                    handler(input).finalize(finalizer.clone())
                })
            }
            Node::Effectful { effect, terminator } => {
                let terminator = guard(terminator, &finalizer);
                Channel::new(Node::Effectful {
                    effect: F::map::<Self, Self, _>(effect.clone(), move |next| {
                        next.finalize(finalizer.clone())
                    }),
                    terminator,
                })
            }
            Node::Deferred(_) => {
                let this = self.clone();
                defer(move || this.force().finalize(finalizer.clone()))
            }
        }
    }
}

// Runs the finalizer, then resolves the original terminator.
fn guard<F: Effect, R: Value>(
    terminator: &Effectable<F, R>,
    finalizer: &F::Of<()>,
) -> Effectable<F, R> {
    let (terminator, finalizer) = (terminator.clone(), finalizer.clone());
    Effectable::defer(move || {
        Effectable::Effect(F::then::<(), R>(finalizer.clone(), terminator.resolve()))
    })
}
