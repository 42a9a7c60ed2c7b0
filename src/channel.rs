//! The suspendable channel type.
//!
//! A [`Channel<I, O, F, R>`] is an immutable tree of [`Node`]s. Each node
//! either has an output ready, waits for an input, waits for one host effect,
//! defers its own construction, or stops with a result of type `R`.
//!
//! Every node except `Stop` and `Deferred` carries a *terminator*: the
//! [`Effectable`] a driver reports if it abandons the channel at that node
//! instead of continuing. Abandoning is ordinary data flow through
//! [`Channel::terminate`], never an error.
//!
//! Channels share their nodes through [`Rc`], so cloning is cheap and every
//! combinator builds a new channel instead of mutating an existing one.

use std::{fmt, rc::Rc};

use crate::{
    compose::bound::Bound,
    effect::{Effect, Value},
    effectable::Effectable,
    step::Step,
};

/// Receives one input and produces the rest of the channel.
pub type Handler<I, O, F, R> = Rc<dyn Fn(I) -> Channel<I, O, F, R>>;

/// Builds a node on demand.
///
/// Either a closure supplied through [`defer`](crate::defer), or a chain of
/// continuations produced by [`Channel::and_then`] that is flattened as it
/// is forced.
pub struct Thunk<I: Value, O: Value, F: Effect, R: Value>(Delay<I, O, F, R>);

enum Delay<I: Value, O: Value, F: Effect, R: Value> {
    Build(Box<dyn Fn() -> Channel<I, O, F, R>>),
    Chain(Bound<I, O, F, R>),
}

impl<I: Value, O: Value, F: Effect, R: Value> Thunk<I, O, F, R> {
    pub fn new<T>(build: T) -> Self
    where
        T: Fn() -> Channel<I, O, F, R> + 'static,
    {
        Thunk(Delay::Build(Box::new(build)))
    }

    pub(crate) fn bound(chain: Bound<I, O, F, R>) -> Self {
        Thunk(Delay::Chain(chain))
    }

    pub(crate) fn as_bound(&self) -> Option<&Bound<I, O, F, R>> {
        match &self.0 {
            Delay::Chain(chain) => Some(chain),
            Delay::Build(_) => None,
        }
    }

    /// Produce the delayed channel. Runs again on every call.
    pub fn call(&self) -> Channel<I, O, F, R> {
        match &self.0 {
            Delay::Build(build) => build(),
            Delay::Chain(chain) => chain.step(),
        }
    }
}

/// A channel that neither consumes nor produces anything meaningful, meant
/// to be driven to completion with [`run`](fn@crate::run).
pub type Workflow<F, R> = Channel<(), (), F, R>;

/// The five node shapes.
pub enum Node<I: Value, O: Value, F: Effect, R: Value> {
    /// An output is ready; after it is consumed the channel continues with `next`.
    Yield {
        output: O,
        next: Channel<I, O, F, R>,
        terminator: Effectable<F, R>,
    },
    /// Suspended until a driver supplies one input.
    Await {
        handler: Handler<I, O, F, R>,
        terminator: Effectable<F, R>,
    },
    /// Suspended until one host effect has run and produced the continuation.
    Effectful {
        effect: F::Of<Channel<I, O, F, R>>,
        terminator: Effectable<F, R>,
    },
    /// Forcing reveals the real node, which carries its own terminator.
    Deferred(Thunk<I, O, F, R>),
    /// Finished. Forced termination here reports the result itself.
    Stop(R),
}

/// A suspendable, composable unit of effectful stream computation.
pub struct Channel<I: Value, O: Value, F: Effect, R: Value>(Rc<Node<I, O, F, R>>);

/// What a suspended channel is waiting for.
pub enum Suspended<I: Value, O: Value, F: Effect, R: Value> {
    /// `output` must be consumed before continuing with the channel.
    Yield(O, Channel<I, O, F, R>),
    /// An input must be supplied to the handler.
    Await(Handler<I, O, F, R>),
    /// The effect must run to obtain the continuation.
    Effect(F::Of<Channel<I, O, F, R>>),
}

impl<I: Value, O: Value, F: Effect, R: Value> Clone for Channel<I, O, F, R> {
    fn clone(&self) -> Self {
        Channel(Rc::clone(&self.0))
    }
}

impl<I, O, F, R> fmt::Debug for Channel<I, O, F, R>
where
    I: Value,
    O: Value + fmt::Debug,
    F: Effect,
    R: Value + fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.node() {
            Node::Yield { output, .. } => f
                .debug_struct("Yield")
                .field("output", output)
                .finish_non_exhaustive(),
            Node::Await { .. } => f.write_str("Await"),
            Node::Effectful { .. } => f.write_str("Effectful"),
            Node::Deferred(_) => f.write_str("Deferred"),
            Node::Stop(result) => f.debug_tuple("Stop").field(result).finish(),
        }
    }
}

impl<I: Value, O: Value, F: Effect, R: Value> From<Node<I, O, F, R>> for Channel<I, O, F, R> {
    fn from(node: Node<I, O, F, R>) -> Self {
        Channel::new(node)
    }
}

impl<I: Value, O: Value, F: Effect, R: Value> Channel<I, O, F, R> {
    pub fn new(node: Node<I, O, F, R>) -> Self {
        Channel(Rc::new(node))
    }

    /// The node at the head of this channel, without forcing deferrals.
    pub fn node(&self) -> &Node<I, O, F, R> {
        &self.0
    }

    /// Returns `true` if the head node is `Stop`.
    pub fn is_stopped(&self) -> bool {
        matches!(self.node(), Node::Stop(_))
    }

    /// Force `Deferred` nodes until a concrete node is at the head.
    ///
    /// Diverges if the deferrals never bottom out.
    pub fn force(&self) -> Self {
        let mut current = self.clone();
        loop {
            let next = match current.node() {
                Node::Deferred(thunk) => thunk.call(),
                _ => return current,
            };
            current = next;
        }
    }

    /// Inspect what the channel needs next.
    ///
    /// Deferred nodes are forced first. Nothing is consumed: the channel can
    /// be resumed again and reports the same suspension.
    ///
    /// ```rust
    /// use cochan::{Effectable, Identity, Step, Suspended, Channel, emit};
    ///
    /// let channel: Channel<(), &str, Identity, i32> = emit(Effectable::pure(0), "hello");
    /// match channel.resume() {
    ///     Step::Yielded(Suspended::Yield(output, next)) => {
    ///         assert_eq!(output, "hello");
    ///         assert_eq!(next.resume().complete_value(), Some(0));
    ///     }
    ///     _ => unreachable!(),
    /// }
    /// ```
    pub fn resume(&self) -> Step<Suspended<I, O, F, R>, R> {
        let mut current = self.clone();
        loop {
            let next = match current.node() {
                Node::Yield { output, next, .. } => {
                    return Step::Yielded(Suspended::Yield(output.clone(), next.clone()));
                }
                Node::Await { handler, .. } => {
                    return Step::Yielded(Suspended::Await(Rc::clone(handler)));
                }
                Node::Effectful { effect, .. } => {
                    return Step::Yielded(Suspended::Effect(effect.clone()));
                }
                Node::Stop(result) => return Step::Complete(result.clone()),
                Node::Deferred(thunk) => thunk.call(),
            };
            current = next;
        }
    }

    /// The result to report if a driver abandons the channel here.
    ///
    /// Reads the head node's terminator without looking at its continuation,
    /// forcing through `Deferred` nodes. A `Stop` node reports its own result.
    pub fn terminate(&self) -> Effectable<F, R> {
        let mut current = self.clone();
        loop {
            let next = match current.node() {
                Node::Yield { terminator, .. }
                | Node::Await { terminator, .. }
                | Node::Effectful { terminator, .. } => return terminator.clone(),
                Node::Stop(result) => return Effectable::Pure(result.clone()),
                Node::Deferred(thunk) => thunk.call(),
            };
            current = next;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        build::{defer, effect, emit, receive, stop},
        effect::Identity,
    };

    type Chan = Channel<i32, &'static str, Identity, i32>;

    #[test]
    fn test_resume_reports_each_shape() {
        let yielding: Chan = emit(Effectable::pure(1), "out");
        assert!(matches!(
            yielding.resume(),
            Step::Yielded(Suspended::Yield("out", _))
        ));

        let awaiting: Chan = receive(Effectable::pure(2), |x| stop(x * 10));
        match awaiting.resume() {
            Step::Yielded(Suspended::Await(handler)) => {
                assert_eq!(handler(4).resume().complete_value(), Some(40));
            }
            _ => panic!("expected an await"),
        }

        let effectful: Chan = effect(Effectable::pure(3), stop(9));
        match effectful.resume() {
            Step::Yielded(Suspended::Effect(next)) => {
                assert_eq!(next.resume().complete_value(), Some(9));
            }
            _ => panic!("expected an effect"),
        }

        let stopped: Chan = stop(5);
        assert_eq!(stopped.resume().complete_value(), Some(5));
    }

    #[test]
    fn test_resume_forces_nested_deferrals() {
        let channel: Chan = defer(|| defer(|| defer(|| stop(11))));
        assert!(matches!(channel.node(), Node::Deferred(_)));
        assert!(channel.force().is_stopped());
        assert_eq!(channel.resume().complete_value(), Some(11));
    }

    #[test]
    fn test_terminate_reads_head_terminator_only() {
        let inner: Chan = receive(Effectable::pure(-1), stop);
        let channel: Chan = Channel::new(Node::Yield {
            output: "first",
            next: inner,
            terminator: Effectable::pure(7),
        });
        assert_eq!(channel.terminate().resolve(), 7);

        let deferred: Chan = defer(move || channel.clone());
        assert_eq!(deferred.terminate().resolve(), 7);
    }

    #[test]
    fn test_terminate_on_stop_reports_result() {
        let channel: Chan = stop(3);
        assert_eq!(channel.terminate().resolve(), 3);
        assert!(channel.terminate().is_pure());
    }

    #[test]
    fn test_resume_does_not_consume() {
        let channel: Chan = emit(Effectable::pure(0), "again");
        let first = channel.resume().map_yielded(|_| ()).is_yielded();
        let second = channel.resume().map_yielded(|_| ()).is_yielded();
        assert!(first && second);
    }

    #[test]
    fn test_debug_shows_head() {
        let channel: Chan = emit(Effectable::pure(0), "shown");
        assert_eq!(format!("{channel:?}"), "Yield { output: \"shown\", .. }");
        assert_eq!(format!("{:?}", stop::<i32, &str, Identity, i32>(4)), "Stop(4)");
    }
}
