use std::rc::Rc;

use crate::{
    channel::{Channel, Node, Thunk},
    effect::{Effect, Value},
    effectable::Effectable,
};

/// Create a channel that has already finished with `result`.
///
/// ```rust
/// use cochan::*;
///
/// let done: Workflow<Identity, u32> = stop(7);
/// assert_eq!(run(done), 7);
/// ```
pub fn stop<I: Value, O: Value, F: Effect, R: Value>(result: R) -> Channel<I, O, F, R> {
    Channel::new(Node::Stop(result))
}

/// Create a channel that runs `result` and stops with its value.
///
/// Abandoning it before the effect ran reports the same effect, so forced
/// and voluntary termination agree.
pub fn stop_with<I: Value, O: Value, F: Effect, R: Value>(result: F::Of<R>) -> Channel<I, O, F, R> {
    Channel::new(Node::Effectful {
        effect: F::map::<R, Channel<I, O, F, R>, _>(result.clone(), stop),
        terminator: Effectable::Effect(result),
    })
}

/// Create a channel suspended on one input.
///
/// ```rust
/// use cochan::*;
///
/// let doubler: Channel<i32, (), Identity, i32> =
///     receive(Effectable::pure(0), |x: i32| stop(x * 2));
/// let Step::Yielded(Suspended::Await(handler)) = doubler.resume() else {
///     unreachable!()
/// };
/// assert_eq!(handler(21).resume().complete_value(), Some(42));
/// ```
pub fn receive<I, O, F, R, H>(terminator: Effectable<F, R>, handler: H) -> Channel<I, O, F, R>
where
    I: Value,
    O: Value,
    F: Effect,
    R: Value,
    H: Fn(I) -> Channel<I, O, F, R> + 'static,
{
    Channel::new(Node::Await {
        handler: Rc::new(handler),
        terminator,
    })
}

/// Emit exactly one output, then stop with the terminator's value.
///
/// With a pure terminator the continuation is a plain `Stop`; otherwise the
/// terminator is resolved and run as the final step.
pub fn emit<I: Value, O: Value, F: Effect, R: Value>(
    terminator: Effectable<F, R>,
    output: O,
) -> Channel<I, O, F, R> {
    let next = match &terminator {
        Effectable::Pure(result) => stop(result.clone()),
        _ => {
            let terminator = terminator.clone();
            defer(move || stop_with(terminator.resolve()))
        }
    };
    Channel::new(Node::Yield {
        output,
        next,
        terminator,
    })
}

/// Like [`emit`], but the output is produced by running an effect first.
pub fn emit_with<I: Value, O: Value, F: Effect, R: Value>(
    terminator: Effectable<F, R>,
    output: F::Of<O>,
) -> Channel<I, O, F, R> {
    let deferred = terminator.clone();
    effect(
        terminator,
        F::map::<O, Channel<I, O, F, R>, _>(output, move |o| emit(deferred.clone(), o)),
    )
}

/// Create a channel suspended on one host effect producing the continuation.
pub fn effect<I: Value, O: Value, F: Effect, R: Value>(
    terminator: Effectable<F, R>,
    continuation: F::Of<Channel<I, O, F, R>>,
) -> Channel<I, O, F, R> {
    Channel::new(Node::Effectful {
        effect: continuation,
        terminator,
    })
}

/// Delay building a channel until a driver looks at it.
///
/// The thunk runs every time the node is forced.
pub fn defer<I, O, F, R, T>(thunk: T) -> Channel<I, O, F, R>
where
    I: Value,
    O: Value,
    F: Effect,
    R: Value,
    T: Fn() -> Channel<I, O, F, R> + 'static,
{
    Channel::new(Node::Deferred(Thunk::new(thunk)))
}
