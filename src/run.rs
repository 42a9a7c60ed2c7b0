//! Running workflows to a single effect.
//!
//! A [`Workflow`] has no meaningful inputs or outputs, so interpreting it
//! needs no driver: every `Yield` is skipped, every `Await` is fed `()`, and
//! every effect is sequenced into the result.

use tracing::{debug, trace};

use crate::{
    channel::{Node, Workflow},
    effect::{Effect, Exec, Value},
};

/// Interpret a workflow into one computation in `F`.
///
/// Nothing runs until the returned computation does. Each effect node nests
/// one more [`Effect::flat_map`], so for effects that evaluate eagerly, a
/// workflow with very many effect nodes costs stack proportional to their
/// number. [`run_sync`] does not have that limit.
///
/// ```rust
/// use cochan::*;
///
/// let six: Workflow<Fallible<String>, i32> = stop_with(Ok(6));
/// assert_eq!(run(six.and_then(|n| stop_with(Ok(n * 7)))), Ok(42));
///
/// let failed: Workflow<Fallible<String>, i32> = stop_with(Err("no".to_string()));
/// assert_eq!(run(failed.and_then(|n| stop(n + 1))), Err("no".to_string()));
/// ```
pub fn run<F: Effect, R: Value>(workflow: Workflow<F, R>) -> F::Of<R> {
    let mut current = workflow;
    loop {
        let next = match current.node() {
            Node::Stop(result) => return F::pure(result.clone()),
            Node::Yield { next, .. } => next.clone(),
            Node::Await { handler, .. } => handler(()),
            Node::Effectful { effect, .. } => {
                return F::flat_map::<Workflow<F, R>, R, _>(effect.clone(), run::<F, R>);
            }
            Node::Deferred(thunk) => thunk.call(),
        };
        current = next;
    }
}

/// Interpret a workflow by executing each effect in place.
///
/// The loop itself never recurses, and `and_then`/`map` pipelines are
/// flattened as they are forced, so their length or nesting does not grow
/// the stack. Stops at the first effect that halts.
///
/// ```rust
/// use cochan::*;
/// use either::Either;
///
/// let ticks: Workflow<Identity, u32> = unfold(Effectable::pure(0), 0_u32, |n| {
///     if n == 100_000 { Either::Right(n) } else { Either::Left(((), n + 1)) }
/// });
/// assert_eq!(run_sync(ticks), Ok(100_000));
/// ```
pub fn run_sync<F: Exec, R: Value>(workflow: Workflow<F, R>) -> Result<R, F::Halt> {
    let mut current = workflow;
    let mut steps = 0_usize;
    loop {
        let next = match current.node() {
            Node::Stop(result) => {
                debug!(steps, "workflow stopped");
                return Ok(result.clone());
            }
            Node::Yield { next, .. } => {
                steps += 1;
                trace!(steps, "skipping output");
                next.clone()
            }
            Node::Await { handler, .. } => {
                steps += 1;
                trace!(steps, "feeding unit input");
                handler(())
            }
            Node::Effectful { effect, .. } => {
                steps += 1;
                trace!(steps, "executing effect");
                match F::exec(effect.clone()) {
                    Ok(next) => next,
                    Err(halt) => {
                        debug!(steps, "workflow halted");
                        return Err(halt);
                    }
                }
            }
            Node::Deferred(thunk) => thunk.call(),
        };
        current = next;
    }
}
