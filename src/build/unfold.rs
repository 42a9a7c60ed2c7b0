use std::rc::Rc;

use either::Either;

use crate::{
    channel::{Channel, Node},
    effect::{Effect, Value},
    effectable::Effectable,
};

use super::func::{defer, stop};

type StepFn<S, O, R> = Rc<dyn Fn(S) -> Either<(O, S), R>>;

/// Create a generator channel from a seed and a step function.
///
/// `step` returns `Left((output, next_seed))` to emit `output` and keep
/// going, or `Right(result)` to stop. Every emitted node carries `terminator`.
///
/// ```rust
/// use cochan::*;
/// use either::Either;
///
/// let countdown: Channel<(), u32, Identity, &str> =
///     unfold(Effectable::pure("abandoned"), 3_u32, |n| {
///         if n == 0 { Either::Right("liftoff") } else { Either::Left((n, n - 1)) }
///     });
///
/// let mut outputs = countdown.outputs();
/// assert_eq!(outputs.by_ref().collect::<Vec<_>>(), vec![3, 2, 1]);
/// assert_eq!(outputs.into_return(), Some(Ok("liftoff")));
/// ```
pub fn unfold<I, O, F, R, S, K>(terminator: Effectable<F, R>, seed: S, step: K) -> Channel<I, O, F, R>
where
    I: Value,
    O: Value,
    F: Effect,
    R: Value,
    S: Value,
    K: Fn(S) -> Either<(O, S), R> + 'static,
{
    unfold_shared(terminator, seed, Rc::new(step))
}

fn unfold_shared<I, O, F, R, S>(
    terminator: Effectable<F, R>,
    seed: S,
    step: StepFn<S, O, R>,
) -> Channel<I, O, F, R>
where
    I: Value,
    O: Value,
    F: Effect,
    R: Value,
    S: Value,
{
    match step(seed) {
        Either::Left((output, seed)) => {
            let rest = terminator.clone();
            Channel::new(Node::Yield {
                output,
                next: defer(move || unfold_shared(rest.clone(), seed.clone(), Rc::clone(&step))),
                terminator,
            })
        }
        Either::Right(result) => stop(result),
    }
}
