//! Functions for driving channels.
//!
//! A driver walks a channel node by node. At every `Yield` it hands the
//! output to a [`Responder`], at every `Await` it asks the responder for an
//! input, and at every `Effectful` node it executes the effect in place.
//! Whenever the responder answers [`ControlFlow::Break`], the driver abandons
//! the channel right there and reports that node's terminator instead, so
//! the caller always gets a result back.

use crate::{
    channel::{Channel, Node},
    effect::{Exec, Value},
};
use std::{collections::VecDeque, future::Future, ops::ControlFlow};
use tracing::{debug, trace};

/// How a driven channel finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Exit<R> {
    /// The channel reached `Stop` on its own.
    Stopped(R),
    /// The driver abandoned the channel and resolved a terminator.
    Terminated(R),
}

impl<R> Exit<R> {
    pub fn is_stopped(&self) -> bool {
        matches!(self, Exit::Stopped(_))
    }

    pub fn is_terminated(&self) -> bool {
        matches!(self, Exit::Terminated(_))
    }

    /// The result, however it was reached.
    pub fn into_inner(self) -> R {
        match self {
            Exit::Stopped(result) | Exit::Terminated(result) => result,
        }
    }

    pub fn map<R2, F>(self, f: F) -> Exit<R2>
    where
        F: FnOnce(R) -> R2,
    {
        match self {
            Exit::Stopped(result) => Exit::Stopped(f(result)),
            Exit::Terminated(result) => Exit::Terminated(f(result)),
        }
    }
}

/// The outside world as seen by a synchronous driver.
///
/// Returning [`ControlFlow::Break`] from any method abandons the channel at
/// the node being handled.
pub trait Responder<I, O> {
    /// Supply the input an `Await` node is waiting for.
    fn input(&mut self) -> ControlFlow<(), I>;

    /// Consume the output of a `Yield` node.
    fn output(&mut self, output: O) -> ControlFlow<()>;

    /// Decide whether the next effect may run.
    fn effect(&mut self) -> ControlFlow<()> {
        ControlFlow::Continue(())
    }
}

impl<I, O, FI, FO> Responder<I, O> for (FI, FO)
where
    FI: FnMut() -> ControlFlow<(), I>,
    FO: FnMut(O) -> ControlFlow<()>,
{
    fn input(&mut self) -> ControlFlow<(), I> {
        (self.0)()
    }

    fn output(&mut self, output: O) -> ControlFlow<()> {
        (self.1)(output)
    }
}

impl<I, O, P> Responder<I, O> for &mut P
where
    P: Responder<I, O> + ?Sized,
{
    fn input(&mut self) -> ControlFlow<(), I> {
        (**self).input()
    }

    fn output(&mut self, output: O) -> ControlFlow<()> {
        (**self).output(output)
    }

    fn effect(&mut self) -> ControlFlow<()> {
        (**self).effect()
    }
}

/// A responder replaying scripted inputs and recording every output.
///
/// It breaks once its inputs run out, or once it has handled `budget`
/// steps. Every `Yield`, `Await` and `Effectful` node counts as one step.
///
/// ```rust
/// use cochan::*;
///
/// let doubler: Channel<i32, i32, Identity, &str> =
///     receive(Effectable::pure("no input"), |x: i32| emit(Effectable::pure("abandoned"), x * 2))
///         .then(&stop("done"));
///
/// let mut recorder = Recorder::new([21]);
/// assert_eq!(handle(doubler.clone(), &mut recorder), Ok(Exit::Stopped("done")));
/// assert_eq!(recorder.outputs(), &[42]);
///
/// let starved = Recorder::new([]);
/// assert_eq!(handle(doubler, starved), Ok(Exit::Terminated("no input")));
/// ```
#[derive(Debug, Clone)]
pub struct Recorder<I, O> {
    inputs: VecDeque<I>,
    outputs: Vec<O>,
    budget: Option<usize>,
    steps: usize,
}

impl<I, O> Recorder<I, O> {
    pub fn new(inputs: impl IntoIterator<Item = I>) -> Self {
        Recorder {
            inputs: inputs.into_iter().collect(),
            outputs: Vec::new(),
            budget: None,
            steps: 0,
        }
    }

    /// Break once `budget` steps have been handled.
    pub fn with_budget(mut self, budget: usize) -> Self {
        self.budget = Some(budget);
        self
    }

    pub fn outputs(&self) -> &[O] {
        &self.outputs
    }

    pub fn into_outputs(self) -> Vec<O> {
        self.outputs
    }

    /// Steps handled so far.
    pub fn steps(&self) -> usize {
        self.steps
    }

    fn take_step(&mut self) -> ControlFlow<()> {
        if self.budget.is_some_and(|budget| self.steps >= budget) {
            return ControlFlow::Break(());
        }
        self.steps += 1;
        ControlFlow::Continue(())
    }
}

impl<I, O> Responder<I, O> for Recorder<I, O> {
    fn input(&mut self) -> ControlFlow<(), I> {
        self.take_step()?;
        match self.inputs.pop_front() {
            Some(input) => ControlFlow::Continue(input),
            None => ControlFlow::Break(()),
        }
    }

    fn output(&mut self, output: O) -> ControlFlow<()> {
        self.take_step()?;
        self.outputs.push(output);
        ControlFlow::Continue(())
    }

    fn effect(&mut self) -> ControlFlow<()> {
        self.take_step()
    }
}

/// Drive a channel until it stops or the responder breaks.
///
/// Effects are executed in place with [`Exec::exec`]; an effect that halts
/// ends the drive with that halt. The drive loop does not recurse; see
/// [`run_sync`](crate::run_sync) for which compositions stay flat.
///
/// ```rust
/// use cochan::*;
/// use std::ops::ControlFlow;
///
/// let echo: Channel<&str, String, Identity, usize> =
///     receive(Effectable::pure(0), |name: &str| {
///         emit(Effectable::pure(name.len()), format!("hello {name}"))
///     });
///
/// let mut seen = Vec::new();
/// let exit = handle(echo, (
///     || ControlFlow::Continue("world"),
///     |line: String| {
///         seen.push(line);
///         ControlFlow::Continue(())
///     },
/// ));
/// assert_eq!(exit, Ok(Exit::Stopped(5)));
/// assert_eq!(seen, vec!["hello world".to_string()]);
/// ```
pub fn handle<I, O, F, R, P>(channel: Channel<I, O, F, R>, mut responder: P) -> Result<Exit<R>, F::Halt>
where
    I: Value,
    O: Value,
    F: Exec,
    R: Value,
    P: Responder<I, O>,
{
    let mut current = channel;
    let mut steps = 0_usize;
    loop {
        let next = match current.node() {
            Node::Stop(result) => {
                debug!(steps, "channel stopped");
                return Ok(Exit::Stopped(result.clone()));
            }
            Node::Yield { output, next, .. } => {
                trace!(steps, "channel yielded");
                match responder.output(output.clone()) {
                    ControlFlow::Continue(()) => next.clone(),
                    ControlFlow::Break(()) => return abandon(&current, steps),
                }
            }
            Node::Await { handler, .. } => {
                trace!(steps, "channel awaiting input");
                match responder.input() {
                    ControlFlow::Continue(input) => handler(input),
                    ControlFlow::Break(()) => return abandon(&current, steps),
                }
            }
            Node::Effectful { effect, .. } => {
                trace!(steps, "channel awaiting effect");
                match responder.effect() {
                    ControlFlow::Continue(()) => F::exec(effect.clone())
                        .inspect_err(|_| debug!(steps, "effect halted"))?,
                    ControlFlow::Break(()) => return abandon(&current, steps),
                }
            }
            Node::Deferred(thunk) => {
                current = thunk.call();
                continue;
            }
        };
        steps += 1;
        current = next;
    }
}

/// Async version of [`handle`].
///
/// Inputs and output acknowledgements are produced by futures; effects are
/// still executed in place.
pub async fn handle_async<I, O, F, R, In, InFut, Out, OutFut>(
    channel: Channel<I, O, F, R>,
    mut input: In,
    mut output: Out,
) -> Result<Exit<R>, F::Halt>
where
    I: Value,
    O: Value,
    F: Exec,
    R: Value,
    In: FnMut() -> InFut,
    InFut: Future<Output = ControlFlow<(), I>>,
    Out: FnMut(O) -> OutFut,
    OutFut: Future<Output = ControlFlow<()>>,
{
    let mut current = channel;
    let mut steps = 0_usize;
    loop {
        let next = match current.node() {
            Node::Stop(result) => {
                debug!(steps, "channel stopped");
                return Ok(Exit::Stopped(result.clone()));
            }
            Node::Yield { output: value, next, .. } => match output(value.clone()).await {
                ControlFlow::Continue(()) => next.clone(),
                ControlFlow::Break(()) => return abandon(&current, steps),
            },
            Node::Await { handler, .. } => match input().await {
                ControlFlow::Continue(value) => handler(value),
                ControlFlow::Break(()) => return abandon(&current, steps),
            },
            Node::Effectful { effect, .. } => {
                F::exec(effect.clone()).inspect_err(|_| debug!(steps, "effect halted"))?
            }
            Node::Deferred(thunk) => {
                current = thunk.call();
                continue;
            }
        };
        steps += 1;
        current = next;
    }
}

fn abandon<I, O, F, R>(channel: &Channel<I, O, F, R>, steps: usize) -> Result<Exit<R>, F::Halt>
where
    I: Value,
    O: Value,
    F: Exec,
    R: Value,
{
    debug!(steps, "channel terminated");
    F::exec(channel.terminate().resolve()).map(Exit::Terminated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        build::{effect, emit, emit_with, receive, stop, stop_with},
        effect::{Action, Fallible, Identity, Io},
        effectable::Effectable,
    };
    use pretty_assertions::assert_eq;
    use std::cell::{Cell, RefCell};
    use std::future::{Future, ready};
    use std::rc::Rc;
    use std::sync::Arc;
    use std::task::{Context, Poll, Wake, Waker};

    fn block_on<F: Future>(future: F) -> F::Output {
        struct Noop;
        impl Wake for Noop {
            fn wake(self: Arc<Self>) {}
        }

        let waker = Waker::from(Arc::new(Noop));
        let mut context = Context::from_waker(&waker);
        let mut future = Box::pin(future);

        loop {
            match Future::poll(future.as_mut(), &mut context) {
                Poll::Ready(value) => return value,
                Poll::Pending => std::thread::yield_now(),
            }
        }
    }

    // Sums inputs until it sees 0, echoing each running total.
    fn summer(total: i32) -> Channel<i32, i32, Identity, i32> {
        receive(Effectable::pure(total), move |x: i32| {
            if x == 0 {
                stop(total)
            } else {
                let echoed: Channel<i32, i32, Identity, i32> = emit(Effectable::pure(total + x), total + x);
                echoed.and_then(summer)
            }
        })
    }

    #[test]
    fn test_handle_feeds_inputs_and_records_outputs() {
        let mut recorder = Recorder::new([1, 2, 3, 0]);
        let exit = handle(summer(0), &mut recorder);
        assert_eq!(exit, Ok(Exit::Stopped(6)));
        assert_eq!(recorder.outputs(), &[1, 3, 6]);
        assert_eq!(recorder.steps(), 7);
    }

    #[test]
    fn test_handle_terminates_when_inputs_run_out() {
        let mut recorder = Recorder::new([4, 5]);
        let exit = handle(summer(0), &mut recorder);
        assert_eq!(exit, Ok(Exit::Terminated(9)));
        assert_eq!(recorder.into_outputs(), vec![4, 9]);
    }

    #[test]
    fn test_budget_abandons_at_current_node() {
        let recorder = Recorder::new([4, 5, 0]).with_budget(1);
        assert_eq!(handle(summer(0), recorder), Ok(Exit::Terminated(4)));

        let recorder = Recorder::new([4, 5, 0]).with_budget(0);
        assert_eq!(handle(summer(0), recorder), Ok(Exit::Terminated(0)));
    }

    #[test]
    fn test_handle_with_closure_pair() {
        let seen = RefCell::new(Vec::new());
        let mut inputs = vec![0, 7, 3].into_iter().rev();
        let exit = handle(
            summer(10),
            (
                || inputs.next().map_or(ControlFlow::Break(()), ControlFlow::Continue),
                |o: i32| {
                    seen.borrow_mut().push(o);
                    ControlFlow::Continue(())
                },
            ),
        );
        assert_eq!(exit, Ok(Exit::Stopped(20)));
        assert_eq!(seen.into_inner(), vec![13, 20]);
    }

    #[test]
    fn test_output_break_reports_yield_terminator() {
        let channel: Channel<(), &str, Identity, &str> = emit(Effectable::pure("at yield"), "x");
        let exit = handle(channel, (|| ControlFlow::Continue(()), |_: &str| ControlFlow::Break(())));
        assert_eq!(exit, Ok(Exit::Terminated("at yield")));
    }

    #[test]
    fn test_handle_executes_effects_in_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let note = |text: &'static str| {
            let log = Rc::clone(&log);
            Action::new(move || {
                log.borrow_mut().push(text);
                text
            })
        };
        let first: Channel<(), &str, Io, ()> = emit_with(Effectable::pure(()), note("effect a"));
        let channel = first.then(&emit_with(Effectable::pure(()), note("effect b")));

        let mut recorder = Recorder::new([]);
        assert_eq!(handle(channel, &mut recorder), Ok(Exit::Stopped(())));
        assert_eq!(recorder.outputs(), &["effect a", "effect b"]);
        assert_eq!(*log.borrow(), vec!["effect a", "effect b"]);
    }

    #[test]
    fn test_handle_propagates_halt() {
        let reached = Rc::new(Cell::new(false));
        let flag = Rc::clone(&reached);
        let failing: Channel<(), u8, Fallible<String>, u8> = stop_with(Err("disk full".to_string()));
        let channel = failing.and_then(move |n| {
            flag.set(true);
            stop(n)
        });

        assert_eq!(handle(channel, Recorder::new([])), Err("disk full".to_string()));
        assert!(!reached.get());
    }

    #[test]
    fn test_handle_propagates_halt_from_terminator() {
        let channel: Channel<(), u8, Fallible<&str>, u8> =
            emit(Effectable::effect(Err("cleanup failed")), 1);
        assert_eq!(handle(channel, Recorder::new([]).with_budget(0)), Err("cleanup failed"));
    }

    #[test]
    fn test_effect_break_skips_effect() {
        let hits = Rc::new(Cell::new(0));
        let counter = Rc::clone(&hits);
        let channel: Channel<(), (), Io, i32> = effect(
            Effectable::pure(-1),
            Action::new(move || {
                counter.set(counter.get() + 1);
                stop(1)
            }),
        );

        assert_eq!(handle(channel.clone(), Recorder::new([]).with_budget(0)), Ok(Exit::Terminated(-1)));
        assert_eq!(hits.get(), 0);
        assert_eq!(handle(channel, Recorder::new([])), Ok(Exit::Stopped(1)));
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn test_handle_async() {
        let mut inputs = vec![2, 2, 0].into_iter();
        let mut seen = Vec::new();
        let exit = block_on(handle_async(
            summer(1),
            || ready(inputs.next().map_or(ControlFlow::Break(()), ControlFlow::Continue)),
            |o| {
                seen.push(o);
                ready(ControlFlow::Continue(()))
            },
        ));
        assert_eq!(exit, Ok(Exit::Stopped(5)));
        assert_eq!(seen, vec![3, 5]);
    }

    #[test]
    fn test_handle_async_terminates_on_break() {
        let exit = block_on(handle_async(
            summer(0),
            || ready(ControlFlow::Continue(8)),
            |_| ready(ControlFlow::Break(())),
        ));
        assert_eq!(exit, Ok(Exit::Terminated(8)));
    }

    #[test]
    fn test_exit_accessors() {
        let stopped = Exit::Stopped(2);
        let terminated = Exit::Terminated(3).map(|r| r * 2);
        assert!(stopped.is_stopped() && !stopped.is_terminated());
        assert!(terminated.is_terminated());
        assert_eq!(terminated.into_inner(), 6);
    }
}
