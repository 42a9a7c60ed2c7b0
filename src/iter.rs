//! Iterator adapter for channels with unit input.
//!
//! [`Channel::outputs`] turns a `Channel<(), O, F, R>` into an iterator over
//! its outputs. Every `Await` is fed `()` and every effect is executed in
//! place, so `F` must implement [`Exec`].
//!
//! Both `Outputs` and `&mut Outputs` implement `Iterator`, so a partially
//! consumed iterator can still be asked for its result, or terminated.
//!
//! ```rust
//! use cochan::*;
//! use either::Either;
//!
//! let naturals: Channel<(), u64, Identity, &str> =
//!     unfold(Effectable::pure("cut short"), 0_u64, |n| Either::Left((n, n + 1)));
//!
//! let mut outputs = naturals.outputs();
//! let firsts: Vec<_> = outputs.by_ref().take(4).collect();
//! assert_eq!(firsts, vec![0, 1, 2, 3]);
//! assert!(!outputs.is_complete());
//! assert_eq!(outputs.terminate(), Ok(Exit::Terminated("cut short")));
//! ```

use tracing::{debug, trace};

use crate::{
    channel::{Channel, Node},
    effect::{Exec, Value},
    handler::Exit,
};

/// Iterator over the outputs of a channel with unit input.
///
/// Stops yielding once the channel stops or one of its effects halts.
pub struct Outputs<O: Value, F: Exec, R: Value> {
    state: OutputsState<O, F, R>,
}

enum OutputsState<O: Value, F: Exec, R: Value> {
    Active(Channel<(), O, F, R>),
    Stopped(R),
    Halted(F::Halt),
}

impl<O: Value, F: Exec, R: Value> Channel<(), O, F, R> {
    /// Iterate over this channel's outputs.
    pub fn outputs(self) -> Outputs<O, F, R> {
        Outputs {
            state: OutputsState::Active(self),
        }
    }
}

impl<O: Value, F: Exec, R: Value> Outputs<O, F, R> {
    /// Check if the channel has stopped.
    pub fn is_complete(&self) -> bool {
        matches!(self.state, OutputsState::Stopped(_))
    }

    /// Check if an effect halted the channel.
    pub fn is_halted(&self) -> bool {
        matches!(self.state, OutputsState::Halted(_))
    }

    /// Consume the iterator and return the channel's result if it has one.
    ///
    /// Returns `None` while the channel is still running, and `Some(Err(_))`
    /// if an effect halted it.
    pub fn into_return(self) -> Option<Result<R, F::Halt>> {
        match self.state {
            OutputsState::Active(_) => None,
            OutputsState::Stopped(result) => Some(Ok(result)),
            OutputsState::Halted(halt) => Some(Err(halt)),
        }
    }

    /// Get a reference to the result if the channel has stopped.
    pub fn return_value(&self) -> Option<&R> {
        match &self.state {
            OutputsState::Stopped(result) => Some(result),
            _ => None,
        }
    }

    /// Finish now, however far iteration got.
    ///
    /// A running channel is abandoned at its current node and that node's
    /// terminator is executed. A stopped channel reports its result.
    pub fn terminate(self) -> Result<Exit<R>, F::Halt> {
        match self.state {
            OutputsState::Active(channel) => {
                debug!("iteration terminated");
                F::exec(channel.terminate().resolve()).map(Exit::Terminated)
            }
            OutputsState::Stopped(result) => Ok(Exit::Stopped(result)),
            OutputsState::Halted(halt) => Err(halt),
        }
    }
}

impl<O: Value, F: Exec, R: Value> Iterator for Outputs<O, F, R> {
    type Item = O;

    fn next(&mut self) -> Option<Self::Item> {
        let OutputsState::Active(channel) = &self.state else {
            return None;
        };
        let mut current = channel.clone();
        loop {
            let next = match current.node() {
                Node::Yield { output, next, .. } => {
                    trace!("iteration yielded");
                    self.state = OutputsState::Active(next.clone());
                    return Some(output.clone());
                }
                Node::Await { handler, .. } => handler(()),
                Node::Effectful { effect, .. } => match F::exec(effect.clone()) {
                    Ok(next) => next,
                    Err(halt) => {
                        debug!("iteration halted");
                        self.state = OutputsState::Halted(halt);
                        return None;
                    }
                },
                Node::Deferred(thunk) => thunk.call(),
                Node::Stop(result) => {
                    debug!("iteration complete");
                    self.state = OutputsState::Stopped(result.clone());
                    return None;
                }
            };
            current = next;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        build::{emit, emit_with, receive, stop, stop_with, unfold},
        effect::{Fallible, Identity},
        effectable::Effectable,
    };
    use either::Either;

    fn letters() -> Channel<(), char, Identity, usize> {
        unfold(Effectable::pure(0), 'a', |c| {
            if c > 'c' { Either::Right(3) } else { Either::Left((c, (c as u8 + 1) as char)) }
        })
    }

    #[test]
    fn test_outputs_collects_then_returns() {
        let mut outputs = letters().outputs();
        assert_eq!(outputs.return_value(), None);
        assert_eq!(outputs.by_ref().collect::<String>(), "abc");
        assert!(outputs.is_complete());
        assert_eq!(outputs.return_value(), Some(&3));
        assert_eq!(outputs.next(), None);
        assert_eq!(outputs.into_return(), Some(Ok(3)));
    }

    #[test]
    fn test_for_loop_with_mut_ref() {
        let mut outputs = letters().outputs();
        let mut seen = Vec::new();
        for c in &mut outputs {
            seen.push(c);
        }
        assert_eq!(seen, vec!['a', 'b', 'c']);
        assert_eq!(outputs.terminate(), Ok(Exit::Stopped(3)));
    }

    #[test]
    fn test_outputs_feeds_unit_to_awaits() {
        let channel: Channel<(), &str, Identity, i32> =
            receive(Effectable::pure(-1), |()| emit(Effectable::pure(-2), "after input"));
        let mut outputs = channel.outputs();
        assert_eq!(outputs.next(), Some("after input"));
        assert_eq!(outputs.next(), None);
        assert_eq!(outputs.into_return(), Some(Ok(-2)));
    }

    #[test]
    fn test_partial_iteration_terminates_at_current_node() {
        let mut outputs = letters().outputs();
        assert_eq!(outputs.next(), Some('a'));
        assert!(outputs.into_return().is_none());

        let mut outputs = letters().outputs();
        assert_eq!(outputs.next(), Some('a'));
        assert_eq!(outputs.terminate(), Ok(Exit::Terminated(0)));
    }

    #[test]
    fn test_outputs_stops_on_halt() {
        let first: Channel<(), u8, Fallible<&str>, ()> = emit_with(Effectable::pure(()), Ok(1));
        let halting: Channel<(), u8, Fallible<&str>, ()> = stop_with(Err("halted"));
        let channel = first.then(&halting).then(&emit(Effectable::pure(()), 2));

        let mut outputs = channel.outputs();
        assert_eq!(outputs.next(), Some(1));
        assert_eq!(outputs.next(), None);
        assert!(outputs.is_halted());
        assert_eq!(outputs.next(), None);
        assert_eq!(outputs.into_return(), Some(Err("halted")));
    }

    #[test]
    fn test_empty_channel() {
        let channel: Channel<(), u8, Identity, &str> = stop("nothing");
        let mut outputs = channel.outputs();
        assert_eq!(outputs.next(), None);
        assert_eq!(outputs.terminate(), Ok(Exit::Stopped("nothing")));
    }
}
