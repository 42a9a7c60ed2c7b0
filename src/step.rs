use either::Either;

use crate::{
    channel::Suspended,
    effect::{Effect, Value},
};

/// Outcome of resuming a channel: still suspended, or complete with a result.
///
/// [`Channel::resume`](crate::Channel::resume) returns
/// `Step<Suspended<..>, R>`: `Yielded` carries what the channel is waiting
/// on, `Complete` carries the value of the `Stop` node that was reached.
///
/// ```rust
/// use cochan::*;
///
/// let channel: Channel<(), char, Identity, u8> = emit(Effectable::pure(0), 'z');
/// let step = channel.resume();
///
/// assert!(step.is_yielded());
/// assert_eq!(step.output(), Some(&'z'));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Step<Y, D> {
    /// The channel is suspended.
    Yielded(Y),
    /// The channel reached `Stop`.
    Complete(D),
}

impl<Y, D> Step<Y, D> {
    pub const fn is_yielded(&self) -> bool {
        matches!(self, Step::Yielded(_))
    }

    pub const fn is_complete(&self) -> bool {
        matches!(self, Step::Complete(_))
    }

    /// The suspension, if there is one.
    pub fn yielded_value(self) -> Option<Y> {
        self.into_either().left()
    }

    /// The stop result, if the channel finished.
    ///
    /// ```rust
    /// use cochan::*;
    ///
    /// let channel: Channel<(), (), Identity, u8> = stop(3);
    /// assert_eq!(channel.resume().complete_value(), Some(3));
    /// ```
    pub fn complete_value(self) -> Option<D> {
        self.into_either().right()
    }

    pub fn map_yielded<Y2, F>(self, f: F) -> Step<Y2, D>
    where
        F: FnOnce(Y) -> Y2,
    {
        match self {
            Step::Yielded(y) => Step::Yielded(f(y)),
            Step::Complete(d) => Step::Complete(d),
        }
    }

    pub fn map_complete<D2, F>(self, f: F) -> Step<Y, D2>
    where
        F: FnOnce(D) -> D2,
    {
        match self {
            Step::Yielded(y) => Step::Yielded(y),
            Step::Complete(d) => Step::Complete(f(d)),
        }
    }

    /// `Yielded` on the left, `Complete` on the right.
    pub fn into_either(self) -> Either<Y, D> {
        match self {
            Step::Yielded(y) => Either::Left(y),
            Step::Complete(d) => Either::Right(d),
        }
    }
}

impl<Y, D> From<Step<Y, D>> for Either<Y, D> {
    fn from(step: Step<Y, D>) -> Self {
        step.into_either()
    }
}

impl<I: Value, O: Value, F: Effect, R: Value> Step<Suspended<I, O, F, R>, R> {
    /// The output ready to be consumed, if the channel is at a `Yield`.
    pub fn output(&self) -> Option<&O> {
        match self {
            Step::Yielded(Suspended::Yield(output, _)) => Some(output),
            _ => None,
        }
    }

    /// Returns `true` if the channel is waiting for an input.
    pub fn is_awaiting(&self) -> bool {
        matches!(self, Step::Yielded(Suspended::Await(_)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        Channel,
        build::{effect, emit, receive, stop},
        effect::Identity,
        effectable::Effectable,
    };

    type Chan = Channel<u8, &'static str, Identity, u8>;

    #[test]
    fn test_step_shapes_from_channels() {
        let waiting: Chan = receive(Effectable::pure(0), stop);
        let step = waiting.resume();
        assert!(step.is_yielded() && step.is_awaiting());
        assert_eq!(step.output(), None);

        let done: Chan = stop(1);
        let step = done.resume();
        assert!(step.is_complete() && !step.is_awaiting());
        assert_eq!(step.complete_value(), Some(1));
    }

    #[test]
    fn test_output_only_at_yield() {
        let yielding: Chan = emit(Effectable::pure(0), "ready");
        assert_eq!(yielding.resume().output(), Some(&"ready"));

        let effectful: Chan = effect(Effectable::pure(0), yielding);
        assert_eq!(effectful.resume().output(), None);
    }

    #[test]
    fn test_maps_and_either() {
        let yielded: Step<i32, i32> = Step::Yielded(42);
        let complete: Step<i32, i32> = Step::Complete(10);

        assert_eq!(yielded.map_yielded(|x| x + 1), Step::Yielded(43));
        assert_eq!(yielded.map_complete(|x| x + 1), Step::Yielded(42));
        assert_eq!(complete.map_complete(|x| x * 2), Step::Complete(20));
        assert_eq!(yielded.yielded_value(), Some(42));
        assert_eq!(complete.yielded_value(), None);
        assert_eq!(Either::from(complete), Either::Right(10));
    }
}
