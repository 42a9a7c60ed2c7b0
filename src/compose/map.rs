//! Transforming channel inputs, outputs, and results.
//!
//! [`Channel::map`] is the functor instance: it rewrites only `Stop` results
//! and the values inside terminators. [`Channel::map_output`] and
//! [`Channel::map_input`] adapt a channel to a pipeline stage with different
//! I/O types and leave terminators alone.
//!
//! `map` is a bind onto `Stop`, so it shares the flat chains of
//! [`Channel::and_then`]. The I/O adapters rebuild the channel lazily, one
//! node at a time as a driver reaches it; each nested application of one of
//! them costs a stack frame when a node is forced.

use std::rc::Rc;

use crate::{
    build::{defer, receive, stop},
    channel::{Channel, Node},
    effect::{Effect, Value},
};

impl<I: Value, O: Value, F: Effect, R: Value> Channel<I, O, F, R> {
    /// Transform the final result, including every terminator's result.
    ///
    /// ```rust
    /// use cochan::*;
    ///
    /// let channel: Channel<(), &str, Identity, i32> = emit(Effectable::pure(1), "a");
    /// let mapped = channel.map(|r| r * 100);
    ///
    /// assert_eq!(mapped.terminate().resolve(), 100);
    /// let mut outputs = mapped.outputs();
    /// assert_eq!(outputs.next(), Some("a"));
    /// assert_eq!(outputs.next(), None);
    /// assert_eq!(outputs.into_return(), Some(Ok(100)));
    /// ```
    pub fn map<R2, K>(&self, f: K) -> Channel<I, O, F, R2>
    where
        R2: Value,
        K: Fn(R) -> R2 + 'static,
    {
        self.and_then(move |result| stop(f(result)))
    }

    /// Transform every emitted output.
    pub fn map_output<O2, K>(&self, f: K) -> Channel<I, O2, F, R>
    where
        O2: Value,
        K: Fn(O) -> O2 + 'static,
    {
        self.map_output_shared(Rc::new(f))
    }

    fn map_output_shared<O2: Value>(&self, f: Rc<dyn Fn(O) -> O2>) -> Channel<I, O2, F, R> {
        match self.node() {
            Node::Stop(result) => stop(result.clone()),
            Node::Yield {
                output,
                next,
                terminator,
            } => {
                let next = next.clone();
                let output = f(output.clone());
                Channel::new(Node::Yield {
                    output,
                    next: defer(move || next.map_output_shared(Rc::clone(&f))),
                    terminator: terminator.clone(),
                })
            }
            Node::Await {
                handler,
                terminator,
            } => {
                let handler = Rc::clone(handler);
                receive(terminator.clone(), move |input| {
                    handler(input).map_output_shared(Rc::clone(&f))
                })
            }
            Node::Effectful { effect, terminator } => Channel::new(Node::Effectful {
                effect: F::map::<Self, Channel<I, O2, F, R>, _>(effect.clone(), move |next| {
                    next.map_output_shared(Rc::clone(&f))
                }),
                terminator: terminator.clone(),
            }),
            Node::Deferred(_) => {
                let this = self.clone();
                defer(move || this.force().map_output_shared(Rc::clone(&f)))
            }
        }
    }

    /// Transform every input before it reaches this channel.
    pub fn map_input<I2, K>(&self, f: K) -> Channel<I2, O, F, R>
    where
        I2: Value,
        K: Fn(I2) -> I + 'static,
    {
        self.map_input_shared(Rc::new(f))
    }

    fn map_input_shared<I2: Value>(&self, f: Rc<dyn Fn(I2) -> I>) -> Channel<I2, O, F, R> {
        match self.node() {
            Node::Stop(result) => stop(result.clone()),
            Node::Yield {
                output,
                next,
                terminator,
            } => {
                let next = next.clone();
                Channel::new(Node::Yield {
                    output: output.clone(),
                    next: defer(move || next.map_input_shared(Rc::clone(&f))),
                    terminator: terminator.clone(),
                })
            }
            Node::Await {
                handler,
                terminator,
            } => {
                let handler = Rc::clone(handler);
                receive(terminator.clone(), move |input| {
                    handler(f(input)).map_input_shared(Rc::clone(&f))
                })
            }
            Node::Effectful { effect, terminator } => Channel::new(Node::Effectful {
                effect: F::map::<Self, Channel<I2, O, F, R>, _>(effect.clone(), move |next| {
                    next.map_input_shared(Rc::clone(&f))
                }),
                terminator: terminator.clone(),
            }),
            Node::Deferred(_) => {
                let this = self.clone();
                defer(move || this.force().map_input_shared(Rc::clone(&f)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        Exit, Recorder, handle,
        build::{effect, emit, receive, stop},
        channel::Channel,
        effect::Identity,
        effectable::Effectable,
    };

    fn echo_twice() -> Channel<i32, i32, Identity, i32> {
        receive(Effectable::pure(-1), |a: i32| {
            let yielded: Channel<i32, i32, Identity, i32> = emit(Effectable::pure(-2), a);
            yielded.and_then(move |_| {
                receive(Effectable::pure(-3), move |b: i32| {
                    effect(Effectable::pure(-4), stop(a + b))
                })
            })
        })
    }

    #[test]
    fn test_map_rewrites_results_and_terminators() {
        let channel = echo_twice().map(|r| r * 10);
        assert_eq!(channel.terminate().resolve(), -10);

        let mut recorder = Recorder::new([1, 2]);
        let exit = handle(channel, &mut recorder).unwrap();
        assert_eq!(exit, Exit::Stopped(30));
        assert_eq!(recorder.outputs(), &[1]);
    }

    #[test]
    fn test_map_output_leaves_results_alone() {
        let channel = echo_twice().map_output(|o| format!("<{o}>"));
        let mut recorder = Recorder::new([5, 6]);
        let exit = handle(channel, &mut recorder).unwrap();

        assert_eq!(exit, Exit::Stopped(11));
        assert_eq!(recorder.outputs(), &["<5>".to_string()]);
    }

    #[test]
    fn test_map_input_preprocesses_every_input() {
        let channel = echo_twice().map_input(|text: &'static str| text.len() as i32);
        assert_eq!(channel.terminate().resolve(), -1);

        let mut recorder = Recorder::new(["abc", "de"]);
        let exit = handle(channel, &mut recorder).unwrap();
        assert_eq!(exit, Exit::Stopped(5));
        assert_eq!(recorder.outputs(), &[3]);
    }

    #[test]
    fn test_map_identity_keeps_terminators() {
        let original = echo_twice();
        let mapped = original.map(|r| r);
        assert_eq!(mapped.terminate().resolve(), original.terminate().resolve());
    }
}
