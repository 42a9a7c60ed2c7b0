//! Flat representation of sequenced channels.
//!
//! `c.and_then(f).and_then(g)` does not wrap one lazy rebuild inside another.
//! It becomes a single [`Bound`]: the innermost head channel plus the queue
//! of continuations still to run on its result. Binding a `Bound` again only
//! appends to the queue, and forcing one walks the head and pops
//! continuations in a loop, so the nesting depth of a pipeline never turns
//! into stack depth.
//!
//! Each continuation may change the result type, so inside the queue results
//! travel as [`Erased`] values. Only the end of the chain reveals them again.

use std::{any::Any, rc::Rc};

use crate::{
    build::{defer, receive, stop},
    channel::{Channel, Node, Thunk},
    effect::{Effect, Value},
    effectable::Effectable,
};

/// A result whose type is known only to the continuation consuming it.
#[derive(Clone)]
pub(crate) struct Erased(Rc<dyn Any>);

impl Erased {
    fn new<R: Value>(value: R) -> Self {
        Erased(Rc::new(value))
    }

    fn reveal<R: Value>(&self) -> R {
        match self.0.downcast_ref::<R>() {
            Some(value) => value.clone(),
            None => unreachable!("continuation received a result of another type"),
        }
    }
}

type Cont<I, O, F> = Rc<dyn Fn(Erased) -> Channel<I, O, F, Erased>>;

/// Persistent, catenable queue of continuations.
struct Conts<I: Value, O: Value, F: Effect>(Option<Rc<Link<I, O, F>>>);

enum Link<I: Value, O: Value, F: Effect> {
    One(Cont<I, O, F>),
    // neither side is ever empty
    Join(Conts<I, O, F>, Conts<I, O, F>),
}

impl<I: Value, O: Value, F: Effect> Clone for Conts<I, O, F> {
    fn clone(&self) -> Self {
        Conts(self.0.clone())
    }
}

impl<I: Value, O: Value, F: Effect> Conts<I, O, F> {
    fn empty() -> Self {
        Conts(None)
    }

    fn one(k: Cont<I, O, F>) -> Self {
        Conts(Some(Rc::new(Link::One(k))))
    }

    fn is_empty(&self) -> bool {
        self.0.is_none()
    }

    /// `self` first, then `later`.
    fn then(&self, later: &Self) -> Self {
        if self.is_empty() {
            later.clone()
        } else if later.is_empty() {
            self.clone()
        } else {
            Conts(Some(Rc::new(Link::Join(self.clone(), later.clone()))))
        }
    }

    /// Split off the continuation that runs first.
    ///
    /// Left-leaning joins are rotated to the right on the way down, so
    /// popping a whole queue costs amortized constant time per element.
    fn pop(&self) -> Option<(Cont<I, O, F>, Self)> {
        let mut first = Rc::clone(self.0.as_ref()?);
        let mut rest = Conts::empty();
        loop {
            first = match &*first {
                Link::One(k) => return Some((Rc::clone(k), rest)),
                Link::Join(left, right) => {
                    rest = right.then(&rest);
                    Rc::clone(left.0.as_ref()?)
                }
            };
        }
    }
}

impl<I: Value, O: Value, F: Effect> Drop for Conts<I, O, F> {
    // Unlinks iteratively; a queue can be as long as the pipeline.
    fn drop(&mut self) {
        let mut pending: Vec<Rc<Link<I, O, F>>> = self.0.take().into_iter().collect();
        while let Some(link) = pending.pop() {
            if let Ok(Link::Join(mut left, mut right)) = Rc::try_unwrap(link) {
                pending.extend(left.0.take());
                pending.extend(right.0.take());
            }
        }
    }
}

/// A head channel followed by the continuations bound onto it.
pub(crate) struct Bound<I: Value, O: Value, F: Effect, R: Value> {
    head: Channel<I, O, F, Erased>,
    conts: Conts<I, O, F>,
    reveal: fn(&Erased) -> R,
}

impl<I: Value, O: Value, F: Effect, R: Value> Bound<I, O, F, R> {
    fn into_channel(self) -> Channel<I, O, F, R> {
        Channel::new(Node::Deferred(Thunk::bound(self)))
    }

    /// Run the chain until a node a driver can act on is at the head.
    ///
    /// The returned node's continuations are again `Bound`, carrying the
    /// rest of the queue.
    pub(crate) fn step(&self) -> Channel<I, O, F, R> {
        let reveal = self.reveal;
        let mut head = self.head.clone();
        let mut conts = self.conts.clone();
        loop {
            let next = match head.node() {
                Node::Deferred(thunk) => match thunk.as_bound() {
                    Some(inner) => {
                        conts = inner.conts.then(&conts);
                        inner.head.clone()
                    }
                    None => thunk.call(),
                },
                Node::Stop(value) => match conts.pop() {
                    Some((k, rest)) => {
                        conts = rest;
                        k(value.clone())
                    }
                    None => return stop(reveal(value)),
                },
                Node::Yield { output, next, .. } => {
                    return Channel::new(Node::Yield {
                        output: output.clone(),
                        next: chained(next.clone(), conts.clone(), reveal),
                        terminator: report(head.clone(), conts, reveal),
                    });
                }
                Node::Await { handler, .. } => {
                    let handler = Rc::clone(handler);
                    let terminator = report(head.clone(), conts.clone(), reveal);
                    return receive(terminator, move |input| {
                        chained(handler(input), conts.clone(), reveal)
                    });
                }
                Node::Effectful { effect, .. } => {
                    let terminator = report(head.clone(), conts.clone(), reveal);
                    return Channel::new(Node::Effectful {
                        effect: F::map::<Channel<I, O, F, Erased>, Channel<I, O, F, R>, _>(
                            effect.clone(),
                            move |next| chained(next, conts.clone(), reveal),
                        ),
                        terminator,
                    });
                }
            };
            head = next;
        }
    }
}

fn chained<I: Value, O: Value, F: Effect, R: Value>(
    head: Channel<I, O, F, Erased>,
    conts: Conts<I, O, F>,
    reveal: fn(&Erased) -> R,
) -> Channel<I, O, F, R> {
    Bound {
        head,
        conts,
        reveal,
    }
    .into_channel()
}

// Lazily, so stepping a long chain never walks the queue.
fn report<I: Value, O: Value, F: Effect, R: Value>(
    head: Channel<I, O, F, Erased>,
    conts: Conts<I, O, F>,
    reveal: fn(&Erased) -> R,
) -> Effectable<F, R> {
    Effectable::defer(move || {
        reported(head.clone(), conts.clone()).map(move |value: Erased| reveal(&value))
    })
}

/// What abandoning `head` reports once every continuation has seen it.
///
/// Pure terminators are threaded through the queue in a loop. The first
/// effectful one hands the remaining queue to the host effect.
fn reported<I: Value, O: Value, F: Effect>(
    head: Channel<I, O, F, Erased>,
    conts: Conts<I, O, F>,
) -> Effectable<F, Erased> {
    let mut head = head;
    let mut conts = conts;
    loop {
        let value = match head.node() {
            Node::Deferred(thunk) => {
                let next = match thunk.as_bound() {
                    Some(inner) => {
                        conts = inner.conts.then(&conts);
                        inner.head.clone()
                    }
                    None => thunk.call(),
                };
                head = next;
                continue;
            }
            Node::Stop(value) => Effectable::Pure(value.clone()),
            Node::Yield { terminator, .. }
            | Node::Await { terminator, .. }
            | Node::Effectful { terminator, .. } => terminator.force(),
        };
        let Some((k, rest)) = conts.pop() else {
            return value;
        };
        match value {
            Effectable::Pure(value) => {
                head = k(value);
                conts = rest;
            }
            pending => return pending.and_then(move |value| reported(k(value), rest.clone())),
        }
    }
}

/// View a channel's result as [`Erased`] without changing anything else.
///
/// A chain is reused as is: its final value already holds an `R`. Any other
/// channel is converted one node at a time as it is forced.
fn erase<I: Value, O: Value, F: Effect, R: Value>(
    channel: &Channel<I, O, F, R>,
) -> Channel<I, O, F, Erased> {
    match channel.node() {
        Node::Stop(result) => stop(Erased::new(result.clone())),
        Node::Deferred(thunk) => match thunk.as_bound() {
            Some(bound) => chained(bound.head.clone(), bound.conts.clone(), Erased::clone),
            None => {
                let channel = channel.clone();
                defer(move || erase(&channel.force()))
            }
        },
        Node::Yield {
            output,
            next,
            terminator,
        } => {
            let next = next.clone();
            Channel::new(Node::Yield {
                output: output.clone(),
                next: defer(move || erase(&next)),
                terminator: terminator.map(Erased::new),
            })
        }
        Node::Await {
            handler,
            terminator,
        } => {
            let handler = Rc::clone(handler);
            receive(terminator.map(Erased::new), move |input| {
                erase(&handler(input))
            })
        }
        Node::Effectful { effect, terminator } => Channel::new(Node::Effectful {
            effect: F::map::<Channel<I, O, F, R>, Channel<I, O, F, Erased>, _>(
                effect.clone(),
                |next| erase(&next),
            ),
            terminator: terminator.map(Erased::new),
        }),
    }
}

/// Bind `k` onto `channel`, extending its chain if it already is one.
pub(crate) fn bind<I, O, F, R, R2>(
    channel: &Channel<I, O, F, R>,
    k: Rc<dyn Fn(R) -> Channel<I, O, F, R2>>,
) -> Channel<I, O, F, R2>
where
    I: Value,
    O: Value,
    F: Effect,
    R: Value,
    R2: Value,
{
    let cont: Cont<I, O, F> = Rc::new(move |value: Erased| erase(&k(value.reveal::<R>())));
    let added = Conts::one(cont);
    let (head, conts) = match channel.node() {
        Node::Deferred(thunk) => match thunk.as_bound() {
            Some(bound) => (bound.head.clone(), bound.conts.then(&added)),
            None => (erase(channel), added),
        },
        _ => (erase(channel), added),
    };
    chained(head, conts, Erased::reveal::<R2>)
}
