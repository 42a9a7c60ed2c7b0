//! # Cochan: Terminable Coroutine Channels
//!
//! Build suspendable computations that emit outputs, await inputs and run
//! host effects, and that a driver can abandon at any point and still get a
//! well-defined result from.
//!
//! ## Core Types
//!
//! - **[`Channel<I, O, F, R>`]**: an immutable tree of nodes that yields `O`s,
//!   awaits `I`s, runs effects in `F`, and stops with an `R`
//! - **[`Effectable<F, A>`]**: a fallback value available now, through one
//!   effect, or later
//! - **[`Effect`]**: the host effect context (`Identity`, `Fallible<E>`, `Io`,
//!   or your own)
//!
//! Every node except `Stop` carries a *terminator*: the result to report if
//! the channel is abandoned there. Abandoning a channel is data, not an
//! error: see [`Channel::terminate`].
//!
//! ## Example
//!
//! ```
//! use cochan::*;
//! use either::Either;
//!
//! // Emit 1, 2, 3 then stop with their sum. Abandoning reports -1.
//! let numbers: Channel<(), u32, Identity, i64> =
//!     unfold(Effectable::pure(-1), 1_u32, |n| {
//!         if n > 3 { Either::Right(6) } else { Either::Left((n, n + 1)) }
//!     });
//!
//! let mut recorder = Recorder::new([]);
//! assert_eq!(handle(numbers.clone(), &mut recorder), Ok(Exit::Stopped(6)));
//! assert_eq!(recorder.outputs(), &[1, 2, 3]);
//!
//! // Only take two steps, then walk away.
//! let impatient = Recorder::new([]).with_budget(2);
//! assert_eq!(handle(numbers, impatient), Ok(Exit::Terminated(-1)));
//! ```
//!
//! ## Common Functions
//!
//! **Building Channels:**
//! - [`stop(r)`](stop) / [`stop_with(fr)`](stop_with) - Finish with a result
//! - [`emit(t, o)`](emit) / [`emit_with(t, fo)`](emit_with) - Produce one output
//! - [`receive(t, h)`](receive) - Wait for one input
//! - [`effect(t, fc)`](fn@effect) / [`defer(thunk)`](defer) - Raw effect and deferred nodes
//! - [`unfold(t, seed, step)`](unfold) - Generate outputs from a seed
//!
//! **Composing:**
//! - [`Channel::and_then`], [`Channel::map`], [`Channel::zip_with`] - Sequence and transform
//! - [`Channel::cycle`] - Restart forever
//! - [`Channel::with_terminator`], [`Channel::finalize`] - Control abandonment
//!
//! **Execution:**
//! - [`run(workflow)`](fn@run) / [`run_sync(workflow)`](run_sync) - Interpret a [`Workflow`]
//! - [`handle(channel, responder)`](handle) - Drive with sync responses
//! - [`handle_async(channel, input, output)`](handle_async) - Drive with async responses
//! - [`Channel::outputs`] - Iterate over a channel with unit input

pub mod build;
mod channel;
mod compose;
mod effect;
mod effectable;
mod handler;
mod instances;
mod iter;
pub mod prelude;
mod run;
mod step;

pub use build::*;
pub use channel::*;
pub use effect::*;
pub use effectable::*;
pub use handler::*;
pub use instances::*;
pub use iter::*;
pub use run::*;
pub use step::*;
