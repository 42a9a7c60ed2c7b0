//! Commonly used imports
//!
//! Use `use cochan::prelude::*;` for quick access to the most common types and functions.

// Core types
pub use crate::{Channel, Effectable, Exit, Step, Suspended, Workflow};

// Effect contexts
pub use crate::{Action, Effect, Exec, Fallible, Identity, Io};

// Most common constructors
pub use crate::build::{emit, receive, stop, stop_with, unfold};

// Combining
pub use crate::Monoid;

// Execution
pub use crate::{Recorder, Responder, handle, handle_async, run, run_sync};
