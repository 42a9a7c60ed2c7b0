//! Building channels from scratch
//!
//! This module provides the node constructors every other combinator is
//! expressed with.

mod func;
mod unfold;

// Re-export building blocks
pub use func::{defer, effect, emit, emit_with, receive, stop, stop_with};
pub use unfold::unfold;
