//! Combining channels together
//!
//! This module extends [`Channel`](crate::Channel) with sequencing, result
//! and I/O transformations, restarting, and finalization. Everything here is
//! an inherent method, so there is nothing to re-export.

pub(crate) mod bound;
mod chain;
mod control;
mod map;
