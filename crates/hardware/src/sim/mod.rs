//! Trace-driven simulation utilities.
//!
//! Provides the access-trace loader and a replay driver that scores a
//! prefetcher's coverage and accuracy over a trace.

/// Trace replay with an outstanding-prefetch window.
pub mod replay;

/// Textual access trace parsing.
pub mod trace;

pub use replay::{Replay, ReplayReport};
pub use trace::{load_trace, parse_trace};
