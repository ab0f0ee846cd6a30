//! Global History Buffer prefetcher library.
//!
//! This crate models a delta-correlation data prefetcher with the following:
//! 1. **History:** A ring buffer of recent accesses chained by instruction pointer and by page.
//! 2. **Learning:** An online table of "delta pair → next delta" correlations with confidence.
//! 3. **Prediction:** A cascade of stride, table, chaining and fallback heuristics.
//! 4. **Synthesis:** Block addresses filtered by a page-crossing policy.
//! 5. **Simulation:** Trace loading, replay, and statistics collection.

/// Common types and constants (geometry, access events, errors).
pub mod common;
/// Prefetcher configuration (defaults, tuning, clamping).
pub mod config;
/// Prefetcher interface and the GHB implementation.
pub mod prefetch;
/// Trace loading and replay.
pub mod sim;
/// Prefetcher statistics collection and reporting.
pub mod stats;

/// Root configuration type; use `GhbConfig::default()` or deserialize from JSON.
pub use crate::config::GhbConfig;
/// Main prefetcher type; construct with `GhbPrefetcher::new`.
pub use crate::prefetch::GhbPrefetcher;
/// Cache-facing prefetcher interface.
pub use crate::prefetch::Prefetcher;
