//! Hardware prefetcher model.
//!
//! This module contains the prefetcher interface and the Global History
//! Buffer (GHB) delta-correlation prefetcher, split into its parts:
//! 1. **Index:** key value → newest history slot, per key-space.
//! 2. **History:** ring buffer of accesses with generation-checked back-links.
//! 3. **Pattern:** online table of delta-pair → next-delta histograms.
//! 4. **Predictor:** strategy cascade producing ranked deltas.
//! 5. **GHB:** per-access controller synthesizing prefetch addresses.

/// Per-access GHB controller.
pub mod ghb;

/// Ring buffer of accesses with per-key back-links.
pub mod history;

/// Key value → most recent slot maps.
pub mod index;

/// Delta correlation table.
pub mod pattern;

/// Prediction strategy cascade.
pub mod predictor;

pub use self::ghb::GhbPrefetcher;
pub use self::history::HistoryBuffer;
pub use self::index::{CorrelationIndex, CorrelationKey};
pub use self::pattern::{DeltaPair, PatternEntry, PatternTable};
pub use self::predictor::{Prediction, PredictionSource, Predictor};

use crate::common::data::{AccessEvent, PrefetchCandidate};

/// Trait for cache prefetcher implementations.
///
/// Prefetchers observe demand accesses and return the addresses they would
/// like fetched ahead of time.
pub trait Prefetcher: Send + Sync {
    /// Observes one access and returns the prefetch candidates it triggers.
    ///
    /// # Arguments
    ///
    /// * `access` - The demand access (raw byte address, optional PC).
    ///
    /// # Returns
    ///
    /// Candidate addresses in issue order. Empty if nothing is predicted.
    fn observe(&mut self, access: &AccessEvent) -> Vec<PrefetchCandidate>;

    /// Discards all learned state (e.g. on a context switch).
    fn reset(&mut self);
}
