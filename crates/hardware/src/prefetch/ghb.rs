//! Global History Buffer Prefetcher.
//!
//! Drives one access through the whole pipeline:
//! 1. **Record:** truncate to a block address and insert into the history buffer.
//! 2. **Correlate:** rebuild the PC-keyed and page-keyed delta sequences.
//! 3. **Learn:** feed the available sequences to the pattern table.
//! 4. **Predict:** run the strategy cascade, preferring the PC-keyed sequence.
//! 5. **Synthesize:** turn deltas into block addresses and apply the page filter.
//!
//! # Performance
//!
//! - **Time Complexity:** O(P + D × E) per access, where P is the pattern
//!   length, D the effective degree and E the row width of the table.
//! - **Space Complexity:** O(H + R) where H is the history size and R the
//!   number of learned delta pairs.
//! - **Best Case:** Repeating delta sequences (linked structures walked in a
//!   fixed order, strided loops, stencil sweeps).
//! - **Worst Case:** Random access, where every pair is seen once and nothing
//!   clears the confidence threshold.

use super::Prefetcher;
use super::history::HistoryBuffer;
use super::index::CorrelationKey;
use super::pattern::PatternTable;
use super::predictor::{Prediction, PredictionContext, PredictionInput, Predictor, within};
use crate::common::addr::{LineGeometry, MemoryGeometry};
use crate::common::constants::LINE_SIZE;
use crate::common::data::{AccessEvent, PrefetchCandidate};
use crate::config::{GhbConfig, TuningConfig};
use crate::stats::PrefetchStats;

/// Outcome of turning ranked deltas into prefetch addresses.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Synthesis {
    /// Surviving candidates in issue order.
    pub candidates: Vec<PrefetchCandidate>,
    /// Candidates rejected by the page-crossing policy.
    pub dropped_cross_page: u64,
    /// Candidates whose address would wrap around the address space.
    pub dropped_overflow: u64,
}

/// GHB delta-correlation prefetcher.
#[derive(Debug)]
pub struct GhbPrefetcher<G: MemoryGeometry = LineGeometry> {
    config: GhbConfig,
    geometry: G,
    history: HistoryBuffer,
    patterns: PatternTable,
    predictor: Predictor,
    stats: PrefetchStats,
}

impl GhbPrefetcher<LineGeometry> {
    /// Creates a prefetcher over 64-byte lines and the configured page size.
    pub fn new(config: GhbConfig) -> Self {
        let geometry = LineGeometry::new(LINE_SIZE, config.page_bytes);
        Self::with_geometry(config, geometry)
    }
}

impl<G: MemoryGeometry> GhbPrefetcher<G> {
    /// Creates a prefetcher using the supplied address geometry.
    ///
    /// The configuration is clamped before use.
    pub fn with_geometry(config: GhbConfig, geometry: G) -> Self {
        let config = config.clamped();
        Self {
            history: HistoryBuffer::new(
                config.history_size,
                config.pattern_length,
                config.page_bytes,
                config.use_pc,
            ),
            patterns: PatternTable::new(config.tuning.pattern_table_capacity),
            predictor: Predictor::new(),
            stats: PrefetchStats::default(),
            geometry,
            config,
        }
    }

    /// Effective (clamped) configuration.
    pub fn config(&self) -> &GhbConfig {
        &self.config
    }

    /// Address geometry in use.
    pub fn geometry(&self) -> &G {
        &self.geometry
    }

    /// Statistics collected so far.
    pub fn stats(&self) -> &PrefetchStats {
        &self.stats
    }

    /// Clears the statistics without touching learned state.
    pub fn clear_stats(&mut self) {
        self.stats.clear();
    }

    /// History buffer (read-only).
    pub fn history(&self) -> &HistoryBuffer {
        &self.history
    }

    /// Pattern table (read-only).
    pub fn patterns(&self) -> &PatternTable {
        &self.patterns
    }

    /// Records the access, learns from it and returns the ranked deltas.
    ///
    /// Returns the block address of the access alongside the prediction, or
    /// `None` when there is not yet any related history to predict from.
    pub fn learn_and_predict(&mut self, access: &AccessEvent) -> Option<(u64, Prediction)> {
        self.stats.accesses += 1;

        let block = self.geometry.block_address(access.addr);
        let pc = access.pc.filter(|_| self.config.use_pc);
        let slot = self.history.insert(&AccessEvent { addr: block, pc })?;

        let pc_deltas = if pc.is_some() {
            self.history.chronological(slot, CorrelationKey::Pc)
        } else {
            Vec::new()
        };
        let page_deltas = self.history.chronological(slot, CorrelationKey::Page);

        if !pc_deltas.is_empty() {
            self.stats.pc_patterns += 1;
            self.patterns.update(&pc_deltas);
        }
        if !page_deltas.is_empty() {
            self.stats.page_patterns += 1;
            if page_deltas != pc_deltas {
                self.patterns.update(&page_deltas);
            }
        }
        self.stats.pattern_rows = self.patterns.len() as u64;
        self.stats.pattern_rows_refused = self.patterns.refused();

        let input = match (pc_deltas.is_empty(), page_deltas.is_empty()) {
            (false, false) => PredictionInput {
                primary: pc_deltas.as_slice(),
                secondary: Some(page_deltas.as_slice()),
            },
            (false, true) => PredictionInput::single(&pc_deltas),
            (true, false) => PredictionInput::single(&page_deltas),
            (true, true) => {
                self.stats.no_prediction += 1;
                tracing::trace!(block, slot, "ghb: no correlated history");
                return None;
            }
        };

        let ctx = PredictionContext {
            table: &self.patterns,
            config: &self.config,
        };
        let Some(prediction) = self.predictor.predict(&ctx, &input) else {
            self.stats.no_prediction += 1;
            tracing::trace!(block, slot, "ghb: no prediction");
            return None;
        };

        self.stats.record_source(prediction.source);
        tracing::trace!(
            block,
            slot,
            source = %prediction.source,
            deltas = ?prediction.deltas,
            "ghb: prediction"
        );
        Some((block, prediction))
    }

    /// Processes one access end to end and returns the prefetch candidates.
    pub fn calculate(&mut self, access: &AccessEvent) -> Vec<PrefetchCandidate> {
        let Some((block, prediction)) = self.learn_and_predict(access) else {
            return Vec::new();
        };
        let synthesis =
            synthesize(&self.geometry, &self.config.tuning, block, &prediction.deltas);
        self.stats.dropped_cross_page += synthesis.dropped_cross_page;
        self.stats.dropped_overflow += synthesis.dropped_overflow;
        self.stats.candidates_issued += synthesis.candidates.len() as u64;
        synthesis.candidates
    }

    /// Clears history, both correlation indices, the sequence counter and the
    /// pattern table. Statistics are kept; see [`clear_stats`](Self::clear_stats).
    pub fn reset(&mut self) {
        self.history.reset();
        self.patterns.clear();
        self.stats.pattern_rows = 0;
        tracing::debug!("ghb: state reset");
    }
}

impl<G: MemoryGeometry> Prefetcher for GhbPrefetcher<G> {
    fn observe(&mut self, access: &AccessEvent) -> Vec<PrefetchCandidate> {
        self.calculate(access)
    }

    fn reset(&mut self) {
        Self::reset(self);
    }
}

/// Returns the stride when `deltas` starts as `s, 2s, 3s` (first three checked).
///
/// Requires at least two deltas and `0 < |s| < stride_limit`.
pub fn progression_stride(deltas: &[i64], stride_limit: i64) -> Option<i64> {
    let (&base, rest) = deltas.split_first()?;
    if rest.is_empty() || base == 0 || !within(base, stride_limit) {
        return None;
    }
    rest.iter()
        .take(2)
        .zip(2_i64..)
        .all(|(&d, k)| d == base.saturating_mul(k))
        .then_some(base)
}

/// Turns ranked deltas into block addresses relative to `block`.
///
/// Arithmetic progressions are projected cumulatively (`block + k * stride`);
/// other deltas are applied to `block` independently. A candidate on another
/// page survives only when the progression stride, the delta itself, or a
/// backward delta is small enough per `tuning`.
pub fn synthesize<G: MemoryGeometry + ?Sized>(
    geometry: &G,
    tuning: &TuningConfig,
    block: u64,
    deltas: &[i64],
) -> Synthesis {
    let stride = progression_stride(deltas, tuning.stride_limit);
    let mut out = Synthesis::default();

    for (i, &delta) in deltas.iter().enumerate() {
        if delta == 0 {
            continue;
        }
        let offset = stride.map_or(delta, |s| s.saturating_mul(i as i64 + 1));
        let Some(addr) = block.checked_add_signed(offset) else {
            out.dropped_overflow += 1;
            continue;
        };
        if !geometry.same_page(block, addr) && !may_cross_page(tuning, stride, delta) {
            out.dropped_cross_page += 1;
            continue;
        }
        out.candidates.push(PrefetchCandidate::new(addr));
    }
    out
}

fn may_cross_page(tuning: &TuningConfig, stride: Option<i64>, delta: i64) -> bool {
    stride.is_some_and(|s| within(s, tuning.cross_page_stride_limit))
        || within(delta, tuning.cross_page_delta_limit)
        || (delta < 0 && within(delta, tuning.cross_page_backward_limit))
}
