//! Delta Predictor.
//!
//! Turns a chronological delta sequence into a ranked list of predicted
//! deltas. The work is split into interchangeable strategies tried in order;
//! the first one that proposes anything wins:
//! 1. **Stride run:** an established constant stride is projected forward.
//! 2. **Alternating stride:** an `A, B, A, B` history projects its latest delta.
//! 3. **Table lookup:** learned delta-pair correlations, extended by chaining
//!    and stride amplification.
//! 4. **Fallback:** frequency/recency ranking of recent deltas when nothing
//!    has been learned.
//!
//! The predictor holds no state of its own; everything it reads comes in
//! through [`PredictionContext`] and [`PredictionInput`].

/// Correlation chaining over the pattern table.
pub mod chain;

/// Frequency/recency fallback ranking.
pub mod fallback;

/// Pattern table lookup with adaptive confidence.
pub mod lookup;

/// Stride detection and amplification.
pub mod stride;

use std::cmp::Ordering;
use std::fmt;

use super::pattern::PatternTable;
use crate::config::GhbConfig;

pub use self::fallback::Fallback;
pub use self::lookup::TableLookup;
pub use self::stride::{AlternatingStride, StrideRun};

/// Which cascade stage produced a prediction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PredictionSource {
    /// Constant or alternating stride detected in the delta history.
    Stride,
    /// Learned pattern table correlations.
    Table,
    /// Frequency/recency ranking of recent deltas.
    Fallback,
}

impl fmt::Display for PredictionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stride => write!(f, "stride"),
            Self::Table => write!(f, "table"),
            Self::Fallback => write!(f, "fallback"),
        }
    }
}

/// Shared read-only state every strategy may consult.
#[derive(Debug, Clone, Copy)]
pub struct PredictionContext<'a> {
    /// Learned delta correlations.
    pub table: &'a PatternTable,
    /// Degree, thresholds and tuning knobs.
    pub config: &'a GhbConfig,
}

/// Delta sequences available for one access, oldest delta first.
#[derive(Debug, Clone, Copy)]
pub struct PredictionInput<'a> {
    /// Preferred sequence (instruction-pointer keyed when available).
    pub primary: &'a [i64],
    /// Alternative sequence (page keyed) consulted when the primary has no table evidence.
    pub secondary: Option<&'a [i64]>,
}

impl<'a> PredictionInput<'a> {
    /// Input with a single delta sequence.
    pub const fn single(deltas: &'a [i64]) -> Self {
        Self {
            primary: deltas,
            secondary: None,
        }
    }
}

/// Ranked deltas and the stage that produced them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prediction {
    /// Non-zero deltas, forward deltas first, then by ascending magnitude.
    pub deltas: Vec<i64>,
    /// Producing stage.
    pub source: PredictionSource,
}

/// One stage of the prediction cascade.
pub trait Strategy: fmt::Debug + Send + Sync {
    /// Stage reported when this strategy's proposal is used.
    fn source(&self) -> PredictionSource;

    /// Proposes deltas for the given input; empty means "no opinion".
    fn propose(&self, ctx: &PredictionContext<'_>, input: &PredictionInput<'_>) -> Vec<i64>;
}

/// Ordered cascade of prediction strategies.
#[derive(Debug)]
pub struct Predictor {
    strategies: Vec<Box<dyn Strategy>>,
}

impl Predictor {
    /// Creates the standard cascade: stride run, alternating stride, table lookup, fallback.
    pub fn new() -> Self {
        Self::with_strategies(vec![
            Box::new(StrideRun),
            Box::new(AlternatingStride),
            Box::new(TableLookup),
            Box::new(Fallback),
        ])
    }

    /// Creates a predictor from a custom strategy order.
    pub fn with_strategies(strategies: Vec<Box<dyn Strategy>>) -> Self {
        Self { strategies }
    }

    /// Runs the cascade and returns the first non-empty, ranked proposal.
    pub fn predict(
        &self,
        ctx: &PredictionContext<'_>,
        input: &PredictionInput<'_>,
    ) -> Option<Prediction> {
        self.strategies.iter().find_map(|strategy| {
            let mut deltas = strategy.propose(ctx, input);
            rank(&mut deltas);
            (!deltas.is_empty()).then(|| Prediction {
                deltas,
                source: strategy.source(),
            })
        })
    }

    /// Predicts from a single chronological sequence, returning only the deltas.
    pub fn predict_deltas(
        &self,
        table: &PatternTable,
        config: &GhbConfig,
        chronological: &[i64],
    ) -> Vec<i64> {
        let ctx = PredictionContext { table, config };
        self.predict(&ctx, &PredictionInput::single(chronological))
            .map(|p| p.deltas)
            .unwrap_or_default()
    }
}

impl Default for Predictor {
    fn default() -> Self {
        Self::new()
    }
}

/// Orders forward (positive) deltas first, then smaller magnitudes, then smaller values.
pub fn forward_first(a: &i64, b: &i64) -> Ordering {
    (*a <= 0)
        .cmp(&(*b <= 0))
        .then(a.unsigned_abs().cmp(&b.unsigned_abs()))
        .then(a.cmp(b))
}

/// Drops zero deltas and duplicates, then sorts with [`forward_first`].
pub fn rank(deltas: &mut Vec<i64>) {
    deltas.retain(|&d| d != 0);
    deltas.sort_by(forward_first);
    deltas.dedup();
}

/// Appends `delta` unless it is zero or already present. Returns true if appended.
pub(crate) fn push_unique(predicted: &mut Vec<i64>, delta: i64) -> bool {
    if delta == 0 || predicted.contains(&delta) {
        return false;
    }
    predicted.push(delta);
    true
}

/// Returns true when `|delta| < limit`.
#[inline(always)]
pub(crate) const fn within(delta: i64, limit: i64) -> bool {
    delta.unsigned_abs() < limit.unsigned_abs()
}

/// Returns true when two deltas differ by at most `tolerance`.
#[inline(always)]
pub(crate) const fn close(a: i64, b: i64, tolerance: i64) -> bool {
    a.abs_diff(b) <= tolerance.unsigned_abs()
}
