//! Pattern table lookup.
//!
//! Looks up the most recent delta pair (and the two pairs before it as
//! supporting evidence) and keeps the next-deltas whose confidence clears an
//! adaptive threshold. The threshold drops as a pair accumulates
//! observations. The result is then extended by correlation chaining and
//! stride amplification up to an effective degree that grows with the
//! confidence of the most recent pair.
//!
//! # Performance
//!
//! - **Time Complexity:** O(D × E) where D is the effective degree and E the
//!   number of distinct next-deltas in the rows touched.

use super::{
    PredictionContext, PredictionInput, PredictionSource, Strategy, chain, forward_first,
    push_unique, stride,
};
use crate::prefetch::pattern::{DeltaPair, PatternEntry};

/// Lenient top-up passes never go below this confidence.
const LENIENT_FLOOR: u32 = 25;

/// Secondary pairs need this many observations to take part in the top-up pass.
const SECONDARY_MIN_TOTAL: u32 = 3;

/// Score multiplier for candidates coming from the most recent pair.
const PRIMARY_WEIGHT: u32 = 5;

/// Number of pairs consulted: the most recent one plus two older ones.
const LOOKBACK_PAIRS: usize = 3;

/// Pattern-table driven strategy.
#[derive(Debug, Clone, Copy, Default)]
pub struct TableLookup;

impl Strategy for TableLookup {
    fn source(&self) -> PredictionSource {
        PredictionSource::Table
    }

    fn propose(&self, ctx: &PredictionContext<'_>, input: &PredictionInput<'_>) -> Vec<i64> {
        let predicted = lookup(ctx, input.primary);
        if !predicted.is_empty() {
            return predicted;
        }
        match input.secondary {
            Some(secondary) if secondary != input.primary => lookup(ctx, secondary),
            _ => predicted,
        }
    }
}

/// Extra score for next-deltas seen often in absolute terms.
const fn frequency_bonus(count: u32) -> u32 {
    if count >= 5 {
        8
    } else if count >= 3 {
        3
    } else {
        0
    }
}

/// Delta pairs ending at the newest delta, newest first.
fn recent_pairs(chronological: &[i64]) -> Vec<DeltaPair> {
    let n = chronological.len();
    (0..LOOKBACK_PAIRS)
        .filter_map(|back| n.checked_sub(2 + back))
        .map(|i| DeltaPair(chronological[i], chronological[i + 1]))
        .collect()
}

/// Full table-driven prediction for one chronological sequence.
///
/// Returns an unranked list; the cascade ranks it.
pub fn lookup(ctx: &PredictionContext<'_>, chronological: &[i64]) -> Vec<i64> {
    let config = ctx.config;
    let tuning = &config.tuning;
    let Some(&last) = chronological.last() else {
        return Vec::new();
    };
    let pairs = recent_pairs(chronological);
    if pairs.is_empty() {
        return Vec::new();
    }

    let rows: Vec<Option<&PatternEntry>> = pairs
        .iter()
        .map(|&pair| {
            ctx.table
                .query(pair)
                .filter(|entry| entry.total() >= tuning.min_pattern_total)
        })
        .collect();

    let mut best_threshold = config.confidence_threshold;
    let mut primary_strength = None;
    let mut scored: Vec<(i64, u32)> = Vec::new();

    for (rank, entry) in rows.iter().enumerate() {
        let Some(entry) = entry else {
            continue;
        };
        let threshold = tuning.adaptive_threshold(config.confidence_threshold, entry.total());
        best_threshold = best_threshold.min(threshold);

        if rank == 0 {
            let best = entry.best_confidence();
            if best >= threshold {
                primary_strength = Some((best, entry.total()));
            }
        }

        let weight = if rank == 0 { PRIMARY_WEIGHT } else { 1 };
        for (delta, count, confidence) in entry.candidates() {
            if delta == 0 || confidence < threshold {
                continue;
            }
            let score = (confidence + frequency_bonus(count)) * weight;
            match scored.iter_mut().find(|(d, _)| *d == delta) {
                Some(existing) => existing.1 = existing.1.max(score),
                None => scored.push((delta, score)),
            }
        }
    }

    if scored.is_empty() {
        return Vec::new();
    }
    scored.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| forward_first(&a.0, &b.0)));

    let target = primary_strength.map_or_else(
        || config.degree.saturating_add(tuning.baseline_degree_boost),
        |(confidence, total)| tuning.effective_degree(config.degree, confidence, total),
    );

    let mut predicted: Vec<i64> = scored.iter().take(target).map(|&(d, _)| d).collect();

    // Lenient top-up: the most recent pair first, then well-observed older pairs.
    for (rank, entry) in rows.iter().enumerate() {
        if predicted.len() >= target {
            break;
        }
        let Some(entry) = entry else {
            continue;
        };
        let (relax, min_total) = if rank == 0 {
            (10, 0)
        } else {
            (5, SECONDARY_MIN_TOTAL)
        };
        if entry.total() < min_total {
            continue;
        }
        let lenient = best_threshold.saturating_sub(relax).max(LENIENT_FLOOR);
        for (delta, _, confidence) in entry.candidates() {
            if predicted.len() >= target {
                break;
            }
            if confidence >= lenient {
                let _ = push_unique(&mut predicted, delta);
            }
        }
    }

    chain::extend(ctx.table, tuning, last, &mut predicted, target, best_threshold);
    stride::amplify(&mut predicted, chronological, target, tuning);
    predicted
}
