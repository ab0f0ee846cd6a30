//! Frequency/recency fallback.
//!
//! Used when neither a stride nor any learned correlation is available. The
//! distinct non-zero deltas of the last `pattern_length` accesses are ranked
//! by `3 * frequency + 2 * recency`, where the newest position scores
//! highest. A top candidate that repeats at the end of the history is
//! treated as a stride instead.

use super::stride::{progression, run_length, trailing_run};
use super::{PredictionContext, PredictionInput, PredictionSource, Strategy, forward_first, push_unique, within};

const FREQUENCY_WEIGHT: u32 = 3;
const RECENCY_WEIGHT: u32 = 2;

/// Frequency/recency ranking strategy.
#[derive(Debug, Clone, Copy, Default)]
pub struct Fallback;

impl Strategy for Fallback {
    fn source(&self) -> PredictionSource {
        PredictionSource::Fallback
    }

    fn propose(&self, ctx: &PredictionContext<'_>, input: &PredictionInput<'_>) -> Vec<i64> {
        let config = ctx.config;
        let deltas = input.primary;
        let ranked = rank_recent(deltas, config.pattern_length);
        let Some(&top) = ranked.first() else {
            return Vec::new();
        };

        let run = trailing_run(deltas);
        if run >= 2 && deltas.last() == Some(&top) && within(top, config.tuning.amplify_limit) {
            return progression(top, run_length(config.degree, run));
        }

        let mut predicted: Vec<i64> = ranked.into_iter().take(config.degree).collect();
        for &delta in deltas.iter().rev() {
            if predicted.len() >= config.degree {
                break;
            }
            let _ = push_unique(&mut predicted, delta);
        }
        predicted
    }
}

/// Ranks the distinct non-zero deltas among the newest `lookback` entries.
///
/// Ties go to forward deltas, then smaller magnitudes.
pub fn rank_recent(chronological: &[i64], lookback: usize) -> Vec<i64> {
    let start = chronological.len().saturating_sub(lookback);
    let window = &chronological[start..];

    // (delta, frequency, recency)
    let mut tally: Vec<(i64, u32, u32)> = Vec::new();
    for (position, &delta) in window.iter().enumerate() {
        if delta == 0 {
            continue;
        }
        let recency = position as u32 + 1;
        match tally.iter_mut().find(|(d, _, _)| *d == delta) {
            Some(entry) => {
                entry.1 += 1;
                entry.2 = entry.2.max(recency);
            }
            None => tally.push((delta, 1, recency)),
        }
    }

    tally.sort_by(|a, b| {
        let score_a = a.1 * FREQUENCY_WEIGHT + a.2 * RECENCY_WEIGHT;
        let score_b = b.1 * FREQUENCY_WEIGHT + b.2 * RECENCY_WEIGHT;
        score_b.cmp(&score_a).then_with(|| forward_first(&a.0, &b.0))
    });
    tally.into_iter().map(|(delta, _, _)| delta).collect()
}
