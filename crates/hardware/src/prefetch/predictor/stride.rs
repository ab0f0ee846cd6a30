//! Stride detection and amplification.
//!
//! A stride is a non-zero delta that repeats at the end of the history. The
//! longer the run, the further ahead the progression `s, 2s, 3s, ...` is
//! projected, up to a ceiling tied to the configured degree. A history that
//! alternates between two deltas projects the most recent one a few steps.

use super::{PredictionContext, PredictionInput, PredictionSource, Strategy, close, within};
use crate::config::TuningConfig;

/// Number of identical deltas at the end of `deltas` (0 for an empty slice).
pub fn trailing_run(deltas: &[i64]) -> usize {
    let Some(&last) = deltas.last() else {
        return 0;
    };
    deltas.iter().rev().take_while(|&&d| d == last).count()
}

/// Progression length for a stride observed `run` times in a row.
///
/// At least `degree`, growing with the run but capped at `degree` for runs
/// of two, `degree + 1` for three, `degree + 2` for four or five, and
/// `2 * degree` (never less than `degree + 2`) beyond that.
pub fn run_length(degree: usize, run: usize) -> usize {
    let ceiling = match run {
        0..=2 => degree,
        3 => degree.saturating_add(1),
        4 | 5 => degree.saturating_add(2),
        _ => degree.saturating_mul(2).max(degree.saturating_add(2)),
    };
    run.max(degree).min(ceiling)
}

/// `stride, 2*stride, ..., count*stride`, saturating at the i64 range.
pub fn progression(stride: i64, count: usize) -> Vec<i64> {
    (1..=count as i64).map(|k| stride.saturating_mul(k)).collect()
}

/// Projects an established constant stride.
///
/// Fires when the last two deltas of the primary sequence are equal,
/// non-zero and smaller than `stride_limit`.
#[derive(Debug, Clone, Copy, Default)]
pub struct StrideRun;

impl Strategy for StrideRun {
    fn source(&self) -> PredictionSource {
        PredictionSource::Stride
    }

    fn propose(&self, ctx: &PredictionContext<'_>, input: &PredictionInput<'_>) -> Vec<i64> {
        let deltas = input.primary;
        let [.., prev, last] = deltas else {
            return Vec::new();
        };
        if prev != last || *last == 0 || !within(*last, ctx.config.tuning.stride_limit) {
            return Vec::new();
        }
        let count = run_length(ctx.config.degree, trailing_run(deltas));
        progression(*last, count)
    }
}

/// Longest progression projected from an alternating history.
pub const ALTERNATING_DEPTH: usize = 3;

/// Projects the latest delta of an `A, B, A, B` history.
///
/// Fires when the last four deltas alternate between two different values
/// and the latest is non-zero and smaller than `stride_limit`. Emits
/// `last, 2*last, ...` up to `min(degree, ALTERNATING_DEPTH)` deltas.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlternatingStride;

impl Strategy for AlternatingStride {
    fn source(&self) -> PredictionSource {
        PredictionSource::Stride
    }

    fn propose(&self, ctx: &PredictionContext<'_>, input: &PredictionInput<'_>) -> Vec<i64> {
        let [.., a0, b0, a1, b1] = input.primary else {
            return Vec::new();
        };
        if a0 != a1 || b0 != b1 || a1 == b1 {
            return Vec::new();
        }
        if *b1 == 0 || !within(*b1, ctx.config.tuning.stride_limit) {
            return Vec::new();
        }
        progression(*b1, ctx.config.degree.min(ALTERNATING_DEPTH))
    }
}

/// Tops up `predicted` with multiples of a stride until it holds `target` deltas.
///
/// Two sources of stride are tried in order:
/// 1. A prediction within tolerance of the last observed delta: appends
///    `p * (i + 1)` for each free slot `i`, stopping at the first duplicate.
/// 2. The last observed delta itself, if it repeats (within tolerance) in the
///    preceding five deltas: appends `d, 2d, ...`, skipping duplicates.
///
/// Strides at or above `amplify_limit` are never amplified.
pub fn amplify(
    predicted: &mut Vec<i64>,
    chronological: &[i64],
    target: usize,
    tuning: &TuningConfig,
) {
    let tol = tuning.stride_tolerance;
    let n = chronological.len();
    if predicted.len() >= target || n < 2 {
        return;
    }
    let last = chronological[n - 1];

    let matched = predicted
        .iter()
        .copied()
        .find(|&p| p != 0 && close(p, last, tol) && within(p, tuning.amplify_limit));
    if let Some(stride) = matched {
        while predicted.len() < target {
            let next = stride.saturating_mul(predicted.len() as i64 + 1);
            if predicted.iter().any(|&e| close(e, next, tol)) {
                break;
            }
            predicted.push(next);
        }
    }

    if predicted.len() >= target || n < 3 || last == 0 || !within(last, tuning.amplify_limit) {
        return;
    }
    let repeats = chronological[..n - 1]
        .iter()
        .rev()
        .take(5)
        .take_while(|&&d| close(d, last, tol))
        .count();
    if repeats == 0 {
        return;
    }
    let slots = target - predicted.len();
    for k in 1..=slots as i64 {
        if predicted.len() >= target {
            break;
        }
        let next = last.saturating_mul(k);
        if !predicted.iter().any(|&e| close(e, next, tol)) {
            predicted.push(next);
        }
    }
}
