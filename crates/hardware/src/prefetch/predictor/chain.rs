//! Correlation chaining.
//!
//! Walks the pattern table forward from the current predictions: the pair
//! (previous delta, latest prediction) is looked up as if it had already been
//! observed, and its most confident successor becomes the next prediction.
//! This reaches further ahead than a single table lookup can.

use super::{forward_first, push_unique};
use crate::config::TuningConfig;
use crate::prefetch::pattern::{DeltaPair, PatternTable};

/// Minimum threshold for the first link of a chain.
const FIRST_LINK_FLOOR: u32 = 25;

/// Minimum threshold for every later link.
const LATER_LINK_FLOOR: u32 = 20;

/// Later links relax the lookup threshold by this many points.
const LATER_LINK_RELAX: u32 = 10;

/// Chain attempts allowed per slot of the target degree.
const LINKS_PER_SLOT: usize = 3;

/// Extends `predicted` by chaining through the table until it holds `target` deltas.
///
/// The first link uses `(last_delta, predicted[0])`; each later link uses the
/// two newest entries of `predicted`. Chaining stops at the first pair with
/// no row, with fewer than `min_pattern_total` observations, or without a new
/// successor above the link threshold.
///
/// # Arguments
///
/// * `table` - Learned correlations.
/// * `tuning` - Supplies `min_pattern_total`.
/// * `last_delta` - Newest observed delta.
/// * `predicted` - Predictions so far; must be non-empty for chaining to start.
/// * `target` - Desired prediction count.
/// * `threshold` - Lowest adaptive threshold seen during lookup.
pub fn extend(
    table: &PatternTable,
    tuning: &TuningConfig,
    last_delta: i64,
    predicted: &mut Vec<i64>,
    target: usize,
    threshold: u32,
) {
    if predicted.is_empty() {
        return;
    }
    let max_links = target.saturating_mul(LINKS_PER_SLOT);

    for link in 0..max_links {
        if predicted.len() >= target {
            break;
        }
        let n = predicted.len();
        let (prev, base) = if link == 0 {
            (last_delta, predicted[0])
        } else if n > 1 {
            (predicted[n - 2], predicted[n - 1])
        } else {
            (last_delta, predicted[n - 1])
        };

        let Some(entry) = table.query(DeltaPair(prev, base)) else {
            break;
        };
        if entry.total() < tuning.min_pattern_total {
            break;
        }

        let link_threshold = if link == 0 {
            threshold.max(FIRST_LINK_FLOOR)
        } else {
            threshold.saturating_sub(LATER_LINK_RELAX).max(LATER_LINK_FLOOR)
        };

        let next = entry
            .candidates()
            .filter(|&(delta, _, confidence)| {
                confidence >= link_threshold && delta != 0 && !predicted.contains(&delta)
            })
            .max_by(|a, b| a.2.cmp(&b.2).then_with(|| forward_first(&b.0, &a.0)))
            .map(|(delta, _, _)| delta);

        match next {
            Some(delta) => {
                let _ = push_unique(predicted, delta);
            }
            None => break,
        }
    }
}
