//! Delta Pattern Table.
//!
//! Learns which delta tends to follow an ordered pair of consecutive deltas.
//! Each row is keyed by `(d0, d1)` and holds a histogram of the deltas that
//! came next, plus the row total. Learning is purely additive: counters only
//! grow (saturating) until the table is cleared.
//!
//! Histograms are ordered maps so that every walk over candidate deltas is
//! deterministic.

use std::collections::{BTreeMap, HashMap};

/// Ordered pair of consecutive deltas, oldest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeltaPair(pub i64, pub i64);

/// Histogram of deltas observed after one delta pair.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatternEntry {
    counts: BTreeMap<i64, u32>,
    total: u32,
}

impl PatternEntry {
    /// Records one occurrence of `next`.
    fn record(&mut self, next: i64) {
        let count = self.counts.entry(next).or_insert(0);
        *count = count.saturating_add(1);
        self.total = self.total.saturating_add(1);
    }

    /// Total observations of this pair.
    #[inline]
    pub fn total(&self) -> u32 {
        self.total
    }

    /// Occurrences of `delta` after this pair.
    #[inline]
    pub fn count(&self, delta: i64) -> u32 {
        self.counts.get(&delta).copied().unwrap_or(0)
    }

    /// Percentage of observations followed by `delta` (integer, 0-100).
    #[inline]
    pub fn confidence(&self, delta: i64) -> u32 {
        percent(self.count(delta), self.total)
    }

    /// Highest confidence of any next-delta in this row.
    pub fn best_confidence(&self) -> u32 {
        self.counts
            .values()
            .map(|&count| percent(count, self.total))
            .max()
            .unwrap_or(0)
    }

    /// Iterates `(delta, count, confidence)` in ascending delta order.
    pub fn candidates(&self) -> impl Iterator<Item = (i64, u32, u32)> + '_ {
        self.counts
            .iter()
            .map(move |(&delta, &count)| (delta, count, percent(count, self.total)))
    }

    /// Number of distinct next-deltas observed.
    pub fn distinct(&self) -> usize {
        self.counts.len()
    }
}

#[inline]
fn percent(count: u32, total: u32) -> u32 {
    if total == 0 {
        0
    } else {
        ((u64::from(count) * 100) / u64::from(total)) as u32
    }
}

/// Table of learned delta correlations.
#[derive(Debug, Clone, Default)]
pub struct PatternTable {
    rows: HashMap<DeltaPair, PatternEntry>,
    capacity: Option<usize>,
    refused: u64,
}

impl PatternTable {
    /// Creates an empty table.
    ///
    /// # Arguments
    ///
    /// * `capacity` - Maximum number of rows; `None` for unbounded growth.
    ///   Once full, observations of unseen pairs are dropped while known
    ///   pairs keep learning.
    pub fn new(capacity: Option<usize>) -> Self {
        Self {
            rows: HashMap::new(),
            capacity,
            refused: 0,
        }
    }

    /// Learns from a chronological (oldest first) delta sequence.
    ///
    /// For every window `[d[i], d[i+1], d[i+2]]` the pair `(d[i], d[i+1])`
    /// records `d[i+2]` as its successor. Sequences shorter than three deltas
    /// teach nothing.
    pub fn update(&mut self, chronological: &[i64]) {
        for window in chronological.windows(3) {
            self.observe(DeltaPair(window[0], window[1]), window[2]);
        }
    }

    /// Records that `pair` was followed by `next`.
    pub fn observe(&mut self, pair: DeltaPair, next: i64) {
        if let Some(entry) = self.rows.get_mut(&pair) {
            entry.record(next);
            return;
        }
        if self.capacity.is_some_and(|cap| self.rows.len() >= cap) {
            self.refused += 1;
            if self.refused == 1 {
                tracing::debug!(rows = self.rows.len(), "pattern table full, refusing new rows");
            }
            return;
        }
        self.rows.entry(pair).or_default().record(next);
    }

    /// Returns the histogram for `pair`, or `None` if it was never observed.
    #[inline]
    pub fn query(&self, pair: DeltaPair) -> Option<&PatternEntry> {
        self.rows.get(&pair)
    }

    /// Number of learned pairs.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if nothing has been learned.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Observations dropped because the table was at capacity.
    pub fn refused(&self) -> u64 {
        self.refused
    }

    /// Forgets every row and the refusal count.
    pub fn clear(&mut self) {
        self.rows.clear();
        self.refused = 0;
    }
}
