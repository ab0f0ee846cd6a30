//! Trace replay.
//!
//! Feeds a sequence of accesses through a [`Prefetcher`] and scores it
//! against a bounded window of outstanding prefetches, standing in for the
//! prefetch queue and cache of a real hierarchy:
//! - a demand access whose block is outstanding counts as covered, and the
//!   prefetch is consumed;
//! - a candidate already outstanding counts as redundant;
//! - when the window is full the oldest outstanding prefetch is discarded.

use std::collections::{HashSet, VecDeque};

use serde::Serialize;

use crate::common::addr::MemoryGeometry;
use crate::common::data::{AccessEvent, PrefetchCandidate};
use crate::prefetch::Prefetcher;

/// Coverage and accuracy of one replay.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReplayReport {
    /// Demand accesses replayed.
    pub accesses: u64,
    /// Demand accesses whose block was already prefetched.
    pub covered: u64,
    /// Candidates returned by the prefetcher.
    pub candidates: u64,
    /// Candidates that entered the outstanding window.
    pub issued: u64,
    /// Candidates already outstanding when returned.
    pub redundant: u64,
    /// Outstanding prefetches discarded unused.
    pub evicted_unused: u64,
}

impl ReplayReport {
    /// Fraction of demand accesses that were covered by a prefetch.
    pub fn coverage(&self) -> f64 {
        ratio(self.covered, self.accesses)
    }

    /// Fraction of issued prefetches that were used by a demand access.
    pub fn accuracy(&self) -> f64 {
        ratio(self.covered, self.issued)
    }
}

fn ratio(num: u64, den: u64) -> f64 {
    if den == 0 { 0.0 } else { num as f64 / den as f64 }
}

/// Replays accesses against a prefetcher with an outstanding window.
#[derive(Debug)]
pub struct Replay<'g, G: MemoryGeometry + ?Sized> {
    geometry: &'g G,
    window: usize,
    queue: VecDeque<u64>,
    outstanding: HashSet<u64>,
    report: ReplayReport,
}

impl<'g, G: MemoryGeometry + ?Sized> Replay<'g, G> {
    /// Creates a replay driver.
    ///
    /// # Arguments
    ///
    /// * `geometry` - Used to block-align demand accesses before matching.
    /// * `window` - Maximum outstanding prefetches (at least 1).
    pub fn new(geometry: &'g G, window: usize) -> Self {
        let window = window.max(1);
        Self {
            geometry,
            window,
            queue: VecDeque::with_capacity(window),
            outstanding: HashSet::with_capacity(window),
            report: ReplayReport::default(),
        }
    }

    /// Processes one demand access and returns the prefetcher's candidates.
    pub fn step<P: Prefetcher + ?Sized>(
        &mut self,
        prefetcher: &mut P,
        access: &AccessEvent,
    ) -> Vec<PrefetchCandidate> {
        self.report.accesses += 1;
        let block = self.geometry.block_address(access.addr);
        if self.outstanding.remove(&block) {
            self.report.covered += 1;
            if let Some(pos) = self.queue.iter().position(|&b| b == block) {
                let _ = self.queue.remove(pos);
            }
        }

        let candidates = prefetcher.observe(access);
        self.report.candidates += candidates.len() as u64;
        for candidate in &candidates {
            if !self.outstanding.insert(candidate.addr) {
                self.report.redundant += 1;
                continue;
            }
            self.report.issued += 1;
            self.queue.push_back(candidate.addr);
            while self.queue.len() > self.window {
                let Some(old) = self.queue.pop_front() else {
                    break;
                };
                let _ = self.outstanding.remove(&old);
                self.report.evicted_unused += 1;
            }
        }
        candidates
    }

    /// Replays every access, calling `on_access` with each access and its candidates.
    pub fn run<P, I, F>(&mut self, prefetcher: &mut P, accesses: I, mut on_access: F)
    where
        P: Prefetcher + ?Sized,
        I: IntoIterator<Item = AccessEvent>,
        F: FnMut(&AccessEvent, &[PrefetchCandidate]),
    {
        for access in accesses {
            let candidates = self.step(prefetcher, &access);
            on_access(&access, &candidates);
        }
    }

    /// Results so far.
    pub fn report(&self) -> &ReplayReport {
        &self.report
    }

    /// Consumes the driver and returns its results.
    pub fn into_report(self) -> ReplayReport {
        self.report
    }
}
