//! Test Harness.
//!
//! Builders for synthetic access streams and a helper that routes `tracing`
//! output through the test writer so it only shows up for failing tests.

use ghb_core::common::data::{AccessEvent, PrefetchCandidate};
use ghb_core::prefetch::Prefetcher;
use tracing_subscriber::EnvFilter;

/// Installs a test-writer subscriber once per process. Later calls are no-ops.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// `count` accesses from `base` in steps of `stride` bytes, all issued by `pc`.
pub fn strided(base: u64, stride: i64, count: usize, pc: Option<u64>) -> Vec<AccessEvent> {
    (0..count as i64)
        .map(|k| AccessEvent {
            addr: base.wrapping_add_signed(stride * k),
            pc,
        })
        .collect()
}

/// Accesses that apply `deltas` cyclically starting at `base`, all issued by `pc`.
///
/// Yields `count` accesses; the first is `base` itself.
pub fn cyclic(base: u64, deltas: &[i64], count: usize, pc: Option<u64>) -> Vec<AccessEvent> {
    let mut addr = base;
    let mut out = Vec::with_capacity(count);
    for i in 0..count {
        if i > 0 {
            addr = addr.wrapping_add_signed(deltas[(i - 1) % deltas.len()]);
        }
        out.push(AccessEvent { addr, pc });
    }
    out
}

/// Feeds every access to `prefetcher` and collects the candidate addresses per access.
pub fn drive<P: Prefetcher + ?Sized>(prefetcher: &mut P, accesses: &[AccessEvent]) -> Vec<Vec<u64>> {
    accesses
        .iter()
        .map(|access| addrs(&prefetcher.observe(access)))
        .collect()
}

/// Candidate addresses in issue order.
pub fn addrs(candidates: &[PrefetchCandidate]) -> Vec<u64> {
    candidates.iter().map(|c| c.addr).collect()
}
