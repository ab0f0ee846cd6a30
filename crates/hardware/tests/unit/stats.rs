//! PrefetchStats unit tests.
//!
//! Verifies default initialization, source accounting, derived rates, and the
//! counters a GHB prefetcher maintains while running.

use ghb_core::config::GhbConfig;
use ghb_core::prefetch::{GhbPrefetcher, PredictionSource};
use ghb_core::stats::PrefetchStats;
use pretty_assertions::assert_eq;

use crate::common::harness::{drive, strided};

#[test]
fn default_stats_all_zero() {
    let stats = PrefetchStats::default();
    assert_eq!(stats.accesses, 0);
    assert_eq!(stats.predictions(), 0);
    assert_eq!(stats.prediction_rate(), 0.0);
    assert_eq!(stats.candidates_issued, 0);
    assert_eq!(stats.pattern_rows, 0);
}

#[test]
fn record_source_counts_each_stage() {
    let mut stats = PrefetchStats::default();
    stats.record_source(PredictionSource::Stride);
    stats.record_source(PredictionSource::Stride);
    stats.record_source(PredictionSource::Table);
    stats.record_source(PredictionSource::Fallback);
    stats.accesses = 8;

    assert_eq!(stats.stride_predictions, 2);
    assert_eq!(stats.table_predictions, 1);
    assert_eq!(stats.fallback_predictions, 1);
    assert_eq!(stats.predictions(), 4);
    assert_eq!(stats.prediction_rate(), 0.5);

    stats.clear();
    assert_eq!(stats, PrefetchStats::default());
}

#[test]
fn stride_stream_counters() {
    let mut pf = GhbPrefetcher::new(GhbConfig::default());
    let _ = drive(&mut pf, &strided(0, 64, 5, Some(0x400)));

    let expected = PrefetchStats {
        accesses: 5,
        pc_patterns: 4,
        page_patterns: 4,
        stride_predictions: 3,
        table_predictions: 0,
        fallback_predictions: 1,
        no_prediction: 1,
        candidates_issued: 13,
        dropped_cross_page: 0,
        dropped_overflow: 0,
        pattern_rows: 1,
        pattern_rows_refused: 0,
    };
    assert_eq!(pf.stats(), &expected);
}

#[test]
fn cross_page_drops_are_counted() {
    let mut pf = GhbPrefetcher::new(GhbConfig::default());
    // Stride stream ending on the last line of a page.
    let _ = drive(&mut pf, &strided(4096 - 5 * 64, 64, 5, Some(1)));
    assert!(pf.stats().dropped_cross_page > 0);
}

#[test]
fn stats_serialize_to_json() {
    let value = serde_json::to_value(PrefetchStats::default()).unwrap();
    assert_eq!(value["accesses"], 0);
    assert_eq!(value["pattern_rows_refused"], 0);
}

#[test]
fn printing_does_not_panic() {
    let mut pf = GhbPrefetcher::new(GhbConfig::default());
    let _ = drive(&mut pf, &strided(0, 64, 6, None));
    pf.stats().print();
    pf.stats().print_sections(&["sources".to_string()]);
}
