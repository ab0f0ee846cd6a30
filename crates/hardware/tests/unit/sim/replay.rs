//! Replay Driver Tests.
//!
//! Verifies coverage and accuracy accounting against the bounded window of
//! outstanding prefetches, with both scripted and real prefetchers.

use ghb_core::common::addr::LineGeometry;
use ghb_core::common::data::AccessEvent;
use ghb_core::config::GhbConfig;
use ghb_core::prefetch::{GhbPrefetcher, Prefetcher};
use ghb_core::sim::replay::{Replay, ReplayReport};
use pretty_assertions::assert_eq;

use crate::common::harness::strided;
use crate::common::mocks::{FanoutPrefetcher, SilentPrefetcher};

#[test]
fn empty_report_has_zero_ratios() {
    let report = ReplayReport::default();
    assert_eq!(report.coverage(), 0.0);
    assert_eq!(report.accuracy(), 0.0);
}

#[test]
fn silent_prefetcher_covers_nothing() {
    let geo = LineGeometry::default();
    let mut replay = Replay::new(&geo, 8);
    replay.run(&mut SilentPrefetcher, strided(0, 64, 10, None), |_, c| assert!(c.is_empty()));
    let report = replay.into_report();
    assert_eq!(report.accesses, 10);
    assert_eq!(report.covered, 0);
    assert_eq!(report.issued, 0);
}

#[test]
fn demand_hit_on_outstanding_prefetch_is_covered() {
    let geo = LineGeometry::default();
    let mut pf = FanoutPrefetcher::new(0x1000, 3);
    let mut replay = Replay::new(&geo, 8);

    let _ = replay.step(&mut pf, &AccessEvent::new(0x0));
    // Byte address inside the prefetched line still counts.
    let _ = replay.step(&mut pf, &AccessEvent::new(0x2010));

    assert_eq!(
        replay.report(),
        &ReplayReport {
            accesses: 2,
            covered: 1,
            candidates: 6,
            issued: 5,
            redundant: 1,
            evicted_unused: 0,
        }
    );
}

#[test]
fn window_overflow_discards_oldest_prefetch() {
    let geo = LineGeometry::default();
    let mut pf = FanoutPrefetcher::new(0x1000, 3);
    let mut replay = Replay::new(&geo, 2);

    let _ = replay.step(&mut pf, &AccessEvent::new(0x0));
    assert_eq!(replay.report().evicted_unused, 1);

    // 0x1000 was discarded, 0x3000 is still outstanding.
    let _ = replay.step(&mut pf, &AccessEvent::new(0x1000));
    assert_eq!(replay.report().covered, 0);
    let _ = replay.step(&mut pf, &AccessEvent::new(0x3000));
    assert_eq!(replay.report().covered, 1);
}

#[test]
fn zero_window_is_treated_as_one() {
    let geo = LineGeometry::default();
    let mut pf = FanoutPrefetcher::new(64, 1);
    let mut replay = Replay::new(&geo, 0);
    replay.run(&mut pf, strided(0, 64, 4, None), |_, _| {});
    let report = replay.into_report();
    assert_eq!(report.covered, 3);
    assert_eq!(report.accuracy(), 0.75);
}

#[test]
fn ghb_stride_stream_is_covered_after_warmup() {
    let geo = LineGeometry::default();
    let mut pf = GhbPrefetcher::new(GhbConfig::default());
    let mut replay = Replay::new(&geo, 32);
    let mut seen = 0;
    replay.run(&mut pf, strided(0, 64, 21, Some(0x400)), |_, _| seen += 1);
    let report = replay.into_report();

    assert_eq!(seen, 21);
    assert_eq!(report.accesses, 21);
    assert_eq!(report.covered, 19);
    assert!(report.coverage() > 0.85);
    assert!(report.accuracy() > 0.0 && report.accuracy() <= 1.0);
}

#[test]
fn replay_accepts_trait_objects() {
    let geo = LineGeometry::default();
    let mut boxed: Box<dyn Prefetcher> = Box::new(FanoutPrefetcher::new(64, 2));
    let mut replay = Replay::new(&geo, 4);
    replay.run(boxed.as_mut(), strided(0, 64, 3, None), |_, _| {});
    assert_eq!(replay.report().covered, 2);
}
