//! Delta Pattern Table Tests.
//!
//! Verifies learning from delta windows, confidence arithmetic, deterministic
//! candidate order, and the admission cap.

use ghb_core::prefetch::pattern::{DeltaPair, PatternTable};
use pretty_assertions::assert_eq;

#[test]
fn fewer_than_three_deltas_teach_nothing() {
    let mut table = PatternTable::new(None);
    table.update(&[]);
    table.update(&[64]);
    table.update(&[64, 64]);
    assert!(table.is_empty());
}

#[test]
fn every_window_is_recorded() {
    let mut table = PatternTable::new(None);
    table.update(&[1, 2, 3, 1, 2, 4]);

    let row = table.query(DeltaPair(1, 2)).unwrap();
    assert_eq!(row.total(), 2);
    assert_eq!(row.count(3), 1);
    assert_eq!(row.count(4), 1);
    assert_eq!(row.confidence(3), 50);
    assert_eq!(table.query(DeltaPair(2, 3)).unwrap().count(1), 1);
    assert_eq!(table.query(DeltaPair(3, 1)).unwrap().count(2), 1);
    assert_eq!(table.len(), 3);
}

#[test]
fn unknown_pair_is_none() {
    let table = PatternTable::new(None);
    assert!(table.query(DeltaPair(8, 8)).is_none());
}

#[test]
fn constant_stride_learns_full_confidence() {
    let mut table = PatternTable::new(None);
    table.update(&[8, 8, 8, 8, 8, 8]);
    let row = table.query(DeltaPair(8, 8)).unwrap();
    assert_eq!(row.total(), 4);
    assert_eq!(row.confidence(8), 100);
    assert_eq!(row.best_confidence(), 100);
    assert_eq!(row.distinct(), 1);
}

#[test]
fn confidence_is_integer_percentage() {
    let mut table = PatternTable::new(None);
    for next in [5, 5, 7] {
        table.observe(DeltaPair(1, 1), next);
    }
    let row = table.query(DeltaPair(1, 1)).unwrap();
    assert_eq!(row.confidence(5), 66);
    assert_eq!(row.confidence(7), 33);
    assert_eq!(row.confidence(9), 0);
    assert_eq!(row.best_confidence(), 66);
}

#[test]
fn candidates_iterate_in_ascending_delta_order() {
    let mut table = PatternTable::new(None);
    for next in [64, -128, 8, 64, -8] {
        table.observe(DeltaPair(0, 0), next);
    }
    let row = table.query(DeltaPair(0, 0)).unwrap();
    let order: Vec<i64> = row.candidates().map(|(d, _, _)| d).collect();
    assert_eq!(order, vec![-128, -8, 8, 64]);
    assert_eq!(row.candidates().last(), Some((64, 2, 40)));
}

#[test]
fn capacity_refuses_new_rows_but_known_rows_keep_learning() {
    let mut table = PatternTable::new(Some(1));
    table.observe(DeltaPair(1, 2), 3);
    table.observe(DeltaPair(4, 5), 6);
    assert_eq!(table.len(), 1);
    assert_eq!(table.refused(), 1);
    assert!(table.query(DeltaPair(4, 5)).is_none());

    table.observe(DeltaPair(1, 2), 3);
    assert_eq!(table.query(DeltaPair(1, 2)).unwrap().total(), 2);
    assert_eq!(table.refused(), 1);
}

#[test]
fn zero_capacity_learns_nothing() {
    let mut table = PatternTable::new(Some(0));
    table.update(&[1, 1, 1, 1]);
    assert!(table.is_empty());
    assert_eq!(table.refused(), 2);
}

#[test]
fn clear_resets_rows_and_refusals() {
    let mut table = PatternTable::new(Some(1));
    table.update(&[1, 2, 3, 4]);
    assert_eq!(table.refused(), 1);
    table.clear();
    assert!(table.is_empty());
    assert_eq!(table.refused(), 0);
}
