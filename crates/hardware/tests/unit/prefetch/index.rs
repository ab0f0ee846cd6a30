//! Correlation Index Tests.

use ghb_core::prefetch::index::{CorrelationIndex, CorrelationKey};

#[test]
fn key_spaces_have_distinct_positions() {
    assert_eq!(CorrelationKey::Pc.index(), 0);
    assert_eq!(CorrelationKey::Page.index(), 1);
    assert_eq!(CorrelationKey::ALL, [CorrelationKey::Pc, CorrelationKey::Page]);
}

#[test]
fn update_returns_previous_holder() {
    let mut index = CorrelationIndex::new();
    assert_eq!(index.update(0x400, 3), None);
    assert_eq!(index.update(0x400, 7), Some(3));
    assert_eq!(index.get(0x400), Some(7));
    assert_eq!(index.len(), 1);
}

#[test]
fn remove_if_slot_only_removes_matching_mapping() {
    let mut index = CorrelationIndex::new();
    let _ = index.update(1, 5);
    assert!(!index.remove_if_slot(1, 4));
    assert_eq!(index.get(1), Some(5));
    assert!(index.remove_if_slot(1, 5));
    assert_eq!(index.get(1), None);
    assert!(!index.remove_if_slot(1, 5));
}

#[test]
fn clear_empties_index() {
    let mut index = CorrelationIndex::new();
    let _ = index.update(1, 0);
    let _ = index.update(2, 1);
    index.clear();
    assert!(index.is_empty());
}
