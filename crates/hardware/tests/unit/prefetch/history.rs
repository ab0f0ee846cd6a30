//! History Buffer Tests.
//!
//! Verifies slot allocation, sequence numbering, eviction of index entries on
//! wraparound, and that delta reconstruction never follows a recycled slot.

use ghb_core::common::data::AccessEvent;
use ghb_core::prefetch::history::HistoryBuffer;
use ghb_core::prefetch::index::CorrelationKey;
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn buffer(size: usize) -> HistoryBuffer {
    HistoryBuffer::new(size, 8, 4096, true)
}

// ══════════════════════════════════════════════════════════
// 1. Allocation and sequence numbers
// ══════════════════════════════════════════════════════════

#[test]
fn inserts_up_to_capacity_get_distinct_slots_and_increasing_sequences() {
    let mut hb = buffer(8);
    let mut slots = Vec::new();
    let mut last_seq = 0;
    for i in 0..8 {
        let slot = hb.insert(&AccessEvent::with_pc(i * 64, 0x400)).unwrap();
        let seq = hb.sequence_of(slot).unwrap();
        assert!(seq > last_seq, "sequence numbers strictly increase");
        assert!(!slots.contains(&slot), "slot {slot} handed out twice");
        last_seq = seq;
        slots.push(slot);
    }
    assert_eq!(hb.len(), 8);
}

#[test]
fn empty_buffer_reports_empty() {
    let hb = buffer(4);
    assert!(hb.is_empty());
    assert_eq!(hb.next_sequence(), 1);
    assert_eq!(hb.address_of(0), None);
}

#[test]
fn insert_past_capacity_evicts_oldest_and_its_index_entries() {
    let mut hb = buffer(4);
    // Oldest access: unique PC and unique page.
    let oldest = hb.insert(&AccessEvent::with_pc(0x10_0000, 0xdead)).unwrap();
    for i in 0..3 {
        let _ = hb.insert(&AccessEvent::with_pc(0x2000 + i * 64, 0x400));
    }
    assert_eq!(hb.index_lookup(CorrelationKey::Pc, 0xdead), Some(oldest));
    assert_eq!(hb.index_lookup(CorrelationKey::Page, 0x10_0000 / 4096), Some(oldest));

    let slot = hb.insert(&AccessEvent::with_pc(0x2000 + 3 * 64, 0x400)).unwrap();
    assert_eq!(slot, oldest, "the oldest slot is recycled first");
    assert!(hb.is_wrapped());
    assert_eq!(hb.index_lookup(CorrelationKey::Pc, 0xdead), None);
    assert_eq!(hb.index_lookup(CorrelationKey::Page, 0x10_0000 / 4096), None);
    assert_eq!(hb.index_lookup(CorrelationKey::Pc, 0x400), Some(slot));
}

#[test]
fn eviction_keeps_newer_mapping_for_shared_key() {
    let mut hb = buffer(2);
    let _ = hb.insert(&AccessEvent::with_pc(0x0, 0x400));
    let newer = hb.insert(&AccessEvent::with_pc(0x40, 0x400)).unwrap();
    // Recycles the first slot; the PC mapping must still point at `newer`
    // until the new access re-links it.
    let _ = hb.insert(&AccessEvent::new(0x9000));
    assert_eq!(hb.index_lookup(CorrelationKey::Pc, 0x400), Some(newer));
}

// ══════════════════════════════════════════════════════════
// 2. Pattern reconstruction
// ══════════════════════════════════════════════════════════

#[test]
fn build_pattern_walks_same_pc_most_recent_first() {
    let mut hb = buffer(16);
    let _ = hb.insert(&AccessEvent::with_pc(0x1000, 0x400));
    let _ = hb.insert(&AccessEvent::with_pc(0x8000, 0x500));
    let _ = hb.insert(&AccessEvent::with_pc(0x1040, 0x400));
    let _ = hb.insert(&AccessEvent::with_pc(0x8080, 0x500));
    let slot = hb.insert(&AccessEvent::with_pc(0x1100, 0x400)).unwrap();

    assert_eq!(hb.build_pattern(slot, CorrelationKey::Pc), vec![0xc0, 0x40]);
    assert_eq!(hb.chronological(slot, CorrelationKey::Pc), vec![0x40, 0xc0]);
}

#[test]
fn build_pattern_produces_negative_deltas() {
    let mut hb = buffer(4);
    let _ = hb.insert(&AccessEvent::with_pc(0x2000, 1));
    let slot = hb.insert(&AccessEvent::with_pc(0x1fc0, 1)).unwrap();
    assert_eq!(hb.build_pattern(slot, CorrelationKey::Pc), vec![-64]);
}

#[test]
fn build_pattern_is_capped_at_pattern_length() {
    let mut hb = HistoryBuffer::new(32, 3, 4096, true);
    let mut slot = 0;
    for i in 0..10 {
        slot = hb.insert(&AccessEvent::with_pc(i * 64, 7)).unwrap();
    }
    assert_eq!(hb.build_pattern(slot, CorrelationKey::Pc), vec![64, 64, 64]);
}

#[test]
fn huge_pattern_length_is_bounded_by_the_buffer() {
    let mut hb = HistoryBuffer::new(4, usize::MAX, 4096, true);
    let mut slot = 0;
    for i in 0..10 {
        slot = hb.insert(&AccessEvent::with_pc(i * 64, 7)).unwrap();
    }
    assert_eq!(hb.build_pattern(slot, CorrelationKey::Pc), vec![64, 64, 64]);
    assert_eq!(hb.chronological(slot, CorrelationKey::Pc).len(), 3);
}

#[test]
fn first_access_has_no_pattern() {
    let mut hb = buffer(4);
    let slot = hb.insert(&AccessEvent::with_pc(0x1000, 1)).unwrap();
    assert!(hb.build_pattern(slot, CorrelationKey::Pc).is_empty());
    assert!(hb.build_pattern(slot, CorrelationKey::Page).is_empty());
}

#[test]
fn missing_pc_is_still_a_page_anchor() {
    let mut hb = buffer(4);
    let _ = hb.insert(&AccessEvent::new(0x3000));
    let slot = hb.insert(&AccessEvent::new(0x3080)).unwrap();
    assert!(hb.build_pattern(slot, CorrelationKey::Pc).is_empty());
    assert_eq!(hb.build_pattern(slot, CorrelationKey::Page), vec![0x80]);
}

#[test]
fn pc_ignored_when_disabled() {
    let mut hb = HistoryBuffer::new(4, 8, 4096, false);
    let _ = hb.insert(&AccessEvent::with_pc(0x3000, 9));
    let slot = hb.insert(&AccessEvent::with_pc(0x3040, 9)).unwrap();
    assert_eq!(hb.indexed_keys(CorrelationKey::Pc), 0);
    assert!(hb.build_pattern(slot, CorrelationKey::Pc).is_empty());
    assert_eq!(hb.build_pattern(slot, CorrelationKey::Page), vec![0x40]);
}

#[test]
fn out_of_range_slot_yields_empty_pattern() {
    let hb = buffer(4);
    assert!(hb.build_pattern(99, CorrelationKey::Page).is_empty());
}

#[test]
fn wraparound_stops_walk_at_recycled_slot() {
    let mut hb = buffer(3);
    let _ = hb.insert(&AccessEvent::with_pc(0x0, 0x10));
    let second = hb.insert(&AccessEvent::with_pc(0x40, 0x10)).unwrap();
    let _ = hb.insert(&AccessEvent::with_pc(0x9000, 0x99));
    assert_eq!(hb.build_pattern(second, CorrelationKey::Pc), vec![0x40]);

    // Recycle the first slot with an unrelated access on the same page.
    let _ = hb.insert(&AccessEvent::with_pc(0x80, 0x77));
    assert!(hb.build_pattern(second, CorrelationKey::Pc).is_empty());
}

#[test]
fn reset_forgets_everything() {
    let mut hb = buffer(2);
    for i in 0..5 {
        let _ = hb.insert(&AccessEvent::with_pc(i * 64, 1));
    }
    hb.reset();
    assert!(hb.is_empty());
    assert!(!hb.is_wrapped());
    assert_eq!(hb.next_sequence(), 1);
    assert_eq!(hb.indexed_keys(CorrelationKey::Pc), 0);
    assert_eq!(hb.indexed_keys(CorrelationKey::Page), 0);
    assert_eq!(hb.sequence_of(0), Some(0));
    assert_eq!(hb.address_of(1), None);
}

// ══════════════════════════════════════════════════════════
// 3. Properties
// ══════════════════════════════════════════════════════════

/// Deltas the PC chain of the newest access must reproduce: consecutive
/// same-PC accesses that are still inside the live window.
fn expected_pc_pattern(
    accesses: &[(u64, u64)],
    history_size: usize,
    pattern_length: usize,
) -> Vec<i64> {
    let n = accesses.len();
    let live_from = n.saturating_sub(history_size);
    let (_, pc) = accesses[n - 1];
    let chain: Vec<u64> = accesses[live_from..]
        .iter()
        .rev()
        .filter(|(_, p)| *p == pc)
        .map(|(a, _)| *a)
        .collect();
    chain
        .windows(2)
        .take(pattern_length)
        .map(|w| w[0].wrapping_sub(w[1]) as i64)
        .collect()
}

proptest! {
    #[test]
    fn pc_chain_matches_live_window_model(
        history_size in 1usize..12,
        pattern_length in 1usize..6,
        accesses in prop::collection::vec((0u64..1 << 20, 0u64..3), 1..60),
    ) {
        let mut hb = HistoryBuffer::new(history_size, pattern_length, 4096, true);
        let mut slot = 0;
        for &(addr, pc) in &accesses {
            slot = hb.insert(&AccessEvent::with_pc(addr, pc)).unwrap();
        }
        prop_assert_eq!(
            hb.build_pattern(slot, CorrelationKey::Pc),
            expected_pc_pattern(&accesses, history_size, pattern_length)
        );
    }

    #[test]
    fn sequence_numbers_increase_across_wraparound(
        history_size in 1usize..8,
        count in 1usize..40,
    ) {
        let mut hb = HistoryBuffer::new(history_size, 4, 4096, true);
        let mut last = 0;
        for i in 0..count as u64 {
            let slot = hb.insert(&AccessEvent::new(i * 64)).unwrap();
            prop_assert!(slot < history_size);
            let seq = hb.sequence_of(slot).unwrap();
            prop_assert!(seq > last);
            last = seq;
        }
        prop_assert_eq!(hb.len(), count.min(history_size));
    }
}
