//! Global History Buffer.
//!
//! A fixed-capacity ring of recent accesses. Each entry carries one back-link
//! per correlation key-space pointing at the previous access with the same
//! key value, so the access stream of one instruction (or one page) can be
//! reconstructed by walking links backwards.
//!
//! Slots are recycled. A link stores the target's sequence number at link
//! time and is followed only while the target still carries that number;
//! once the slot is overwritten the link is stale and the walk stops.
//!
//! # Performance
//!
//! - **Time Complexity:**
//!   - `insert()`: O(K) where K is the number of key-spaces (2)
//!   - `build_pattern()`: O(P) where P is the pattern length
//! - **Space Complexity:** O(H) where H is the history size

use super::index::{CorrelationIndex, CorrelationKey};
use crate::common::constants::NUM_CORRELATION_KEYS;
use crate::common::data::AccessEvent;

/// Back-link of one history entry within one key-space.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct LinkInfo {
    /// Slot of the previous access with the same key value.
    prev: Option<usize>,
    /// Sequence number `prev` carried when the link was made.
    prev_seq: u64,
    /// Key value, or `None` when this entry has no key in this space.
    key: Option<u64>,
}

/// One recorded access.
#[derive(Clone, Copy, Debug, Default)]
struct HistoryEntry {
    addr: u64,
    /// 0 marks a slot that has never been written since the last reset.
    seq: u64,
    links: [LinkInfo; NUM_CORRELATION_KEYS],
}

/// Ring buffer of accesses with per-key back-links.
#[derive(Debug, Clone)]
pub struct HistoryBuffer {
    entries: Vec<HistoryEntry>,
    indices: [CorrelationIndex; NUM_CORRELATION_KEYS],
    head: usize,
    wrapped: bool,
    next_seq: u64,
    pattern_length: usize,
    page_bytes: u64,
    use_pc: bool,
}

impl HistoryBuffer {
    /// Creates an empty history buffer.
    ///
    /// # Arguments
    ///
    /// * `history_size` - Number of slots (at least 1).
    /// * `pattern_length` - Maximum deltas produced by [`build_pattern`](Self::build_pattern) (at least 1).
    /// * `page_bytes` - Page size used to derive the page key (at least 1).
    /// * `use_pc` - Whether instruction pointers are used as a correlation key.
    pub fn new(history_size: usize, pattern_length: usize, page_bytes: u64, use_pc: bool) -> Self {
        Self {
            entries: vec![HistoryEntry::default(); history_size.max(1)],
            indices: [CorrelationIndex::new(), CorrelationIndex::new()],
            head: 0,
            wrapped: false,
            next_seq: 1,
            pattern_length: pattern_length.max(1),
            page_bytes: page_bytes.max(1),
            use_pc,
        }
    }

    /// Records an access and returns the slot it was written to.
    ///
    /// When the ring is full the oldest slot is evicted first: its index
    /// mappings are dropped before it is overwritten. Returns `None` only for
    /// a zero-capacity buffer, which construction never produces.
    pub fn insert(&mut self, access: &AccessEvent) -> Option<usize> {
        if self.entries.is_empty() {
            return None;
        }

        let slot = self.head;
        if self.wrapped {
            self.evict(slot);
        }

        let seq = self.next_seq;
        self.next_seq += 1;
        self.entries[slot] = HistoryEntry {
            addr: access.addr,
            seq,
            links: [LinkInfo::default(); NUM_CORRELATION_KEYS],
        };

        if self.use_pc {
            if let Some(pc) = access.pc {
                self.link(slot, CorrelationKey::Pc, pc);
            }
        }
        self.link(slot, CorrelationKey::Page, access.addr / self.page_bytes);

        self.head = (self.head + 1) % self.entries.len();
        if self.head == 0 {
            self.wrapped = true;
        }
        Some(slot)
    }

    /// Removes the victim's index mappings so nothing resolves to it anymore.
    fn evict(&mut self, slot: usize) {
        for key in CorrelationKey::ALL {
            let link = &mut self.entries[slot].links[key.index()];
            if let Some(value) = link.key.take() {
                let _ = self.indices[key.index()].remove_if_slot(value, slot);
            }
        }
    }

    /// Chains `slot` behind the newest slot carrying `value` in the given key-space.
    fn link(&mut self, slot: usize, key: CorrelationKey, value: u64) {
        let index = &mut self.indices[key.index()];
        let prev = index.get(value);
        let prev_seq = prev.map_or(0, |p| self.entries[p].seq);
        let _ = index.update(value, slot);
        self.entries[slot].links[key.index()] = LinkInfo {
            prev,
            prev_seq,
            key: Some(value),
        };
    }

    /// Reconstructs the deltas leading up to `slot`, most recent first.
    ///
    /// Walks back-links in the given key-space until `pattern_length` deltas
    /// are collected or a link is missing or stale. Each delta is the
    /// wrapping difference `entry.addr - previous.addr`. An empty vector
    /// means no related history exists.
    pub fn build_pattern(&self, slot: usize, key: CorrelationKey) -> Vec<i64> {
        let mut deltas = Vec::with_capacity(self.pattern_length.min(self.entries.len()));
        if slot >= self.entries.len() {
            return deltas;
        }

        let mut current = slot;
        while deltas.len() < self.pattern_length {
            let entry = &self.entries[current];
            let link = &entry.links[key.index()];
            if link.key.is_none() {
                break;
            }
            let Some(prev) = link.prev else {
                break;
            };
            let prev_entry = &self.entries[prev];
            if prev_entry.seq != link.prev_seq {
                break;
            }
            deltas.push(entry.addr.wrapping_sub(prev_entry.addr) as i64);
            current = prev;
        }
        deltas
    }

    /// Same as [`build_pattern`](Self::build_pattern) but oldest delta first.
    pub fn chronological(&self, slot: usize, key: CorrelationKey) -> Vec<i64> {
        let mut deltas = self.build_pattern(slot, key);
        deltas.reverse();
        deltas
    }

    /// Clears every slot, both indices and the sequence counter.
    pub fn reset(&mut self) {
        self.entries.fill(HistoryEntry::default());
        for index in &mut self.indices {
            index.clear();
        }
        self.head = 0;
        self.wrapped = false;
        self.next_seq = 1;
    }

    /// Number of slots.
    pub fn capacity(&self) -> usize {
        self.entries.len()
    }

    /// Number of slots holding an access.
    pub fn len(&self) -> usize {
        if self.wrapped { self.entries.len() } else { self.head }
    }

    /// Returns true if nothing has been recorded since construction or reset.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns true once the ring has wrapped and inserts evict.
    pub fn is_wrapped(&self) -> bool {
        self.wrapped
    }

    /// Sequence number the next insert will receive.
    pub fn next_sequence(&self) -> u64 {
        self.next_seq
    }

    /// Sequence number currently stored in `slot` (0 for an unwritten slot).
    pub fn sequence_of(&self, slot: usize) -> Option<u64> {
        self.entries.get(slot).map(|e| e.seq)
    }

    /// Block address currently stored in `slot`.
    pub fn address_of(&self, slot: usize) -> Option<u64> {
        self.entries.get(slot).filter(|e| e.seq != 0).map(|e| e.addr)
    }

    /// Newest slot carrying `value` in the given key-space.
    pub fn index_lookup(&self, key: CorrelationKey, value: u64) -> Option<usize> {
        self.indices[key.index()].get(value)
    }

    /// Number of distinct key values indexed in the given key-space.
    pub fn indexed_keys(&self, key: CorrelationKey) -> usize {
        self.indices[key.index()].len()
    }
}
