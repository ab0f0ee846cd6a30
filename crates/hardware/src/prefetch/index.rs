//! Correlation Index.
//!
//! Maps a correlation key value (an instruction pointer or a page number) to
//! the history slot that most recently carried it. One index exists per
//! key-space. Entries are removed eagerly when their slot is evicted, so a
//! lookup never returns a slot that no longer holds the key.

use std::collections::HashMap;

/// Correlation key-space used to chain related accesses together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CorrelationKey {
    /// Accesses issued by the same instruction.
    Pc,
    /// Accesses that fall on the same page.
    Page,
}

impl CorrelationKey {
    /// All key-spaces, in link-array order.
    pub const ALL: [Self; 2] = [Self::Pc, Self::Page];

    /// Position of this key-space in per-entry link arrays.
    #[inline(always)]
    pub const fn index(self) -> usize {
        match self {
            Self::Pc => 0,
            Self::Page => 1,
        }
    }
}

/// Key value → most recent slot, for a single key-space.
#[derive(Debug, Clone, Default)]
pub struct CorrelationIndex {
    newest: HashMap<u64, usize>,
}

impl CorrelationIndex {
    /// Creates an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the newest slot carrying `value`, if any.
    #[inline]
    pub fn get(&self, value: u64) -> Option<usize> {
        self.newest.get(&value).copied()
    }

    /// Records `slot` as the newest holder of `value`, returning the previous holder.
    #[inline]
    pub fn update(&mut self, value: u64, slot: usize) -> Option<usize> {
        self.newest.insert(value, slot)
    }

    /// Drops the mapping for `value` only if it still points at `slot`.
    ///
    /// Returns true when a mapping was removed. A newer slot carrying the same
    /// value keeps its mapping.
    pub fn remove_if_slot(&mut self, value: u64, slot: usize) -> bool {
        if self.newest.get(&value) == Some(&slot) {
            let _ = self.newest.remove(&value);
            true
        } else {
            false
        }
    }

    /// Number of distinct key values tracked.
    pub fn len(&self) -> usize {
        self.newest.len()
    }

    /// Returns true if no key value is tracked.
    pub fn is_empty(&self) -> bool {
        self.newest.is_empty()
    }

    /// Forgets every mapping.
    pub fn clear(&mut self) {
        self.newest.clear();
    }
}
