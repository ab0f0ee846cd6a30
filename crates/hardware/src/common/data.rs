//! Memory Access Events.
//!
//! This module defines what the prefetcher observes and what it emits:
//! 1. **Observation:** [`AccessEvent`], one demand access with an optional instruction pointer.
//! 2. **Emission:** [`PrefetchCandidate`], an address the memory hierarchy may fetch speculatively.

use serde::{Deserialize, Serialize};

/// A single demand access observed by the prefetcher.
///
/// The address is a raw byte address; the prefetcher truncates it to a block
/// address through its [`MemoryGeometry`](super::addr::MemoryGeometry).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccessEvent {
    /// Accessed byte address.
    pub addr: u64,
    /// Instruction pointer of the load/store that issued the access, if known.
    #[serde(default)]
    pub pc: Option<u64>,
}

impl AccessEvent {
    /// Creates an access without an instruction pointer.
    #[inline(always)]
    pub const fn new(addr: u64) -> Self {
        Self { addr, pc: None }
    }

    /// Creates an access tagged with the issuing instruction pointer.
    #[inline(always)]
    pub const fn with_pc(addr: u64, pc: u64) -> Self {
        Self { addr, pc: Some(pc) }
    }
}

/// A prefetch request produced for one triggering access.
///
/// Priority assignment belongs to the queueing logic outside the predictor,
/// so every candidate produced here carries priority 0.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct PrefetchCandidate {
    /// Block address to prefetch.
    pub addr: u64,
    /// Queue priority (always 0 at this level).
    pub priority: i32,
}

impl PrefetchCandidate {
    /// Creates a candidate with the default priority.
    #[inline(always)]
    pub const fn new(addr: u64) -> Self {
        Self { addr, priority: 0 }
    }
}
