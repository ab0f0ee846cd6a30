//! Memory Geometry.
//!
//! This module defines how raw addresses map onto the granularities the
//! prefetcher reasons about. It provides the following:
//! 1. **Collaborator Seam:** The [`MemoryGeometry`] trait (`block_address`, `same_page`).
//! 2. **Default Geometry:** [`LineGeometry`], a power-of-two cache-line/page model.
//! 3. **Helpers:** Power-of-two clamping shared with configuration.

use super::constants::{LINE_SIZE, PAGE_SIZE};

/// Address geometry supplied by the memory hierarchy that owns the prefetcher.
///
/// The prefetcher never decides on its own what a block or a page is; it
/// asks the geometry.
pub trait MemoryGeometry: Send + Sync {
    /// Truncates a byte address to the tracked block granularity.
    fn block_address(&self, addr: u64) -> u64;

    /// Returns true when both addresses fall on the same page.
    fn same_page(&self, a: u64, b: u64) -> bool;
}

/// Cache-line/page geometry with power-of-two sizes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LineGeometry {
    line_bytes: u64,
    page_bytes: u64,
}

impl LineGeometry {
    /// Creates a geometry, rounding both sizes up to a power of two (minimum 1).
    ///
    /// # Arguments
    ///
    /// * `line_bytes` - Cache line (block) size in bytes.
    /// * `page_bytes` - Page size in bytes.
    pub fn new(line_bytes: u64, page_bytes: u64) -> Self {
        Self {
            line_bytes: pow2_at_least_one(line_bytes),
            page_bytes: pow2_at_least_one(page_bytes),
        }
    }

    /// Returns the block size in bytes.
    #[inline(always)]
    pub const fn line_bytes(&self) -> u64 {
        self.line_bytes
    }

    /// Returns the page size in bytes.
    #[inline(always)]
    pub const fn page_bytes(&self) -> u64 {
        self.page_bytes
    }

    /// Returns the page number containing `addr`.
    #[inline(always)]
    pub const fn page_number(&self, addr: u64) -> u64 {
        addr / self.page_bytes
    }
}

impl Default for LineGeometry {
    fn default() -> Self {
        Self::new(LINE_SIZE, PAGE_SIZE)
    }
}

impl MemoryGeometry for LineGeometry {
    #[inline(always)]
    fn block_address(&self, addr: u64) -> u64 {
        addr & !(self.line_bytes - 1)
    }

    #[inline(always)]
    fn same_page(&self, a: u64, b: u64) -> bool {
        self.page_number(a) == self.page_number(b)
    }
}

/// Rounds `value` up to the next power of two, treating 0 as 1.
///
/// Values above the largest representable power of two saturate to `1 << 63`.
pub fn pow2_at_least_one(value: u64) -> u64 {
    value.max(1).checked_next_power_of_two().unwrap_or(1 << 63)
}
