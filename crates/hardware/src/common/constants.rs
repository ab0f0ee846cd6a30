//! Global Geometry Constants.
//!
//! This module defines the memory-geometry constants shared by the prefetcher,
//! the trace driver, and the default configuration. It includes:
//! 1. **Memory Constants:** Page and cache-line sizes used when no geometry is supplied.
//! 2. **Key Constants:** Number of correlation key-spaces tracked per history entry.

/// Page size in bytes (4KB).
pub const PAGE_SIZE: u64 = 4096;

/// Cache line size in bytes.
pub const LINE_SIZE: u64 = 64;

/// Number of correlation key-spaces (instruction pointer and page).
pub const NUM_CORRELATION_KEYS: usize = 2;
