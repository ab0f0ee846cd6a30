//! Common utilities and types used throughout the prefetcher model.
//!
//! This module provides the building blocks shared by every component. It includes:
//! 1. **Geometry:** The block/page collaborator seam and a default implementation.
//! 2. **Constants:** Default line and page sizes.
//! 3. **Access Events:** What the prefetcher observes and what it emits.
//! 4. **Error Handling:** Configuration and trace loading errors.

/// Memory geometry (block address, page membership).
pub mod addr;

/// Common constants used throughout the crate.
pub mod constants;

/// Access event and prefetch candidate definitions.
pub mod data;

/// Error types for configuration and trace loading.
pub mod error;

pub use addr::{LineGeometry, MemoryGeometry};
pub use constants::{LINE_SIZE, PAGE_SIZE};
pub use data::{AccessEvent, PrefetchCandidate};
pub use error::{ConfigError, TraceError};
