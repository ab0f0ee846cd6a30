//! Error definitions.
//!
//! The prediction path itself never fails: missing history degrades to "no
//! prediction". Errors only arise at the outer surfaces:
//! 1. **Configuration:** Reading or parsing a JSON configuration file.
//! 2. **Traces:** Reading an access trace or parsing one of its lines.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failure while loading a prefetcher configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config {path}: {source}")]
    Io {
        /// Path that was being read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The configuration text is not valid JSON for [`GhbConfig`](crate::config::GhbConfig).
    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Failure while reading an access trace.
#[derive(Debug, Error)]
pub enum TraceError {
    /// The trace file could not be read.
    #[error("failed to read trace {path}: {source}")]
    Io {
        /// Path that was being read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// A line does not have the `ADDR [PC]` shape.
    #[error("line {line}: expected `ADDR [PC]`, found {found:?}")]
    Malformed {
        /// 1-based line number.
        line: usize,
        /// Offending line content (comment stripped).
        found: String,
    },

    /// A field is not a decimal or `0x` hexadecimal 64-bit value.
    #[error("line {line}: invalid number {token:?}")]
    InvalidNumber {
        /// 1-based line number.
        line: usize,
        /// Token that failed to parse.
        token: String,
    },
}
