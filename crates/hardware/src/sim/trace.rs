//! Access Trace Loader.
//!
//! Reads textual access traces into [`AccessEvent`]s. The format is one
//! access per line:
//!
//! ```text
//! # addr          pc (optional)
//! 0x7fff0040      0x400a10
//! 4096
//! ```
//!
//! Numbers are decimal or `0x`-prefixed hexadecimal (`_` separators allowed).
//! `#` starts a comment; blank lines are skipped.

use std::fs;
use std::path::Path;

use crate::common::data::AccessEvent;
use crate::common::error::TraceError;

/// Parses one trace line. Returns `Ok(None)` for blank and comment-only lines.
///
/// # Arguments
///
/// * `line_no` - 1-based line number, used in errors.
/// * `line` - Raw line text.
///
/// # Errors
///
/// Returns [`TraceError::Malformed`] for lines with no or more than two
/// fields and [`TraceError::InvalidNumber`] for unparsable fields.
pub fn parse_line(line_no: usize, line: &str) -> Result<Option<AccessEvent>, TraceError> {
    let content = line.split_once('#').map_or(line, |(before, _)| before).trim();
    if content.is_empty() {
        return Ok(None);
    }

    let fields: Vec<&str> = content.split_whitespace().collect();
    let number = |token: &str| {
        parse_u64(token).ok_or_else(|| TraceError::InvalidNumber {
            line: line_no,
            token: token.to_string(),
        })
    };

    match fields.as_slice() {
        [addr] => Ok(Some(AccessEvent::new(number(*addr)?))),
        [addr, pc] => Ok(Some(AccessEvent::with_pc(number(*addr)?, number(*pc)?))),
        _ => Err(TraceError::Malformed {
            line: line_no,
            found: content.to_string(),
        }),
    }
}

/// Parses a whole trace held in memory.
///
/// # Errors
///
/// Returns the first line error encountered.
pub fn parse_trace(text: &str) -> Result<Vec<AccessEvent>, TraceError> {
    let mut accesses = Vec::new();
    for (i, line) in text.lines().enumerate() {
        if let Some(access) = parse_line(i + 1, line)? {
            accesses.push(access);
        }
    }
    Ok(accesses)
}

/// Reads and parses a trace file.
///
/// # Errors
///
/// Returns [`TraceError::Io`] if the file cannot be read, or the first line error.
pub fn load_trace(path: impl AsRef<Path>) -> Result<Vec<AccessEvent>, TraceError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| TraceError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_trace(&text)
}

/// Parses a decimal or `0x`-prefixed hexadecimal u64.
fn parse_u64(token: &str) -> Option<u64> {
    let cleaned = token.replace('_', "");
    if let Some(hex) = cleaned
        .strip_prefix("0x")
        .or_else(|| cleaned.strip_prefix("0X"))
    {
        u64::from_str_radix(hex, 16).ok()
    } else {
        cleaned.parse().ok()
    }
}
