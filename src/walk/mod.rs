//! The traversal engine: classify a node, route the path segment to the
//! matching segment handler, recurse.
//!
//! [`PathWalker`] is the public entry point; the object reader and writer
//! behind it own the dispatch switch and the per-category segment
//! handlers.

mod error;
mod reader;
mod walker;
mod writer;

pub use error::{ErrorCode, KeyDeserializationError, PathWalkerError};
pub use walker::{KeyDeserializer, PathWalker};

pub(crate) use error::DeadEnd;

/// Parses a path segment as a nonnegative integer index.
///
/// Only plain ASCII digit runs qualify; anything else (including the null
/// key, the empty segment, signs, or digit runs exceeding the native
/// index range) is absent.
pub(crate) fn parse_index(segment: Option<&str>) -> Option<usize> {
    let segment = segment?;
    if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    segment.parse().ok()
}
