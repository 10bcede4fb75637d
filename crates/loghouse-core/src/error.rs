//! Error types shared across the loghouse crates.
//!
//! All operations return `Result<T>`, aliased to `Result<T, Error>`, so
//! callers can propagate with `?`.
//!
//! Two variants are part of the log's observable contract rather than fault
//! reporting: `OffsetOutOfRange` is the only error a well-behaved client can
//! provoke (the serving layer pattern-matches it into a 404), and `IndexFull`
//! is how a segment signals it has no room left — the log absorbs it by
//! rolling a fresh segment, so it never surfaces from `Log::append` in normal
//! operation.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Read of an offset below the lowest or at/above the highest offset.
    #[error("offset out of range: {0}")]
    OffsetOutOfRange(u64),

    /// The segment index has no room for another entry.
    #[error("index full")]
    IndexFull,

    /// Read past the live portion of an index, or from an empty one.
    #[error("end of index")]
    EndOfIndex,

    /// An on-disk record blob failed to decode.
    #[error("corrupt record: {0}")]
    CorruptRecord(String),
}
