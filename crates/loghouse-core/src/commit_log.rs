//! The `CommitLog` capability.
//!
//! The serving layer is written against this trait rather than the disk-backed
//! engine directly, so it can be fronted by other implementations (an
//! in-memory log in tests, a replicated log later). The disk engine in
//! `loghouse-storage` is the canonical one.
//!
//! Lifecycle operations (`close`, `remove`, `reset`) are intentionally not
//! part of the capability: they consume the concrete log, and the serving
//! layer never destroys the log it serves.

use std::io::Read;

use crate::error::Result;
use crate::record::Record;

pub trait CommitLog: Send + Sync {
    /// Append a record, returning the offset it was assigned.
    fn append(&self, record: &Record) -> Result<u64>;

    /// Read the record at `offset`. Fails with
    /// [`Error::OffsetOutOfRange`](crate::Error::OffsetOutOfRange) when the
    /// offset falls outside the retained range.
    fn read(&self, offset: u64) -> Result<Record>;

    /// Oldest retained offset.
    fn lowest_offset(&self) -> u64;

    /// Newest assigned offset. Reports 0 for an empty log as well as for a
    /// log whose only record sits at offset 0; callers that must distinguish
    /// the two combine this with [`CommitLog::lowest_offset`] and history.
    fn highest_offset(&self) -> u64;

    /// Drop every segment whose records all sit at or below `lowest`.
    fn truncate(&self, lowest: u64) -> Result<()>;

    /// A sequential reader over the raw store bytes of every segment, in
    /// offset order: length-prefixed record blobs back to back. The segment
    /// list is snapshotted at the time of the call.
    fn reader(&self) -> Box<dyn Read + Send>;
}
