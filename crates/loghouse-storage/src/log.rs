//! The log: an ordered collection of segments behind one readers-writer lock.
//!
//! Exactly one segment — the one with the largest base offset — is active and
//! takes appends; the rest are sealed and only read. Appends roll the active
//! segment when it reaches a capacity bound, reads binary-search the segment
//! list by base offset, and truncation unlinks whole segments from the front.
//!
//! ## Locking
//!
//! `append`, `truncate` and the lifecycle operations take the write side;
//! `read`, the offset bounds and `reader` take the read side. Segments do not
//! lock internally — the log lock is their only guard — except for the store's
//! write-buffer mutex, which lets shared-side readers flush buffered appends.
//!
//! ## Recovery
//!
//! Opening a directory enumerates the numeric file stems (each base offset
//! appears once per store file and once per index file), opens a segment per
//! base, and reconstructs every `next_offset` from the index file lengths.
//! Files whose stem does not parse as an unsigned integer are ignored.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, info};

use loghouse_core::{CommitLog, Error, Record, Result};

use crate::config::LogConfig;
use crate::reader::{LogReader, StoreSlice};
use crate::segment::Segment;

pub struct Log {
    dir: PathBuf,
    config: LogConfig,
    inner: RwLock<Segments>,
}

/// The segment list. Keeping the active segment out of the sealed vector
/// encodes the "exactly one active segment" invariant in the type.
struct Segments {
    /// Sealed segments, ascending by base offset, all below the active one.
    sealed: Vec<Segment>,
    active: Segment,
}

impl Segments {
    /// The segment owning `offset`, if any: `base_offset <= offset < next_offset`.
    fn find(&self, offset: u64) -> Option<&Segment> {
        if offset >= self.active.base_offset() {
            return self.active.contains(offset).then_some(&self.active);
        }
        let idx = self
            .sealed
            .partition_point(|segment| segment.base_offset() <= offset);
        let candidate = &self.sealed[idx.checked_sub(1)?];
        candidate.contains(offset).then_some(candidate)
    }

    fn iter(&self) -> impl Iterator<Item = &Segment> {
        self.sealed.iter().chain(std::iter::once(&self.active))
    }
}

impl Log {
    /// Open or create a log in `dir`. Zero-valued capacity bounds in `config`
    /// fall back to the defaults.
    pub fn new(dir: impl AsRef<Path>, config: LogConfig) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        let config = config.normalized();
        fs::create_dir_all(&dir)?;

        // Every base offset appears twice in the listing (store and index
        // file); the set collapses the pairs and keeps them ordered.
        let mut bases = BTreeSet::new();
        for entry in fs::read_dir(&dir)? {
            let path = entry?.path();
            let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) else {
                continue;
            };
            match stem.parse::<u64>() {
                Ok(base) => {
                    bases.insert(base);
                }
                Err(_) => debug!(file = %path.display(), "ignoring non-segment file"),
            }
        }

        let mut sealed = Vec::with_capacity(bases.len());
        for base in bases {
            sealed.push(Segment::new(&dir, base, config.clone())?);
        }
        let active = match sealed.pop() {
            Some(segment) => segment,
            None => Segment::new(&dir, config.initial_offset, config.clone())?,
        };

        info!(
            dir = %dir.display(),
            segments = sealed.len() + 1,
            next_offset = active.next_offset(),
            "log opened"
        );

        Ok(Self {
            dir,
            config,
            inner: RwLock::new(Segments { sealed, active }),
        })
    }

    /// Append a record and return its assigned offset.
    ///
    /// Rolls the active segment when it is already maxed (a reopened segment
    /// can start out that way) and again right after the append that maxes
    /// it, so the next producer finds a writable tail.
    pub fn append(&self, record: &Record) -> Result<u64> {
        let mut inner = self.inner.write();
        if inner.active.is_maxed() {
            self.roll(&mut inner)?;
        }
        let offset = inner.active.append(record)?;
        if inner.active.is_maxed() {
            self.roll(&mut inner)?;
        }
        Ok(offset)
    }

    /// Read the record at `offset`.
    pub fn read(&self, offset: u64) -> Result<Record> {
        let inner = self.inner.read();
        let segment = inner
            .find(offset)
            .ok_or(Error::OffsetOutOfRange(offset))?;
        segment.read(offset)
    }

    /// Oldest retained offset.
    pub fn lowest_offset(&self) -> u64 {
        let inner = self.inner.read();
        inner
            .sealed
            .first()
            .map_or(inner.active.base_offset(), Segment::base_offset)
    }

    /// Newest assigned offset, or 0 when nothing has been appended yet.
    pub fn highest_offset(&self) -> u64 {
        self.inner.read().active.next_offset().saturating_sub(1)
    }

    /// Unlink every segment whose records all sit at or below `lowest`.
    ///
    /// When that would empty the log, a fresh segment is created at the
    /// departing tail's `next_offset` first — offsets are never reused.
    pub fn truncate(&self, lowest: u64) -> Result<()> {
        let mut inner = self.inner.write();
        let mut removed = 0usize;

        let sealed = std::mem::take(&mut inner.sealed);
        for segment in sealed {
            if segment.next_offset().saturating_sub(1) <= lowest {
                segment.remove()?;
                removed += 1;
            } else {
                inner.sealed.push(segment);
            }
        }

        let active_empty = inner.active.is_empty();
        let active_next = inner.active.next_offset();
        if !active_empty && active_next - 1 <= lowest {
            let fresh = Segment::new(&self.dir, active_next, self.config.clone())?;
            let old = std::mem::replace(&mut inner.active, fresh);
            old.remove()?;
            removed += 1;
        }

        info!(lowest, removed, "truncated log");
        Ok(())
    }

    /// Snapshot a sequential reader over the raw store bytes of every
    /// segment, in offset order.
    pub fn reader(&self) -> LogReader {
        let inner = self.inner.read();
        let slices = inner
            .iter()
            .map(|segment| StoreSlice::new(Arc::clone(segment.store()), segment.store().size()))
            .collect();
        LogReader::new(slices)
    }

    /// Close every segment, trimming each index to its live size.
    pub fn close(self) -> Result<()> {
        let Segments { sealed, active } = self.inner.into_inner();
        for segment in sealed {
            segment.close()?;
        }
        active.close()
    }

    /// Close every segment and delete the log directory.
    pub fn remove(self) -> Result<()> {
        let dir = self.dir.clone();
        let Segments { sealed, active } = self.inner.into_inner();
        for segment in sealed {
            segment.remove()?;
        }
        active.remove()?;
        fs::remove_dir_all(&dir)?;
        info!(dir = %dir.display(), "log removed");
        Ok(())
    }

    /// Delete the log and open a fresh one in the same directory with the
    /// same configuration.
    pub fn reset(self) -> Result<Log> {
        let dir = self.dir.clone();
        let config = self.config.clone();
        self.remove()?;
        Log::new(dir, config)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn config(&self) -> &LogConfig {
        &self.config
    }

    /// Seal the active segment and start a fresh one at its `next_offset`.
    fn roll(&self, inner: &mut Segments) -> Result<()> {
        let base = inner.active.next_offset();
        let fresh = Segment::new(&self.dir, base, self.config.clone())?;
        let sealed = std::mem::replace(&mut inner.active, fresh);
        debug!(base_offset = base, "rolled active segment");
        inner.sealed.push(sealed);
        Ok(())
    }
}

impl CommitLog for Log {
    fn append(&self, record: &Record) -> Result<u64> {
        Log::append(self, record)
    }

    fn read(&self, offset: u64) -> Result<Record> {
        Log::read(self, offset)
    }

    fn lowest_offset(&self) -> u64 {
        Log::lowest_offset(self)
    }

    fn highest_offset(&self) -> u64 {
        Log::highest_offset(self)
    }

    fn truncate(&self, lowest: u64) -> Result<()> {
        Log::truncate(self, lowest)
    }

    fn reader(&self) -> Box<dyn std::io::Read + Send> {
        Box::new(Log::reader(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use loghouse_core::OFFSET_WIDTH;
    use std::io::Read;
    use tempfile::TempDir;

    fn record() -> Record {
        Record::new(Bytes::from_static(b"hello world"))
    }

    fn small_log(dir: &Path) -> Log {
        // A 32-byte store bound keeps segments at two records each, so the
        // multi-segment paths get exercised by a handful of appends.
        let config = LogConfig {
            max_store_bytes: 32,
            ..Default::default()
        };
        Log::new(dir, config).unwrap()
    }

    #[test]
    fn append_and_read_a_record() {
        let dir = TempDir::new().unwrap();
        let log = small_log(dir.path());

        let offset = log.append(&record()).unwrap();
        assert_eq!(offset, 0);

        let read = log.read(offset).unwrap();
        assert_eq!(read.value, record().value);
        assert_eq!(read.offset, 0);
    }

    #[test]
    fn offset_out_of_range_error() {
        let dir = TempDir::new().unwrap();
        let log = small_log(dir.path());

        match log.read(1) {
            Err(Error::OffsetOutOfRange(offset)) => assert_eq!(offset, 1),
            other => panic!("expected out-of-range, got {other:?}"),
        }
    }

    #[test]
    fn init_with_existing_segments() {
        let dir = TempDir::new().unwrap();
        let log = small_log(dir.path());
        for _ in 0..3 {
            log.append(&record()).unwrap();
        }
        assert_eq!(log.lowest_offset(), 0);
        assert_eq!(log.highest_offset(), 2);
        log.close().unwrap();

        let log = small_log(dir.path());
        assert_eq!(log.lowest_offset(), 0);
        assert_eq!(log.highest_offset(), 2);
        for offset in 0..3 {
            assert_eq!(log.read(offset).unwrap().value, record().value);
        }
    }

    #[test]
    fn reader_yields_length_prefixed_blobs() {
        let dir = TempDir::new().unwrap();
        let log = small_log(dir.path());
        log.append(&record()).unwrap();

        let mut bytes = Vec::new();
        log.reader().read_to_end(&mut bytes).unwrap();

        let blob_len = (OFFSET_WIDTH + record().value.len()) as u64;
        assert_eq!(bytes.len() as u64, 8 + blob_len);
        assert_eq!(&bytes[..8], &blob_len.to_be_bytes());

        let read = Record::decode(Bytes::copy_from_slice(&bytes[8..])).unwrap();
        assert_eq!(read.offset, 0);
        assert_eq!(read.value, record().value);
    }

    #[test]
    fn truncate_drops_leading_segments() {
        let dir = TempDir::new().unwrap();
        let log = small_log(dir.path());
        for _ in 0..3 {
            log.append(&record()).unwrap();
        }

        log.truncate(1).unwrap();

        assert!(matches!(log.read(0), Err(Error::OffsetOutOfRange(0))));
        assert!(log.lowest_offset() > 1);
        assert_eq!(log.read(2).unwrap().value, record().value);
    }

    #[test]
    fn reader_snapshot_ignores_later_appends() {
        let dir = TempDir::new().unwrap();
        let log = small_log(dir.path());
        log.append(&record()).unwrap();

        let mut reader = log.reader();
        log.append(&record()).unwrap();

        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes).unwrap();
        let blob_len = (OFFSET_WIDTH + record().value.len()) as u64;
        assert_eq!(bytes.len() as u64, 8 + blob_len);
    }

    #[test]
    fn scan_ignores_unrelated_files() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"not a segment").unwrap();

        let log = small_log(dir.path());
        assert_eq!(log.append(&record()).unwrap(), 0);
        assert_eq!(log.read(0).unwrap().value, record().value);
    }
}
