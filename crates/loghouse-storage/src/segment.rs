//! A segment: one store and one index under a shared base offset.
//!
//! On disk a segment is the pair `{base_offset}.store` / `{base_offset}.index`
//! in the log directory. The base offset is the absolute offset of the
//! segment's first record; `next_offset` is the next absolute offset it will
//! assign. Reopening a segment recovers `next_offset` from the last index
//! entry.
//!
//! The store sits behind an `Arc` so sequential readers snapshotted by the
//! log keep the file alive even if the segment is truncated away underneath
//! them.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use loghouse_core::{Error, Record, Result};

use crate::config::LogConfig;
use crate::index::Index;
use crate::store::Store;

#[derive(Debug)]
pub(crate) struct Segment {
    store: Arc<Store>,
    index: Index,
    base_offset: u64,
    next_offset: u64,
    config: LogConfig,
}

impl Segment {
    /// Open or create the segment for `base_offset` inside `dir`.
    pub fn new(dir: impl AsRef<Path>, base_offset: u64, config: LogConfig) -> Result<Self> {
        let dir = dir.as_ref();
        let store = Arc::new(Store::open(dir.join(format!("{base_offset}.store")))?);
        let index = Index::open(
            dir.join(format!("{base_offset}.index")),
            config.max_index_bytes,
        )?;

        let next_offset = match index.read_last() {
            Ok((rel, _)) => base_offset + rel as u64 + 1,
            Err(Error::EndOfIndex) => base_offset,
            Err(err) => return Err(err),
        };

        Ok(Self {
            store,
            index,
            base_offset,
            next_offset,
            config,
        })
    }

    /// Append a record, stamping it with the assigned absolute offset. The
    /// store entry is written before the index entry, so a failure in between
    /// leaves nothing a reader can observe. A full index surfaces
    /// [`Error::IndexFull`].
    pub fn append(&mut self, record: &Record) -> Result<u64> {
        let offset = self.next_offset;
        let blob = Record {
            offset,
            value: record.value.clone(),
        }
        .encode();

        let (_, position) = self.store.append(&blob)?;
        self.index
            .write((offset - self.base_offset) as u32, position)?;
        self.next_offset += 1;
        Ok(offset)
    }

    /// Read the record at absolute `offset`.
    pub fn read(&self, offset: u64) -> Result<Record> {
        let (_, position) = self.index.read((offset - self.base_offset) as u32)?;
        let blob = self.store.read(position)?;
        Record::decode(blob)
    }

    /// Whether either file has reached its configured bound. The first bound
    /// hit seals the segment.
    pub fn is_maxed(&self) -> bool {
        self.store.size() >= self.config.max_store_bytes
            || self.index.size() >= self.config.max_index_bytes
    }

    pub fn contains(&self, offset: u64) -> bool {
        self.base_offset <= offset && offset < self.next_offset
    }

    pub fn base_offset(&self) -> u64 {
        self.base_offset
    }

    pub fn next_offset(&self) -> u64 {
        self.next_offset
    }

    pub fn is_empty(&self) -> bool {
        self.next_offset == self.base_offset
    }

    pub fn store(&self) -> &Arc<Store> {
        &self.store
    }

    /// Close both files; the index trims itself to its live size.
    pub fn close(self) -> Result<()> {
        self.index.close()?;
        self.store.close()?;
        Ok(())
    }

    /// Close, then unlink both files.
    pub fn remove(self) -> Result<()> {
        let store_path = self.store.path().to_path_buf();
        let index_path = self.index.path().to_path_buf();
        self.close()?;
        fs::remove_file(index_path)?;
        fs::remove_file(store_path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::ENTRY_WIDTH;
    use bytes::Bytes;
    use tempfile::TempDir;

    fn record() -> Record {
        Record::new(Bytes::from_static(b"hello world"))
    }

    #[test]
    fn append_read_and_index_capacity() {
        let dir = TempDir::new().unwrap();
        let config = LogConfig {
            max_store_bytes: 1024,
            max_index_bytes: ENTRY_WIDTH * 3,
            initial_offset: 0,
        };

        let mut segment = Segment::new(dir.path(), 16, config.clone()).unwrap();
        assert_eq!(segment.next_offset(), 16);
        assert!(!segment.is_maxed());

        for i in 0..3 {
            let offset = segment.append(&record()).unwrap();
            assert_eq!(offset, 16 + i);

            let got = segment.read(offset).unwrap();
            assert_eq!(got.offset, offset);
            assert_eq!(got.value, record().value);
        }

        // Index is full: three 12-byte entries.
        assert!(matches!(segment.append(&record()), Err(Error::IndexFull)));
        assert!(segment.is_maxed());

        // Reopen with a store bound smaller than what is already on disk;
        // the segment reports maxed before any further append.
        let config = LogConfig {
            max_store_bytes: record().value.len() as u64 * 3,
            max_index_bytes: 1024,
            initial_offset: 0,
        };
        let segment = Segment::new(dir.path(), 16, config.clone()).unwrap();
        assert!(segment.is_maxed());

        segment.remove().unwrap();
        let segment = Segment::new(dir.path(), 16, config).unwrap();
        assert!(!segment.is_maxed());
        assert!(segment.is_empty());
    }

    #[test]
    fn reopen_recovers_next_offset() {
        let dir = TempDir::new().unwrap();
        let config = LogConfig::default();

        let mut segment = Segment::new(dir.path(), 5, config.clone()).unwrap();
        for _ in 0..3 {
            segment.append(&record()).unwrap();
        }
        assert_eq!(segment.next_offset(), 8);
        segment.close().unwrap();

        let segment = Segment::new(dir.path(), 5, config).unwrap();
        assert_eq!(segment.next_offset(), 8);
        assert_eq!(segment.read(7).unwrap().value, record().value);
    }

    #[test]
    fn segment_files_carry_base_offset_name() {
        let dir = TempDir::new().unwrap();
        let segment = Segment::new(dir.path(), 42, LogConfig::default()).unwrap();
        assert!(dir.path().join("42.store").exists());
        assert!(dir.path().join("42.index").exists());

        segment.remove().unwrap();
        assert!(!dir.path().join("42.store").exists());
        assert!(!dir.path().join("42.index").exists());
    }
}
