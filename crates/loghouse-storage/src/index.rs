//! The segment index: a memory-mapped map from relative offset to store
//! position.
//!
//! ## File format
//!
//! Fixed-width 12-byte entries, dense and ordered: entry `k` describes the
//! record at relative offset `k`.
//!
//! ```text
//! ┌──────────────────────┬───────────────────┐
//! │ rel. offset (4B BE)  │ position (8B BE)  │
//! └──────────────────────┴───────────────────┘
//! ```
//!
//! The file is truncated up to the configured capacity at open and the whole
//! capacity is mapped read-write; a mapping cannot grow, so pre-sizing avoids
//! remapping on every write. A logical size field tracks the live prefix.
//! Closing trims the file back to the live size — the on-disk length equalling
//! `12 × entries` is the signal the next open uses to reconstruct the
//! segment's next offset. Each successful write flushes the touched entry
//! range so a crash cannot leave a durable file claiming entries that were
//! never synced.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use memmap2::MmapMut;

use loghouse_core::{Error, Result};

pub(crate) const REL_OFF_WIDTH: u64 = 4;
pub(crate) const POS_WIDTH: u64 = 8;
/// Width of one index entry: relative offset plus store position.
pub(crate) const ENTRY_WIDTH: u64 = REL_OFF_WIDTH + POS_WIDTH;

#[derive(Debug)]
pub(crate) struct Index {
    file: File,
    path: PathBuf,
    mmap: MmapMut,
    /// Bytes of live entries; always a multiple of `ENTRY_WIDTH`.
    size: u64,
}

impl Index {
    /// Open or create the index at `path`, pre-sized to `max_index_bytes`.
    ///
    /// The live size is whatever the file held before pre-sizing — after a
    /// clean close that is exactly the entry bytes.
    pub fn open(path: impl AsRef<Path>, max_index_bytes: u64) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .open(&path)?;
        // A capacity smaller than the existing file trims entries away; the
        // live size must never exceed the mapping.
        let size = file.metadata()?.len().min(max_index_bytes);
        file.set_len(max_index_bytes)?;

        // SAFETY: the log directory is exclusive to this process, and `file`
        // stays open at this length for as long as the mapping lives.
        let mmap = unsafe { MmapMut::map_mut(&file)? };

        Ok(Self {
            file,
            path,
            mmap,
            size,
        })
    }

    /// Append an entry. Fails with [`Error::IndexFull`] when the mapping has
    /// no room for another entry.
    pub fn write(&mut self, rel_offset: u32, position: u64) -> Result<()> {
        if self.size + ENTRY_WIDTH > self.mmap.len() as u64 {
            return Err(Error::IndexFull);
        }
        let at = self.size as usize;
        self.mmap[at..at + REL_OFF_WIDTH as usize].copy_from_slice(&rel_offset.to_be_bytes());
        self.mmap[at + REL_OFF_WIDTH as usize..at + ENTRY_WIDTH as usize]
            .copy_from_slice(&position.to_be_bytes());
        self.mmap.flush_range(at, ENTRY_WIDTH as usize)?;
        self.size += ENTRY_WIDTH;
        Ok(())
    }

    /// Decode entry `rel_offset`. Fails with [`Error::EndOfIndex`] past the
    /// live portion (which covers the empty index).
    pub fn read(&self, rel_offset: u32) -> Result<(u32, u64)> {
        let at = rel_offset as u64 * ENTRY_WIDTH;
        if at + ENTRY_WIDTH > self.size {
            return Err(Error::EndOfIndex);
        }

        let at = at as usize;
        let mut rel = [0u8; REL_OFF_WIDTH as usize];
        rel.copy_from_slice(&self.mmap[at..at + REL_OFF_WIDTH as usize]);
        let mut pos = [0u8; POS_WIDTH as usize];
        pos.copy_from_slice(&self.mmap[at + REL_OFF_WIDTH as usize..at + ENTRY_WIDTH as usize]);
        Ok((u32::from_be_bytes(rel), u64::from_be_bytes(pos)))
    }

    /// Decode the last live entry. Fails with [`Error::EndOfIndex`] on an
    /// empty index.
    pub fn read_last(&self) -> Result<(u32, u64)> {
        if self.size == 0 {
            return Err(Error::EndOfIndex);
        }
        self.read((self.size / ENTRY_WIDTH - 1) as u32)
    }

    /// Bytes of live entries.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Sync the mapping, then trim the file back to the live size so the
    /// next open can reconstruct the entry count from the file length alone.
    pub fn close(self) -> Result<()> {
        let Index {
            file,
            path: _,
            mmap,
            size,
        } = self;
        mmap.flush()?;
        drop(mmap);
        file.set_len(size)?;
        file.sync_all()?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
