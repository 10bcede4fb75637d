//! The store file: a length-prefixed append-only sequence of byte entries.
//!
//! ## File format
//!
//! ```text
//! ┌────────────────┬──────────────────┬────────────────┬─────┐
//! │ length (8B BE) │ payload (N bytes)│ length (8B BE) │ ... │
//! └────────────────┴──────────────────┴────────────────┴─────┘
//! ```
//!
//! Entries are never rewritten; the file only grows. Appends go through a
//! write buffer, and the tracked size includes buffered bytes so the position
//! handed back for each entry is correct before any flush. Every read flushes
//! the buffer first so in-flight data is observable.

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use bytes::Bytes;
use parking_lot::Mutex;

use loghouse_core::Result;

/// Width of the big-endian length prefix framing every entry.
pub(crate) const LEN_WIDTH: u64 = 8;

/// Append-only byte file with positional reads.
///
/// The interior mutex guards the write buffer so reads can flush it while
/// appends stay serialized by the layer above.
#[derive(Debug)]
pub(crate) struct Store {
    path: PathBuf,
    inner: Mutex<Inner>,
}

#[derive(Debug)]
struct Inner {
    writer: std::io::BufWriter<File>,
    reader: File,
    /// Flushed plus buffered bytes.
    size: u64,
}

impl Store {
    /// Open or create the store file at `path`, picking up the existing size.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let write_file = OpenOptions::new().create(true).append(true).open(&path)?;
        let size = write_file.metadata()?.len();
        let reader = File::open(&path)?;
        Ok(Self {
            path,
            inner: Mutex::new(Inner {
                writer: std::io::BufWriter::new(write_file),
                reader,
                size,
            }),
        })
    }

    /// Append one entry. Returns `(written, position)`: the total bytes the
    /// entry occupies (prefix included) and the position its prefix begins at.
    pub fn append(&self, payload: &[u8]) -> Result<(u64, u64)> {
        let mut inner = self.inner.lock();
        let position = inner.size;
        inner.writer.write_all(&(payload.len() as u64).to_be_bytes())?;
        inner.writer.write_all(payload)?;
        let written = LEN_WIDTH + payload.len() as u64;
        inner.size += written;
        Ok((written, position))
    }

    /// Read the entry whose length prefix begins at `position`.
    pub fn read(&self, position: u64) -> Result<Bytes> {
        let mut inner = self.inner.lock();
        inner.writer.flush()?;

        let mut prefix = [0u8; LEN_WIDTH as usize];
        inner.reader.seek(SeekFrom::Start(position))?;
        inner.reader.read_exact(&mut prefix)?;

        let mut payload = vec![0u8; u64::from_be_bytes(prefix) as usize];
        inner.reader.read_exact(&mut payload)?;
        Ok(Bytes::from(payload))
    }

    /// Fill `buf` exactly from the raw file starting at `offset`.
    pub fn read_at(&self, buf: &mut [u8], offset: u64) -> Result<usize> {
        let mut inner = self.inner.lock();
        inner.writer.flush()?;
        inner.reader.seek(SeekFrom::Start(offset))?;
        inner.reader.read_exact(buf)?;
        Ok(buf.len())
    }

    /// Logical size: flushed plus buffered bytes.
    pub fn size(&self) -> u64 {
        self.inner.lock().size
    }

    /// Flush the write buffer and sync the file.
    pub fn close(&self) -> Result<()> {
        let mut inner = self.inner.lock();
        inner.writer.flush()?;
        inner.writer.get_ref().sync_all()?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
