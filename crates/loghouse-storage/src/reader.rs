//! Sequential reader over the raw store bytes of a log.
//!
//! Produced by `Log::reader`. Yields each segment's store file from position
//! zero, in base-offset order, so the consumer sees length-prefixed record
//! blobs back to back — the exact bytes a replica needs to rebuild the log.
//!
//! The reader is a snapshot: segment list and per-store sizes are captured
//! when it is created. Appends after that point are not reflected, and the
//! `Arc` on each store keeps the file readable even if a concurrent truncate
//! unlinks it.

use std::io;
use std::sync::Arc;

use loghouse_core::Error;

use crate::store::Store;

pub struct LogReader {
    slices: Vec<StoreSlice>,
    current: usize,
}

pub(crate) struct StoreSlice {
    store: Arc<Store>,
    position: u64,
    len: u64,
}

impl StoreSlice {
    pub fn new(store: Arc<Store>, len: u64) -> Self {
        Self {
            store,
            position: 0,
            len,
        }
    }
}

impl LogReader {
    pub(crate) fn new(slices: Vec<StoreSlice>) -> Self {
        Self { slices, current: 0 }
    }
}

impl io::Read for LogReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        while let Some(slice) = self.slices.get_mut(self.current) {
            let remaining = slice.len - slice.position;
            if remaining == 0 {
                self.current += 1;
                continue;
            }
            let n = buf.len().min(remaining as usize);
            slice
                .store
                .read_at(&mut buf[..n], slice.position)
                .map_err(into_io)?;
            slice.position += n as u64;
            return Ok(n);
        }
        Ok(0)
    }
}

fn into_io(err: Error) -> io::Error {
    match err {
        Error::Io(err) => err,
        other => io::Error::new(io::ErrorKind::Other, other),
    }
}
