//! The `Record` type and its on-disk encoding.
//!
//! A record is an opaque byte payload plus the 64-bit offset the log assigned
//! to it at append time. Offsets are monotonic and gap-free for the lifetime
//! of a log directory; they are never reused, even after truncation.
//!
//! ## Blob encoding
//!
//! On disk a record is serialized to a blob the store frames with its own
//! 8-byte length prefix:
//!
//! ```text
//! ┌──────────────────┬─────────────────┐
//! │ offset (8 B, BE) │ value (N bytes) │
//! └──────────────────┴─────────────────┘
//! ```
//!
//! Encode/decode is a byte-exact round trip. A blob shorter than the offset
//! header is corrupt and surfaces as [`Error::CorruptRecord`].

use bytes::{Buf, BufMut, Bytes, BytesMut};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Width of the offset header at the front of every encoded record blob.
pub const OFFSET_WIDTH: usize = 8;

/// A single record in the log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Offset assigned by the log. Zero until appended; producers may omit it.
    #[serde(default)]
    pub offset: u64,

    /// Payload bytes. Opaque to the log.
    pub value: Bytes,
}

impl Record {
    pub fn new(value: impl Into<Bytes>) -> Self {
        Self {
            offset: 0,
            value: value.into(),
        }
    }

    /// Size of the encoded blob, excluding the store's length prefix.
    pub fn encoded_len(&self) -> usize {
        OFFSET_WIDTH + self.value.len()
    }

    /// Serialize to the canonical `[offset][value]` blob.
    pub fn encode(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(self.encoded_len());
        buf.put_u64(self.offset);
        buf.put_slice(&self.value);
        buf.freeze()
    }

    /// Decode a blob produced by [`Record::encode`].
    pub fn decode(mut blob: Bytes) -> Result<Self> {
        if blob.len() < OFFSET_WIDTH {
            return Err(Error::CorruptRecord(format!(
                "blob of {} bytes is shorter than the offset header",
                blob.len()
            )));
        }
        let offset = blob.get_u64();
        Ok(Self {
            offset,
            value: blob,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_decode_round_trip() {
        let record = Record {
            offset: 16,
            value: Bytes::from("hello world"),
        };
        let blob = record.encode();
        assert_eq!(blob.len(), record.encoded_len());

        let decoded = Record::decode(blob).unwrap();
        assert_eq!(decoded, record);
    }

    #[test]
    fn encode_lays_out_big_endian_offset_then_value() {
        let record = Record {
            offset: 1,
            value: Bytes::from_static(b"ab"),
        };
        let blob = record.encode();
        assert_eq!(&blob[..], &[0, 0, 0, 0, 0, 0, 0, 1, b'a', b'b']);
    }

    #[test]
    fn empty_value_round_trips() {
        let record = Record {
            offset: u64::MAX,
            value: Bytes::new(),
        };
        let decoded = Record::decode(record.encode()).unwrap();
        assert_eq!(decoded.offset, u64::MAX);
        assert!(decoded.value.is_empty());
    }

    #[test]
    fn short_blob_is_corrupt() {
        let err = Record::decode(Bytes::from_static(&[0, 1, 2])).unwrap_err();
        assert!(matches!(err, Error::CorruptRecord(_)));
    }

    #[test]
    fn serde_omits_offset_on_produce() {
        // Producers send only the value; the offset defaults to zero.
        let record: Record = serde_json::from_str(r#"{"value": [104, 105]}"#).unwrap();
        assert_eq!(record.offset, 0);
        assert_eq!(record.value, Bytes::from_static(b"hi"));
    }
}
