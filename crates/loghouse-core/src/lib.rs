//! Core types for loghouse, a segmented append-only commit log.
//!
//! This crate holds what every other loghouse crate agrees on:
//!
//! - [`Record`] — a payload plus its assigned offset, and the canonical
//!   big-endian blob encoding used on disk.
//! - [`Error`] / [`Result`] — the shared error taxonomy.
//! - [`CommitLog`] — the capability the serving layer consumes; the storage
//!   engine implements it.

pub mod commit_log;
pub mod error;
pub mod record;

pub use commit_log::CommitLog;
pub use error::{Error, Result};
pub use record::{Record, OFFSET_WIDTH};
