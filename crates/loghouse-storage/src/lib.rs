//! Disk-backed storage engine for the loghouse commit log.
//!
//! The engine is four layers, leaves first:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │ Log       — ordered segments, one active; rolls, reads,  │
//! │             truncates, sequential reader                 │
//! ├──────────────────────────────────────────────────────────┤
//! │ Segment   — one store + one index under a base offset    │
//! ├────────────────────────────┬─────────────────────────────┤
//! │ Store                      │ Index                       │
//! │ length-prefixed byte file  │ mmap'd rel-offset → position│
//! └────────────────────────────┴─────────────────────────────┘
//! ```
//!
//! An append flows `Log` → active `Segment` → serialize → `Store` (returns
//! the byte position) → `Index` entry → bump next offset → roll if maxed. A
//! read binary-searches segments by base offset, looks up the position in the
//! segment's index, and decodes the store entry there.
//!
//! Only [`Log`], [`LogConfig`] and [`LogReader`] are public; the inner layers
//! are implementation detail behind the [`loghouse_core::CommitLog`]
//! capability.

pub mod config;
mod index;
mod log;
mod reader;
mod segment;
mod store;

pub use config::LogConfig;
pub use log::Log;
pub use reader::LogReader;
