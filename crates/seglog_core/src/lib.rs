//! # SegLog Core
//!
//! A single-node, segmented, append-only commit log.
//!
//! This crate provides:
//! - An append-only, length-prefixed record store per segment
//! - A memory-mapped offset index per segment
//! - Segment rotation, retention truncation and directory recovery
//! - Sequential export of the raw store bytes
//!
//! Only [`Log`] is public. Stores, indexes and segments are reachable
//! solely through it and its lock.
//!
//! ## On-Disk Layout
//!
//! ```text
//! <dir>/
//! ├─ <base>.store    # | len (8, BE) | payload | ...
//! └─ <base>.index    # | relative offset (4, BE) | position (8, BE) | ...
//! ```
//!
//! ## Example
//!
//! ```rust
//! use seglog_core::{Config, Log, Record};
//!
//! let dir = tempfile::tempdir().unwrap();
//! let log = Log::open(dir.path(), Config::default()).unwrap();
//!
//! let offset = log.append(Record::new(b"hello world".to_vec())).unwrap();
//! assert_eq!(log.read(offset).unwrap().value, b"hello world");
//! log.close().unwrap();
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod encoding;
mod error;
mod index;
mod log;
mod reader;
mod segment;
mod store;

pub use config::{Config, DEFAULT_MAX_INDEX_BYTES, DEFAULT_MAX_STORE_BYTES};
pub use error::{CoreError, CoreResult};
pub use log::Log;
pub use reader::LogReader;
pub use segment::SegmentInfo;
pub use seglog_codec::{CodecError, Record, RecordFormat};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
