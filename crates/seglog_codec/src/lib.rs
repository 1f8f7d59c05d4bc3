//! # SegLog Codec
//!
//! The record type and the record encodings used by SegLog.
//!
//! The storage engine treats a record as an offset plus opaque bytes. This
//! crate owns how that pair becomes the payload a segment writes:
//!
//! - [`RecordFormat::Cbor`] - a CBOR map carrying both offset and value
//! - [`RecordFormat::Raw`] - the value bytes only
//!
//! ## Usage
//!
//! ```
//! use seglog_codec::{Record, RecordFormat};
//!
//! let record = Record::with_offset(b"hello".to_vec(), 3);
//! let bytes = RecordFormat::Cbor.encode(&record).unwrap();
//! let decoded = RecordFormat::Cbor.decode(&bytes, 3).unwrap();
//! assert_eq!(record, decoded);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod format;
mod record;

pub use error::{CodecError, CodecResult};
pub use format::RecordFormat;
pub use record::Record;
