//! # SegLog Testkit
//!
//! Test utilities for SegLog.
//!
//! This crate provides:
//! - Temporary log fixtures
//! - Property-based test generators using proptest
//! - Concurrent stress testing utilities
//! - A close/reopen durability harness
//!
//! ## Usage
//!
//! ```rust,ignore
//! use seglog_testkit::prelude::*;
//!
//! #[test]
//! fn test_with_log() {
//!     with_temp_log(Config::default(), |log| {
//!         let offset = log.append(Record::from("hello")).unwrap();
//!         assert_eq!(log.read(offset).unwrap().value, b"hello");
//!     });
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod durability;
pub mod fixtures;
pub mod generators;
pub mod stress;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::durability::*;
    pub use crate::fixtures::*;
    pub use crate::generators::*;
    pub use crate::stress::*;
    pub use seglog_core::{Config, Log, Record, RecordFormat};
}

pub use durability::*;
pub use fixtures::*;
pub use generators::*;
pub use stress::*;
