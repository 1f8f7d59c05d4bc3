//! Log configuration.

use crate::encoding::ENTRY_WIDTH;
use crate::error::{CoreError, CoreResult};
use seglog_codec::RecordFormat;

/// Store size limit used when none is configured.
pub const DEFAULT_MAX_STORE_BYTES: u64 = 1024;

/// Index size limit used when none is configured.
pub const DEFAULT_MAX_INDEX_BYTES: u64 = 1024;

/// Configuration for opening a log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Store file size at which the active segment is rotated.
    pub max_store_bytes: u64,

    /// Index file size at which the active segment is rotated. Also the
    /// capacity the index file is pre-allocated and mapped at.
    pub max_index_bytes: u64,

    /// Offset of the first record of a newly created, empty log.
    pub initial_offset: u64,

    /// Encoding used for records written to the store.
    pub record_format: RecordFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_store_bytes: DEFAULT_MAX_STORE_BYTES,
            max_index_bytes: DEFAULT_MAX_INDEX_BYTES,
            initial_offset: 0,
            record_format: RecordFormat::Cbor,
        }
    }
}

impl Config {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the store rotation threshold.
    #[must_use]
    pub const fn max_store_bytes(mut self, bytes: u64) -> Self {
        self.max_store_bytes = bytes;
        self
    }

    /// Sets the index rotation threshold and mapped capacity.
    #[must_use]
    pub const fn max_index_bytes(mut self, bytes: u64) -> Self {
        self.max_index_bytes = bytes;
        self
    }

    /// Sets the starting offset of a new log.
    #[must_use]
    pub const fn initial_offset(mut self, offset: u64) -> Self {
        self.initial_offset = offset;
        self
    }

    /// Sets the record encoding.
    #[must_use]
    pub const fn record_format(mut self, format: RecordFormat) -> Self {
        self.record_format = format;
        self
    }

    /// Replaces zero size limits with their defaults.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        if self.max_store_bytes == 0 {
            self.max_store_bytes = DEFAULT_MAX_STORE_BYTES;
        }
        if self.max_index_bytes == 0 {
            self.max_index_bytes = DEFAULT_MAX_INDEX_BYTES;
        }
        self
    }

    /// Checks that the index can hold at least one entry.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidConfig`] if `max_index_bytes` is smaller
    /// than a single index entry.
    pub fn validate(&self) -> CoreResult<()> {
        if self.max_index_bytes < ENTRY_WIDTH {
            return Err(CoreError::invalid_config(format!(
                "max_index_bytes {} cannot hold a {ENTRY_WIDTH}-byte index entry",
                self.max_index_bytes
            )));
        }
        Ok(())
    }
}
