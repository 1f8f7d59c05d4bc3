//! The record type stored in the log.

/// A single log record: opaque payload bytes plus the offset the log
/// assigned to it.
///
/// The offset is set by the segment at append time; any value a caller
/// places there before appending is overwritten.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    /// Opaque payload bytes.
    pub value: Vec<u8>,
    /// Absolute offset of the record in the log.
    pub offset: u64,
}

impl Record {
    /// Creates a record carrying `value`, with offset 0 until appended.
    pub fn new(value: impl Into<Vec<u8>>) -> Self {
        Self {
            value: value.into(),
            offset: 0,
        }
    }

    /// Creates a record with an explicit offset.
    pub fn with_offset(value: impl Into<Vec<u8>>, offset: u64) -> Self {
        Self {
            value: value.into(),
            offset,
        }
    }

    /// Returns the payload length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.value.len()
    }

    /// Returns true if the payload is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }
}

impl From<Vec<u8>> for Record {
    fn from(value: Vec<u8>) -> Self {
        Self::new(value)
    }
}

impl From<&[u8]> for Record {
    fn from(value: &[u8]) -> Self {
        Self::new(value)
    }
}

impl From<&str> for Record {
    fn from(value: &str) -> Self {
        Self::new(value.as_bytes())
    }
}
