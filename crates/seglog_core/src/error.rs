//! Error types for SegLog core.

use std::io;
use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in log, segment, store and index operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// I/O error from a store file, index file or the log directory.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Record codec error.
    #[error("codec error: {0}")]
    Codec(#[from] seglog_codec::CodecError),

    /// No segment holds the requested offset.
    #[error("offset out of range: {offset}")]
    OffsetOutOfRange {
        /// The requested absolute offset.
        offset: u64,
    },

    /// Index read past the last written entry.
    #[error("end of index: entry at byte {position}, index size {size}")]
    IndexEof {
        /// Byte position of the requested entry.
        position: u64,
        /// Logical size of the index in bytes.
        size: u64,
    },

    /// Index write past the mapped capacity.
    #[error("end of index: size {size} leaves no room for an entry in capacity {capacity}")]
    IndexFull {
        /// Logical size of the index in bytes.
        size: u64,
        /// Mapped capacity of the index in bytes.
        capacity: u64,
    },

    /// The log holds no segments, either because it was closed or because
    /// a truncation removed its active segment.
    #[error("log has no segments")]
    NoSegments,

    /// Invalid configuration.
    #[error("invalid configuration: {message}")]
    InvalidConfig {
        /// Description of the problem.
        message: String,
    },
}

impl CoreError {
    /// Creates an offset out of range error.
    pub fn out_of_range(offset: u64) -> Self {
        Self::OffsetOutOfRange { offset }
    }

    /// Creates an invalid configuration error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Returns true for end-of-file conditions: index reads or writes past
    /// their bounds, and store reads past the end of the file.
    #[must_use]
    pub fn is_eof(&self) -> bool {
        match self {
            Self::IndexEof { .. } | Self::IndexFull { .. } => true,
            Self::Io(e) => e.kind() == io::ErrorKind::UnexpectedEof,
            _ => false,
        }
    }

    /// Returns true if the error is [`CoreError::OffsetOutOfRange`].
    #[must_use]
    pub fn is_out_of_range(&self) -> bool {
        matches!(self, Self::OffsetOutOfRange { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eof_classification() {
        assert!(CoreError::IndexEof {
            position: 12,
            size: 0
        }
        .is_eof());
        assert!(CoreError::IndexFull {
            size: 24,
            capacity: 30
        }
        .is_eof());
        assert!(CoreError::Io(io::Error::new(io::ErrorKind::UnexpectedEof, "short")).is_eof());
        assert!(!CoreError::Io(io::Error::new(io::ErrorKind::PermissionDenied, "no")).is_eof());
        assert!(!CoreError::out_of_range(3).is_eof());
    }

    #[test]
    fn out_of_range_display() {
        let err = CoreError::out_of_range(17);
        assert!(err.is_out_of_range());
        assert_eq!(err.to_string(), "offset out of range: 17");
    }
}
