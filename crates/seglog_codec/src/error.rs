//! Error types for the codec crate.

use thiserror::Error;

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors that can occur while encoding or decoding a record.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// Failed to encode a record.
    #[error("encoding failed: {message}")]
    EncodingFailed {
        /// Description of the encoding error.
        message: String,
    },

    /// Failed to decode record bytes.
    #[error("decoding failed: {message}")]
    DecodingFailed {
        /// Description of the decoding error.
        message: String,
    },
}

impl CodecError {
    /// Creates an encoding failed error.
    pub fn encoding(message: impl Into<String>) -> Self {
        Self::EncodingFailed {
            message: message.into(),
        }
    }

    /// Creates a decoding failed error.
    pub fn decoding(message: impl Into<String>) -> Self {
        Self::DecodingFailed {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = CodecError::decoding("missing field `value`");
        assert_eq!(err.to_string(), "decoding failed: missing field `value`");

        let err = CodecError::encoding("writer closed");
        assert_eq!(err.to_string(), "encoding failed: writer closed");
    }
}
