//! Error types for the codec crate.

use thiserror::Error;

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors that can occur during encoding or decoding.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// The value kind cannot be represented by the chosen encoding.
    #[error("cannot encode {kind} value with the {encoding} encoding")]
    UnsupportedValue {
        /// The encoding in use.
        encoding: &'static str,
        /// The kind of value that was passed.
        kind: &'static str,
    },

    /// Decoded bytes are not valid UTF-8.
    #[error("invalid UTF-8 text")]
    InvalidUtf8,

    /// Failed to encode a value to JSON.
    #[error("JSON encoding failed: {message}")]
    JsonEncodingFailed {
        /// Description of the encoding error.
        message: String,
    },

    /// Failed to decode bytes as JSON.
    #[error("JSON decoding failed: {message}")]
    JsonDecodingFailed {
        /// Description of the decoding error.
        message: String,
    },

    /// The encoding name is not one of the supported tags.
    #[error("unknown value encoding: {name}")]
    UnknownEncoding {
        /// The name that failed to parse.
        name: String,
    },
}

impl CodecError {
    /// Creates a JSON encoding failure.
    pub fn json_encoding_failed(message: impl Into<String>) -> Self {
        Self::JsonEncodingFailed {
            message: message.into(),
        }
    }

    /// Creates a JSON decoding failure.
    pub fn json_decoding_failed(message: impl Into<String>) -> Self {
        Self::JsonDecodingFailed {
            message: message.into(),
        }
    }
}
