//! Error types for cipherlog core.

use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in cipherlog core operations.
///
/// All failures are synchronous and non-retryable; a failed operation
/// never leaves a key book partially mutated.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Storage backend error.
    #[error("storage error: {0}")]
    Storage(#[from] cipherlog_storage::StorageError),

    /// Value codec error.
    #[error("codec error: {0}")]
    Codec(#[from] cipherlog_codec::CodecError),

    /// A serialized key book or one of its entries is malformed.
    #[error("key book deserialization failed: {message}")]
    Deserialization {
        /// Description of the failure, including the original cause.
        message: String,
    },

    /// A key is already registered at this offset.
    #[error("a key is already registered at offset {offset}")]
    DuplicateKey {
        /// The offset that was rejected.
        offset: u64,
    },

    /// Wrong type or shape passed to a key constructor.
    #[error("invalid argument: {message}")]
    InvalidArgument {
        /// Description of what was wrong.
        message: String,
    },

    /// No key governs the queried offset.
    #[error("no key governs offset {offset}")]
    NoApplicableKey {
        /// The offset that could not be resolved.
        offset: u64,
    },

    /// The key book is empty: no key has ever been rotated in.
    #[error("key book is empty: rotate a key in before encrypting")]
    EmptyBook,

    /// The log was opened without a key book.
    #[error("encryption not enabled on this log")]
    EncryptionNotEnabled,

    /// The record index does not exist in the log.
    #[error("record not found: index {index}")]
    RecordNotFound {
        /// The index that was requested.
        index: u64,
    },

    /// The log's on-disk framing is corrupted.
    #[error("log corrupted: {message}")]
    Corrupted {
        /// Description of the corruption.
        message: String,
    },
}

impl CoreError {
    /// Creates a deserialization error.
    pub fn deserialization(message: impl Into<String>) -> Self {
        Self::Deserialization {
            message: message.into(),
        }
    }

    /// Creates an invalid argument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Creates a corruption error.
    pub fn corrupted(message: impl Into<String>) -> Self {
        Self::Corrupted {
            message: message.into(),
        }
    }

    /// Returns true if this error means no key governed the requested
    /// offset.
    ///
    /// [`CoreError::EmptyBook`] is the empty-book specialization of
    /// [`CoreError::NoApplicableKey`]; callers that only care about the
    /// class can match both through this predicate.
    #[must_use]
    pub fn is_no_applicable_key(&self) -> bool {
        matches!(self, Self::NoApplicableKey { .. } | Self::EmptyBook)
    }
}
