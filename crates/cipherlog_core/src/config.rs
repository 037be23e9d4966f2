//! Log configuration.

use crate::keybook::KeyBook;
use cipherlog_codec::ValueEncoding;

/// Configuration for opening a log.
#[derive(Debug, Default)]
pub struct LogConfig {
    /// How record values are represented as bytes.
    pub encoding: ValueEncoding,

    /// Key book to encrypt with; `None` opens a plaintext log.
    pub key_book: Option<KeyBook>,

    /// Whether the first encrypting append may rotate an initial key in
    /// by itself. Off by default: key rotation is deliberate, and an
    /// append against an empty book fails instead.
    pub auto_rotate: bool,

    /// Whether to flush the storage after every append (safer but
    /// slower).
    pub sync_on_append: bool,
}

impl LogConfig {
    /// Creates a configuration with default values: binary encoding,
    /// no encryption, explicit rotation, no flush per append.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the value encoding.
    #[must_use]
    pub fn encoding(mut self, encoding: ValueEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    /// Sets the key book, enabling encryption.
    #[must_use]
    pub fn key_book(mut self, book: KeyBook) -> Self {
        self.key_book = Some(book);
        self
    }

    /// Sets whether the first encrypting append may provision a key.
    #[must_use]
    pub fn auto_rotate(mut self, value: bool) -> Self {
        self.auto_rotate = value;
        self
    }

    /// Sets whether to flush after every append.
    #[must_use]
    pub fn sync_on_append(mut self, value: bool) -> Self {
        self.sync_on_append = value;
        self
    }
}
