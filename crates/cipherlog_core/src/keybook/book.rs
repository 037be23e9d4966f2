//! Offset-indexed key book.

use crate::error::{CoreError, CoreResult};
use crate::keybook::index::RangeMap;
use crate::keybook::key::{CipherKey, KeyRecord};
use serde::{Deserialize, Serialize};

/// One serialized key book entry: the offset a key takes effect at, and
/// the key itself in record form.
///
/// Field names (`key` = offset, `value` = key record) are the wire format
/// shared with every other implementation of the key book structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyBookEntry {
    /// Byte offset the key governs from.
    pub key: u64,
    /// The key in its portable form.
    pub value: KeyRecord,
}

/// The key book: which key governs which byte range of a log.
///
/// A book is a sorted index of `(offset, key)` entries. The key active at
/// byte offset `o` is the entry with the greatest offset not exceeding
/// `o`; rotating a key in at offset `o` makes it govern `[o, next)` where
/// `next` is the following rotation (or the end of the stream). Entries
/// are only ever added - past ciphertext stays readable forever.
///
/// Offsets are expected to arrive in non-decreasing order, mirroring the
/// owning log's write position; the book only enforces uniqueness.
///
/// Key rotation is caller-driven and deliberate: encrypting against an
/// empty book is an error, not an implicitly created key.
///
/// # Concurrency
///
/// A `KeyBook` is an ordinary mutable structure with no internal locking.
/// [`rotate_key`](Self::rotate_key)/[`add_key`](Self::add_key) mutate;
/// everything else reads. The owning log's write-path mutual exclusion
/// must serialize them.
///
/// # Example
///
/// ```
/// use cipherlog_core::KeyBook;
///
/// let mut book = KeyBook::new();
/// book.rotate_key(0).unwrap();
///
/// let ciphertext = book.encrypt(b"secret", 0).unwrap();
/// assert_eq!(book.decrypt(&ciphertext, 0).unwrap(), b"secret");
/// ```
#[derive(Debug, Clone, Default)]
pub struct KeyBook {
    entries: RangeMap<u64, CipherKey>,
}

impl KeyBook {
    /// Creates an empty key book.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: RangeMap::new(),
        }
    }

    /// Returns the number of keys in the book.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no key has ever been rotated in.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Rotates a fresh random key in, effective from `offset` onward.
    ///
    /// The new key has counter base 0.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::DuplicateKey`] if a key already governs
    /// exactly this offset; the book keeps the existing key.
    pub fn rotate_key(&mut self, offset: u64) -> CoreResult<()> {
        self.add_key(offset, CipherKey::generate())
    }

    /// Inserts an externally supplied key, effective from `offset` onward.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::DuplicateKey`] if a key already governs
    /// exactly this offset.
    pub fn add_key(&mut self, offset: u64, key: CipherKey) -> CoreResult<()> {
        self.entries
            .insert(offset, key)
            .map_err(|_| CoreError::DuplicateKey { offset })
    }

    /// Resolves the key active at byte offset `offset`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::NoApplicableKey`] if no key governs the
    /// offset - the book is empty, or the offset precedes the first
    /// rotation.
    pub fn resolve(&self, offset: u64) -> CoreResult<&CipherKey> {
        self.entries
            .floor(&offset)
            .map(|(_, key)| key)
            .ok_or(CoreError::NoApplicableKey { offset })
    }

    /// Encrypts `data` as the bytes at absolute stream offset `offset`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::EmptyBook`] if no key has ever been rotated
    /// in, or [`CoreError::NoApplicableKey`] if the offset precedes the
    /// first rotation.
    pub fn encrypt(&self, data: &[u8], offset: u64) -> CoreResult<Vec<u8>> {
        if self.entries.is_empty() {
            return Err(CoreError::EmptyBook);
        }
        Ok(self.resolve(offset)?.encrypt(data, offset))
    }

    /// Decrypts `data` read back from absolute stream offset `offset`.
    ///
    /// The offset must be exactly the one the data was encrypted at;
    /// there is no integrity check to catch a mismatch.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`encrypt`](Self::encrypt).
    pub fn decrypt(&self, data: &[u8], offset: u64) -> CoreResult<Vec<u8>> {
        if self.entries.is_empty() {
            return Err(CoreError::EmptyBook);
        }
        Ok(self.resolve(offset)?.decrypt(data, offset))
    }

    /// Serializes the book to its portable, ascending-ordered structure.
    ///
    /// The result is plain data (integer offsets, hex nonces, integer
    /// counter bases) suitable for persistence by the caller; rebuilding
    /// a book from it resolves identically to this one.
    #[must_use]
    pub fn serialize(&self) -> Vec<KeyBookEntry> {
        self.entries
            .iter()
            .map(|(offset, key)| KeyBookEntry {
                key: *offset,
                value: key.to_record(),
            })
            .collect()
    }

    /// Rebuilds a book from a pre-parsed serialized structure.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Deserialization`] wrapping the cause if any
    /// entry holds a malformed key or a duplicate offset.
    pub fn from_entries(entries: impl IntoIterator<Item = KeyBookEntry>) -> CoreResult<Self> {
        let mut book = Self::new();
        for entry in entries {
            let key = CipherKey::from_record(&entry.value).map_err(|err| {
                CoreError::deserialization(format!(
                    "key book entry at offset {}: {err}",
                    entry.key
                ))
            })?;
            book.add_key(entry.key, key).map_err(|err| {
                CoreError::deserialization(format!("key book entry rejected: {err}"))
            })?;
        }
        Ok(book)
    }

    /// Rebuilds a book from the JSON rendering of its serialized form.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Deserialization`] wrapping the parse failure
    /// if the text is not a valid entry sequence, or the element failure
    /// if any entry is malformed.
    pub fn from_json(text: &str) -> CoreResult<Self> {
        let entries: Vec<KeyBookEntry> = serde_json::from_str(text)
            .map_err(|err| CoreError::deserialization(format!("invalid key book: {err}")))?;
        Self::from_entries(entries)
    }
}
