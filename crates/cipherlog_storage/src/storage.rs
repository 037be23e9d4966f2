//! Storage trait definition.

use crate::error::StorageResult;

/// An append-only byte stream.
///
/// Backends are **opaque byte stores**. Data only ever grows at the end;
/// there is no truncation and no in-place mutation. The layers above own
/// all interpretation of the bytes - a backend does not understand record
/// frames, value encodings, or ciphertext.
///
/// # Invariants
///
/// - `append` returns the byte offset where the data was written, which
///   equals the stream size before the call
/// - `read_at` returns exactly the bytes previously written at that offset
/// - `flush` ensures all appended data has reached the OS
/// - implementations must be `Send + Sync` for concurrent access
pub trait LogStorage: Send + Sync {
    /// Reads `len` bytes starting at `offset`.
    ///
    /// # Errors
    ///
    /// Returns an error if the range extends beyond the current size or an
    /// I/O error occurs.
    fn read_at(&self, offset: u64, len: usize) -> StorageResult<Vec<u8>>;

    /// Appends data to the end of the stream.
    ///
    /// Returns the offset where the data was written.
    ///
    /// # Errors
    ///
    /// Returns an error if an I/O error occurs.
    fn append(&mut self, data: &[u8]) -> StorageResult<u64>;

    /// Flushes all pending writes to the OS.
    ///
    /// # Errors
    ///
    /// Returns an error if the flush operation fails.
    fn flush(&mut self) -> StorageResult<()>;

    /// Returns the current size of the stream in bytes.
    ///
    /// This is the offset where the next `append` will write.
    ///
    /// # Errors
    ///
    /// Returns an error if the size cannot be determined.
    fn size(&self) -> StorageResult<u64>;

    /// Syncs all data and metadata to durable storage.
    ///
    /// A stronger guarantee than `flush`: file metadata (size, timestamps)
    /// is durable as well once this returns.
    ///
    /// # Errors
    ///
    /// Returns an error if the sync operation fails.
    fn sync(&mut self) -> StorageResult<()>;
}
