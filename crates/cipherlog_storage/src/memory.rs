//! In-memory storage for testing and ephemeral logs.

use crate::error::{StorageError, StorageResult};
use crate::storage::LogStorage;
use parking_lot::RwLock;

/// An in-memory append-only store.
///
/// Suitable for unit tests, integration tests, and logs that do not need
/// to survive the process.
///
/// # Example
///
/// ```rust
/// use cipherlog_storage::{LogStorage, MemoryStorage};
///
/// let mut storage = MemoryStorage::new();
/// let offset = storage.append(b"test data").unwrap();
/// assert_eq!(offset, 0);
/// assert_eq!(storage.size().unwrap(), 9);
/// ```
#[derive(Debug, Default)]
pub struct MemoryStorage {
    data: RwLock<Vec<u8>>,
}

impl MemoryStorage {
    /// Creates a new empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an in-memory store with pre-existing content.
    ///
    /// Useful for testing recovery over an already-written stream.
    #[must_use]
    pub fn with_data(data: Vec<u8>) -> Self {
        Self {
            data: RwLock::new(data),
        }
    }

    /// Returns a copy of the full stream content.
    #[must_use]
    pub fn data(&self) -> Vec<u8> {
        self.data.read().clone()
    }
}

impl LogStorage for MemoryStorage {
    fn read_at(&self, offset: u64, len: usize) -> StorageResult<Vec<u8>> {
        let data = self.data.read();
        let size = data.len() as u64;
        let start = offset as usize;
        let end = start.saturating_add(len);

        if offset > size || end > data.len() {
            return Err(StorageError::ReadPastEnd { offset, len, size });
        }

        Ok(data[start..end].to_vec())
    }

    fn append(&mut self, new_data: &[u8]) -> StorageResult<u64> {
        let mut data = self.data.write();
        let offset = data.len() as u64;
        data.extend_from_slice(new_data);
        Ok(offset)
    }

    fn flush(&mut self) -> StorageResult<()> {
        // nothing pending in memory
        Ok(())
    }

    fn size(&self) -> StorageResult<u64> {
        Ok(self.data.read().len() as u64)
    }

    fn sync(&mut self) -> StorageResult<()> {
        // no metadata to sync
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_store_is_empty() {
        let storage = MemoryStorage::new();
        assert_eq!(storage.size().unwrap(), 0);
        assert!(storage.data().is_empty());
    }

    #[test]
    fn append_returns_write_position() {
        let mut storage = MemoryStorage::new();

        let first = storage.append(b"hello").unwrap();
        assert_eq!(first, 0);

        let second = storage.append(b" world").unwrap();
        assert_eq!(second, 5);

        assert_eq!(storage.size().unwrap(), 11);
    }

    #[test]
    fn read_at_returns_written_bytes() {
        let mut storage = MemoryStorage::new();
        storage.append(b"hello world").unwrap();

        assert_eq!(storage.read_at(0, 5).unwrap(), b"hello");
        assert_eq!(storage.read_at(6, 5).unwrap(), b"world");
    }

    #[test]
    fn read_past_end_fails() {
        let mut storage = MemoryStorage::new();
        storage.append(b"hello").unwrap();

        let result = storage.read_at(10, 5);
        assert!(matches!(result, Err(StorageError::ReadPastEnd { .. })));
    }

    #[test]
    fn read_extending_past_end_fails() {
        let mut storage = MemoryStorage::new();
        storage.append(b"hello").unwrap();

        let result = storage.read_at(3, 10);
        assert!(matches!(result, Err(StorageError::ReadPastEnd { .. })));
    }

    #[test]
    fn empty_append_keeps_size() {
        let mut storage = MemoryStorage::new();
        let offset = storage.append(b"").unwrap();
        assert_eq!(offset, 0);
        assert_eq!(storage.size().unwrap(), 0);
    }

    #[test]
    fn zero_length_read_is_empty() {
        let mut storage = MemoryStorage::new();
        storage.append(b"hello").unwrap();

        assert!(storage.read_at(2, 0).unwrap().is_empty());
    }

    #[test]
    fn with_data_preloads_stream() {
        let storage = MemoryStorage::with_data(b"preloaded".to_vec());
        assert_eq!(storage.size().unwrap(), 9);
        assert_eq!(storage.read_at(0, 9).unwrap(), b"preloaded");
    }

    #[test]
    fn flush_and_sync_succeed() {
        let mut storage = MemoryStorage::new();
        storage.append(b"data").unwrap();
        assert!(storage.flush().is_ok());
        assert!(storage.sync().is_ok());
    }
}
