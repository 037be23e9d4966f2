//! File-backed storage for persistent logs.

use crate::error::{StorageError, StorageResult};
use crate::storage::LogStorage;
use parking_lot::RwLock;
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

/// A file-backed append-only store.
///
/// Data survives process restarts. The stream size is tracked in memory
/// and initialized from file metadata on open.
///
/// # Durability
///
/// - `flush()` calls `File::flush()` to push data to the OS
/// - `sync()` calls `File::sync_all()` to ensure data is on disk
///
/// # Example
///
/// ```no_run
/// use cipherlog_storage::{FileStorage, LogStorage};
/// use std::path::Path;
///
/// let mut storage = FileStorage::open(Path::new("log.bin")).unwrap();
/// let offset = storage.append(b"persistent data").unwrap();
/// storage.sync().unwrap();
/// ```
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    file: RwLock<File>,
    size: RwLock<u64>,
}

impl FileStorage {
    /// Opens or creates a file store at the given path.
    ///
    /// An existing file is opened for reading and appending; its current
    /// length becomes the stream size.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or created.
    pub fn open(path: &Path) -> StorageResult<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)?;

        let size = file.metadata()?.len();

        Ok(Self {
            path: path.to_path_buf(),
            file: RwLock::new(file),
            size: RwLock::new(size),
        })
    }

    /// Returns the path to the underlying file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LogStorage for FileStorage {
    fn read_at(&self, offset: u64, len: usize) -> StorageResult<Vec<u8>> {
        let size = *self.size.read();
        let end = offset.saturating_add(len as u64);

        if offset > size || end > size {
            return Err(StorageError::ReadPastEnd { offset, len, size });
        }

        if len == 0 {
            return Ok(Vec::new());
        }

        let mut file = self.file.write();
        file.seek(SeekFrom::Start(offset))?;

        let mut buf = vec![0u8; len];
        file.read_exact(&mut buf)?;
        Ok(buf)
    }

    fn append(&mut self, data: &[u8]) -> StorageResult<u64> {
        let mut file = self.file.write();
        let mut size = self.size.write();

        let offset = *size;
        file.seek(SeekFrom::Start(offset))?;
        file.write_all(data)?;

        *size += data.len() as u64;
        Ok(offset)
    }

    fn flush(&mut self) -> StorageResult<()> {
        self.file.write().flush()?;
        Ok(())
    }

    fn size(&self) -> StorageResult<u64> {
        Ok(*self.size.read())
    }

    fn sync(&mut self) -> StorageResult<()> {
        let mut file = self.file.write();
        file.flush()?;
        file.sync_all()?;
        Ok(())
    }
}
