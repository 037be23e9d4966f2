//! Encrypted append-only log.
//!
//! [`EncryptedLog`] composes the pieces of this workspace: an opaque
//! append-only byte store underneath, a value encoding at the boundary,
//! and a key book in between. It holds the store as a collaborator and
//! transforms data only on the append and get paths; everything else is
//! forwarded unchanged.

use crate::config::LogConfig;
use crate::error::{CoreError, CoreResult};
use crate::keybook::{KeyBook, KeyBookEntry};
use cipherlog_codec::{Value, ValueEncoding};
use cipherlog_storage::LogStorage;
use tracing::debug;

/// Bytes of the little-endian length prefix in front of every record.
const FRAME_HEADER_SIZE: usize = 4;

/// Placement of one record inside the stream.
#[derive(Debug, Clone, Copy)]
struct RecordMeta {
    /// Where the record's frame starts in the backing store.
    physical_offset: u64,
    /// Where the record's payload starts in the logical payload stream.
    ///
    /// Logical offsets count payload bytes only. They are the offsets the
    /// key book sees, so they must stay stable no matter how the store
    /// frames records physically.
    logical_offset: u64,
    /// Payload length in bytes.
    len: u32,
}

/// An append-only record log with offset-addressed encryption.
///
/// Records are framed as a `u32` little-endian payload length followed by
/// the payload. With a key book configured, payloads are encrypted at
/// their logical byte offset before framing, so any record can be read
/// back independently and keys can rotate mid-stream.
///
/// Without a key book the log is a plaintext record log with the same
/// API.
///
/// # Ordering contract
///
/// [`rotate_key`](Self::rotate_key) takes effect at the current logical
/// end of the stream: call it strictly before appending the data the new
/// key must govern. Reads resolve the governing key from the offset the
/// record was written at, so the pairing is automatic on the get path.
///
/// # Example
///
/// ```
/// use cipherlog_core::{EncryptedLog, KeyBook, LogConfig};
/// use cipherlog_storage::MemoryStorage;
///
/// let config = LogConfig::new().key_book(KeyBook::new()).auto_rotate(true);
/// let mut log = EncryptedLog::open(Box::new(MemoryStorage::new()), config).unwrap();
///
/// let index = log.append(&b"hello".as_slice().into()).unwrap();
/// assert_eq!(log.get(index).unwrap(), b"hello".as_slice().into());
/// ```
pub struct EncryptedLog {
    storage: Box<dyn LogStorage>,
    book: Option<KeyBook>,
    encoding: ValueEncoding,
    auto_rotate: bool,
    sync_on_append: bool,
    records: Vec<RecordMeta>,
    logical_len: u64,
}

impl EncryptedLog {
    /// Opens a log over the given store.
    ///
    /// Existing framing is scanned to rebuild the record table, so a log
    /// can be reopened over a persistent store together with the key book
    /// that was serialized alongside it.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Corrupted`] if the store ends mid-frame, or a
    /// storage error if the scan fails.
    pub fn open(storage: Box<dyn LogStorage>, config: LogConfig) -> CoreResult<Self> {
        let size = storage.size()?;

        let mut records = Vec::new();
        let mut physical = 0u64;
        let mut logical = 0u64;

        while physical < size {
            if physical + FRAME_HEADER_SIZE as u64 > size {
                return Err(CoreError::corrupted("torn frame header at end of log"));
            }

            let header = storage.read_at(physical, FRAME_HEADER_SIZE)?;
            let header: [u8; FRAME_HEADER_SIZE] = header
                .try_into()
                .map_err(|_| CoreError::corrupted("short frame header read"))?;
            let len = u32::from_le_bytes(header);

            let end = physical + FRAME_HEADER_SIZE as u64 + u64::from(len);
            if end > size {
                return Err(CoreError::corrupted(format!(
                    "frame at offset {physical} extends past end of log"
                )));
            }

            records.push(RecordMeta {
                physical_offset: physical,
                logical_offset: logical,
                len,
            });
            physical = end;
            logical += u64::from(len);
        }

        if !records.is_empty() {
            debug!(records = records.len(), bytes = logical, "recovered existing log");
        }

        Ok(Self {
            storage,
            book: config.key_book,
            encoding: config.encoding,
            auto_rotate: config.auto_rotate,
            sync_on_append: config.sync_on_append,
            records,
            logical_len: logical,
        })
    }

    /// Appends one value. Returns the new record's index.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`append_batch`](Self::append_batch).
    pub fn append(&mut self, value: &Value) -> CoreResult<u64> {
        self.append_batch(std::slice::from_ref(value))
    }

    /// Appends a batch of values. Returns the index of the first.
    ///
    /// Each value is encrypted at its own accumulated logical offset, so
    /// a batch lands exactly as the same values appended one by one.
    /// Values are encoded and encrypted before anything is written: a
    /// codec or key failure leaves both the store and the book untouched.
    ///
    /// # Errors
    ///
    /// Returns a codec error if a value does not fit the log's encoding,
    /// [`CoreError::EmptyBook`] if encryption is on, the book is empty
    /// and auto-rotation is off, or a storage error from the write path.
    pub fn append_batch(&mut self, values: &[Value]) -> CoreResult<u64> {
        let first_index = self.records.len() as u64;

        let mut payloads = Vec::with_capacity(values.len());
        for value in values {
            payloads.push(self.encoding.encode(value)?);
        }

        if let Some(book) = &mut self.book {
            if book.is_empty() && self.auto_rotate && !payloads.is_empty() {
                book.rotate_key(self.logical_len)?;
                debug!(offset = self.logical_len, "auto-rotated initial key");
            }
        }

        // transform everything up front; only then touch the store
        let mut frames = Vec::with_capacity(payloads.len());
        let mut logical = self.logical_len;
        for payload in payloads {
            let payload = match &self.book {
                Some(book) => book.encrypt(&payload, logical)?,
                None => payload,
            };

            let len = u32::try_from(payload.len())
                .map_err(|_| CoreError::invalid_argument("record larger than 4 GiB"))?;

            let mut frame = Vec::with_capacity(FRAME_HEADER_SIZE + payload.len());
            frame.extend_from_slice(&len.to_le_bytes());
            frame.extend_from_slice(&payload);

            frames.push((frame, len));
            logical += u64::from(len);
        }

        for (frame, len) in frames {
            let physical = self.storage.append(&frame)?;
            self.records.push(RecordMeta {
                physical_offset: physical,
                logical_offset: self.logical_len,
                len,
            });
            self.logical_len += u64::from(len);
        }

        if self.sync_on_append {
            self.storage.flush()?;
        }

        Ok(first_index)
    }

    /// Reads the record at `index` back as a value.
    ///
    /// The record's payload is read from the store, decrypted at the
    /// exact logical offset it was written at, and decoded with the
    /// log's encoding.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::RecordNotFound`] for an unknown index, or the
    /// storage/key/codec error from the read path.
    pub fn get(&self, index: u64) -> CoreResult<Value> {
        let meta = self
            .records
            .get(usize::try_from(index).map_err(|_| CoreError::RecordNotFound { index })?)
            .copied()
            .ok_or(CoreError::RecordNotFound { index })?;

        let data = self
            .storage
            .read_at(meta.physical_offset + FRAME_HEADER_SIZE as u64, meta.len as usize)?;

        let data = match &self.book {
            Some(book) => book.decrypt(&data, meta.logical_offset)?,
            None => data,
        };

        Ok(self.encoding.decode(&data)?)
    }

    /// Rotates a fresh key in, governing everything appended from now on.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::EncryptionNotEnabled`] on a plaintext log, or
    /// [`CoreError::DuplicateKey`] if a key already governs the current
    /// end offset (two rotations with no append in between).
    pub fn rotate_key(&mut self) -> CoreResult<()> {
        let offset = self.logical_len;
        let book = self
            .book
            .as_mut()
            .ok_or(CoreError::EncryptionNotEnabled)?;

        book.rotate_key(offset)?;
        debug!(offset, "rotated encryption key");
        Ok(())
    }

    /// Serializes the key book for persistence by the caller.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::EncryptionNotEnabled`] on a plaintext log.
    pub fn serialize_key_book(&self) -> CoreResult<Vec<KeyBookEntry>> {
        self.book
            .as_ref()
            .map(KeyBook::serialize)
            .ok_or(CoreError::EncryptionNotEnabled)
    }

    /// Returns the key book, if encryption is enabled.
    #[must_use]
    pub fn key_book(&self) -> Option<&KeyBook> {
        self.book.as_ref()
    }

    /// Returns the value encoding this log was opened with.
    #[must_use]
    pub fn encoding(&self) -> ValueEncoding {
        self.encoding
    }

    /// Returns the number of records.
    #[must_use]
    pub fn len(&self) -> u64 {
        self.records.len() as u64
    }

    /// Returns true if the log holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns the logical payload length in bytes - the offset the next
    /// appended byte will be encrypted at.
    #[must_use]
    pub fn byte_len(&self) -> u64 {
        self.logical_len
    }

    /// Flushes pending writes in the backing store.
    ///
    /// # Errors
    ///
    /// Returns an error if the flush fails.
    pub fn flush(&mut self) -> CoreResult<()> {
        self.storage.flush()?;
        Ok(())
    }

    /// Syncs the backing store to durable storage.
    ///
    /// # Errors
    ///
    /// Returns an error if the sync fails.
    pub fn sync(&mut self) -> CoreResult<()> {
        self.storage.sync()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cipherlog_storage::{FileStorage, MemoryStorage};
    use serde_json::json;

    fn plaintext_log() -> EncryptedLog {
        EncryptedLog::open(Box::new(MemoryStorage::new()), LogConfig::new()).unwrap()
    }

    fn encrypted_log(auto_rotate: bool) -> EncryptedLog {
        let config = LogConfig::new()
            .key_book(KeyBook::new())
            .auto_rotate(auto_rotate);
        EncryptedLog::open(Box::new(MemoryStorage::new()), config).unwrap()
    }

    #[test]
    fn plaintext_append_and_get_round_trips() {
        let mut log = plaintext_log();

        let first = log.append(&b"one".as_slice().into()).unwrap();
        let second = log.append(&b"two".as_slice().into()).unwrap();

        assert_eq!((first, second), (0, 1));
        assert_eq!(log.len(), 2);
        assert_eq!(log.byte_len(), 6);
        assert_eq!(log.get(0).unwrap(), b"one".as_slice().into());
        assert_eq!(log.get(1).unwrap(), b"two".as_slice().into());
    }

    #[test]
    fn encrypted_append_and_get_round_trips() {
        let mut log = encrypted_log(false);
        log.rotate_key().unwrap();

        log.append(&b"secret record".as_slice().into()).unwrap();
        assert_eq!(log.get(0).unwrap(), b"secret record".as_slice().into());
    }

    #[test]
    fn append_against_empty_book_fails_without_auto_rotate() {
        let mut log = encrypted_log(false);

        let result = log.append(&b"data".as_slice().into());
        assert!(matches!(result, Err(CoreError::EmptyBook)));
        assert!(log.is_empty());
    }

    #[test]
    fn auto_rotate_provisions_the_first_key() {
        let mut log = encrypted_log(true);

        log.append(&b"data".as_slice().into()).unwrap();
        assert_eq!(log.key_book().unwrap().len(), 1);
        assert_eq!(log.get(0).unwrap(), b"data".as_slice().into());
    }

    #[test]
    fn records_survive_key_rotation() {
        let mut log = encrypted_log(false);

        log.rotate_key().unwrap();
        log.append(&b"under key A".as_slice().into()).unwrap();

        log.rotate_key().unwrap();
        log.append(&b"under key B".as_slice().into()).unwrap();

        assert_eq!(log.key_book().unwrap().len(), 2);
        assert_eq!(log.get(0).unwrap(), b"under key A".as_slice().into());
        assert_eq!(log.get(1).unwrap(), b"under key B".as_slice().into());
    }

    #[test]
    fn rotate_twice_without_append_is_a_duplicate() {
        let mut log = encrypted_log(false);

        log.rotate_key().unwrap();
        let result = log.rotate_key();
        assert!(matches!(result, Err(CoreError::DuplicateKey { .. })));
    }

    #[test]
    fn rotate_on_plaintext_log_fails() {
        let mut log = plaintext_log();
        assert!(matches!(
            log.rotate_key(),
            Err(CoreError::EncryptionNotEnabled)
        ));
        assert!(matches!(
            log.serialize_key_book(),
            Err(CoreError::EncryptionNotEnabled)
        ));
    }

    #[test]
    fn batch_appends_use_per_record_offsets() {
        let mut log = encrypted_log(true);

        let values: Vec<Value> = vec![
            b"first".as_slice().into(),
            b"second".as_slice().into(),
            b"third".as_slice().into(),
        ];
        let first_index = log.append_batch(&values).unwrap();

        assert_eq!(first_index, 0);
        assert_eq!(log.len(), 3);
        for (index, value) in values.iter().enumerate() {
            assert_eq!(&log.get(index as u64).unwrap(), value);
        }
    }

    #[test]
    fn ciphertext_differs_from_plaintext_on_disk() {
        let storage = MemoryStorage::new();
        let config = LogConfig::new().key_book(KeyBook::new()).auto_rotate(true);

        let mut log = EncryptedLog::open(Box::new(storage), config).unwrap();
        log.append(&b"visible plaintext".as_slice().into()).unwrap();

        // the payload bytes after the 4-byte header must not be the plaintext
        let index = log.records[0];
        let stored = log
            .storage
            .read_at(index.physical_offset + FRAME_HEADER_SIZE as u64, index.len as usize)
            .unwrap();
        assert_ne!(stored, b"visible plaintext");
    }

    #[test]
    fn get_unknown_index_fails() {
        let log = plaintext_log();
        assert!(matches!(
            log.get(0),
            Err(CoreError::RecordNotFound { index: 0 })
        ));
    }

    #[test]
    fn utf8_encoding_round_trips() {
        let config = LogConfig::new().encoding(ValueEncoding::Utf8);
        let mut log = EncryptedLog::open(Box::new(MemoryStorage::new()), config).unwrap();

        log.append(&"hallo welt".into()).unwrap();
        assert_eq!(log.get(0).unwrap(), Value::Text("hallo welt".into()));
    }

    #[test]
    fn json_encoding_round_trips_encrypted() {
        let config = LogConfig::new()
            .encoding(ValueEncoding::Json)
            .key_book(KeyBook::new())
            .auto_rotate(true);
        let mut log = EncryptedLog::open(Box::new(MemoryStorage::new()), config).unwrap();

        let value = Value::Json(json!({"id": 7, "tags": ["a", "b"]}));
        log.append(&value).unwrap();
        assert_eq!(log.get(0).unwrap(), value);
    }

    #[test]
    fn mismatched_value_fails_before_anything_is_written() {
        let mut log = plaintext_log();

        let result = log.append(&Value::Json(json!(1)));
        assert!(matches!(result, Err(CoreError::Codec(_))));
        assert!(log.is_empty());
        assert_eq!(log.byte_len(), 0);
    }

    #[test]
    fn reopen_recovers_records_and_key_book() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.bin");

        let serialized_book = {
            let storage = FileStorage::open(&path).unwrap();
            let config = LogConfig::new().key_book(KeyBook::new()).auto_rotate(true);
            let mut log = EncryptedLog::open(Box::new(storage), config).unwrap();

            log.append(&b"record zero".as_slice().into()).unwrap();
            log.rotate_key().unwrap();
            log.append(&b"record one".as_slice().into()).unwrap();
            log.sync().unwrap();

            serde_json::to_string(&log.serialize_key_book().unwrap()).unwrap()
        };

        let storage = FileStorage::open(&path).unwrap();
        let config = LogConfig::new().key_book(KeyBook::from_json(&serialized_book).unwrap());
        let log = EncryptedLog::open(Box::new(storage), config).unwrap();

        assert_eq!(log.len(), 2);
        assert_eq!(log.get(0).unwrap(), b"record zero".as_slice().into());
        assert_eq!(log.get(1).unwrap(), b"record one".as_slice().into());
    }

    #[test]
    fn reopen_with_torn_tail_is_corruption() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.bin");

        {
            let mut storage = FileStorage::open(&path).unwrap();
            // a full frame, then a header promising more bytes than exist
            storage.append(&2u32.to_le_bytes()).unwrap();
            storage.append(b"ok").unwrap();
            storage.append(&100u32.to_le_bytes()).unwrap();
            storage.append(b"short").unwrap();
        }

        let storage = FileStorage::open(&path).unwrap();
        let result = EncryptedLog::open(Box::new(storage), LogConfig::new());
        assert!(matches!(result, Err(CoreError::Corrupted { .. })));
    }
}
