//! # Cipherlog Core
//!
//! Offset-indexed key rotation and the encrypted log built on it.
//!
//! This crate provides:
//! - [`KeyBook`] - the sorted offset → key index with floor resolution
//! - [`CipherKey`] - AES-128-CTR addressed by absolute byte offset
//! - [`RangeMap`] - the generic sorted map underneath the book
//! - [`EncryptedLog`] - a record log that encrypts on append and
//!   decrypts on get, composed over any [`cipherlog_storage::LogStorage`]
//! - [`BookRegistry`] - an explicit directory of key books by log id
//!
//! ## Example
//!
//! ```
//! use cipherlog_core::{EncryptedLog, KeyBook, LogConfig};
//! use cipherlog_storage::MemoryStorage;
//!
//! let mut book = KeyBook::new();
//! book.rotate_key(0).unwrap();
//!
//! let config = LogConfig::new().key_book(book);
//! let mut log = EncryptedLog::open(Box::new(MemoryStorage::new()), config).unwrap();
//!
//! log.append(&b"confidential".as_slice().into()).unwrap();
//! assert_eq!(log.get(0).unwrap(), b"confidential".as_slice().into());
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod error;
mod keybook;
mod log;
mod registry;

pub use config::LogConfig;
pub use error::{CoreError, CoreResult};
pub use keybook::{CipherKey, DuplicateKeyError, KeyBook, KeyBookEntry, KeyRecord, RangeMap, NONCE_SIZE};
pub use log::EncryptedLog;
pub use registry::{BookRegistry, SharedBook};

// Re-export the collaborating crates' primary types for convenience.
pub use cipherlog_codec::{Value, ValueEncoding};
