//! # Cipherlog Storage
//!
//! Append-only byte stores for cipherlog.
//!
//! This crate provides the lowest-level storage abstraction for an
//! encrypted log. Backends are **opaque byte streams**: they hand out the
//! byte offset of every append and read back exact ranges, but never
//! interpret the data. Record framing, encryption, and key resolution all
//! live above this layer.
//!
//! ## Design Principles
//!
//! - Data is only ever added at the current end, never modified in place
//! - `append` returns the byte offset where the data landed; this is the
//!   monotonic write position that key rotation offsets are derived from
//! - Backends must be `Send + Sync` for concurrent access
//!
//! ## Available Backends
//!
//! - [`MemoryStorage`] - For testing and ephemeral logs
//! - [`FileStorage`] - For persistent logs using OS file APIs
//!
//! ## Example
//!
//! ```rust
//! use cipherlog_storage::{LogStorage, MemoryStorage};
//!
//! let mut storage = MemoryStorage::new();
//! let offset = storage.append(b"hello world").unwrap();
//! let data = storage.read_at(offset, 11).unwrap();
//! assert_eq!(&data, b"hello world");
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod file;
mod memory;
mod storage;

pub use error::{StorageError, StorageResult};
pub use file::FileStorage;
pub use memory::MemoryStorage;
pub use storage::LogStorage;
