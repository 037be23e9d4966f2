//! # Cipherlog Codec
//!
//! Value encoding layer for cipherlog.
//!
//! Application values cross the log boundary as raw bytes. This crate
//! converts between the two: a [`Value`] is what callers append and get
//! back, a [`ValueEncoding`] is the byte representation the log stores.
//!
//! The encoding is a fixed enumeration chosen once when a log is opened,
//! not a string tag re-compared on every call. Every encoding pairs an
//! encode function with its exact inverse:
//!
//! - [`ValueEncoding::Binary`] - bytes pass through untouched
//! - [`ValueEncoding::Utf8`] - text as its UTF-8 bytes, validated on decode
//! - [`ValueEncoding::Json`] - any JSON value via `serde_json`
//!
//! ## Example
//!
//! ```
//! use cipherlog_codec::{Value, ValueEncoding};
//!
//! let encoding = ValueEncoding::Utf8;
//! let bytes = encoding.encode(&Value::Text("hello".into())).unwrap();
//! assert_eq!(encoding.decode(&bytes).unwrap(), Value::Text("hello".into()));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod encoding;
mod error;
mod value;

pub use encoding::ValueEncoding;
pub use error::{CodecError, CodecResult};
pub use value::Value;
