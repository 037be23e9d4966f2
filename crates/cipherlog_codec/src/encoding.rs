//! Value encoding enumeration.

use crate::error::{CodecError, CodecResult};
use crate::value::Value;
use std::fmt;
use std::str::FromStr;

/// How log record payloads are represented as bytes.
///
/// The encoding is chosen once, when a log is opened, and binds the encode
/// and decode halves together for the lifetime of the log. Decoding with a
/// different encoding than the one that produced the bytes yields garbage
/// or an error, never a silent conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValueEncoding {
    /// Raw bytes, stored as-is. Text is encoded as its UTF-8 bytes.
    #[default]
    Binary,
    /// UTF-8 text. Decoding validates the bytes.
    Utf8,
    /// Arbitrary JSON values via `serde_json`.
    Json,
}

impl ValueEncoding {
    /// Encodes a value into the byte representation this encoding stores.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::UnsupportedValue`] if the value kind cannot be
    /// represented (e.g. a JSON value under the binary encoding), or a JSON
    /// error if serialization fails.
    pub fn encode(&self, value: &Value) -> CodecResult<Vec<u8>> {
        match (self, value) {
            (ValueEncoding::Binary, Value::Bytes(bytes)) => Ok(bytes.clone()),
            (ValueEncoding::Binary, Value::Text(text)) => Ok(text.as_bytes().to_vec()),
            (ValueEncoding::Utf8, Value::Text(text)) => Ok(text.as_bytes().to_vec()),
            (ValueEncoding::Json, Value::Json(json)) => serde_json::to_vec(json)
                .map_err(|err| CodecError::json_encoding_failed(err.to_string())),
            (encoding, value) => Err(CodecError::UnsupportedValue {
                encoding: encoding.name(),
                kind: value.kind(),
            }),
        }
    }

    /// Decodes stored bytes back into a value.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::InvalidUtf8`] for non-UTF-8 text, or a JSON
    /// error for unparseable JSON payloads.
    pub fn decode(&self, bytes: &[u8]) -> CodecResult<Value> {
        match self {
            ValueEncoding::Binary => Ok(Value::Bytes(bytes.to_vec())),
            ValueEncoding::Utf8 => String::from_utf8(bytes.to_vec())
                .map(Value::Text)
                .map_err(|_| CodecError::InvalidUtf8),
            ValueEncoding::Json => serde_json::from_slice(bytes)
                .map(Value::Json)
                .map_err(|err| CodecError::json_decoding_failed(err.to_string())),
        }
    }

    /// Returns the canonical name of this encoding.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            ValueEncoding::Binary => "binary",
            ValueEncoding::Utf8 => "utf-8",
            ValueEncoding::Json => "json",
        }
    }
}

impl fmt::Display for ValueEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ValueEncoding {
    type Err = CodecError;

    /// Parses the legacy string tag ("binary", "utf-8", "json") once,
    /// at configuration time.
    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name {
            "binary" => Ok(ValueEncoding::Binary),
            "utf-8" => Ok(ValueEncoding::Utf8),
            "json" => Ok(ValueEncoding::Json),
            other => Err(CodecError::UnknownEncoding {
                name: other.to_string(),
            }),
        }
    }
}
