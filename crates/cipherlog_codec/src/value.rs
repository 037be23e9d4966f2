//! Dynamic value type for log records.

/// A value stored in or read from a log.
///
/// The variant a caller gets back from a read is determined by the log's
/// [`ValueEncoding`](crate::ValueEncoding), not by what was appended:
/// a binary log always yields [`Value::Bytes`], a UTF-8 log always yields
/// [`Value::Text`], a JSON log always yields [`Value::Json`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// Raw bytes.
    Bytes(Vec<u8>),
    /// UTF-8 text.
    Text(String),
    /// A JSON value.
    Json(serde_json::Value),
}

impl Value {
    /// Returns a short name for the value kind, used in error messages.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Bytes(_) => "bytes",
            Value::Text(_) => "text",
            Value::Json(_) => "json",
        }
    }
}

impl From<Vec<u8>> for Value {
    fn from(bytes: Vec<u8>) -> Self {
        Value::Bytes(bytes)
    }
}

impl From<&[u8]> for Value {
    fn from(bytes: &[u8]) -> Self {
        Value::Bytes(bytes.to_vec())
    }
}

impl From<String> for Value {
    fn from(text: String) -> Self {
        Value::Text(text)
    }
}

impl From<&str> for Value {
    fn from(text: &str) -> Self {
        Value::Text(text.to_string())
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        Value::Json(value)
    }
}
