//! Error taxonomy for the result model.
//!
//! Only structural problems with wire data are errors. Run failures are
//! data (see [`crate::classifier`]) and aggregation anomalies degrade to
//! exclusion, so neither appears here.

/// Errors produced while decoding a record from one of its wire forms.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("missing required field: {path}")]
    MissingField { path: String },

    #[error("field {path} has the wrong type: expected {expected}")]
    WrongType { path: String, expected: &'static str },

    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("not a binary record: bad magic bytes")]
    BadMagic,

    #[error("unsupported schema version {found} (max supported {supported})")]
    UnsupportedSchemaVersion { found: u16, supported: u16 },

    #[error("truncated input at offset {offset}: needed {needed} more bytes")]
    Truncated { offset: usize, needed: usize },

    #[error("invalid tag 0x{tag:02x} at offset {offset}")]
    InvalidTag { tag: u8, offset: usize },

    #[error("invalid UTF-8 string at offset {offset}")]
    InvalidUtf8 { offset: usize },

    #[error("non-finite number at offset {offset}")]
    NonFiniteNumber { offset: usize },

    #[error("{count} trailing bytes after record")]
    TrailingBytes { count: usize },

    #[error("nesting deeper than {limit} levels at offset {offset}")]
    TooDeep { limit: usize, offset: usize },
}

impl DecodeError {
    /// The offending field path, when the failure is tied to one.
    pub fn field_path(&self) -> Option<&str> {
        match self {
            DecodeError::MissingField { path } | DecodeError::WrongType { path, .. } => {
                Some(path.as_str())
            }
            _ => None,
        }
    }
}

/// Result model errors.
#[derive(Debug, thiserror::Error)]
pub enum LhrModelError {
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("non-canonical value: {0}")]
    NonCanonical(String),
}

/// Result type for result model operations.
pub type Result<T> = std::result::Result<T, LhrModelError>;
