//! Wire forms of a record.
//!
//! Both forms are lossless: `decode(encode(lhr)) == lhr`, including the
//! distinction between absent, explicit null and finite values.
//!
//! - JSON: snake_case field names, symbolic enums, RFC 3339 fetch time.
//! - Binary: see [`binary`].
//!
//! Decoding checks required fields on the raw document first so that a
//! missing field is reported by path rather than as a generic parse error.

pub mod binary;

use serde_json::Value;

use crate::domain::error::{DecodeError, Result};
use crate::domain::report::Lhr;
use crate::domain::validation::check_required_fields;
use crate::obs;

/// Layout version carried in the binary header.
pub const SCHEMA_VERSION: u16 = 1;

/// One of the two wire forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireFormat {
    Json,
    Binary,
}

impl WireFormat {
    /// Sniff the form of a payload from its first bytes.
    pub fn detect(bytes: &[u8]) -> Self {
        if binary::has_magic(bytes) {
            WireFormat::Binary
        } else {
            WireFormat::Json
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WireFormat::Json => "json",
            WireFormat::Binary => "binary",
        }
    }
}

impl std::fmt::Display for WireFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn from_document(document: Value) -> std::result::Result<Lhr, DecodeError> {
    check_required_fields(&document)?;
    Ok(serde_json::from_value(document)?)
}

fn logged<T>(
    format: WireFormat,
    bytes: usize,
    result: std::result::Result<T, DecodeError>,
) -> std::result::Result<T, DecodeError> {
    match &result {
        Ok(_) => obs::emit_decoded(format.as_str(), bytes),
        Err(err) => obs::emit_decode_failed(format.as_str(), err),
    }
    result
}

/// Compact JSON text of a record.
pub fn to_json(lhr: &Lhr) -> Result<String> {
    Ok(serde_json::to_string(lhr)?)
}

/// Indented JSON text of a record.
pub fn to_json_pretty(lhr: &Lhr) -> Result<String> {
    Ok(serde_json::to_string_pretty(lhr)?)
}

/// Decode a record from JSON text.
///
/// # Errors
///
/// - `DecodeError::Json`: the text is not well-formed JSON, or a field has
///   a shape the schema cannot accept.
/// - `DecodeError::MissingField` / `WrongType`: a required field is absent
///   or its container has the wrong JSON kind.
pub fn from_json(text: &str) -> std::result::Result<Lhr, DecodeError> {
    let result = serde_json::from_str::<Value>(text)
        .map_err(DecodeError::from)
        .and_then(from_document);
    logged(WireFormat::Json, text.len(), result)
}

/// Encode a record in the binary form.
pub fn to_binary(lhr: &Lhr) -> Result<Vec<u8>> {
    let document = serde_json::to_value(lhr)?;
    Ok(binary::encode_document(&document, SCHEMA_VERSION))
}

/// Decode a record from the binary form.
///
/// # Errors
///
/// Any [`binary::decode_document`] error, plus the field errors of
/// [`from_json`].
pub fn from_binary(bytes: &[u8]) -> std::result::Result<Lhr, DecodeError> {
    let result = binary::decode_document(bytes, SCHEMA_VERSION)
        .and_then(|(_, document)| from_document(document));
    logged(WireFormat::Binary, bytes.len(), result)
}

/// Encode a record in the requested form.
pub fn encode(lhr: &Lhr, format: WireFormat) -> Result<Vec<u8>> {
    match format {
        WireFormat::Json => Ok(to_json(lhr)?.into_bytes()),
        WireFormat::Binary => to_binary(lhr),
    }
}

/// Decode a record, detecting its form from the binary magic.
pub fn decode(bytes: &[u8]) -> std::result::Result<Lhr, DecodeError> {
    match WireFormat::detect(bytes) {
        WireFormat::Binary => from_binary(bytes),
        WireFormat::Json => {
            let text = std::str::from_utf8(bytes).map_err(|e| {
                let err = DecodeError::InvalidUtf8 {
                    offset: e.valid_up_to(),
                };
                obs::emit_decode_failed(WireFormat::Json.as_str(), &err);
                err
            })?;
            from_json(text)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect() {
        assert_eq!(WireFormat::detect(b"LHRB\x00\x01\x08"), WireFormat::Binary);
        assert_eq!(WireFormat::detect(b"{}"), WireFormat::Json);
        assert_eq!(WireFormat::detect(b""), WireFormat::Json);
    }

    #[test]
    fn test_missing_field_reported_by_path() {
        let err = from_json(r#"{"fetch_time":"2026-03-01T12:00:00Z"}"#).unwrap_err();
        assert_eq!(err.field_path(), Some("requested_url"));
    }

    #[test]
    fn test_malformed_json() {
        let err = from_json("{not json").unwrap_err();
        assert!(matches!(err, DecodeError::Json(_)));
    }
}
