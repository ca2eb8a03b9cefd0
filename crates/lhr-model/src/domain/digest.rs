//! Canonical JSON normalization and record digests.
//!
//! Two equal records digest equally regardless of which wire form they were
//! decoded from or the order their map keys arrived in:
//! - object keys in Unicode code point order, as kept by `serde_json::Map`
//!   without the `preserve_order` feature
//! - integer-valued floats written as integers; NaN/Infinity rejected
//! - SHA-256 hex over the compact result
//!
//! This is a stable in-crate form, not RFC 8785: keys with characters above
//! U+FFFF order by code point rather than by UTF-16 code units.

use sha2::{Digest, Sha256};

use crate::domain::error::{LhrModelError, Result};

/// Normalize numbers throughout a value. Key order comes from the map.
fn canonicalize(value: &serde_json::Value) -> Result<serde_json::Value> {
    match value {
        serde_json::Value::Object(map) => map
            .iter()
            .map(|(key, v)| canonicalize(v).map(|v| (key.clone(), v)))
            .collect::<Result<serde_json::Map<_, _>>>()
            .map(serde_json::Value::Object),
        serde_json::Value::Array(items) => items
            .iter()
            .map(canonicalize)
            .collect::<Result<Vec<_>>>()
            .map(serde_json::Value::Array),
        serde_json::Value::Number(n) if n.is_f64() => {
            let f = n.as_f64().unwrap_or(f64::NAN);
            if !f.is_finite() {
                return Err(LhrModelError::NonCanonical(
                    "NaN/Infinity not permitted in canonical JSON".to_string(),
                ));
            }
            if f.fract() == 0.0 && f >= i64::MIN as f64 && f <= i64::MAX as f64 {
                Ok(serde_json::Value::Number(serde_json::Number::from(f as i64)))
            } else {
                Ok(serde_json::Value::Number(n.clone()))
            }
        }
        other => Ok(other.clone()),
    }
}

/// Canonical compact JSON text for a value.
pub fn canonical_json(value: &serde_json::Value) -> Result<String> {
    Ok(serde_json::to_string(&canonicalize(value)?)?)
}

/// SHA-256 hex digest of the canonical JSON text.
pub fn compute_digest(value: &serde_json::Value) -> Result<String> {
    let canonical = canonical_json(value)?;
    let mut hasher = Sha256::new();
    hasher.update(canonical.as_bytes());
    Ok(hex::encode(hasher.finalize()))
}
