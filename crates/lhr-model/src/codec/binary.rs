//! Compact binary wire form.
//!
//! Layout: `b"LHRB"`, big-endian `u16` schema version, then one
//! tag-length-value tree of the record's JSON document.
//!
//! | tag  | value        | payload                                   |
//! |------|--------------|-------------------------------------------|
//! | 0x01 | unsigned int | `u64` BE                                  |
//! | 0x02 | signed int   | `i64` BE                                  |
//! | 0x03 | false        | none                                      |
//! | 0x04 | true         | none                                      |
//! | 0x05 | string       | `u32` BE length + UTF-8 bytes             |
//! | 0x06 | list         | `u32` BE count + items                    |
//! | 0x07 | map          | `u32` BE count + (key string, value) pairs |
//! | 0x08 | null         | none                                      |
//! | 0x09 | double       | IEEE-754 bits, `u64` BE                   |
//!
//! Map keys are written without a tag (length + bytes). Doubles are stored
//! by bit pattern, so every finite value survives exactly.

use serde_json::{Map, Number, Value};

use crate::domain::error::DecodeError;

pub const MAGIC: &[u8; 4] = b"LHRB";

/// Header length: magic plus version.
pub const HEADER_LEN: usize = 6;

/// Deepest nesting accepted when decoding.
pub const MAX_DEPTH: usize = 128;

const TAG_U64: u8 = 0x01;
const TAG_I64: u8 = 0x02;
const TAG_FALSE: u8 = 0x03;
const TAG_TRUE: u8 = 0x04;
const TAG_STRING: u8 = 0x05;
const TAG_LIST: u8 = 0x06;
const TAG_MAP: u8 = 0x07;
const TAG_NULL: u8 = 0x08;
const TAG_F64: u8 = 0x09;

/// Whether the bytes start with the binary magic.
pub fn has_magic(bytes: &[u8]) -> bool {
    bytes.starts_with(MAGIC)
}

// ---------------------------------------------------------------------------
// Encoding
// ---------------------------------------------------------------------------

fn write_len(out: &mut Vec<u8>, len: usize) {
    // Lengths come from in-memory strings and collections; a record large
    // enough to overflow u32 cannot be produced by the JSON form either.
    out.extend_from_slice(&(len as u32).to_be_bytes());
}

fn write_str(out: &mut Vec<u8>, s: &str) {
    write_len(out, s.len());
    out.extend_from_slice(s.as_bytes());
}

fn write_value(out: &mut Vec<u8>, value: &Value) {
    match value {
        Value::Null => out.push(TAG_NULL),
        Value::Bool(false) => out.push(TAG_FALSE),
        Value::Bool(true) => out.push(TAG_TRUE),
        Value::Number(n) => {
            if let Some(u) = n.as_u64() {
                out.push(TAG_U64);
                out.extend_from_slice(&u.to_be_bytes());
            } else if let Some(i) = n.as_i64() {
                out.push(TAG_I64);
                out.extend_from_slice(&i.to_be_bytes());
            } else {
                // serde_json numbers are always finite.
                let f = n.as_f64().unwrap_or_default();
                out.push(TAG_F64);
                out.extend_from_slice(&f.to_bits().to_be_bytes());
            }
        }
        Value::String(s) => {
            out.push(TAG_STRING);
            write_str(out, s);
        }
        Value::Array(items) => {
            out.push(TAG_LIST);
            write_len(out, items.len());
            for item in items {
                write_value(out, item);
            }
        }
        Value::Object(map) => {
            out.push(TAG_MAP);
            write_len(out, map.len());
            for (key, v) in map {
                write_str(out, key);
                write_value(out, v);
            }
        }
    }
}

/// Encode a JSON document with the given schema version header.
pub fn encode_document(document: &Value, schema_version: u16) -> Vec<u8> {
    let mut out = Vec::with_capacity(1024);
    out.extend_from_slice(MAGIC);
    out.extend_from_slice(&schema_version.to_be_bytes());
    write_value(&mut out, document);
    out
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn take(&mut self, n: usize) -> Result<&'a [u8], DecodeError> {
        let remaining = self.bytes.len() - self.pos;
        if remaining < n {
            return Err(DecodeError::Truncated {
                offset: self.pos,
                needed: n - remaining,
            });
        }
        let slice = &self.bytes[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    fn array<const N: usize>(&mut self) -> Result<[u8; N], DecodeError> {
        let mut buf = [0u8; N];
        buf.copy_from_slice(self.take(N)?);
        Ok(buf)
    }

    fn u8(&mut self) -> Result<u8, DecodeError> {
        Ok(self.array::<1>()?[0])
    }

    fn len(&mut self) -> Result<usize, DecodeError> {
        Ok(u32::from_be_bytes(self.array()?) as usize)
    }

    fn string(&mut self) -> Result<String, DecodeError> {
        let len = self.len()?;
        let offset = self.pos;
        let raw = self.take(len)?;
        std::str::from_utf8(raw)
            .map(str::to_owned)
            .map_err(|_| DecodeError::InvalidUtf8 { offset })
    }

    fn value(&mut self, depth: usize) -> Result<Value, DecodeError> {
        let offset = self.pos;
        if depth > MAX_DEPTH {
            return Err(DecodeError::TooDeep {
                limit: MAX_DEPTH,
                offset,
            });
        }
        match self.u8()? {
            TAG_NULL => Ok(Value::Null),
            TAG_FALSE => Ok(Value::Bool(false)),
            TAG_TRUE => Ok(Value::Bool(true)),
            TAG_U64 => Ok(Value::Number(u64::from_be_bytes(self.array()?).into())),
            TAG_I64 => Ok(Value::Number(i64::from_be_bytes(self.array()?).into())),
            TAG_F64 => {
                let f = f64::from_bits(u64::from_be_bytes(self.array()?));
                Number::from_f64(f)
                    .map(Value::Number)
                    .ok_or(DecodeError::NonFiniteNumber { offset })
            }
            TAG_STRING => self.string().map(Value::String),
            TAG_LIST => {
                let count = self.len()?;
                // Each item takes at least one byte; cap the reservation so
                // a corrupt count cannot force a huge allocation.
                let mut items = Vec::with_capacity(count.min(self.bytes.len() - self.pos));
                for _ in 0..count {
                    items.push(self.value(depth + 1)?);
                }
                Ok(Value::Array(items))
            }
            TAG_MAP => {
                let count = self.len()?;
                let mut map = Map::new();
                for _ in 0..count {
                    let key = self.string()?;
                    let v = self.value(depth + 1)?;
                    map.insert(key, v);
                }
                Ok(Value::Object(map))
            }
            tag => Err(DecodeError::InvalidTag { tag, offset }),
        }
    }
}

/// Decode a binary payload into its schema version and JSON document.
///
/// # Errors
///
/// - `DecodeError::BadMagic`: the payload does not start with `b"LHRB"`.
/// - `DecodeError::UnsupportedSchemaVersion`: the header names a version
///   newer than `max_version`.
/// - `DecodeError::Truncated` / `InvalidTag` / `InvalidUtf8` /
///   `NonFiniteNumber` / `TooDeep`: malformed body, with byte offset.
/// - `DecodeError::TrailingBytes`: bytes remain after the document.
pub fn decode_document(bytes: &[u8], max_version: u16) -> Result<(u16, Value), DecodeError> {
    if !has_magic(bytes) {
        return Err(DecodeError::BadMagic);
    }
    let mut reader = Reader {
        bytes,
        pos: MAGIC.len(),
    };
    let version = u16::from_be_bytes(reader.array()?);
    if version == 0 || version > max_version {
        return Err(DecodeError::UnsupportedSchemaVersion {
            found: version,
            supported: max_version,
        });
    }

    let document = reader.value(0)?;
    let count = bytes.len() - reader.pos;
    if count > 0 {
        return Err(DecodeError::TrailingBytes { count });
    }
    Ok((version, document))
}
