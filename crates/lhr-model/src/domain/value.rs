//! Nullable wrappers shared by every entity in the record.
//!
//! The wire format cannot tell "absent", "null" and "default" apart for
//! primitives, so presence is modelled explicitly:
//! - [`Nullable`]: absent, explicit null, or a value. Every optional field
//!   of the record uses it so that decode-then-encode reproduces the input's
//!   field set exactly.
//! - [`NullableF64`]: the same three states for doubles, with the value
//!   always finite.
//! - [`LhrValue`]: a small recursive JSON-like value for fields that are
//!   both nullable and heterogeneously typed.
//!
//! Fields holding an `Option<LhrValue>` use [`present`] so that an explicit
//! `null` decodes to `Some(LhrValue::Null)` instead of collapsing to `None`.
//!
//! Every tri-state field needs `#[serde(default)]`: without it serde treats
//! a missing field as null.

use std::collections::BTreeMap;
use std::fmt;
use std::ops::Deref;

use serde::de::{self, MapAccess, SeqAccess, Visitor};
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A field that may be absent, explicitly null, or hold a value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Nullable<T> {
    Absent,
    Null,
    Value(T),
}

impl<T> Default for Nullable<T> {
    fn default() -> Self {
        Nullable::Absent
    }
}

impl<T> Nullable<T> {
    pub fn is_absent(&self) -> bool {
        matches!(self, Nullable::Absent)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Nullable::Null)
    }

    /// The value, if one is present.
    pub fn value(&self) -> Option<&T> {
        match self {
            Nullable::Value(v) => Some(v),
            Nullable::Absent | Nullable::Null => None,
        }
    }

    pub fn value_mut(&mut self) -> Option<&mut T> {
        match self {
            Nullable::Value(v) => Some(v),
            Nullable::Absent | Nullable::Null => None,
        }
    }

    pub fn into_value(self) -> Option<T> {
        match self {
            Nullable::Value(v) => Some(v),
            Nullable::Absent | Nullable::Null => None,
        }
    }
}

impl<T: Deref> Nullable<T> {
    pub fn as_deref(&self) -> Option<&T::Target> {
        self.value().map(Deref::deref)
    }
}

impl<T> Nullable<Vec<T>> {
    /// Append to the list, creating it when absent or null.
    pub fn push(&mut self, item: T) {
        match self {
            Nullable::Value(items) => items.push(item),
            Nullable::Absent | Nullable::Null => *self = Nullable::Value(vec![item]),
        }
    }

    /// The list items; empty when absent or null.
    pub fn items(&self) -> &[T] {
        self.value().map(Vec::as_slice).unwrap_or(&[])
    }
}

impl<T> From<T> for Nullable<T> {
    fn from(value: T) -> Self {
        Nullable::Value(value)
    }
}

impl<T: Serialize> Serialize for Nullable<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Nullable::Value(v) => v.serialize(serializer),
            Nullable::Absent | Nullable::Null => serializer.serialize_none(),
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Nullable<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<T>::deserialize(deserializer).map(|v| match v {
            Some(v) => Nullable::Value(v),
            None => Nullable::Null,
        })
    }
}

/// A double that may be absent, explicitly null, or a finite value.
///
/// `Value` never holds NaN or an infinity; constructing from a non-finite
/// double yields `Null`. For scoring purposes absent and null are the same
/// thing: "not scored".
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum NullableF64 {
    #[default]
    Absent,
    Null,
    Value(f64),
}

impl NullableF64 {
    /// Wrap a double, normalizing non-finite input to `Null`.
    pub fn new(value: f64) -> Self {
        if value.is_finite() {
            NullableF64::Value(value)
        } else {
            NullableF64::Null
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, NullableF64::Absent)
    }

    /// The finite value, if any.
    pub fn finite(&self) -> Option<f64> {
        match self {
            NullableF64::Value(v) => Some(*v),
            NullableF64::Absent | NullableF64::Null => None,
        }
    }
}

impl From<f64> for NullableF64 {
    fn from(value: f64) -> Self {
        NullableF64::new(value)
    }
}

impl From<Option<f64>> for NullableF64 {
    fn from(value: Option<f64>) -> Self {
        match value {
            Some(v) => NullableF64::new(v),
            None => NullableF64::Null,
        }
    }
}

impl Serialize for NullableF64 {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            NullableF64::Value(v) => serializer.serialize_f64(*v),
            // Absent fields are skipped by `skip_serializing_if`; if a caller
            // serializes one directly the closest wire form is null.
            NullableF64::Absent | NullableF64::Null => serializer.serialize_none(),
        }
    }
}

impl<'de> Deserialize<'de> for NullableF64 {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<f64>::deserialize(deserializer).map(NullableF64::from)
    }
}

/// Free-form nullable value.
///
/// Integers keep their exact value and integer spelling; other numbers are
/// doubles, and a non-finite double decodes as `Null`.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum LhrValue {
    #[default]
    Null,
    Bool(bool),
    /// Non-negative integer.
    UInt(u64),
    /// Negative integer.
    Int(i64),
    Number(f64),
    String(String),
    List(Vec<LhrValue>),
    Struct(BTreeMap<String, LhrValue>),
}

impl LhrValue {
    pub fn is_null(&self) -> bool {
        matches!(self, LhrValue::Null)
    }

    /// Build a list of strings, the most common shape for this type.
    pub fn string_list<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        LhrValue::List(
            items
                .into_iter()
                .map(|s| LhrValue::String(s.into()))
                .collect(),
        )
    }

    /// The value as a list of strings, if it is one.
    pub fn as_string_list(&self) -> Option<Vec<&str>> {
        match self {
            LhrValue::List(items) => items
                .iter()
                .map(|item| match item {
                    LhrValue::String(s) => Some(s.as_str()),
                    _ => None,
                })
                .collect(),
            _ => None,
        }
    }
}

impl From<serde_json::Value> for LhrValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => LhrValue::Null,
            serde_json::Value::Bool(b) => LhrValue::Bool(b),
            serde_json::Value::Number(n) => {
                if let Some(u) = n.as_u64() {
                    LhrValue::UInt(u)
                } else if let Some(i) = n.as_i64() {
                    LhrValue::Int(i)
                } else {
                    match n.as_f64() {
                        Some(f) if f.is_finite() => LhrValue::Number(f),
                        _ => LhrValue::Null,
                    }
                }
            }
            serde_json::Value::String(s) => LhrValue::String(s),
            serde_json::Value::Array(items) => {
                LhrValue::List(items.into_iter().map(LhrValue::from).collect())
            }
            serde_json::Value::Object(map) => LhrValue::Struct(
                map.into_iter()
                    .map(|(k, v)| (k, LhrValue::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<LhrValue> for serde_json::Value {
    fn from(value: LhrValue) -> Self {
        match value {
            LhrValue::Null => serde_json::Value::Null,
            LhrValue::Bool(b) => serde_json::Value::Bool(b),
            LhrValue::UInt(u) => serde_json::Value::Number(u.into()),
            LhrValue::Int(i) => serde_json::Value::Number(i.into()),
            LhrValue::Number(f) => serde_json::Number::from_f64(f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            LhrValue::String(s) => serde_json::Value::String(s),
            LhrValue::List(items) => {
                serde_json::Value::Array(items.into_iter().map(Into::into).collect())
            }
            LhrValue::Struct(map) => serde_json::Value::Object(
                map.into_iter().map(|(k, v)| (k, v.into())).collect(),
            ),
        }
    }
}

impl Serialize for LhrValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            LhrValue::Null => serializer.serialize_none(),
            LhrValue::Bool(b) => serializer.serialize_bool(*b),
            LhrValue::UInt(u) => serializer.serialize_u64(*u),
            LhrValue::Int(i) => serializer.serialize_i64(*i),
            LhrValue::Number(f) if f.is_finite() => serializer.serialize_f64(*f),
            LhrValue::Number(_) => serializer.serialize_none(),
            LhrValue::String(s) => serializer.serialize_str(s),
            LhrValue::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            LhrValue::Struct(fields) => {
                let mut map = serializer.serialize_map(Some(fields.len()))?;
                for (k, v) in fields {
                    map.serialize_entry(k, v)?;
                }
                map.end()
            }
        }
    }
}

struct LhrValueVisitor;

impl<'de> Visitor<'de> for LhrValueVisitor {
    type Value = LhrValue;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("null, a boolean, number, string, list or struct")
    }

    fn visit_unit<E: de::Error>(self) -> Result<LhrValue, E> {
        Ok(LhrValue::Null)
    }

    fn visit_none<E: de::Error>(self) -> Result<LhrValue, E> {
        Ok(LhrValue::Null)
    }

    fn visit_some<D>(self, deserializer: D) -> Result<LhrValue, D::Error>
    where
        D: Deserializer<'de>,
    {
        LhrValue::deserialize(deserializer)
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<LhrValue, E> {
        Ok(LhrValue::Bool(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<LhrValue, E> {
        if v >= 0 {
            Ok(LhrValue::UInt(v as u64))
        } else {
            Ok(LhrValue::Int(v))
        }
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<LhrValue, E> {
        Ok(LhrValue::UInt(v))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<LhrValue, E> {
        if v.is_finite() {
            Ok(LhrValue::Number(v))
        } else {
            Ok(LhrValue::Null)
        }
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<LhrValue, E> {
        Ok(LhrValue::String(v.to_string()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<LhrValue, E> {
        Ok(LhrValue::String(v))
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<LhrValue, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(item) = seq.next_element()? {
            items.push(item);
        }
        Ok(LhrValue::List(items))
    }

    fn visit_map<A>(self, mut map: A) -> Result<LhrValue, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut fields = BTreeMap::new();
        while let Some((k, v)) = map.next_entry::<String, LhrValue>()? {
            fields.insert(k, v);
        }
        Ok(LhrValue::Struct(fields))
    }
}

impl<'de> Deserialize<'de> for LhrValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(LhrValueVisitor)
    }
}

/// `deserialize_with` helper that keeps an explicit `null` as a present
/// value. Pair with `#[serde(default)]` so a missing field stays `None`.
pub mod present {
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: Deserialize<'de>,
    {
        T::deserialize(deserializer).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Holder {
        #[serde(default, skip_serializing_if = "NullableF64::is_absent")]
        score: NullableF64,
        #[serde(
            default,
            deserialize_with = "present::deserialize",
            skip_serializing_if = "Option::is_none"
        )]
        payload: Option<LhrValue>,
    }

    #[test]
    fn test_nullable_f64_three_states_decode() {
        let absent: Holder = serde_json::from_value(json!({})).expect("absent");
        assert_eq!(absent.score, NullableF64::Absent);

        let null: Holder = serde_json::from_value(json!({ "score": null })).expect("null");
        assert_eq!(null.score, NullableF64::Null);

        let value: Holder = serde_json::from_value(json!({ "score": 0.25 })).expect("value");
        assert_eq!(value.score, NullableF64::Value(0.25));
    }

    #[test]
    fn test_nullable_f64_encode_preserves_presence() {
        let absent = Holder {
            score: NullableF64::Absent,
            payload: None,
        };
        assert_eq!(serde_json::to_value(&absent).expect("ser"), json!({}));

        let null = Holder {
            score: NullableF64::Null,
            payload: None,
        };
        assert_eq!(
            serde_json::to_value(&null).expect("ser"),
            json!({ "score": null })
        );
    }

    #[test]
    fn test_non_finite_normalizes_to_null() {
        assert_eq!(NullableF64::new(f64::NAN), NullableF64::Null);
        assert_eq!(NullableF64::new(f64::INFINITY), NullableF64::Null);
        assert_eq!(NullableF64::new(0.5).finite(), Some(0.5));
        assert_eq!(NullableF64::Null.finite(), None);
    }

    #[test]
    fn test_present_keeps_explicit_null() {
        let null: Holder = serde_json::from_value(json!({ "payload": null })).expect("null");
        assert_eq!(null.payload, Some(LhrValue::Null));

        let absent: Holder = serde_json::from_value(json!({})).expect("absent");
        assert_eq!(absent.payload, None);

        let encoded = serde_json::to_string(&null).expect("ser");
        assert_eq!(encoded, r#"{"payload":null}"#);
    }

    #[test]
    fn test_lhr_value_nested_roundtrip() {
        let value = LhrValue::Struct(BTreeMap::from([
            ("data".to_string(), LhrValue::String("data:image/jpeg;base64,AAAA".into())),
            ("width".to_string(), LhrValue::Number(412.0)),
            (
                "nodes".to_string(),
                LhrValue::List(vec![LhrValue::Bool(true), LhrValue::Null]),
            ),
        ]));
        let json = serde_json::to_string(&value).expect("ser");
        let back: LhrValue = serde_json::from_str(&json).expect("de");
        assert_eq!(value, back);
    }

    #[test]
    fn test_string_list_helpers() {
        let value = LhrValue::string_list(["performance", "seo"]);
        assert_eq!(value.as_string_list(), Some(vec!["performance", "seo"]));
        assert_eq!(LhrValue::Null.as_string_list(), None);
        assert_eq!(
            LhrValue::List(vec![LhrValue::Number(1.0)]).as_string_list(),
            None
        );
    }

    #[test]
    fn test_integers_stay_exact() {
        let value: LhrValue = serde_json::from_str("[9007199254740993, -3, 1, 1.0]").expect("de");
        assert_eq!(
            value,
            LhrValue::List(vec![
                LhrValue::UInt(9_007_199_254_740_993),
                LhrValue::Int(-3),
                LhrValue::UInt(1),
                LhrValue::Number(1.0),
            ])
        );
        assert_eq!(
            serde_json::to_string(&value).expect("ser"),
            "[9007199254740993,-3,1,1.0]"
        );
    }

    #[test]
    fn test_nullable_keeps_all_three_states() {
        #[derive(Debug, PartialEq, Serialize, Deserialize)]
        struct Label {
            #[serde(default, skip_serializing_if = "Nullable::is_absent")]
            text: Nullable<String>,
        }

        for raw in [json!({}), json!({ "text": null }), json!({ "text": "" })] {
            let label: Label = serde_json::from_value(raw.clone()).expect("de");
            assert_eq!(serde_json::to_value(&label).expect("ser"), raw);
        }
        let empty: Label = serde_json::from_value(json!({ "text": "" })).expect("de");
        assert_eq!(empty.text.as_deref(), Some(""));
    }

    #[test]
    fn test_json_value_conversion_roundtrip() {
        let raw = json!({ "a": [1.5, "x", null], "b": false });
        let value = LhrValue::from(raw.clone());
        let back: serde_json::Value = value.into();
        assert_eq!(back, raw);
    }
}
