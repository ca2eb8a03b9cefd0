//! Structural validation of records.
//!
//! Two layers:
//! - [`check_required_fields`] runs on the raw JSON tree before typed
//!   decoding and turns a missing required field into a
//!   [`DecodeError::MissingField`] naming the full path.
//! - [`validate_structure`] inspects a decoded [`Lhr`] and lists every
//!   [`StructuralDefect`]. It reports only: it never mutates the record and
//!   never fails decode.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::DecodeError;
use super::report::Lhr;
use super::value::NullableF64;
use crate::classifier::LhrErrorCode;

/// Top-level fields every record must carry.
pub const REQUIRED_TOP_LEVEL_FIELDS: &[&str] = &[
    "fetch_time",
    "requested_url",
    "final_url",
    "tool_version",
    "environment",
    "audits",
    "categories",
    "category_groups",
    "config_settings",
    "i18n",
    "timing",
    "entities",
];

/// Required fields of nested entities: (container, fields).
pub const REQUIRED_NESTED_FIELDS: &[(&str, &[&str])] = &[
    ("audits.*", &["id"]),
    ("categories.*", &["id"]),
    ("categories.*.audit_refs[]", &["id", "weight"]),
    ("entities[]", &["name"]),
    ("runtime_error", &["code", "message"]),
];

fn object_at<'a>(
    value: &'a Value,
    path: &str,
) -> Result<&'a serde_json::Map<String, Value>, DecodeError> {
    value.as_object().ok_or_else(|| DecodeError::WrongType {
        path: path.to_string(),
        expected: "object",
    })
}

fn array_at<'a>(value: &'a Value, path: &str) -> Result<&'a Vec<Value>, DecodeError> {
    value.as_array().ok_or_else(|| DecodeError::WrongType {
        path: path.to_string(),
        expected: "array",
    })
}

fn require(
    object: &serde_json::Map<String, Value>,
    path: &str,
    fields: &[&str],
) -> Result<(), DecodeError> {
    for &field in fields {
        if !object.contains_key(field) {
            return Err(DecodeError::MissingField {
                path: format!("{path}.{field}"),
            });
        }
    }
    Ok(())
}

fn nested_fields(container: &str) -> &'static [&'static str] {
    REQUIRED_NESTED_FIELDS
        .iter()
        .find(|(c, _)| *c == container)
        .map(|(_, fields)| *fields)
        .unwrap_or(&[])
}

/// Check a JSON document for required fields before typed decoding.
///
/// # Errors
///
/// - `DecodeError::WrongType`: the document or a required container is not
///   the expected JSON kind.
/// - `DecodeError::MissingField`: a required field is absent. The first
///   missing field in document order is reported.
pub fn check_required_fields(document: &Value) -> Result<(), DecodeError> {
    let root = object_at(document, "$")?;
    for &field in REQUIRED_TOP_LEVEL_FIELDS {
        if !root.contains_key(field) {
            return Err(DecodeError::MissingField {
                path: field.to_string(),
            });
        }
    }

    for (key, audit) in object_at(&root["audits"], "audits")? {
        let path = format!("audits.{key}");
        require(object_at(audit, &path)?, &path, nested_fields("audits.*"))?;
    }

    for (key, category) in object_at(&root["categories"], "categories")? {
        let path = format!("categories.{key}");
        let category = object_at(category, &path)?;
        require(category, &path, nested_fields("categories.*"))?;

        if let Some(refs) = category.get("audit_refs").filter(|v| !v.is_null()) {
            let refs_path = format!("{path}.audit_refs");
            for (i, audit_ref) in array_at(refs, &refs_path)?.iter().enumerate() {
                let ref_path = format!("{refs_path}[{i}]");
                require(
                    object_at(audit_ref, &ref_path)?,
                    &ref_path,
                    nested_fields("categories.*.audit_refs[]"),
                )?;
            }
        }
    }

    for (i, entity) in array_at(&root["entities"], "entities")?.iter().enumerate() {
        let path = format!("entities[{i}]");
        require(object_at(entity, &path)?, &path, nested_fields("entities[]"))?;
    }

    if let Some(error) = root.get("runtime_error").filter(|v| !v.is_null()) {
        let path = "runtime_error";
        require(object_at(error, path)?, path, nested_fields(path))?;
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Decoded-record checks
// ---------------------------------------------------------------------------

/// A structural problem with a decoded record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StructuralDefect {
    /// An audit ref names an audit id that is not in `audits`.
    DanglingAuditRef { category_id: String, audit_id: String },
    /// An audit ref names a group id that is not in `category_groups`.
    DanglingGroupRef {
        category_id: String,
        audit_id: String,
        group_id: String,
    },
    /// A map entry's key differs from the `id` it holds.
    KeyIdMismatch {
        map: String,
        key: String,
        id: String,
    },
    /// A non-scored display mode carries a finite score.
    UnexpectedScore { audit_id: String, mode: String },
    /// A scored display mode has no finite score.
    MissingScore { audit_id: String, mode: String },
    /// A score lies outside `[0, 1]`.
    ScoreOutOfRange { path: String, score: f64 },
    /// An audit ref weight is negative or non-finite.
    InvalidWeight {
        category_id: String,
        audit_id: String,
        weight: f64,
    },
    /// A runtime error is present but carries `NO_ERROR`.
    NoErrorRuntimeError,
}

impl std::fmt::Display for StructuralDefect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StructuralDefect::DanglingAuditRef {
                category_id,
                audit_id,
            } => write!(f, "category {category_id} references missing audit {audit_id}"),
            StructuralDefect::DanglingGroupRef {
                category_id,
                audit_id,
                group_id,
            } => write!(
                f,
                "category {category_id} ref {audit_id} names missing group {group_id}"
            ),
            StructuralDefect::KeyIdMismatch { map, key, id } => {
                write!(f, "{map}.{key} holds id {id}")
            }
            StructuralDefect::UnexpectedScore { audit_id, mode } => {
                write!(f, "audit {audit_id} has a score in {mode} mode")
            }
            StructuralDefect::MissingScore { audit_id, mode } => {
                write!(f, "audit {audit_id} has no score in {mode} mode")
            }
            StructuralDefect::ScoreOutOfRange { path, score } => {
                write!(f, "{path} = {score} is outside [0, 1]")
            }
            StructuralDefect::InvalidWeight {
                category_id,
                audit_id,
                weight,
            } => write!(f, "category {category_id} ref {audit_id} has weight {weight}"),
            StructuralDefect::NoErrorRuntimeError => {
                write!(f, "runtime_error is present with code NO_ERROR")
            }
        }
    }
}

/// Outcome of [`validate_structure`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StructureReport {
    /// Defects found, in discovery order (empty when sound).
    pub defects: Vec<StructuralDefect>,
}

impl StructureReport {
    /// Whether the record has no defects.
    pub fn is_sound(&self) -> bool {
        self.defects.is_empty()
    }
}

fn check_range(path: String, score: &NullableF64, defects: &mut Vec<StructuralDefect>) {
    if let Some(score) = score.finite() {
        if !(0.0..=1.0).contains(&score) {
            defects.push(StructuralDefect::ScoreOutOfRange { path, score });
        }
    }
}

/// List every structural defect of a decoded record.
pub fn validate_structure(lhr: &Lhr) -> StructureReport {
    let mut defects = Vec::new();

    for (key, audit) in &lhr.audits {
        if *key != audit.id {
            defects.push(StructuralDefect::KeyIdMismatch {
                map: "audits".into(),
                key: key.clone(),
                id: audit.id.clone(),
            });
        }

        let mode = audit.score_display_mode;
        let has_score = audit.score.finite().is_some();
        if mode.is_countable() && !has_score {
            defects.push(StructuralDefect::MissingScore {
                audit_id: key.clone(),
                mode: mode.to_string(),
            });
        } else if !mode.is_countable() && has_score {
            defects.push(StructuralDefect::UnexpectedScore {
                audit_id: key.clone(),
                mode: mode.to_string(),
            });
        }
        check_range(format!("audits.{key}.score"), &audit.score, &mut defects);
    }

    for (key, category) in &lhr.categories {
        if *key != category.id {
            defects.push(StructuralDefect::KeyIdMismatch {
                map: "categories".into(),
                key: key.clone(),
                id: category.id.clone(),
            });
        }
        check_range(format!("categories.{key}.score"), &category.score, &mut defects);

        for audit_ref in category.refs() {
            if !lhr.audits.contains_key(&audit_ref.id) {
                defects.push(StructuralDefect::DanglingAuditRef {
                    category_id: key.clone(),
                    audit_id: audit_ref.id.clone(),
                });
            }
            if let Some(group) = audit_ref.group.value() {
                if !lhr.category_groups.contains_key(group) {
                    defects.push(StructuralDefect::DanglingGroupRef {
                        category_id: key.clone(),
                        audit_id: audit_ref.id.clone(),
                        group_id: group.clone(),
                    });
                }
            }
            if !audit_ref.weight.is_finite() || audit_ref.weight < 0.0 {
                defects.push(StructuralDefect::InvalidWeight {
                    category_id: key.clone(),
                    audit_id: audit_ref.id.clone(),
                    weight: audit_ref.weight,
                });
            }
        }
    }

    for (key, group) in &lhr.category_groups {
        if let Some(id) = group.id.value().filter(|id| *id != key) {
            defects.push(StructuralDefect::KeyIdMismatch {
                map: "category_groups".into(),
                key: key.clone(),
                id: id.clone(),
            });
        }
    }

    if let Some(err) = lhr.runtime_error.value() {
        if err.code == LhrErrorCode::NoError {
            defects.push(StructuralDefect::NoErrorRuntimeError);
        }
    }

    StructureReport { defects }
}
