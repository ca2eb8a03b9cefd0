//! Categories, their audit references, and the group labels refs point at.

use serde::{Deserialize, Serialize};

use super::value::{Nullable, NullableF64};
use super::wire_enum::wire_enum;

wire_enum! {
    /// How the page was observed during the run.
    pub enum GatherMode {
        fallback Unspecified = 0 => "GATHER_MODE_UNSPECIFIED";
        /// Full page load.
        Navigation = 1 => "NAVIGATION" | "navigation",
        /// A window of user interaction.
        Timespan = 2 => "TIMESPAN" | "timespan",
        /// Page state at a single point in time.
        Snapshot = 3 => "SNAPSHOT" | "snapshot",
    }
}

/// A category's pointer to one audit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditRef {
    /// Key into [`crate::Lhr::audits`].
    pub id: String,

    /// Scoring weight, expected to be ≥ 0.
    pub weight: f64,

    /// Key into [`crate::Lhr::category_groups`].
    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub group: Nullable<String>,

    /// Short label for metric audits (e.g. "LCP").
    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub acronym: Nullable<String>,

    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub relevant_audits: Nullable<Vec<String>>,
}

impl AuditRef {
    pub fn new(id: impl Into<String>, weight: f64) -> Self {
        Self {
            id: id.into(),
            weight,
            group: Nullable::Absent,
            acronym: Nullable::Absent,
            relevant_audits: Nullable::Absent,
        }
    }

    pub fn in_group(mut self, group: impl Into<String>) -> Self {
        self.group = Nullable::Value(group.into());
        self
    }

    pub fn with_acronym(mut self, acronym: impl Into<String>) -> Self {
        self.acronym = Nullable::Value(acronym.into());
        self
    }
}

/// A named, weighted grouping of audits with one overall score.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LhrCategory {
    pub id: String,

    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub title: Nullable<String>,

    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub description: Nullable<String>,

    /// Aggregate score; absent or null until computed, or when no ref is
    /// countable.
    #[serde(default, skip_serializing_if = "NullableF64::is_absent")]
    pub score: NullableF64,

    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub manual_description: Nullable<String>,

    /// Ordered; order is preserved for traversal and display.
    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub audit_refs: Nullable<Vec<AuditRef>>,

    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub supported_modes: Nullable<Vec<GatherMode>>,
}

impl LhrCategory {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: Nullable::Value(title.into()),
            audit_refs: Nullable::Value(Vec::new()),
            ..Self::default()
        }
    }

    pub fn with_ref(mut self, audit_ref: AuditRef) -> Self {
        self.audit_refs.push(audit_ref);
        self
    }

    pub fn with_supported_modes(mut self, modes: Vec<GatherMode>) -> Self {
        self.supported_modes = Nullable::Value(modes);
        self
    }

    /// Refs in list order; empty when the field is absent or null.
    pub fn refs(&self) -> &[AuditRef] {
        self.audit_refs.items()
    }

    /// Whether the category may be produced in the given gather mode. An
    /// empty or missing list means no restriction was recorded.
    pub fn supports(&self, mode: GatherMode) -> bool {
        let modes = self.supported_modes.items();
        modes.is_empty() || modes.contains(&mode)
    }
}

/// Label bucket referenced by [`AuditRef::group`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryGroup {
    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub id: Nullable<String>,

    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub title: Nullable<String>,

    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub description: Nullable<String>,
}

impl CategoryGroup {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: Nullable::Value(id.into()),
            title: Nullable::Value(title.into()),
            description: Nullable::Absent,
        }
    }
}
