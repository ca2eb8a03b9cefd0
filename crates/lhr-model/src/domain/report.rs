//! The root record produced by one audit run.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::audit::AuditResult;
use super::category::{CategoryGroup, GatherMode, LhrCategory};
use super::entity::{LhrEntity, StackPack};
use super::environment::{ConfigSettings, Environment};
use super::i18n::I18n;
use super::timing::Timing;
use super::value::{present, LhrValue, Nullable};
use crate::classifier::{RunOutcome, RuntimeError};
use crate::obs;

/// Complete result of one run: audits, categories, metadata, and the
/// optional run-level error.
///
/// # Invariants
///
/// Every `categories[*].audit_refs[*].id` is expected to be a key in
/// `audits`; a dangling ref is a structural defect that the aggregator
/// excludes and [`crate::validate_structure`] reports. When `runtime_error`
/// carries a non-zero code, `audits` and `categories` are best-effort.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lhr {
    pub fetch_time: DateTime<Utc>,

    pub requested_url: String,

    /// Deprecated: superseded by `main_document_url` and
    /// `final_displayed_url`.
    pub final_url: String,

    pub tool_version: String,

    pub environment: Environment,

    /// Deprecated: superseded by `environment.host_user_agent`.
    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub user_agent: Nullable<String>,

    /// Ordered, top-level warnings about the run.
    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub run_warnings: Nullable<Vec<String>>,

    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub runtime_error: Nullable<RuntimeError>,

    pub audits: BTreeMap<String, AuditResult>,

    pub categories: BTreeMap<String, LhrCategory>,

    pub category_groups: BTreeMap<String, CategoryGroup>,

    pub config_settings: ConfigSettings,

    pub i18n: I18n,

    pub timing: Timing,

    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub stack_packs: Nullable<Vec<StackPack>>,

    #[serde(default, skip_serializing_if = "GatherMode::is_fallback")]
    pub gather_mode: GatherMode,

    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub main_document_url: Nullable<String>,

    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub final_displayed_url: Nullable<String>,

    /// Opaque screenshot payload.
    #[serde(
        default,
        deserialize_with = "present::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub full_page_screenshot: Option<LhrValue>,

    pub entities: Vec<LhrEntity>,
}

/// A category score as a consumer should read it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScoreReading {
    /// The run completed and the category has a score.
    Authoritative(f64),
    /// The run failed; whatever score exists is informational only.
    BestEffort(Option<f64>),
    /// No score: the category is missing or had no countable audits.
    Absent,
}

impl ScoreReading {
    /// Score to show, if any. Never substitutes zero for an absent score.
    pub fn value(&self) -> Option<f64> {
        match self {
            ScoreReading::Authoritative(v) => Some(*v),
            ScoreReading::BestEffort(v) => *v,
            ScoreReading::Absent => None,
        }
    }
}

impl Lhr {
    /// An empty record with required fields filled in.
    pub fn new(
        requested_url: impl Into<String>,
        tool_version: impl Into<String>,
        fetch_time: DateTime<Utc>,
    ) -> Self {
        let requested_url = requested_url.into();
        Self {
            fetch_time,
            final_url: requested_url.clone(),
            requested_url,
            tool_version: tool_version.into(),
            environment: Environment::default(),
            user_agent: Nullable::Absent,
            run_warnings: Nullable::Value(Vec::new()),
            runtime_error: Nullable::Absent,
            audits: BTreeMap::new(),
            categories: BTreeMap::new(),
            category_groups: BTreeMap::new(),
            config_settings: ConfigSettings::default(),
            i18n: I18n::default(),
            timing: Timing::new(0.0),
            stack_packs: Nullable::Absent,
            gather_mode: GatherMode::Navigation,
            main_document_url: Nullable::Absent,
            final_displayed_url: Nullable::Absent,
            full_page_screenshot: None,
            entities: Vec::new(),
        }
    }

    /// Terminal state of the run.
    pub fn outcome(&self) -> RunOutcome {
        RunOutcome::classify(self.runtime_error.value())
    }

    /// Whether audit and category data are authoritative.
    pub fn is_authoritative(&self) -> bool {
        self.outcome().is_authoritative()
    }

    /// Read a category score, honouring the runtime error.
    pub fn category_score(&self, category_id: &str) -> ScoreReading {
        let Some(category) = self.categories.get(category_id) else {
            return ScoreReading::Absent;
        };
        let score = category.score.finite();
        if !self.is_authoritative() {
            return ScoreReading::BestEffort(score);
        }
        match score {
            Some(v) => ScoreReading::Authoritative(v),
            None => ScoreReading::Absent,
        }
    }

    /// Attach the run-level error.
    ///
    /// A record carries at most one failure: once a non-zero code is
    /// attached, later errors are dropped and `false` is returned. A
    /// `NO_ERROR` envelope is never attached.
    pub fn attach_runtime_error(&mut self, error: RuntimeError) -> bool {
        if !error.is_error() {
            return false;
        }
        if let Some(existing) = self.runtime_error.value().filter(|e| e.is_error()) {
            obs::emit_runtime_error_ignored(existing, &error);
            return false;
        }
        obs::emit_runtime_error_attached(&error);
        self.runtime_error = Nullable::Value(error);
        true
    }

    pub fn audit(&self, audit_id: &str) -> Option<&AuditResult> {
        self.audits.get(audit_id)
    }

    /// Top-level run warnings, empty when absent or null.
    pub fn warnings(&self) -> &[String] {
        self.run_warnings.items()
    }

    /// Group label for an audit ref's group id.
    pub fn group(&self, group_id: &str) -> Option<&CategoryGroup> {
        self.category_groups.get(group_id)
    }

    /// Digest of the record's canonical JSON form.
    pub fn digest(&self) -> crate::Result<String> {
        let value = serde_json::to_value(self)?;
        super::digest::compute_digest(&value)
    }
}
