//! Per-audit outcomes.

use serde::{Deserialize, Serialize};

use super::value::{present, LhrValue, Nullable, NullableF64};
use super::wire_enum::wire_enum;

wire_enum! {
    /// How an audit's score should be interpreted.
    ///
    /// `NOT_APPLICABLE` was spelled several ways over the schema's life; all
    /// of them decode to [`ScoreDisplayMode::NotApplicable`] and re-encode as
    /// `NOT_APPLICABLE`.
    pub enum ScoreDisplayMode {
        fallback Unspecified = 0 => "SCORE_DISPLAY_MODE_UNSPECIFIED";
        /// Pass/fail.
        Binary = 1 => "BINARY" | "binary",
        /// Continuous score in [0,1].
        Numeric = 2 => "NUMERIC" | "numeric",
        /// Carries information only; never scored.
        Informative = 3 => "INFORMATIVE" | "informative",
        /// Requires a human to check; never scored.
        Manual = 4 => "MANUAL" | "manual",
        /// Does not apply to this page; never scored.
        NotApplicable = 5 => "NOT_APPLICABLE" | "NOT_AVAILABLE" | "notApplicable" | "not-applicable" | "not_applicable",
        /// The audit itself failed to run; never scored.
        Error = 6 => "ERROR" | "error",
        /// Scored, with savings estimates for one or more metrics.
        MetricSavings = 7 => "METRIC_SAVINGS" | "metricSavings",
    }
}

impl ScoreDisplayMode {
    /// Whether an audit in this mode may contribute to a category score.
    ///
    /// The fallback variant is not countable: a mode this reader does not
    /// understand has no known scoring semantics.
    pub fn is_countable(&self) -> bool {
        matches!(
            self,
            ScoreDisplayMode::Binary | ScoreDisplayMode::Numeric | ScoreDisplayMode::MetricSavings
        )
    }
}

/// Estimated savings per metric. Each metric is independently present.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricSavings {
    #[serde(default, skip_serializing_if = "NullableF64::is_absent")]
    pub lcp: NullableF64,
    #[serde(default, skip_serializing_if = "NullableF64::is_absent")]
    pub fcp: NullableF64,
    #[serde(default, skip_serializing_if = "NullableF64::is_absent")]
    pub cls: NullableF64,
    #[serde(default, skip_serializing_if = "NullableF64::is_absent")]
    pub tbt: NullableF64,
    #[serde(default, skip_serializing_if = "NullableF64::is_absent")]
    pub inp: NullableF64,
}

impl MetricSavings {
    /// Number of metrics that carry a field on the wire.
    pub fn present_count(&self) -> usize {
        [self.lcp, self.fcp, self.cls, self.tbt, self.inp]
            .iter()
            .filter(|m| !m.is_absent())
            .count()
    }
}

/// Log-normal scoring curve control points.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoringOptions {
    #[serde(default, skip_serializing_if = "NullableF64::is_absent")]
    pub p10: NullableF64,
    #[serde(default, skip_serializing_if = "NullableF64::is_absent")]
    pub median: NullableF64,
}

/// Outcome of one audit within a run, keyed by `id` in [`crate::Lhr::audits`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuditResult {
    /// Audit identifier (e.g. "first-contentful-paint").
    pub id: String,

    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub title: Nullable<String>,

    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub description: Nullable<String>,

    /// Score in [0,1]; absent or null when the audit is not scored.
    #[serde(default, skip_serializing_if = "NullableF64::is_absent")]
    pub score: NullableF64,

    #[serde(default, skip_serializing_if = "ScoreDisplayMode::is_fallback")]
    pub score_display_mode: ScoreDisplayMode,

    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub display_value: Nullable<String>,

    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub explanation: Nullable<String>,

    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub error_message: Nullable<String>,

    /// Free-form details, passed through untouched.
    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub details: Nullable<serde_json::Map<String, serde_json::Value>>,

    /// Absent, or an ordered list of warning strings.
    #[serde(
        default,
        deserialize_with = "present::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub warnings: Option<LhrValue>,

    #[serde(default, skip_serializing_if = "NullableF64::is_absent")]
    pub numeric_value: NullableF64,

    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub numeric_unit: Nullable<String>,

    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub error_stack: Nullable<String>,

    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub metric_savings: Nullable<MetricSavings>,

    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub scoring_options: Nullable<ScoringOptions>,

    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub guidance_level: Nullable<u32>,

    /// Audit ids this audit supersedes.
    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub replaces_audits: Nullable<Vec<String>>,
}

impl AuditResult {
    /// A scored audit.
    pub fn scored(id: impl Into<String>, mode: ScoreDisplayMode, score: f64) -> Self {
        Self {
            id: id.into(),
            score: NullableF64::new(score),
            score_display_mode: mode,
            ..Self::default()
        }
    }

    /// An audit whose mode carries no score (informative, manual, ...).
    pub fn unscored(id: impl Into<String>, mode: ScoreDisplayMode) -> Self {
        Self {
            id: id.into(),
            score: NullableF64::Null,
            score_display_mode: mode,
            ..Self::default()
        }
    }

    /// An audit that failed to run.
    pub fn errored(id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error_message: Nullable::Value(message.into()),
            ..Self::unscored(id, ScoreDisplayMode::Error)
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Nullable::Value(title.into());
        self
    }

    pub fn with_display_value(mut self, display_value: impl Into<String>) -> Self {
        self.display_value = Nullable::Value(display_value.into());
        self
    }

    pub fn with_numeric_value(mut self, value: f64, unit: impl Into<String>) -> Self {
        self.numeric_value = NullableF64::new(value);
        self.numeric_unit = Nullable::Value(unit.into());
        self
    }

    pub fn with_metric_savings(mut self, savings: MetricSavings) -> Self {
        self.metric_savings = Nullable::Value(savings);
        self
    }

    pub fn with_details(mut self, details: serde_json::Map<String, serde_json::Value>) -> Self {
        self.details = Nullable::Value(details);
        self
    }

    pub fn with_warnings<I, S>(mut self, warnings: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.warnings = Some(LhrValue::string_list(warnings));
        self
    }

    /// The score as the aggregator sees it: finite and in a countable mode.
    ///
    /// A finite score on an informative, not-applicable, manual or error
    /// audit is a producer mistake and is ignored here.
    pub fn countable_score(&self) -> Option<f64> {
        if self.score_display_mode.is_countable() {
            self.score.finite()
        } else {
            None
        }
    }
}
