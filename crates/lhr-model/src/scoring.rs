//! Category score aggregation.
//!
//! A category's score is the weighted mean of the scores of the audits its
//! refs point at, over the refs that are countable. A ref is excluded from
//! both numerator and denominator when its audit is missing, its display
//! mode carries no score, its weight is zero (or negative, or non-finite),
//! or its score is absent or null. Nothing here returns an error: one broken
//! audit must not invalidate a whole category.
//!
//! Accumulation runs in ref-list order so results are bit-reproducible.
//! Weights only need to be finite: when the raw sums overflow they are
//! recomputed with every weight divided by the largest counted weight.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::audit::{AuditResult, ScoreDisplayMode};
use crate::domain::category::LhrCategory;
use crate::domain::report::Lhr;
use crate::domain::value::NullableF64;
use crate::obs;

// ---------------------------------------------------------------------------
// Per-ref contributions
// ---------------------------------------------------------------------------

/// Why a ref did not contribute to its category's score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum Exclusion {
    /// The ref points at an audit id that is not in the record.
    MissingAudit,
    /// The audit's display mode is never scored.
    NonCountableMode { mode: ScoreDisplayMode },
    /// Weight is exactly zero.
    ZeroWeight,
    /// Weight is negative or non-finite.
    InvalidWeight,
    /// The audit is in a scored mode but has no finite score.
    NotScored,
}

impl Exclusion {
    pub fn as_str(&self) -> &'static str {
        match self {
            Exclusion::MissingAudit => "missing_audit",
            Exclusion::NonCountableMode { .. } => "non_countable_mode",
            Exclusion::ZeroWeight => "zero_weight",
            Exclusion::InvalidWeight => "invalid_weight",
            Exclusion::NotScored => "not_scored",
        }
    }
}

/// What one ref contributed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RefContribution {
    Counted {
        audit_id: String,
        weight: f64,
        score: f64,
    },
    Excluded {
        audit_id: String,
        exclusion: Exclusion,
    },
}

impl RefContribution {
    pub fn audit_id(&self) -> &str {
        match self {
            RefContribution::Counted { audit_id, .. } | RefContribution::Excluded { audit_id, .. } => {
                audit_id
            }
        }
    }

    pub fn is_counted(&self) -> bool {
        matches!(self, RefContribution::Counted { .. })
    }
}

/// Full account of a category's aggregation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    /// One entry per ref, in ref order.
    pub contributions: Vec<RefContribution>,
    /// Weighted score sum; rescaled together with `denominator` when the
    /// raw weights overflow.
    pub numerator: f64,
    pub denominator: f64,
    /// `None` when no ref was countable.
    pub score: Option<f64>,
}

impl ScoreBreakdown {
    pub fn counted(&self) -> usize {
        self.contributions.iter().filter(|c| c.is_counted()).count()
    }

    pub fn excluded(&self) -> usize {
        self.contributions.len() - self.counted()
    }
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

fn classify_ref(
    weight: f64,
    audit: Option<&AuditResult>,
) -> std::result::Result<f64, Exclusion> {
    let audit = audit.ok_or(Exclusion::MissingAudit)?;
    let mode = audit.score_display_mode;
    if !mode.is_countable() {
        return Err(Exclusion::NonCountableMode { mode });
    }
    if !weight.is_finite() || weight < 0.0 {
        return Err(Exclusion::InvalidWeight);
    }
    if weight == 0.0 {
        return Err(Exclusion::ZeroWeight);
    }
    audit.countable_score().ok_or(Exclusion::NotScored)
}

/// Numerator and denominator over `(weight, score)` pairs, in order.
fn weighted_sums(counted: &[(f64, f64)]) -> (f64, f64) {
    let sums = |scale: f64| {
        counted.iter().fold((0.0_f64, 0.0_f64), |(n, d), &(weight, score)| {
            let weight = weight / scale;
            (n + weight * score, d + weight)
        })
    };
    let (numerator, denominator) = sums(1.0);
    if numerator.is_finite() && denominator.is_finite() {
        return (numerator, denominator);
    }
    let largest = counted.iter().map(|&(weight, _)| weight).fold(0.0_f64, f64::max);
    sums(largest)
}

/// Aggregate a category and report every ref's contribution.
pub fn score_breakdown(
    category: &LhrCategory,
    audits: &BTreeMap<String, AuditResult>,
) -> ScoreBreakdown {
    let refs = category.refs();
    let mut counted = Vec::with_capacity(refs.len());
    let mut contributions = Vec::with_capacity(refs.len());

    for audit_ref in refs {
        match classify_ref(audit_ref.weight, audits.get(&audit_ref.id)) {
            Ok(score) => {
                counted.push((audit_ref.weight, score));
                contributions.push(RefContribution::Counted {
                    audit_id: audit_ref.id.clone(),
                    weight: audit_ref.weight,
                    score,
                });
            }
            Err(exclusion) => {
                obs::emit_ref_excluded(&category.id, &audit_ref.id, exclusion.as_str());
                contributions.push(RefContribution::Excluded {
                    audit_id: audit_ref.id.clone(),
                    exclusion,
                });
            }
        }
    }

    let (numerator, denominator) = weighted_sums(&counted);
    let score = if denominator > 0.0 {
        let mean = numerator / denominator;
        (!mean.is_nan()).then(|| mean.clamp(0.0, 1.0))
    } else {
        None
    };

    ScoreBreakdown {
        contributions,
        numerator,
        denominator,
        score,
    }
}

/// Weighted mean of the category's countable audit scores, clamped to
/// `[0, 1]`; `None` when no ref is countable.
pub fn compute_category_score(
    category: &LhrCategory,
    audits: &BTreeMap<String, AuditResult>,
) -> Option<f64> {
    score_breakdown(category, audits).score
}

/// Outcome of finalizing every category of a record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FinalizeSummary {
    /// Categories that received a finite score.
    pub scored: usize,
    /// Categories left without a score.
    pub unscored: usize,
    /// True when the record carries a runtime error and was left untouched.
    pub skipped_for_runtime_error: bool,
}

/// Write computed scores into every category. Categories without countable
/// refs get an explicit null score.
pub(crate) fn apply_category_scores(lhr: &mut Lhr) -> FinalizeSummary {
    let mut summary = FinalizeSummary::default();
    let audits = &lhr.audits;
    for category in lhr.categories.values_mut() {
        let breakdown = score_breakdown(category, audits);
        obs::emit_category_scored(
            &category.id,
            breakdown.score,
            breakdown.counted(),
            breakdown.excluded(),
        );
        match breakdown.score {
            Some(score) => {
                category.score = NullableF64::Value(score);
                summary.scored += 1;
            }
            None => {
                category.score = NullableF64::Null;
                summary.unscored += 1;
            }
        }
    }
    summary
}

/// Finalize category scores of a fully populated record.
///
/// A record that already carries a non-zero runtime error is left as is:
/// its audit and category data are informational and never re-aggregated.
pub fn finalize_category_scores(lhr: &mut Lhr) -> FinalizeSummary {
    if !lhr.is_authoritative() {
        obs::emit_rescore_skipped(lhr.runtime_error.value());
        return FinalizeSummary {
            skipped_for_runtime_error: true,
            ..FinalizeSummary::default()
        };
    }
    apply_category_scores(lhr)
}
