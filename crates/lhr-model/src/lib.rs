//! Result model for page audit runs.
//!
//! Re-exports the record schema, score aggregator, error classifier,
//! compatibility layer and wire codecs for programmatic access.

pub mod builder;
pub mod classifier;
pub mod codec;
pub mod compat;
pub mod domain;
pub mod obs;
pub mod scoring;
pub mod telemetry;

pub use domain::{
    check_required_fields, validate_structure, AuditRef, AuditResult, CategoryGroup,
    ConfigSettings, DecodeError, EmulatedFormFactor, Environment, FormFactor, GatherMode, I18n,
    IcuMessagePath, Lhr, LhrCategory, LhrEntity, LhrModelError, LhrValue, MetricSavings,
    Nullable, NullableF64, PerformanceEntry, RendererFormattedStrings, Result, ScoreDisplayMode,
    ScoreReading, ScoringOptions, StackPack, StructuralDefect, StructureReport, Timing,
};

pub use domain::digest::{canonical_json, compute_digest};

pub use builder::LhrBuilder;

pub use classifier::{ErrorGroup, LhrErrorCode, RunOutcome, RuntimeError};

pub use codec::{
    decode, encode, from_binary, from_json, to_binary, to_json, to_json_pretty, WireFormat,
    SCHEMA_VERSION,
};

pub use compat::{
    effective_final_displayed_url, effective_form_factor, effective_main_document_url,
    effective_ua_label, effective_user_agent, upgrade, CompatField, CompatNote,
};

pub use scoring::{
    compute_category_score, finalize_category_scores, score_breakdown, Exclusion,
    FinalizeSummary, RefContribution, ScoreBreakdown,
};

pub use obs::{
    emit_category_scored, emit_compat_upgrade, emit_decode_failed, emit_ref_excluded,
    emit_runtime_error_attached, RecordSpan,
};
pub use telemetry::init_tracing;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
