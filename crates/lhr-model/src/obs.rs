//! Structured observability hooks for record lifecycle events.
//!
//! This module provides:
//! - Record-scoped tracing spans via `RecordSpan` RAII guard
//! - Emission functions for aggregation, runtime-error, decode and upgrade events
//!
//! Events are emitted at `info!` level unless noted (filter with `RUST_LOG`).
//! For JSON output, pass `--json` to the CLI or set `LHR_LOG_JSON=1`.

use tracing::{debug, info, warn};

use crate::classifier::RuntimeError;

/// RAII guard that enters a span tagged with the record's requested URL.
///
/// # Example
///
/// ```ignore
/// let _span = RecordSpan::enter("https://example.com/");
/// // all tracing calls below carry requested_url = "https://example.com/"
/// ```
pub struct RecordSpan {
    _span: tracing::span::EnteredSpan,
}

impl RecordSpan {
    pub fn enter(requested_url: &str) -> Self {
        let span = tracing::info_span!("lhr.record", requested_url = %requested_url);
        Self {
            _span: span.entered(),
        }
    }
}

/// Emit event: a category received (or failed to receive) a score.
pub fn emit_category_scored(category_id: &str, score: Option<f64>, counted: usize, excluded: usize) {
    match score {
        Some(score) => info!(
            event = "category.scored",
            category_id = %category_id,
            score = score,
            counted = counted,
            excluded = excluded,
        ),
        None => info!(
            event = "category.unscored",
            category_id = %category_id,
            counted = counted,
            excluded = excluded,
        ),
    }
}

/// Emit event: an audit ref was left out of its category's score (debug level).
pub fn emit_ref_excluded(category_id: &str, audit_id: &str, reason: &str) {
    debug!(
        event = "category.ref_excluded",
        category_id = %category_id,
        audit_id = %audit_id,
        reason = %reason,
    );
}

/// Emit event: a runtime error was attached to the record (warning level).
pub fn emit_runtime_error_attached(error: &RuntimeError) {
    warn!(
        event = "runtime_error.attached",
        code = %error.code,
        group = ?error.code.group(),
        message = %error.message,
    );
}

/// Emit event: a second runtime error was dropped in favour of the first.
pub fn emit_runtime_error_ignored(kept: &RuntimeError, dropped: &RuntimeError) {
    warn!(
        event = "runtime_error.ignored",
        kept = %kept.code,
        dropped = %dropped.code,
    );
}

/// Emit event: rescoring was skipped because the record failed.
pub fn emit_rescore_skipped(error: Option<&RuntimeError>) {
    let code = error.map(|e| e.code.to_string()).unwrap_or_default();
    info!(event = "category.rescore_skipped", code = %code);
}

/// Emit event: an audit id was added twice; the later one wins.
pub fn emit_audit_replaced(audit_id: &str) {
    warn!(event = "audit.replaced", audit_id = %audit_id);
}

/// Emit event: a payload failed to decode (warning level).
pub fn emit_decode_failed(format: &str, error: &dyn std::fmt::Display) {
    warn!(event = "codec.decode_failed", format = %format, error = %error);
}

/// Emit event: a payload was decoded.
pub fn emit_decoded(format: &str, bytes: usize) {
    debug!(event = "codec.decoded", format = %format, bytes = bytes);
}

/// Emit event: the compatibility layer back-filled a superseding field.
pub fn emit_compat_upgrade(field: &str, source: &str) {
    info!(event = "compat.upgraded", field = %field, source = %source);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_span_create() {
        let _span = RecordSpan::enter("https://example.com/");
    }
}
