//! Single-producer assembly of a record.
//!
//! Usage:
//! 1. Call [`LhrBuilder::new`] with the run's identity.
//! 2. Add audits, categories, groups and metadata as the run produces them.
//! 3. Call [`LhrBuilder::fail`] if the run hit a fatal error.
//! 4. Call [`LhrBuilder::finish`], which aggregates category scores and
//!    then attaches the runtime error, exactly once.
//!
//! `finish` consumes the builder, so scoring cannot run before population
//! is complete.

use chrono::{DateTime, Utc};

use crate::classifier::RuntimeError;
use crate::domain::audit::AuditResult;
use crate::domain::category::{CategoryGroup, GatherMode, LhrCategory};
use crate::domain::entity::{LhrEntity, StackPack};
use crate::domain::environment::{ConfigSettings, Environment};
use crate::domain::i18n::I18n;
use crate::domain::report::Lhr;
use crate::domain::timing::Timing;
use crate::domain::value::{LhrValue, Nullable};
use crate::obs;
use crate::scoring;

/// Assembles an [`Lhr`] during a run.
#[derive(Debug)]
pub struct LhrBuilder {
    lhr: Lhr,
    failure: Option<RuntimeError>,
}

impl LhrBuilder {
    pub fn new(
        requested_url: impl Into<String>,
        tool_version: impl Into<String>,
        fetch_time: DateTime<Utc>,
    ) -> Self {
        Self {
            lhr: Lhr::new(requested_url, tool_version, fetch_time),
            failure: None,
        }
    }

    pub fn with_final_url(mut self, url: impl Into<String>) -> Self {
        self.lhr.final_url = url.into();
        self
    }

    pub fn with_main_document_url(mut self, url: impl Into<String>) -> Self {
        self.lhr.main_document_url = Nullable::Value(url.into());
        self
    }

    pub fn with_final_displayed_url(mut self, url: impl Into<String>) -> Self {
        self.lhr.final_displayed_url = Nullable::Value(url.into());
        self
    }

    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.lhr.environment = environment;
        self
    }

    /// Sets the deprecated top-level user agent.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.lhr.user_agent = Nullable::Value(user_agent.into());
        self
    }

    pub fn with_config_settings(mut self, settings: ConfigSettings) -> Self {
        self.lhr.config_settings = settings;
        self
    }

    pub fn with_i18n(mut self, i18n: I18n) -> Self {
        self.lhr.i18n = i18n;
        self
    }

    pub fn with_timing(mut self, timing: Timing) -> Self {
        self.lhr.timing = timing;
        self
    }

    pub fn with_gather_mode(mut self, mode: GatherMode) -> Self {
        self.lhr.gather_mode = mode;
        self
    }

    pub fn with_full_page_screenshot(mut self, screenshot: LhrValue) -> Self {
        self.lhr.full_page_screenshot = Some(screenshot);
        self
    }

    /// Add an audit result. A second result with the same id replaces the
    /// first.
    pub fn add_audit(&mut self, audit: AuditResult) -> &mut Self {
        if self.lhr.audits.contains_key(&audit.id) {
            obs::emit_audit_replaced(&audit.id);
        }
        self.lhr.audits.insert(audit.id.clone(), audit);
        self
    }

    pub fn add_category(&mut self, category: LhrCategory) -> &mut Self {
        self.lhr.categories.insert(category.id.clone(), category);
        self
    }

    /// Add a group, keyed by its id (an id-less group is keyed by "").
    pub fn add_group(&mut self, group: CategoryGroup) -> &mut Self {
        let key = group.id.as_deref().unwrap_or_default().to_string();
        self.lhr.category_groups.insert(key, group);
        self
    }

    pub fn add_entity(&mut self, entity: LhrEntity) -> &mut Self {
        self.lhr.entities.push(entity);
        self
    }

    pub fn add_stack_pack(&mut self, pack: StackPack) -> &mut Self {
        self.lhr.stack_packs.push(pack);
        self
    }

    pub fn add_run_warning(&mut self, warning: impl Into<String>) -> &mut Self {
        self.lhr.run_warnings.push(warning.into());
        self
    }

    /// Record the run's fatal error. Only the first non-zero error is kept;
    /// returns whether this one was.
    pub fn fail(&mut self, error: RuntimeError) -> bool {
        if !error.is_error() {
            return false;
        }
        if let Some(kept) = &self.failure {
            obs::emit_runtime_error_ignored(kept, &error);
            return false;
        }
        self.failure = Some(error);
        true
    }

    /// Whether a fatal error has been recorded.
    pub fn has_failed(&self) -> bool {
        self.failure.is_some()
    }

    /// Aggregate category scores, attach the runtime error, and return the
    /// finished record.
    ///
    /// Scores of a failed run are still computed from whatever audits were
    /// produced; readers treat them as best-effort.
    pub fn finish(self) -> Lhr {
        let LhrBuilder { mut lhr, failure } = self;
        let _span = obs::RecordSpan::enter(&lhr.requested_url);

        scoring::apply_category_scores(&mut lhr);
        if let Some(error) = failure {
            lhr.attach_runtime_error(error);
        }
        lhr
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::LhrErrorCode;
    use crate::domain::audit::ScoreDisplayMode;
    use crate::domain::category::AuditRef;
    use crate::domain::report::ScoreReading;
    use crate::domain::value::NullableF64;

    fn fetched() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-03-01T12:00:00Z")
            .expect("parse RFC3339")
            .with_timezone(&Utc)
    }

    #[test]
    fn test_finish_scores_categories() {
        let mut builder = LhrBuilder::new("https://example.com/", "12.1.0", fetched());
        builder
            .add_audit(AuditResult::scored("a", ScoreDisplayMode::Binary, 1.0))
            .add_category(LhrCategory::new("seo", "SEO").with_ref(AuditRef::new("a", 1.0)))
            .add_category(LhrCategory::new("empty", "Empty"));
        let lhr = builder.finish();

        assert_eq!(lhr.category_score("seo"), ScoreReading::Authoritative(1.0));
        assert_eq!(lhr.categories["empty"].score, NullableF64::Null);
        assert!(lhr.runtime_error.is_absent());
    }

    #[test]
    fn test_duplicate_audit_replaces() {
        let mut builder = LhrBuilder::new("https://example.com/", "12.1.0", fetched());
        builder
            .add_audit(AuditResult::scored("a", ScoreDisplayMode::Binary, 0.0))
            .add_audit(AuditResult::scored("a", ScoreDisplayMode::Binary, 1.0));
        let lhr = builder.finish();
        assert_eq!(lhr.audits.len(), 1);
        assert_eq!(lhr.audits["a"].score, NullableF64::Value(1.0));
    }

    #[test]
    fn test_first_failure_is_kept() {
        let mut builder = LhrBuilder::new("https://example.com/", "12.1.0", fetched());
        assert!(!builder.fail(RuntimeError::from_code(LhrErrorCode::NoError)));
        assert!(builder.fail(RuntimeError::new(LhrErrorCode::NoFcp, "")));
        assert!(!builder.fail(RuntimeError::from_code(LhrErrorCode::PageHung)));
        let lhr = builder.finish();

        let err = lhr.runtime_error.value().expect("runtime error");
        assert_eq!(err.code, LhrErrorCode::NoFcp);
        assert_eq!(err.message, "The page did not paint any content.");
        assert!(!lhr.is_authoritative());
    }
}
