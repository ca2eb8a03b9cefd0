//! Compatibility layer for deprecated fields.
//!
//! Deprecated fields stay readable and writable; nothing here runs during
//! decode. Effective readers prefer the superseding field when it is set
//! and fall back to its deprecated predecessor. [`upgrade`] is the explicit
//! opt-in migration that copies deprecated values into empty superseding
//! fields and reports each change as a [`CompatNote`].

use serde::{Deserialize, Serialize};

use crate::domain::environment::{ConfigSettings, FormFactor};
use crate::domain::report::Lhr;
use crate::domain::value::Nullable;
use crate::obs;

/// A superseding field the upgrade can back-fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompatField {
    /// `config_settings.form_factor`, from `config_settings.emulated_form_factor`.
    FormFactor,
    /// `main_document_url`, from `final_url`.
    MainDocumentUrl,
    /// `final_displayed_url`, from `final_url`.
    FinalDisplayedUrl,
    /// `environment.host_user_agent`, from `user_agent`.
    HostUserAgent,
}

impl CompatField {
    /// Path of the field that gets written.
    pub fn path(&self) -> &'static str {
        match self {
            CompatField::FormFactor => "config_settings.form_factor",
            CompatField::MainDocumentUrl => "main_document_url",
            CompatField::FinalDisplayedUrl => "final_displayed_url",
            CompatField::HostUserAgent => "environment.host_user_agent",
        }
    }

    /// Path of the deprecated field the value comes from.
    pub fn source(&self) -> &'static str {
        match self {
            CompatField::FormFactor => "config_settings.emulated_form_factor",
            CompatField::MainDocumentUrl | CompatField::FinalDisplayedUrl => "final_url",
            CompatField::HostUserAgent => "user_agent",
        }
    }
}

/// One change made by [`upgrade`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompatNote {
    pub field: CompatField,
    /// The value written, in its wire form.
    pub value: String,
}

impl std::fmt::Display for CompatNote {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} <- {} ({})",
            self.field.path(),
            self.field.source(),
            self.value
        )
    }
}

/// Form factor of the run, preferring `form_factor` over the deprecated
/// `emulated_form_factor`.
pub fn effective_form_factor(settings: &ConfigSettings) -> FormFactor {
    if !settings.form_factor.is_fallback() {
        return settings.form_factor;
    }
    settings
        .emulated_form_factor
        .to_form_factor()
        .unwrap_or_default()
}

/// Browser user agent, preferring `environment.host_user_agent`.
pub fn effective_user_agent(lhr: &Lhr) -> &str {
    non_empty_or(&lhr.environment.host_user_agent, text(&lhr.user_agent))
}

/// URL of the main document, preferring `main_document_url` over the
/// deprecated `final_url`.
pub fn effective_main_document_url(lhr: &Lhr) -> &str {
    non_empty_or(&lhr.main_document_url, &lhr.final_url)
}

/// URL shown in the address bar at the end of the run.
pub fn effective_final_displayed_url(lhr: &Lhr) -> &str {
    non_empty_or(&lhr.final_displayed_url, &lhr.final_url)
}

/// Label for the user agent row of the renderer table.
pub fn effective_ua_label(lhr: &Lhr) -> Option<&str> {
    lhr.i18n.effective_ua_label()
}

fn text(field: &Nullable<String>) -> &str {
    field.as_deref().unwrap_or_default()
}

fn non_empty_or<'a>(preferred: &'a Nullable<String>, legacy: &'a str) -> &'a str {
    match text(preferred) {
        "" => legacy,
        set => set,
    }
}

/// Back-fill empty superseding fields from their deprecated predecessors.
///
/// A superseding field counts as empty when it is missing, null, or `""`.
/// Deprecated fields are left in place. Fields that are already set are
/// never overwritten. Running it twice yields no notes the second time.
pub fn upgrade(lhr: &mut Lhr) -> Vec<CompatNote> {
    let mut notes = Vec::new();

    if lhr.config_settings.form_factor.is_fallback() {
        if let Some(form_factor) = lhr.config_settings.emulated_form_factor.to_form_factor() {
            lhr.config_settings.form_factor = form_factor;
            notes.push(note(CompatField::FormFactor, form_factor.as_wire()));
        }
    }

    if !lhr.final_url.is_empty() {
        if text(&lhr.main_document_url).is_empty() {
            lhr.main_document_url = Nullable::Value(lhr.final_url.clone());
            notes.push(note(CompatField::MainDocumentUrl, &lhr.final_url));
        }
        if text(&lhr.final_displayed_url).is_empty() {
            lhr.final_displayed_url = Nullable::Value(lhr.final_url.clone());
            notes.push(note(CompatField::FinalDisplayedUrl, &lhr.final_url));
        }
    }

    let legacy_ua = text(&lhr.user_agent);
    if text(&lhr.environment.host_user_agent).is_empty() && !legacy_ua.is_empty() {
        let legacy_ua = legacy_ua.to_string();
        notes.push(note(CompatField::HostUserAgent, &legacy_ua));
        lhr.environment.host_user_agent = Nullable::Value(legacy_ua);
    }

    notes
}

fn note(field: CompatField, value: &str) -> CompatNote {
    obs::emit_compat_upgrade(field.path(), field.source());
    CompatNote {
        field,
        value: value.to_string(),
    }
}
