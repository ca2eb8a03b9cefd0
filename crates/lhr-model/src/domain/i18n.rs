//! Localized strings carried with the record.
//!
//! The renderer table is filled by the localization engine; this layer only
//! stores it. Three rows are deprecated and kept for older renderers.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::value::{LhrValue, Nullable};

/// Localized UI strings used by report renderers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererFormattedStrings {
    #[serde(skip_serializing_if = "Nullable::is_absent")]
    pub variance_disclaimer: Nullable<String>,
    #[serde(skip_serializing_if = "Nullable::is_absent")]
    pub opportunity_resource_column_label: Nullable<String>,
    #[serde(skip_serializing_if = "Nullable::is_absent")]
    pub opportunity_savings_column_label: Nullable<String>,
    #[serde(skip_serializing_if = "Nullable::is_absent")]
    pub error_missing_audit_info: Nullable<String>,
    #[serde(skip_serializing_if = "Nullable::is_absent")]
    pub error_label: Nullable<String>,
    #[serde(skip_serializing_if = "Nullable::is_absent")]
    pub warning_header: Nullable<String>,
    #[serde(skip_serializing_if = "Nullable::is_absent")]
    pub passed_audits_group_title: Nullable<String>,
    #[serde(skip_serializing_if = "Nullable::is_absent")]
    pub not_applicable_audits_group_title: Nullable<String>,
    #[serde(skip_serializing_if = "Nullable::is_absent")]
    pub manual_audits_group_title: Nullable<String>,
    #[serde(skip_serializing_if = "Nullable::is_absent")]
    pub toplevel_warnings_message: Nullable<String>,
    #[serde(skip_serializing_if = "Nullable::is_absent")]
    pub scorescale_label: Nullable<String>,
    #[serde(skip_serializing_if = "Nullable::is_absent")]
    pub crc_longest_duration_label: Nullable<String>,
    #[serde(skip_serializing_if = "Nullable::is_absent")]
    pub crc_initial_navigation: Nullable<String>,
    #[serde(skip_serializing_if = "Nullable::is_absent")]
    pub lab_data_title: Nullable<String>,
    #[serde(skip_serializing_if = "Nullable::is_absent")]
    pub warning_audits_group_title: Nullable<String>,
    #[serde(skip_serializing_if = "Nullable::is_absent")]
    pub snippet_expand_button_label: Nullable<String>,
    #[serde(skip_serializing_if = "Nullable::is_absent")]
    pub snippet_collapse_button_label: Nullable<String>,
    #[serde(skip_serializing_if = "Nullable::is_absent")]
    pub third_party_resources_label: Nullable<String>,
    #[serde(skip_serializing_if = "Nullable::is_absent")]
    pub runtime_desktop_emulation: Nullable<String>,
    #[serde(skip_serializing_if = "Nullable::is_absent")]
    pub runtime_mobile_emulation: Nullable<String>,
    #[serde(skip_serializing_if = "Nullable::is_absent")]
    pub runtime_no_emulation: Nullable<String>,
    #[serde(skip_serializing_if = "Nullable::is_absent")]
    pub runtime_settings_benchmark: Nullable<String>,
    #[serde(skip_serializing_if = "Nullable::is_absent")]
    pub runtime_settings_cpu_throttling: Nullable<String>,
    #[serde(skip_serializing_if = "Nullable::is_absent")]
    pub runtime_settings_device: Nullable<String>,
    #[serde(skip_serializing_if = "Nullable::is_absent")]
    pub runtime_settings_network_throttling: Nullable<String>,
    #[serde(skip_serializing_if = "Nullable::is_absent")]
    pub runtime_settings_channel: Nullable<String>,
    /// Supersedes `runtime_settings_ua`.
    #[serde(skip_serializing_if = "Nullable::is_absent")]
    pub runtime_settings_ua_network: Nullable<String>,
    #[serde(skip_serializing_if = "Nullable::is_absent")]
    pub runtime_unknown: Nullable<String>,
    #[serde(skip_serializing_if = "Nullable::is_absent")]
    pub dropdown_copy_json: Nullable<String>,
    #[serde(skip_serializing_if = "Nullable::is_absent")]
    pub dropdown_print_expanded: Nullable<String>,
    #[serde(skip_serializing_if = "Nullable::is_absent")]
    pub dropdown_print_summary: Nullable<String>,
    #[serde(skip_serializing_if = "Nullable::is_absent")]
    pub dropdown_save_html: Nullable<String>,
    #[serde(skip_serializing_if = "Nullable::is_absent")]
    pub dropdown_save_json: Nullable<String>,
    #[serde(skip_serializing_if = "Nullable::is_absent")]
    pub footer_issue: Nullable<String>,
    #[serde(skip_serializing_if = "Nullable::is_absent")]
    pub show_relevant_audits: Nullable<String>,
    #[serde(skip_serializing_if = "Nullable::is_absent")]
    pub calculator_link: Nullable<String>,

    /// Deprecated: superseded by `runtime_settings_ua_network`.
    #[serde(skip_serializing_if = "Nullable::is_absent")]
    pub runtime_settings_ua: Nullable<String>,
    /// Deprecated: the record's own `requested_url` is authoritative.
    #[serde(skip_serializing_if = "Nullable::is_absent")]
    pub runtime_settings_url: Nullable<String>,
    /// Deprecated: the record's own `fetch_time` is authoritative.
    #[serde(skip_serializing_if = "Nullable::is_absent")]
    pub runtime_settings_fetch_time: Nullable<String>,
}

impl RendererFormattedStrings {
    /// Label for the user agent row, preferring the superseding field.
    pub fn effective_ua_label(&self) -> Option<&str> {
        self.runtime_settings_ua_network
            .as_deref()
            .or(self.runtime_settings_ua.as_deref())
    }
}

/// One place a localized message was used.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IcuMessagePath {
    /// JSON path into the record (e.g. "audits.viewport.title").
    pub path: String,

    /// Substitution values used when formatting the message.
    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub values: Nullable<BTreeMap<String, LhrValue>>,
}

/// Localization tables.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct I18n {
    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub renderer_formatted_strings: Nullable<RendererFormattedStrings>,

    /// Message id → ordered list of paths where it was used.
    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub icu_message_paths: Nullable<BTreeMap<String, Vec<IcuMessagePath>>>,
}

impl I18n {
    pub fn record_message_path(&mut self, message_id: impl Into<String>, path: IcuMessagePath) {
        let message_id = message_id.into();
        match &mut self.icu_message_paths {
            Nullable::Value(paths) => paths.entry(message_id).or_default().push(path),
            Nullable::Absent | Nullable::Null => {
                self.icu_message_paths = Nullable::Value(BTreeMap::from([(message_id, vec![path])]));
            }
        }
    }

    /// Paths recorded for a message id, in order.
    pub fn message_paths(&self, message_id: &str) -> &[IcuMessagePath] {
        self.icu_message_paths
            .value()
            .and_then(|paths| paths.get(message_id))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Label for the user agent row, preferring the superseding field.
    pub fn effective_ua_label(&self) -> Option<&str> {
        self.renderer_formatted_strings
            .value()
            .and_then(|strings| strings.effective_ua_label())
    }
}
