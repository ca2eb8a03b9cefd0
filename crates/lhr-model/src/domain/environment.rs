//! Run environment and the configuration the run used.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::value::{present, LhrValue, Nullable, NullableF64};
use super::wire_enum::wire_enum;

wire_enum! {
    /// Device class the page was emulated as.
    pub enum FormFactor {
        fallback UnknownFormFactor = 0 => "UNKNOWN_FORM_FACTOR";
        Mobile = 1 => "MOBILE" | "mobile",
        Desktop = 2 => "DESKTOP" | "desktop",
    }
}

wire_enum! {
    /// Deprecated predecessor of [`FormFactor`]. Still written and read, but
    /// [`ConfigSettings::form_factor`] is the source of truth when set.
    pub enum EmulatedFormFactor {
        fallback UnknownFormFactor = 0 => "UNKNOWN_FORM_FACTOR";
        Mobile = 1 => "mobile" | "MOBILE",
        Desktop = 2 => "desktop" | "DESKTOP",
        /// No emulation was applied.
        None = 3 => "none" | "NONE",
    }
}

impl EmulatedFormFactor {
    /// The superseding form factor this legacy value maps onto, if any.
    pub fn to_form_factor(self) -> Option<FormFactor> {
        match self {
            EmulatedFormFactor::Mobile => Some(FormFactor::Mobile),
            EmulatedFormFactor::Desktop => Some(FormFactor::Desktop),
            EmulatedFormFactor::None | EmulatedFormFactor::UnknownFormFactor => None,
        }
    }
}

/// Host and network environment of the run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Environment {
    /// User agent string sent on network requests.
    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub network_user_agent: Nullable<String>,

    /// User agent of the browser that ran the audits.
    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub host_user_agent: Nullable<String>,

    /// Rough host CPU benchmark.
    #[serde(default, skip_serializing_if = "NullableF64::is_absent")]
    pub benchmark_index: NullableF64,

    /// Credits for bundled third-party tooling, name → version.
    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub credits: Nullable<BTreeMap<String, String>>,
}

/// Settings the run was configured with.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigSettings {
    /// Deprecated: superseded by `form_factor`.
    #[serde(default, skip_serializing_if = "EmulatedFormFactor::is_fallback")]
    pub emulated_form_factor: EmulatedFormFactor,

    #[serde(default, skip_serializing_if = "FormFactor::is_fallback")]
    pub form_factor: FormFactor,

    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub locale: Nullable<String>,

    /// Either null (all categories) or a list of category ids.
    #[serde(
        default,
        deserialize_with = "present::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub only_categories: Option<LhrValue>,

    /// Which client produced the run (e.g. "cli", "devtools").
    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub channel: Nullable<String>,
}

impl ConfigSettings {
    /// The category ids the run was restricted to; `None` means every
    /// category was requested.
    pub fn only_category_ids(&self) -> Option<Vec<&str>> {
        self.only_categories
            .as_ref()
            .and_then(LhrValue::as_string_list)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_emulated_form_factor_encodes_legacy_lowercase() {
        let json = serde_json::to_string(&EmulatedFormFactor::Mobile).expect("serialize");
        assert_eq!(json, "\"mobile\"");
        let decoded: EmulatedFormFactor = serde_json::from_str("\"MOBILE\"").expect("decode");
        assert_eq!(decoded, EmulatedFormFactor::Mobile);
    }

    #[test]
    fn test_emulated_form_factor_maps_to_form_factor() {
        assert_eq!(
            EmulatedFormFactor::Desktop.to_form_factor(),
            Some(FormFactor::Desktop)
        );
        assert_eq!(EmulatedFormFactor::None.to_form_factor(), None);
    }

    #[test]
    fn test_only_categories_null_vs_list_vs_absent() {
        let null: ConfigSettings =
            serde_json::from_value(json!({ "only_categories": null })).expect("null");
        assert_eq!(null.only_categories, Some(LhrValue::Null));
        assert_eq!(null.only_category_ids(), None);

        let list: ConfigSettings =
            serde_json::from_value(json!({ "only_categories": ["performance"] })).expect("list");
        assert_eq!(list.only_category_ids(), Some(vec!["performance"]));

        let absent: ConfigSettings = serde_json::from_value(json!({})).expect("absent");
        assert_eq!(absent.only_categories, None);
        assert_eq!(absent.form_factor, FormFactor::UnknownFormFactor);
    }

    #[test]
    fn test_empty_settings_stay_empty() {
        let settings: ConfigSettings = serde_json::from_value(json!({})).expect("decode");
        assert_eq!(serde_json::to_value(&settings).expect("serialize"), json!({}));

        let env: Environment =
            serde_json::from_value(json!({ "host_user_agent": "" })).expect("decode");
        assert_eq!(env.host_user_agent, Nullable::Value(String::new()));
        assert_eq!(
            serde_json::to_value(&env).expect("serialize"),
            json!({ "host_user_agent": "" })
        );
    }

    #[test]
    fn test_unset_emulated_form_factor_not_written() {
        let settings = ConfigSettings {
            form_factor: FormFactor::Desktop,
            ..ConfigSettings::default()
        };
        let value = serde_json::to_value(&settings).expect("serialize");
        assert!(value.get("emulated_form_factor").is_none());
        assert_eq!(value["form_factor"], json!("DESKTOP"));
    }
}
