//! Origins observed during the run and stack-specific advice packs.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::value::Nullable;

/// A first- or third-party product that network activity was attributed to.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LhrEntity {
    pub name: String,

    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub homepage: Nullable<String>,

    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub category: Nullable<String>,

    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub is_first_party: Nullable<bool>,

    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub is_unrecognized: Nullable<bool>,

    /// Ordered list of origins (scheme + host + port).
    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub origins: Nullable<Vec<String>>,
}

impl LhrEntity {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn first_party(mut self) -> Self {
        self.is_first_party = Nullable::Value(true);
        self
    }

    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origins.push(origin.into());
        self
    }

    /// Whether the entity hosts the given origin.
    pub fn owns_origin(&self, origin: &str) -> bool {
        self.origins.items().iter().any(|o| o == origin)
    }
}

/// Advice specific to a detected technology stack.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StackPack {
    pub id: String,

    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub title: Nullable<String>,

    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub icon_data_url: Nullable<String>,

    /// Audit id → stack-specific description.
    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub descriptions: Nullable<BTreeMap<String, String>>,
}
