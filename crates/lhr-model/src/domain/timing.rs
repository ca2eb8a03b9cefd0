//! Timing of the run itself.

use serde::{Deserialize, Serialize};

use super::value::{Nullable, NullableF64};

/// One measured span of the run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PerformanceEntry {
    pub name: String,

    /// Milliseconds since the run started.
    #[serde(default, skip_serializing_if = "NullableF64::is_absent")]
    pub start_time: NullableF64,

    #[serde(default, skip_serializing_if = "NullableF64::is_absent")]
    pub duration: NullableF64,

    /// "mark" or "measure".
    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub entry_type: Nullable<String>,
}

/// Run timing: ordered entries plus the total wall time in milliseconds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Timing {
    /// Order is meaningful; may be empty.
    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub entries: Nullable<Vec<PerformanceEntry>>,

    #[serde(default, skip_serializing_if = "NullableF64::is_absent")]
    pub total: NullableF64,
}

impl Timing {
    /// Timing with an empty entry list and the given total.
    pub fn new(total: f64) -> Self {
        Self {
            entries: Nullable::Value(Vec::new()),
            total: NullableF64::new(total),
        }
    }

    pub fn with_entry(mut self, entry: PerformanceEntry) -> Self {
        self.entries.push(entry);
        self
    }

    /// First entry with the given name.
    pub fn entry(&self, name: &str) -> Option<&PerformanceEntry> {
        self.entries.items().iter().find(|e| e.name == name)
    }
}

impl PerformanceEntry {
    /// A measured span.
    pub fn measure(name: impl Into<String>, start_time: f64, duration: f64) -> Self {
        Self {
            name: name.into(),
            start_time: NullableF64::new(start_time),
            duration: NullableF64::new(duration),
            entry_type: Nullable::Value("measure".into()),
        }
    }
}
