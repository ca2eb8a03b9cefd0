//! Record schema for audit report results.
//!
//! Canonical definitions for the entities of one run:
//! - `Lhr`: the root record
//! - `AuditResult`: outcome of a single audit
//! - `LhrCategory` / `AuditRef` / `CategoryGroup`: weighted score groupings
//! - `Environment`, `ConfigSettings`, `Timing`, `I18n`, `StackPack`, `LhrEntity`:
//!   descriptive metadata
//! - `Nullable` / `NullableF64` / `LhrValue`: the presence conventions used
//!   throughout

pub mod audit;
pub mod category;
pub mod digest;
pub mod entity;
pub mod environment;
pub mod error;
pub mod i18n;
pub mod report;
pub mod timing;
pub mod validation;
pub mod value;
pub(crate) mod wire_enum;

pub use audit::{AuditResult, MetricSavings, ScoreDisplayMode, ScoringOptions};
pub use category::{AuditRef, CategoryGroup, GatherMode, LhrCategory};
pub use entity::{LhrEntity, StackPack};
pub use environment::{ConfigSettings, EmulatedFormFactor, Environment, FormFactor};
pub use error::{DecodeError, LhrModelError, Result};
pub use i18n::{I18n, IcuMessagePath, RendererFormattedStrings};
pub use report::{Lhr, ScoreReading};
pub use timing::{PerformanceEntry, Timing};
pub use validation::{check_required_fields, validate_structure, StructuralDefect, StructureReport};
pub use value::{LhrValue, Nullable, NullableF64};
