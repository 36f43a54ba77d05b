//! Data Models
//!
//! This module contains the data structures of the performance monitor
//! data-access layer:
//!
//! - `RecordType`, `RecordEnvelope` - record identity and the read-path item shape
//! - `SchemaRegistry`, `SchemaValidator` - declared fields and their enforcement
//! - `Model` - the hydrated, mutable form of one record
//! - `Report`, `SiteChange`, `Page`, `Insight` - typed wrappers over `Model`
//!
//! Field names are public (unprefixed) everywhere in this module except in
//! `RecordEnvelope::meta`, which carries storage names.

pub mod core_schemas;
pub mod meta_keys;
pub mod model;
pub mod record;
pub mod schema;
pub mod time;
pub mod validation;

mod insight;
mod page;
mod report;
mod site_change;

#[cfg(test)]
mod model_test;

pub use insight::{Insight, Severity};
pub use model::{Model, TypedRecord};
pub use page::Page;
pub use record::{FieldMap, RecordEnvelope, RecordType};
pub use report::{Report, ReportStatus, Strategy};
pub use schema::{FieldRule, FieldType, RecordSchema, SchemaRegistry};
pub use site_change::SiteChange;
pub use validation::{FieldViolation, SchemaValidator, ValidationOutcome, ViolationReason};
