//! Core Schema Definitions
//!
//! The canonical field sets for the four record types shipped with the
//! performance monitor.
//!
//! ## Core Schemas
//!
//! - **report** - One performance run over the site (scores, status)
//! - **site_change** - Plugin/theme/core changes that may explain a regression
//! - **page** - A monitored URL inside a report
//! - **insight** - A finding about a page or report
//!
//! ## Usage
//!
//! Call `SchemaRegistry::builtin()` to get the registry, or `get_core_schemas()`
//! to start from these and substitute individual entries.

use crate::models::schema::{FieldRule, FieldType, RecordSchema};
use crate::models::RecordType;

/// Get all core schema definitions
pub fn get_core_schemas() -> Vec<(RecordType, RecordSchema)> {
    vec![
        (RecordType::Report, report_schema()),
        (RecordType::SiteChange, site_change_schema()),
        (RecordType::Page, page_schema()),
        (RecordType::Insight, insight_schema()),
    ]
}

fn report_schema() -> RecordSchema {
    RecordSchema::new("Site performance report")
        .with_field(
            "status",
            FieldRule::new(FieldType::String)
                .required()
                .one_of(["pending", "running", "complete", "failed"])
                .describe("Report lifecycle status"),
        )
        .with_field(
            "strategy",
            FieldRule::new(FieldType::String)
                .one_of(["mobile", "desktop"])
                .describe("Device profile used for the run"),
        )
        .with_field("performance_score", FieldRule::new(FieldType::Number))
        .with_field("accessibility_score", FieldRule::new(FieldType::Number))
        .with_field("best_practices_score", FieldRule::new(FieldType::Number))
        .with_field("seo_score", FieldRule::new(FieldType::Number))
        .with_field(
            "page_count",
            FieldRule::new(FieldType::Integer).describe("Number of pages measured"),
        )
        .with_field("summary", FieldRule::new(FieldType::String))
}

fn site_change_schema() -> RecordSchema {
    RecordSchema::new("Logged change to the site")
        .with_field(
            "object_type",
            FieldRule::new(FieldType::String).one_of(["plugin", "theme", "core", "option", "other"]),
        )
        .with_field(
            "action",
            FieldRule::new(FieldType::String).one_of([
                "install",
                "activate",
                "deactivate",
                "update",
                "delete",
                "switch",
            ]),
        )
        .with_field(
            "object_name",
            FieldRule::new(FieldType::String).describe("Plugin, theme or option name"),
        )
        .with_field("previous_version", FieldRule::new(FieldType::String))
        .with_field("new_version", FieldRule::new(FieldType::String))
        .with_field(
            "user_id",
            FieldRule::new(FieldType::Integer).describe("User who made the change"),
        )
}

fn page_schema() -> RecordSchema {
    RecordSchema::new("Monitored page")
        .with_field("url", FieldRule::new(FieldType::String).required())
        .with_field("title", FieldRule::new(FieldType::String))
        .with_field("is_homepage", FieldRule::new(FieldType::Boolean))
        .with_field("http_status", FieldRule::new(FieldType::Integer))
        .with_field("performance_score", FieldRule::new(FieldType::Number))
        .with_field(
            "largest_contentful_paint",
            FieldRule::new(FieldType::Number).describe("LCP in milliseconds"),
        )
        .with_field("cumulative_layout_shift", FieldRule::new(FieldType::Number))
        .with_field(
            "total_blocking_time",
            FieldRule::new(FieldType::Number).describe("TBT in milliseconds"),
        )
}

fn insight_schema() -> RecordSchema {
    RecordSchema::new("Performance insight")
        .with_field(
            "type",
            FieldRule::new(FieldType::String).describe("Insight category, e.g. security"),
        )
        .with_field(
            "severity",
            FieldRule::new(FieldType::String).one_of(["info", "notice", "warning", "critical"]),
        )
        .with_field("title", FieldRule::new(FieldType::String))
        .with_field("description", FieldRule::new(FieldType::String))
        .with_field("recommendation", FieldRule::new(FieldType::String))
        .with_field("metric", FieldRule::new(FieldType::String))
        .with_field("metric_value", FieldRule::new(FieldType::Number))
        .with_field("dismissed", FieldRule::new(FieldType::Boolean))
}
