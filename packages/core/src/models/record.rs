//! Record Identity Types
//!
//! A performance record is one of four fixed types and carries its data as a
//! flat map of public field names to JSON values. The same envelope shape is
//! produced by the public read API and decoded by the data-access layer, so
//! both sides agree on what a record looks like on the request path.
//!
//! # Examples
//!
//! ```rust
//! use perfmon_core::models::RecordType;
//!
//! let record_type: RecordType = "site_change".parse()?;
//! assert_eq!(record_type, RecordType::SiteChange);
//! assert_eq!(record_type.as_str(), "site_change");
//! # Ok::<(), perfmon_core::services::DataError>(())
//! ```

use crate::services::DataError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Public field name → value map of one record
pub type FieldMap = serde_json::Map<String, serde_json::Value>;

/// The fixed set of record types managed by the data-access layer
///
/// A record's type is assigned at creation and never changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordType {
    /// A full performance report for the site
    Report,
    /// A logged change to the site (plugin activation, theme switch, ...)
    SiteChange,
    /// A monitored page belonging to a report
    Page,
    /// A finding attached to a page or report
    Insight,
}

impl RecordType {
    /// Every record type, in declaration order
    pub const ALL: [RecordType; 4] = [
        RecordType::Report,
        RecordType::SiteChange,
        RecordType::Page,
        RecordType::Insight,
    ];

    /// Wire name, also used as the API resource segment
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Report => "report",
            Self::SiteChange => "site_change",
            Self::Page => "page",
            Self::Insight => "insight",
        }
    }
}

impl FromStr for RecordType {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "report" => Ok(Self::Report),
            "site_change" => Ok(Self::SiteChange),
            "page" => Ok(Self::Page),
            "insight" => Ok(Self::Insight),
            other => Err(DataError::configuration(format!(
                "Unknown record type: {}",
                other
            ))),
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One record as it travels over the request path
///
/// `meta` holds storage-prefixed keys. Every member is optional on decode so a
/// response without an `id` (an error body, for instance) still decodes and can
/// be recognised as "no such record".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordEnvelope {
    #[serde(default)]
    pub id: Option<String>,

    #[serde(default, rename = "type")]
    pub record_type: Option<String>,

    #[serde(default)]
    pub slug: Option<String>,

    /// Parent record id (reference only, never ownership)
    #[serde(default)]
    pub parent: Option<String>,

    #[serde(default)]
    pub date_gmt: Option<DateTime<Utc>>,

    #[serde(default)]
    pub modified_gmt: Option<DateTime<Utc>>,

    #[serde(default)]
    pub meta: FieldMap,
}

impl RecordEnvelope {
    /// The record id, if present and non-empty
    pub fn identifier(&self) -> Option<&str> {
        self.id.as_deref().filter(|id| !id.is_empty())
    }

    /// The parent id, if present and non-empty
    pub fn parent_identifier(&self) -> Option<&str> {
        self.parent.as_deref().filter(|id| !id.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_record_type_round_trips_through_wire_name() {
        for record_type in RecordType::ALL {
            let parsed: RecordType = record_type.as_str().parse().unwrap();
            assert_eq!(parsed, record_type);
        }
    }

    #[test]
    fn test_unknown_record_type_is_configuration_error() {
        let result = "dashboard_widget".parse::<RecordType>();
        assert!(matches!(result, Err(DataError::Configuration(_))));
    }

    #[test]
    fn test_record_type_serde_uses_snake_case() {
        assert_eq!(
            serde_json::to_value(RecordType::SiteChange).unwrap(),
            json!("site_change")
        );
    }

    #[test]
    fn test_envelope_decodes_error_body_without_identifier() {
        let body = json!({
            "code": "not_found",
            "message": "No report with id abc",
            "data": {"status": 404}
        });

        let envelope: RecordEnvelope = serde_json::from_value(body).unwrap();
        assert!(envelope.identifier().is_none());
        assert!(envelope.meta.is_empty());
    }

    #[test]
    fn test_envelope_treats_empty_identifiers_as_absent() {
        let envelope: RecordEnvelope =
            serde_json::from_value(json!({"id": "", "parent": ""})).unwrap();
        assert!(envelope.identifier().is_none());
        assert!(envelope.parent_identifier().is_none());
    }
}
