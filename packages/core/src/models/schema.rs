//! Record Schema Types
//!
//! Each record type declares the exact set of public fields it may carry and a
//! rule per field: JSON value type, whether it is required, and optionally the
//! closed list of string values it accepts.
//!
//! The registry is plain configuration. It is built once at startup, shared
//! behind an `Arc`, and never mutated afterwards. Tests substitute their own
//! registry instead of patching a global one.
//!
//! ## Example Schema Document
//!
//! ```json
//! {
//!   "report": {
//!     "description": "Site performance report",
//!     "fields": {
//!       "status": { "type": "string", "required": true, "enum": ["pending", "complete"] },
//!       "performance_score": { "type": "number" }
//!     }
//!   }
//! }
//! ```

use crate::models::{core_schemas, RecordType};
use crate::services::DataError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// JSON value type a field must hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    String,
    /// JSON number without a fractional part
    Integer,
    /// Any JSON number
    Number,
    Boolean,
    Array,
    Object,
}

impl FieldType {
    /// Whether `value` has this type
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::Integer => value.is_i64() || value.is_u64(),
            Self::Number => value.is_number(),
            Self::Boolean => value.is_boolean(),
            Self::Array => value.is_array(),
            Self::Object => value.is_object(),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Array => "array",
            Self::Object => "object",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Name of the JSON type of `value`, for error messages
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_f64() => "number",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Validation rule for one field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldRule {
    #[serde(rename = "type")]
    pub value_type: FieldType,

    #[serde(default)]
    pub required: bool,

    /// Closed set of accepted values (string fields only)
    #[serde(default, rename = "enum", skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl FieldRule {
    /// Optional field of the given type
    pub fn new(value_type: FieldType) -> Self {
        Self {
            value_type,
            required: false,
            enum_values: None,
            description: None,
        }
    }

    /// Mark the field as required
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Restrict the field to a closed set of values
    pub fn one_of<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.enum_values = Some(values.into_iter().map(Into::into).collect());
        self
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Whether `value` is a member of the declared enum (always true without one)
    pub fn allows(&self, value: &Value) -> bool {
        match (&self.enum_values, value.as_str()) {
            (None, _) => true,
            (Some(values), Some(s)) => values.iter().any(|v| v == s),
            (Some(_), None) => false,
        }
    }
}

/// Declared field set of one record type
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordSchema {
    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub fields: BTreeMap<String, FieldRule>,
}

impl RecordSchema {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            fields: BTreeMap::new(),
        }
    }

    /// Add a field rule (builder style)
    pub fn with_field(mut self, name: impl Into<String>, rule: FieldRule) -> Self {
        self.fields.insert(name.into(), rule);
        self
    }

    /// Get a field rule by name
    pub fn get_field(&self, name: &str) -> Option<&FieldRule> {
        self.fields.get(name)
    }

    /// Whether `name` is part of the declared field set
    pub fn declares(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Names of the required fields, sorted
    pub fn required_fields(&self) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|(_, rule)| rule.required)
            .map(|(name, _)| name.as_str())
            .collect()
    }

    /// Accepted values of an enum field, `None` if the field has no enum
    pub fn enum_values(&self, name: &str) -> Option<&[String]> {
        self.fields.get(name)?.enum_values.as_deref()
    }
}

/// Immutable record type → schema configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SchemaRegistry {
    schemas: BTreeMap<RecordType, RecordSchema>,
}

impl SchemaRegistry {
    /// Build a registry from explicit schemas
    ///
    /// # Errors
    ///
    /// Returns `DataError::Configuration` if a rule declares an enum on a
    /// non-string field.
    pub fn new<I>(schemas: I) -> Result<Self, DataError>
    where
        I: IntoIterator<Item = (RecordType, RecordSchema)>,
    {
        let registry = Self {
            schemas: schemas.into_iter().collect(),
        };
        registry.check()?;
        Ok(registry)
    }

    /// Registry holding the core schemas
    pub fn builtin() -> Self {
        Self {
            schemas: core_schemas::get_core_schemas().into_iter().collect(),
        }
    }

    /// Parse a registry from a JSON document keyed by record type
    pub fn from_json_str(json: &str) -> Result<Self, DataError> {
        let registry: Self = serde_json::from_str(json)
            .map_err(|e| DataError::configuration(format!("Invalid schema document: {}", e)))?;
        registry.check()?;
        Ok(registry)
    }

    /// Schema for `record_type`
    ///
    /// # Errors
    ///
    /// A type missing from the registry is a programming error and yields
    /// `DataError::Configuration`.
    pub fn fields_for(&self, record_type: RecordType) -> Result<&RecordSchema, DataError> {
        self.schemas.get(&record_type).ok_or_else(|| {
            DataError::configuration(format!("No schema registered for record type '{}'", record_type))
        })
    }

    /// Record types this registry knows about
    pub fn record_types(&self) -> impl Iterator<Item = RecordType> + '_ {
        self.schemas.keys().copied()
    }

    fn check(&self) -> Result<(), DataError> {
        for (record_type, schema) in &self.schemas {
            for (name, rule) in &schema.fields {
                if rule.enum_values.is_some() && rule.value_type != FieldType::String {
                    return Err(DataError::configuration(format!(
                        "Field '{}' of '{}' declares an enum but has type {}",
                        name, record_type, rule.value_type
                    )));
                }
            }
        }
        Ok(())
    }
}
