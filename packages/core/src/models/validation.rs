//! Schema Validation
//!
//! Checks a candidate field map against the registry entry for its record
//! type. Validation is pure: no I/O, deterministic output ordering (schema
//! fields in name order, then unknown fields in name order).
//!
//! Unknown fields are reported, never ignored. Accepting them on write would
//! let a record hold data the read path can never return.

use crate::models::schema::json_type_name;
use crate::models::{FieldMap, FieldType, RecordType, SchemaRegistry};
use crate::services::DataError;
use std::fmt;
use std::sync::Arc;

/// Why a single field failed validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViolationReason {
    /// Required field absent or null
    Missing,
    /// Value has the wrong JSON type
    WrongType {
        expected: FieldType,
        found: &'static str,
    },
    /// Value is not one of the declared enum values
    NotInEnum { value: String, allowed: Vec<String> },
    /// Field is not declared for the record type
    UnknownField,
}

impl fmt::Display for ViolationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing => f.write_str("missing required field"),
            Self::WrongType { expected, found } => {
                write!(f, "expected {}, found {}", expected, found)
            }
            Self::NotInEnum { value, allowed } => {
                write!(f, "'{}' is not one of: {}", value, allowed.join(", "))
            }
            Self::UnknownField => f.write_str("unknown field"),
        }
    }
}

/// One failed field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldViolation {
    pub field: String,
    pub reason: ViolationReason,
}

impl FieldViolation {
    pub fn new(field: impl Into<String>, reason: ViolationReason) -> Self {
        Self {
            field: field.into(),
            reason,
        }
    }
}

impl fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.reason)
    }
}

/// Result of validating one candidate field map
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationOutcome {
    Valid,
    Invalid(Vec<FieldViolation>),
}

impl ValidationOutcome {
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }

    /// Violations found (empty when valid)
    pub fn violations(&self) -> &[FieldViolation] {
        match self {
            Self::Valid => &[],
            Self::Invalid(violations) => violations,
        }
    }

    /// Convert into a `DataError::Validation` carrying every violation
    pub fn into_result(self, record_type: RecordType) -> Result<(), DataError> {
        match self {
            Self::Valid => Ok(()),
            Self::Invalid(violations) => Err(DataError::validation(record_type, violations)),
        }
    }
}

/// Validates field maps against a shared `SchemaRegistry`
#[derive(Debug, Clone)]
pub struct SchemaValidator {
    registry: Arc<SchemaRegistry>,
}

impl SchemaValidator {
    pub fn new(registry: Arc<SchemaRegistry>) -> Self {
        Self { registry }
    }

    /// Validate `fields` as the complete field map of a `record_type` record
    ///
    /// # Errors
    ///
    /// Only `DataError::Configuration`, when the registry has no entry for
    /// `record_type`. Field problems are returned as `ValidationOutcome::Invalid`.
    pub fn validate(
        &self,
        record_type: RecordType,
        fields: &FieldMap,
    ) -> Result<ValidationOutcome, DataError> {
        let schema = self.registry.fields_for(record_type)?;
        let mut violations = Vec::new();

        for (name, rule) in &schema.fields {
            let value = match fields.get(name) {
                Some(value) if !value.is_null() => value,
                _ => {
                    if rule.required {
                        violations.push(FieldViolation::new(name, ViolationReason::Missing));
                    }
                    continue;
                }
            };

            if !rule.value_type.matches(value) {
                violations.push(FieldViolation::new(
                    name,
                    ViolationReason::WrongType {
                        expected: rule.value_type,
                        found: json_type_name(value),
                    },
                ));
                continue;
            }

            if !rule.allows(value) {
                violations.push(FieldViolation::new(
                    name,
                    ViolationReason::NotInEnum {
                        value: value.as_str().unwrap_or_default().to_string(),
                        allowed: rule.enum_values.clone().unwrap_or_default(),
                    },
                ));
            }
        }

        let mut unknown: Vec<&String> = fields.keys().filter(|k| !schema.declares(k)).collect();
        unknown.sort();
        violations.extend(
            unknown
                .into_iter()
                .map(|name| FieldViolation::new(name.as_str(), ViolationReason::UnknownField)),
        );

        if violations.is_empty() {
            Ok(ValidationOutcome::Valid)
        } else {
            Ok(ValidationOutcome::Invalid(violations))
        }
    }

    /// Validate and fold any violation into `DataError::Validation`
    pub fn check(&self, record_type: RecordType, fields: &FieldMap) -> Result<(), DataError> {
        self.validate(record_type, fields)?.into_result(record_type)
    }
}
