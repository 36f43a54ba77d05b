//! Data-Access Error Types
//!
//! The public error taxonomy of the data-access layer. Every failure is
//! returned to the caller; the only operation that tolerates bad input
//! without an error is `Model::set_fields`.

use crate::db::StoreError;
use crate::gateway::GatewayError;
use crate::models::{FieldViolation, RecordType};
use thiserror::Error;

/// Data-access operation errors
#[derive(Error, Debug)]
pub enum DataError {
    /// Candidate fields broke the record type's schema
    #[error("Validation failed for {record_type} record: {}", format_violations(.violations))]
    Validation {
        record_type: RecordType,
        violations: Vec<FieldViolation>,
    },

    /// The read path has no record with this id
    #[error("{record_type} record not found: {id}")]
    NotFound { record_type: RecordType, id: String },

    /// The content store rejected a create, update or delete
    #[error("Persistence failed: {message}")]
    Persistence {
        message: String,
        #[source]
        source: Option<StoreError>,
    },

    /// The model's record was deleted; it cannot be saved or navigated
    #[error("{record_type} record has been deleted")]
    Deleted { record_type: RecordType },

    /// Unknown record type or invalid configuration (programming error)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A record was read back or wrapped as a different type
    #[error("Record type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: RecordType, found: String },

    /// The parent handed to a factory has no identity
    #[error("Invalid parent record: {0}")]
    InvalidParent(String),

    /// The request path answered with an error other than "not found"
    #[error("Request failed with status {status} ({code}): {message}")]
    Request {
        status: u16,
        code: String,
        message: String,
    },

    /// The request gateway could not complete or decode a call
    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),
}

fn format_violations(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl DataError {
    /// Create a validation error
    pub fn validation(record_type: RecordType, violations: Vec<FieldViolation>) -> Self {
        Self::Validation {
            record_type,
            violations,
        }
    }

    /// Create a not found error
    pub fn not_found(record_type: RecordType, id: impl Into<String>) -> Self {
        Self::NotFound {
            record_type,
            id: id.into(),
        }
    }

    /// Create a persistence error without an underlying store error
    pub fn persistence(message: impl Into<String>) -> Self {
        Self::Persistence {
            message: message.into(),
            source: None,
        }
    }

    /// Wrap a store error, keeping its message
    pub fn from_store(context: &str, source: StoreError) -> Self {
        Self::Persistence {
            message: format!("{}: {}", context, source),
            source: Some(source),
        }
    }

    /// Create a deleted-record error
    pub fn deleted(record_type: RecordType) -> Self {
        Self::Deleted { record_type }
    }

    /// Create a configuration error
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Create a type mismatch error
    pub fn type_mismatch(expected: RecordType, found: impl Into<String>) -> Self {
        Self::TypeMismatch {
            expected,
            found: found.into(),
        }
    }

    /// Create an invalid parent error
    pub fn invalid_parent(msg: impl Into<String>) -> Self {
        Self::InvalidParent(msg.into())
    }

    /// Create a request error
    pub fn request(status: u16, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Request {
            status,
            code: code.into(),
            message: message.into(),
        }
    }

    /// Whether this is a "record does not exist" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Field violations carried by a validation error
    pub fn violations(&self) -> &[FieldViolation] {
        match self {
            Self::Validation { violations, .. } => violations,
            _ => &[],
        }
    }
}
