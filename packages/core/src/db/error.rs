//! Content Store Error Types
//!
//! Errors a `ContentStore` implementation reports back to the data-access
//! layer, which wraps them into `DataError::Persistence`.

use thiserror::Error;

/// Content store operation errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The store refused the write
    #[error("Write rejected: {message}")]
    Rejected { message: String },

    /// The targeted record does not exist
    #[error("Record not found in store: {id}")]
    NotFound { id: String },

    /// The store could not be reached
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    /// Create a rejected-write error
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected {
            message: message.into(),
        }
    }

    /// Create a not found error
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound { id: id.into() }
    }

    /// Create an unavailable error
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }
}
