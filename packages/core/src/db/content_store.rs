//! ContentStore Trait - Write-Side Storage Port
//!
//! The data-access layer persists records through this trait and nothing
//! else. Reads never go through it: a record is always read back through the
//! request gateway so that only publicly visible fields come back.
//!
//! # Design Decisions
//!
//! 1. **Async-First**: implementations may block on disk or network
//! 2. **Opaque ids**: the store assigns the id and creation time
//! 3. **Full replace**: `update` receives the complete field map; keys absent
//!    from it are removed from storage
//! 4. **No transactions**: each call stands alone
//!
//! # Examples
//!
//! ```rust
//! use perfmon_core::db::{ContentStore, MemoryStore, StoreAttributes};
//! use perfmon_core::models::{FieldMap, RecordType};
//! use serde_json::json;
//!
//! # tokio_test::block_on(async {
//! let store = MemoryStore::new();
//! let mut fields = FieldMap::new();
//! fields.insert("_perfmon_url".to_string(), json!("https://example.com/"));
//!
//! let id = store
//!     .create(RecordType::Page, fields, StoreAttributes::new().with_slug("monitored-page"))
//!     .await?;
//! assert!(store.delete(&id).await?.existed);
//! # Ok::<(), perfmon_core::db::StoreError>(())
//! # });
//! ```

use crate::db::StoreError;
use crate::models::{FieldMap, RecordType};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Storage attributes that travel alongside the field map
///
/// `None` means "leave as is" on update.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoreAttributes {
    pub parent_id: Option<String>,
    pub slug: Option<String>,
    pub modified_at: Option<DateTime<Utc>>,
    /// Type-specific attributes (e.g. a page's canonical URL)
    pub extra: BTreeMap<String, Value>,
}

impl StoreAttributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_parent_id(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }

    pub fn with_slug(mut self, slug: impl Into<String>) -> Self {
        self.slug = Some(slug.into());
        self
    }

    pub fn with_modified_at(mut self, modified_at: DateTime<Utc>) -> Self {
        self.modified_at = Some(modified_at);
        self
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }
}

/// Result of a delete operation
///
/// Deleting an id the store does not know is reported through `existed`
/// rather than as an error.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeleteResult {
    /// Whether the record existed before deletion
    pub existed: bool,
}

impl DeleteResult {
    /// The record existed and was deleted
    pub fn existed() -> Self {
        Self { existed: true }
    }

    /// The record did not exist
    pub fn not_found() -> Self {
        Self { existed: false }
    }
}

/// Write-side persistence for records
///
/// Field maps passed in are already storage-prefixed.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`; the data context shares one store
/// behind an `Arc` across every model, factory and query.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Create a record and return its new id
    ///
    /// # Errors
    ///
    /// Any `StoreError`; nothing may be persisted when an error is returned.
    async fn create(
        &self,
        record_type: RecordType,
        fields: FieldMap,
        attributes: StoreAttributes,
    ) -> Result<String, StoreError>;

    /// Replace the stored field map of `id` with `fields`
    ///
    /// # Errors
    ///
    /// `StoreError::NotFound` if `id` does not exist, or any other rejection.
    async fn update(
        &self,
        id: &str,
        fields: FieldMap,
        attributes: StoreAttributes,
    ) -> Result<(), StoreError>;

    /// Permanently remove `id`
    async fn delete(&self, id: &str) -> Result<DeleteResult, StoreError>;
}
