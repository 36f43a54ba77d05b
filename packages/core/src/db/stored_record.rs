//! Stored Record Read Side
//!
//! What the public read API sees of the underlying storage. The data-access
//! layer never uses this directly; it goes through the request gateway.

use crate::db::StoreError;
use crate::models::{FieldMap, RecordType};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::BTreeMap;

/// One record as held by the storage backend
#[derive(Debug, Clone, PartialEq)]
pub struct StoredRecord {
    pub id: String,
    pub record_type: RecordType,
    pub slug: String,
    pub parent_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
    /// Every stored key/value, ours (prefixed) and foreign
    pub meta: FieldMap,
    pub attributes: BTreeMap<String, Value>,
}

/// Storage read access used by the public API handlers
#[async_trait]
pub trait RecordSource: Send + Sync {
    /// Record by id, of any type
    async fn fetch(&self, id: &str) -> Result<Option<StoredRecord>, StoreError>;

    /// Every record of `record_type`, in no particular order
    async fn scan(&self, record_type: RecordType) -> Result<Vec<StoredRecord>, StoreError>;
}
