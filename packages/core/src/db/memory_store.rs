//! In-Memory Content Store
//!
//! A complete `ContentStore` + `RecordSource` backend held in process memory.
//! Used by the dev binary and the test suites, and as the reference for what
//! a storage adapter has to do:
//!
//! - assign UUID ids and creation timestamps
//! - keep slugs unique per record type (`monitored-page`, `monitored-page-2`, ...)
//! - replace our namespaced fields wholesale on update while leaving keys
//!   written by other components alone
//! - reject updates of unknown ids

use crate::db::{ContentStore, DeleteResult, RecordSource, StoreAttributes, StoreError, StoredRecord};
use crate::models::meta_keys;
use crate::models::time::{SystemTimeProvider, TimeProvider};
use crate::models::{FieldMap, RecordType};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use uuid::Uuid;

/// Process-local record storage
pub struct MemoryStore {
    records: RwLock<BTreeMap<String, StoredRecord>>,
    clock: Arc<dyn TimeProvider>,
}

impl MemoryStore {
    /// Empty store on the system clock
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemTimeProvider))
    }

    /// Empty store that timestamps records with `clock`
    pub fn with_clock(clock: Arc<dyn TimeProvider>) -> Self {
        Self {
            records: RwLock::new(BTreeMap::new()),
            clock,
        }
    }

    /// Number of stored records
    pub fn len(&self) -> usize {
        self.read().map(|records| records.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Write a key directly into a record's stored meta
    ///
    /// Stands in for other components sharing the store (their keys are
    /// unprefixed) or for stale data written under our prefix.
    pub fn put_raw_meta(&self, id: &str, key: impl Into<String>, value: Value) -> Result<(), StoreError> {
        let mut records = self.write()?;
        let record = records
            .get_mut(id)
            .ok_or_else(|| StoreError::not_found(id))?;
        record.meta.insert(key.into(), value);
        Ok(())
    }

    /// Snapshot of one stored record, including foreign keys
    pub fn raw(&self, id: &str) -> Option<StoredRecord> {
        self.read().ok()?.get(id).cloned()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, BTreeMap<String, StoredRecord>>, StoreError> {
        self.records
            .read()
            .map_err(|_| StoreError::unavailable("memory store lock poisoned"))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, BTreeMap<String, StoredRecord>>, StoreError> {
        self.records
            .write()
            .map_err(|_| StoreError::unavailable("memory store lock poisoned"))
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

/// `base`, or `base-N` with the smallest N >= 2 not taken by another record
fn unique_slug(
    records: &BTreeMap<String, StoredRecord>,
    record_type: RecordType,
    base: &str,
    own_id: Option<&str>,
) -> String {
    let taken = |candidate: &str| {
        records.values().any(|r| {
            r.record_type == record_type && r.slug == candidate && Some(r.id.as_str()) != own_id
        })
    };

    if !taken(base) {
        return base.to_string();
    }
    (2..)
        .map(|n| format!("{}-{}", base, n))
        .find(|candidate| !taken(candidate.as_str()))
        .unwrap_or_else(|| base.to_string())
}

#[async_trait]
impl ContentStore for MemoryStore {
    async fn create(
        &self,
        record_type: RecordType,
        fields: FieldMap,
        attributes: StoreAttributes,
    ) -> Result<String, StoreError> {
        let now = self.clock.now();
        let id = Uuid::new_v4().to_string();
        let mut records = self.write()?;

        let base = attributes
            .slug
            .unwrap_or_else(|| record_type.as_str().to_string());
        let slug = unique_slug(&records, record_type, &base, None);

        records.insert(
            id.clone(),
            StoredRecord {
                id: id.clone(),
                record_type,
                slug,
                parent_id: attributes.parent_id,
                created_at: now,
                modified_at: attributes.modified_at.unwrap_or(now),
                meta: fields,
                attributes: attributes.extra,
            },
        );

        tracing::debug!(%id, %record_type, "memory store created record");
        Ok(id)
    }

    async fn update(
        &self,
        id: &str,
        fields: FieldMap,
        attributes: StoreAttributes,
    ) -> Result<(), StoreError> {
        let now = self.clock.now();
        let mut records = self.write()?;

        let (record_type, own_id) = match records.get(id) {
            Some(record) => (record.record_type, record.id.clone()),
            None => return Err(StoreError::not_found(id)),
        };
        let slug = attributes
            .slug
            .as_deref()
            .map(|base| unique_slug(&records, record_type, base, Some(own_id.as_str())));

        let record = records
            .get_mut(id)
            .ok_or_else(|| StoreError::not_found(id))?;

        record
            .meta
            .retain(|key, _| meta_keys::public_key(key).is_none());
        record.meta.extend(fields);

        if let Some(slug) = slug {
            record.slug = slug;
        }
        if let Some(parent_id) = attributes.parent_id {
            record.parent_id = Some(parent_id);
        }
        record.modified_at = attributes.modified_at.unwrap_or(now);
        record.attributes.extend(attributes.extra);

        tracing::debug!(%id, "memory store updated record");
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<DeleteResult, StoreError> {
        let removed = self.write()?.remove(id);
        tracing::debug!(%id, existed = removed.is_some(), "memory store delete");

        Ok(match removed {
            Some(_) => DeleteResult::existed(),
            None => DeleteResult::not_found(),
        })
    }
}

#[async_trait]
impl RecordSource for MemoryStore {
    async fn fetch(&self, id: &str) -> Result<Option<StoredRecord>, StoreError> {
        Ok(self.read()?.get(id).cloned())
    }

    async fn scan(&self, record_type: RecordType) -> Result<Vec<StoredRecord>, StoreError> {
        Ok(self
            .read()?
            .values()
            .filter(|r| r.record_type == record_type)
            .cloned()
            .collect())
    }
}
