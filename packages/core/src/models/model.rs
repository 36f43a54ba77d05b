//! Record Model
//!
//! The hydrated, in-memory form of one record. A `Model` is only ever built
//! from what the read API returned for its record, never from storage
//! directly, so it cannot hold a field an external reader could not see.
//!
//! # Lifecycle
//!
//! - created by a `RecordFactory` or loaded with `Model::load`
//! - mutated in memory with `set`/`set_fields`/`unset`
//! - persisted with `save`, which writes the complete field map
//! - removed with `delete`, after which the model is dead
//!
//! # Examples
//!
//! ```rust
//! use perfmon_core::models::{Model, RecordType, TypedRecord};
//! use perfmon_core::services::{DataContext, PageFactory};
//! use serde_json::json;
//!
//! # tokio_test::block_on(async {
//! let (ctx, _store) = DataContext::in_memory()?;
//! let fields = serde_json::from_value(json!({"url": "https://example.com/"})).unwrap_or_default();
//! let page = PageFactory::new(ctx.clone()).create(fields, None).await?;
//! let id = page.as_model().id().map(str::to_string).unwrap_or_default();
//!
//! let mut model = Model::load(&ctx, RecordType::Page, &id).await?;
//! model.set("title", "Home");
//! model.save().await?;
//!
//! let reloaded = Model::load(&ctx, RecordType::Page, &id).await?;
//! assert_eq!(reloaded.get_str("title"), Some("Home"));
//! # Ok::<(), perfmon_core::services::DataError>(())
//! # });
//! ```

use crate::db::{DeleteResult, StoreAttributes};
use crate::gateway::{GatewayError, GatewayRequest, GatewayResponse};
use crate::models::schema::json_type_name;
use crate::models::{meta_keys, FieldMap, RecordEnvelope, RecordType};
use crate::services::{DataContext, DataError, QueryParams, RecordQuery};
use chrono::{DateTime, NaiveDate, Utc};
use serde_json::Value;
use std::fmt;
use tracing::{debug, info};

/// One hydrated record
#[derive(Clone)]
pub struct Model {
    ctx: DataContext,
    record_type: RecordType,
    /// `None` once the record has been deleted
    id: Option<String>,
    slug: String,
    parent_id: Option<String>,
    created_at: DateTime<Utc>,
    modified_at: DateTime<Utc>,
    fields: FieldMap,
}

impl Model {
    /// Load a record of `record_type` through the read path
    ///
    /// # Errors
    ///
    /// - `DataError::NotFound` if the read API has no such record
    /// - `DataError::TypeMismatch` if it answers with a different record type
    /// - `DataError::Request`/`DataError::Gateway` if the read itself failed
    pub async fn load(ctx: &DataContext, record_type: RecordType, id: &str) -> Result<Self, DataError> {
        let response = request_item(ctx, record_type, id).await?;
        let envelope = decode_item(&response)?
            .ok_or_else(|| DataError::not_found(record_type, id))?;
        Self::from_envelope(ctx.clone(), record_type, envelope)
    }

    /// Hydrate from one decoded API item
    ///
    /// Storage prefixes are removed, foreign keys dropped, and only fields the
    /// schema declares are kept.
    pub(crate) fn from_envelope(
        ctx: DataContext,
        record_type: RecordType,
        envelope: RecordEnvelope,
    ) -> Result<Self, DataError> {
        if let Some(found) = envelope.record_type.as_deref() {
            if found != record_type.as_str() {
                return Err(DataError::type_mismatch(record_type, found));
            }
        }

        let id = envelope
            .identifier()
            .map(str::to_string)
            .ok_or_else(|| GatewayError::decode(format!("{} item without an id", record_type)))?;
        let created_at = envelope.date_gmt.ok_or_else(|| {
            GatewayError::decode(format!("{} item {} has no date_gmt", record_type, id))
        })?;

        let schema = ctx.registry().fields_for(record_type)?;
        let mut fields = meta_keys::strip_prefix(&envelope.meta);
        fields.retain(|name, _| schema.declares(name));

        Ok(Self {
            record_type,
            parent_id: envelope.parent_identifier().map(str::to_string),
            slug: envelope.slug.unwrap_or_default(),
            modified_at: envelope.modified_gmt.unwrap_or(created_at),
            created_at,
            fields,
            id: Some(id),
            ctx,
        })
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn record_type(&self) -> RecordType {
        self.record_type
    }

    pub fn slug(&self) -> &str {
        &self.slug
    }

    pub fn parent_id(&self) -> Option<&str> {
        self.parent_id.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn modified_at(&self) -> DateTime<Utc> {
        self.modified_at
    }

    /// Whether `delete` has succeeded on this model
    pub fn is_deleted(&self) -> bool {
        self.id.is_none()
    }

    pub fn context(&self) -> &DataContext {
        &self.ctx
    }

    /// Field value, if set
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Field value, or `default` when unset
    pub fn get_or(&self, name: &str, default: Value) -> Value {
        self.fields.get(name).cloned().unwrap_or(default)
    }

    /// Copy of the complete field map
    pub fn fields(&self) -> FieldMap {
        self.fields.clone()
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(Value::as_str)
    }

    pub fn get_f64(&self, name: &str) -> Option<f64> {
        self.fields.get(name).and_then(Value::as_f64)
    }

    pub fn get_i64(&self, name: &str) -> Option<i64> {
        self.fields.get(name).and_then(Value::as_i64)
    }

    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.fields.get(name).and_then(Value::as_bool)
    }

    /// Set one field in memory (no I/O)
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(name.into(), value.into());
    }

    /// Replace the whole field map in memory
    ///
    /// Never fails: anything other than a JSON object clears the map.
    pub fn set_fields(&mut self, fields: Value) {
        self.fields = match fields {
            Value::Object(map) => map,
            other => {
                debug!(
                    record_type = %self.record_type,
                    "set_fields called with a {}, clearing fields",
                    json_type_name(&other)
                );
                FieldMap::new()
            }
        };
    }

    /// Remove one field in memory, returning its previous value
    pub fn unset(&mut self, name: &str) -> Option<Value> {
        self.fields.remove(name)
    }

    /// Persist the complete current field map
    ///
    /// Fields removed in memory since loading are removed from storage too.
    ///
    /// # Errors
    ///
    /// - `DataError::Deleted` after a successful `delete`
    /// - `DataError::Validation` if the field map breaks the schema
    /// - `DataError::Persistence` if the store rejects the write
    pub async fn save(&mut self) -> Result<(), DataError> {
        let id = self.require_id()?.to_string();
        self.ctx.validator().check(self.record_type, &self.fields)?;

        let now = self.ctx.clock().now();
        self.ctx
            .store()
            .update(
                &id,
                meta_keys::add_prefix(&self.fields),
                StoreAttributes::new().with_modified_at(now),
            )
            .await
            .map_err(|e| DataError::from_store(&format!("Failed to save {} {}", self.record_type, id), e))?;

        self.modified_at = now;
        debug!(record_type = %self.record_type, %id, "record saved");
        Ok(())
    }

    /// Permanently delete the underlying record
    ///
    /// The model is dead afterwards: `save` and navigation fail with
    /// `DataError::Deleted`. Children are not touched.
    ///
    /// # Errors
    ///
    /// - `DataError::Deleted` if already deleted
    /// - `DataError::NotFound` if the store no longer had the record
    /// - `DataError::Persistence` if the store rejects the delete
    pub async fn delete(&mut self) -> Result<DeleteResult, DataError> {
        let id = self.require_id()?.to_string();
        let result = self
            .ctx
            .store()
            .delete(&id)
            .await
            .map_err(|e| DataError::from_store(&format!("Failed to delete {} {}", self.record_type, id), e))?;

        self.id = None;
        if !result.existed {
            return Err(DataError::not_found(self.record_type, id));
        }

        info!(record_type = %self.record_type, %id, "record deleted");
        Ok(result)
    }

    /// Re-read this record through the read path, discarding unsaved changes
    pub async fn reload(&mut self) -> Result<(), DataError> {
        let id = self.require_id()?.to_string();
        *self = Self::load(&self.ctx, self.record_type, &id).await?;
        Ok(())
    }

    /// Whole site-calendar days since creation
    ///
    /// Calendar days, not elapsed time: a record created earlier today is 0
    /// days old even when more than 24 hours would fit.
    pub fn age(&self) -> i64 {
        self.ctx
            .calendar()
            .days_between(self.created_at, self.ctx.clock().now())
    }

    /// Creation date on the site calendar
    pub fn created_date(&self) -> NaiveDate {
        self.ctx.calendar().date_of(self.created_at)
    }

    /// Load the parent record as `parent_type`
    ///
    /// `Ok(None)` when there is no parent or it no longer exists.
    pub async fn parent_as(&self, parent_type: RecordType) -> Result<Option<Model>, DataError> {
        match &self.parent_id {
            Some(parent_id) => RecordQuery::new(self.ctx.clone(), parent_type).get(parent_id).await,
            None => Ok(None),
        }
    }

    /// Records of `child_type` whose parent is this record
    pub async fn children(
        &self,
        child_type: RecordType,
        params: QueryParams,
    ) -> Result<Vec<Model>, DataError> {
        let id = self.require_id()?;
        RecordQuery::new(self.ctx.clone(), child_type)
            .get_by_parent(id, params)
            .await
    }

    fn require_id(&self) -> Result<&str, DataError> {
        self.id
            .as_deref()
            .ok_or_else(|| DataError::deleted(self.record_type))
    }
}

impl fmt::Debug for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Model")
            .field("record_type", &self.record_type)
            .field("id", &self.id)
            .field("slug", &self.slug)
            .field("parent_id", &self.parent_id)
            .field("created_at", &self.created_at)
            .field("modified_at", &self.modified_at)
            .field("fields", &self.fields)
            .finish()
    }
}

/// Typed view over a `Model` of one fixed record type
///
/// Implemented by `Report`, `SiteChange`, `Page` and `Insight`; the generic
/// factory and query use it to hand out typed records.
pub trait TypedRecord: Sized + Send {
    const RECORD_TYPE: RecordType;

    /// Wrap without checking the type (checked by `from_model`)
    fn wrap(model: Model) -> Self;

    fn as_model(&self) -> &Model;

    fn as_model_mut(&mut self) -> &mut Model;

    fn into_model(self) -> Model;

    /// Wrap a model, refusing one of a different record type
    fn from_model(model: Model) -> Result<Self, DataError> {
        if model.record_type() != Self::RECORD_TYPE {
            return Err(DataError::type_mismatch(
                Self::RECORD_TYPE,
                model.record_type().as_str(),
            ));
        }
        Ok(Self::wrap(model))
    }
}

/// Issue a single-item read
pub(crate) async fn request_item(
    ctx: &DataContext,
    record_type: RecordType,
    id: &str,
) -> Result<GatewayResponse, DataError> {
    let response = ctx
        .gateway()
        .request(GatewayRequest::item(record_type, id))
        .await?;
    debug!(%record_type, %id, status = response.status, "item read");
    Ok(response)
}

/// Decode a single-item response
///
/// A 404, or a body without an id, means "no such record".
pub(crate) fn decode_item(response: &GatewayResponse) -> Result<Option<RecordEnvelope>, DataError> {
    if response.status == 404 {
        return Ok(None);
    }
    if !response.is_success() {
        let (code, message) = response.error_parts();
        return Err(DataError::request(response.status, code, message));
    }

    let envelope: RecordEnvelope = serde_json::from_value(response.body.clone())
        .map_err(|e| GatewayError::decode(format!("Invalid record body: {}", e)))?;
    Ok(envelope.identifier().is_some().then_some(envelope))
}
