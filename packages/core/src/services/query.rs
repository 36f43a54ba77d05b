//! Record Queries
//!
//! Every read goes through the request gateway as a described request against
//! the public read API, and every returned item is hydrated into a `Model`.
//! Queries never re-sort: results come back in the order the API produced.
//!
//! # Examples
//!
//! ```rust
//! use perfmon_core::services::{DataContext, QueryParams, ReportQuery};
//!
//! # tokio_test::block_on(async {
//! let (ctx, _store) = DataContext::in_memory()?;
//! let reports = ReportQuery::new(ctx);
//!
//! assert!(reports.get_most_recent().await?.is_none());
//! let complete = reports
//!     .query(QueryParams::new().filter("status", "complete").page_size(20))
//!     .await?;
//! assert!(complete.is_empty());
//! assert_eq!(reports.total(), Some(0));
//! # Ok::<(), perfmon_core::services::DataError>(())
//! # });
//! ```

use crate::api::{TOTAL_COUNT_HEADER, TOTAL_PAGES_HEADER};
use crate::gateway::{GatewayError, GatewayRequest, GatewayResponse};
use crate::models::model::{decode_item, request_item};
use crate::models::{
    meta_keys, Insight, Model, Page, RecordEnvelope, RecordType, Report, SiteChange, TypedRecord,
};
use crate::services::{DataContext, DataError};
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, warn};

/// Filter and pagination parameters of a collection read
///
/// Field filters take public field names; the storage prefix is added here.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryParams {
    params: Map<String, Value>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Results per page (`per_page`)
    pub fn page_size(self, size: u32) -> Self {
        self.param("per_page", size)
    }

    /// 1-based page number
    pub fn page(self, page: u32) -> Self {
        self.param("page", page)
    }

    /// Only records whose parent is `parent_id`
    pub fn parent(self, parent_id: impl Into<String>) -> Self {
        self.param("parent", parent_id.into())
    }

    /// Sort key: `date`, `modified`, `id` or `slug`
    pub fn order_by(self, field: &str) -> Self {
        self.param("orderby", field)
    }

    pub fn ascending(self) -> Self {
        self.param("order", "asc")
    }

    pub fn descending(self) -> Self {
        self.param("order", "desc")
    }

    /// Only records created after `instant`
    pub fn after(self, instant: DateTime<Utc>) -> Self {
        self.param("after", instant.to_rfc3339_opts(SecondsFormat::AutoSi, true))
    }

    /// Only records created before `instant`
    pub fn before(self, instant: DateTime<Utc>) -> Self {
        self.param("before", instant.to_rfc3339_opts(SecondsFormat::AutoSi, true))
    }

    /// Only records whose field `name` equals `value`
    pub fn filter(self, name: &str, value: impl Into<Value>) -> Self {
        self.param(meta_keys::prefixed_key(name), value)
    }

    /// Raw request parameter, passed through unchanged
    pub fn param(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    /// Parameters of `self` overlaid with those of `other`
    pub fn merge(mut self, other: QueryParams) -> Self {
        self.params.extend(other.params);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.params.get(name)
    }

    pub fn into_params(self) -> Map<String, Value> {
        self.params
    }
}

/// Reads records of one runtime-chosen type
pub struct RecordQuery {
    ctx: DataContext,
    record_type: RecordType,
    last_headers: Mutex<HashMap<String, String>>,
}

impl RecordQuery {
    pub fn new(ctx: DataContext, record_type: RecordType) -> Self {
        Self {
            ctx,
            record_type,
            last_headers: Mutex::new(HashMap::new()),
        }
    }

    pub fn record_type(&self) -> RecordType {
        self.record_type
    }

    /// Record by id, `None` if the read API has no such record
    ///
    /// # Errors
    ///
    /// Any failure other than "not found" (server errors, undecodable bodies,
    /// a record of another type).
    pub async fn get(&self, id: &str) -> Result<Option<Model>, DataError> {
        let response = request_item(&self.ctx, self.record_type, id).await?;
        self.remember_headers(&response);

        match decode_item(&response)? {
            Some(envelope) => Model::from_envelope(self.ctx.clone(), self.record_type, envelope).map(Some),
            None => Ok(None),
        }
    }

    /// Newest record by creation date
    pub async fn get_most_recent(&self) -> Result<Option<Model>, DataError> {
        let params = QueryParams::new().page_size(1).order_by("date").descending();
        Ok(self.query(params).await?.into_iter().next())
    }

    /// Records whose parent is `parent_id`, with extra parameters
    ///
    /// `parent_id` wins over a `parent` key in `params`.
    pub async fn get_by_parent(
        &self,
        parent_id: &str,
        params: QueryParams,
    ) -> Result<Vec<Model>, DataError> {
        self.query(params.parent(parent_id)).await
    }

    /// One collection read
    ///
    /// Items without an id are skipped; an empty result is not an error.
    ///
    /// # Errors
    ///
    /// - `DataError::Request` if the API rejected the read (bad parameters,
    ///   page past the end)
    /// - `DataError::Gateway` if the body is not a list of records
    pub async fn query(&self, params: QueryParams) -> Result<Vec<Model>, DataError> {
        let request = GatewayRequest::collection(self.record_type).with_params(params.into_params());
        let response = self.ctx.gateway().request(request).await?;
        self.remember_headers(&response);
        debug!(record_type = %self.record_type, status = response.status, "collection read");

        if !response.is_success() {
            let (code, message) = response.error_parts();
            return Err(DataError::request(response.status, code, message));
        }

        let items = match response.body {
            Value::Array(items) => items,
            other => {
                return Err(GatewayError::decode(format!(
                    "expected a list of {} records, got {}",
                    self.record_type, other
                ))
                .into())
            }
        };

        let mut models = Vec::with_capacity(items.len());
        for item in items {
            let envelope: RecordEnvelope = serde_json::from_value(item)
                .map_err(|e| GatewayError::decode(format!("Invalid record item: {}", e)))?;
            if envelope.identifier().is_none() {
                warn!(record_type = %self.record_type, "skipping collection item without an id");
                continue;
            }
            models.push(Model::from_envelope(self.ctx.clone(), self.record_type, envelope)?);
        }
        Ok(models)
    }

    /// Headers of the most recent read
    pub fn last_response_headers(&self) -> HashMap<String, String> {
        self.headers().clone()
    }

    /// `X-Total-Count` of the most recent collection read
    pub fn total(&self) -> Option<u64> {
        self.numeric_header(TOTAL_COUNT_HEADER)
    }

    /// `X-Total-Pages` of the most recent collection read
    pub fn total_pages(&self) -> Option<u64> {
        self.numeric_header(TOTAL_PAGES_HEADER)
    }

    fn numeric_header(&self, name: &str) -> Option<u64> {
        self.headers()
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .and_then(|(_, value)| value.trim().parse().ok())
    }

    fn remember_headers(&self, response: &GatewayResponse) {
        *self.headers() = response.headers.clone();
    }

    fn headers(&self) -> MutexGuard<'_, HashMap<String, String>> {
        self.last_headers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Reads records of one record type, handing out its typed wrapper
pub struct TypedQuery<T: TypedRecord> {
    inner: RecordQuery,
    _marker: PhantomData<fn() -> T>,
}

impl<T: TypedRecord> TypedQuery<T> {
    pub fn new(ctx: DataContext) -> Self {
        Self {
            inner: RecordQuery::new(ctx, T::RECORD_TYPE),
            _marker: PhantomData,
        }
    }

    pub async fn get(&self, id: &str) -> Result<Option<T>, DataError> {
        self.inner.get(id).await?.map(T::from_model).transpose()
    }

    pub async fn get_most_recent(&self) -> Result<Option<T>, DataError> {
        self.inner.get_most_recent().await?.map(T::from_model).transpose()
    }

    pub async fn get_by_parent(&self, parent_id: &str, params: QueryParams) -> Result<Vec<T>, DataError> {
        wrap_all(self.inner.get_by_parent(parent_id, params).await?)
    }

    pub async fn query(&self, params: QueryParams) -> Result<Vec<T>, DataError> {
        wrap_all(self.inner.query(params).await?)
    }

    pub fn last_response_headers(&self) -> HashMap<String, String> {
        self.inner.last_response_headers()
    }

    pub fn total(&self) -> Option<u64> {
        self.inner.total()
    }

    pub fn total_pages(&self) -> Option<u64> {
        self.inner.total_pages()
    }
}

fn wrap_all<T: TypedRecord>(models: Vec<Model>) -> Result<Vec<T>, DataError> {
    models.into_iter().map(T::from_model).collect()
}

pub type ReportQuery = TypedQuery<Report>;
pub type SiteChangeQuery = TypedQuery<SiteChange>;
pub type PageQuery = TypedQuery<Page>;
pub type InsightQuery = TypedQuery<Insight>;

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_filters_are_prefixed() {
        let params = QueryParams::new()
            .filter("status", "complete")
            .page_size(5)
            .into_params();

        assert_eq!(params["_perfmon_status"], json!("complete"));
        assert_eq!(params["per_page"], json!(5));
        assert!(!params.contains_key("status"));
    }

    #[test]
    fn test_merge_and_parent_override() {
        let params = QueryParams::new()
            .parent("old")
            .page(2)
            .merge(QueryParams::new().parent("new"));

        assert_eq!(params.get("parent"), Some(&json!("new")));
        assert_eq!(params.get("page"), Some(&json!(2)));
    }

    #[test]
    fn test_dates_are_rfc3339() {
        let at = Utc.with_ymd_and_hms(2025, 7, 4, 12, 30, 0).unwrap();
        let params = QueryParams::new().after(at);
        assert_eq!(params.get("after"), Some(&json!("2025-07-04T12:30:00Z")));
    }
}
