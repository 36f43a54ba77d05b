//! Record Read Handlers
//!
//! Item and collection reads for every record type. Only fields that carry
//! the storage prefix and are declared in the type's schema are serialized;
//! anything else in storage is invisible to every reader of this API.

use crate::api::types::{ApiError, ApiResponse, TOTAL_COUNT_HEADER, TOTAL_PAGES_HEADER};
use crate::api::RecordApi;
use crate::config::DataLayerConfig;
use crate::db::StoredRecord;
use crate::models::{meta_keys, FieldMap, RecordSchema, RecordType};
use chrono::{DateTime, Utc};
use serde_json::{json, Map, Value};
use std::cmp::Ordering;

/// Sort key of a collection read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderBy {
    Date,
    Modified,
    Id,
    Slug,
}

/// Parsed collection parameters
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionParams {
    pub per_page: u32,
    pub page: u32,
    pub parent: Option<String>,
    pub order_by: OrderBy,
    pub descending: bool,
    pub after: Option<DateTime<Utc>>,
    pub before: Option<DateTime<Utc>>,
    /// Storage key → wanted value
    pub meta_filters: Vec<(String, Value)>,
}

impl CollectionParams {
    /// Parse collection parameters, rejecting anything not understood
    pub fn parse(
        params: &Map<String, Value>,
        schema: &RecordSchema,
        config: &DataLayerConfig,
    ) -> Result<Self, ApiError> {
        let mut parsed = Self {
            per_page: config.default_page_size,
            page: 1,
            parent: None,
            order_by: OrderBy::Date,
            descending: true,
            after: None,
            before: None,
            meta_filters: Vec::new(),
        };

        for (name, value) in params {
            match name.as_str() {
                "per_page" => {
                    let per_page = param_u32(name, value)?;
                    if per_page == 0 || per_page > config.max_page_size {
                        return Err(ApiError::invalid_param(
                            name,
                            format!("must be between 1 and {}", config.max_page_size),
                        ));
                    }
                    parsed.per_page = per_page;
                }
                "page" => {
                    let page = param_u32(name, value)?;
                    if page == 0 {
                        return Err(ApiError::invalid_param(name, "must be at least 1"));
                    }
                    parsed.page = page;
                }
                "parent" => parsed.parent = Some(param_scalar(name, value)?),
                "orderby" => {
                    parsed.order_by = match param_str(name, value)? {
                        "date" => OrderBy::Date,
                        "modified" => OrderBy::Modified,
                        "id" => OrderBy::Id,
                        "slug" => OrderBy::Slug,
                        other => {
                            return Err(ApiError::invalid_param(
                                name,
                                format!("'{}' is not one of: date, modified, id, slug", other),
                            ))
                        }
                    }
                }
                "order" => {
                    parsed.descending = match param_str(name, value)? {
                        "desc" => true,
                        "asc" => false,
                        other => {
                            return Err(ApiError::invalid_param(
                                name,
                                format!("'{}' is not one of: asc, desc", other),
                            ))
                        }
                    }
                }
                "after" => parsed.after = Some(param_datetime(name, value)?),
                "before" => parsed.before = Some(param_datetime(name, value)?),
                key => match meta_keys::public_key(key) {
                    Some(field) if schema.declares(field) => {
                        parsed.meta_filters.push((key.to_string(), value.clone()));
                    }
                    _ => return Err(ApiError::invalid_param(name, "unknown parameter")),
                },
            }
        }

        Ok(parsed)
    }

    fn matches(&self, record: &StoredRecord) -> bool {
        if let Some(parent) = &self.parent {
            if record.parent_id.as_deref() != Some(parent.as_str()) {
                return false;
            }
        }
        if self.after.is_some_and(|after| record.created_at <= after) {
            return false;
        }
        if self.before.is_some_and(|before| record.created_at >= before) {
            return false;
        }
        self.meta_filters.iter().all(|(key, wanted)| {
            record
                .meta
                .get(key)
                .is_some_and(|stored| loosely_equal(stored, wanted))
        })
    }

    fn compare(&self, a: &StoredRecord, b: &StoredRecord) -> Ordering {
        let ordering = match self.order_by {
            OrderBy::Date => a.created_at.cmp(&b.created_at),
            OrderBy::Modified => a.modified_at.cmp(&b.modified_at),
            OrderBy::Id => a.id.cmp(&b.id),
            OrderBy::Slug => a.slug.cmp(&b.slug),
        };
        let ordering = if self.descending {
            ordering.reverse()
        } else {
            ordering
        };
        ordering.then_with(|| a.id.cmp(&b.id))
    }
}

/// Serialize a stored record with only its publicly visible meta
pub fn render_record(record: &StoredRecord, schema: &RecordSchema) -> Value {
    let meta: FieldMap = record
        .meta
        .iter()
        .filter(|(key, _)| meta_keys::public_key(key).is_some_and(|name| schema.declares(name)))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();

    json!({
        "id": record.id,
        "type": record.record_type,
        "slug": record.slug,
        "parent": record.parent_id,
        "date_gmt": record.created_at,
        "modified_gmt": record.modified_at,
        "meta": meta,
    })
}

/// Handle `GET {type}/{id}`
pub async fn handle_get_item(
    api: &RecordApi,
    record_type: RecordType,
    id: &str,
    params: &Map<String, Value>,
) -> Result<ApiResponse, ApiError> {
    if let Some(name) = params.keys().next() {
        return Err(ApiError::invalid_param(name, "unknown parameter"));
    }

    let schema = api.schema(record_type)?;
    let record = api
        .source()
        .fetch(id)
        .await
        .map_err(|e| ApiError::internal(format!("Failed to read record: {}", e)))?;

    match record {
        Some(record) if record.record_type == record_type => {
            Ok(ApiResponse::ok(render_record(&record, schema)))
        }
        _ => Err(ApiError::not_found(record_type, id)),
    }
}

/// Handle `GET {type}`
pub async fn handle_list(
    api: &RecordApi,
    record_type: RecordType,
    params: &Map<String, Value>,
) -> Result<ApiResponse, ApiError> {
    let schema = api.schema(record_type)?;
    let params = CollectionParams::parse(params, schema, api.config())?;

    let mut records: Vec<StoredRecord> = api
        .source()
        .scan(record_type)
        .await
        .map_err(|e| ApiError::internal(format!("Failed to read records: {}", e)))?
        .into_iter()
        .filter(|record| params.matches(record))
        .collect();
    records.sort_by(|a, b| params.compare(a, b));

    let total = records.len();
    let per_page = params.per_page as usize;
    let total_pages = total.div_ceil(per_page);
    if total > 0 && params.page as usize > total_pages {
        return Err(ApiError::invalid_param(
            "page",
            format!("page {} is past the last page ({})", params.page, total_pages),
        ));
    }

    let items: Vec<Value> = records
        .iter()
        .skip((params.page as usize - 1) * per_page)
        .take(per_page)
        .map(|record| render_record(record, schema))
        .collect();

    Ok(ApiResponse::ok(Value::Array(items))
        .with_header(TOTAL_COUNT_HEADER, total)
        .with_header(TOTAL_PAGES_HEADER, total_pages))
}

/// Stored values match a filter either exactly or by their string form
/// (query strings carry every value as text)
fn loosely_equal(stored: &Value, wanted: &Value) -> bool {
    if stored == wanted {
        return true;
    }
    match (wanted.as_str(), stored) {
        (Some(text), Value::Number(n)) => n.to_string() == text,
        (Some(text), Value::Bool(b)) => b.to_string() == text,
        _ => false,
    }
}

fn param_u32(name: &str, value: &Value) -> Result<u32, ApiError> {
    let parsed = match value {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.trim().parse::<u32>().ok(),
        _ => None,
    };
    parsed.ok_or_else(|| ApiError::invalid_param(name, "expected a positive integer"))
}

fn param_str<'a>(name: &str, value: &'a Value) -> Result<&'a str, ApiError> {
    value
        .as_str()
        .ok_or_else(|| ApiError::invalid_param(name, "expected a string"))
}

fn param_scalar(name: &str, value: &Value) -> Result<String, ApiError> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        _ => Err(ApiError::invalid_param(name, "expected a string")),
    }
}

fn param_datetime(name: &str, value: &Value) -> Result<DateTime<Utc>, ApiError> {
    let text = param_str(name, value)?;
    DateTime::parse_from_rfc3339(text)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| ApiError::invalid_param(name, format!("expected an RFC 3339 date: {}", e)))
}
