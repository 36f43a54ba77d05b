//! Read API Router
//!
//! Parses the resource path, enforces read-only access and dispatches to the
//! record handlers. Every outcome, including errors, is an `ApiResponse`.

use crate::api::handlers::records;
use crate::api::types::{ApiError, ApiRequest, ApiResponse};
use crate::config::DataLayerConfig;
use crate::db::RecordSource;
use crate::gateway::RequestMethod;
use crate::models::{RecordSchema, RecordType, SchemaRegistry};
use crate::services::DataError;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Resolved route of a request path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Collection(RecordType),
    Item(RecordType, String),
}

impl Route {
    /// Parse `"{type}"` or `"{type}/{id}"`; leading slashes are ignored
    ///
    /// A trailing slash is an empty id segment, not a collection.
    pub fn parse(path: &str) -> Option<Self> {
        let mut segments = path.trim_start_matches('/').split('/');
        let record_type: RecordType = segments.next()?.parse().ok()?;

        match (segments.next(), segments.next()) {
            (None, _) => Some(Self::Collection(record_type)),
            (Some(id), None) if !id.is_empty() => Some(Self::Item(record_type, id.to_string())),
            _ => None,
        }
    }
}

/// The record read API
pub struct RecordApi {
    source: Arc<dyn RecordSource>,
    registry: Arc<SchemaRegistry>,
    config: Arc<DataLayerConfig>,
}

impl RecordApi {
    /// Build the API over `source`
    ///
    /// # Errors
    ///
    /// `DataError::Configuration` if `config` does not validate.
    pub fn new(
        source: Arc<dyn RecordSource>,
        registry: Arc<SchemaRegistry>,
        config: Arc<DataLayerConfig>,
    ) -> Result<Self, DataError> {
        config.validate()?;
        Ok(Self {
            source,
            registry,
            config,
        })
    }

    pub fn source(&self) -> &dyn RecordSource {
        self.source.as_ref()
    }

    pub fn config(&self) -> &DataLayerConfig {
        &self.config
    }

    /// Schema of a routed type; a routed type missing from the registry is
    /// a server fault
    pub fn schema(&self, record_type: RecordType) -> Result<&RecordSchema, ApiError> {
        self.registry
            .fields_for(record_type)
            .map_err(|e| ApiError::internal(e.to_string()))
    }

    /// Handle one request
    #[instrument(skip(self, request), fields(method = %request.method, path = %request.path))]
    pub async fn handle(&self, request: ApiRequest) -> ApiResponse {
        let result = self.dispatch(&request).await;

        match result {
            Ok(response) => {
                debug!(status = response.status, "API request served");
                response
            }
            Err(error) => {
                warn!(
                    status = error.status,
                    code = %error.code,
                    "API request rejected: {}",
                    error.message
                );
                error.into()
            }
        }
    }

    async fn dispatch(&self, request: &ApiRequest) -> Result<ApiResponse, ApiError> {
        let route = Route::parse(&request.path).ok_or_else(|| ApiError::no_route(&request.path))?;

        if request.method != RequestMethod::Get {
            return Err(ApiError::method_not_allowed(request.method));
        }

        match route {
            Route::Collection(record_type) => {
                records::handle_list(self, record_type, &request.params).await
            }
            Route::Item(record_type, id) => {
                records::handle_get_item(self, record_type, &id, &request.params).await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::{TOTAL_COUNT_HEADER, TOTAL_PAGES_HEADER};
    use crate::db::{ContentStore, MemoryStore, StoreAttributes};
    use crate::models::time::MockTimeProvider;
    use crate::models::FieldMap;
    use chrono::Duration;
    use serde_json::json;

    fn api_over(store: Arc<MemoryStore>) -> RecordApi {
        RecordApi::new(
            store,
            Arc::new(SchemaRegistry::builtin()),
            Arc::new(DataLayerConfig::default()),
        )
        .unwrap()
    }

    fn fields(value: serde_json::Value) -> FieldMap {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_route_parsing() {
        assert_eq!(
            Route::parse("report"),
            Some(Route::Collection(RecordType::Report))
        );
        assert_eq!(
            Route::parse("/page/abc"),
            Some(Route::Item(RecordType::Page, "abc".to_string()))
        );
        assert_eq!(Route::parse("widget"), None);
        assert_eq!(Route::parse("page/"), None);
        assert_eq!(Route::parse("page//"), None);
        assert_eq!(Route::parse("page/abc/"), None);
        assert_eq!(Route::parse("page/abc/extra"), None);
        assert_eq!(Route::parse(""), None);
    }

    #[tokio::test]
    async fn test_item_of_wrong_type_is_not_found() {
        let store = Arc::new(MemoryStore::new());
        let id = store
            .create(
                RecordType::Page,
                fields(json!({"_perfmon_url": "https://example.com/"})),
                StoreAttributes::new(),
            )
            .await
            .unwrap();
        let api = api_over(store);

        let found = api.handle(ApiRequest::get(format!("page/{}", id))).await;
        assert_eq!(found.status, 200);
        assert_eq!(found.body["id"], id.as_str());

        let wrong = api.handle(ApiRequest::get(format!("insight/{}", id))).await;
        assert_eq!(wrong.status, 404);
        assert!(wrong.body.get("id").is_none());
    }

    #[tokio::test]
    async fn test_non_get_methods_are_rejected() {
        let api = api_over(Arc::new(MemoryStore::new()));
        let request = ApiRequest {
            method: RequestMethod::Delete,
            path: "report/1".to_string(),
            params: Default::default(),
        };

        let response = api.handle(request).await;
        assert_eq!(response.status, 405);
    }

    #[tokio::test]
    async fn test_unknown_route() {
        let api = api_over(Arc::new(MemoryStore::new()));
        let response = api.handle(ApiRequest::get("dashboard")).await;
        assert_eq!(response.status, 404);
        assert_eq!(response.body["code"], "no_route");
    }

    #[tokio::test]
    async fn test_collection_orders_pages_and_counts() {
        let clock = Arc::new(MockTimeProvider::new());
        let store = Arc::new(MemoryStore::with_clock(clock.clone()));
        let mut ids = Vec::new();
        for _ in 0..5 {
            ids.push(
                store
                    .create(
                        RecordType::Report,
                        fields(json!({"_perfmon_status": "complete"})),
                        StoreAttributes::new(),
                    )
                    .await
                    .unwrap(),
            );
            clock.advance(Duration::minutes(1));
        }
        let api = api_over(store);

        let response = api
            .handle(
                ApiRequest::get("report")
                    .with_param("per_page", json!(2))
                    .with_param("page", json!(2)),
            )
            .await;

        assert_eq!(response.status, 200);
        assert_eq!(response.headers[TOTAL_COUNT_HEADER], "5");
        assert_eq!(response.headers[TOTAL_PAGES_HEADER], "3");
        let returned: Vec<&str> = response
            .body
            .as_array()
            .unwrap()
            .iter()
            .map(|item| item["id"].as_str().unwrap())
            .collect();
        assert_eq!(returned, vec![ids[2].as_str(), ids[1].as_str()]);

        let past_end = api
            .handle(ApiRequest::get("report").with_param("page", json!(2)))
            .await;
        assert_eq!(past_end.status, 400);
    }

    #[test]
    fn test_invalid_config_is_rejected_at_construction() {
        let config = DataLayerConfig {
            default_page_size: 0,
            ..Default::default()
        };
        let result = RecordApi::new(
            Arc::new(MemoryStore::new()),
            Arc::new(SchemaRegistry::builtin()),
            Arc::new(config),
        );
        assert!(matches!(result, Err(DataError::Configuration(_))));
    }

    #[tokio::test]
    async fn test_empty_collection_has_zero_totals() {
        let api = api_over(Arc::new(MemoryStore::new()));
        let response = api.handle(ApiRequest::get("insight")).await;

        assert_eq!(response.status, 200);
        assert_eq!(response.body, json!([]));
        assert_eq!(response.headers[TOTAL_COUNT_HEADER], "0");
        assert_eq!(response.headers[TOTAL_PAGES_HEADER], "0");
    }
}
