//! Tests for Model hydration and in-memory field handling

#[cfg(test)]
mod tests {
    use crate::db::MemoryStore;
    use crate::gateway::{GatewayError, GatewayRequest, GatewayResponse, RequestGateway};
    use crate::models::{Model, Page, RecordType, SchemaRegistry, TypedRecord};
    use crate::services::{DataContext, DataError, RecordQuery};
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::sync::{Arc, Mutex};

    /// Answers every request with one canned response and records the paths
    struct CannedGateway {
        response: GatewayResponse,
        paths: Mutex<Vec<String>>,
    }

    impl CannedGateway {
        fn new(status: u16, body: Value) -> Arc<Self> {
            Arc::new(Self {
                response: GatewayResponse::new(status, body),
                paths: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl RequestGateway for CannedGateway {
        async fn request(&self, request: GatewayRequest) -> Result<GatewayResponse, GatewayError> {
            self.paths.lock().unwrap().push(request.path);
            Ok(self.response.clone())
        }
    }

    fn context(gateway: Arc<CannedGateway>) -> DataContext {
        DataContext::new(
            Arc::new(MemoryStore::new()),
            gateway,
            Arc::new(SchemaRegistry::builtin()),
        )
    }

    fn page_item(meta: Value) -> Value {
        json!({
            "id": "p-1",
            "type": "page",
            "slug": "monitored-page",
            "parent": "r-1",
            "date_gmt": "2025-03-01T10:00:00Z",
            "modified_gmt": "2025-03-02T10:00:00Z",
            "meta": meta,
        })
    }

    #[tokio::test]
    async fn test_load_keeps_only_visible_declared_fields() {
        let gateway = CannedGateway::new(
            200,
            page_item(json!({
                "_perfmon_url": "https://example.com/",
                "_perfmon_internal_token": "abc",
                "_edit_lock": "1:1",
                "title": "foreign",
            })),
        );
        let ctx = context(gateway.clone());

        let model = Model::load(&ctx, RecordType::Page, "p-1").await.unwrap();

        assert_eq!(model.fields(), json!({"url": "https://example.com/"}).as_object().cloned().unwrap());
        assert_eq!(model.parent_id(), Some("r-1"));
        assert_eq!(model.slug(), "monitored-page");
        assert_eq!(*gateway.paths.lock().unwrap(), vec!["page/p-1".to_string()]);
    }

    #[tokio::test]
    async fn test_load_404_is_not_found() {
        let gateway = CannedGateway::new(
            404,
            json!({"code": "not_found", "message": "No page with id p-9", "data": {"status": 404}}),
        );
        let err = Model::load(&context(gateway), RecordType::Page, "p-9")
            .await
            .unwrap_err();

        assert!(matches!(err, DataError::NotFound { record_type: RecordType::Page, ref id } if id == "p-9"));
    }

    #[tokio::test]
    async fn test_body_without_id_is_absent() {
        let gateway = CannedGateway::new(200, json!({"id": "", "meta": {}}));
        let ctx = context(gateway);

        assert!(Model::load(&ctx, RecordType::Page, "p-1").await.unwrap_err().is_not_found());
        assert!(RecordQuery::new(ctx, RecordType::Page).get("p-1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_server_error_is_not_swallowed() {
        let gateway = CannedGateway::new(
            500,
            json!({"code": "internal_error", "message": "boom", "data": {"status": 500}}),
        );
        let ctx = context(gateway);

        let err = RecordQuery::new(ctx, RecordType::Page).get("p-1").await.unwrap_err();
        assert!(matches!(err, DataError::Request { status: 500, .. }));
    }

    #[tokio::test]
    async fn test_other_record_type_is_type_mismatch() {
        let mut item = page_item(json!({}));
        item["type"] = json!("insight");
        let ctx = context(CannedGateway::new(200, item));

        let err = Model::load(&ctx, RecordType::Page, "p-1").await.unwrap_err();
        assert!(matches!(err, DataError::TypeMismatch { expected: RecordType::Page, .. }));
    }

    #[tokio::test]
    async fn test_set_fields_tolerates_non_objects() {
        let ctx = context(CannedGateway::new(
            200,
            page_item(json!({"_perfmon_url": "https://example.com/"})),
        ));
        let mut model = Model::load(&ctx, RecordType::Page, "p-1").await.unwrap();

        model.set_fields(json!(["not", "a", "map"]));
        assert!(model.fields().is_empty());

        model.set_fields(json!({"url": "https://other.test/", "title": "Other"}));
        assert_eq!(model.get_str("title"), Some("Other"));
        assert_eq!(model.get_or("http_status", json!(0)), json!(0));

        assert_eq!(model.unset("title"), Some(json!("Other")));
        assert!(model.get("title").is_none());
    }

    #[tokio::test]
    async fn test_fields_returns_a_copy() {
        let ctx = context(CannedGateway::new(
            200,
            page_item(json!({"_perfmon_url": "https://example.com/"})),
        ));
        let model = Model::load(&ctx, RecordType::Page, "p-1").await.unwrap();

        let mut copy = model.fields();
        copy.insert("title".to_string(), json!("changed"));
        assert!(model.get("title").is_none());
    }

    #[tokio::test]
    async fn test_typed_wrapper_rejects_other_type() {
        let ctx = context(CannedGateway::new(
            200,
            page_item(json!({"_perfmon_url": "https://example.com/"})),
        ));
        let model = Model::load(&ctx, RecordType::Page, "p-1").await.unwrap();

        let page = Page::from_model(model.clone()).unwrap();
        assert_eq!(page.url(), "https://example.com/");
        assert!(matches!(
            crate::models::Report::from_model(model),
            Err(DataError::TypeMismatch { .. })
        ));
    }
}
