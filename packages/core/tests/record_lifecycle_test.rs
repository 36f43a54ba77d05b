//! Integration tests for record creation, persistence and deletion
//!
//! Tests cover:
//! - Factory validation and slug rules
//! - Create → load round trips through the loopback read API
//! - Full-replace saves and foreign-field preservation
//! - Deletion and dead models
//! - Calendar-day ages
//! - Store failures surfacing as persistence errors

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use perfmon_core::api::RecordApi;
use perfmon_core::db::{ContentStore, DeleteResult, MemoryStore, StoreAttributes, StoreError};
use perfmon_core::gateway::LoopbackGateway;
use perfmon_core::models::time::MockTimeProvider;
use perfmon_core::{
    DataContext, DataError, DataLayerConfig, FieldMap, InsightFactory, Model, PageFactory,
    RecordType, ReportFactory, ReportStatus, SchemaRegistry, SiteChangeFactory, TypedRecord,
    ViolationReason,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio_test::{assert_err, assert_ok};

fn fields(value: Value) -> FieldMap {
    value.as_object().cloned().unwrap()
}

type Harness = (DataContext, Arc<MemoryStore>, Arc<MockTimeProvider>);

fn setup_at(start: DateTime<Utc>, config: DataLayerConfig) -> Harness {
    let clock = Arc::new(MockTimeProvider::with_time(start));
    let (ctx, store) =
        DataContext::in_memory_with(Arc::new(SchemaRegistry::builtin()), config, clock.clone())
            .unwrap();
    (ctx, store, clock)
}

fn setup() -> Harness {
    setup_at(
        Utc.with_ymd_and_hms(2025, 5, 20, 12, 0, 0).unwrap(),
        DataLayerConfig::default(),
    )
}

// =========================================================================
// Creation
// =========================================================================

#[tokio::test]
async fn test_create_then_load_round_trips_fields() {
    let (ctx, _store, _clock) = setup();
    let input = fields(json!({
        "url": "https://example.com/about/",
        "title": "About",
        "is_homepage": false,
        "http_status": 200,
        "largest_contentful_paint": 1830.5,
    }));

    let page = PageFactory::new(ctx.clone()).create(input.clone(), None).await.unwrap();
    let id = page.as_model().id().unwrap().to_string();

    let loaded = Model::load(&ctx, RecordType::Page, &id).await.unwrap();
    assert_eq!(loaded.fields(), input);
    assert_eq!(page.as_model().fields(), input);
}

#[tokio::test]
async fn test_invalid_fields_are_rejected_with_every_violation() {
    let (ctx, store, _clock) = setup();

    let err = ReportFactory::new(ctx)
        .create(fields(json!({"strategy": "tablet", "colour": "red"})), None)
        .await
        .unwrap_err();

    let reasons: Vec<(&str, &ViolationReason)> = err
        .violations()
        .iter()
        .map(|v| (v.field.as_str(), &v.reason))
        .collect();
    assert_eq!(reasons.len(), 3);
    assert_eq!(reasons[0], ("status", &ViolationReason::Missing));
    assert_eq!(reasons[1].0, "strategy");
    assert_eq!(reasons[2], ("colour", &ViolationReason::UnknownField));
    assert!(store.is_empty(), "nothing may be written on validation failure");
}

#[tokio::test]
async fn test_empty_fields_valid_only_without_required_fields() {
    let (ctx, _store, _clock) = setup();

    assert_ok!(SiteChangeFactory::new(ctx.clone()).create(FieldMap::new(), None).await);
    assert_err!(PageFactory::new(ctx).create(FieldMap::new(), None).await);
}

#[tokio::test]
async fn test_slug_rules() {
    let (ctx, _store, _clock) = setup();
    let changes = SiteChangeFactory::new(ctx.clone());
    let insights = InsightFactory::new(ctx.clone());

    let plugin = changes
        .create(fields(json!({"object_type": "plugin", "action": "activate"})), None)
        .await
        .unwrap();
    assert_eq!(plugin.as_model().slug(), "site-change-plugin-activate");

    let unknown = changes.create(FieldMap::new(), None).await.unwrap();
    assert_eq!(unknown.as_model().slug(), "site-change-unknown-unknown");

    let security = insights
        .create(fields(json!({"type": "security"})), None)
        .await
        .unwrap();
    assert_eq!(security.as_model().slug(), "security");

    let generic = insights.create(FieldMap::new(), None).await.unwrap();
    assert_eq!(generic.as_model().slug(), "generic-insight");
}

#[tokio::test]
async fn test_report_slug_uses_site_calendar_date() {
    // 22:30 UTC on May 20th is already May 21st at UTC+3
    let config = DataLayerConfig {
        utc_offset_minutes: 180,
        ..Default::default()
    };
    let (ctx, _store, _clock) = setup_at(Utc.with_ymd_and_hms(2025, 5, 20, 22, 30, 0).unwrap(), config);

    let report = ReportFactory::new(ctx)
        .create(fields(json!({"status": "pending"})), None)
        .await
        .unwrap();
    assert_eq!(report.as_model().slug(), "report-2025-05-21");
}

#[tokio::test]
async fn test_pages_get_unique_slugs_and_canonical_url() {
    let (ctx, store, _clock) = setup();
    let factory = PageFactory::new(ctx);

    let first = factory
        .create(fields(json!({"url": "https://example.com/"})), None)
        .await
        .unwrap();
    let second = factory
        .create(fields(json!({"url": "https://example.com/blog/"})), None)
        .await
        .unwrap();

    assert_eq!(first.as_model().slug(), "monitored-page");
    assert_eq!(second.as_model().slug(), "monitored-page-2");

    let raw = store.raw(second.as_model().id().unwrap()).unwrap();
    assert_eq!(raw.attributes["canonical_url"], json!("https://example.com/blog/"));
    assert_eq!(raw.meta["_perfmon_url"], json!("https://example.com/blog/"));
}

#[tokio::test]
async fn test_parent_reference_is_stored() {
    let (ctx, _store, _clock) = setup();
    let report = ReportFactory::new(ctx.clone())
        .create(fields(json!({"status": "running"})), None)
        .await
        .unwrap();

    let page = PageFactory::new(ctx)
        .create(fields(json!({"url": "https://example.com/"})), Some(report.as_model()))
        .await
        .unwrap();

    assert_eq!(page.as_model().parent_id(), report.as_model().id());
    let parent = page.report().await.unwrap().unwrap();
    assert_eq!(parent.status(), ReportStatus::Running);
}

#[tokio::test]
async fn test_deleted_parent_is_rejected() {
    let (ctx, store, _clock) = setup();
    let mut report = ReportFactory::new(ctx.clone())
        .create(fields(json!({"status": "failed"})), None)
        .await
        .unwrap();
    report.as_model_mut().delete().await.unwrap();

    let err = PageFactory::new(ctx)
        .create(fields(json!({"url": "https://example.com/"})), Some(report.as_model()))
        .await
        .unwrap_err();
    assert!(matches!(err, DataError::InvalidParent(_)));
    assert!(store.is_empty());
}

// =========================================================================
// Save
// =========================================================================

#[tokio::test]
async fn test_save_persists_full_field_map() {
    let (ctx, store, clock) = setup();
    let page = PageFactory::new(ctx.clone())
        .create(
            fields(json!({"url": "https://example.com/", "title": "Old", "http_status": 200})),
            None,
        )
        .await
        .unwrap();
    let id = page.as_model().id().unwrap().to_string();

    let mut model = page.into_model();
    model.set("title", "New");
    model.unset("http_status");
    clock.advance(Duration::hours(2));
    model.save().await.unwrap();

    let loaded = Model::load(&ctx, RecordType::Page, &id).await.unwrap();
    assert_eq!(loaded.get_str("title"), Some("New"));
    assert!(loaded.get("http_status").is_none());
    assert_eq!(loaded.modified_at() - loaded.created_at(), Duration::hours(2));
    assert!(!store.raw(&id).unwrap().meta.contains_key("_perfmon_http_status"));
}

#[tokio::test]
async fn test_save_validates_and_keeps_foreign_fields() {
    let (ctx, store, _clock) = setup();
    let report = ReportFactory::new(ctx.clone())
        .create(fields(json!({"status": "pending"})), None)
        .await
        .unwrap();
    let id = report.as_model().id().unwrap().to_string();
    store.put_raw_meta(&id, "_edit_lock", json!("1716206400:1")).unwrap();

    let mut report = report;
    report.as_model_mut().set("status", "exploded");
    assert!(matches!(
        report.as_model_mut().save().await,
        Err(DataError::Validation { .. })
    ));

    report.set_status(ReportStatus::Complete);
    report.set_performance_score(88.0);
    report.as_model_mut().save().await.unwrap();

    let raw = store.raw(&id).unwrap();
    assert_eq!(raw.meta["_edit_lock"], json!("1716206400:1"));
    assert_eq!(raw.meta["_perfmon_status"], json!("complete"));

    let loaded = Model::load(&ctx, RecordType::Report, &id).await.unwrap();
    assert!(loaded.get("_edit_lock").is_none());
    assert!(loaded.get("edit_lock").is_none());
}

#[tokio::test]
async fn test_reload_discards_unsaved_changes() {
    let (ctx, _store, _clock) = setup();
    let mut model = InsightFactory::new(ctx)
        .create(fields(json!({"type": "images", "title": "Large images"})), None)
        .await
        .unwrap()
        .into_model();

    model.set("title", "Changed but not saved");
    model.reload().await.unwrap();
    assert_eq!(model.get_str("title"), Some("Large images"));
}

// =========================================================================
// Delete
// =========================================================================

#[tokio::test]
async fn test_delete_makes_record_unreadable_and_model_dead() {
    let (ctx, store, _clock) = setup();
    let mut model = SiteChangeFactory::new(ctx.clone())
        .create(fields(json!({"object_type": "theme", "action": "switch"})), None)
        .await
        .unwrap()
        .into_model();
    let id = model.id().unwrap().to_string();

    let result = model.delete().await.unwrap();
    assert!(result.existed);
    assert!(model.is_deleted());
    assert!(store.is_empty());

    let err = Model::load(&ctx, RecordType::SiteChange, &id).await.unwrap_err();
    assert!(err.is_not_found());

    assert!(matches!(model.save().await, Err(DataError::Deleted { .. })));
    assert!(matches!(model.delete().await, Err(DataError::Deleted { .. })));
}

#[tokio::test]
async fn test_children_survive_parent_deletion() {
    let (ctx, _store, _clock) = setup();
    let mut report = ReportFactory::new(ctx.clone())
        .create(fields(json!({"status": "complete"})), None)
        .await
        .unwrap();
    let page = PageFactory::new(ctx.clone())
        .create(fields(json!({"url": "https://example.com/"})), Some(report.as_model()))
        .await
        .unwrap();

    report.as_model_mut().delete().await.unwrap();

    let page_id = page.as_model().id().unwrap();
    let reloaded = Model::load(&ctx, RecordType::Page, page_id).await.unwrap();
    assert!(reloaded.parent_id().is_some());
    assert!(reloaded.parent_as(RecordType::Report).await.unwrap().is_none());
}

// =========================================================================
// Age
// =========================================================================

#[tokio::test]
async fn test_age_counts_calendar_days() {
    let (ctx, _store, clock) = setup_at(
        Utc.with_ymd_and_hms(2025, 5, 20, 23, 50, 0).unwrap(),
        DataLayerConfig::default(),
    );
    let report = ReportFactory::new(ctx)
        .create(fields(json!({"status": "pending"})), None)
        .await
        .unwrap();
    assert_eq!(report.as_model().age(), 0);

    clock.advance(Duration::minutes(20));
    assert_eq!(report.as_model().age(), 1);

    clock.advance(Duration::hours(23));
    assert_eq!(report.as_model().age(), 1);

    clock.advance(Duration::days(5));
    assert_eq!(report.as_model().age(), 6);
}

// =========================================================================
// Store failures
// =========================================================================

/// Reads from a real store, refuses every write
struct RejectingStore;

#[async_trait]
impl ContentStore for RejectingStore {
    async fn create(
        &self,
        _record_type: RecordType,
        _fields: FieldMap,
        _attributes: StoreAttributes,
    ) -> Result<String, StoreError> {
        Err(StoreError::rejected("database is read-only"))
    }

    async fn update(
        &self,
        _id: &str,
        _fields: FieldMap,
        _attributes: StoreAttributes,
    ) -> Result<(), StoreError> {
        Err(StoreError::rejected("database is read-only"))
    }

    async fn delete(&self, _id: &str) -> Result<DeleteResult, StoreError> {
        Err(StoreError::unavailable("connection lost"))
    }
}

#[tokio::test]
async fn test_store_rejections_become_persistence_errors() {
    let (seed_ctx, backing, _clock) = setup();
    let report = ReportFactory::new(seed_ctx)
        .create(fields(json!({"status": "pending"})), None)
        .await
        .unwrap();
    let id = report.as_model().id().unwrap().to_string();

    let registry = Arc::new(SchemaRegistry::builtin());
    let api = RecordApi::new(
        backing.clone(),
        registry.clone(),
        Arc::new(DataLayerConfig::default()),
    )
    .unwrap();
    let ctx = DataContext::new(
        Arc::new(RejectingStore),
        Arc::new(LoopbackGateway::new(Arc::new(api))),
        registry,
    );

    let err = ReportFactory::new(ctx.clone())
        .create(fields(json!({"status": "pending"})), None)
        .await
        .unwrap_err();
    assert!(matches!(err, DataError::Persistence { .. }));
    assert!(err.to_string().contains("database is read-only"));

    let mut model = Model::load(&ctx, RecordType::Report, &id).await.unwrap();
    model.set("summary", "never written");
    assert!(matches!(model.save().await, Err(DataError::Persistence { .. })));

    let err = model.delete().await.unwrap_err();
    assert!(err.to_string().contains("connection lost"));
    assert!(!model.is_deleted());
    assert_eq!(backing.len(), 1);
}
