//! Development Binary
//!
//! Seeds an in-memory backend with a sample report tree and prints the most
//! recent report, its pages and their insights as JSON. Everything is read
//! back through the loopback gateway, so the output is what the public read
//! API exposes.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin perfmon-dev
//!
//! # Site in UTC+2, with a custom configuration file
//! PERFMON_CONFIG=perfmon.json RUST_LOG=debug cargo run --bin perfmon-dev
//! ```
//!
//! # Environment Variables
//!
//! - `PERFMON_CONFIG`: path to a `DataLayerConfig` JSON document
//! - `PERFMON_SCHEMAS`: path to a schema registry JSON document
//! - `RUST_LOG`: logging level (e.g., "info", "debug")

use std::env;
use std::sync::Arc;

use perfmon_core::logging::init_tracing;
use perfmon_core::models::time::SystemTimeProvider;
use perfmon_core::{
    DataContext, DataLayerConfig, FieldMap, InsightFactory, Model, PageFactory, QueryParams,
    ReportFactory, ReportQuery, SchemaRegistry, SiteChangeFactory, SiteChangeQuery, TypedRecord,
};
use serde_json::{json, Value};

fn fields(value: Value) -> anyhow::Result<FieldMap> {
    Ok(serde_json::from_value(value)?)
}

fn describe(model: &Model) -> Value {
    json!({
        "id": model.id(),
        "slug": model.slug(),
        "age_days": model.age(),
        "fields": model.fields(),
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = match env::var("PERFMON_CONFIG") {
        Ok(path) => DataLayerConfig::from_json_str(&tokio::fs::read_to_string(&path).await?)?,
        Err(_) => DataLayerConfig::default(),
    };
    let registry = match env::var("PERFMON_SCHEMAS") {
        Ok(path) => SchemaRegistry::from_json_str(&tokio::fs::read_to_string(&path).await?)?,
        Err(_) => SchemaRegistry::builtin(),
    };

    let (ctx, store) =
        DataContext::in_memory_with(Arc::new(registry), config, Arc::new(SystemTimeProvider))?;
    tracing::info!("Seeding sample data");

    SiteChangeFactory::new(ctx.clone())
        .create(
            fields(json!({
                "object_type": "plugin",
                "action": "update",
                "object_name": "Image Optimizer",
                "previous_version": "2.1.0",
                "new_version": "2.2.0",
            }))?,
            None,
        )
        .await?;

    let report = ReportFactory::new(ctx.clone())
        .create(
            fields(json!({
                "status": "complete",
                "strategy": "mobile",
                "performance_score": 78.5,
                "seo_score": 92,
                "page_count": 2,
            }))?,
            None,
        )
        .await?;

    let pages = PageFactory::new(ctx.clone());
    let insights = InsightFactory::new(ctx.clone());
    for (url, is_homepage, lcp) in [
        ("https://example.com/", true, 2450.0),
        ("https://example.com/shop/", false, 3900.0),
    ] {
        let page = pages
            .create(
                fields(json!({"url": url, "is_homepage": is_homepage, "largest_contentful_paint": lcp}))?,
                Some(report.as_model()),
            )
            .await?;

        if lcp > 2500.0 {
            insights
                .create(
                    fields(json!({
                        "type": "largest-contentful-paint",
                        "severity": "warning",
                        "title": "Slow Largest Contentful Paint",
                        "metric": "largest_contentful_paint",
                        "metric_value": lcp,
                    }))?,
                    Some(page.as_model()),
                )
                .await?;
        }
    }
    tracing::info!(records = store.len(), "Sample data ready");

    let Some(latest) = ReportQuery::new(ctx.clone()).get_most_recent().await? else {
        anyhow::bail!("no report found after seeding");
    };

    let mut page_output = Vec::new();
    for page in latest.pages(QueryParams::new().order_by("slug").ascending()).await? {
        let page_insights: Vec<Value> = page
            .insights(QueryParams::new())
            .await?
            .iter()
            .map(|insight| describe(insight.as_model()))
            .collect();
        let mut entry = describe(page.as_model());
        entry["insights"] = Value::Array(page_insights);
        page_output.push(entry);
    }

    let changes: Vec<Value> = SiteChangeQuery::new(ctx.clone())
        .query(QueryParams::new())
        .await?
        .iter()
        .map(|change| json!({"slug": change.as_model().slug(), "label": change.label()}))
        .collect();

    let mut output = describe(latest.as_model());
    output["status"] = json!(latest.status().to_string());
    output["pages"] = Value::Array(page_output);
    output["site_changes"] = Value::Array(changes);

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
