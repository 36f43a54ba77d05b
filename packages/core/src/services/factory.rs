//! Record Factories
//!
//! The only way records come into existence: validate the candidate fields,
//! derive the human-readable slug, persist through the `ContentStore`, then
//! hydrate the result by reading it back through the request gateway.
//!
//! # Slug Rules
//!
//! | Type | Slug |
//! |---|---|
//! | report | `report-{YYYY-MM-DD}` (today on the site calendar) |
//! | site_change | `site-change-{object_type}-{action}`, unset parts → `unknown` |
//! | page | `monitored-page` |
//! | insight | the insight `type`, else `generic-insight` |
//!
//! The store keeps slugs unique per type by appending `-2`, `-3`, ...

use crate::db::StoreAttributes;
use crate::models::{
    meta_keys, FieldMap, Insight, Model, Page, RecordType, Report, SiteChange, TypedRecord,
};
use crate::services::{DataContext, DataError};
use chrono::NaiveDate;
use regex::Regex;
use serde_json::Value;
use std::collections::BTreeMap;
use std::marker::PhantomData;
use std::sync::OnceLock;
use tracing::info;

/// Runs of characters that may not appear in a slug
const NON_SLUG_PATTERN: &str = r"[^a-z0-9]+";

/// Store attribute holding a page's canonical URL
pub const CANONICAL_URL_ATTRIBUTE: &str = "canonical_url";

/// Lowercase `text` and collapse every run of non-alphanumerics into `-`
///
/// # Examples
///
/// ```
/// # use perfmon_core::services::factory::slugify;
/// assert_eq!(slugify("Yoast SEO"), "yoast-seo");
/// assert_eq!(slugify("  --core__update-- "), "core-update");
/// ```
pub fn slugify(text: &str) -> String {
    static NON_SLUG: OnceLock<Regex> = OnceLock::new();
    let non_slug = NON_SLUG.get_or_init(|| Regex::new(NON_SLUG_PATTERN).expect("slug pattern is valid"));

    non_slug
        .replace_all(&text.to_lowercase(), "-")
        .trim_matches('-')
        .to_string()
}

/// Slug for a new record of `record_type` created on `today`
pub fn slug_for(record_type: RecordType, fields: &FieldMap, today: NaiveDate) -> String {
    let part = |name: &str| {
        fields
            .get(name)
            .and_then(Value::as_str)
            .map(slugify)
            .filter(|s| !s.is_empty())
    };

    match record_type {
        RecordType::Report => format!("report-{}", today.format("%Y-%m-%d")),
        RecordType::SiteChange => format!(
            "site-change-{}-{}",
            part("object_type").unwrap_or_else(|| "unknown".to_string()),
            part("action").unwrap_or_else(|| "unknown".to_string()),
        ),
        RecordType::Page => "monitored-page".to_string(),
        RecordType::Insight => part("type").unwrap_or_else(|| "generic-insight".to_string()),
    }
}

/// Type-specific store attributes beyond slug and parent
fn extra_attributes(record_type: RecordType, fields: &FieldMap) -> BTreeMap<String, Value> {
    let mut extra = BTreeMap::new();
    if record_type == RecordType::Page {
        if let Some(url) = fields.get("url") {
            extra.insert(CANONICAL_URL_ATTRIBUTE.to_string(), url.clone());
        }
    }
    extra
}

/// Creates records of one record type
pub struct RecordFactory<T: TypedRecord> {
    ctx: DataContext,
    _marker: PhantomData<fn() -> T>,
}

impl<T: TypedRecord> RecordFactory<T> {
    pub fn new(ctx: DataContext) -> Self {
        Self {
            ctx,
            _marker: PhantomData,
        }
    }

    /// Slug a record created now with `fields` would get (before the store
    /// makes it unique)
    pub fn slug_for(&self, fields: &FieldMap) -> String {
        let today = self.ctx.calendar().date_of(self.ctx.clock().now());
        slug_for(T::RECORD_TYPE, fields, today)
    }

    /// Validate, persist and hydrate a new record
    ///
    /// # Errors
    ///
    /// - `DataError::Validation` with every violation if `fields` break the schema
    /// - `DataError::InvalidParent` if `parent` has been deleted
    /// - `DataError::Persistence` if the store rejects the create (nothing is written)
    /// - read-path errors while hydrating the new record
    pub async fn create(&self, fields: FieldMap, parent: Option<&Model>) -> Result<T, DataError> {
        let record_type = T::RECORD_TYPE;
        self.ctx.validator().check(record_type, &fields)?;

        let slug = self.slug_for(&fields);
        let mut attributes = StoreAttributes::new().with_slug(slug.clone());
        if let Some(parent) = parent {
            let parent_id = parent.id().ok_or_else(|| {
                DataError::invalid_parent(format!(
                    "{} parent has been deleted",
                    parent.record_type()
                ))
            })?;
            attributes = attributes.with_parent_id(parent_id);
        }
        for (key, value) in extra_attributes(record_type, &fields) {
            attributes = attributes.with_extra(key, value);
        }

        let id = self
            .ctx
            .store()
            .create(record_type, meta_keys::add_prefix(&fields), attributes)
            .await
            .map_err(|e| DataError::from_store(&format!("Failed to create {}", record_type), e))?;

        info!(%record_type, %id, %slug, "record created");
        T::from_model(Model::load(&self.ctx, record_type, &id).await?)
    }
}

pub type ReportFactory = RecordFactory<Report>;
pub type SiteChangeFactory = RecordFactory<SiteChange>;
pub type PageFactory = RecordFactory<Page>;
pub type InsightFactory = RecordFactory<Insight>;
