//! Type-Safe Page Wrapper
//!
//! A monitored URL measured as part of a report. Its parent is the report;
//! insights about the page use the page as their parent.

use crate::models::{Insight, Model, RecordType, Report, TypedRecord};
use crate::services::{DataError, InsightQuery, QueryParams};

/// A monitored page
#[derive(Debug, Clone)]
pub struct Page {
    model: Model,
}

impl TypedRecord for Page {
    const RECORD_TYPE: RecordType = RecordType::Page;

    fn wrap(model: Model) -> Self {
        Self { model }
    }

    fn as_model(&self) -> &Model {
        &self.model
    }

    fn as_model_mut(&mut self) -> &mut Model {
        &mut self.model
    }

    fn into_model(self) -> Model {
        self.model
    }
}

impl Page {
    /// Page URL (required by the schema, empty only for corrupt records)
    pub fn url(&self) -> &str {
        self.model.get_str("url").unwrap_or_default()
    }

    pub fn title(&self) -> Option<&str> {
        self.model.get_str("title")
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.model.set("title", title.into());
    }

    pub fn is_homepage(&self) -> bool {
        self.model.get_bool("is_homepage").unwrap_or(false)
    }

    pub fn http_status(&self) -> Option<i64> {
        self.model.get_i64("http_status")
    }

    pub fn performance_score(&self) -> Option<f64> {
        self.model.get_f64("performance_score")
    }

    /// Largest Contentful Paint in milliseconds
    pub fn largest_contentful_paint(&self) -> Option<f64> {
        self.model.get_f64("largest_contentful_paint")
    }

    pub fn cumulative_layout_shift(&self) -> Option<f64> {
        self.model.get_f64("cumulative_layout_shift")
    }

    /// Total Blocking Time in milliseconds
    pub fn total_blocking_time(&self) -> Option<f64> {
        self.model.get_f64("total_blocking_time")
    }

    /// The report this page belongs to, if it still exists
    pub async fn report(&self) -> Result<Option<Report>, DataError> {
        self.model
            .parent_as(RecordType::Report)
            .await?
            .map(Report::from_model)
            .transpose()
    }

    /// Insights about this page
    pub async fn insights(&self, params: QueryParams) -> Result<Vec<Insight>, DataError> {
        let id = self
            .model
            .id()
            .ok_or_else(|| DataError::deleted(RecordType::Page))?;
        InsightQuery::new(self.model.context().clone())
            .get_by_parent(id, params)
            .await
    }
}
