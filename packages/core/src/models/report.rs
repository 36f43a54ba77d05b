//! Type-Safe Report Wrapper
//!
//! A report is one performance run over the site. Pages and insights hang
//! off it by parent reference.
//!
//! # Examples
//!
//! ```rust
//! use perfmon_core::models::{ReportStatus, Strategy};
//!
//! let status: ReportStatus = "running".parse()?;
//! assert_eq!(status, ReportStatus::Running);
//! assert_eq!(Strategy::Desktop.to_string(), "desktop");
//! # Ok::<(), String>(())
//! ```

use crate::models::{Insight, Model, Page, RecordType, TypedRecord};
use crate::services::{DataError, InsightQuery, PageQuery, QueryParams};
use serde_json::json;
use std::str::FromStr;

/// Report lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportStatus {
    /// Queued, not started (default)
    Pending,
    Running,
    Complete,
    Failed,
}

impl FromStr for ReportStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "running" => Ok(Self::Running),
            "complete" => Ok(Self::Complete),
            "failed" => Ok(Self::Failed),
            _ => Err(format!("Invalid report status: {}", s)),
        }
    }
}

impl std::fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Running => write!(f, "running"),
            Self::Complete => write!(f, "complete"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// Device profile a report was measured with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Mobile,
    Desktop,
}

impl FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mobile" => Ok(Self::Mobile),
            "desktop" => Ok(Self::Desktop),
            _ => Err(format!("Invalid strategy: {}", s)),
        }
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Mobile => write!(f, "mobile"),
            Self::Desktop => write!(f, "desktop"),
        }
    }
}

/// A performance report
#[derive(Debug, Clone)]
pub struct Report {
    model: Model,
}

impl TypedRecord for Report {
    const RECORD_TYPE: RecordType = RecordType::Report;

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

impl Report {
    /// Status, `Pending` if missing or unrecognised
    pub fn status(&self) -> ReportStatus {
        self.model
            .get_str("status")
            .and_then(|s| s.parse().ok())
            .unwrap_or(ReportStatus::Pending)
    }

    pub fn set_status(&mut self, status: ReportStatus) {
        self.model.set("status", json!(status.to_string()));
    }

    pub fn is_complete(&self) -> bool {
        self.status() == ReportStatus::Complete
    }

    pub fn strategy(&self) -> Option<Strategy> {
        self.model.get_str("strategy").and_then(|s| s.parse().ok())
    }

    pub fn set_strategy(&mut self, strategy: Strategy) {
        self.model.set("strategy", json!(strategy.to_string()));
    }

    /// Lighthouse-style performance score (0-100)
    pub fn performance_score(&self) -> Option<f64> {
        self.model.get_f64("performance_score")
    }

    pub fn set_performance_score(&mut self, score: f64) {
        self.model.set("performance_score", score);
    }

    pub fn accessibility_score(&self) -> Option<f64> {
        self.model.get_f64("accessibility_score")
    }

    pub fn best_practices_score(&self) -> Option<f64> {
        self.model.get_f64("best_practices_score")
    }

    pub fn seo_score(&self) -> Option<f64> {
        self.model.get_f64("seo_score")
    }

    pub fn page_count(&self) -> Option<i64> {
        self.model.get_i64("page_count")
    }

    pub fn summary(&self) -> Option<&str> {
        self.model.get_str("summary")
    }

    pub fn set_summary(&mut self, summary: impl Into<String>) {
        self.model.set("summary", summary.into());
    }

    /// Pages measured in this report
    pub async fn pages(&self, params: QueryParams) -> Result<Vec<Page>, DataError> {
        let id = self.require_id()?;
        PageQuery::new(self.model.context().clone())
            .get_by_parent(id, params)
            .await
    }

    /// Insights attached directly to this report
    pub async fn insights(&self, params: QueryParams) -> Result<Vec<Insight>, DataError> {
        let id = self.require_id()?;
        InsightQuery::new(self.model.context().clone())
            .get_by_parent(id, params)
            .await
    }

    fn require_id(&self) -> Result<&str, DataError> {
        self.model
            .id()
            .ok_or_else(|| DataError::deleted(RecordType::Report))
    }
}
