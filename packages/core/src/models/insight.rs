//! Type-Safe Insight Wrapper
//!
//! A finding about a page (or a whole report): what is wrong, how bad it is,
//! and what to do about it.

use crate::models::{Model, Page, RecordType, TypedRecord};
use crate::services::DataError;
use serde_json::json;
use std::str::FromStr;

/// How urgent an insight is
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Info,
    Notice,
    Warning,
    Critical,
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "info" => Ok(Self::Info),
            "notice" => Ok(Self::Notice),
            "warning" => Ok(Self::Warning),
            "critical" => Ok(Self::Critical),
            _ => Err(format!("Invalid severity: {}", s)),
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Notice => write!(f, "notice"),
            Self::Warning => write!(f, "warning"),
            Self::Critical => write!(f, "critical"),
        }
    }
}

/// A performance insight
#[derive(Debug, Clone)]
pub struct Insight {
    model: Model,
}

impl TypedRecord for Insight {
    const RECORD_TYPE: RecordType = RecordType::Insight;

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

impl Insight {
    /// Insight category (`security`, `images`, ...)
    pub fn insight_type(&self) -> Option<&str> {
        self.model.get_str("type")
    }

    /// Severity, `Info` if missing or unrecognised
    pub fn severity(&self) -> Severity {
        self.model
            .get_str("severity")
            .and_then(|s| s.parse().ok())
            .unwrap_or(Severity::Info)
    }

    pub fn set_severity(&mut self, severity: Severity) {
        self.model.set("severity", json!(severity.to_string()));
    }

    pub fn title(&self) -> Option<&str> {
        self.model.get_str("title")
    }

    pub fn description(&self) -> Option<&str> {
        self.model.get_str("description")
    }

    pub fn recommendation(&self) -> Option<&str> {
        self.model.get_str("recommendation")
    }

    /// Name of the metric the insight is about, with its measured value
    pub fn metric(&self) -> Option<(&str, Option<f64>)> {
        self.model
            .get_str("metric")
            .map(|name| (name, self.model.get_f64("metric_value")))
    }

    pub fn is_dismissed(&self) -> bool {
        self.model.get_bool("dismissed").unwrap_or(false)
    }

    /// Mark the insight dismissed and save it
    pub async fn dismiss(&mut self) -> Result<(), DataError> {
        self.model.set("dismissed", true);
        self.model.save().await
    }

    /// The page this insight is about; `None` for report-level insights
    pub async fn page(&self) -> Result<Option<Page>, DataError> {
        self.model
            .parent_as(RecordType::Page)
            .await?
            .map(Page::from_model)
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Critical > Severity::Warning);
        assert!(Severity::Notice > Severity::Info);
        assert_eq!("warning".parse::<Severity>(), Ok(Severity::Warning));
        assert!("fatal".parse::<Severity>().is_err());
    }

    #[tokio::test]
    async fn test_dismiss_persists() {
        use crate::services::{DataContext, InsightFactory, InsightQuery};

        let (ctx, _store) = DataContext::in_memory().unwrap();
        let fields = json!({"type": "images", "severity": "warning"})
            .as_object()
            .cloned()
            .unwrap();
        let mut insight = InsightFactory::new(ctx.clone()).create(fields, None).await.unwrap();
        assert!(!insight.is_dismissed());

        insight.dismiss().await.unwrap();
        assert!(insight.is_dismissed());

        let id = insight.as_model().id().unwrap().to_string();
        let reloaded = InsightQuery::new(ctx).get(&id).await.unwrap().unwrap();
        assert!(reloaded.is_dismissed());
        assert_eq!(reloaded.severity(), Severity::Warning);
    }
}
