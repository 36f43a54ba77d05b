//! Type-Safe SiteChange Wrapper
//!
//! A logged change to the site (plugin activated, theme switched, core
//! updated) that may explain a shift between two reports.

use crate::models::{Model, RecordType, TypedRecord};

/// A logged site change
#[derive(Debug, Clone)]
pub struct SiteChange {
    model: Model,
}

impl TypedRecord for SiteChange {
    const RECORD_TYPE: RecordType = RecordType::SiteChange;

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

impl SiteChange {
    /// What kind of thing changed (`plugin`, `theme`, `core`, ...)
    pub fn object_type(&self) -> Option<&str> {
        self.model.get_str("object_type")
    }

    /// What happened to it (`activate`, `update`, ...)
    pub fn action(&self) -> Option<&str> {
        self.model.get_str("action")
    }

    pub fn object_name(&self) -> Option<&str> {
        self.model.get_str("object_name")
    }

    pub fn previous_version(&self) -> Option<&str> {
        self.model.get_str("previous_version")
    }

    pub fn new_version(&self) -> Option<&str> {
        self.model.get_str("new_version")
    }

    pub fn user_id(&self) -> Option<i64> {
        self.model.get_i64("user_id")
    }

    /// One-line description, e.g. `plugin Akismet: update (5.2 -> 5.3)`
    pub fn label(&self) -> String {
        let object = match (self.object_type(), self.object_name()) {
            (Some(kind), Some(name)) => format!("{} {}", kind, name),
            (Some(kind), None) => kind.to_string(),
            (None, Some(name)) => name.to_string(),
            (None, None) => "unknown".to_string(),
        };
        let mut label = format!("{}: {}", object, self.action().unwrap_or("unknown"));

        match (self.previous_version(), self.new_version()) {
            (Some(from), Some(to)) => label.push_str(&format!(" ({} -> {})", from, to)),
            (None, Some(to)) => label.push_str(&format!(" ({})", to)),
            _ => {}
        }
        label
    }
}
