//! Configuration for the data-access layer

use crate::models::time::SiteCalendar;
use crate::services::DataError;
use chrono::FixedOffset;
use serde::{Deserialize, Serialize};

/// Largest UTC offset a site time zone may have (±14 hours)
const MAX_UTC_OFFSET_MINUTES: i32 = 14 * 60;

/// Settings shared by the read API and the data-access layer
///
/// Loaded once at startup and shared behind an `Arc`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataLayerConfig {
    /// Site reference time zone as minutes east of UTC
    ///
    /// Record ages and report slug dates are computed on this calendar.
    pub utc_offset_minutes: i32,

    /// Page size for collection reads that do not pass `per_page`
    pub default_page_size: u32,

    /// Largest accepted `per_page`
    pub max_page_size: u32,
}

impl Default for DataLayerConfig {
    fn default() -> Self {
        Self {
            utc_offset_minutes: 0,
            default_page_size: 10,
            max_page_size: 100,
        }
    }
}

impl DataLayerConfig {
    /// Parse and validate a JSON configuration document
    ///
    /// Missing keys take their default values.
    pub fn from_json_str(json: &str) -> Result<Self, DataError> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| DataError::configuration(format!("Invalid configuration: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), DataError> {
        if self.utc_offset_minutes.abs() > MAX_UTC_OFFSET_MINUTES {
            return Err(DataError::configuration(format!(
                "utc_offset_minutes must be within ±{} (got {})",
                MAX_UTC_OFFSET_MINUTES, self.utc_offset_minutes
            )));
        }

        if self.default_page_size == 0 {
            return Err(DataError::configuration(
                "default_page_size must be greater than 0",
            ));
        }

        if self.max_page_size < self.default_page_size {
            return Err(DataError::configuration(format!(
                "max_page_size ({}) cannot be smaller than default_page_size ({})",
                self.max_page_size, self.default_page_size
            )));
        }

        Ok(())
    }

    /// Site reference time zone
    pub fn site_offset(&self) -> Result<FixedOffset, DataError> {
        FixedOffset::east_opt(self.utc_offset_minutes * 60).ok_or_else(|| {
            DataError::configuration(format!(
                "utc_offset_minutes out of range: {}",
                self.utc_offset_minutes
            ))
        })
    }

    /// Calendar for day arithmetic in the site time zone
    pub fn site_calendar(&self) -> Result<SiteCalendar, DataError> {
        Ok(SiteCalendar::new(self.site_offset()?))
    }
}
