//! Data Context
//!
//! The injected collaborators every factory, model and query works with:
//! the write-side `ContentStore`, the read-side `RequestGateway`, the schema
//! registry, the clock and the layer configuration. Built once, cloned freely
//! (everything is behind an `Arc`).
//!
//! # Examples
//!
//! ```rust
//! use perfmon_core::models::TypedRecord;
//! use perfmon_core::services::{DataContext, ReportFactory};
//! use serde_json::json;
//!
//! # tokio_test::block_on(async {
//! let (ctx, _store) = DataContext::in_memory()?;
//! let fields = serde_json::from_value(json!({"status": "pending"})).unwrap_or_default();
//! let report = ReportFactory::new(ctx).create(fields, None).await?;
//! assert!(report.as_model().slug().starts_with("report-"));
//! # Ok::<(), perfmon_core::services::DataError>(())
//! # });
//! ```

use crate::api::RecordApi;
use crate::config::DataLayerConfig;
use crate::db::{ContentStore, MemoryStore};
use crate::gateway::{LoopbackGateway, RequestGateway};
use crate::models::time::{SiteCalendar, SystemTimeProvider, TimeProvider};
use crate::models::{SchemaRegistry, SchemaValidator};
use crate::services::DataError;
use std::fmt;
use std::sync::Arc;

/// Shared collaborators of the data-access layer
#[derive(Clone)]
pub struct DataContext {
    store: Arc<dyn ContentStore>,
    gateway: Arc<dyn RequestGateway>,
    registry: Arc<SchemaRegistry>,
    clock: Arc<dyn TimeProvider>,
    config: Arc<DataLayerConfig>,
    calendar: SiteCalendar,
}

impl DataContext {
    /// Context on the system clock with the default configuration
    pub fn new(
        store: Arc<dyn ContentStore>,
        gateway: Arc<dyn RequestGateway>,
        registry: Arc<SchemaRegistry>,
    ) -> Self {
        Self {
            store,
            gateway,
            registry,
            clock: Arc::new(SystemTimeProvider),
            config: Arc::new(DataLayerConfig::default()),
            calendar: SiteCalendar::default(),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn TimeProvider>) -> Self {
        self.clock = clock;
        self
    }

    /// Replace the configuration
    ///
    /// # Errors
    ///
    /// `DataError::Configuration` if `config` does not validate.
    pub fn with_config(mut self, config: Arc<DataLayerConfig>) -> Result<Self, DataError> {
        config.validate()?;
        self.calendar = config.site_calendar()?;
        self.config = config;
        Ok(self)
    }

    /// Self-contained context over a fresh `MemoryStore`, read back through
    /// the loopback gateway, with the built-in schemas
    pub fn in_memory() -> Result<(Self, Arc<MemoryStore>), DataError> {
        Self::in_memory_with(
            Arc::new(SchemaRegistry::builtin()),
            DataLayerConfig::default(),
            Arc::new(SystemTimeProvider),
        )
    }

    /// Like `in_memory`, with explicit schemas, configuration and clock
    ///
    /// The store and the context share `clock`, so creation timestamps and
    /// "now" agree.
    pub fn in_memory_with(
        registry: Arc<SchemaRegistry>,
        config: DataLayerConfig,
        clock: Arc<dyn TimeProvider>,
    ) -> Result<(Self, Arc<MemoryStore>), DataError> {
        config.validate()?;
        let calendar = config.site_calendar()?;
        let config = Arc::new(config);
        let store = Arc::new(MemoryStore::with_clock(clock.clone()));
        let api = RecordApi::new(store.clone(), registry.clone(), config.clone())?;
        let gateway = LoopbackGateway::new(Arc::new(api));

        let ctx = Self {
            store: store.clone(),
            gateway: Arc::new(gateway),
            registry,
            clock,
            config,
            calendar,
        };
        Ok((ctx, store))
    }

    pub fn store(&self) -> &dyn ContentStore {
        self.store.as_ref()
    }

    pub fn gateway(&self) -> &dyn RequestGateway {
        self.gateway.as_ref()
    }

    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    pub fn clock(&self) -> &dyn TimeProvider {
        self.clock.as_ref()
    }

    pub fn config(&self) -> &DataLayerConfig {
        &self.config
    }

    /// Validator over this context's registry
    pub fn validator(&self) -> SchemaValidator {
        SchemaValidator::new(self.registry.clone())
    }

    /// Calendar of the configured site time zone
    pub fn calendar(&self) -> SiteCalendar {
        self.calendar
    }
}

impl fmt::Debug for DataContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataContext")
            .field("registry", &self.registry.record_types().collect::<Vec<_>>())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
