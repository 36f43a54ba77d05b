//! Data-Access Services
//!
//! The operations callers use to work with performance records:
//!
//! - `DataContext` - the injected store, gateway, schemas, clock and config
//! - `RecordFactory` - validated creation (`ReportFactory`, `PageFactory`, ...)
//! - `RecordQuery` / `TypedQuery` - reads through the request gateway
//! - `DataError` - the error taxonomy every operation returns
//!
//! Writes go to the `ContentStore` directly; reads always go through the
//! gateway so they see exactly what the public read API exposes.

pub mod context;
pub mod error;
pub mod factory;
pub mod query;

pub use context::DataContext;
pub use error::DataError;
pub use factory::{
    InsightFactory, PageFactory, RecordFactory, ReportFactory, SiteChangeFactory,
};
pub use query::{
    InsightQuery, PageQuery, QueryParams, RecordQuery, ReportQuery, SiteChangeQuery, TypedQuery,
};
