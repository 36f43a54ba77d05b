//! Performance Monitor Data-Access Layer
//!
//! Typed access to the performance monitor's records (reports, site changes,
//! monitored pages and insights), persisted as generic content-store records.
//!
//! # Architecture
//!
//! - **Write path**: `RecordFactory`/`Model` → `ContentStore`, with every field
//!   stored under the `_perfmon_` prefix
//! - **Read path**: `Model`/`RecordQuery` → `RequestGateway` → public read API,
//!   so internal reads never see more than external readers do
//! - **Injected configuration**: schemas, clock and settings live in a
//!   `DataContext`; nothing is global
//!
//! # Modules
//!
//! - [`models`] - Records, schemas, validation and typed wrappers
//! - [`services`] - Factories, queries, the data context and `DataError`
//! - [`db`] - The `ContentStore` port and the in-memory backend
//! - [`gateway`] - The `RequestGateway` port and loopback adapter
//! - [`api`] - The public record read API
//! - [`config`] - `DataLayerConfig`
//! - [`logging`] - tracing subscriber setup for binaries and tests

pub mod api;
pub mod config;
pub mod db;
pub mod gateway;
pub mod logging;
pub mod models;
pub mod services;

// Re-export commonly used types
pub use config::DataLayerConfig;
pub use models::*;
pub use services::*;
