//! Public Record Read API
//!
//! The request surface external clients read performance records through.
//! The data-access layer reads through exactly this surface as well (via
//! `gateway::LoopbackGateway`), so both see the same fields.
//!
//! # Routes
//!
//! - `GET {type}` - filtered, ordered, paginated collection
//! - `GET {type}/{id}` - single record
//!
//! `{type}` is one of `report`, `site_change`, `page`, `insight`.

pub mod handlers;
pub mod router;
pub mod types;

pub use router::RecordApi;
pub use types::{ApiError, ApiRequest, ApiResponse, TOTAL_COUNT_HEADER, TOTAL_PAGES_HEADER};
