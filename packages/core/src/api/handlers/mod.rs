//! Read API Handlers
//!
//! One handler per route shape. Handlers return `Result<ApiResponse, ApiError>`
//! and leave error rendering to the router.

pub mod records;
