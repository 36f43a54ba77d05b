//! Read API Request/Response Types
//!
//! Request and response shapes of the public record API, and its error body:
//!
//! ```json
//! { "code": "not_found", "message": "No page with id abc", "data": { "status": 404 } }
//! ```

use crate::gateway::RequestMethod;
use crate::models::RecordType;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::collections::HashMap;

/// Matching records before paging
pub const TOTAL_COUNT_HEADER: &str = "X-Total-Count";
/// Number of pages at the requested page size
pub const TOTAL_PAGES_HEADER: &str = "X-Total-Pages";

// Error codes
pub const NO_ROUTE: &str = "no_route";
pub const NOT_FOUND: &str = "not_found";
pub const INVALID_PARAM: &str = "invalid_param";
pub const METHOD_NOT_ALLOWED: &str = "method_not_allowed";
pub const INTERNAL_ERROR: &str = "internal_error";

/// One incoming API request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiRequest {
    pub method: RequestMethod,
    pub path: String,
    #[serde(default)]
    pub params: Map<String, Value>,
}

impl ApiRequest {
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: RequestMethod::Get,
            path: path.into(),
            params: Map::new(),
        }
    }

    pub fn with_param(mut self, name: impl Into<String>, value: Value) -> Self {
        self.params.insert(name.into(), value);
        self
    }
}

/// One API response
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Value,
    pub headers: HashMap<String, String>,
}

impl ApiResponse {
    /// 200 response with a JSON body
    pub fn ok(body: Value) -> Self {
        Self {
            status: 200,
            body,
            headers: HashMap::new(),
        }
    }

    pub fn with_header(mut self, name: &str, value: impl ToString) -> Self {
        self.headers.insert(name.to_string(), value.to_string());
        self
    }
}

impl From<ApiError> for ApiResponse {
    fn from(error: ApiError) -> Self {
        Self {
            status: error.status,
            body: error.to_body(),
            headers: HashMap::new(),
        }
    }
}

/// API error with its HTTP status
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub code: String,
    pub message: String,
    pub status: u16,
}

impl ApiError {
    pub fn new(code: &str, message: impl Into<String>, status: u16) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
            status,
        }
    }

    pub fn no_route(path: &str) -> Self {
        Self::new(NO_ROUTE, format!("No route matches '{}'", path), 404)
    }

    pub fn not_found(record_type: RecordType, id: &str) -> Self {
        Self::new(NOT_FOUND, format!("No {} with id {}", record_type, id), 404)
    }

    pub fn invalid_param(name: &str, reason: impl std::fmt::Display) -> Self {
        Self::new(INVALID_PARAM, format!("Invalid parameter '{}': {}", name, reason), 400)
    }

    pub fn method_not_allowed(method: RequestMethod) -> Self {
        Self::new(
            METHOD_NOT_ALLOWED,
            format!("Method {} is not allowed on this resource", method),
            405,
        )
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(INTERNAL_ERROR, message, 500)
    }

    /// Error body as sent on the wire
    pub fn to_body(&self) -> Value {
        json!({
            "code": self.code,
            "message": self.message,
            "data": { "status": self.status }
        })
    }
}
