//! Internal Request Gateway
//!
//! The read path of the data-access layer. Every record a `Model` or
//! `RecordQuery` sees arrives as the response to a described request against
//! the same surface external API clients use, so internal reads can never see
//! more than an external reader would.
//!
//! # Architecture
//!
//! - `RequestGateway` is the port the data-access layer depends on
//! - `LoopbackGateway` is the adapter that dispatches into `api::RecordApi`
//!   in-process
//! - Tests substitute their own gateway to check visibility handling
//!
//! # Examples
//!
//! ```rust
//! use perfmon_core::gateway::{GatewayRequest, RequestMethod};
//! use perfmon_core::models::RecordType;
//!
//! let request = GatewayRequest::item(RecordType::Page, "abc");
//! assert_eq!(request.path, "page/abc");
//! assert_eq!(request.method, RequestMethod::Get);
//! ```

mod loopback;

pub use loopback::LoopbackGateway;

use crate::models::RecordType;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

/// Request method of a described read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RequestMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl RequestMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for RequestMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A described request: resource path, method and parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatewayRequest {
    /// `"{type}"` for collections, `"{type}/{id}"` for single items
    pub path: String,
    pub method: RequestMethod,
    #[serde(default)]
    pub params: Map<String, Value>,
}

impl GatewayRequest {
    /// GET request for an arbitrary path
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            method: RequestMethod::Get,
            params: Map::new(),
        }
    }

    /// Single-item read
    pub fn item(record_type: RecordType, id: &str) -> Self {
        Self::get(format!("{}/{}", record_type.as_str(), id))
    }

    /// Collection read
    pub fn collection(record_type: RecordType) -> Self {
        Self::get(record_type.as_str())
    }

    pub fn with_method(mut self, method: RequestMethod) -> Self {
        self.method = method;
        self
    }

    pub fn with_params(mut self, params: Map<String, Value>) -> Self {
        self.params = params;
        self
    }
}

/// Decoded response body plus response metadata
#[derive(Debug, Clone, PartialEq)]
pub struct GatewayResponse {
    pub status: u16,
    pub body: Value,
    pub headers: HashMap<String, String>,
}

impl GatewayResponse {
    pub fn new(status: u16, body: Value) -> Self {
        Self {
            status,
            body,
            headers: HashMap::new(),
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Whether the status is in the 2xx range
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// `(code, message)` of an error body, with fallbacks for bodies that
    /// do not follow the error shape
    pub fn error_parts(&self) -> (String, String) {
        let code = self
            .body
            .get("code")
            .and_then(Value::as_str)
            .unwrap_or("unknown_error")
            .to_string();
        let message = self
            .body
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| format!("request failed with status {}", self.status));
        (code, message)
    }
}

/// Gateway failures (the request could not be performed or understood)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Failed to decode response: {0}")]
    Decode(String),
}

impl GatewayError {
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }
}

/// Performs described read requests
///
/// A response with an error status is still `Ok`; `Err` means the request
/// never produced a response.
#[async_trait]
pub trait RequestGateway: Send + Sync {
    async fn request(&self, request: GatewayRequest) -> Result<GatewayResponse, GatewayError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_paths() {
        assert_eq!(GatewayRequest::collection(RecordType::SiteChange).path, "site_change");
        assert_eq!(GatewayRequest::item(RecordType::Insight, "42").path, "insight/42");
    }

    #[test]
    fn test_error_parts_reads_error_body() {
        let response = GatewayResponse::new(
            400,
            json!({"code": "invalid_param", "message": "bad page", "data": {"status": 400}}),
        );
        assert!(!response.is_success());
        assert_eq!(
            response.error_parts(),
            ("invalid_param".to_string(), "bad page".to_string())
        );
    }

    #[test]
    fn test_error_parts_falls_back_for_foreign_bodies() {
        let response = GatewayResponse::new(502, json!("upstream exploded"));
        let (code, message) = response.error_parts();
        assert_eq!(code, "unknown_error");
        assert!(message.contains("502"));
    }
}
