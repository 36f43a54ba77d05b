//! In-process gateway adapter
//!
//! Hands each described request to the public `RecordApi` handler without a
//! network hop. The response is exactly what an external client would get.

use crate::api::{ApiRequest, RecordApi};
use crate::gateway::{GatewayError, GatewayRequest, GatewayResponse, RequestGateway};
use async_trait::async_trait;
use std::sync::Arc;

/// Gateway that calls the read API directly
#[derive(Clone)]
pub struct LoopbackGateway {
    api: Arc<RecordApi>,
}

impl LoopbackGateway {
    pub fn new(api: Arc<RecordApi>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl RequestGateway for LoopbackGateway {
    async fn request(&self, request: GatewayRequest) -> Result<GatewayResponse, GatewayError> {
        let GatewayRequest {
            path,
            method,
            params,
        } = request;

        tracing::debug!(%method, %path, "loopback request");
        let response = self
            .api
            .handle(ApiRequest {
                method,
                path,
                params,
            })
            .await;

        Ok(GatewayResponse {
            status: response.status,
            body: response.body,
            headers: response.headers,
        })
    }
}
