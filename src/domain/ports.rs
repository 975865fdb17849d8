//! Interface the proxy handlers use to reach the upstream verification API.

use async_trait::async_trait;
use axum::body::Bytes;
use axum::http::{Method, StatusCode};
use secrecy::SecretString;
use serde_json::Value;
use thiserror::Error;

/// Header carrying the server-held upstream credential.
pub const ACCESS_TOKEN_HEADER: &str = "Access-Token";

#[derive(Debug)]
pub struct UpstreamRequest {
    pub method: Method,
    pub url: String,
    pub access_token: SecretString,
    pub body: Option<Value>,
}

/// Upstream answer as received, before content negotiation.
#[derive(Debug, Clone)]
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub content_type: Option<String>,
    pub body: Bytes,
}

impl UpstreamResponse {
    pub fn is_json(&self) -> bool {
        self.content_type
            .as_deref()
            .and_then(|ct| ct.split(';').next())
            .is_some_and(|mime| mime.trim().eq_ignore_ascii_case("application/json"))
    }
}

#[derive(Error, Debug)]
pub enum UpstreamError {
    #[error("Failed to build HTTP client: {0}")]
    Client(String),
    #[error("{0}")]
    Transport(String),
}

#[async_trait]
pub trait Upstream: Send + Sync + 'static {
    /// Performs exactly one upstream call. Non-2xx statuses are not errors.
    async fn execute(&self, request: UpstreamRequest) -> Result<UpstreamResponse, UpstreamError>;
}
