use async_trait::async_trait;
use axum::http::header::CONTENT_TYPE;
use reqwest::Client;
use secrecy::ExposeSecret;
use tracing::{debug, warn};

use crate::config::UpstreamConfig;
use crate::domain::ports::{
    ACCESS_TOKEN_HEADER, Upstream, UpstreamError, UpstreamRequest, UpstreamResponse,
};

/// [`Upstream`] implementation backed by a shared `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpUpstream {
    http_client: Client,
}

impl HttpUpstream {
    pub fn new(config: &UpstreamConfig) -> Result<Self, UpstreamError> {
        let http_client = Client::builder()
            .timeout(config.timeout())
            .user_agent(concat!("ticket-qr-gateway/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| UpstreamError::Client(e.to_string()))?;

        Ok(Self { http_client })
    }
}

#[async_trait]
impl Upstream for HttpUpstream {
    async fn execute(&self, request: UpstreamRequest) -> Result<UpstreamResponse, UpstreamError> {
        debug!(method = %request.method, url = %request.url, "Forwarding request upstream");

        let mut builder = self
            .http_client
            .request(request.method, &request.url)
            .header(ACCESS_TOKEN_HEADER, request.access_token.expose_secret());
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|e| {
            warn!("Upstream request to {} failed: {e}", request.url);
            UpstreamError::Transport(e.to_string())
        })?;

        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        let body = response.bytes().await.map_err(|e| {
            warn!("Failed to read upstream response body: {e}");
            UpstreamError::Transport(e.to_string())
        })?;

        debug!(%status, content_type = ?content_type, len = body.len(), "Upstream responded");

        Ok(UpstreamResponse {
            status,
            content_type,
            body,
        })
    }
}
