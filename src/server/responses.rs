use axum::{
    Json,
    http::{HeaderValue, header::CONTENT_TYPE},
    response::{IntoResponse, Response},
};
use serde_json::Value;

use crate::domain::ports::UpstreamResponse;

const OPAQUE_CONTENT_TYPE: &str = "application/octet-stream";

/// Relays an upstream answer to the browser with the same status code.
///
/// JSON bodies are parsed and re-serialized; anything else, including a JSON
/// content type whose body does not parse, is passed through byte for byte
/// under the upstream `Content-Type`.
pub struct ProxyResponse(pub UpstreamResponse);

impl IntoResponse for ProxyResponse {
    fn into_response(self) -> Response {
        let upstream = self.0;

        if upstream.is_json() {
            match serde_json::from_slice::<Value>(&upstream.body) {
                Ok(value) => return (upstream.status, Json(value)).into_response(),
                Err(e) => tracing::warn!("Upstream sent invalid JSON, passing through raw: {e}"),
            }
        }

        let content_type = upstream
            .content_type
            .as_deref()
            .and_then(|ct| HeaderValue::from_str(ct).ok())
            .unwrap_or_else(|| HeaderValue::from_static(OPAQUE_CONTENT_TYPE));

        (upstream.status, [(CONTENT_TYPE, content_type)], upstream.body).into_response()
    }
}
