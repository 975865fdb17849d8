pub mod health;
pub mod oidvp;
pub mod qrcode;

use axum::body::Bytes;
use secrecy::{ExposeSecret, SecretString};
use serde_json::{Map, Value};

use crate::config::UpstreamConfig;
use crate::server::errors::AppError;

/// Resolves `{api_base}{path}` and the access token, failing before any
/// network activity when either is missing.
fn upstream_target(config: &UpstreamConfig, path: &str) -> Result<(String, SecretString), AppError> {
    let base = config
        .api_base
        .as_deref()
        .filter(|base| !base.trim().is_empty())
        .ok_or(AppError::Misconfigured("upstream.api_base"))?;
    let token = config
        .access_token
        .as_ref()
        .filter(|token| !token.expose_secret().is_empty())
        .ok_or(AppError::Misconfigured("upstream.access_token"))?;

    let url = format!("{}{path}", base.trim_end_matches('/'));
    Ok((url, SecretString::from(token.expose_secret())))
}

/// Unparseable client JSON is handled as an empty object.
fn json_or_empty(body: &Bytes) -> Value {
    if body.is_empty() {
        return Value::Object(Map::new());
    }
    serde_json::from_slice(body).unwrap_or_else(|e| {
        tracing::warn!("Malformed client JSON treated as empty body: {e}");
        Value::Object(Map::new())
    })
}
