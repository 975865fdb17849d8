#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    Json, Router,
    body::Bytes,
    extract::Query,
    http::{HeaderMap, Method, StatusCode, header::CONTENT_TYPE},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use secrecy::ExposeSecret;
use serde_json::{Value, json};
use ticket_qr_gateway::{
    adapters::HttpUpstream,
    config::Config,
    domain::ports::{
        ACCESS_TOKEN_HEADER, Upstream, UpstreamError, UpstreamRequest, UpstreamResponse,
    },
    server::Server,
    telemetry,
};

pub const TOKEN: &str = "test-access-token";
pub const PNG_BYTES: &[u8] = &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a, 0x00, 0x7f, 0xff];

/// Complete configuration with the upstream pointing at `api_base`.
pub fn config_with_base(api_base: &str) -> Config {
    config_from(&[
        ("upstream.api_base", api_base),
        ("upstream.access_token", TOKEN),
        ("verification.default_ref", "default-ref"),
        ("verification.default_vc_uid", "default-vc"),
        ("issuance.generic.vc_uid", "ticket_vc"),
        ("issuance.generic.issuance_date", "20250101"),
        ("issuance.generic.expired_date", "20251231"),
        ("issuance.identity_card.vc_uid", "id_card_vc"),
        ("issuance.identity_card.issuance_date", "20250201"),
        ("issuance.identity_card.expired_date", "20260131"),
        ("server.host", "127.0.0.1"),
        ("server.port", "0"),
    ])
}

pub fn config_from(pairs: &[(&str, &str)]) -> Config {
    let vars: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    Config::load_with_sources(Some(vars)).unwrap()
}

#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub method: Method,
    pub url: String,
    pub access_token: String,
    pub body: Option<Value>,
}

#[derive(Debug, Clone)]
enum Reply {
    Respond(UpstreamResponse),
    Fail(String),
}

/// In-process [`Upstream`] that records every call and answers with a canned
/// reply.
#[derive(Debug, Clone)]
pub struct MockUpstream {
    calls: Arc<Mutex<Vec<RecordedCall>>>,
    reply: Reply,
}

impl MockUpstream {
    pub fn responding(status: StatusCode, content_type: &str, body: &[u8]) -> Self {
        Self {
            calls: Arc::default(),
            reply: Reply::Respond(UpstreamResponse {
                status,
                content_type: Some(content_type.to_owned()),
                body: Bytes::copy_from_slice(body),
            }),
        }
    }

    pub fn json(status: StatusCode, body: Value) -> Self {
        Self::responding(status, "application/json", body.to_string().as_bytes())
    }

    pub fn failing(message: &str) -> Self {
        Self {
            calls: Arc::default(),
            reply: Reply::Fail(message.to_owned()),
        }
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Upstream for MockUpstream {
    async fn execute(&self, request: UpstreamRequest) -> Result<UpstreamResponse, UpstreamError> {
        self.calls.lock().unwrap().push(RecordedCall {
            method: request.method,
            url: request.url,
            access_token: request.access_token.expose_secret().to_owned(),
            body: request.body,
        });
        match &self.reply {
            Reply::Respond(response) => Ok(response.clone()),
            Reply::Fail(message) => Err(UpstreamError::Transport(message.clone())),
        }
    }
}

fn token_of(headers: &HeaderMap) -> String {
    headers
        .get(ACCESS_TOKEN_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_owned()
}

/// Stand-in for the upstream verification API. Echoes what it received so
/// tests can assert on the forwarded request.
pub async fn spawn_upstream() -> String {
    async fn qrcode_data(headers: HeaderMap, Json(body): Json<Value>) -> Response {
        Json(json!({"received": body, "token": token_of(&headers)})).into_response()
    }

    async fn oidvp_qrcode(
        headers: HeaderMap,
        Query(query): Query<HashMap<String, String>>,
    ) -> Response {
        match query.get("ref").map(String::as_str) {
            Some("png") => ([(CONTENT_TYPE, "image/png")], PNG_BYTES).into_response(),
            Some("unknown") => {
                (StatusCode::NOT_FOUND, [(CONTENT_TYPE, "text/plain")], "unknown ref").into_response()
            }
            _ => Json(json!({"query": query, "token": token_of(&headers)})).into_response(),
        }
    }

    async fn oidvp_result(headers: HeaderMap, Json(body): Json<Value>) -> Response {
        (
            StatusCode::CREATED,
            Json(json!({"received": body, "token": token_of(&headers)})),
        )
            .into_response()
    }

    let app = Router::new()
        .route("/qrcode/data", post(qrcode_data))
        .route("/oidvp/qrcode", get(oidvp_qrcode))
        .route("/oidvp/result", post(oidvp_result));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("mock upstream failed");
    });

    format!("http://{addr}")
}

/// Spawns the gateway on a random port, wired to a real HTTP upstream.
pub async fn spawn_gateway(config: Config) -> String {
    telemetry::init_tracing();

    let host = config.server.host.clone();
    let upstream = HttpUpstream::new(&config.upstream).unwrap();
    let server = Server::new(config, upstream).await.unwrap();

    let port = server.port().unwrap();
    tokio::spawn(async move {
        server.run().await.expect("failed to run server");
    });

    format!("http://{host}:{port}")
}
