pub mod errors;
pub mod handlers;
pub mod responses;

use std::sync::Arc;

use axum::{
    Router,
    extract::Request,
    http::{Method, StatusCode},
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
};
use color_eyre::eyre::{Result, WrapErr};
use tokio::net::TcpListener;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::Config;
use crate::domain::ports::Upstream;
use handlers::{health::health_check, oidvp, qrcode};

/// Shared, read-only state handed to every handler.
pub struct AppState<U: Upstream> {
    pub config: Arc<Config>,
    pub upstream: Arc<U>,
}

impl<U: Upstream> AppState<U> {
    pub fn new(config: Config, upstream: U) -> Self {
        Self {
            config: Arc::new(config),
            upstream: Arc::new(upstream),
        }
    }
}

impl<U: Upstream> Clone for AppState<U> {
    fn clone(&self) -> Self {
        Self {
            config: Arc::clone(&self.config),
            upstream: Arc::clone(&self.upstream),
        }
    }
}

/// Builds the gateway router: the three proxy routes under `/api` plus
/// `/health`.
pub fn router<U: Upstream>(state: AppState<U>) -> Router {
    let trace_layer = TraceLayer::new_for_http().make_span_with(|request: &Request| {
        let uri = request.uri().to_string();
        tracing::info_span!("request", method = %request.method(), uri)
    });

    let cors_layer = CorsLayer::new()
        .allow_origin(Any)
        .allow_headers(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS]);

    let api = Router::new()
        .route("/api/qrcode/data", post(qrcode::qrcode_data::<U>))
        .route("/api/oidvp/qrcode", get(oidvp::poll_qrcode::<U>))
        .route("/api/oidvp/result", post(oidvp::submit_result::<U>))
        .layer(cors_layer)
        .layer(middleware::from_fn(preflight_no_content));

    Router::new()
        .route("/health", get(health_check))
        .merge(api)
        .layer(trace_layer)
        .with_state(state)
}

/// The CORS layer answers every `OPTIONS` request on the API routes, with or
/// without an `Origin`, using 200. Those answers go out as an empty 204.
async fn preflight_no_content(request: Request, next: Next) -> Response {
    let is_options = request.method() == Method::OPTIONS;
    let mut response = next.run(request).await;
    if is_options && response.status() == StatusCode::OK {
        *response.status_mut() = StatusCode::NO_CONTENT;
    }
    response
}

pub struct Server {
    router: Router,
    listener: TcpListener,
}

impl Server {
    /// Binds the listener described by `config.server`. Port 0 picks a free
    /// port, see [`Server::port`].
    pub async fn new<U: Upstream>(config: Config, upstream: U) -> Result<Self> {
        let addr = format!("{}:{}", config.server.host, config.server.port);
        let listener = TcpListener::bind(&addr)
            .await
            .wrap_err_with(|| format!("Binding TCP listener on {addr}"))?;

        let router = router(AppState::new(config, upstream));
        Ok(Self { router, listener })
    }

    pub fn port(&self) -> Result<u16> {
        Ok(self
            .listener
            .local_addr()
            .wrap_err("Getting local address")?
            .port())
    }

    pub async fn run(self) -> Result<()> {
        let addr = self.listener.local_addr().wrap_err("Getting local address")?;
        tracing::info!("Server listening on http://{addr}");

        axum::serve(self.listener, self.router)
            .await
            .wrap_err("Running HTTP server")
    }
}
