use axum::{
    Json,
    extract::rejection::QueryRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::config::MissingSetting;
use crate::domain::{issuance::IssuanceError, ports::UpstreamError, verification::ResultBodyError};

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Server misconfiguration: `{0}` is not set")]
    Misconfigured(&'static str),
    #[error("{0}")]
    InvalidRequest(String),
    #[error("Upstream request failed: {0}")]
    Upstream(#[from] UpstreamError),
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Misconfigured(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Upstream(_) => StatusCode::BAD_GATEWAY,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            AppError::Misconfigured(_) => "server_misconfigured",
            AppError::InvalidRequest(_) => "invalid_request",
            AppError::Upstream(_) => "upstream_unavailable",
        }
    }
}

impl From<MissingSetting> for AppError {
    fn from(error: MissingSetting) -> Self {
        AppError::Misconfigured(error.0)
    }
}

impl From<IssuanceError> for AppError {
    fn from(error: IssuanceError) -> Self {
        AppError::InvalidRequest(error.to_string())
    }
}

impl From<ResultBodyError> for AppError {
    fn from(error: ResultBodyError) -> Self {
        AppError::InvalidRequest(error.to_string())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::InvalidRequest(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            AppError::Misconfigured(key) => tracing::error!("Missing configuration value: {key}"),
            AppError::InvalidRequest(msg) => tracing::debug!("Rejected client request: {msg}"),
            AppError::Upstream(e) => tracing::error!("Upstream failure: {e}"),
        }

        let body = ErrorBody {
            error: self.kind(),
            message: self.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}
