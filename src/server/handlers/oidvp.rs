use axum::{
    body::Bytes,
    extract::{Query, State, rejection::QueryRejection},
    http::Method,
};
use tracing::{debug, instrument};

use super::{json_or_empty, upstream_target};
use crate::domain::ports::{Upstream, UpstreamRequest};
use crate::domain::verification::{PollQuery, SessionReference, apply_result_defaults};
use crate::server::{AppState, errors::AppError, responses::ProxyResponse};

const QRCODE_PATH: &str = "/oidvp/qrcode";
const RESULT_PATH: &str = "/oidvp/result";

/// `GET /api/oidvp/qrcode`: polls the QR code or status of a verification
/// session.
#[instrument(skip_all)]
pub async fn poll_qrcode<U: Upstream>(
    State(state): State<AppState<U>>,
    query: Result<Query<PollQuery>, QueryRejection>,
) -> Result<ProxyResponse, AppError> {
    let (url, access_token) = upstream_target(&state.config.upstream, QRCODE_PATH)?;
    let Query(query) = query?;

    let session =
        SessionReference::resolve(query, state.config.verification.default_ref.as_deref());
    debug!(reference = %session.reference, transaction_id = %session.transaction_id, "Polling verification session");

    let response = state
        .upstream
        .execute(UpstreamRequest {
            method: Method::GET,
            url: format!("{url}?{}", session.query_string()),
            access_token,
            body: None,
        })
        .await?;

    Ok(ProxyResponse(response))
}

/// `POST /api/oidvp/result`: forwards a verification result, defaulting
/// `vcUid` from configuration.
#[instrument(skip_all)]
pub async fn submit_result<U: Upstream>(
    State(state): State<AppState<U>>,
    body: Bytes,
) -> Result<ProxyResponse, AppError> {
    let (url, access_token) = upstream_target(&state.config.upstream, RESULT_PATH)?;

    let body = apply_result_defaults(
        json_or_empty(&body),
        state.config.verification.default_vc_uid.as_deref(),
    )?;

    let response = state
        .upstream
        .execute(UpstreamRequest {
            method: Method::POST,
            url,
            access_token,
            body: Some(body),
        })
        .await?;

    Ok(ProxyResponse(response))
}
