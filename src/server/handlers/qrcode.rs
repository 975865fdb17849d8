use axum::{body::Bytes, extract::State, http::Method};
use tracing::{info, instrument};

use super::{json_or_empty, upstream_target};
use crate::domain::issuance::IssuanceRequest;
use crate::domain::ports::{Upstream, UpstreamRequest};
use crate::server::{AppState, errors::AppError, responses::ProxyResponse};

const QRCODE_DATA_PATH: &str = "/qrcode/data";

/// `POST /api/qrcode/data`: attaches the issuance profile of the detected
/// credential class and forwards to the upstream issuance endpoint.
#[instrument(skip_all)]
pub async fn qrcode_data<U: Upstream>(
    State(state): State<AppState<U>>,
    body: Bytes,
) -> Result<ProxyResponse, AppError> {
    let (url, access_token) = upstream_target(&state.config.upstream, QRCODE_DATA_PATH)?;

    let request = IssuanceRequest::parse(json_or_empty(&body))?;
    let class = request.class();
    let profile = state.config.issuance.profile(class)?;

    info!(
        class = class.as_str(),
        fields = request.fields().len(),
        "Issuing QR credential"
    );

    let response = state
        .upstream
        .execute(UpstreamRequest {
            method: Method::POST,
            url,
            access_token,
            body: Some(request.into_upstream_body(&profile)),
        })
        .await?;

    Ok(ProxyResponse(response))
}
