use serde::Deserialize;
use serde_json::{Map, Value};
use thiserror::Error;

use super::issuance::VC_UID;

/// Raw query of the QR poll endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct PollQuery {
    #[serde(rename = "ref")]
    pub reference: Option<String>,
    #[serde(rename = "transactionId")]
    pub transaction_id: Option<String>,
}

/// Identifies one in-flight verification exchange with the upstream service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionReference {
    pub reference: String,
    pub transaction_id: String,
}

impl SessionReference {
    /// An absent or empty `ref` falls back to `default_ref`, an absent
    /// `transactionId` to the empty string.
    pub fn resolve(query: PollQuery, default_ref: Option<&str>) -> Self {
        Self {
            reference: query
                .reference
                .filter(|reference| !reference.is_empty())
                .or_else(|| default_ref.map(str::to_owned))
                .unwrap_or_default(),
            transaction_id: query.transaction_id.unwrap_or_default(),
        }
    }

    pub fn query_string(&self) -> String {
        format!(
            "ref={}&transactionId={}",
            urlencoding::encode(&self.reference),
            urlencoding::encode(&self.transaction_id)
        )
    }
}

#[derive(Error, Debug, PartialEq)]
#[error("Request body must be a JSON object")]
pub struct ResultBodyError;

/// Fills in `vcUid` when the client left it absent, null or empty.
pub fn apply_result_defaults(
    body: Value,
    default_vc_uid: Option<&str>,
) -> Result<Value, ResultBodyError> {
    let Value::Object(mut body) = body else {
        return Err(ResultBodyError);
    };

    if let Some(default) = default_vc_uid {
        if !has_value(&body, VC_UID) {
            body.insert(VC_UID.into(), Value::String(default.to_owned()));
        }
    }

    Ok(Value::Object(body))
}

fn has_value(body: &Map<String, Value>, key: &str) -> bool {
    match body.get(key) {
        None | Some(Value::Null) => false,
        Some(Value::String(s)) => !s.is_empty(),
        Some(_) => true,
    }
}
