//! Credential class selection and issuance payload assembly for the QR data
//! endpoint.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Field names whose presence selects a credential class other than
/// [`CredentialClass::Generic`]. The first match wins.
const DISCRIMINATORS: &[(&str, CredentialClass)] =
    &[("roc_birthday", CredentialClass::IdentityCard)];

pub const VC_UID: &str = "vcUid";
pub const ISSUANCE_DATE: &str = "issuanceDate";
pub const EXPIRED_DATE: &str = "expiredDate";

/// One attribute of the credential to be issued.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CredentialField {
    pub ename: String,
    #[serde(default)]
    pub content: Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialClass {
    Generic,
    IdentityCard,
}

impl CredentialClass {
    /// Picks the credential class from the discriminator table.
    pub fn from_fields(fields: &[CredentialField]) -> Self {
        DISCRIMINATORS
            .iter()
            .find(|(name, _)| fields.iter().any(|field| field.ename == *name))
            .map(|(_, class)| *class)
            .unwrap_or(CredentialClass::Generic)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CredentialClass::Generic => "generic",
            CredentialClass::IdentityCard => "identity_card",
        }
    }
}

/// The server-side triple attached to every issuance request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuanceProfile {
    pub vc_uid: String,
    pub issuance_date: String,
    pub expired_date: String,
}

#[derive(Error, Debug, PartialEq)]
pub enum IssuanceError {
    #[error("Request body must be a JSON object")]
    NotAnObject,
    #[error("Request body is missing the `fields` array")]
    MissingFields,
    #[error("Invalid `fields` entry: {0}")]
    InvalidField(String),
}

/// A validated client request for the QR data endpoint.
#[derive(Debug, Clone)]
pub struct IssuanceRequest {
    body: Map<String, Value>,
    fields: Vec<CredentialField>,
}

impl IssuanceRequest {
    /// Validates the client body. `fields` must be present and must be an
    /// array of objects carrying a string `ename`.
    pub fn parse(body: Value) -> Result<Self, IssuanceError> {
        let Value::Object(body) = body else {
            return Err(IssuanceError::NotAnObject);
        };

        let fields = match body.get("fields") {
            Some(fields @ Value::Array(_)) => {
                Vec::<CredentialField>::deserialize(fields)
                    .map_err(|e| IssuanceError::InvalidField(e.to_string()))?
            }
            _ => return Err(IssuanceError::MissingFields),
        };

        Ok(Self { body, fields })
    }

    pub fn fields(&self) -> &[CredentialField] {
        &self.fields
    }

    pub fn class(&self) -> CredentialClass {
        CredentialClass::from_fields(&self.fields)
    }

    /// Builds the upstream body. The profile triple always replaces whatever
    /// the client sent under the same keys.
    pub fn into_upstream_body(self, profile: &IssuanceProfile) -> Value {
        let mut body = self.body;
        body.insert(VC_UID.into(), Value::String(profile.vc_uid.clone()));
        body.insert(
            ISSUANCE_DATE.into(),
            Value::String(profile.issuance_date.clone()),
        );
        body.insert(
            EXPIRED_DATE.into(),
            Value::String(profile.expired_date.clone()),
        );
        Value::Object(body)
    }
}
