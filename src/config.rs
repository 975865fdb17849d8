use std::{collections::HashMap, time::Duration};

use config::{Config as ConfigLib, ConfigError, Environment, File};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::issuance::{CredentialClass, IssuanceProfile};

#[derive(Debug, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    #[serde(default)]
    pub upstream: UpstreamConfig,
    #[serde(default)]
    pub verification: VerificationConfig,
    #[serde(default)]
    pub issuance: IssuanceConfig,
    #[serde(default)]
    pub qr: QrConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Connection settings for the upstream verification/issuance API.
///
/// Both `api_base` and `access_token` are optional at load time. A deployment
/// missing them still starts, and every proxy answers with a
/// misconfiguration error until they are provided.
#[derive(Debug, Deserialize)]
pub struct UpstreamConfig {
    pub api_base: Option<String>,
    pub access_token: Option<SecretString>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            api_base: None,
            access_token: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl UpstreamConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn default_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct VerificationConfig {
    pub default_ref: Option<String>,
    pub default_vc_uid: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct IssuanceConfig {
    #[serde(default)]
    pub generic: ProfileConfig,
    #[serde(default)]
    pub identity_card: ProfileConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileConfig {
    pub vc_uid: Option<String>,
    pub issuance_date: Option<String>,
    pub expired_date: Option<String>,
}

impl IssuanceConfig {
    /// Resolves the issuance triple configured for `class`.
    ///
    /// # Errors
    /// Names the first missing setting.
    pub fn profile(&self, class: CredentialClass) -> Result<IssuanceProfile, MissingSetting> {
        let (section, keys) = match class {
            CredentialClass::Generic => (&self.generic, GENERIC_KEYS),
            CredentialClass::IdentityCard => (&self.identity_card, IDENTITY_CARD_KEYS),
        };

        let vc_uid = section.vc_uid.clone().ok_or(MissingSetting(keys[0]))?;
        let issuance_date = section.issuance_date.clone().ok_or(MissingSetting(keys[1]))?;
        let expired_date = section.expired_date.clone().ok_or(MissingSetting(keys[2]))?;

        Ok(IssuanceProfile {
            vc_uid,
            issuance_date,
            expired_date,
        })
    }
}

/// A setting required at request time is absent; holds its dotted key.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("`{0}` is not set")]
pub struct MissingSetting(pub &'static str);

const GENERIC_KEYS: [&str; 3] = [
    "issuance.generic.vc_uid",
    "issuance.generic.issuance_date",
    "issuance.generic.expired_date",
];

const IDENTITY_CARD_KEYS: [&str; 3] = [
    "issuance.identity_card.vc_uid",
    "issuance.identity_card.issuance_date",
    "issuance.identity_card.expired_date",
];

#[derive(Debug, Clone, Deserialize)]
pub struct QrConfig {
    #[serde(default = "default_validity_minutes")]
    pub validity_minutes: u64,
}

impl Default for QrConfig {
    fn default() -> Self {
        Self {
            validity_minutes: default_validity_minutes(),
        }
    }
}

impl QrConfig {
    pub fn validity(&self) -> Duration {
        Duration::from_secs(self.validity_minutes.saturating_mul(60))
    }
}

fn default_validity_minutes() -> u64 {
    5
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with_sources(None)
    }

    pub fn load_with_sources(
        env_vars: Option<HashMap<String, String>>,
    ) -> Result<Self, ConfigError> {
        let mut builder = ConfigLib::builder()
            .set_default("server.host", "localhost")?
            .set_default("server.port", 3000)?
            .add_source(File::with_name("config/settings").required(false));

        // Explicit overrides keep tests isolated from the process environment
        if let Some(vars) = env_vars {
            for (key, value) in vars {
                builder = builder.set_override(&key, value)?;
            }
        } else {
            // e.g. APP_UPSTREAM__API_BASE or APP_ISSUANCE__IDENTITY_CARD__VC_UID
            builder = builder.add_source(
                Environment::with_prefix("APP")
                    .prefix_separator("_")
                    .separator("__"),
            );
        }

        builder.build()?.try_deserialize()
    }
}
