use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use rand::{Rng, distr::Alphanumeric};
use serde::Serialize;

const TAG_LEN: usize = 12;

/// The value behind one displayed QR code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QrPayload {
    pub data: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub tag: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Envelope<'a> {
    data: &'a str,
    timestamp: i64,
    expires_at: i64,
    tag: &'a str,
}

impl QrPayload {
    /// Fresh payload created now with a new random tag.
    pub fn new(data: impl Into<String>, validity: Duration) -> Self {
        Self::issued_at(data, validity, Utc::now())
    }

    pub fn issued_at(data: impl Into<String>, validity: Duration, now: DateTime<Utc>) -> Self {
        let validity = TimeDelta::from_std(validity).unwrap_or(TimeDelta::MAX);
        Self {
            data: data.into(),
            created_at: now,
            expires_at: now.checked_add_signed(validity).unwrap_or(DateTime::<Utc>::MAX_UTC),
            tag: random_tag(),
        }
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    pub fn remaining_at(&self, now: DateTime<Utc>) -> Duration {
        (self.expires_at - now).to_std().unwrap_or(Duration::ZERO)
    }

    /// JSON wrapping of the data with its metadata, timestamps in epoch
    /// milliseconds.
    pub fn envelope(&self) -> String {
        let envelope = Envelope {
            data: &self.data,
            timestamp: self.created_at.timestamp_millis(),
            expires_at: self.expires_at.timestamp_millis(),
            tag: &self.tag,
        };
        // serializing borrowed strings and integers cannot fail
        serde_json::to_string(&envelope).unwrap_or_default()
    }
}

fn random_tag() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(TAG_LEN)
        .map(char::from)
        .collect()
}
