use std::collections::HashMap;

use chrono::{DateTime, Utc};

/// Caller-supplied options for a login attempt
///
/// Everything except `prompt` is opaque and handed back with the validated payload.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct RequestOptions {
    /// Set to `false` to ask Discourse not to show its login prompt
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<bool>,

    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

/// Login attempt waiting for Discourse to call back
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PendingRequest {
    /// 32 hex characters drawn from the OS random source
    pub nonce: String,

    /// When the request was generated
    pub created_at: DateTime<Utc>,

    /// Options given when the request was generated
    pub options: RequestOptions,
}

/// Content of a session's SSO slot
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum SsoState {
    /// No login attempt has been made
    #[default]
    Empty,
    /// A login attempt is in flight
    Pending(PendingRequest),
    /// The last login attempt has been answered
    Consumed,
}

/// Result of consuming a pending request by its nonce
#[derive(Debug, Clone, PartialEq)]
pub enum Claim {
    /// The request matched and the slot now holds `SsoState::Consumed`
    Accepted(PendingRequest),
    /// The request matched but is older than the configured lifetime
    Expired(PendingRequest),
    /// Nothing is pending under this nonce
    Unknown,
}
