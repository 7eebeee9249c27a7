use chrono::{DateTime, Utc};

use super::RequestOptions;

/// Signed authentication request, ready to redirect the user to Discourse
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct AuthRequest {
    /// Where to send the user
    pub redirect_url: String,

    /// Nonce bound to the session
    pub nonce: String,

    /// Hex HMAC-SHA256 of the base64 payload
    pub signature: String,

    /// URL-encoded base64 payload, as sent in the `sso` parameter
    pub payload: String,

    pub options: RequestOptions,

    pub created_at: DateTime<Utc>,
}
