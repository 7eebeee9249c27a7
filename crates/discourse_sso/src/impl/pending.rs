use chrono::{Duration, Utc};

use crate::{
    models::{Claim, PendingRequest, RequestOptions, SsoState},
    util::secure_random_hex,
    Result,
};

impl PendingRequest {
    /// Create a new pending request with a fresh nonce
    pub fn new(options: RequestOptions) -> Result<PendingRequest> {
        Ok(PendingRequest {
            nonce: secure_random_hex(16)?,
            created_at: Utc::now(),
            options,
        })
    }

    /// Check if this request is older than `lifetime` seconds
    pub fn is_expired(&self, lifetime: Option<i64>) -> bool {
        let Some(lifetime) = lifetime.and_then(Duration::try_seconds) else {
            return false;
        };

        match self.created_at.checked_add_signed(lifetime) {
            Some(expiry) => Utc::now() > expiry,
            None => false,
        }
    }
}

impl SsoState {
    /// Consume the pending request answered by `nonce`
    ///
    /// Only an unexpired request with the same nonce is consumed, anything
    /// else leaves the state as it was.
    pub fn claim(&mut self, nonce: &str, lifetime: Option<i64>) -> Claim {
        let pending = match self {
            SsoState::Pending(pending) if pending.nonce == nonce => pending.clone(),
            _ => return Claim::Unknown,
        };

        if pending.is_expired(lifetime) {
            return Claim::Expired(pending);
        }

        *self = SsoState::Consumed;
        Claim::Accepted(pending)
    }
}
