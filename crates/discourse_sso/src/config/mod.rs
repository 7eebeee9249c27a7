mod discourse_url;

pub use discourse_url::*;

use crate::{models::Secret, Error, Success};

/// Discourse SSO configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Base URL of the Discourse instance
    pub discourse_url: String,

    /// Shared secret, as entered in Discourse's `discourse connect provider secrets`
    pub secret: Secret,

    /// URL Discourse sends the user back to after authenticating
    pub callback_url: String,

    /// Log generated requests and successful logins
    #[serde(default)]
    pub debug: bool,

    /// How long a pending request may be answered, in seconds
    ///
    /// Pending requests never expire when unset.
    #[serde(default)]
    pub nonce_lifetime: Option<i64>,
}

impl Config {
    pub fn new<U, S, C>(discourse_url: U, secret: S, callback_url: C) -> Config
    where
        U: Into<String>,
        S: Into<Secret>,
        C: Into<String>,
    {
        Config {
            discourse_url: discourse_url.into(),
            secret: secret.into(),
            callback_url: callback_url.into(),
            debug: false,
            nonce_lifetime: None,
        }
    }

    /// Check the configuration is usable
    pub fn validate(&self) -> Success {
        if !is_valid_discourse_url(&self.discourse_url) {
            return Err(Error::InvalidConfig {
                with: "discourse_url",
            });
        }

        if self.secret.expose().is_empty() {
            return Err(Error::InvalidConfig { with: "secret" });
        }

        if matches!(self.nonce_lifetime, Some(seconds) if seconds <= 0) {
            return Err(Error::InvalidConfig {
                with: "nonce_lifetime",
            });
        }

        Ok(())
    }
}
