//! Bridges the SSO provider to a host framework's authentication cycle.
//!
//! A request is either a fresh login attempt, answered with a redirect to
//! Discourse, or a callback from Discourse, answered with the outcome of the
//! host's verify callback. Nothing is kept between requests except the
//! session slot.

use std::{collections::HashMap, sync::Arc};

use crate::{
    models::{Profile, RequestOptions},
    session::SessionSlot,
    util::{query_param, query_string},
    Error, Result, SsoProvider,
};

/// Name of the strategy
pub static NAME: &str = "discourse";

/// Extra information returned to the host with an authenticated user
pub type Info = HashMap<String, serde_json::Value>;

/// User accepted by a verify callback
#[derive(Debug, Clone, PartialEq)]
pub struct Verified<U> {
    pub user: U,
    pub info: Info,
}

impl<U> Verified<U> {
    pub fn new(user: U) -> Self {
        Verified {
            user,
            info: Info::new(),
        }
    }

    pub fn with_info(self, info: Info) -> Self {
        Verified { info, ..self }
    }
}

/// Host callback turning a Discourse profile into an application user
#[async_trait]
pub trait Verify: Send + Sync {
    type User: Send;

    /// Map a profile to a user, or return `Ok(None)` to reject the login
    ///
    /// Receives the empty profile when the callback failed validation.
    async fn verify(&self, profile: Profile) -> Result<Option<Verified<Self::User>>>;
}

#[async_trait]
impl<V: Verify + ?Sized> Verify for Box<V> {
    type User = V::User;

    async fn verify(&self, profile: Profile) -> Result<Option<Verified<Self::User>>> {
        (**self).verify(profile).await
    }
}

/// How the host should finish the authentication cycle
#[derive(Debug, PartialEq)]
pub enum Outcome<U> {
    Success { user: U, info: Info },
    Fail { message: String },
    Error(Error),
    Redirect { location: String },
}

/// Discourse authentication strategy
pub struct Strategy<V> {
    provider: Arc<SsoProvider>,
    verify: V,
}

impl<V: Verify> Strategy<V> {
    pub fn new(provider: Arc<SsoProvider>, verify: V) -> Strategy<V> {
        Strategy { provider, verify }
    }

    pub fn name(&self) -> &'static str {
        NAME
    }

    pub fn provider(&self) -> &SsoProvider {
        &self.provider
    }

    /// Run one authentication step for the request at `request_url`
    ///
    /// `request_url` is the full request target, query string included.
    /// `options` only matter when a new login attempt is started.
    pub async fn authenticate<S>(
        &self,
        slot: &S,
        request_url: &str,
        options: RequestOptions,
    ) -> Outcome<V::User>
    where
        S: SessionSlot + ?Sized,
    {
        debug!(self.provider, "authenticate {}", request_url);

        if is_callback(request_url) {
            self.verify_callback(slot, request_url).await
        } else {
            self.redirect_to_discourse(slot, options).await
        }
    }

    async fn verify_callback<S>(&self, slot: &S, request_url: &str) -> Outcome<V::User>
    where
        S: SessionSlot + ?Sized,
    {
        let profile = match self.provider.validate_auth(slot, request_url).await {
            Ok(Some(payload)) => Profile::from(&payload),
            Ok(None) => Profile::default(),
            Err(err) => return Outcome::Error(err),
        };

        match self.verify.verify(profile).await {
            Ok(Some(Verified { user, info })) => Outcome::Success { user, info },
            Ok(None) => Outcome::Fail {
                message: "Failed to validate user".to_owned(),
            },
            Err(err) => Outcome::Error(err),
        }
    }

    async fn redirect_to_discourse<S>(&self, slot: &S, options: RequestOptions) -> Outcome<V::User>
    where
        S: SessionSlot + ?Sized,
    {
        match self.provider.generate_auth_request(slot, options).await {
            Ok(request) => Outcome::Redirect {
                location: request.redirect_url,
            },
            Err(err) => Outcome::Error(err),
        }
    }
}

/// Whether the request carries a Discourse callback
fn is_callback(request_url: &str) -> bool {
    query_string(request_url).is_some_and(|query| query_param(query, "sso").is_some())
}
