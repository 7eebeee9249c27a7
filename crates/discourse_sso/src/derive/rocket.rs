use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use futures::lock::Mutex;
use rocket::{
    http::{ContentType, Cookie, CookieJar, SameSite, Status},
    response::{self, Redirect, Responder},
    Request, Response,
};
use serde::Serialize;

use crate::{
    models::{Claim, PendingRequest, SsoState},
    session::SessionSlot,
    strategy::Info,
    Error, Outcome, Result, Success,
};

/// Name of the private cookie holding a session's SSO state
pub static COOKIE_NAME: &str = "discourse-sso";

/// Longest a login attempt kept in a cookie stays answerable, in seconds
pub static COOKIE_LIFETIME: i64 = 60 * 10;

/// HTTP response builder for Error enum
impl<'r> Responder<'r, 'static> for Error {
    fn respond_to(self, _: &'r Request<'_>) -> response::Result<'static> {
        let status = match self {
            Error::InvalidConfig { .. } => Status::InternalServerError,
            Error::BadUrl => Status::BadRequest,
            Error::BadParam { .. } => Status::BadRequest,
            Error::EntropyUnavailable => Status::InternalServerError,
            Error::InvalidSession => Status::BadRequest,
            Error::InternalError => Status::InternalServerError,
            Error::VerifyFailed { .. } => Status::InternalServerError,
        };

        json_response(status, &self)
    }
}

/// HTTP response builder for authentication outcomes
impl<'r, U: Serialize> Responder<'r, 'static> for Outcome<U> {
    fn respond_to(self, request: &'r Request<'_>) -> response::Result<'static> {
        #[derive(Serialize)]
        struct Authenticated<U> {
            user: U,
            info: Info,
        }

        #[derive(Serialize)]
        #[serde(tag = "type")]
        enum Failure {
            AuthenticationFailed { message: String },
        }

        match self {
            Outcome::Success { user, info } => {
                json_response(Status::Ok, &Authenticated { user, info })
            }
            Outcome::Fail { message } => json_response(
                Status::Unauthorized,
                &Failure::AuthenticationFailed { message },
            ),
            Outcome::Error(error) => error.respond_to(request),
            Outcome::Redirect { location } => Redirect::found(location).respond_to(request),
        }
    }
}

fn json_response<T: Serialize>(status: Status, body: &T) -> response::Result<'static> {
    let string = serde_json::to_string(body).map_err(|_| Status::InternalServerError)?;

    Response::build()
        .sized_body(string.len(), std::io::Cursor::new(string))
        .header(ContentType::JSON)
        .status(status)
        .ok()
}

/// Nonces already answered through a `CookieSlot`
///
/// A client can send back an older copy of its cookie, so answered nonces are
/// remembered server side until their request could no longer be answered.
/// Manage one instance for the whole Rocket.
#[derive(Default)]
pub struct SpentNonces {
    spent: Mutex<HashMap<String, DateTime<Utc>>>,
}

impl SpentNonces {
    /// Record `pending` as answered, `false` if it already was
    pub async fn spend(&self, pending: &PendingRequest) -> bool {
        let cutoff = Utc::now() - Duration::seconds(COOKIE_LIFETIME);

        let mut spent = self.spent.lock().await;
        spent.retain(|_, created_at| *created_at >= cutoff);

        spent
            .insert(pending.nonce.clone(), pending.created_at)
            .is_none()
    }
}

/// Session slot kept in a private cookie
///
/// Lax same-site policy so the cookie survives the top-level redirect back
/// from Discourse. Pending requests never outlive `COOKIE_LIFETIME`, even
/// when the provider has no nonce lifetime configured.
pub struct CookieSlot<'a, 'r> {
    cookies: &'a CookieJar<'r>,
    spent: &'a SpentNonces,
}

impl<'a, 'r> CookieSlot<'a, 'r> {
    pub fn new(cookies: &'a CookieJar<'r>, spent: &'a SpentNonces) -> Self {
        CookieSlot { cookies, spent }
    }
}

#[async_trait]
impl<'a, 'r> SessionSlot for CookieSlot<'a, 'r> {
    async fn load(&self) -> Result<SsoState> {
        match self.cookies.get_private(COOKIE_NAME) {
            Some(cookie) => serde_json::from_str(cookie.value()).map_err(|_| Error::InvalidSession),
            None => Ok(SsoState::Empty),
        }
    }

    async fn store(&self, state: SsoState) -> Success {
        let value = serde_json::to_string(&state).map_err(|_| Error::InternalError)?;

        let cookie = Cookie::build((COOKIE_NAME, value))
            .http_only(true)
            .same_site(SameSite::Lax)
            .path("/")
            .max_age(rocket::time::Duration::seconds(COOKIE_LIFETIME));

        self.cookies.add_private(cookie);
        Ok(())
    }

    async fn consume(&self, nonce: &str, lifetime: Option<i64>) -> Result<Claim> {
        let lifetime = lifetime.map_or(COOKIE_LIFETIME, |lifetime| lifetime.min(COOKIE_LIFETIME));

        let mut state = self.load().await?;
        let claim = state.claim(nonce, Some(lifetime));

        if let Claim::Accepted(pending) = &claim {
            if !self.spent.spend(pending).await {
                return Ok(Claim::Unknown);
            }

            self.store(state).await?;
        }

        Ok(claim)
    }
}
