//! Finish a login attempt
//! GET /sso/callback
use discourse_sso::{
    derive::{CookieSlot, SpentNonces},
    models::RequestOptions,
    Outcome,
};
use rocket::http::{uri::Origin, CookieJar};
use rocket::State;

use crate::DiscourseStrategy;

/// # Handle Discourse callback
///
/// Validate the signed payload Discourse redirected the user back with and
/// respond with the verified user. Without an `sso` parameter a new login
/// attempt is started instead.
#[get("/callback")]
pub async fn callback(
    strategy: &State<DiscourseStrategy>,
    spent: &State<SpentNonces>,
    uri: &Origin<'_>,
    cookies: &CookieJar<'_>,
) -> Outcome<serde_json::Value> {
    strategy
        .authenticate(
            &CookieSlot::new(cookies, spent),
            &uri.to_string(),
            RequestOptions::default(),
        )
        .await
}
