//! Redirect to Discourse
//! GET /sso/authorize
use discourse_sso::{
    derive::{CookieSlot, SpentNonces},
    models::RequestOptions,
    Outcome,
};
use rocket::http::{uri::Origin, CookieJar};
use rocket::State;

use crate::DiscourseStrategy;

/// # Redirect to Discourse
///
/// Start a login attempt, remembering its nonce in a private cookie.
/// Pass `prompt=false` to skip Discourse's login prompt.
#[get("/authorize?<prompt>")]
pub async fn authorize(
    strategy: &State<DiscourseStrategy>,
    spent: &State<SpentNonces>,
    prompt: Option<bool>,
    uri: &Origin<'_>,
    cookies: &CookieJar<'_>,
) -> Outcome<serde_json::Value> {
    let options = RequestOptions {
        prompt,
        ..Default::default()
    };

    strategy
        .authenticate(&CookieSlot::new(cookies, spent), &uri.to_string(), options)
        .await
}
