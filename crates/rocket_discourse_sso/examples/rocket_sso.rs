//! Run example with `cargo run --example rocket_sso --features example`
//!
//! Expects a `config.toml` next to the working directory:
//!
//! ```toml
//! discourse_url = "https://discourse.example.net"
//! secret = "shhh-its-a-secret"
//! callback_url = "http://localhost:8000/auth/discourse/callback"
//! debug = true
//! ```

#[macro_use]
extern crate rocket;

#[cfg(feature = "example")]
struct StaffOnly;

#[cfg(feature = "example")]
#[rocket::async_trait]
impl discourse_sso::Verify for StaffOnly {
    type User = serde_json::Value;

    async fn verify(
        &self,
        profile: discourse_sso::models::Profile,
    ) -> discourse_sso::Result<Option<discourse_sso::Verified<serde_json::Value>>> {
        if !profile.groups.iter().any(|group| group == "staff") {
            return Ok(None);
        }

        Ok(Some(discourse_sso::Verified::new(serde_json::json!({
            "id": profile.external_id,
            "name": profile.username,
        }))))
    }
}

#[cfg(feature = "example")]
#[launch]
async fn rocket() -> _ {
    use std::sync::Arc;

    use discourse_sso::{derive::SpentNonces, Config, SsoProvider, Strategy, Verify};
    use rocket::figment::providers::{Format as _, Toml};
    use rocket::figment::Figment;

    let config: Config = Figment::new()
        .merge(Toml::file("config.toml"))
        .extract()
        .expect("valid `config.toml`");

    let provider = SsoProvider::new(config).expect("valid Discourse SSO configuration");
    let verify: Box<dyn Verify<User = serde_json::Value>> = Box::new(StaffOnly);

    rocket::build()
        .manage(Strategy::new(Arc::new(provider), verify))
        .manage(SpentNonces::default())
        .mount("/auth/discourse", rocket_discourse_sso::routes::sso::routes())
}

#[cfg(not(feature = "example"))]
fn main() {
    panic!("Enable `example` feature to run this example!");
}
