#[macro_use]
extern crate rocket;

pub mod routes;


use discourse_sso::{Strategy, Verify};

/// Strategy managed by Rocket, handing users back as JSON
pub type DiscourseStrategy = Strategy<Box<dyn Verify<User = serde_json::Value>>>;
