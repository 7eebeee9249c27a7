#[cfg(feature = "rocket")]
mod rocket;

#[cfg(feature = "rocket")]
pub use self::rocket::*;
