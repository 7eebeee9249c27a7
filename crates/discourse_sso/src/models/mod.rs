mod payload;
mod pending;
mod profile;
mod request;
mod secret;

pub use payload::*;
pub use pending::*;
pub use profile::*;
pub use request::*;
pub use secret::*;
