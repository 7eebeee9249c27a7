#[macro_use]
extern crate serde;
#[macro_use]
extern crate lazy_static;
#[macro_use]
extern crate async_trait;

#[macro_use]
mod macros;

mod result;
pub use result::*;

pub mod config;
pub mod derive;
pub mod r#impl;
pub mod models;
pub mod provider;
pub mod session;
pub mod strategy;
pub mod util;

pub use config::Config;
pub use provider::SsoProvider;
pub use session::{MemorySlot, SessionSlot};
pub use strategy::{Outcome, Strategy, Verified, Verify};
