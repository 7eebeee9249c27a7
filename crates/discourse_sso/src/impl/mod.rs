mod payload;
mod pending;
mod profile;
mod secret;
