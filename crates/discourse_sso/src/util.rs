use base64::{
    alphabet,
    engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig},
};
use rand::{rngs::OsRng, RngCore};

use crate::{Error, Result};

/// Base64 engine for payloads we sign
pub(crate) const ENCODER: GeneralPurpose = base64::engine::general_purpose::STANDARD;

/// Base64 engine for payloads Discourse signed, padding optional
pub(crate) const DECODER: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Hex-encode `bytes` random bytes read from the OS
///
/// Fails instead of falling back to a weaker source.
pub fn secure_random_hex(bytes: usize) -> Result<String> {
    let mut buf = vec![0u8; bytes];
    OsRng
        .try_fill_bytes(&mut buf)
        .map_err(|_| Error::EntropyUnavailable)?;

    Ok(hex::encode(buf))
}

/// Query component of a URL or origin-form request target
pub fn query_string(url: &str) -> Option<&str> {
    let (_, query) = url.split_once('?')?;
    Some(query.split_once('#').map_or(query, |(query, _)| query))
}

/// First value of a query parameter, percent-decoded
pub fn query_param(query: &str, name: &str) -> Option<String> {
    form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
}
