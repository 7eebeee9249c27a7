use regex::Regex;

lazy_static! {
    static ref DISCOURSE_URL: Regex = Regex::new(concat!(
        r"^https?://",
        r"(?:[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*",
        r"|[0-9]{1,3}(?:\.[0-9]{1,3}){3})",
        r"(?::[0-9]{1,5})?",
        r"(?:/[-a-zA-Z0-9@:%_+.~#?&/=]*)?$",
    ))
    .unwrap();
}

/// Check that a Discourse base URL is an http(s) URL with a host name or IPv4
/// address, an optional port and an optional path
pub fn is_valid_discourse_url(url: &str) -> bool {
    DISCOURSE_URL.is_match(url)
}
