use std::collections::BTreeMap;

use base64::Engine;

use crate::{models::Payload, util::DECODER};

impl Payload {
    /// Parse a query-string encoded payload
    pub fn parse(query: &str) -> Payload {
        let mut fields = BTreeMap::new();
        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            fields
                .entry(key.into_owned())
                .or_insert_with(|| value.into_owned());
        }

        Payload {
            fields,
            options: None,
        }
    }

    /// Decode a base64 blob as sent in the `sso` parameter
    ///
    /// Line breaks and other ASCII whitespace in the blob are ignored.
    pub fn decode(blob: &str) -> Option<Payload> {
        let blob: String = blob
            .chars()
            .filter(|c| !c.is_ascii_whitespace())
            .collect();

        let bytes = DECODER.decode(blob).ok()?;
        let text = String::from_utf8(bytes).ok()?;

        Some(Payload::parse(&text))
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    pub fn nonce(&self) -> Option<&str> {
        self.get("nonce")
    }

    pub fn return_sso_url(&self) -> Option<&str> {
        self.get("return_sso_url")
    }

    pub fn external_id(&self) -> Option<&str> {
        self.get("external_id")
    }

    pub fn username(&self) -> Option<&str> {
        self.get("username")
    }

    pub fn email(&self) -> Option<&str> {
        self.get("email")
    }

    pub fn name(&self) -> Option<&str> {
        self.get("name")
    }

    pub fn avatar_url(&self) -> Option<&str> {
        self.get("avatar_url")
    }

    pub fn admin(&self) -> Option<bool> {
        self.get("admin").and_then(parse_bool)
    }

    pub fn moderator(&self) -> Option<bool> {
        self.get("moderator").and_then(parse_bool)
    }

    /// Group names, sent by Discourse as a comma separated list
    pub fn groups(&self) -> Vec<String> {
        self.get("groups")
            .map(|groups| {
                groups
                    .split(',')
                    .map(str::trim)
                    .filter(|group| !group.is_empty())
                    .map(str::to_owned)
                    .collect()
            })
            .unwrap_or_default()
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use crate::models::Payload;

    #[test]
    fn it_parses_identity_fields() {
        let payload = Payload::parse(
            "nonce=abc&external_id=42&username=alice&email=alice%40example.com\
             &name=Alice+Liddell&admin=true&moderator=false&groups=staff,trust_level_1",
        );

        assert_eq!(payload.nonce(), Some("abc"));
        assert_eq!(payload.external_id(), Some("42"));
        assert_eq!(payload.username(), Some("alice"));
        assert_eq!(payload.email(), Some("alice@example.com"));
        assert_eq!(payload.name(), Some("Alice Liddell"));
        assert_eq!(payload.admin(), Some(true));
        assert_eq!(payload.moderator(), Some(false));
        assert_eq!(payload.groups(), vec!["staff", "trust_level_1"]);
        assert_eq!(payload.avatar_url(), None);
    }

    #[test]
    fn it_keeps_first_value_of_repeated_keys() {
        let payload = Payload::parse("nonce=first&nonce=second");

        assert_eq!(payload.nonce(), Some("first"));
    }

    #[test]
    fn it_ignores_unknown_booleans() {
        let payload = Payload::parse("admin=yes");

        assert_eq!(payload.admin(), None);
        assert!(payload.groups().is_empty());
    }

    #[test]
    fn it_decodes_wrapped_and_unpadded_blobs() {
        // "nonce=abc&username=bob"
        let payload = Payload::decode("bm9uY2U9YWJjJnVz\nZXJuYW1lPWJvYg").unwrap();

        assert_eq!(payload.nonce(), Some("abc"));
        assert_eq!(payload.username(), Some("bob"));
    }

    #[test]
    fn it_rejects_invalid_blobs() {
        assert_eq!(Payload::decode("not base64!"), None);
        // invalid UTF-8
        assert_eq!(Payload::decode("/w=="), None);
    }
}
