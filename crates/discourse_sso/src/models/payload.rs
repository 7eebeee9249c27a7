use std::collections::BTreeMap;

use super::RequestOptions;

/// Key/value pairs Discourse sent back in a signed callback
#[derive(Debug, Serialize, Clone, PartialEq, Default)]
pub struct Payload {
    /// Every pair of the decoded payload, first occurrence wins
    pub fields: BTreeMap<String, String>,

    /// Options of the request this payload answers, set once validated
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<RequestOptions>,
}
