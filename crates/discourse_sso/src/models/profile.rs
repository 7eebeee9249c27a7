/// Identity of a user authenticated by Discourse
///
/// The default value is the empty profile handed to the verify callback
/// when a callback could not be validated.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct Profile {
    /// Always `discourse` for validated callbacks
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,

    /// Discourse user id
    pub external_id: Option<String>,

    pub username: Option<String>,

    pub email: Option<String>,

    /// Full name
    pub real_name: Option<String>,

    /// URL of the unscaled avatar upload
    pub avatar: Option<String>,

    /// Names of the groups the user belongs to
    #[serde(default)]
    pub groups: Vec<String>,

    pub admin: Option<bool>,

    pub moderator: Option<bool>,
}
