use crate::{
    models::{Payload, Profile},
    strategy::NAME,
};

impl From<&Payload> for Profile {
    fn from(payload: &Payload) -> Self {
        Profile {
            provider: Some(NAME.to_owned()),
            external_id: payload.external_id().map(str::to_owned),
            username: payload.username().map(str::to_owned),
            email: payload.email().map(str::to_owned),
            real_name: payload.name().map(str::to_owned),
            avatar: payload.avatar_url().map(str::to_owned),
            groups: payload.groups(),
            admin: payload.admin(),
            moderator: payload.moderator(),
        }
    }
}

impl Profile {
    /// Whether this is the profile of a callback that failed validation
    pub fn is_empty(&self) -> bool {
        *self == Profile::default()
    }
}
