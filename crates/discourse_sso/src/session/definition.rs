use crate::{
    models::{Claim, SsoState},
    Result, Success,
};

/// Single SSO slot of one end-user session, owned by the host
///
/// The slot holds at most one pending request; storing replaces whatever
/// was there before.
#[async_trait]
pub trait SessionSlot: Sync {
    /// Read the slot, `SsoState::Empty` if nothing was ever stored
    async fn load(&self) -> Result<SsoState>;

    /// Overwrite the slot
    async fn store(&self, state: SsoState) -> Success;

    /// Consume the pending request answered by `nonce`
    ///
    /// Checking the nonce and swapping in `SsoState::Consumed` must happen as
    /// one step: of any number of concurrent calls with the same nonce, at
    /// most one sees `Claim::Accepted`. See `SsoState::claim` for the rules.
    async fn consume(&self, nonce: &str, lifetime: Option<i64>) -> Result<Claim>;
}
