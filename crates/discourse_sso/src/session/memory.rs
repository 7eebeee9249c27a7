use std::sync::Arc;

use futures::lock::Mutex;

use crate::{
    models::{Claim, SsoState},
    Result, Success,
};

use super::SessionSlot;

/// In-memory session slot
///
/// Clones share the same slot.
#[derive(Default, Clone)]
pub struct MemorySlot {
    pub state: Arc<Mutex<SsoState>>,
}

#[async_trait]
impl SessionSlot for MemorySlot {
    async fn load(&self) -> Result<SsoState> {
        Ok(self.state.lock().await.clone())
    }

    async fn store(&self, state: SsoState) -> Success {
        *self.state.lock().await = state;
        Ok(())
    }

    async fn consume(&self, nonce: &str, lifetime: Option<i64>) -> Result<Claim> {
        Ok(self.state.lock().await.claim(nonce, lifetime))
    }
}
