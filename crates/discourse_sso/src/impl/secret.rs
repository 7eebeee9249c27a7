use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::models::Secret;

type HmacSha256 = Hmac<Sha256>;

impl Secret {
    fn mac(&self, data: &str) -> HmacSha256 {
        let mut mac = <HmacSha256 as Mac>::new_from_slice(self.expose().as_bytes())
            .expect("HMAC can take key of any size");

        mac.update(data.as_bytes());
        mac
    }

    /// Sign data with secret, returning the hex HMAC-SHA256 digest
    pub fn sign(&self, data: &str) -> String {
        hex::encode(self.mac(data).finalize().into_bytes())
    }

    /// Check a hex signature over data in constant time
    pub fn verify(&self, data: &str, signature: &str) -> bool {
        let Ok(signature) = hex::decode(signature) else {
            return false;
        };

        self.mac(data).verify_slice(&signature).is_ok()
    }
}
