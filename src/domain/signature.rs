use {
    hmac::{Hmac, Mac, digest::InvalidLength},
    sha2::Sha256,
    std::fmt,
};

type HmacSha256 = Hmac<Sha256>;

/// HMAC-SHA256 over the raw webhook body with a pre-shared secret.
/// Signatures travel as lowercase hex.
#[derive(Clone)]
pub struct SignatureVerifier {
    keyed: HmacSha256,
}

impl SignatureVerifier {
    /// Keys the MAC once; every sign/verify starts from a clone of it.
    pub fn new(secret: impl AsRef<[u8]>) -> Result<Self, InvalidLength> {
        Ok(Self {
            keyed: HmacSha256::new_from_slice(secret.as_ref())?,
        })
    }

    pub fn sign(&self, payload: &[u8]) -> String {
        let mut mac = self.keyed.clone();
        mac.update(payload);
        hex::encode(mac.finalize().into_bytes())
    }

    /// Constant-time with respect to the expected MAC.
    pub fn verify(&self, signature: &str, payload: &[u8]) -> bool {
        let Ok(signature) = hex::decode(signature.trim()) else {
            return false;
        };
        let mut mac = self.keyed.clone();
        mac.update(payload);
        mac.verify_slice(&signature).is_ok()
    }
}

impl fmt::Debug for SignatureVerifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignatureVerifier")
            .field("secret", &"<redacted>")
            .finish()
    }
}
