use std::fmt;

use rand::Rng;
use rand::distr::Alphanumeric;

use crate::CryptoError;

/// Default length of generated share keys.
pub const SHARE_KEY_LEN: usize = 12;

/// Process-wide encryption passphrase.
#[derive(Clone)]
pub struct Passphrase(String);

impl Passphrase {
    pub fn new(secret: impl Into<String>) -> Result<Self, CryptoError> {
        let secret = secret.into();
        if secret.is_empty() {
            return Err(CryptoError::EncryptionKeyMissing);
        }
        Ok(Self(secret))
    }

    /// Pick the configured passphrase, else the fallback. Empty strings count as unset.
    pub fn resolve(configured: Option<&str>, fallback: Option<&str>) -> Result<Self, CryptoError> {
        configured
            .filter(|s| !s.is_empty())
            .or(fallback.filter(|s| !s.is_empty()))
            .map(|s| Self(s.to_string()))
            .ok_or(CryptoError::EncryptionKeyMissing)
    }

    pub(crate) fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Debug for Passphrase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Passphrase(<redacted>)")
    }
}

/// Generate a random alphanumeric share key.
pub fn generate_share_key(len: usize) -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}
