use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::CryptoError;
use crate::cipher;
use crate::keys::Passphrase;

/// Turns domain records into store-opaque ciphertext and back.
#[derive(Debug, Clone)]
pub struct RecordCodec {
    passphrase: Passphrase,
}

impl RecordCodec {
    pub fn new(passphrase: Passphrase) -> Self {
        Self { passphrase }
    }

    /// Build a codec from the configured key, falling back to `fallback` when unset.
    pub fn from_config(configured: Option<&str>, fallback: Option<&str>) -> Result<Self, CryptoError> {
        Ok(Self::new(Passphrase::resolve(configured, fallback)?))
    }

    pub fn serialize<T: Serialize>(&self, record: &T) -> Result<String, CryptoError> {
        let json = serde_json::to_string(record)?;
        cipher::encrypt(&json, &self.passphrase)
    }

    /// Returns `None` for anything that does not decrypt and parse cleanly.
    pub fn deserialize<T: DeserializeOwned>(&self, ciphertext: &str) -> Option<T> {
        let Some(plain) = cipher::decrypt(ciphertext, &self.passphrase) else {
            debug!("Record failed to decrypt");
            return None;
        };
        if plain.is_empty() {
            debug!("Record decrypted to empty plaintext");
            return None;
        }
        match serde_json::from_str(&plain) {
            Ok(record) => Some(record),
            Err(e) => {
                debug!("Record failed to parse: {}", e);
                None
            }
        }
    }

    /// Decode a batch, dropping records that fail. Output may be shorter than input.
    pub fn deserialize_all<'a, T, I>(&self, ciphertexts: I) -> Vec<T>
    where
        T: DeserializeOwned,
        I: IntoIterator<Item = &'a str>,
    {
        let mut skipped = 0usize;
        let records: Vec<T> = ciphertexts
            .into_iter()
            .filter_map(|c| {
                let record = self.deserialize::<T>(c);
                if record.is_none() {
                    skipped += 1;
                }
                record
            })
            .collect();

        if skipped > 0 {
            warn!("Skipped {} unreadable record(s)", skipped);
        }
        records
    }
}
