//! Solace Crypto Library
//!
//! At-rest encryption for journal records: a passphrase-keyed AES-256-CBC
//! adapter and a JSON record codec layered on top of it.
//!
//! Every ciphertext carries an HMAC-SHA256 tag so tampered records are
//! rejected outright instead of surfacing as garbled plaintext.

pub mod cipher;
pub mod codec;
pub mod keys;

pub use codec::RecordCodec;
pub use keys::Passphrase;

#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    #[error("no encryption key configured and no fallback supplied")]
    EncryptionKeyMissing,
    #[error("record serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("encryption failed: {0}")]
    Encrypt(String),
}
