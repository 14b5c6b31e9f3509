use solace_crypto::CryptoError;

pub type Result<T> = std::result::Result<T, StoreError>;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("crypto error: {0}")]
    Crypto(#[from] CryptoError),
    #[error("share key not found: {0}")]
    KeyNotFound(String),
    #[error("share key already used: {0}")]
    KeyAlreadyUsed(String),
    #[error("invalid entry: {0}")]
    InvalidEntry(&'static str),
    #[error("DB lock poisoned: {0}")]
    LockPoisoned(String),
    #[error("no migration defined for schema version {0}")]
    UnknownSchemaVersion(i64),
}
