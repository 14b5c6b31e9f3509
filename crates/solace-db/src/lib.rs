//! Encrypted local record store.
//!
//! One SQLite connection holds three partitions: `emotions` and `chat`
//! (auto-keyed encrypted blobs) and `usedShareKeys` (the one-time share key
//! ledger). Callers only ever see decrypted domain records.

pub mod chat;
pub mod emotions;
pub mod error;
pub mod migrations;
pub mod models;
pub mod share_keys;
pub mod store;

pub use emotions::SaveOutcome;
pub use error::{Result, StoreError};
pub use store::{BlobPartition, Partition};

use rusqlite::{Connection, Transaction, TransactionBehavior};
use solace_crypto::RecordCodec;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::info;

pub struct Database {
    conn: Mutex<Connection>,
    codec: RecordCodec,
}

impl Database {
    /// Open or create the database at the latest schema version.
    pub fn open(path: &Path, codec: RecordCodec) -> Result<Self> {
        Self::open_at_version(path, codec, migrations::SCHEMA_VERSION)
    }

    pub fn open_at_version(path: &Path, codec: RecordCodec, target: i64) -> Result<Self> {
        let conn = Connection::open(path)?;

        // WAL mode for concurrent reads
        conn.pragma_update(None, "journal_mode", "WAL")?;

        let db = Self::init(conn, codec, target)?;
        info!("Database opened at {}", path.display());
        Ok(db)
    }

    pub fn open_in_memory(codec: RecordCodec) -> Result<Self> {
        Self::init(Connection::open_in_memory()?, codec, migrations::SCHEMA_VERSION)
    }

    fn init(mut conn: Connection, codec: RecordCodec, target: i64) -> Result<Self> {
        migrations::run(&mut conn, target)?;
        Ok(Self {
            conn: Mutex::new(conn),
            codec,
        })
    }

    pub fn schema_version(&self) -> Result<i64> {
        self.with_conn(migrations::current_version)
    }

    pub(crate) fn codec(&self) -> &RecordCodec {
        &self.codec
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| StoreError::LockPoisoned(e.to_string()))
    }

    /// Run a read against the shared connection.
    pub fn with_conn<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let conn = self.lock()?;
        f(&conn)
    }

    /// Run `f` inside one read-write transaction. Commits when `f` returns
    /// `Ok`; any error rolls the whole transaction back.
    pub fn with_tx<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Transaction<'_>) -> Result<T>,
    {
        let mut conn = self.lock()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let value = f(&tx)?;
        tx.commit()?;
        Ok(value)
    }
}
