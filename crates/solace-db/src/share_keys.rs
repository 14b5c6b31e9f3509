use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension};
use tracing::{info, warn};

use solace_types::models::ShareKeyRecord;

use crate::Database;
use crate::error::{Result, StoreError};
use crate::models::ShareKeyRow;

impl Database {
    /// Issue (or re-issue) a share key as unused.
    pub fn issue_share_key(&self, key: &str) -> Result<ShareKeyRecord> {
        if key.is_empty() {
            return Err(StoreError::InvalidEntry("share key must not be empty"));
        }

        self.with_tx(|tx| {
            tx.execute(
                "INSERT INTO used_share_keys (key, used, used_at) VALUES (?1, 0, NULL)
                 ON CONFLICT(key) DO UPDATE SET used = 0, used_at = NULL",
                [key],
            )?;
            Ok(())
        })?;

        info!("Share key issued");
        Ok(ShareKeyRecord::unused(key))
    }

    pub fn get_share_key(&self, key: &str) -> Result<Option<ShareKeyRecord>> {
        self.with_conn(|conn| Ok(query_share_key(conn, key)?.map(ShareKeyRow::into_record)))
    }

    pub fn redeem_share_key(&self, key: &str) -> Result<ShareKeyRecord> {
        self.redeem_share_key_at(key, Utc::now())
    }

    /// Mark a key used. Lookup and update share one transaction so two
    /// callers can never both see it unused.
    pub fn redeem_share_key_at(&self, key: &str, now: DateTime<Utc>) -> Result<ShareKeyRecord> {
        self.with_tx(|tx| {
            let row = query_share_key(tx, key)?
                .ok_or_else(|| StoreError::KeyNotFound(key.to_string()))?;

            if row.used {
                warn!("Rejected redemption of an already used share key");
                return Err(StoreError::KeyAlreadyUsed(key.to_string()));
            }

            tx.execute(
                "UPDATE used_share_keys SET used = 1, used_at = ?2 WHERE key = ?1",
                rusqlite::params![key, now.to_rfc3339()],
            )?;

            info!("Share key redeemed");
            Ok(ShareKeyRecord {
                key: row.key,
                used: true,
                used_at: Some(now),
            })
        })
    }
}

fn query_share_key(conn: &Connection, key: &str) -> Result<Option<ShareKeyRow>> {
    let row = conn
        .query_row(
            "SELECT key, used, used_at FROM used_share_keys WHERE key = ?1",
            [key],
            |row| {
                Ok(ShareKeyRow {
                    key: row.get(0)?,
                    used: row.get(1)?,
                    used_at: row.get(2)?,
                })
            },
        )
        .optional()?;

    Ok(row)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::memory_db;
    use chrono::TimeZone;

    fn noon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 18, 12, 0, 0).unwrap()
    }

    #[test]
    fn issued_key_starts_unused() {
        let db = memory_db();
        db.issue_share_key("ABC").unwrap();
        assert_eq!(db.get_share_key("ABC").unwrap(), Some(ShareKeyRecord::unused("ABC")));
        assert_eq!(db.get_share_key("XYZ").unwrap(), None);
    }

    #[test]
    fn redeem_records_timestamp() {
        let db = memory_db();
        db.issue_share_key("ABC").unwrap();

        let redeemed = db.redeem_share_key_at("ABC", noon()).unwrap();
        assert!(redeemed.used);
        assert_eq!(redeemed.used_at, Some(noon()));

        let stored = db.get_share_key("ABC").unwrap().unwrap();
        assert_eq!(stored, redeemed);
    }

    #[test]
    fn reissue_resets_a_used_key() {
        let db = memory_db();
        db.issue_share_key("ABC").unwrap();
        db.redeem_share_key_at("ABC", noon()).unwrap();

        db.issue_share_key("ABC").unwrap();
        assert_eq!(db.get_share_key("ABC").unwrap(), Some(ShareKeyRecord::unused("ABC")));
        assert!(db.redeem_share_key("ABC").is_ok());
    }

    #[test]
    fn empty_key_cannot_be_issued() {
        let db = memory_db();
        assert!(matches!(db.issue_share_key(""), Err(StoreError::InvalidEntry(_))));
    }
}
