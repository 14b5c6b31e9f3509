//! Partition-level CRUD over a connection or an open transaction.
//!
//! Blob partitions hold `{id, data}` rows where `data` is ciphertext the
//! store never interprets. Pass a `&Transaction` (it derefs to
//! `&Connection`) to group several calls atomically.

use rusqlite::{Connection, OptionalExtension};

use solace_types::models::EncryptedRecord;

use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Partition {
    Emotions,
    Chat,
    UsedShareKeys,
}

impl Partition {
    fn table(self) -> &'static str {
        match self {
            Self::Emotions => "emotions",
            Self::Chat => "chat",
            Self::UsedShareKeys => "used_share_keys",
        }
    }
}

/// Partitions keyed by an auto-assigned integer and holding encrypted blobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlobPartition {
    Emotions,
    Chat,
}

impl BlobPartition {
    fn table(self) -> &'static str {
        Partition::from(self).table()
    }
}

impl From<BlobPartition> for Partition {
    fn from(p: BlobPartition) -> Self {
        match p {
            BlobPartition::Emotions => Partition::Emotions,
            BlobPartition::Chat => Partition::Chat,
        }
    }
}

/// Insert a blob and return its assigned id.
pub fn add(conn: &Connection, partition: BlobPartition, data: &str) -> Result<i64> {
    conn.execute(
        &format!("INSERT INTO {} (data) VALUES (?1)", partition.table()),
        [data],
    )?;
    Ok(conn.last_insert_rowid())
}

/// All records in id (insertion) order.
pub fn get_all(conn: &Connection, partition: BlobPartition) -> Result<Vec<EncryptedRecord>> {
    let mut stmt = conn.prepare(&format!("SELECT id, data FROM {} ORDER BY id", partition.table()))?;

    let rows = stmt
        .query_map([], |row| {
            Ok(EncryptedRecord {
                id: row.get(0)?,
                data: row.get(1)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows)
}

pub fn get(conn: &Connection, partition: BlobPartition, id: i64) -> Result<Option<EncryptedRecord>> {
    let row = conn
        .query_row(
            &format!("SELECT id, data FROM {} WHERE id = ?1", partition.table()),
            [id],
            |row| {
                Ok(EncryptedRecord {
                    id: row.get(0)?,
                    data: row.get(1)?,
                })
            },
        )
        .optional()?;

    Ok(row)
}

/// Insert or replace the record under its own id.
pub fn put(conn: &Connection, partition: BlobPartition, record: &EncryptedRecord) -> Result<()> {
    conn.execute(
        &format!(
            "INSERT INTO {} (id, data) VALUES (?1, ?2)
             ON CONFLICT(id) DO UPDATE SET data = excluded.data",
            partition.table()
        ),
        rusqlite::params![record.id, record.data],
    )?;
    Ok(())
}

/// Returns whether a row was removed.
pub fn delete(conn: &Connection, partition: BlobPartition, id: i64) -> Result<bool> {
    let removed = conn.execute(
        &format!("DELETE FROM {} WHERE id = ?1", partition.table()),
        [id],
    )?;
    Ok(removed > 0)
}

/// Empty one partition. Other partitions are untouched.
pub fn clear(conn: &Connection, partition: Partition) -> Result<usize> {
    let removed = conn.execute(&format!("DELETE FROM {}", partition.table()), [])?;
    Ok(removed)
}

pub fn count(conn: &Connection, partition: Partition) -> Result<usize> {
    let n: i64 = conn.query_row(
        &format!("SELECT COUNT(*) FROM {}", partition.table()),
        [],
        |r| r.get(0),
    )?;
    Ok(n as usize)
}
