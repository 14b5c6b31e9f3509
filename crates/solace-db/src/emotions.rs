use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeDelta, TimeZone, Utc};
use tracing::{debug, info};

use solace_types::models::{EmotionEntry, EntryMatch, StoredEmotion};

use crate::Database;
use crate::error::{Result, StoreError};
use crate::store::{self, BlobPartition, Partition};

/// Most entries kept in the journal after a save.
pub const RETENTION_LIMIT: usize = 100;

/// Identical entries saved within this many seconds of each other are dropped.
pub const DEDUP_WINDOW_SECS: i64 = 60 * 60;

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%d.%m.%Y, %H:%M:%S",
    "%d.%m.%Y %H:%M:%S",
    "%m/%d/%Y, %I:%M:%S %p",
    "%m/%d/%Y, %H:%M:%S",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d.%m.%Y", "%m/%d/%Y"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Inserted { id: i64, trimmed: usize },
    /// Same emotion, reason and strength already logged within the window.
    Duplicate,
    /// The journal is full and the entry is older than everything kept.
    Expired,
}

/// Retention candidate. `Incoming` outranks stored rows with the same timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Slot {
    Stored(i64),
    Incoming,
}

/// Best-effort timestamp for an entry's caller-formatted `date`.
///
/// Accepts RFC 3339 plus the common browser locale layouts. Strings without
/// an offset are read as local time; date-only strings as local midnight.
pub fn entry_timestamp(date: &str) -> Option<DateTime<Utc>> {
    let date = date.trim();

    if let Ok(ts) = DateTime::parse_from_rfc3339(date) {
        return Some(ts.with_timezone(&Utc));
    }

    let naive = DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(date, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(date, fmt).ok())
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })?;

    resolve_local(&Local, &naive)
}

/// Wall-clock times skipped by a spring-forward transition resolve one hour
/// later; repeated times resolve to the earlier instant.
fn resolve_local<Tz: TimeZone>(tz: &Tz, naive: &NaiveDateTime) -> Option<DateTime<Utc>> {
    tz.from_local_datetime(naive)
        .earliest()
        .or_else(|| tz.from_local_datetime(&(*naive + TimeDelta::hours(1))).earliest())
        .map(|ts| ts.with_timezone(&Utc))
}

fn same_content(a: &EmotionEntry, b: &EmotionEntry) -> bool {
    a.emotion == b.emotion && a.reason == b.reason && a.strength == b.strength
}

struct Scanned {
    id: i64,
    entry: Option<EmotionEntry>,
}

impl Scanned {
    fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.entry.as_ref().and_then(|e| entry_timestamp(&e.date))
    }
}

impl Database {
    fn scan_emotions(&self, conn: &rusqlite::Connection) -> Result<Vec<Scanned>> {
        let records = store::get_all(conn, BlobPartition::Emotions)?;
        Ok(records
            .into_iter()
            .map(|r| Scanned {
                id: r.id,
                entry: self.codec().deserialize(&r.data),
            })
            .collect())
    }

    pub fn save_emotion(&self, entry: &EmotionEntry) -> Result<SaveOutcome> {
        self.save_emotion_at(entry, Utc::now())
    }

    /// Save with an explicit "now" for the dedup window.
    ///
    /// Scan, dedup check, retention trim and insert all happen in one
    /// transaction. Unreadable records never count as duplicates and sort
    /// as the oldest entries when trimming. The incoming entry is ranked with
    /// the stored ones, so a full journal rejects it as `Expired` when it is
    /// older than all of them.
    pub fn save_emotion_at(&self, entry: &EmotionEntry, now: DateTime<Utc>) -> Result<SaveOutcome> {
        if entry.emotion.trim().is_empty() {
            return Err(StoreError::InvalidEntry("emotion must not be empty"));
        }

        let data = self.codec().serialize(entry)?;
        let window_start = now - TimeDelta::seconds(DEDUP_WINDOW_SECS);

        self.with_tx(|tx| {
            let existing = self.scan_emotions(tx)?;

            let duplicate = existing.iter().any(|s| {
                s.entry.as_ref().is_some_and(|e| same_content(e, entry))
                    && s.timestamp().is_some_and(|ts| ts > window_start && ts <= now)
            });
            if duplicate {
                debug!("Skipping duplicate emotion entry");
                return Ok(SaveOutcome::Duplicate);
            }

            let mut trimmed = 0;
            if existing.len() >= RETENTION_LIMIT {
                // Newest first; no timestamp sorts last, ties by id.
                let mut ranked: Vec<(Option<DateTime<Utc>>, Slot)> = existing
                    .iter()
                    .map(|s| (s.timestamp(), Slot::Stored(s.id)))
                    .collect();
                ranked.push((entry_timestamp(&entry.date), Slot::Incoming));
                ranked.sort_by(|a, b| b.cmp(a));

                let mut expired = false;
                for &(_, slot) in &ranked[RETENTION_LIMIT..] {
                    match slot {
                        Slot::Stored(id) => {
                            if store::delete(tx, BlobPartition::Emotions, id)? {
                                trimmed += 1;
                            }
                        }
                        Slot::Incoming => expired = true,
                    }
                }
                info!("Retention trimmed {} emotion entries", trimmed);

                if expired {
                    debug!("Emotion entry is older than the retained journal");
                    return Ok(SaveOutcome::Expired);
                }
            }

            let id = store::add(tx, BlobPartition::Emotions, &data)?;
            Ok(SaveOutcome::Inserted { id, trimmed })
        })
    }

    /// All readable entries in storage order.
    pub fn load_emotions(&self) -> Result<Vec<EmotionEntry>> {
        self.with_conn(|conn| {
            let records = store::get_all(conn, BlobPartition::Emotions)?;
            Ok(self.codec().deserialize_all(records.iter().map(|r| r.data.as_str())))
        })
    }

    /// Readable entries with their store ids.
    pub fn list_emotions(&self) -> Result<Vec<StoredEmotion>> {
        self.with_conn(|conn| {
            Ok(self
                .scan_emotions(conn)?
                .into_iter()
                .filter_map(|s| s.entry.map(|entry| StoredEmotion { id: s.id, entry }))
                .collect())
        })
    }

    /// Delete the first entry (in storage order) whose date, emotion and
    /// reason equal `target` exactly. Returns whether one was found.
    pub fn delete_emotion(&self, target: &EntryMatch) -> Result<bool> {
        self.with_tx(|tx| {
            let found = self
                .scan_emotions(tx)?
                .into_iter()
                .find(|s| s.entry.as_ref().is_some_and(|e| target.matches(e)));

            match found {
                Some(s) => store::delete(tx, BlobPartition::Emotions, s.id),
                None => Ok(false),
            }
        })
    }

    pub fn delete_emotion_by_id(&self, id: i64) -> Result<bool> {
        self.with_tx(|tx| store::delete(tx, BlobPartition::Emotions, id))
    }

    /// Empty the journal. Chat and share keys are untouched.
    pub fn clear_emotions(&self) -> Result<usize> {
        let removed = self.with_tx(|tx| store::clear(tx, Partition::Emotions))?;
        info!("Cleared {} emotion entries", removed);
        Ok(removed)
    }
}
