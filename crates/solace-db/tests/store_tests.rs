use std::sync::Arc;
use std::thread;

use chrono::{DateTime, TimeDelta, TimeZone, Utc};

use solace_crypto::{Passphrase, RecordCodec};
use solace_db::emotions::RETENTION_LIMIT;
use solace_db::{BlobPartition, Database, Partition, SaveOutcome, StoreError, store};
use solace_types::models::{ChatMessage, ChatRole, EmotionEntry, EntryMatch};

fn codec(key: &str) -> RecordCodec {
    RecordCodec::new(Passphrase::new(key).unwrap())
}

fn db() -> Database {
    Database::open_in_memory(codec("integration-key")).unwrap()
}

fn base() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 18, 8, 0, 0).unwrap()
}

fn entry(emotion: &str, reason: &str, date: DateTime<Utc>, strength: i64) -> EmotionEntry {
    EmotionEntry {
        emotion: emotion.into(),
        reason: Some(reason.into()),
        date: date.to_rfc3339(),
        strength,
    }
}

fn count(db: &Database, partition: Partition) -> usize {
    db.with_conn(|conn| store::count(conn, partition)).unwrap()
}

#[test]
fn saved_entries_roundtrip_through_encryption() {
    let db = db();
    let e = entry("Happy", "coffee with a friend", base(), 4);
    db.save_emotion_at(&e, base()).unwrap();

    assert_eq!(db.load_emotions().unwrap(), vec![e]);

    let raw = db
        .with_conn(|conn| store::get_all(conn, BlobPartition::Emotions))
        .unwrap();
    assert!(!raw[0].data.contains("coffee"));
}

#[test]
fn duplicate_within_an_hour_is_dropped() {
    let db = db();
    let e = entry("Anxious", "exam", base(), 3);

    let first = db.save_emotion_at(&e, base()).unwrap();
    assert!(matches!(first, SaveOutcome::Inserted { trimmed: 0, .. }));

    let again = entry("Anxious", "exam", base() + TimeDelta::minutes(20), 3);
    let second = db
        .save_emotion_at(&again, base() + TimeDelta::minutes(20))
        .unwrap();
    assert_eq!(second, SaveOutcome::Duplicate);
    assert_eq!(db.load_emotions().unwrap().len(), 1);
}

#[test]
fn same_entry_after_the_window_is_kept() {
    let db = db();
    let later = base() + TimeDelta::minutes(61);

    db.save_emotion_at(&entry("Anxious", "exam", base(), 3), base())
        .unwrap();
    let outcome = db
        .save_emotion_at(&entry("Anxious", "exam", later, 3), later)
        .unwrap();

    assert!(matches!(outcome, SaveOutcome::Inserted { .. }));
    assert_eq!(db.load_emotions().unwrap().len(), 2);
}

#[test]
fn retention_keeps_the_hundred_newest() {
    let db = db();

    for i in 0..105 {
        let date = base() + TimeDelta::minutes(i);
        let e = entry("Happy", &format!("reason {}", i), date, 3);
        db.save_emotion_at(&e, date).unwrap();
    }
    let last = base() + TimeDelta::minutes(104);

    let kept = db.load_emotions().unwrap();
    assert_eq!(kept.len(), RETENTION_LIMIT);

    let reasons: Vec<String> = kept.iter().filter_map(|e| e.reason.clone()).collect();
    for i in 0..5 {
        assert!(!reasons.contains(&format!("reason {}", i)));
    }
    for i in 5..105 {
        assert!(reasons.contains(&format!("reason {}", i)));
    }
    assert_eq!(kept.last().unwrap().date, last.to_rfc3339());
}

#[test]
fn retention_trims_by_date_not_insert_order() {
    let db = db();
    let now = base() + TimeDelta::days(1);

    // Insert newest first so storage order is the reverse of date order.
    for i in 0..RETENTION_LIMIT as i64 {
        let date = base() - TimeDelta::minutes(i);
        db.save_emotion_at(&entry("Sad", &format!("r{}", i), date, 1), now)
            .unwrap();
    }

    let outcome = db
        .save_emotion_at(&entry("Happy", "new", now, 5), now)
        .unwrap();
    assert!(matches!(outcome, SaveOutcome::Inserted { trimmed: 1, .. }));

    let reasons: Vec<String> = db
        .load_emotions()
        .unwrap()
        .into_iter()
        .filter_map(|e| e.reason)
        .collect();
    assert_eq!(reasons.len(), RETENTION_LIMIT);
    // r99 carries the oldest date.
    assert!(!reasons.contains(&"r99".to_string()));
    assert!(reasons.contains(&"r0".to_string()));
}

#[test]
fn retention_keeps_the_newest_when_saved_newest_first() {
    let db = db();
    let now = base() + TimeDelta::days(1);

    let mut expired = 0;
    for i in 0..105 {
        let date = base() - TimeDelta::minutes(i);
        let outcome = db
            .save_emotion_at(&entry("Tired", &format!("r{}", i), date, 2), now)
            .unwrap();
        if outcome == SaveOutcome::Expired {
            expired += 1;
        }
    }
    assert_eq!(expired, 5);

    let reasons: Vec<String> = db
        .load_emotions()
        .unwrap()
        .into_iter()
        .filter_map(|e| e.reason)
        .collect();
    assert_eq!(reasons.len(), RETENTION_LIMIT);
    for i in 0..100 {
        assert!(reasons.contains(&format!("r{}", i)));
    }
    for i in 100..105 {
        assert!(!reasons.contains(&format!("r{}", i)));
    }
}

#[test]
fn unreadable_records_are_trimmed_first() {
    let db = db();
    let now = base() + TimeDelta::days(1);

    db.with_tx(|tx| store::add(tx, BlobPartition::Emotions, "corrupt"))
        .unwrap();
    for i in 0..(RETENTION_LIMIT as i64 - 1) {
        let date = base() - TimeDelta::days(365) + TimeDelta::minutes(i);
        db.save_emotion_at(&entry("Sad", &format!("r{}", i), date, 1), now)
            .unwrap();
    }
    assert_eq!(count(&db, Partition::Emotions), RETENTION_LIMIT);

    db.save_emotion_at(&entry("Happy", "new", now, 5), now)
        .unwrap();

    let raw = db
        .with_conn(|conn| store::get_all(conn, BlobPartition::Emotions))
        .unwrap();
    assert_eq!(raw.len(), RETENTION_LIMIT);
    assert!(raw.iter().all(|r| r.data != "corrupt"));
}

#[test]
fn corrupt_records_are_skipped_on_load() {
    let db = db();
    db.save_emotion_at(&entry("Happy", "a", base(), 1), base())
        .unwrap();
    db.with_tx(|tx| store::add(tx, BlobPartition::Emotions, "U2FsdGVkX1+garbage"))
        .unwrap();

    assert_eq!(count(&db, Partition::Emotions), 2);
    assert_eq!(db.load_emotions().unwrap().len(), 1);
}

#[test]
fn delete_one_by_match() {
    let db = db();
    let keep = entry("Sad", "rain", base(), 2);
    let gone = entry("Angry", "traffic", base() + TimeDelta::minutes(5), 4);
    db.save_emotion_at(&keep, base()).unwrap();
    db.save_emotion_at(&gone, base() + TimeDelta::minutes(5))
        .unwrap();

    let miss = EntryMatch {
        date: gone.date.clone(),
        emotion: "Angry".into(),
        reason: Some("Traffic".into()),
    };
    assert!(!db.delete_emotion(&miss).unwrap());
    assert_eq!(db.load_emotions().unwrap().len(), 2);

    assert!(db.delete_emotion(&EntryMatch::from(&gone)).unwrap());
    assert_eq!(db.load_emotions().unwrap(), vec![keep]);

    assert!(!db.delete_emotion(&EntryMatch::from(&gone)).unwrap());
}

#[test]
fn delete_one_removes_only_first_of_equal_triples() {
    let db = db();
    // Different strength, same date/emotion/reason.
    db.save_emotion_at(&entry("Sad", "rain", base(), 1), base())
        .unwrap();
    db.save_emotion_at(&entry("Sad", "rain", base(), 5), base())
        .unwrap();

    assert!(db.delete_emotion(&EntryMatch::from(&entry("Sad", "rain", base(), 0))).unwrap());

    let left = db.load_emotions().unwrap();
    assert_eq!(left.len(), 1);
    assert_eq!(left[0].strength, 5);
}

#[test]
fn clearing_emotions_leaves_other_partitions() {
    let db = db();
    db.save_emotion_at(&entry("Happy", "a", base(), 1), base())
        .unwrap();
    db.save_chat_message(&ChatMessage {
        role: ChatRole::User,
        content: "hello".into(),
    })
    .unwrap();
    db.issue_share_key("ABC").unwrap();

    assert_eq!(db.clear_emotions().unwrap(), 1);

    assert_eq!(count(&db, Partition::Emotions), 0);
    assert_eq!(count(&db, Partition::Chat), 1);
    assert_eq!(count(&db, Partition::UsedShareKeys), 1);
}

#[test]
fn share_key_redeems_exactly_once() {
    let db = db();
    db.issue_share_key("ABC").unwrap();

    assert!(db.redeem_share_key("ABC").is_ok());
    assert!(matches!(
        db.redeem_share_key("ABC"),
        Err(StoreError::KeyAlreadyUsed(k)) if k == "ABC"
    ));
    assert!(matches!(
        db.redeem_share_key("ZZZ"),
        Err(StoreError::KeyNotFound(k)) if k == "ZZZ"
    ));
}

#[test]
fn racing_redeemers_get_one_success() {
    let db = Arc::new(db());
    db.issue_share_key("RACE").unwrap();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let db = Arc::clone(&db);
            thread::spawn(move || db.redeem_share_key("RACE").is_ok())
        })
        .collect();

    let successes = handles
        .into_iter()
        .map(|h| h.join().unwrap())
        .filter(|ok| *ok)
        .count();
    assert_eq!(successes, 1);
}

#[test]
fn racing_saves_of_the_same_entry_store_one() {
    let db = Arc::new(db());
    let e = entry("Overwhelmed", "deadline", base(), 4);

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let db = Arc::clone(&db);
            let e = e.clone();
            thread::spawn(move || db.save_emotion_at(&e, base()).unwrap())
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    assert_eq!(db.load_emotions().unwrap().len(), 1);
}

#[test]
fn file_database_persists_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("journal.db");

    {
        let db = Database::open(&path, codec("file-key")).unwrap();
        db.save_emotion_at(&entry("Happy", "sun", base(), 3), base())
            .unwrap();
        db.issue_share_key("KEEP").unwrap();
    }

    let db = Database::open(&path, codec("file-key")).unwrap();
    assert_eq!(db.load_emotions().unwrap().len(), 1);
    assert!(db.get_share_key("KEEP").unwrap().is_some());
}

#[test]
fn reopening_with_another_key_hides_records() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("journal.db");

    {
        let db = Database::open(&path, codec("first-key")).unwrap();
        db.save_emotion_at(&entry("Happy", "sun", base(), 3), base())
            .unwrap();
    }

    let db = Database::open(&path, codec("second-key")).unwrap();
    assert!(db.load_emotions().unwrap().is_empty());
    assert_eq!(count(&db, Partition::Emotions), 1);
}

#[test]
fn v1_database_upgrades_in_place() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("legacy.db");

    {
        let db = Database::open_at_version(&path, codec("k"), 1).unwrap();
        assert_eq!(db.schema_version().unwrap(), 1);
        db.save_emotion_at(&entry("Guilty", "forgot call", base(), 2), base())
            .unwrap();
        assert!(db.issue_share_key("ABC").is_err());
    }

    let db = Database::open(&path, codec("k")).unwrap();
    assert_eq!(db.schema_version().unwrap(), 2);
    assert_eq!(db.load_emotions().unwrap().len(), 1);
    db.issue_share_key("ABC").unwrap();
}
