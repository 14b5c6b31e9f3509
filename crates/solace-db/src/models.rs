use chrono::{DateTime, Utc};
use tracing::warn;

use solace_types::models::ShareKeyRecord;

/// Database row types: these map directly to SQLite rows.
/// Distinct from solace-types records to keep the DB layer independent.
pub struct ShareKeyRow {
    pub key: String,
    pub used: bool,
    pub used_at: Option<String>,
}

impl ShareKeyRow {
    pub fn into_record(self) -> ShareKeyRecord {
        let used_at = self.used_at.and_then(|raw| {
            DateTime::parse_from_rfc3339(&raw)
                .map(|ts| ts.with_timezone(&Utc))
                .map_err(|e| warn!("Corrupt used_at '{}' on share key: {}", raw, e))
                .ok()
        });

        ShareKeyRecord {
            key: self.key,
            used: self.used,
            used_at,
        }
    }
}
