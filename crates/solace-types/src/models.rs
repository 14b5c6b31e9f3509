use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Opaque unit stored in a blob partition. The store never looks inside `data`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedRecord {
    pub id: i64,
    pub data: String,
}

/// A single mood journal entry, as the UI writes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmotionEntry {
    pub emotion: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Caller-formatted date; returned verbatim.
    pub date: String,
    pub strength: i64,
}

impl EmotionEntry {
    /// Strength as shown on screen (0..=5 stars). Stored values are never clamped.
    pub fn display_strength(&self) -> u8 {
        self.strength.clamp(0, 5) as u8
    }
}

/// Journal entry together with the id the store assigned to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredEmotion {
    pub id: i64,
    #[serde(flatten)]
    pub entry: EmotionEntry,
}

/// Field triple used to pick an entry for deletion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryMatch {
    pub date: String,
    pub emotion: String,
    #[serde(default)]
    pub reason: Option<String>,
}

impl EntryMatch {
    pub fn matches(&self, entry: &EmotionEntry) -> bool {
        self.date == entry.date && self.emotion == entry.emotion && self.reason == entry.reason
    }
}

impl From<&EmotionEntry> for EntryMatch {
    fn from(entry: &EmotionEntry) -> Self {
        Self {
            date: entry.date.clone(),
            emotion: entry.emotion.clone(),
            reason: entry.reason.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

/// One turn of the assistant chat transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

/// Ledger row for a one-time share key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareKeyRecord {
    pub key: String,
    pub used: bool,
    pub used_at: Option<DateTime<Utc>>,
}

impl ShareKeyRecord {
    pub fn unused(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            used: false,
            used_at: None,
        }
    }
}
