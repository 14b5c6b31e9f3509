use serde::{Deserialize, Serialize};

// -- Emotions --

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SaveStatus {
    Inserted,
    Duplicate,
    /// Older than every entry kept in a full journal; not stored.
    Expired,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SaveEmotionResponse {
    pub status: SaveStatus,
    /// Store id of the new entry; absent when nothing was stored.
    pub id: Option<i64>,
    /// Records dropped by retention trimming.
    pub trimmed: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ClearResponse {
    pub removed: usize,
}

// -- Chat --

#[derive(Debug, Serialize, Deserialize)]
pub struct SaveChatResponse {
    pub id: i64,
}

// -- Share keys --

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct IssueShareKeyRequest {
    /// Key to issue; one is generated when absent.
    #[serde(default)]
    pub key: Option<String>,
}
