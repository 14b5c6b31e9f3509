use tracing::info;

use solace_types::models::ChatMessage;

use crate::Database;
use crate::error::Result;
use crate::store::{self, BlobPartition, Partition};

impl Database {
    /// Append one encrypted chat turn and return its id.
    pub fn save_chat_message(&self, message: &ChatMessage) -> Result<i64> {
        let data = self.codec().serialize(message)?;
        self.with_tx(|tx| store::add(tx, BlobPartition::Chat, &data))
    }

    /// Readable chat turns in the order they were saved.
    pub fn load_chat_messages(&self) -> Result<Vec<ChatMessage>> {
        self.with_conn(|conn| {
            let records = store::get_all(conn, BlobPartition::Chat)?;
            Ok(self.codec().deserialize_all(records.iter().map(|r| r.data.as_str())))
        })
    }

    pub fn clear_chat(&self) -> Result<usize> {
        let removed = self.with_tx(|tx| store::clear(tx, Partition::Chat))?;
        info!("Cleared {} chat messages", removed);
        Ok(removed)
    }
}
