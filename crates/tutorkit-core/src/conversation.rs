//! Conversation log access: bounded history reads and turn recording.

use std::sync::Arc;

use crate::error::StorageError;
use crate::model::{Role, Turn};
use crate::traits::ConversationStore;

/// Reads bounded, chronologically ordered windows of a student's
/// conversation.
#[derive(Clone)]
pub struct HistoryFetcher {
    store: Arc<dyn ConversationStore>,
}

impl HistoryFetcher {
    pub fn new(store: Arc<dyn ConversationStore>) -> Self {
        Self { store }
    }

    /// Up to `limit` most recent turns, oldest first.
    ///
    /// The store contract hands back newest-first; prompt assembly wants
    /// chronological order, so the window is reversed here.
    pub async fn fetch(&self, student_id: &str, limit: u32) -> Result<Vec<Turn>, StorageError> {
        let mut turns = self.store.query_recent(student_id, limit).await?;
        turns.reverse();
        Ok(turns)
    }
}

/// Appends turns to a student's conversation log.
#[derive(Clone)]
pub struct ConversationRecorder {
    store: Arc<dyn ConversationStore>,
}

impl ConversationRecorder {
    pub fn new(store: Arc<dyn ConversationStore>) -> Self {
        Self { store }
    }

    /// Append one turn, stamped with the current UTC time.
    ///
    /// Storage faults propagate: a silently dropped turn would corrupt
    /// every later prompt built from this log.
    pub async fn record(
        &self,
        student_id: &str,
        role: Role,
        text: &str,
    ) -> Result<(), StorageError> {
        self.store.append(student_id, &Turn::now(role, text)).await
    }
}
