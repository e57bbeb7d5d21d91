//! In-memory history backend: useful for testing and ephemeral sessions.

use crate::conversation::Conversations;
use async_trait::async_trait;
use recall_core::error::HistoryError;
use recall_core::history::{ConversationSummary, HistoryStore};
use recall_core::message::{ConversationId, Role, Turn};
use std::sync::Arc;
use tokio::sync::RwLock;

/// A history store that keeps every conversation in process memory.
pub struct InMemoryHistory {
    conversations: Arc<RwLock<Conversations>>,
}

impl InMemoryHistory {
    pub fn new() -> Self {
        Self {
            conversations: Arc::new(RwLock::new(Conversations::default())),
        }
    }
}

impl Default for InMemoryHistory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HistoryStore for InMemoryHistory {
    fn name(&self) -> &str {
        "in_memory"
    }

    async fn get_history(&self, id: &ConversationId) -> Result<Vec<Turn>, HistoryError> {
        Ok(self.conversations.read().await.history(id))
    }

    async fn persist(
        &self,
        id: &ConversationId,
        role: Role,
        content: &str,
    ) -> Result<(), HistoryError> {
        self.conversations.write().await.append(id, role, content);
        Ok(())
    }

    async fn create_conversation(&self, title: Option<&str>) -> Result<ConversationId, HistoryError> {
        Ok(self.conversations.write().await.create(title))
    }

    async fn list_conversations(&self) -> Result<Vec<ConversationSummary>, HistoryError> {
        Ok(self.conversations.read().await.list())
    }

    async fn delete_conversation(&self, id: &ConversationId) -> Result<bool, HistoryError> {
        Ok(self.conversations.write().await.delete(id))
    }
}
