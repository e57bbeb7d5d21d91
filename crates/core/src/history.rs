//! HistoryStore trait: the short-term memory collaborator.
//!
//! The engine reads the ordered turns of a conversation and appends new
//! turns to it. Storage is owned entirely by the implementation; the engine
//! only relies on the contracts below:
//!
//! - `get_history` returns turns in insertion order and an empty list for
//!   unknown conversations, never an error for that case.
//! - `persist` creates the conversation on first use (lazy creation).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::HistoryError;
use crate::message::{ConversationId, Role, Turn};

/// Title given to a conversation before its first user message.
pub const DEFAULT_TITLE: &str = "New Chat";

/// Maximum characters of the first user message kept as a title.
pub const TITLE_MAX_CHARS: usize = 50;

/// Listing entry for one conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationSummary {
    pub id: ConversationId,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub message_count: usize,
}

/// Derive a conversation title from its first user message.
///
/// Longer content is cut at [`TITLE_MAX_CHARS`] characters and marked with `...`.
pub fn derive_title(content: &str) -> String {
    if content.chars().count() > TITLE_MAX_CHARS {
        let head: String = content.chars().take(TITLE_MAX_CHARS).collect();
        format!("{head}...")
    } else {
        content.to_string()
    }
}

/// The conversation history collaborator.
///
/// Implementations: in-memory (for testing), JSONL file.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// The backend name (e.g., "file", "in_memory").
    fn name(&self) -> &str;

    /// Ordered turns of a conversation, oldest first.
    async fn get_history(&self, id: &ConversationId) -> Result<Vec<Turn>, HistoryError>;

    /// Append one turn, creating the conversation if it does not exist yet.
    async fn persist(&self, id: &ConversationId, role: Role, content: &str)
        -> Result<(), HistoryError>;

    /// Create an empty conversation with a fresh identifier.
    async fn create_conversation(&self, title: Option<&str>) -> Result<ConversationId, HistoryError>;

    /// Conversations holding at least one message, most recently updated first.
    async fn list_conversations(&self) -> Result<Vec<ConversationSummary>, HistoryError>;

    /// Delete a conversation and its turns. Returns whether it existed.
    async fn delete_conversation(&self, id: &ConversationId) -> Result<bool, HistoryError>;
}
