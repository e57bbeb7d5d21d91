//! File-based history backend: persistent JSON-lines storage.
//!
//! Each line is one JSON-encoded conversation record (id, title,
//! timestamps, ordered turns). Lines are ordered by last activity, so the
//! file doubles as the recency order used for listing.
//!
//! Storage location: `~/.recall/history.jsonl` by default.

use crate::conversation::{ConversationRecord, Conversations};
use async_trait::async_trait;
use recall_core::error::HistoryError;
use recall_core::history::{ConversationSummary, HistoryStore};
use recall_core::message::{ConversationId, Role, Turn};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// A file-backed history store using JSONL (one conversation per line).
///
/// Conversations are loaded into memory on creation and flushed to disk on
/// every mutation. This gives fast reads with durable writes.
pub struct FileHistory {
    path: PathBuf,
    conversations: Arc<RwLock<Conversations>>,
}

impl FileHistory {
    /// Open the history at `path`.
    ///
    /// A missing file starts empty (it is created on first write).
    pub fn new(path: PathBuf) -> Self {
        let records = Self::load_from_disk(&path);
        debug!(path = %path.display(), count = records.len(), "File history loaded");
        Self {
            path,
            conversations: Arc::new(RwLock::new(Conversations::from_records(records))),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load records from a JSONL file, skipping corrupted lines.
    fn load_from_disk(path: &Path) -> Vec<ConversationRecord> {
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(_) => return Vec::new(), // File doesn't exist yet
        };

        content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .filter_map(|line| match serde_json::from_str::<ConversationRecord>(line) {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!(error = %e, "Skipping corrupted conversation record");
                    None
                }
            })
            .collect()
    }

    /// Write every record to disk as JSONL.
    fn flush(&self, conversations: &Conversations) -> Result<(), HistoryError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                HistoryError::Storage(format!("Failed to create history directory: {e}"))
            })?;
        }

        let mut content = String::new();
        for record in conversations.records() {
            let line = serde_json::to_string(record).map_err(|e| {
                HistoryError::Serialization(format!("Failed to serialize conversation: {e}"))
            })?;
            content.push_str(&line);
            content.push('\n');
        }

        std::fs::write(&self.path, &content)
            .map_err(|e| HistoryError::Storage(format!("Failed to write history file: {e}")))?;

        Ok(())
    }
}

#[async_trait]
impl HistoryStore for FileHistory {
    fn name(&self) -> &str {
        "file"
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
        let mut conversations = self.conversations.write().await;
        conversations.append(id, role, content);
        self.flush(&conversations)
    }

    async fn create_conversation(&self, title: Option<&str>) -> Result<ConversationId, HistoryError> {
        let mut conversations = self.conversations.write().await;
        let id = conversations.create(title);
        self.flush(&conversations)?;
        Ok(id)
    }

    async fn list_conversations(&self) -> Result<Vec<ConversationSummary>, HistoryError> {
        Ok(self.conversations.read().await.list())
    }

    async fn delete_conversation(&self, id: &ConversationId) -> Result<bool, HistoryError> {
        let mut conversations = self.conversations.write().await;
        let deleted = conversations.delete(id);
        if deleted {
            self.flush(&conversations)?;
        }
        Ok(deleted)
    }
}
