//! Conversation records shared by the history backends.

use chrono::{DateTime, Utc};
use recall_core::history::{ConversationSummary, DEFAULT_TITLE, derive_title};
use recall_core::message::{ConversationId, Role, Turn};
use serde::{Deserialize, Serialize};

/// One stored conversation with its ordered turns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationRecord {
    pub id: ConversationId,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub turns: Vec<Turn>,
}

impl ConversationRecord {
    pub fn new(id: ConversationId, title: Option<&str>) -> Self {
        let now = Utc::now();
        Self {
            id,
            title: title.unwrap_or(DEFAULT_TITLE).to_string(),
            created_at: now,
            updated_at: now,
            turns: Vec::new(),
        }
    }

    /// Append a turn. A user turn opening the conversation becomes its title.
    pub fn append(&mut self, role: Role, content: &str) {
        if self.turns.is_empty() && role == Role::User {
            self.title = derive_title(content);
        }
        self.turns.push(Turn::new(role, content));
        self.updated_at = Utc::now();
    }

    pub fn summary(&self) -> ConversationSummary {
        ConversationSummary {
            id: self.id.clone(),
            title: self.title.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
            message_count: self.turns.len(),
        }
    }
}

/// Conversation records ordered by last activity, least recent first.
#[derive(Debug, Clone, Default)]
pub struct Conversations {
    records: Vec<ConversationRecord>,
}

impl Conversations {
    pub fn from_records(records: Vec<ConversationRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[ConversationRecord] {
        &self.records
    }

    fn position(&self, id: &ConversationId) -> Option<usize> {
        self.records.iter().position(|r| &r.id == id)
    }

    pub fn history(&self, id: &ConversationId) -> Vec<Turn> {
        self.position(id)
            .map(|i| self.records[i].turns.clone())
            .unwrap_or_default()
    }

    /// Append a turn, creating the conversation on first use.
    ///
    /// The touched record moves to the most-recent end.
    pub fn append(&mut self, id: &ConversationId, role: Role, content: &str) {
        let mut record = match self.position(id) {
            Some(i) => self.records.remove(i),
            None => ConversationRecord::new(id.clone(), None),
        };
        record.append(role, content);
        self.records.push(record);
    }

    pub fn create(&mut self, title: Option<&str>) -> ConversationId {
        let id = ConversationId::new();
        self.records.push(ConversationRecord::new(id.clone(), title));
        id
    }

    /// Conversations with at least one turn, most recently updated first.
    pub fn list(&self) -> Vec<ConversationSummary> {
        self.records
            .iter()
            .rev()
            .filter(|r| !r.turns.is_empty())
            .map(ConversationRecord::summary)
            .collect()
    }

    pub fn delete(&mut self, id: &ConversationId) -> bool {
        let before = self.records.len();
        self.records.retain(|r| &r.id != id);
        self.records.len() < before
    }
}
