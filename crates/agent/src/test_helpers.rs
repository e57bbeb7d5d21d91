//! Shared test helpers for engine tests.

use async_trait::async_trait;
use recall_core::error::{HistoryError, ProviderError};
use recall_core::history::{ConversationSummary, HistoryStore};
use recall_core::message::{ConversationId, Role, Turn};
use recall_core::provider::{
    EmbeddingRequest, EmbeddingResponse, Provider, ProviderRequest, ProviderResponse, Usage,
};
use std::collections::VecDeque;
use std::sync::Mutex;

pub const EMBEDDING_DIM: usize = 32;

/// Bag-of-words embedding: each word bumps one hashed bucket.
///
/// Texts sharing words land close together, which is enough to make
/// retrieval deterministic in tests.
pub fn keyword_embedding(text: &str) -> Vec<f32> {
    let mut v = vec![0.0; EMBEDDING_DIM];
    for word in text
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
    {
        let bucket = word
            .to_lowercase()
            .bytes()
            .fold(7usize, |h, b| h.wrapping_mul(31).wrapping_add(b as usize));
        v[bucket % EMBEDDING_DIM] += 1.0;
    }
    v
}

/// A provider that returns scripted answers and keyword embeddings.
///
/// Panics if `complete` is called more times than answers were scripted.
pub struct ScriptedProvider {
    answers: Mutex<VecDeque<String>>,
    requests: Mutex<Vec<ProviderRequest>>,
    embedded: Mutex<Vec<String>>,
    fail_complete: bool,
    fail_embed: bool,
}

impl ScriptedProvider {
    pub fn new(answers: &[&str]) -> Self {
        Self {
            answers: Mutex::new(answers.iter().map(|a| a.to_string()).collect()),
            requests: Mutex::new(Vec::new()),
            embedded: Mutex::new(Vec::new()),
            fail_complete: false,
            fail_embed: false,
        }
    }

    /// Every `complete` call fails with a 503.
    pub fn failing_completion() -> Self {
        Self {
            fail_complete: true,
            ..Self::new(&[])
        }
    }

    /// Every `embed` call fails with a network error.
    pub fn failing_embeddings(answers: &[&str]) -> Self {
        Self {
            fail_embed: true,
            ..Self::new(answers)
        }
    }

    pub fn requests(&self) -> Vec<ProviderRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn embedded_texts(&self) -> Vec<String> {
        self.embedded.lock().unwrap().clone()
    }
}

#[async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        self.requests.lock().unwrap().push(request.clone());
        if self.fail_complete {
            return Err(ProviderError::ApiError {
                status_code: 503,
                message: "service unavailable".into(),
            });
        }
        let content = self
            .answers
            .lock()
            .unwrap()
            .pop_front()
            .expect("ScriptedProvider: no more answers");
        Ok(ProviderResponse {
            content,
            usage: Some(Usage {
                prompt_tokens: 10,
                completion_tokens: 5,
                total_tokens: 15,
            }),
            model: request.model,
        })
    }

    async fn embed(&self, request: EmbeddingRequest) -> Result<EmbeddingResponse, ProviderError> {
        if self.fail_embed {
            return Err(ProviderError::Network("connection reset".into()));
        }
        self.embedded
            .lock()
            .unwrap()
            .extend(request.inputs.iter().cloned());
        Ok(EmbeddingResponse {
            embeddings: request.inputs.iter().map(|t| keyword_embedding(t)).collect(),
            model: request.model,
            usage: None,
        })
    }
}

/// A history store whose writes always fail and whose reads are empty.
pub struct ReadOnlyHistory;

#[async_trait]
impl HistoryStore for ReadOnlyHistory {
    fn name(&self) -> &str {
        "read_only"
    }

    async fn get_history(&self, _id: &ConversationId) -> Result<Vec<Turn>, HistoryError> {
        Ok(Vec::new())
    }

    async fn persist(
        &self,
        _id: &ConversationId,
        _role: Role,
        _content: &str,
    ) -> Result<(), HistoryError> {
        Err(HistoryError::Storage("read-only".into()))
    }

    async fn create_conversation(&self, _title: Option<&str>) -> Result<ConversationId, HistoryError> {
        Err(HistoryError::Storage("read-only".into()))
    }

    async fn list_conversations(&self) -> Result<Vec<ConversationSummary>, HistoryError> {
        Ok(Vec::new())
    }

    async fn delete_conversation(&self, _id: &ConversationId) -> Result<bool, HistoryError> {
        Ok(false)
    }
}
