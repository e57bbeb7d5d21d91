//! The memory engine: answers questions with history and long-term recall.
//!
//! Per question: retrieve related past exchanges from the semantic store,
//! fetch the conversation history, assemble the prompt, generate, then
//! record the exchange. Upstream failures are never retried here.

use crate::context::assembler::{AssemblyInput, PromptAssembler};
use crate::context::window::QaPair;
use crate::retention::{HeuristicRetention, RetentionPolicy};
use recall_config::AppConfig;
use recall_core::error::{HistoryError, ProviderError, StoreError};
use recall_core::history::HistoryStore;
use recall_core::message::{ConversationId, Role, Turn};
use recall_core::provider::{EmbeddingRequest, Provider, ProviderRequest};
use recall_memory::{SemanticStore, SharedSemanticStore};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Why an engine operation failed.
///
/// [`Upstream`](EngineError::Upstream) means the generation or embedding
/// capability failed; the other variants are local failures.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("Upstream model call failed: {0}")]
    Upstream(#[from] ProviderError),

    #[error("History error: {0}")]
    History(#[from] HistoryError),

    #[error("Semantic store error: {0}")]
    Store(#[from] StoreError),
}

impl EngineError {
    pub fn is_upstream(&self) -> bool {
        matches!(self, Self::Upstream(_))
    }
}

/// Models and sampling used for each call.
#[derive(Debug, Clone)]
pub struct ModelSettings {
    pub model: String,
    pub embedding_model: String,
    pub temperature: f32,
    pub max_tokens: Option<u32>,
}

impl ModelSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            model: config.model.clone(),
            embedding_model: config.embedding_model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        }
    }
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self::from_config(&AppConfig::default())
    }
}

/// Assembles prompts, calls the model, and maintains both memories.
pub struct MemoryEngine {
    /// Generation and embedding capability
    provider: Arc<dyn Provider>,

    /// Short-term memory, per conversation
    history: Arc<dyn HistoryStore>,

    /// Long-term memory, shared across conversations
    store: SharedSemanticStore,

    assembler: PromptAssembler,

    retention: Box<dyn RetentionPolicy>,

    settings: ModelSettings,

    /// Neighbours requested per retrieval
    top_k: usize,
}

impl MemoryEngine {
    /// Create an engine with default settings and an empty semantic store.
    pub fn new(provider: Arc<dyn Provider>, history: Arc<dyn HistoryStore>) -> Self {
        Self {
            provider,
            history,
            store: SemanticStore::shared(),
            assembler: PromptAssembler::with_defaults(),
            retention: Box::new(HeuristicRetention::default()),
            settings: ModelSettings::default(),
            top_k: 5,
        }
    }

    pub fn with_settings(mut self, settings: ModelSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_assembler(mut self, assembler: PromptAssembler) -> Self {
        self.assembler = assembler;
        self
    }

    pub fn with_retention(mut self, retention: Box<dyn RetentionPolicy>) -> Self {
        self.retention = retention;
        self
    }

    /// Share an existing semantic store instead of starting empty.
    pub fn with_semantic_store(mut self, store: SharedSemanticStore) -> Self {
        self.store = store;
        self
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// The long-term memory handle, for inspection or reset.
    pub fn semantic_store(&self) -> SharedSemanticStore {
        Arc::clone(&self.store)
    }

    pub fn history(&self) -> &Arc<dyn HistoryStore> {
        &self.history
    }

    pub fn settings(&self) -> &ModelSettings {
        &self.settings
    }

    /// Build the prompt for `question` in conversation `id`.
    pub async fn assemble(
        &self,
        id: &ConversationId,
        question: &str,
    ) -> Result<Vec<Turn>, EngineError> {
        let retrieved = self.retrieve(question).await?;
        let history = self.history.get_history(id).await?;

        let prompt = self.assembler.assemble(&AssemblyInput {
            retrieved: &retrieved,
            history: &history,
            question,
        });

        let m = &prompt.metadata;
        debug!(
            conversation_id = %id,
            turns = prompt.turns.len(),
            context_pairs = m.context_pairs_included,
            context_dropped = m.context_pairs_dropped(),
            context_tokens = m.context_tokens,
            history_turns = m.history_turns_included,
            history_dropped = m.history_turns_dropped(),
            history_tokens = m.history_tokens,
            "Prompt assembled"
        );

        Ok(prompt.turns)
    }

    /// Store a finished exchange in both memories.
    ///
    /// Persisting the two turns and retaining the exchange are attempted
    /// independently; neither is rolled back when the other fails. The
    /// persistence error is reported first when both fail.
    pub async fn record(
        &self,
        id: &ConversationId,
        question: &str,
        answer: &str,
    ) -> Result<(), EngineError> {
        let persisted = self.persist_exchange(id, question, answer).await;
        if let Err(e) = &persisted {
            warn!(conversation_id = %id, error = %e, "Failed to persist exchange");
        }

        let retained = self.retain(question, answer).await;
        if let Err(e) = &retained {
            warn!(conversation_id = %id, error = %e, "Failed to retain exchange");
        }

        persisted?;
        retained.map(|_| ())
    }

    /// Answer `question` within conversation `id`.
    pub async fn answer(&self, id: &ConversationId, question: &str) -> Result<String, EngineError> {
        let turns = self.assemble(id, question).await?;
        let answer = self.generate(turns).await?;
        self.record(id, question, &answer).await?;

        info!(conversation_id = %id, answer_len = answer.len(), "Question answered");
        Ok(answer)
    }

    // ── Steps ──────────────────────────────────────────────────────────────

    /// Related past exchanges, most similar first.
    ///
    /// An empty store short-circuits without calling the embedding model.
    async fn retrieve(&self, question: &str) -> Result<Vec<QaPair>, EngineError> {
        if self.store.read().await.is_empty() {
            return Ok(Vec::new());
        }

        let query = self.embed(question).await?;
        let hits = self.store.read().await.search(&query, self.top_k)?;
        debug!(hits = hits.len(), top_k = self.top_k, "Long-term memory searched");
        Ok(hits)
    }

    async fn generate(&self, turns: Vec<Turn>) -> Result<String, EngineError> {
        let response = self
            .provider
            .complete(ProviderRequest {
                model: self.settings.model.clone(),
                messages: turns,
                temperature: self.settings.temperature,
                max_tokens: self.settings.max_tokens,
            })
            .await?;

        if let Some(usage) = &response.usage {
            debug!(
                model = %response.model,
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "Generation usage"
            );
        }

        Ok(response.content.trim().to_string())
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, EngineError> {
        let response = self
            .provider
            .embed(EmbeddingRequest {
                model: self.settings.embedding_model.clone(),
                inputs: vec![text.to_string()],
            })
            .await?;

        response.embeddings.into_iter().next().ok_or_else(|| {
            EngineError::Upstream(ProviderError::MalformedResponse(
                "embedding response contained no vectors".into(),
            ))
        })
    }

    /// Question first, then answer. Stops at the first failure so an
    /// answer is never stored without its question.
    async fn persist_exchange(
        &self,
        id: &ConversationId,
        question: &str,
        answer: &str,
    ) -> Result<(), EngineError> {
        self.history.persist(id, Role::User, question).await?;
        self.history.persist(id, Role::Assistant, answer).await?;
        Ok(())
    }

    /// Returns whether the exchange was added to long-term memory.
    async fn retain(&self, question: &str, answer: &str) -> Result<bool, EngineError> {
        if !self.retention.should_retain(question, answer) {
            debug!("Exchange not retained");
            return Ok(false);
        }

        let embedding = self.embed(question).await?;
        let mut store = self.store.write().await;
        store.add(question, answer, &embedding)?;
        debug!(entries = store.len(), "Exchange retained in long-term memory");
        Ok(true)
    }
}
