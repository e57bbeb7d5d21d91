//! Error types for the Recall domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error enum.

use thiserror::Error;

// --- Bounded context errors ---

/// Failures of the external generation or embedding capability.
///
/// These are never retried inside the engine.
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}

/// Failures of the conversation history collaborator.
#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization failed: {0}")]
    Serialization(String),
}

/// Usage errors of the semantic store.
///
/// A dimension mismatch is fatal for the store's lifetime: every later
/// insertion or query with the wrong length fails the same way until the
/// store is reset.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StoreError {
    #[error("Embedding dimension mismatch: store holds {expected}-d vectors, got {actual}-d")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Embedding vector is empty")]
    EmptyEmbedding,

    #[error("Embedding contains a non-finite value at position {position}")]
    NonFiniteEmbedding { position: usize },
}
