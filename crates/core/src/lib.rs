//! # Recall Core
//!
//! Domain types, capability traits, and error definitions for the Recall
//! conversational memory engine. This crate has **no framework
//! dependencies**: it defines the vocabulary that the memory, provider,
//! and agent crates implement against.
//!
//! ## Capabilities consumed by the engine
//!
//! - [`Provider`]: text generation and text embedding
//! - [`HistoryStore`]: ordered per-conversation history with lazy creation

pub mod error;
pub mod history;
pub mod message;
pub mod provider;

// Re-export key types at crate root for ergonomics
pub use error::{HistoryError, ProviderError, StoreError};
pub use history::{ConversationSummary, HistoryStore};
pub use message::{ConversationId, Role, Turn};
pub use provider::{EmbeddingRequest, EmbeddingResponse, Provider, ProviderRequest, ProviderResponse};
