//! The Recall memory engine.
//!
//! Each question is answered from three memory sources under strict token
//! budgets:
//!
//! 1. **System instruction**: fixed behavior, always first
//! 2. **Long-term memory**: related past Q&A from the semantic store
//! 3. **Short-term memory**: the trailing window of this conversation
//!
//! After generation, the exchange is persisted to history and, if the
//! retention policy approves, embedded into long-term memory.

pub mod context;
pub mod engine;
pub mod retention;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use context::{
    AssembledPrompt, AssemblyInput, AssemblyMetadata, HeuristicTokenizer, PromptAssembler, QaPair,
    TokenBudget, Tokenizer, TokenizerError, build_tokenizer, select_recent, select_within_budget,
};
pub use engine::{EngineError, MemoryEngine, ModelSettings};
pub use retention::{HeuristicRetention, RetentionPolicy};
