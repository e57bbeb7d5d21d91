//! Token counting.
//!
//! [`HeuristicTokenizer`] uses a character-based heuristic: ~4 bytes per
//! token. This is accurate within ~10% for BPE tokenizers on English text
//! and is monotonic in text length, which is all the window selectors need.
//! With the `hf-tokenizer` feature, [`HfTokenizer`] counts with a real
//! `tokenizer.json` instead.
//!
//! Turn costs are approximations of prompt cost: each turn is rendered as
//! `"{role}: {content}\n"` and counted as plain text.

use recall_config::TokenizerConfig;
use recall_core::message::Turn;
use std::sync::Arc;

/// Converts text to a token count. Pure and deterministic.
pub trait Tokenizer: Send + Sync {
    /// Short name for diagnostics (e.g., "heuristic").
    fn name(&self) -> &str;

    /// Number of tokens in `text`.
    fn count(&self, text: &str) -> usize;
}

/// 1 token ≈ 4 bytes, rounded up.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicTokenizer;

impl Tokenizer for HeuristicTokenizer {
    fn name(&self) -> &str {
        "heuristic"
    }

    fn count(&self, text: &str) -> usize {
        if text.is_empty() {
            return 0;
        }
        text.len().div_ceil(4)
    }
}

/// Token cost of one turn rendered as `"{role}: {content}\n"`.
pub fn count_turn(tokenizer: &dyn Tokenizer, turn: &Turn) -> usize {
    tokenizer.count(&format!("{}: {}\n", turn.role(), turn.content()))
}

/// Sum of [`count_turn`] over a slice of turns.
pub fn count_turns(tokenizer: &dyn Tokenizer, turns: &[Turn]) -> usize {
    turns.iter().map(|t| count_turn(tokenizer, t)).sum()
}

/// Token cost of a retrieved pair rendered as `"Q: {q}\nA: {a}\n"`.
pub fn count_pair(tokenizer: &dyn Tokenizer, question: &str, answer: &str) -> usize {
    tokenizer.count(&format!("Q: {question}\nA: {answer}\n"))
}

/// Errors building a tokenizer from configuration.
#[derive(Debug, thiserror::Error)]
pub enum TokenizerError {
    #[error("Failed to load tokenizer from {path}: {reason}")]
    Load { path: String, reason: String },

    #[error("Tokenizer '{0}' is not available in this build")]
    Unavailable(String),
}

/// A tokenizer backed by a Hugging Face `tokenizer.json`.
#[cfg(feature = "hf-tokenizer")]
pub struct HfTokenizer {
    inner: tokenizers::Tokenizer,
}

#[cfg(feature = "hf-tokenizer")]
impl HfTokenizer {
    pub fn from_file(path: &std::path::Path) -> Result<Self, TokenizerError> {
        let inner = tokenizers::Tokenizer::from_file(path).map_err(|e| TokenizerError::Load {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self { inner })
    }
}

#[cfg(feature = "hf-tokenizer")]
impl Tokenizer for HfTokenizer {
    fn name(&self) -> &str {
        "huggingface"
    }

    fn count(&self, text: &str) -> usize {
        match self.inner.encode(text, false) {
            Ok(encoding) => encoding.len(),
            Err(e) => {
                tracing::warn!(error = %e, "Tokenizer failed, falling back to heuristic count");
                HeuristicTokenizer.count(text)
            }
        }
    }
}

/// Build the tokenizer named by the configuration.
pub fn build_tokenizer(config: &TokenizerConfig) -> Result<Arc<dyn Tokenizer>, TokenizerError> {
    match config.kind.as_str() {
        #[cfg(feature = "hf-tokenizer")]
        "huggingface" => {
            let path = config.path.as_deref().ok_or_else(|| TokenizerError::Load {
                path: "<unset>".into(),
                reason: "tokenizer.path is required".into(),
            })?;
            Ok(Arc::new(HfTokenizer::from_file(path)?))
        }
        "heuristic" => Ok(Arc::new(HeuristicTokenizer)),
        other => Err(TokenizerError::Unavailable(other.to_string())),
    }
}
