//! Prompt assembly: the ordered turn list handed to the model.
//!
//! A prompt is built from four parts, always in this order:
//!
//! 1. **System instruction**: exactly one turn, never trimmed
//! 2. **Retrieved context**: related past Q&A rendered as one system turn,
//!    trimmed to the context budget (lowest-ranked dropped first)
//! 3. **Recent history**: trailing window of the conversation, trimmed to
//!    the history budget (oldest dropped first)
//! 4. **Question**: the current user turn, always last
//!
//! The two budgets are independent. An item too large for its budget is
//! excluded, never truncated.
//!
//! # Determinism
//!
//! Assembly is a pure function of its inputs. Fetching history and
//! searching the semantic store happen before, in the engine.

use crate::context::token::{self, HeuristicTokenizer, Tokenizer};
use crate::context::window::{QaPair, select_recent, select_within_budget};
use recall_config::AppConfig;
use recall_core::message::Turn;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Heading of the retrieved-context turn.
pub const CONTEXT_HEADER: &str = "Here are some relevant previous Q&A you have given:";

// ── Types ─────────────────────────────────────────────────────────────────

/// Token ceilings, one per memory category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenBudget {
    /// Ceiling for the recent-history window.
    pub history: usize,
    /// Ceiling for retrieved Q&A context.
    pub context: usize,
}

impl Default for TokenBudget {
    fn default() -> Self {
        Self {
            history: 1200,
            context: 800,
        }
    }
}

/// Everything the assembler needs for one prompt.
pub struct AssemblyInput<'a> {
    /// Retrieved pairs, most relevant first.
    pub retrieved: &'a [QaPair],
    /// Full conversation history, chronological.
    pub history: &'a [Turn],
    /// The current question.
    pub question: &'a str,
}

/// An assembled prompt plus what went into it.
#[derive(Debug, Clone)]
pub struct AssembledPrompt {
    pub turns: Vec<Turn>,
    pub metadata: AssemblyMetadata,
}

/// Counts describing one assembly.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssemblyMetadata {
    pub context_pairs_included: usize,
    pub context_pairs_total: usize,
    pub context_tokens: usize,
    pub history_turns_included: usize,
    pub history_turns_total: usize,
    pub history_tokens: usize,
}

impl AssemblyMetadata {
    /// Retrieved pairs left out by the context budget.
    pub fn context_pairs_dropped(&self) -> usize {
        self.context_pairs_total - self.context_pairs_included
    }

    /// History turns left out by the history budget.
    pub fn history_turns_dropped(&self) -> usize {
        self.history_turns_total - self.history_turns_included
    }
}

// ── Assembler ─────────────────────────────────────────────────────────────

/// Builds prompts under a [`TokenBudget`].
#[derive(Clone)]
pub struct PromptAssembler {
    tokenizer: Arc<dyn Tokenizer>,
    budget: TokenBudget,
    system_instruction: String,
}

impl PromptAssembler {
    pub fn new(
        tokenizer: Arc<dyn Tokenizer>,
        budget: TokenBudget,
        system_instruction: impl Into<String>,
    ) -> Self {
        Self {
            tokenizer,
            budget,
            system_instruction: system_instruction.into(),
        }
    }

    /// Heuristic tokenizer, default budgets and the default instruction.
    pub fn with_defaults() -> Self {
        let config = AppConfig::default();
        Self::from_config(&config, Arc::new(HeuristicTokenizer))
    }

    pub fn from_config(config: &AppConfig, tokenizer: Arc<dyn Tokenizer>) -> Self {
        Self::new(
            tokenizer,
            TokenBudget {
                history: config.memory.history_budget,
                context: config.memory.context_budget,
            },
            config.assistant.system_instruction.clone(),
        )
    }

    pub fn budget(&self) -> TokenBudget {
        self.budget
    }

    pub fn system_instruction(&self) -> &str {
        &self.system_instruction
    }

    pub fn tokenizer(&self) -> &dyn Tokenizer {
        self.tokenizer.as_ref()
    }

    /// Assemble the prompt for one question.
    ///
    /// The result starts with the system instruction, ends with the
    /// question, and always has at least those two turns.
    pub fn assemble(&self, input: &AssemblyInput<'_>) -> AssembledPrompt {
        let tokenizer = self.tokenizer.as_ref();
        let mut turns = Vec::with_capacity(input.history.len() + 3);
        let mut metadata = AssemblyMetadata {
            context_pairs_total: input.retrieved.len(),
            history_turns_total: input.history.len(),
            ..AssemblyMetadata::default()
        };

        // ── System instruction ─────────────────────────────────────────────
        turns.push(Turn::system(self.system_instruction.as_str()));

        // ── Retrieved context ──────────────────────────────────────────────
        let pairs = select_within_budget(tokenizer, input.retrieved, self.budget.context);
        if !pairs.is_empty() {
            metadata.context_pairs_included = pairs.len();
            metadata.context_tokens = pairs
                .iter()
                .map(|(q, a)| token::count_pair(tokenizer, q, a))
                .sum();
            turns.push(Turn::system(render_context(pairs)));
        }

        // ── Recent history ─────────────────────────────────────────────────
        let window = select_recent(tokenizer, input.history, self.budget.history);
        metadata.history_turns_included = window.len();
        metadata.history_tokens = token::count_turns(tokenizer, window);
        turns.extend_from_slice(window);

        // ── Question ───────────────────────────────────────────────────────
        turns.push(Turn::user(input.question));

        AssembledPrompt { turns, metadata }
    }
}

impl std::fmt::Debug for PromptAssembler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PromptAssembler")
            .field("tokenizer", &self.tokenizer.name())
            .field("budget", &self.budget)
            .finish_non_exhaustive()
    }
}

/// Render retrieved pairs as the body of the context turn.
///
/// Pairs are numbered from 1 and separated by a blank line.
pub fn render_context(pairs: &[QaPair]) -> String {
    let mut lines = vec![CONTEXT_HEADER.to_string()];
    for (i, (question, answer)) in pairs.iter().enumerate() {
        let n = i + 1;
        lines.push(format!("Q{n}: {question}"));
        lines.push(format!("A{n}: {answer}"));
        lines.push(String::new());
    }
    lines.join("\n").trim().to_string()
}

// ── Tests ─────────────────────────────────────────────────────────────────
