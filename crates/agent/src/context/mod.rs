//! Token-budgeted prompt construction.
//!
//! | Part | Source | Trim Strategy |
//! |------|--------|---------------|
//! | System instruction | Configuration | Never trimmed |
//! | Retrieved context | Semantic store, ranked | Lowest-ranked dropped first |
//! | Recent history | History store | Oldest turns dropped first |
//! | Question | Caller | Never trimmed |

pub mod assembler;
pub mod token;
pub mod window;

pub use assembler::{
    AssembledPrompt, AssemblyInput, AssemblyMetadata, CONTEXT_HEADER, PromptAssembler,
    TokenBudget, render_context,
};
pub use token::{
    HeuristicTokenizer, Tokenizer, TokenizerError, build_tokenizer, count_pair, count_turn,
    count_turns,
};
pub use window::{QaPair, select_recent, select_within_budget};

#[cfg(feature = "hf-tokenizer")]
pub use token::HfTokenizer;
