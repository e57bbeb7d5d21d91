//! Memory implementations for Recall.
//!
//! - Long-term memory: [`SemanticStore`], a cosine-similarity index over
//!   embedded question/answer pairs.
//! - Short-term memory: [`HistoryStore`](recall_core::HistoryStore)
//!   backends holding each conversation's ordered turns.

pub mod conversation;
pub mod file_backend;
pub mod in_memory;
pub mod semantic;
pub mod vector;

pub use file_backend::FileHistory;
pub use in_memory::InMemoryHistory;
pub use semantic::{QaEntry, SemanticStore, SharedSemanticStore};
pub use vector::{FlatIpIndex, l2_normalize};
