//! Retention policy: which finished exchanges go to long-term memory.
//!
//! [`HeuristicRetention`] looks only at shape: a small-talk prefix on the
//! question, or too few words on either side, rejects the exchange. It has
//! no semantic understanding, so some useful exchanges are skipped and some
//! trivial ones kept.

use recall_config::RetentionConfig;

/// Decides whether an exchange is worth remembering.
pub trait RetentionPolicy: Send + Sync {
    fn should_retain(&self, question: &str, answer: &str) -> bool;
}

/// Prefix and word-count rules, configurable via [`RetentionConfig`].
#[derive(Debug, Clone)]
pub struct HeuristicRetention {
    small_talk_prefixes: Vec<String>,
    min_question_words: usize,
    min_answer_words: usize,
}

impl HeuristicRetention {
    pub fn new(config: &RetentionConfig) -> Self {
        Self {
            small_talk_prefixes: config
                .small_talk_prefixes
                .iter()
                .map(|p| p.trim().to_lowercase())
                .filter(|p| !p.is_empty())
                .collect(),
            min_question_words: config.min_question_words,
            min_answer_words: config.min_answer_words,
        }
    }

    fn is_small_talk(&self, question: &str) -> bool {
        let normalized = question.trim().to_lowercase();
        self.small_talk_prefixes
            .iter()
            .any(|prefix| normalized.starts_with(prefix.as_str()))
    }
}

impl Default for HeuristicRetention {
    fn default() -> Self {
        Self::new(&RetentionConfig::default())
    }
}

impl RetentionPolicy for HeuristicRetention {
    fn should_retain(&self, question: &str, answer: &str) -> bool {
        if self.is_small_talk(question) {
            return false;
        }
        question.split_whitespace().count() >= self.min_question_words
            && answer.split_whitespace().count() >= self.min_answer_words
    }
}
