//! `recall ask` and `recall chat`: single-question and interactive modes.

use super::{CommandResult, build_engine, load_config};
use recall_agent::{EngineError, MemoryEngine};
use recall_core::message::ConversationId;
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};

/// Reuse the given conversation or create a new one.
async fn open_conversation(
    engine: &MemoryEngine,
    id: Option<String>,
) -> Result<ConversationId, EngineError> {
    match id {
        Some(id) => Ok(ConversationId::from(id.as_str())),
        None => Ok(engine.history().create_conversation(None).await?),
    }
}

/// Turns currently stored for `id`, or zero when history is unreadable.
async fn stored_turns(engine: &MemoryEngine, id: &ConversationId) -> usize {
    engine
        .history()
        .get_history(id)
        .await
        .map(|turns| turns.len())
        .unwrap_or(0)
}

/// What to tell the user after the model could not be reached.
///
/// A failure while remembering the exchange comes after both turns were
/// saved, so asking again would store the exchange twice.
fn upstream_notice(saved: bool) -> &'static str {
    if saved {
        "The answer was saved to this conversation but not added to long-term memory; no need to ask again."
    } else {
        "Your question was not answered; try again."
    }
}

/// Notice for an upstream failure of the exchange that started at `before` turns.
async fn upstream_failure(
    engine: &MemoryEngine,
    id: &ConversationId,
    before: usize,
) -> &'static str {
    upstream_notice(stored_turns(engine, id).await > before)
}

pub async fn ask(question: &str, conversation: Option<String>) -> CommandResult {
    let config = load_config()?;
    let engine = build_engine(&config)?;
    let id = open_conversation(&engine, conversation).await?;

    let before = stored_turns(&engine, &id).await;
    eprint!("  Thinking...");
    let result = engine.answer(&id, question).await;
    eprint!("\r              \r");

    let answer = match result {
        Ok(answer) => answer,
        Err(e) => {
            if e.is_upstream() {
                eprintln!("  {}", upstream_failure(&engine, &id, before).await);
            }
            return Err(e.into());
        }
    };
    println!("{answer}");
    eprintln!("\n  conversation: {id}");

    Ok(())
}

pub async fn interactive(conversation: Option<String>) -> CommandResult {
    let config = load_config()?;
    let engine = build_engine(&config)?;
    let id = open_conversation(&engine, conversation).await?;

    println!();
    println!("  Recall: Interactive Mode");
    println!();
    println!("  Model:         {}", config.model);
    println!("  Conversation:  {id}");
    println!();
    println!("  Type your question and press Enter.");
    println!("  Type 'exit' or 'quit' to leave.");
    println!();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    print!("  You > ");
    std::io::stdout().flush()?;

    while let Some(line) = lines.next_line().await? {
        let question = line.trim();
        if matches!(question, "exit" | "quit") {
            break;
        }
        if question.is_empty() {
            print!("  You > ");
            std::io::stdout().flush()?;
            continue;
        }

        let before = stored_turns(&engine, &id).await;
        eprint!("  ...");
        match engine.answer(&id, question).await {
            Ok(answer) => {
                eprint!("\r     \r");
                println!();
                for line in answer.lines() {
                    println!("  Assistant > {line}");
                }
                println!();
            }
            Err(e) if e.is_upstream() => {
                eprint!("\r     \r");
                eprintln!("  [Model unavailable] {e}");
                eprintln!("  {}", upstream_failure(&engine, &id, before).await);
                println!();
            }
            Err(e) => {
                eprint!("\r     \r");
                eprintln!("  [Error] {e}");
                println!();
            }
        }

        print!("  You > ");
        std::io::stdout().flush()?;
    }

    println!();
    println!("  Goodbye!");
    println!();

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use recall_core::error::ProviderError;
    use recall_core::provider::{
        EmbeddingRequest, EmbeddingResponse, Provider, ProviderRequest, ProviderResponse,
    };
    use recall_memory::InMemoryHistory;
    use std::sync::Arc;

    const QUESTION: &str = "What is the Rust borrow checker and why does it exist?";

    /// Generation succeeds or fails on demand; embedding always fails.
    struct NoEmbeddings {
        generate: bool,
    }

    #[async_trait::async_trait]
    impl Provider for NoEmbeddings {
        fn name(&self) -> &str {
            "no_embeddings"
        }

        async fn complete(
            &self,
            request: ProviderRequest,
        ) -> Result<ProviderResponse, ProviderError> {
            if !self.generate {
                return Err(ProviderError::Timeout("no response within 30s".into()));
            }
            Ok(ProviderResponse {
                content: "It enforces ownership rules so references never outlive their data."
                    .into(),
                usage: None,
                model: request.model,
            })
        }

        async fn embed(&self, _: EmbeddingRequest) -> Result<EmbeddingResponse, ProviderError> {
            Err(ProviderError::Network("connection refused".into()))
        }
    }

    fn engine(generate: bool) -> MemoryEngine {
        MemoryEngine::new(
            Arc::new(NoEmbeddings { generate }),
            Arc::new(InMemoryHistory::new()),
        )
    }

    #[test]
    fn notices_differ_by_outcome() {
        assert!(upstream_notice(false).contains("try again"));
        assert!(upstream_notice(true).contains("no need to ask again"));
    }

    #[tokio::test]
    async fn failed_generation_asks_for_a_retry() {
        let engine = engine(false);
        let id = ConversationId::from("c");
        let before = stored_turns(&engine, &id).await;

        let err = engine.answer(&id, QUESTION).await.unwrap_err();
        assert!(err.is_upstream());
        assert_eq!(upstream_failure(&engine, &id, before).await, upstream_notice(false));
    }

    #[tokio::test]
    async fn failed_retention_does_not_ask_for_a_retry() {
        let engine = engine(true);
        let id = ConversationId::from("c");
        let before = stored_turns(&engine, &id).await;

        let err = engine.answer(&id, QUESTION).await.unwrap_err();
        assert!(err.is_upstream());
        assert_eq!(stored_turns(&engine, &id).await, before + 2);
        assert_eq!(upstream_failure(&engine, &id, before).await, upstream_notice(true));
    }
}
