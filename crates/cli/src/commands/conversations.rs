//! `recall history`, `recall conversations`, `recall delete`.

use super::{CommandResult, build_history, load_config};
use recall_core::message::ConversationId;

pub async fn list() -> CommandResult {
    let config = load_config()?;
    let conversations = build_history(&config).list_conversations().await?;

    if conversations.is_empty() {
        println!("No conversations yet. Start one with `recall chat`.");
        return Ok(());
    }

    for c in &conversations {
        println!(
            "{}  {}  ({} messages, updated {})",
            c.id,
            c.title,
            c.message_count,
            c.updated_at.format("%Y-%m-%d %H:%M")
        );
    }

    Ok(())
}

pub async fn history(id: &str) -> CommandResult {
    let config = load_config()?;
    let turns = build_history(&config)
        .get_history(&ConversationId::from(id))
        .await?;

    if turns.is_empty() {
        println!("No messages in conversation {id}.");
        return Ok(());
    }

    for turn in &turns {
        println!("[{}] {}", turn.role(), turn.content());
    }

    Ok(())
}

pub async fn delete(id: &str) -> CommandResult {
    let config = load_config()?;
    if build_history(&config)
        .delete_conversation(&ConversationId::from(id))
        .await?
    {
        println!("Deleted conversation {id}.");
    } else {
        println!("Conversation {id} not found.");
    }

    Ok(())
}
