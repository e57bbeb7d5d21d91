//! `recall status`: Show configuration and storage status.

use super::{CommandResult, build_history, load_config};
use recall_config::AppConfig;

pub async fn run() -> CommandResult {
    let config = load_config()?;

    println!("Recall Status");
    println!("=============");
    println!("  Config dir:      {}", AppConfig::config_dir().display());
    println!("  Endpoint:        {}", config.api_url);
    println!("  Model:           {}", config.model);
    println!("  Embeddings:      {}", config.embedding_model);
    println!("  Temperature:     {}", config.temperature);
    println!("  API key:         {}", if config.has_api_key() { "set" } else { "missing" });
    if config.has_api_key() {
        let reachable = match recall_providers::build_from_config(&config) {
            Ok(provider) => provider.health_check().await.unwrap_or(false),
            Err(_) => false,
        };
        println!("  Reachable:       {}", if reachable { "yes" } else { "no" });
    }
    println!("  Tokenizer:       {}", config.tokenizer.kind);
    println!(
        "  Budgets:         history={} context={} (top_k={})",
        config.memory.history_budget, config.memory.context_budget, config.memory.top_k
    );
    println!("  History backend: {}", config.memory.history_backend);

    if config.memory.history_backend == "file" {
        let path = config.memory.resolved_history_path();
        if path.exists() {
            let size_kb = std::fs::metadata(&path)?.len() as f64 / 1024.0;
            println!("  History file:    {} ({size_kb:.1} KB)", path.display());
        } else {
            println!("  History file:    {} (not created yet)", path.display());
        }
        let conversations = build_history(&config).list_conversations().await?;
        println!("  Conversations:   {}", conversations.len());
    }

    let config_path = AppConfig::config_dir().join("config.toml");
    if config_path.exists() {
        println!("\n  Config file found");
    } else {
        println!("\n  No config file, run `recall init` first");
    }

    Ok(())
}
