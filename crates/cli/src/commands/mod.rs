//! Command implementations and the wiring they share.

pub mod chat;
pub mod conversations;
pub mod init;
pub mod status;

use recall_agent::{HeuristicRetention, MemoryEngine, ModelSettings, PromptAssembler, build_tokenizer};
use recall_config::AppConfig;
use recall_core::history::HistoryStore;
use recall_memory::{FileHistory, InMemoryHistory};
use std::sync::Arc;
use tracing::debug;

pub type CommandResult = Result<(), Box<dyn std::error::Error>>;

pub fn load_config() -> Result<AppConfig, Box<dyn std::error::Error>> {
    Ok(AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?)
}

/// The history backend named by the configuration.
pub fn build_history(config: &AppConfig) -> Arc<dyn HistoryStore> {
    match config.memory.history_backend.as_str() {
        "in_memory" => Arc::new(InMemoryHistory::new()),
        _ => Arc::new(FileHistory::new(config.memory.resolved_history_path())),
    }
}

/// A fully configured engine with a fresh long-term memory.
pub fn build_engine(config: &AppConfig) -> Result<MemoryEngine, Box<dyn std::error::Error>> {
    let provider = match recall_providers::build_from_config(config) {
        Ok(provider) => provider,
        Err(e) => {
            print_api_key_help();
            return Err(e.into());
        }
    };
    let tokenizer = build_tokenizer(&config.tokenizer)?;
    let history = build_history(config);
    debug!(
        provider = provider.name(),
        tokenizer = tokenizer.name(),
        history = history.name(),
        "Engine configured"
    );

    Ok(MemoryEngine::new(provider, history)
        .with_settings(ModelSettings::from_config(config))
        .with_assembler(PromptAssembler::from_config(config, tokenizer))
        .with_retention(Box::new(HeuristicRetention::new(&config.retention)))
        .with_top_k(config.memory.top_k))
}

fn print_api_key_help() {
    eprintln!();
    eprintln!("  ERROR: No API key configured!");
    eprintln!();
    eprintln!("  Set one of these environment variables:");
    eprintln!("    RECALL_API_KEY = 'sk-...'");
    eprintln!("    OPENAI_API_KEY = 'sk-...'");
    eprintln!();
    eprintln!("  Or add it to your config file:");
    eprintln!("    {}", AppConfig::config_dir().join("config.toml").display());
    eprintln!();
}
