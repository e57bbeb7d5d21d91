//! Recall CLI: the main entry point.
//!
//! Commands:
//! - `init`: Create the config directory and default config
//! - `ask`: Answer one question
//! - `chat`: Interactive question/answer session
//! - `history`: Show a conversation's turns
//! - `conversations`: List conversations, most recent first
//! - `delete`: Delete a conversation
//! - `status`: Show configuration and storage status

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "recall",
    about = "Recall: question answering with short- and long-term memory",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize configuration
    Init,

    /// Ask a single question
    Ask {
        /// The question to answer
        question: String,

        /// Continue an existing conversation instead of starting a new one
        #[arg(short, long)]
        conversation: Option<String>,
    },

    /// Start an interactive session
    Chat {
        /// Continue an existing conversation instead of starting a new one
        #[arg(short, long)]
        conversation: Option<String>,
    },

    /// Show the turns of a conversation
    History {
        /// Conversation id
        id: String,
    },

    /// List conversations
    Conversations,

    /// Delete a conversation
    Delete {
        /// Conversation id
        id: String,
    },

    /// Show system status
    Status,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Init => commands::init::run().await?,
        Commands::Ask {
            question,
            conversation,
        } => commands::chat::ask(&question, conversation).await?,
        Commands::Chat { conversation } => commands::chat::interactive(conversation).await?,
        Commands::History { id } => commands::conversations::history(&id).await?,
        Commands::Conversations => commands::conversations::list().await?,
        Commands::Delete { id } => commands::conversations::delete(&id).await?,
        Commands::Status => commands::status::run().await?,
    }

    Ok(())
}
