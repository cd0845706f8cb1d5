//! DataScout CLI — the main entry point.
//!
//! Commands:
//! - `run`    — Start the Slack bot
//! - `ask`    — Answer a single question from the terminal
//! - `config` — Show the effective configuration

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "datascout",
    about = "DataScout — chat-driven data warehouse assistant",
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
    /// Start the Slack bot
    Run,

    /// Ask a single question without a chat channel
    Ask {
        /// The question to answer
        question: String,
    },

    /// Show the effective configuration (secrets redacted)
    Config,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    match cli.command {
        Commands::Run => commands::run::run().await,
        Commands::Ask { question } => commands::ask::run(&question).await,
        Commands::Config => commands::config_cmd::run().await,
    }
}
