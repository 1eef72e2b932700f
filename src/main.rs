// ABOUTME: Command-line entry point for searching and deleting Discord messages
// ABOUTME: Loads configuration, wires the HTTP client and dispatches subcommands

mod commands;
mod logging;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use discord_message_deleter::Config;

#[derive(Parser)]
#[command(
    name = "discord-message-deleter",
    version,
    about = "Find and delete your own messages in a Discord server, politely"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to a TOML config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info", global = true)]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Collect every message by AUTHOR_ID in GUILD_ID into a JSON file
    Search {
        /// Output file (default: found_messages.json)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Delete every message listed in a JSON file produced by `search`
    Delete {
        /// Input file (default: found_messages.json)
        #[arg(short, long)]
        input: Option<PathBuf>,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    logging::init(&cli.log_level);

    let mut config = Config::load(cli.config.as_deref())?;
    config.apply_env(|key| std::env::var(key).ok());
    config.validate()?;

    match cli.command {
        Commands::Search { output } => {
            let output = output.unwrap_or_else(|| config.records_file.clone());
            commands::search::execute(&config, &output).await
        }
        Commands::Delete { input, yes } => {
            let input = input.unwrap_or_else(|| config.records_file.clone());
            commands::delete::execute(&config, &input, yes).await
        }
    }
}
