mod cli;
mod server;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use mcai::config::McaiConfig;

#[derive(Parser)]
#[command(name = "mcai", version, about = "MC AI conversational backend")]
struct Cli {
    /// Config file (defaults to ~/.mcai/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start the HTTP chat server
    Serve,
    /// Answer one message and print the reply with its metadata
    Ask {
        message: String,
        /// Prior conversation turns, oldest first
        #[arg(long = "history")]
        history: Vec<String>,
    },
    /// Show which route a message would take
    Route { message: String },
    /// Inspect or clear the shared answer cache
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
    /// Inspect the dataset bank
    Dataset {
        #[command(subcommand)]
        action: DatasetAction,
    },
    /// Check the cache database and configuration
    Doctor,
}

#[derive(Subcommand)]
enum CacheAction {
    /// Entry counts by source
    Stats,
    /// Remove cached answers
    Invalidate {
        /// Only remove keys starting with this prefix
        #[arg(long)]
        prefix: Option<String>,
        /// Only remove the entry for this query
        #[arg(long, conflicts_with = "prefix")]
        query: Option<String>,
    },
    /// Remove expired entries
    Purge,
}

#[derive(Subcommand)]
enum DatasetAction {
    /// Example counts by domain
    Stats,
    /// Rank dataset records against a query
    Search { query: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => McaiConfig::load_from(path)?,
        None => McaiConfig::load()?,
    };

    // Log to stderr so stdout stays clean for command output.
    let filter = EnvFilter::try_new(&config.server.log_level)
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Serve => {
            server::serve_http(config).await?;
        }
        Command::Ask { message, history } => {
            cli::ask::ask(&config, &message, &history).await?;
        }
        Command::Route { message } => {
            cli::route::route(&message);
        }
        Command::Cache { action } => match action {
            CacheAction::Stats => cli::cache::stats(&config)?,
            CacheAction::Invalidate { prefix, query } => {
                cli::cache::invalidate(&config, prefix.as_deref(), query.as_deref())?
            }
            CacheAction::Purge => cli::cache::purge(&config)?,
        },
        Command::Dataset { action } => match action {
            DatasetAction::Stats => cli::dataset::stats(&config)?,
            DatasetAction::Search { query } => cli::dataset::search(&config, &query)?,
        },
        Command::Doctor => {
            cli::doctor::doctor(&config)?;
        }
    }

    Ok(())
}
