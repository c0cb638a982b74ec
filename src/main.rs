//! # Pobo CLI (`pobo`)
//!
//! Runs the résumé assistant API and the operator commands around it.
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `pobo serve` | Start the HTTP API |
//! | `pobo init` | Embed and upsert the knowledge base |
//! | `pobo status` | Show configuration and index stats |
//! | `pobo ask "<message>"` | Answer one message from the terminal |
//! | `pobo query "<text>"` | Show raw retrieval matches |
//!
//! Credentials come from the environment (`GEMINI_API_KEY`,
//! `PINECONE_API_KEY` by default). Without them every answer uses the
//! fallback knowledge block.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::prelude::*;

use pobo::app::App;
use pobo::commands;
use pobo::config;
use pobo::server;
use pobo_core::models::Category;

/// Pobo: a retrieval-augmented assistant for Pabitra's portfolio.
#[derive(Parser)]
#[command(name = "pobo", version, about = "Retrieval-augmented résumé assistant")]
struct Cli {
    /// Path to configuration file (TOML). Defaults apply when it is missing.
    #[arg(long, global = true, default_value = "./config/pobo.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API on `[server].bind`.
    Serve,

    /// Embed the knowledge records and upsert them into the vector store.
    ///
    /// Safe to re-run: records are replaced by id.
    Init,

    /// Show which services are configured and the vector index stats.
    Status,

    /// Answer a single message.
    Ask {
        message: String,
    },

    /// Run a similarity query and print the matches.
    Query {
        text: String,

        #[arg(long, default_value_t = 3)]
        top_k: usize,

        /// Restrict to a category (repeatable).
        #[arg(long = "category")]
        categories: Vec<Category>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pobo=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let cfg = config::load_or_default(&cli.config)?;
    let app = App::from_config(cfg)?;

    match cli.command {
        Commands::Serve => server::run_server(app).await?,
        Commands::Init => commands::run_init(&app).await?,
        Commands::Status => commands::run_status(&app).await?,
        Commands::Ask { message } => commands::run_ask(&app, &message).await?,
        Commands::Query {
            text,
            top_k,
            categories,
        } => commands::run_query(&app, &text, top_k, categories).await?,
    }

    Ok(())
}
