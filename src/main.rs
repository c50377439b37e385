//! # Sifnos Concierge CLI (`concierge`)
//!
//! ## Usage
//!
//! ```bash
//! concierge --config ./config/concierge.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `concierge ask "<text>"` | Answer one query using the configured sources |
//! | `concierge analyze "<text>"` | Show intent analysis and routing plan (offline) |
//! | `concierge sources` | List data sources and whether each is configured |
//! | `concierge serve` | Start the JSON HTTP API |
//!
//! Logging goes to stderr and is controlled by `RUST_LOG` (default `info`).

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use sifnos_concierge::{concierge, config, server, sources};

/// Sifnos Concierge: intent routing and multi-source answers for the
/// island's hotel chat.
#[derive(Parser)]
#[command(
    name = "concierge",
    about = "Sifnos Concierge: intent routing and multi-source answers for the hotel chat",
    version
)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long, global = true, default_value = "./config/concierge.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Answer one query end-to-end and print the reply.
    Ask {
        /// The traveller's question.
        query: String,

        /// Pretend today is this date (YYYY-MM-DD) when resolving phrases
        /// like "next weekend".
        #[arg(long)]
        date: Option<String>,
    },

    /// Print the query analysis and routing plan without calling any source.
    ///
    /// Needs no configuration file.
    Analyze {
        /// The traveller's question.
        query: String,

        /// Pretend today is this date (YYYY-MM-DD).
        #[arg(long)]
        date: Option<String>,
    },

    /// List the four data sources and their configuration status.
    Sources,

    /// Start the HTTP API on `[server].bind`.
    Serve,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // Commands that don't require config
    if let Commands::Analyze { query, date } = &cli.command {
        return concierge::run_analyze(query, date.as_deref());
    }

    match cli.command {
        Commands::Ask { query, date } => {
            concierge::run_ask(&cli.config, &query, date.as_deref()).await?;
        }
        Commands::Sources => {
            let cfg = config::load_config(&cli.config)?;
            sources::list_sources(&cfg)?;
        }
        Commands::Serve => {
            let cfg = config::load_config(&cli.config)?;
            server::run_server(&cfg).await?;
        }
        Commands::Analyze { .. } => {}
    }

    Ok(())
}
