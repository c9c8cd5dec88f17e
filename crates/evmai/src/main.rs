// SPDX-FileCopyrightText: 2026 EVMAI Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! EVMAI - event indexer for the agent and escrow contracts.
//!
//! This is the binary entry point.

mod run;
mod status;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use evmai_config::EvmaiConfig;

/// EVMAI - event indexer for the agent and escrow contracts.
#[derive(Parser, Debug)]
#[command(name = "evmai", version, about, long_about = None)]
struct Cli {
    /// Explicit configuration file instead of the standard lookup.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Index a JSON Lines event feed into the entity store.
    Run {
        /// Decoded events, one JSON object per line, in chain order.
        #[arg(long)]
        events: PathBuf,
        /// Handle every event instead of resuming after the stored cursor.
        #[arg(long)]
        replay: bool,
    },
    /// Show the stored cursor and entity counts.
    Status {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Print the effective configuration as TOML.
    Config,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => evmai_config::load_and_validate_path(path),
        None => evmai_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            evmai_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    init_tracing(&config.indexer.log_level);

    let result = match cli.command {
        Some(Commands::Run { events, replay }) => run::run_indexer(&config, &events, replay).await,
        Some(Commands::Status { json }) => status::run_status(&config, json).await,
        Some(Commands::Config) => print_config(&config),
        None => {
            println!("evmai: use --help for available commands");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

/// Initialize the tracing subscriber. `RUST_LOG` overrides the configured level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("evmai={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}

fn print_config(config: &EvmaiConfig) -> Result<(), evmai_core::IndexerError> {
    let rendered = toml::to_string_pretty(config)
        .map_err(|e| evmai_core::IndexerError::Internal(format!("failed to render config: {e}")))?;
    print!("{rendered}");
    Ok(())
}
