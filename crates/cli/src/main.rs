//! Electronet CLI - Database migrations and directory management tools.
//!
//! # Usage
//!
//! ```bash
//! # Apply schema migrations
//! electronet migrate
//!
//! # Load the demo dataset (factories, retail chains, sole proprietors)
//! electronet seed
//!
//! # Wipe the directory tables first, then load the demo dataset
//! electronet seed --reset
//!
//! # Run one debt notification pass over the directory
//! electronet notify-debtors
//! ```
//!
//! # Commands
//!
//! - `migrate` - Apply schema migrations
//! - `seed` - Load demo data
//! - `notify-debtors` - Run the debt notification scan once

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use electronet_directory::config::Config;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

mod commands;

#[derive(Parser)]
#[command(name = "electronet")]
#[command(author, version, about = "Electronet directory CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply schema migrations
    Migrate,
    /// Load the demo dataset
    Seed {
        /// Clear units and products before seeding
        #[arg(long)]
        reset: bool,
    },
    /// Run the debt notification scan once
    NotifyDebtors,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = Config::from_env().expect("Failed to load configuration");

    init_telemetry(&config);

    let result: Result<(), Box<dyn std::error::Error>> = run(cli, &config).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

/// Initialize tracing with `EnvFilter`.
///
/// Defaults to info level for our crates if `RUST_LOG` is not set. `LOG_JSON`
/// switches the output to JSON for structured log parsing.
fn init_telemetry(config: &Config) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "electronet=info,electronet_directory=info".into());

    let json_layer = config
        .log_json
        .then(|| tracing_subscriber::fmt::layer().json().flatten_event(true));
    let text_layer = (!config.log_json).then(tracing_subscriber::fmt::layer);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(text_layer)
        .init();
}

async fn run(cli: Cli, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run(config).await?,
        Commands::Seed { reset } => commands::seed::run(config, reset).await?,
        Commands::NotifyDebtors => commands::notify::run(config).await?,
    }
    Ok(())
}
