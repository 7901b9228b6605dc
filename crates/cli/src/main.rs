//! Sneako CLI - Data directory tools for the mock server.
//!
//! # Usage
//!
//! ```bash
//! # Create the data directory with empty domain collections
//! sneako-cli seed
//!
//! # Add the built-in demo user and products
//! sneako-cli seed --demo
//!
//! # Load records from a fixtures file (YAML or JSON)
//! sneako-cli seed --fixtures fixtures.yaml
//!
//! # Load every collection and report record counts
//! sneako-cli check
//! ```
//!
//! # Commands
//!
//! - `seed` - Create collections and load demo or fixture records
//! - `check` - Validate every collection file in the data directory
//!
//! The data directory and id strategy default to `MOCKSERVER_DATA_DIR` and
//! `MOCKSERVER_ID_STRATEGY`, the same variables the server reads.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use sneako_mockserver::config::MockServerConfig;
use sneako_mockserver::store::IdStrategy;

mod commands;

#[derive(Parser)]
#[command(name = "sneako-cli")]
#[command(author, version, about = "Sneako mock server tools")]
struct Cli {
    /// Data directory (overrides `MOCKSERVER_DATA_DIR`)
    #[arg(short, long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the domain collections and optionally load records
    Seed {
        /// Add a demo admin user and a few products
        #[arg(long)]
        demo: bool,

        /// YAML or JSON file mapping resource names to record lists
        #[arg(short, long)]
        fixtures: Option<PathBuf>,

        /// Id strategy for records without an id (`sequential`, `legacy`, `uuid`)
        #[arg(long)]
        id_strategy: Option<IdStrategy>,
    },
    /// Load every collection and report record counts
    Check,
}

fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = MockServerConfig::from_env()?;
    let data_dir = cli.data_dir.unwrap_or(config.data_dir);

    match cli.command {
        Commands::Seed {
            demo,
            fixtures,
            id_strategy,
        } => {
            let options = commands::seed::SeedOptions {
                demo,
                fixtures,
                id_strategy: id_strategy.unwrap_or(config.id_strategy),
            };
            let summary = commands::seed::run(&data_dir, &options)?;
            summary.log();
        }
        Commands::Check => {
            let report = commands::check::run(&data_dir)?;
            report.log();
            if !report.missing.is_empty() {
                return Err(format!("{} domain collections missing", report.missing.len()).into());
            }
        }
    }
    Ok(())
}
