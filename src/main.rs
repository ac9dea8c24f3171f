//! investor-api CLI - serve, load and inspect the investor store

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;

use commands::OutputMode;

#[derive(Parser)]
#[command(name = "investor-api")]
#[command(version)]
#[command(about = "Investor and commitment API backed by a CSV-seeded SQLite store")]
#[command(long_about = r#"
investor-api loads an investor/commitment CSV export into SQLite and serves it
over a read-only HTTP API.

Example usage:
  investor-api serve --port 8000
  investor-api load data/investors.csv
  investor-api commitments --investor 1 --asset-class "Infrastructure"
"#)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON instead of tables
    #[arg(long, global = true)]
    json: bool,

    /// Path to the config file (defaults to investor-api.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API, seeding an empty database first
    Serve {
        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,

        /// Path to the database file
        #[arg(short, long)]
        database: Option<PathBuf>,

        /// Seed CSV to use instead of the configured candidates
        #[arg(long)]
        seed: Option<PathBuf>,

        /// Skip seeding even if the database is empty
        #[arg(long, conflicts_with = "seed")]
        no_seed: bool,
    },

    /// Load a CSV file into the database
    Load {
        /// Path to the CSV file
        csv_path: PathBuf,

        /// Path to the database file
        #[arg(short, long)]
        database: Option<PathBuf>,

        /// Delete existing investors and commitments before loading
        #[arg(long)]
        replace: bool,
    },

    /// List investors with their total commitments
    Investors {
        /// Path to the database file
        #[arg(short, long)]
        database: Option<PathBuf>,
    },

    /// Show a single investor
    Investor {
        /// Investor id
        id: i64,

        /// Path to the database file
        #[arg(short, long)]
        database: Option<PathBuf>,
    },

    /// List commitments, for one investor or the whole store
    Commitments {
        /// Only commitments of this investor
        #[arg(short, long)]
        investor: Option<i64>,

        /// Only commitments in this asset class (requires --investor)
        #[arg(short, long, requires = "investor")]
        asset_class: Option<String>,

        /// Path to the database file
        #[arg(short, long)]
        database: Option<PathBuf>,
    },

    /// List distinct asset classes
    AssetClasses {
        /// Path to the database file
        #[arg(short, long)]
        database: Option<PathBuf>,
    },

    /// Show statistics about the database
    Stats {
        /// Path to the database file
        #[arg(short, long)]
        database: Option<PathBuf>,
    },

    /// Write a default config file
    Init {
        /// Overwrite an existing config file
        #[arg(short, long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let output_mode = if cli.json { OutputMode::Json } else { OutputMode::Human };
    let config = investor_api::config::load_config(cli.config.as_deref())?.unwrap_or_default();

    let result = match cli.command {
        Commands::Serve { port, database, seed, no_seed } => {
            commands::run_serve(&config, port, database, seed, no_seed).await
        }
        Commands::Load { csv_path, database, replace } => {
            commands::run_load(&config, output_mode, &csv_path, database, replace)
        }
        Commands::Investors { database } => commands::run_investors(&config, output_mode, database),
        Commands::Investor { id, database } => commands::run_investor(&config, output_mode, id, database),
        Commands::Commitments { investor, asset_class, database } => {
            commands::run_commitments(&config, output_mode, investor, asset_class.as_deref(), database)
        }
        Commands::AssetClasses { database } => commands::run_asset_classes(&config, output_mode, database),
        Commands::Stats { database } => commands::run_stats(&config, output_mode, database),
        Commands::Init { force } => commands::run_init(cli.config.as_deref(), force),
    };

    if let Err(e) = result {
        commands::emit_error(output_mode, &e);
        std::process::exit(1);
    }
    Ok(())
}
