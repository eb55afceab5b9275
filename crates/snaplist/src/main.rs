//! Snaplist CLI - turns a folder of product photos into marketplace listings.
//!
//! Each photo is described by a vision model, copied under a descriptive file
//! name, turned into a title and description, and appended to a CSV
//! inventory. The source photos are never modified.
//!
//! # Usage
//!
//! ```bash
//! # List everything in the configured input directory
//! snaplist
//!
//! # Override paths and concurrency for one run
//! snaplist process ./photos --output-dir ./listed --parallel 4
//!
//! # Inspect configuration
//! snaplist config show
//! ```

use clap::{Parser, Subcommand};

mod cli;
mod logging;

/// Snaplist - turn a folder of photos into marketplace-ready listings.
#[derive(Parser, Debug)]
#[command(name = "snaplist")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    /// Defaults to `process` with configured settings
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Describe, rename and list every photo in the input directory
    Process(cli::process::ProcessArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // API keys may live in a local .env file; a missing file is fine.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Logging isn't initialized yet, so config warnings go through eprintln.
    let config = match snaplist_core::Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Warning: Failed to load config: {e}\n  \
                 Using default configuration. Check your config file with `snaplist config path`."
            );
            snaplist_core::Config::default()
        }
    };
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("Snaplist v{}", snaplist_core::VERSION);

    match cli.command {
        Some(Commands::Process(args)) => cli::process::execute(args, config).await,
        Some(Commands::Config(args)) => cli::config::execute(args).await,
        None => cli::process::execute(cli::process::ProcessArgs::default(), config).await,
    }
}
