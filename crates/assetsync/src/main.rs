//! assetsync command-line control surface
//!
//! - `update`: sync the record store and show the task list
//! - `render`: run a full cycle through the configured processor
//! - `status`: show what the store knows about each asset
//! - `complete`: mark assets processed after an out-of-band run
//! - `config`: show the resolved configuration

use assetsync_logging::{init_logging, LogConfig};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;

mod cli;

#[derive(Parser, Debug)]
#[command(name = "assetsync", version, about = "Keep derived artifacts in step with their source assets")]
struct Cli {
    /// Enable verbose logging (debug to stderr)
    #[arg(short = 'v', long, global = true)]
    verbose: bool,

    /// Configuration file (default: ~/.assetsync/config.toml if present)
    #[arg(long, global = true, env = "ASSETSYNC_CONFIG")]
    config: Option<PathBuf>,

    /// Directory holding the source assets
    #[arg(long, global = true, env = "ASSETSYNC_ASSET_DIR")]
    asset_dir: Option<PathBuf>,

    /// Directory holding the derived artifacts
    #[arg(long, global = true, env = "ASSETSYNC_OUTPUT_DIR")]
    output_dir: Option<PathBuf>,

    /// Record store path (default: <asset-dir>/materials.db)
    #[arg(long = "db", global = true, env = "ASSETSYNC_DB")]
    database_path: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Sync the record store with the asset directory and list pending tasks
    Update {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Run a full cycle: update, process every task, record successes
    Render {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show recorded assets, their staleness and artifact presence
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Mark assets as processed now
    Complete {
        /// Asset names that were processed successfully
        #[arg(required = true)]
        names: Vec<String>,
    },

    /// Show the resolved configuration
    Config {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let _log_guard = match init_logging(LogConfig {
        app_name: "assetsync",
        verbose: cli.verbose,
    }) {
        Ok(guard) => Some(guard),
        Err(err) => {
            eprintln!("Warning: failed to initialize logging: {err:#}");
            None
        }
    };

    let runtime = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(err) => {
            eprintln!("Error: failed to start async runtime: {err}");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(cli)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %format!("{err:#}"), "Command failed");
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let overrides = cli::Overrides {
        config: cli.config,
        asset_dir: cli.asset_dir,
        output_dir: cli.output_dir,
        database_path: cli.database_path,
    };

    match cli.command {
        Commands::Update { json } => cli::update::run(&overrides, json).await,
        Commands::Render { json } => cli::render::run(&overrides, json).await,
        Commands::Status { json } => cli::status::run(&overrides, json).await,
        Commands::Complete { names } => cli::complete::run(&overrides, names).await,
        Commands::Config { json } => cli::config::run(&overrides, json),
    }
}
