//! cratetrace CLI - Supply-chain provenance queries
//!
//! A command-line interface for reconstructing the custody graph of
//! ledger-tracked crates and tracing individual crates back to their origin.
//!
//! # Usage
//!
//! ```bash
//! # Summary of the current snapshot
//! cratetrace graph stats
//!
//! # Trace one crate back to its root
//! cratetrace history 7Hq3...
//!
//! # Report parent/child disagreements in the ledger
//! cratetrace check
//! ```

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use cratetrace_config::{ConfigOverrides, DuplicateKeyPolicy, LogFormat};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

mod commands;

/// cratetrace - Supply-chain provenance graph queries
#[derive(Parser, Debug)]
#[command(name = "cratetrace")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    global: GlobalOptions,
}

/// Global options available to all commands
#[derive(Args, Debug, Clone)]
struct GlobalOptions {
    /// Workspace directory holding .cratetrace/config.toml
    #[arg(long, short = 'w', global = true, env = "CRATETRACE_WORKSPACE")]
    workspace: Option<PathBuf>,

    /// Path to configuration file
    #[arg(long, short = 'c', global = true, env = "CRATETRACE_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    /// Print machine-readable JSON only
    #[arg(long, short = 'q', global = true)]
    quiet: bool,

    /// Read records from this snapshot file
    #[arg(long, global = true, env = "CRATETRACE_SNAPSHOT")]
    snapshot: Option<PathBuf>,

    /// Read records from this ledger endpoint
    #[arg(long, global = true, env = "CRATETRACE_LEDGER_URL")]
    ledger_url: Option<String>,

    /// Fail on duplicate record keys instead of keeping the last one
    #[arg(long, global = true)]
    strict_duplicates: bool,
}

impl GlobalOptions {
    /// Convert global options to config overrides
    pub fn to_config_overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            snapshot_path: self.snapshot.clone(),
            ledger_url: self.ledger_url.clone(),
            duplicate_policy: self
                .strict_duplicates
                .then_some(DuplicateKeyPolicy::Reject),
            ..Default::default()
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Build the supply-chain graph and query it
    Graph(commands::graph::GraphArgs),

    /// Show the custody history of one crate, root first
    History(commands::history::HistoryArgs),

    /// Report parent/child reference disagreements
    Check(commands::check::CheckArgs),

    /// View and manage configuration
    #[command(subcommand)]
    Config(commands::config::ConfigCommand),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let logging = commands::logging_config(&cli.global);
    let log_level = if cli.global.quiet {
        Level::ERROR
    } else if cli.global.verbose {
        Level::DEBUG
    } else {
        logging.level.parse().unwrap_or(Level::INFO)
    };

    match logging.format {
        LogFormat::Text => {
            let subscriber = FmtSubscriber::builder()
                .with_max_level(log_level)
                .with_writer(std::io::stderr)
                .with_ansi(true)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
        LogFormat::Json => {
            let subscriber = FmtSubscriber::builder()
                .json()
                .with_max_level(log_level)
                .with_writer(std::io::stderr)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
    }

    match cli.command {
        Commands::Graph(args) => commands::graph::execute(args, cli.global).await,
        Commands::History(args) => commands::history::execute(args, cli.global).await,
        Commands::Check(args) => commands::check::execute(args, cli.global).await,
        Commands::Config(cmd) => commands::config::execute(cmd, cli.global).await,
    }
}
