//! CLI command implementations

pub mod check;
pub mod config;
pub mod graph;
pub mod history;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use cratetrace_backend::QueryFacade;
use cratetrace_config::{ConfigLoader, LoggingConfig, TraceConfig};

use crate::GlobalOptions;

/// Resolve the workspace path from options or current directory.
pub fn resolve_workspace(global: &GlobalOptions) -> Result<PathBuf> {
    if let Some(ref ws) = global.workspace {
        if !ws.is_dir() {
            anyhow::bail!("Workspace '{}' is not a directory", ws.display());
        }
        return ws
            .canonicalize()
            .with_context(|| format!("Failed to resolve workspace {}", ws.display()));
    }

    std::env::current_dir().context("Failed to get current directory")
}

/// Load configuration with CLI overrides applied.
pub fn load_config(global: &GlobalOptions, workspace: &Path) -> Result<TraceConfig> {
    let mut loader = ConfigLoader::new();
    let overrides = global.to_config_overrides();

    if let Some(ref config_path) = global.config {
        return loader
            .load_from_file(config_path, Some(&overrides))
            .with_context(|| format!("Failed to load config file {}", config_path.display()));
    }

    loader
        .load(workspace, Some(&overrides))
        .context("Failed to load configuration")
}

/// Logging settings for subscriber setup.
///
/// Runs before the subscriber exists, so any failure falls back to defaults
/// and is reported again when the command loads its config.
pub fn logging_config(global: &GlobalOptions) -> LoggingConfig {
    resolve_workspace(global)
        .and_then(|workspace| load_config(global, &workspace))
        .map(|config| config.logging)
        .unwrap_or_default()
}

/// Create a query facade for the resolved workspace.
pub fn create_facade(global: &GlobalOptions) -> Result<QueryFacade> {
    let workspace = resolve_workspace(global)?;
    let config = load_config(global, &workspace)?;
    facade_from_config(&config, &workspace)
}

/// Create a query facade from an already loaded configuration.
pub fn facade_from_config(config: &TraceConfig, workspace: &Path) -> Result<QueryFacade> {
    QueryFacade::from_config(config, workspace).context("Failed to open ledger")
}

/// Print a value as a single JSON line.
pub fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string(value)?);
    Ok(())
}

/// Print an info message (respects quiet flag).
pub fn print_info(message: &str, quiet: bool) {
    if !quiet {
        eprintln!("{}", message);
    }
}
