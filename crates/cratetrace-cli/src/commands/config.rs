//! Config command - View and manage configuration

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Subcommand;
use cratetrace_config::ConfigLoader;
use serde::Serialize;

use super::{load_config, print_info, print_json, resolve_workspace};
use crate::GlobalOptions;

/// Config management commands
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Show the effective configuration (TOML, or JSON with --quiet)
    Show,

    /// Show configuration file paths
    Path,

    /// Write a default configuration file
    Init {
        /// Create ~/.cratetrace/config.toml instead of the workspace config
        #[arg(long)]
        global: bool,
    },
}

/// Configuration paths
#[derive(Debug, Clone, Serialize)]
pub struct ConfigPaths {
    /// Global config file path
    pub global: Option<PathBuf>,
    /// Local config file path
    pub local: PathBuf,
    /// Whether global config exists
    pub global_exists: bool,
    /// Whether local config exists
    pub local_exists: bool,
}

/// Execute the config command
pub async fn execute(cmd: ConfigCommand, global: GlobalOptions) -> Result<()> {
    match cmd {
        ConfigCommand::Show => execute_show(&global),
        ConfigCommand::Path => execute_path(&global),
        ConfigCommand::Init { global: to_global } => execute_init(to_global, &global),
    }
}

fn execute_show(global: &GlobalOptions) -> Result<()> {
    let workspace = resolve_workspace(global)?;
    let config = load_config(global, &workspace)?;

    if global.quiet {
        return print_json(&config);
    }

    let content = toml::to_string_pretty(&config).context("Failed to render configuration")?;
    print!("{}", content);
    Ok(())
}

fn execute_path(global: &GlobalOptions) -> Result<()> {
    let workspace = resolve_workspace(global)?;
    let loader = ConfigLoader::new();

    let global_path = loader.global_config_path();
    let local = match global.config {
        Some(ref path) => path.clone(),
        None => loader.local_config_path(&workspace),
    };
    let paths = ConfigPaths {
        global_exists: global_path.as_ref().is_some_and(|p| p.exists()),
        global: global_path,
        local_exists: local.exists(),
        local,
    };

    if global.quiet {
        return print_json(&paths);
    }

    match paths.global {
        Some(ref path) => println!(
            "Global: {} ({})",
            path.display(),
            existence(paths.global_exists)
        ),
        None => println!("Global: (no home directory)"),
    }
    println!(
        "Local:  {} ({})",
        paths.local.display(),
        existence(paths.local_exists)
    );
    Ok(())
}

fn existence(exists: bool) -> &'static str {
    if exists {
        "exists"
    } else {
        "not found"
    }
}

fn execute_init(to_global: bool, global: &GlobalOptions) -> Result<()> {
    let loader = ConfigLoader::new();

    let path = if to_global {
        loader
            .init_global()
            .context("Failed to initialize global config")?
    } else {
        let workspace = resolve_workspace(global)?;
        loader
            .init_local(&workspace)
            .context("Failed to initialize workspace config")?
    };

    if global.quiet {
        return print_json(&path);
    }
    print_info(&format!("Config file: {}", path.display()), global.quiet);
    Ok(())
}
