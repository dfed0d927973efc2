//! Configuration loader with inheritance support.
//!
//! Loads configuration from multiple sources and merges them:
//! 1. Global config: `~/.cratetrace/config.toml`
//! 2. Local config: `.cratetrace/config.toml` (in workspace)
//! 3. CLI overrides
//!
//! Later sources override earlier ones.

use crate::error::ConfigError;
use crate::{
    ConfigOverrides, DuplicateKeyPolicy, GraphConfig, LedgerConfig, LedgerSource, LogFormat,
    LoggingConfig, TraceConfig, DEFAULT_SNAPSHOT_PATH,
};
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

/// Configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Configuration directory name, used both under the home directory and
/// inside a workspace.
const CONFIG_DIR: &str = ".cratetrace";

/// Configuration loader with caching and inheritance support.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    /// Global config directory (e.g., `~/.cratetrace`)
    global_config_dir: Option<PathBuf>,

    /// Cached global config
    global_config: Option<TraceConfig>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Create a new configuration loader.
    ///
    /// Automatically detects the global config directory (`~/.cratetrace`).
    pub fn new() -> Self {
        let global_config_dir = dirs::home_dir().map(|h| h.join(CONFIG_DIR));

        Self {
            global_config_dir,
            global_config: None,
        }
    }

    /// Create a loader with a custom global config directory.
    pub fn with_global_dir(global_dir: impl Into<PathBuf>) -> Self {
        Self {
            global_config_dir: Some(global_dir.into()),
            global_config: None,
        }
    }

    /// Get the global config file path.
    pub fn global_config_path(&self) -> Option<PathBuf> {
        self.global_config_dir
            .as_ref()
            .map(|d| d.join(CONFIG_FILE_NAME))
    }

    /// Get the local config file path for a workspace.
    pub fn local_config_path(&self, workspace_root: &Path) -> PathBuf {
        workspace_root.join(CONFIG_DIR).join(CONFIG_FILE_NAME)
    }

    /// Load configuration for a workspace with optional CLI overrides.
    ///
    /// Merges config in order: global → local → overrides.
    pub fn load(
        &mut self,
        workspace_root: &Path,
        overrides: Option<&ConfigOverrides>,
    ) -> Result<TraceConfig, ConfigError> {
        let mut config = TraceConfig::default();

        if let Some(global_config) = self.load_global()? {
            config = merge_configs(config, global_config);
        }

        if let Some(local_config) = self.load_local(workspace_root)? {
            config = merge_configs(config, local_config);
        }

        if let Some(ovr) = overrides {
            config.apply_overrides(ovr);
        }

        Ok(config)
    }

    /// Load an explicit config file in place of the local one.
    ///
    /// Merges config in order: global → `path` → overrides.
    pub fn load_from_file(
        &mut self,
        path: &Path,
        overrides: Option<&ConfigOverrides>,
    ) -> Result<TraceConfig, ConfigError> {
        let mut config = TraceConfig::default();

        if let Some(global_config) = self.load_global()? {
            config = merge_configs(config, global_config);
        }

        debug!("Loading config from {:?}", path);
        config = merge_configs(config, load_config_file(path)?);

        if let Some(ovr) = overrides {
            config.apply_overrides(ovr);
        }

        Ok(config)
    }

    /// Load only the global configuration.
    pub fn load_global(&mut self) -> Result<Option<TraceConfig>, ConfigError> {
        if let Some(ref config) = self.global_config {
            return Ok(Some(config.clone()));
        }

        let Some(global_path) = self.global_config_path() else {
            debug!("No home directory found, skipping global config");
            return Ok(None);
        };

        if !global_path.exists() {
            trace!("Global config not found at {:?}", global_path);
            return Ok(None);
        }

        debug!("Loading global config from {:?}", global_path);
        let config = load_config_file(&global_path)?;

        self.global_config = Some(config.clone());

        Ok(Some(config))
    }

    /// Load only the local configuration for a workspace.
    pub fn load_local(&self, workspace_root: &Path) -> Result<Option<TraceConfig>, ConfigError> {
        let local_path = self.local_config_path(workspace_root);

        if !local_path.exists() {
            trace!("Local config not found at {:?}", local_path);
            return Ok(None);
        }

        debug!("Loading local config from {:?}", local_path);
        load_config_file(&local_path).map(Some)
    }

    /// Initialize global configuration.
    ///
    /// Creates `~/.cratetrace/config.toml` with default configuration unless
    /// it already exists.
    pub fn init_global(&self) -> Result<PathBuf, ConfigError> {
        let Some(ref global_dir) = self.global_config_dir else {
            return Err(ConfigError::NoHomeDir);
        };
        init_config_file(global_dir)
    }

    /// Initialize local configuration for a workspace.
    ///
    /// Creates `.cratetrace/config.toml` with default configuration unless
    /// it already exists.
    pub fn init_local(&self, workspace_root: &Path) -> Result<PathBuf, ConfigError> {
        init_config_file(&workspace_root.join(CONFIG_DIR))
    }
}

/// Write a default config into `dir` if none exists yet.
fn init_config_file(dir: &Path) -> Result<PathBuf, ConfigError> {
    if !dir.exists() {
        std::fs::create_dir_all(dir).map_err(|e| ConfigError::create_dir(dir, e))?;
    }

    let config_path = dir.join(CONFIG_FILE_NAME);
    if config_path.exists() {
        debug!("Keeping existing config at {:?}", config_path);
        return Ok(config_path);
    }

    let content = toml::to_string_pretty(&TraceConfig::default())?;
    std::fs::write(&config_path, content).map_err(|e| ConfigError::write_file(&config_path, e))?;
    Ok(config_path)
}

/// Load a configuration file from disk.
fn load_config_file(path: &Path) -> Result<TraceConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;

    toml::from_str(&content).map_err(|e| ConfigError::parse_toml(path, e))
}

/// Merge two configurations, with `overlay` taking precedence.
///
/// Values equal to their default are treated as unset, so partial files only
/// override what they actually name.
fn merge_configs(base: TraceConfig, overlay: TraceConfig) -> TraceConfig {
    TraceConfig {
        ledger: merge_ledger(base.ledger, overlay.ledger),
        graph: merge_graph(base.graph, overlay.graph),
        logging: merge_logging(base.logging, overlay.logging),
    }
}

/// Merge ledger config.
fn merge_ledger(base: LedgerConfig, overlay: LedgerConfig) -> LedgerConfig {
    LedgerConfig {
        source: if overlay.source != LedgerSource::Snapshot {
            overlay.source
        } else {
            base.source
        },
        snapshot_path: if overlay.snapshot_path != Path::new(DEFAULT_SNAPSHOT_PATH) {
            overlay.snapshot_path
        } else {
            base.snapshot_path
        },
        remote: overlay.remote.or(base.remote),
    }
}

/// Merge graph config.
fn merge_graph(base: GraphConfig, overlay: GraphConfig) -> GraphConfig {
    let defaults = GraphConfig::default();
    GraphConfig {
        duplicate_policy: if overlay.duplicate_policy != DuplicateKeyPolicy::LastWriteWins {
            overlay.duplicate_policy
        } else {
            base.duplicate_policy
        },
        check_edges: if overlay.check_edges != defaults.check_edges {
            overlay.check_edges
        } else {
            base.check_edges
        },
    }
}

/// Merge logging config.
fn merge_logging(base: LoggingConfig, overlay: LoggingConfig) -> LoggingConfig {
    LoggingConfig {
        level: if overlay.level != "info" {
            overlay.level
        } else {
            base.level
        },
        format: if overlay.format != LogFormat::default() {
            overlay.format
        } else {
            base.format
        },
    }
}
