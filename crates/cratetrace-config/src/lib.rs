//! cratetrace Configuration Management
//!
//! Provides configuration loading with support for:
//! - Global config: `~/.cratetrace/config.toml`
//! - Local config: `.cratetrace/config.toml` (in workspace)
//! - CLI overrides via `ConfigOverrides`
//!
//! Configuration is merged in order: global → local → CLI overrides.
//!
//! # Example TOML
//!
//! ```toml
//! [ledger]
//! source = "remote"            # or "snapshot"
//! snapshot_path = "ledger.json"
//!
//! [ledger.remote]
//! url = "https://ledger.example.com/api/crates"
//! api_key_env = "CRATETRACE_LEDGER_TOKEN"
//! timeout_secs = 30
//!
//! [graph]
//! duplicate_policy = "last-write-wins"   # or "reject"
//! check_edges = true
//!
//! [logging]
//! level = "info"
//! format = "text"              # or "json"
//! ```

mod error;
mod loader;

pub use error::{ConfigError, FileAction};
pub use loader::ConfigLoader;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Root configuration for cratetrace.
///
/// Represents the fully merged configuration from all sources.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct TraceConfig {
    /// Where provenance records are read from
    pub ledger: LedgerConfig,

    /// Graph construction settings
    pub graph: GraphConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

// ============================================================================
// Ledger
// ============================================================================

/// Ledger reader configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LedgerConfig {
    /// Which reader supplies the snapshot
    pub source: LedgerSource,

    /// Snapshot file (relative paths resolve against the workspace root)
    pub snapshot_path: PathBuf,

    /// Remote ledger settings (required when source = "remote")
    pub remote: Option<RemoteLedgerConfig>,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            source: LedgerSource::default(),
            snapshot_path: PathBuf::from(DEFAULT_SNAPSHOT_PATH),
            remote: None,
        }
    }
}

/// Default snapshot file name.
pub const DEFAULT_SNAPSHOT_PATH: &str = "ledger.json";

impl LedgerConfig {
    /// Validate that required settings exist for the selected source.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.source {
            LedgerSource::Snapshot => {
                if self.snapshot_path.as_os_str().is_empty() {
                    return Err(ConfigError::missing_ledger_setting(
                        self.source,
                        "ledger.snapshot_path",
                    ));
                }
                Ok(())
            }
            LedgerSource::Remote => {
                let Some(remote) = self.remote.as_ref() else {
                    return Err(ConfigError::missing_ledger_setting(
                        self.source,
                        "a [ledger.remote] section",
                    ));
                };
                if remote.url.is_empty() {
                    return Err(ConfigError::missing_ledger_setting(
                        self.source,
                        "ledger.remote.url",
                    ));
                }
                if remote.timeout_secs == 0 {
                    return Err(ConfigError::invalid_value(
                        "ledger.remote.timeout_secs",
                        "must be greater than zero",
                    ));
                }
                Ok(())
            }
        }
    }
}

/// Ledger source selection.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LedgerSource {
    /// JSON snapshot file on disk (default)
    #[default]
    Snapshot,
    /// HTTP ledger endpoint
    Remote,
}

impl std::fmt::Display for LedgerSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Snapshot => write!(f, "snapshot"),
            Self::Remote => write!(f, "remote"),
        }
    }
}

impl std::str::FromStr for LedgerSource {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "snapshot" | "file" => Ok(Self::Snapshot),
            "remote" | "http" => Ok(Self::Remote),
            _ => Err(ConfigError::unknown_variant(
                "ledger.source",
                s,
                "snapshot or remote",
            )),
        }
    }
}

/// Remote ledger endpoint settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RemoteLedgerConfig {
    /// Endpoint returning the full record list as JSON
    pub url: String,

    /// Environment variable holding a bearer token (optional)
    pub api_key_env: Option<String>,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for RemoteLedgerConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            api_key_env: Some("CRATETRACE_LEDGER_TOKEN".to_string()),
            timeout_secs: 30,
        }
    }
}

// ============================================================================
// Graph
// ============================================================================

/// Graph construction settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct GraphConfig {
    /// How repeated record keys are handled
    pub duplicate_policy: DuplicateKeyPolicy,

    /// Report disagreements between `parents` and `children`
    pub check_edges: bool,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            duplicate_policy: DuplicateKeyPolicy::default(),
            check_edges: true,
        }
    }
}

/// Duplicate key policy as written in config files.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum DuplicateKeyPolicy {
    /// Later records overwrite earlier ones (default)
    #[default]
    LastWriteWins,
    /// Fail the build on any duplicate
    Reject,
}

impl std::fmt::Display for DuplicateKeyPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LastWriteWins => write!(f, "last-write-wins"),
            Self::Reject => write!(f, "reject"),
        }
    }
}

impl std::str::FromStr for DuplicateKeyPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "last-write-wins" | "last_write_wins" | "overwrite" => Ok(Self::LastWriteWins),
            "reject" | "error" => Ok(Self::Reject),
            _ => Err(ConfigError::unknown_variant(
                "graph.duplicate_policy",
                s,
                "last-write-wins or reject",
            )),
        }
    }
}

// ============================================================================
// Logging
// ============================================================================

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (text, json)
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable text format
    #[default]
    Text,
    /// JSON structured logging
    Json,
}

// ============================================================================
// Overrides
// ============================================================================

/// CLI overrides for configuration values.
///
/// Used to apply command-line arguments over file-based config.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    /// Read from this snapshot file (selects the snapshot source)
    pub snapshot_path: Option<PathBuf>,

    /// Read from this ledger URL (selects the remote source)
    pub ledger_url: Option<String>,

    /// Override duplicate key policy
    pub duplicate_policy: Option<DuplicateKeyPolicy>,

    /// Override log level
    pub log_level: Option<String>,
}

impl TraceConfig {
    /// Apply CLI overrides to this configuration.
    ///
    /// A ledger URL wins over a snapshot path when both are given.
    pub fn apply_overrides(&mut self, overrides: &ConfigOverrides) {
        if let Some(ref path) = overrides.snapshot_path {
            self.ledger.source = LedgerSource::Snapshot;
            self.ledger.snapshot_path = path.clone();
        }

        if let Some(ref url) = overrides.ledger_url {
            self.ledger.source = LedgerSource::Remote;
            self.ledger
                .remote
                .get_or_insert_with(RemoteLedgerConfig::default)
                .url = url.clone();
        }

        if let Some(policy) = overrides.duplicate_policy {
            self.graph.duplicate_policy = policy;
        }

        if let Some(ref level) = overrides.log_level {
            self.logging.level = level.clone();
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.ledger.validate()?;
        Ok(())
    }

    /// Get the effective snapshot path for a workspace.
    pub fn snapshot_path(&self, workspace_root: &Path) -> PathBuf {
        if self.ledger.snapshot_path.is_absolute() {
            self.ledger.snapshot_path.clone()
        } else {
            workspace_root.join(&self.ledger.snapshot_path)
        }
    }
}
