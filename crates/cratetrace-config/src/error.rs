//! Configuration error types.

use std::path::PathBuf;
use thiserror::Error;

use crate::LedgerSource;

/// File operation that failed while handling a config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileAction {
    Read,
    Write,
    CreateDir,
}

impl std::fmt::Display for FileAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Read => write!(f, "read config file"),
            Self::Write => write!(f, "write config file"),
            Self::CreateDir => write!(f, "create config directory"),
        }
    }
}

/// Errors raised while loading, writing or validating cratetrace config.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to {action} '{path}': {source}")]
    File {
        action: FileAction,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {source}")]
    ParseToml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// `config init --global` with no home directory to put it in
    #[error("could not determine home directory for ~/.cratetrace")]
    NoHomeDir,

    /// The `[ledger]` section selects a source whose settings are absent
    #[error("ledger source '{ledger}' requires {setting}")]
    MissingLedgerSetting {
        ledger: LedgerSource,
        setting: &'static str,
    },

    /// A string that names none of the variants accepted for `key`
    #[error("unknown {key} '{value}' (expected {expected})")]
    UnknownVariant {
        key: &'static str,
        value: String,
        expected: &'static str,
    },

    #[error("invalid value for '{key}': {message}")]
    InvalidValue { key: &'static str, message: String },
}

impl ConfigError {
    pub fn read_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::file(FileAction::Read, path, source)
    }

    pub fn write_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::file(FileAction::Write, path, source)
    }

    pub fn create_dir(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::file(FileAction::CreateDir, path, source)
    }

    pub fn parse_toml(path: impl Into<PathBuf>, source: toml::de::Error) -> Self {
        Self::ParseToml {
            path: path.into(),
            source,
        }
    }

    pub fn missing_ledger_setting(ledger: LedgerSource, setting: &'static str) -> Self {
        Self::MissingLedgerSetting { ledger, setting }
    }

    pub fn unknown_variant(
        key: &'static str,
        value: impl Into<String>,
        expected: &'static str,
    ) -> Self {
        Self::UnknownVariant {
            key,
            value: value.into(),
            expected,
        }
    }

    pub fn invalid_value(key: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            key,
            message: message.into(),
        }
    }

    fn file(action: FileAction, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::File {
            action,
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_remote_section_names_source_and_table() {
        let err = ConfigError::missing_ledger_setting(
            LedgerSource::Remote,
            "a [ledger.remote] section",
        );
        assert_eq!(
            err.to_string(),
            "ledger source 'remote' requires a [ledger.remote] section"
        );
    }

    #[test]
    fn test_unknown_ledger_source_lists_choices() {
        let err = ConfigError::unknown_variant("ledger.source", "ftp", "snapshot or remote");
        assert_eq!(
            err.to_string(),
            "unknown ledger.source 'ftp' (expected snapshot or remote)"
        );
    }

    #[test]
    fn test_file_errors_name_action_and_path() {
        let err = ConfigError::read_file(
            "/srv/warehouse/.cratetrace/config.toml",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        let msg = err.to_string();
        assert!(msg.starts_with("failed to read config file"));
        assert!(msg.contains("/srv/warehouse/.cratetrace/config.toml"));
        assert!(msg.contains("gone"));

        let err = ConfigError::create_dir(
            "/srv/warehouse/.cratetrace",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(matches!(
            err,
            ConfigError::File {
                action: FileAction::CreateDir,
                ..
            }
        ));
    }
}
