//! Construction of readers and builder settings from configuration.

use std::path::Path;
use std::sync::Arc;

use cratetrace_config::{DuplicateKeyPolicy, GraphConfig, LedgerSource, TraceConfig};
use cratetrace_core::{BuilderConfig, DuplicatePolicy};
use tracing::debug;

use crate::error::BackendError;
use crate::remote::RemoteLedger;
use crate::snapshot::SnapshotLedger;
use crate::traits::LedgerReader;

/// Map `[graph]` settings onto the builder configuration.
pub fn builder_config(graph: &GraphConfig) -> BuilderConfig {
    let duplicate_policy = match graph.duplicate_policy {
        DuplicateKeyPolicy::LastWriteWins => DuplicatePolicy::LastWriteWins,
        DuplicateKeyPolicy::Reject => DuplicatePolicy::Reject,
    };
    BuilderConfig::default()
        .with_duplicate_policy(duplicate_policy)
        .with_check_edges(graph.check_edges)
}

/// Open the ledger reader selected by `[ledger]`.
///
/// Relative snapshot paths resolve against `workspace_root`.
pub fn open_ledger(
    config: &TraceConfig,
    workspace_root: &Path,
) -> Result<Arc<dyn LedgerReader>, BackendError> {
    config.validate()?;

    match config.ledger.source {
        LedgerSource::Snapshot => {
            let path = config.snapshot_path(workspace_root);
            debug!("Using snapshot ledger at {:?}", path);
            Ok(Arc::new(SnapshotLedger::new(path)))
        }
        LedgerSource::Remote => {
            let remote = config.ledger.remote.as_ref().ok_or_else(|| {
                BackendError::with_context("ledger", "remote source selected without [ledger.remote]")
            })?;
            debug!("Using remote ledger at {}", remote.url);
            Ok(Arc::new(RemoteLedger::from_config(remote)?))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cratetrace_config::{ConfigOverrides, RemoteLedgerConfig};
    use std::path::PathBuf;

    #[test]
    fn test_builder_config_mapping() {
        let config = builder_config(&GraphConfig {
            duplicate_policy: DuplicateKeyPolicy::Reject,
            check_edges: false,
        });
        assert_eq!(config.duplicate_policy, DuplicatePolicy::Reject);
        assert!(!config.check_edges);

        assert_eq!(builder_config(&GraphConfig::default()), BuilderConfig::default());
    }

    #[test]
    fn test_open_snapshot_ledger_resolves_workspace() {
        let config = TraceConfig::default();
        let reader = open_ledger(&config, &PathBuf::from("/srv/warehouse")).unwrap();
        assert_eq!(reader.source(), "snapshot /srv/warehouse/ledger.json");
    }

    #[test]
    fn test_open_remote_ledger() {
        let mut config = TraceConfig::default();
        config.apply_overrides(&ConfigOverrides {
            ledger_url: Some("http://ledger:8899/crates".to_string()),
            ..Default::default()
        });

        let reader = open_ledger(&config, Path::new(".")).unwrap();
        assert_eq!(reader.source(), "http://ledger:8899/crates");
    }

    #[test]
    fn test_open_remote_ledger_requires_url() {
        let mut config = TraceConfig::default();
        config.ledger.source = LedgerSource::Remote;
        config.ledger.remote = Some(RemoteLedgerConfig::default());

        let err = open_ledger(&config, Path::new(".")).err().unwrap();
        assert!(matches!(err, BackendError::Config(_)));
    }
}
