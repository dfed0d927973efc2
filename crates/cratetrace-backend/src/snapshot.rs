//! JSON snapshot file reader.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use cratetrace_core::ProvenanceRecord;
use tracing::{debug, info};

use crate::decode::decode_snapshot;
use crate::error::BackendError;
use crate::traits::LedgerReader;

/// Reads records from a JSON export of the ledger.
///
/// The file is read again on every fetch, so each call sees the snapshot as
/// it is on disk at that moment.
#[derive(Debug, Clone)]
pub struct SnapshotLedger {
    path: PathBuf,
    source: String,
}

impl SnapshotLedger {
    /// Create a reader for the snapshot at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let source = format!("snapshot {}", path.display());
        Self { path, source }
    }

    /// Path of the snapshot file
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl LedgerReader for SnapshotLedger {
    async fn fetch_all_records(&self) -> Result<Vec<ProvenanceRecord>, BackendError> {
        debug!("Reading ledger snapshot from {:?}", self.path);

        let bytes = tokio::fs::read(&self.path).await.map_err(|e| {
            BackendError::connectivity(format!(
                "cannot read snapshot '{}': {}",
                self.path.display(),
                e
            ))
        })?;

        let records = decode_snapshot(&bytes)?;
        info!("Loaded {} records from {:?}", records.len(), self.path);
        Ok(records)
    }

    fn source(&self) -> &str {
        &self.source
    }
}
