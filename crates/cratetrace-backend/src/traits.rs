//! Ledger reader trait definition.

use async_trait::async_trait;
use cratetrace_core::ProvenanceRecord;

use crate::error::BackendError;

/// Source of provenance records.
///
/// Implementations return one consistent point-in-time snapshot per call.
/// Individual malformed entries are dropped with a warning rather than passed
/// through; only a snapshot that cannot be read or parsed at all is an error.
#[async_trait]
pub trait LedgerReader: Send + Sync {
    /// Fetch every provenance record currently on the ledger.
    ///
    /// # Errors
    /// [`BackendError::Connectivity`] when the ledger cannot be reached and
    /// [`BackendError::Decode`] when the response is not a record list.
    async fn fetch_all_records(&self) -> Result<Vec<ProvenanceRecord>, BackendError>;

    /// Human-readable description of where records come from.
    fn source(&self) -> &str;
}
