//! In-memory ledger reader.

use async_trait::async_trait;
use cratetrace_core::ProvenanceRecord;

use crate::error::BackendError;
use crate::traits::LedgerReader;

/// Serves a fixed set of records.
///
/// Useful when records were obtained elsewhere and only the query side of
/// the facade is needed.
#[derive(Debug, Clone, Default)]
pub struct InMemoryLedger {
    records: Vec<ProvenanceRecord>,
}

impl InMemoryLedger {
    /// Create a reader over `records`.
    pub fn new(records: Vec<ProvenanceRecord>) -> Self {
        Self { records }
    }

    /// Number of records held
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the reader holds no records
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl From<Vec<ProvenanceRecord>> for InMemoryLedger {
    fn from(records: Vec<ProvenanceRecord>) -> Self {
        Self::new(records)
    }
}

#[async_trait]
impl LedgerReader for InMemoryLedger {
    async fn fetch_all_records(&self) -> Result<Vec<ProvenanceRecord>, BackendError> {
        Ok(self.records.clone())
    }

    fn source(&self) -> &str {
        "in-memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cratetrace_core::OperationKind;

    #[test]
    fn test_returns_records_in_order() {
        let ledger = InMemoryLedger::from(vec![
            ProvenanceRecord::new("B", OperationKind::Created),
            ProvenanceRecord::new("A", OperationKind::Created),
        ]);

        let records = tokio_test::block_on(ledger.fetch_all_records()).unwrap();
        let keys: Vec<&str> = records.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(keys, vec!["B", "A"]);
        assert_eq!(ledger.len(), 2);
        assert_eq!(ledger.source(), "in-memory");
    }
}
