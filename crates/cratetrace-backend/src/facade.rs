//! Query facade over a ledger reader.
//!
//! Every query fetches a fresh snapshot and builds a new graph; nothing is
//! cached between calls.

use std::path::Path;
use std::sync::Arc;

use cratetrace_config::TraceConfig;
use cratetrace_core::{BuilderConfig, GraphBuilder, GraphNode, ProvenanceGraph};
use regex::Regex;
use tracing::{debug, info};

use crate::error::BackendError;
use crate::setup::{builder_config, open_ledger};
use crate::traits::LedgerReader;
use crate::types::{get_history, CrateHistory, GraphStats};

/// Serves supply-chain queries from a ledger reader.
#[derive(Clone)]
pub struct QueryFacade {
    reader: Arc<dyn LedgerReader>,
    builder: GraphBuilder,
}

impl std::fmt::Debug for QueryFacade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryFacade")
            .field("source", &self.reader.source())
            .field("builder", &self.builder)
            .finish()
    }
}

impl QueryFacade {
    /// Create a facade from an explicit reader and builder configuration.
    pub fn new(reader: Arc<dyn LedgerReader>, config: BuilderConfig) -> Self {
        Self {
            reader,
            builder: GraphBuilder::new(config),
        }
    }

    /// Create a facade from loaded configuration.
    pub fn from_config(config: &TraceConfig, workspace_root: &Path) -> Result<Self, BackendError> {
        let reader = open_ledger(config, workspace_root)?;
        Ok(Self::new(reader, builder_config(&config.graph)))
    }

    /// Description of the underlying ledger
    pub fn source(&self) -> &str {
        self.reader.source()
    }

    /// Builder configuration used for every query
    pub fn builder_config(&self) -> &BuilderConfig {
        self.builder.config()
    }

    /// Fetch a snapshot and build the full supply-chain graph.
    pub async fn supply_chain(&self) -> Result<ProvenanceGraph, BackendError> {
        let records = self.reader.fetch_all_records().await?;
        debug!("Fetched {} records from {}", records.len(), self.reader.source());
        Ok(self.builder.build(records)?)
    }

    /// History of a single record, root first.
    pub async fn crate_history(&self, key: &str) -> Result<CrateHistory, BackendError> {
        let graph = self.supply_chain().await?;
        let history = get_history(&graph, key)?;
        info!(
            "Traced {} back {} hops to {}",
            key,
            history.hops(),
            history.root.key()
        );
        Ok(history)
    }

    /// Summary statistics for the current snapshot.
    pub async fn stats(&self) -> Result<GraphStats, BackendError> {
        let graph = self.supply_chain().await?;
        Ok(GraphStats::from_graph(&graph))
    }

    /// Find records whose key or label matches `pattern` (supports `*`).
    pub async fn find(&self, pattern: &str, limit: usize) -> Result<Vec<GraphNode>, BackendError> {
        let graph = self.supply_chain().await?;
        find_nodes(&graph, pattern, limit)
    }
}

/// Match `pattern` against every key and label in `graph`, in key order.
///
/// `*` matches any run of characters; everything else matches literally.
pub fn find_nodes(
    graph: &ProvenanceGraph,
    pattern: &str,
    limit: usize,
) -> Result<Vec<GraphNode>, BackendError> {
    let regex_pattern = pattern
        .split('*')
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(".*");
    let re = Regex::new(&format!("^{}$", regex_pattern))
        .map_err(|e| BackendError::with_context("pattern parsing", e.to_string()))?;

    Ok(graph
        .iter_nodes()
        .filter(|node| re.is_match(node.key()) || re.is_match(&node.record.label))
        .take(limit)
        .cloned()
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryLedger;
    use cratetrace_core::{DuplicatePolicy, OperationKind, ProvenanceRecord};

    fn facade(records: Vec<ProvenanceRecord>) -> QueryFacade {
        QueryFacade::new(
            Arc::new(InMemoryLedger::new(records)),
            BuilderConfig::default(),
        )
    }

    fn sample_records() -> Vec<ProvenanceRecord> {
        vec![
            ProvenanceRecord::new("A", OperationKind::Created)
                .with_label("CRATE_001")
                .with_children(["B"]),
            ProvenanceRecord::new("B", OperationKind::Transferred)
                .with_label("CRATE_002")
                .with_parents(["A"]),
            ProvenanceRecord::new("X.1", OperationKind::Created).with_label("OTHER"),
        ]
    }

    #[tokio::test]
    async fn test_supply_chain() {
        let graph = facade(sample_records()).supply_chain().await.unwrap();
        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.roots().len(), 2);
    }

    #[tokio::test]
    async fn test_crate_history() {
        let history = facade(sample_records()).crate_history("B").await.unwrap();
        assert_eq!(history.lineage_path, vec!["A", "B"]);
        assert_eq!(history.root.record.label, "CRATE_001");
    }

    #[tokio::test]
    async fn test_crate_history_not_found() {
        let err = facade(sample_records()).crate_history("Z").await.unwrap_err();
        assert!(matches!(err, BackendError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_reject_policy_surfaces_build_error() {
        let facade = QueryFacade::new(
            Arc::new(InMemoryLedger::new(vec![
                ProvenanceRecord::new("A", OperationKind::Created),
                ProvenanceRecord::new("A", OperationKind::Created),
            ])),
            BuilderConfig::default().with_duplicate_policy(DuplicatePolicy::Reject),
        );

        let err = facade.supply_chain().await.unwrap_err();
        assert!(matches!(err, BackendError::Build(_)));
    }

    #[tokio::test]
    async fn test_find_by_label_wildcard() {
        let found = facade(sample_records()).find("CRATE_*", 10).await.unwrap();
        let keys: Vec<&str> = found.iter().map(GraphNode::key).collect();
        assert_eq!(keys, vec!["A", "B"]);
    }

    #[tokio::test]
    async fn test_find_respects_limit() {
        let found = facade(sample_records()).find("*", 2).await.unwrap();
        assert_eq!(found.len(), 2);
    }

    #[test]
    fn test_find_treats_dots_literally() {
        let graph = cratetrace_core::build_graph(sample_records()).unwrap();

        let found = find_nodes(&graph, "X.1", 10).unwrap();
        assert_eq!(found.len(), 1);
        assert!(find_nodes(&graph, "X?1", 10).unwrap().is_empty());
        assert!(find_nodes(&graph, "XX1", 10).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_stats() {
        let stats = facade(sample_records()).stats().await.unwrap();
        assert_eq!(stats.node_count, 3);
        assert_eq!(stats.operations[&OperationKind::Created], 2);
    }
}
