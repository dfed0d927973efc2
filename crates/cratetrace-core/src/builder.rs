//! Graph Builder for Provenance Graphs
//!
//! This module provides the `GraphBuilder` struct that turns a flat ledger
//! snapshot into a [`ProvenanceGraph`].
//!
//! ## Usage
//!
//! ```
//! use cratetrace_core::{build_graph, OperationKind, ProvenanceRecord};
//!
//! let records = vec![
//!     ProvenanceRecord::new("A", OperationKind::Created),
//!     ProvenanceRecord::new("B", OperationKind::Transferred).with_parents(["A"]),
//! ];
//! let graph = build_graph(records).unwrap();
//! assert_eq!(graph.lineage("B").unwrap(), ["A", "B"]);
//! ```

use std::collections::BTreeMap;

use thiserror::Error;
use tracing::{debug, info};

use crate::consistency::{check_edges, ConsistencyReport};
use crate::depth::assign_depths;
use crate::graph::{GraphDiagnostics, ProvenanceGraph};
use crate::index::{DuplicatePolicy, RecordIndex};
use crate::lineage::trace_lineages;
use crate::record::ProvenanceRecord;

// ============================================================================
// Errors
// ============================================================================

/// Errors that can occur during graph building.
///
/// A failed build never yields a partial graph.
#[derive(Debug, Error)]
pub enum BuilderError {
    /// Duplicate key under [`DuplicatePolicy::Reject`]
    #[error("duplicate record key '{key}' rejected by duplicate policy")]
    DuplicateKey { key: String },
}

// ============================================================================
// Builder Configuration
// ============================================================================

/// Configuration for the graph builder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuilderConfig {
    /// How repeated keys in a snapshot are handled
    pub duplicate_policy: DuplicatePolicy,
    /// Compare `parents` against `children` and report disagreements
    pub check_edges: bool,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            duplicate_policy: DuplicatePolicy::LastWriteWins,
            check_edges: true,
        }
    }
}

impl BuilderConfig {
    /// Set the duplicate-key policy
    pub fn with_duplicate_policy(mut self, policy: DuplicatePolicy) -> Self {
        self.duplicate_policy = policy;
        self
    }

    /// Enable or disable the edge consistency check
    pub fn with_check_edges(mut self, check_edges: bool) -> Self {
        self.check_edges = check_edges;
        self
    }
}

// ============================================================================
// Graph Builder
// ============================================================================

/// Builds provenance graphs from ledger snapshots.
///
/// Each call to [`build`](Self::build) is independent: the builder holds only
/// its configuration, so one instance can serve concurrent builds.
#[derive(Debug, Clone, Default)]
pub struct GraphBuilder {
    config: BuilderConfig,
}

impl GraphBuilder {
    /// Create a builder with the given configuration.
    pub fn new(config: BuilderConfig) -> Self {
        Self { config }
    }

    /// Get the builder configuration
    pub fn config(&self) -> &BuilderConfig {
        &self.config
    }

    /// Build a provenance graph from a snapshot of records.
    ///
    /// Records may arrive in any order. The result depends only on the set of
    /// records that survives duplicate resolution.
    ///
    /// # Errors
    ///
    /// Returns [`BuilderError::DuplicateKey`] when a key repeats and the
    /// policy is [`DuplicatePolicy::Reject`].
    pub fn build<I>(&self, records: I) -> Result<ProvenanceGraph, BuilderError>
    where
        I: IntoIterator<Item = ProvenanceRecord>,
    {
        let index = RecordIndex::from_records(records, self.config.duplicate_policy)?;
        if index.is_empty() {
            info!("Snapshot is empty, returning an empty graph");
            return Ok(ProvenanceGraph::empty());
        }

        let mut roots = index.roots();
        debug!("Indexed {} records, {} declared roots", index.len(), roots.len());

        let consistency = if self.config.check_edges {
            check_edges(&index)
        } else {
            ConsistencyReport::default()
        };

        let depths = assign_depths(&index, &roots);
        roots.extend(depths.synthetic_roots.iter().cloned());

        let lineages = trace_lineages(&index, &roots);

        let duplicate_keys = index.duplicate_keys().clone();
        let nodes: BTreeMap<_, _> = index
            .into_nodes()
            .into_iter()
            .map(|(key, mut node)| {
                node.is_root = roots.contains(&key);
                node.depth = depths.depth(&key).unwrap_or(0);
                (key, node)
            })
            .collect();

        let diagnostics = GraphDiagnostics {
            duplicate_keys,
            synthetic_roots: depths.synthetic_roots,
            cycle_anchors: depths.cycle_anchors,
            missing_parents: consistency.missing_parents,
            edge_mismatches: consistency.mismatches,
            unresolved_lineages: lineages.unresolved,
        };

        let graph = ProvenanceGraph::from_parts(roots, nodes, lineages.lineages, diagnostics);

        info!(
            "Built provenance graph: {} nodes, {} roots ({} synthetic), max depth {}",
            graph.node_count(),
            graph.roots().len(),
            graph.diagnostics().synthetic_roots.len(),
            graph.max_depth()
        );

        Ok(graph)
    }
}

/// Build a graph with the default configuration.
pub fn build_graph<I>(records: I) -> Result<ProvenanceGraph, BuilderError>
where
    I: IntoIterator<Item = ProvenanceRecord>,
{
    GraphBuilder::default().build(records)
}
