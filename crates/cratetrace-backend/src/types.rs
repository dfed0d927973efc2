//! Shared types for query results.

use std::collections::BTreeMap;

use cratetrace_core::{GraphNode, OperationKind, ProvenanceGraph};
use serde::{Deserialize, Serialize};

use crate::error::BackendError;

// ============================================================================
// Crate History
// ============================================================================

/// The custody history of one record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrateHistory {
    /// Requested key
    pub key: String,

    /// The requested record with its graph position
    pub node: GraphNode,

    /// Root-to-record keys
    pub lineage_path: Vec<String>,

    /// `lineage_path` resolved to full nodes, root first
    pub ordered_history: Vec<GraphNode>,

    /// First entry of the history
    pub root: GraphNode,

    /// Hop count from the nearest root
    pub depth: usize,

    /// Whether the record itself is a root
    pub is_root: bool,
}

impl CrateHistory {
    /// Number of custody steps between root and record
    pub fn hops(&self) -> usize {
        self.lineage_path.len().saturating_sub(1)
    }
}

/// Look up the history of `key` in a built graph.
///
/// # Errors
/// [`BackendError::NotFound`] when `key` is not in the graph.
pub fn get_history(graph: &ProvenanceGraph, key: &str) -> Result<CrateHistory, BackendError> {
    let node = graph
        .get_node(key)
        .ok_or_else(|| BackendError::not_found(key))?;

    let lineage_path = graph
        .lineage(key)
        .map(<[String]>::to_vec)
        .unwrap_or_else(|| vec![key.to_string()]);

    let ordered_history: Vec<GraphNode> = lineage_path
        .iter()
        .filter_map(|k| graph.get_node(k))
        .cloned()
        .collect();

    let root = ordered_history
        .first()
        .cloned()
        .unwrap_or_else(|| node.clone());

    Ok(CrateHistory {
        key: key.to_string(),
        node: node.clone(),
        lineage_path,
        ordered_history,
        root,
        depth: node.depth,
        is_root: node.is_root,
    })
}

// ============================================================================
// Graph Statistics
// ============================================================================

/// Summary statistics for a built graph.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphStats {
    /// Number of distinct records
    pub node_count: usize,

    /// Number of roots, including synthetic roots
    pub root_count: usize,

    /// Orphans promoted to roots
    pub synthetic_root_count: usize,

    /// Members of unreachable cycles placed at depth 0
    pub cycle_anchor_count: usize,

    /// Deepest record
    pub max_depth: usize,

    /// Records per operation kind
    pub operations: BTreeMap<OperationKind, usize>,

    /// Parent/child reference disagreements
    pub edge_mismatch_count: usize,

    /// Records referencing parents that are not in the snapshot
    pub missing_parent_count: usize,

    /// Keys that appeared more than once
    pub duplicate_count: usize,
}

impl GraphStats {
    /// Compute statistics for `graph`.
    pub fn from_graph(graph: &ProvenanceGraph) -> Self {
        let mut operations: BTreeMap<OperationKind, usize> =
            OperationKind::ALL.iter().map(|kind| (*kind, 0)).collect();
        for node in graph.iter_nodes() {
            *operations.entry(node.record.operation_kind).or_default() += 1;
        }

        let diagnostics = graph.diagnostics();
        Self {
            node_count: graph.node_count(),
            root_count: graph.roots().len(),
            synthetic_root_count: diagnostics.synthetic_roots.len(),
            cycle_anchor_count: diagnostics.cycle_anchors.len(),
            max_depth: graph.max_depth(),
            operations,
            edge_mismatch_count: diagnostics.edge_mismatches.len(),
            missing_parent_count: diagnostics.missing_parents.len(),
            duplicate_count: diagnostics.duplicate_keys.len(),
        }
    }
}
