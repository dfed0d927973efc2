//! Provenance graph output types
//!
//! [`ProvenanceGraph`] is the immutable result of one build. It is created by
//! [`GraphBuilder`](crate::builder::GraphBuilder) and never mutated afterwards;
//! callers read it through accessors and drop it when the query completes.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::consistency::EdgeMismatch;
use crate::record::ProvenanceRecord;

// ============================================================================
// Graph Node
// ============================================================================

/// A provenance record with its computed graph position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphNode {
    /// The record as fetched from the ledger
    #[serde(flatten)]
    pub record: ProvenanceRecord,

    /// True for origin records and for orphans promoted by the depth fallback
    pub is_root: bool,

    /// Hop count from the nearest root (0 for roots)
    pub depth: usize,
}

impl GraphNode {
    /// Wrap a freshly indexed record. Root membership follows the record's
    /// declared parents; depth is a placeholder until depths are assigned.
    pub(crate) fn pending(record: ProvenanceRecord) -> Self {
        let is_root = record.is_origin();
        Self {
            record,
            is_root,
            depth: 0,
        }
    }

    /// The record key
    pub fn key(&self) -> &str {
        &self.record.key
    }
}

// ============================================================================
// Diagnostics
// ============================================================================

/// Structural anomalies observed while building a graph.
///
/// None of these fail a build; they describe how the snapshot was normalised.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphDiagnostics {
    /// Keys that appeared more than once (later occurrence kept)
    pub duplicate_keys: BTreeSet<String>,

    /// Records with no parent in the snapshot, promoted to roots
    pub synthetic_roots: BTreeSet<String>,

    /// Members of cycles no root reaches, placed at depth 0 but not roots
    #[serde(default)]
    pub cycle_anchors: BTreeSet<String>,

    /// Parent keys referenced by a record but absent from the snapshot
    pub missing_parents: BTreeMap<String, Vec<String>>,

    /// Disagreements between `parents` and `children` references
    pub edge_mismatches: Vec<EdgeMismatch>,

    /// Records whose lineage degenerated to the single-element fallback
    pub unresolved_lineages: BTreeSet<String>,
}

impl GraphDiagnostics {
    /// Whether the snapshot needed no normalisation at all
    pub fn is_clean(&self) -> bool {
        self.duplicate_keys.is_empty()
            && self.synthetic_roots.is_empty()
            && self.cycle_anchors.is_empty()
            && self.missing_parents.is_empty()
            && self.edge_mismatches.is_empty()
            && self.unresolved_lineages.is_empty()
    }
}

// ============================================================================
// Provenance Graph
// ============================================================================

/// The reconstructed supply-chain graph.
///
/// Invariants upheld by the builder:
/// - `roots` contains exactly the keys whose node has `is_root` set
/// - every root has depth 0
/// - every lineage starts at a root (or a parentless record) and ends at its key
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProvenanceGraph {
    node_count: usize,
    roots: BTreeSet<String>,
    nodes: BTreeMap<String, GraphNode>,
    lineages: BTreeMap<String, Vec<String>>,
    diagnostics: GraphDiagnostics,
}

impl ProvenanceGraph {
    pub(crate) fn from_parts(
        roots: BTreeSet<String>,
        nodes: BTreeMap<String, GraphNode>,
        lineages: BTreeMap<String, Vec<String>>,
        diagnostics: GraphDiagnostics,
    ) -> Self {
        Self {
            node_count: nodes.len(),
            roots,
            nodes,
            lineages,
            diagnostics,
        }
    }

    /// An empty graph (no records in the snapshot)
    pub fn empty() -> Self {
        Self::default()
    }

    /// Number of distinct records
    pub fn node_count(&self) -> usize {
        self.node_count
    }

    /// Whether the graph has no nodes
    pub fn is_empty(&self) -> bool {
        self.node_count == 0
    }

    /// Root keys (true origins and synthetic roots)
    pub fn roots(&self) -> &BTreeSet<String> {
        &self.roots
    }

    /// Check if a key is a root
    pub fn is_root(&self, key: &str) -> bool {
        self.roots.contains(key)
    }

    /// All nodes keyed by record key
    pub fn nodes(&self) -> &BTreeMap<String, GraphNode> {
        &self.nodes
    }

    /// Get a node by key
    pub fn get_node(&self, key: &str) -> Option<&GraphNode> {
        self.nodes.get(key)
    }

    /// Check if the graph contains a key
    pub fn contains_node(&self, key: &str) -> bool {
        self.nodes.contains_key(key)
    }

    /// Iterate over all nodes in key order
    pub fn iter_nodes(&self) -> impl Iterator<Item = &GraphNode> {
        self.nodes.values()
    }

    /// All lineages keyed by record key
    pub fn lineages(&self) -> &BTreeMap<String, Vec<String>> {
        &self.lineages
    }

    /// Root-to-record key path for `key`
    pub fn lineage(&self, key: &str) -> Option<&[String]> {
        self.lineages.get(key).map(Vec::as_slice)
    }

    /// Root-to-record path for `key`, resolved to nodes
    pub fn lineage_nodes(&self, key: &str) -> Option<Vec<&GraphNode>> {
        self.lineage(key)
            .map(|path| path.iter().filter_map(|k| self.nodes.get(k)).collect())
    }

    /// Deepest depth in the graph
    pub fn max_depth(&self) -> usize {
        self.nodes.values().map(|n| n.depth).max().unwrap_or(0)
    }

    /// Anomalies observed during the build
    pub fn diagnostics(&self) -> &GraphDiagnostics {
        &self.diagnostics
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::OperationKind;

    fn node(key: &str, is_root: bool, depth: usize) -> GraphNode {
        GraphNode {
            record: ProvenanceRecord::new(key, OperationKind::Created),
            is_root,
            depth,
        }
    }

    #[test]
    fn test_graph_node_serializes_flat() {
        let json = serde_json::to_value(node("A", true, 0)).unwrap();
        assert_eq!(json["key"], "A");
        assert_eq!(json["operation_kind"], "Created");
        assert_eq!(json["is_root"], true);
        assert_eq!(json["depth"], 0);
        assert!(json.get("record").is_none());
    }

    #[test]
    fn test_graph_node_roundtrip() {
        let original = node("B", false, 3);
        let json = serde_json::to_string(&original).unwrap();
        let parsed: GraphNode = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, original);
    }

    #[test]
    fn test_empty_graph() {
        let graph = ProvenanceGraph::empty();
        assert!(graph.is_empty());
        assert_eq!(graph.max_depth(), 0);
        assert!(graph.lineage("A").is_none());
        assert!(graph.diagnostics().is_clean());
    }

    #[test]
    fn test_accessors() {
        let mut nodes = BTreeMap::new();
        nodes.insert("A".to_string(), node("A", true, 0));
        nodes.insert("B".to_string(), node("B", false, 1));
        let mut lineages = BTreeMap::new();
        lineages.insert("A".to_string(), vec!["A".to_string()]);
        lineages.insert("B".to_string(), vec!["A".to_string(), "B".to_string()]);
        let roots = BTreeSet::from(["A".to_string()]);

        let graph = ProvenanceGraph::from_parts(roots, nodes, lineages, GraphDiagnostics::default());

        assert_eq!(graph.node_count(), 2);
        assert!(graph.is_root("A"));
        assert!(!graph.is_root("B"));
        assert_eq!(graph.max_depth(), 1);
        let path: Vec<&str> = graph
            .lineage_nodes("B")
            .unwrap()
            .into_iter()
            .map(GraphNode::key)
            .collect();
        assert_eq!(path, vec!["A", "B"]);
    }
}
