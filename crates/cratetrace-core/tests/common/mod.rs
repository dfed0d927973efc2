//! Common test utilities for integration tests.
//!
//! Snapshot builders and graph invariant checks shared across the
//! integration test files.

#![allow(dead_code)]

use cratetrace_core::{OperationKind, ProvenanceGraph, ProvenanceRecord};

/// Build a record whose `children` are left empty.
pub fn record(key: &str, parents: &[&str]) -> ProvenanceRecord {
    let kind = match parents.len() {
        0 => OperationKind::Created,
        1 => OperationKind::Transferred,
        _ => OperationKind::Mixed,
    };
    ProvenanceRecord::new(key, kind).with_parents(parents.iter().copied())
}

/// Fill in `children` from `parents` so both edge directions agree.
pub fn link_children(mut records: Vec<ProvenanceRecord>) -> Vec<ProvenanceRecord> {
    let edges: Vec<(String, String)> = records
        .iter()
        .flat_map(|r| r.parents.iter().map(move |p| (p.clone(), r.key.clone())))
        .collect();
    for record in &mut records {
        record.children = edges
            .iter()
            .filter(|(parent, _)| *parent == record.key)
            .map(|(_, child)| child.clone())
            .collect();
        record.children.dedup();
    }
    records
}

/// Consistent snapshot from `(key, parents)` pairs.
pub fn snapshot(entries: &[(&str, &[&str])]) -> Vec<ProvenanceRecord> {
    link_children(entries.iter().map(|(key, parents)| record(key, parents)).collect())
}

pub fn lineage(graph: &ProvenanceGraph, key: &str) -> Vec<String> {
    graph
        .lineage(key)
        .map(<[String]>::to_vec)
        .unwrap_or_default()
}

pub fn keys(keys: &[&str]) -> Vec<String> {
    keys.iter().map(|k| k.to_string()).collect()
}

pub fn depth(graph: &ProvenanceGraph, key: &str) -> Option<usize> {
    graph.get_node(key).map(|n| n.depth)
}

/// Check the structural invariants every successful build must uphold.
pub fn assert_graph_invariants(graph: &ProvenanceGraph) {
    assert_eq!(graph.node_count(), graph.nodes().len());
    assert_eq!(graph.lineages().len(), graph.node_count());

    for node in graph.iter_nodes() {
        let key = node.key();
        assert_eq!(node.is_root, graph.is_root(key), "root flag mismatch for {key}");
        if node.record.parents.iter().all(|p| graph.contains_node(p)) {
            assert_eq!(
                node.is_root,
                node.record.parents.is_empty(),
                "{key} has all parents present but is_root={}",
                node.is_root
            );
        }
        if node.is_root {
            assert_eq!(node.depth, 0, "root {key} has non-zero depth");
        }

        let path = graph.lineage(key).unwrap_or_default();
        assert_eq!(path.last().map(String::as_str), Some(key), "lineage of {key}");
        if !graph.diagnostics().unresolved_lineages.contains(key) {
            let first = &path[0];
            let first_node = graph.get_node(first).unwrap();
            assert!(
                first_node.is_root || first_node.record.parents.iter().all(|p| !graph.contains_node(p)),
                "lineage of {key} starts at non-terminal {first}"
            );
        }
    }

    for root in graph.roots() {
        assert!(graph.contains_node(root), "root {root} missing from nodes");
    }
}
