//! Edge consistency checks
//!
//! The ledger stores both directions of every custody edge: a record lists its
//! `parents`, and each parent lists its `children`. The two lists are written
//! independently and can drift apart. This module compares them and reports
//! every disagreement without repairing anything.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::index::RecordIndex;

/// A disagreement between a forward and a backward reference.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EdgeMismatch {
    /// `child` lists `parent` in its parents, but `parent` does not list `child`
    MissingChildLink { parent: String, child: String },
    /// `parent` lists `child` in its children, but `child` does not list `parent`
    MissingParentLink { parent: String, child: String },
    /// `parent` lists a child key that is not in the snapshot
    DanglingChild { parent: String, child: String },
}

impl std::fmt::Display for EdgeMismatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingChildLink { parent, child } => {
                write!(f, "{child} names parent {parent}, but {parent} does not list it as a child")
            }
            Self::MissingParentLink { parent, child } => {
                write!(f, "{parent} lists child {child}, but {child} does not name it as a parent")
            }
            Self::DanglingChild { parent, child } => {
                write!(f, "{parent} lists child {child}, which is not in the snapshot")
            }
        }
    }
}

/// Result of comparing `parents` against `children` across a snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConsistencyReport {
    /// Sorted edge disagreements
    pub mismatches: Vec<EdgeMismatch>,
    /// Record key -> parent keys absent from the snapshot
    pub missing_parents: BTreeMap<String, Vec<String>>,
}

impl ConsistencyReport {
    /// Whether both edge directions agree everywhere
    pub fn is_consistent(&self) -> bool {
        self.mismatches.is_empty() && self.missing_parents.is_empty()
    }
}

/// Compare every `parents` reference with the matching `children` reference.
pub fn check_edges(index: &RecordIndex) -> ConsistencyReport {
    let mut report = ConsistencyReport::default();

    for (key, node) in index.iter() {
        for parent in &node.record.parents {
            match index.get(parent) {
                Some(parent_node) => {
                    if !parent_node.record.children.iter().any(|c| c == key) {
                        report.mismatches.push(EdgeMismatch::MissingChildLink {
                            parent: parent.clone(),
                            child: key.to_string(),
                        });
                    }
                }
                None => {
                    let missing = report.missing_parents.entry(key.to_string()).or_default();
                    if !missing.contains(parent) {
                        missing.push(parent.clone());
                    }
                }
            }
        }

        for child in &node.record.children {
            match index.get(child) {
                Some(child_node) => {
                    if !child_node.record.parents.iter().any(|p| p == key) {
                        report.mismatches.push(EdgeMismatch::MissingParentLink {
                            parent: key.to_string(),
                            child: child.clone(),
                        });
                    }
                }
                None => report.mismatches.push(EdgeMismatch::DanglingChild {
                    parent: key.to_string(),
                    child: child.clone(),
                }),
            }
        }
    }

    report.mismatches.sort();
    report.mismatches.dedup();
    for missing in report.missing_parents.values_mut() {
        missing.sort();
    }

    for mismatch in &report.mismatches {
        debug!("Edge mismatch: {}", mismatch);
    }
    for (key, missing) in &report.missing_parents {
        debug!("Record {} references missing parents {:?}", key, missing);
    }
    if !report.is_consistent() {
        warn!(
            "Snapshot edges disagree: {} mismatches, {} records with missing parents",
            report.mismatches.len(),
            report.missing_parents.len()
        );
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::DuplicatePolicy;
    use crate::record::{OperationKind, ProvenanceRecord};

    fn index(records: Vec<ProvenanceRecord>) -> RecordIndex {
        RecordIndex::from_records(records, DuplicatePolicy::default()).unwrap()
    }

    #[test]
    fn test_consistent_snapshot() {
        let report = check_edges(&index(vec![
            ProvenanceRecord::new("A", OperationKind::Created).with_children(["B"]),
            ProvenanceRecord::new("B", OperationKind::Transferred).with_parents(["A"]),
        ]));
        assert!(report.is_consistent());
    }

    #[test]
    fn test_detects_each_mismatch_kind() {
        let report = check_edges(&index(vec![
            // A lists C, but C names no parent; B names A, but A omits B
            ProvenanceRecord::new("A", OperationKind::Created).with_children(["C", "gone"]),
            ProvenanceRecord::new("B", OperationKind::Transferred).with_parents(["A"]),
            ProvenanceRecord::new("C", OperationKind::Created),
            ProvenanceRecord::new("D", OperationKind::Mixed).with_parents(["x", "x", "w"]),
        ]));

        assert_eq!(
            report.mismatches,
            vec![
                EdgeMismatch::MissingChildLink {
                    parent: "A".into(),
                    child: "B".into()
                },
                EdgeMismatch::MissingParentLink {
                    parent: "A".into(),
                    child: "C".into()
                },
                EdgeMismatch::DanglingChild {
                    parent: "A".into(),
                    child: "gone".into()
                },
            ]
        );
        assert_eq!(
            report.missing_parents.get("D"),
            Some(&vec!["w".to_string(), "x".to_string()])
        );
    }

    #[test]
    fn test_mismatch_display() {
        let mismatch = EdgeMismatch::DanglingChild {
            parent: "A".into(),
            child: "Z".into(),
        };
        assert_eq!(
            mismatch.to_string(),
            "A lists child Z, which is not in the snapshot"
        );
    }

    #[test]
    fn test_mismatch_serializes_tagged() {
        let json = serde_json::to_value(EdgeMismatch::MissingChildLink {
            parent: "A".into(),
            child: "B".into(),
        })
        .unwrap();
        assert_eq!(json["kind"], "missing_child_link");
        assert_eq!(json["parent"], "A");
    }
}
