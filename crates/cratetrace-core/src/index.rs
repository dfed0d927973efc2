//! Record indexing and root classification
//!
//! [`RecordIndex`] is the lookup table every later pass works from. It resolves
//! duplicate keys according to a [`DuplicatePolicy`] and classifies roots while
//! indexing: a record is a root iff it declares no parents.

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};
use tracing::{trace, warn};

use crate::builder::BuilderError;
use crate::graph::GraphNode;
use crate::record::ProvenanceRecord;

/// What to do when the same key appears more than once in a snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DuplicatePolicy {
    /// The later occurrence (by input order) replaces the earlier one.
    /// The overwrite is logged and reported in the graph diagnostics.
    #[default]
    LastWriteWins,
    /// Fail the whole build on the first duplicate key.
    Reject,
}

impl std::fmt::Display for DuplicatePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LastWriteWins => write!(f, "last-write-wins"),
            Self::Reject => write!(f, "reject"),
        }
    }
}

/// Lookup table of graph nodes keyed by record key.
///
/// Nodes carry placeholder `depth` values; `is_root` is already classified.
#[derive(Debug, Clone, Default)]
pub struct RecordIndex {
    nodes: HashMap<String, GraphNode>,
    duplicate_keys: BTreeSet<String>,
}

impl RecordIndex {
    /// Index records in input order, applying `policy` to repeated keys.
    pub fn from_records<I>(records: I, policy: DuplicatePolicy) -> Result<Self, BuilderError>
    where
        I: IntoIterator<Item = ProvenanceRecord>,
    {
        let records = records.into_iter();
        let mut nodes: HashMap<String, GraphNode> = HashMap::with_capacity(records.size_hint().0);
        let mut duplicate_keys = BTreeSet::new();

        for record in records {
            let key = record.key.clone();
            if nodes.contains_key(&key) {
                match policy {
                    DuplicatePolicy::Reject => return Err(BuilderError::DuplicateKey { key }),
                    DuplicatePolicy::LastWriteWins => {
                        warn!("Duplicate record key {}, keeping the later occurrence", key);
                        duplicate_keys.insert(key.clone());
                    }
                }
            }
            trace!("Indexed record {}", key);
            nodes.insert(key, GraphNode::pending(record));
        }

        Ok(Self {
            nodes,
            duplicate_keys,
        })
    }

    /// Get a node by key
    pub fn get(&self, key: &str) -> Option<&GraphNode> {
        self.nodes.get(key)
    }

    /// Get the index-owned key and node for `key`
    pub fn entry(&self, key: &str) -> Option<(&str, &GraphNode)> {
        self.nodes
            .get_key_value(key)
            .map(|(k, node)| (k.as_str(), node))
    }

    /// Check if a key is present
    pub fn contains(&self, key: &str) -> bool {
        self.nodes.contains_key(key)
    }

    /// Number of distinct keys
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the index holds no records
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Keys overwritten under [`DuplicatePolicy::LastWriteWins`]
    pub fn duplicate_keys(&self) -> &BTreeSet<String> {
        &self.duplicate_keys
    }

    /// All keys in ascending order.
    pub fn sorted_keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.nodes.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }

    /// Iterate over all nodes in arbitrary order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &GraphNode)> {
        self.nodes.iter().map(|(k, node)| (k.as_str(), node))
    }

    /// Keys of records that declare no parents.
    pub fn roots(&self) -> BTreeSet<String> {
        self.nodes
            .values()
            .filter(|node| node.is_root)
            .map(|node| node.key().to_string())
            .collect()
    }

    /// Parents of `key` that are present in this index, in declaration order.
    /// Repeated parents (mixes of the same source) are yielded once per mention.
    pub fn present_parents<'s>(&'s self, key: &str) -> impl Iterator<Item = &'s str> + 's {
        self.nodes.get(key).into_iter().flat_map(move |node| {
            node.record
                .parents
                .iter()
                .map(String::as_str)
                .filter(move |parent| self.nodes.contains_key(*parent))
        })
    }

    /// Forward adjacency derived from `parents` (parent key -> child keys).
    ///
    /// Only parents present in the index get an entry. Child lists are sorted
    /// and deduplicated so traversals over them are order-independent.
    pub fn derived_children(&self) -> HashMap<&str, Vec<&str>> {
        let mut adjacency: HashMap<&str, Vec<&str>> = HashMap::new();
        for (key, _) in self.iter() {
            for parent in self.present_parents(key) {
                adjacency.entry(parent).or_default().push(key);
            }
        }
        for children in adjacency.values_mut() {
            children.sort_unstable();
            children.dedup();
        }
        adjacency
    }

    /// Consume the index, yielding its nodes.
    pub(crate) fn into_nodes(self) -> HashMap<String, GraphNode> {
        self.nodes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::OperationKind;

    fn record(key: &str, parents: &[&str]) -> ProvenanceRecord {
        let kind = if parents.is_empty() {
            OperationKind::Created
        } else {
            OperationKind::Transferred
        };
        ProvenanceRecord::new(key, kind).with_parents(parents.iter().copied())
    }

    #[test]
    fn test_roots_are_classified_while_indexing() {
        let index = RecordIndex::from_records(
            vec![record("A", &[]), record("B", &["A"]), record("C", &[])],
            DuplicatePolicy::default(),
        )
        .unwrap();

        assert_eq!(index.len(), 3);
        assert!(index.get("A").unwrap().is_root);
        assert!(!index.get("B").unwrap().is_root);
        let roots: Vec<String> = index.roots().into_iter().collect();
        assert_eq!(roots, vec!["A".to_string(), "C".to_string()]);
    }

    #[test]
    fn test_last_write_wins_keeps_later_record() {
        let first = record("A", &[]).with_label("first");
        let second = record("A", &[]).with_label("second");

        let index =
            RecordIndex::from_records(vec![first, second], DuplicatePolicy::LastWriteWins)
                .unwrap();

        assert_eq!(index.len(), 1);
        assert_eq!(index.get("A").unwrap().record.label, "second");
        assert!(index.duplicate_keys().contains("A"));
    }

    #[test]
    fn test_reject_policy_fails_on_duplicate() {
        let err = RecordIndex::from_records(
            vec![record("A", &[]), record("B", &["A"]), record("A", &[])],
            DuplicatePolicy::Reject,
        )
        .unwrap_err();

        assert!(matches!(err, BuilderError::DuplicateKey { ref key } if key == "A"));
    }

    #[test]
    fn test_present_parents_skips_missing_keys() {
        let index = RecordIndex::from_records(
            vec![record("A", &[]), record("M", &["A", "ghost", "A"])],
            DuplicatePolicy::default(),
        )
        .unwrap();

        let parents: Vec<&str> = index.present_parents("M").collect();
        assert_eq!(parents, vec!["A", "A"]);
        assert_eq!(index.present_parents("unknown").count(), 0);
    }

    #[test]
    fn test_derived_children_sorted_and_deduplicated() {
        let index = RecordIndex::from_records(
            vec![
                record("A", &[]),
                record("C", &["A"]),
                record("B", &["A"]),
                record("M", &["A", "A"]),
            ],
            DuplicatePolicy::default(),
        )
        .unwrap();

        let adjacency = index.derived_children();
        assert_eq!(adjacency.get("A").unwrap(), &vec!["B", "C", "M"]);
        assert!(!adjacency.contains_key("B"));
    }

    #[test]
    fn test_duplicate_policy_display() {
        assert_eq!(DuplicatePolicy::LastWriteWins.to_string(), "last-write-wins");
        assert_eq!(DuplicatePolicy::Reject.to_string(), "reject");
    }
}
