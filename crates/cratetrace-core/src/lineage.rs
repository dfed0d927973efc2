//! Lineage tracing
//!
//! A lineage is the shortest root-to-record path along `parents` references.
//! When several shortest paths exist, the one with the lexicographically
//! smallest key at the first point of difference wins, comparing root-first.
//!
//! Paths are found with a level-synchronous BFS that starts from every
//! terminal (a root, or a record with no parent in the snapshot) at once.
//! Each level is expanded in lineage order and children are visited in sorted
//! key order, so the first predecessor to discover a record is the one on its
//! canonical path. Lineages are then rebuilt in discovery order by extending
//! the already resolved lineage of that predecessor.

use std::collections::hash_map::Entry;
use std::collections::{BTreeMap, BTreeSet, HashMap};

use tracing::{debug, warn};

use crate::index::RecordIndex;

/// Output of lineage tracing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineageTrace {
    /// Root-to-record key path for every indexed key
    pub lineages: BTreeMap<String, Vec<String>>,
    /// Keys no terminal reaches; their lineage is just the key itself
    pub unresolved: BTreeSet<String>,
}

/// Trace the canonical lineage of every record in `index`.
///
/// `roots` should include any synthetic roots promoted during depth
/// assignment so that orphan groups terminate there. Cycles no root reaches
/// have no terminal; their members and descendants fall back to `[key]`.
pub fn trace_lineages(index: &RecordIndex, roots: &BTreeSet<String>) -> LineageTrace {
    let derived = index.derived_children();

    let mut frontier: Vec<&str> = index
        .sorted_keys()
        .into_iter()
        .filter(|&key| roots.contains(key) || index.present_parents(key).next().is_none())
        .collect();

    // Key -> predecessor on its canonical path (None for terminals)
    let mut predecessor: HashMap<&str, Option<&str>> = HashMap::with_capacity(index.len());
    let mut order: Vec<&str> = Vec::with_capacity(index.len());
    for &terminal in &frontier {
        predecessor.insert(terminal, None);
        order.push(terminal);
    }

    while !frontier.is_empty() {
        let mut next = Vec::new();
        for &parent in &frontier {
            let Some(children) = derived.get(parent) else {
                continue;
            };
            for &child in children {
                if let Entry::Vacant(slot) = predecessor.entry(child) {
                    slot.insert(Some(parent));
                    order.push(child);
                    next.push(child);
                }
            }
        }
        frontier = next;
    }

    let mut resolved: HashMap<&str, Vec<String>> = HashMap::with_capacity(order.len());
    for &key in &order {
        let mut path = match predecessor.get(key).copied().flatten() {
            Some(parent) => resolved.get(parent).cloned().unwrap_or_default(),
            None => Vec::new(),
        };
        path.push(key.to_string());
        resolved.insert(key, path);
    }

    let mut trace = LineageTrace::default();
    for key in index.sorted_keys() {
        let path = match resolved.remove(key) {
            Some(path) => path,
            None => {
                debug!("No terminal reaches {}, falling back to a single-key lineage", key);
                trace.unresolved.insert(key.to_string());
                vec![key.to_string()]
            }
        };
        trace.lineages.insert(key.to_string(), path);
    }

    if !trace.unresolved.is_empty() {
        warn!(
            "{} records have no lineage back to a root",
            trace.unresolved.len()
        );
    }

    trace
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::DuplicatePolicy;
    use crate::record::{OperationKind, ProvenanceRecord};

    fn index(records: Vec<ProvenanceRecord>) -> RecordIndex {
        RecordIndex::from_records(records, DuplicatePolicy::default()).unwrap()
    }

    fn rec(key: &str, parents: &[&str]) -> ProvenanceRecord {
        ProvenanceRecord::new(key, OperationKind::Transferred).with_parents(parents.iter().copied())
    }

    fn path(trace: &LineageTrace, key: &str) -> Vec<String> {
        trace.lineages.get(key).cloned().unwrap_or_default()
    }

    fn keys(keys: &[&str]) -> Vec<String> {
        keys.iter().map(|k| k.to_string()).collect()
    }

    #[test]
    fn test_chain_lineage() {
        let index = index(vec![rec("C", &["B"]), rec("A", &[]), rec("B", &["A"])]);
        let trace = trace_lineages(&index, &index.roots());

        assert_eq!(path(&trace, "A"), keys(&["A"]));
        assert_eq!(path(&trace, "C"), keys(&["A", "B", "C"]));
        assert!(trace.unresolved.is_empty());
    }

    #[test]
    fn test_mix_prefers_smaller_branch() {
        let index = index(vec![
            rec("A", &[]),
            rec("C", &["A"]),
            rec("B", &["A"]),
            rec("D", &["C", "B"]),
        ]);
        let trace = trace_lineages(&index, &index.roots());

        assert_eq!(path(&trace, "D"), keys(&["A", "B", "D"]));
    }

    #[test]
    fn test_shorter_path_beats_smaller_keys() {
        // Z -> Y -> X -> T is longer than A -> T
        let index = index(vec![
            rec("A", &[]),
            rec("Z", &[]),
            rec("Y", &["Z"]),
            rec("X", &["Y"]),
            rec("T", &["X", "A"]),
        ]);
        let trace = trace_lineages(&index, &index.roots());

        assert_eq!(path(&trace, "T"), keys(&["A", "T"]));
    }

    #[test]
    fn test_tie_break_compares_from_root() {
        // Two roots; paths [R1, P2, T] and [R2, P1, T] have equal length
        let index = index(vec![
            rec("R1", &[]),
            rec("R2", &[]),
            rec("P2", &["R1"]),
            rec("P1", &["R2"]),
            rec("T", &["P1", "P2"]),
        ]);
        let trace = trace_lineages(&index, &index.roots());

        assert_eq!(path(&trace, "T"), keys(&["R1", "P2", "T"]));
    }

    #[test]
    fn test_repeated_ancestor_across_mix_branches() {
        // A feeds both B and C, which are mixed into M
        let index = index(vec![
            rec("A", &[]),
            rec("B", &["A"]),
            rec("C", &["A"]),
            rec("M", &["B", "C", "B"]),
            rec("N", &["M"]),
        ]);
        let trace = trace_lineages(&index, &index.roots());

        assert_eq!(path(&trace, "N"), keys(&["A", "B", "M", "N"]));
    }

    #[test]
    fn test_orphan_terminates_at_itself() {
        let index = index(vec![rec("E", &["missing-key"]), rec("H", &["E"])]);
        let trace = trace_lineages(&index, &BTreeSet::new());

        assert_eq!(path(&trace, "E"), keys(&["E"]));
        assert_eq!(path(&trace, "H"), keys(&["E", "H"]));
        assert!(trace.unresolved.is_empty());
    }

    #[test]
    fn test_closed_cycle_without_roots_is_unresolved() {
        let index = index(vec![rec("F", &["G"]), rec("G", &["F"]), rec("H", &["G"])]);
        let trace = trace_lineages(&index, &BTreeSet::new());

        assert_eq!(path(&trace, "F"), keys(&["F"]));
        assert_eq!(path(&trace, "G"), keys(&["G"]));
        assert_eq!(path(&trace, "H"), keys(&["H"]));
        assert_eq!(
            trace.unresolved,
            BTreeSet::from(["F".to_string(), "G".to_string(), "H".to_string()])
        );
    }

    #[test]
    fn test_cycle_next_to_orphan_root() {
        let index = index(vec![rec("E", &["gone"]), rec("F", &["G", "E"]), rec("G", &["F"])]);
        let roots = BTreeSet::from(["E".to_string()]);
        let trace = trace_lineages(&index, &roots);

        assert_eq!(path(&trace, "F"), keys(&["E", "F"]));
        assert_eq!(path(&trace, "G"), keys(&["E", "F", "G"]));
        assert!(trace.unresolved.is_empty());
    }

    #[test]
    fn test_cycle_hanging_off_root() {
        let index = index(vec![rec("A", &[]), rec("B", &["A", "C"]), rec("C", &["B"])]);
        let trace = trace_lineages(&index, &index.roots());

        assert_eq!(path(&trace, "B"), keys(&["A", "B"]));
        assert_eq!(path(&trace, "C"), keys(&["A", "B", "C"]));
    }
}
