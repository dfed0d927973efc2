//! Depth assignment
//!
//! Depth is the hop count from the nearest root. It is computed in two passes:
//!
//! 1. **Forward pass**: a multi-source BFS from every root along the ledger's
//!    `children` references. Each node reached takes the depth of the
//!    predecessor that discovered it plus one.
//! 2. **Fallback pass**: nodes the forward pass never reached (orphans whose
//!    parents are missing from the snapshot, cycles with no path from a root,
//!    or records the ledger forgot to list as children) are resolved from their
//!    `parents` instead. A node with resolved parents takes one more than the
//!    smallest resolved parent depth. Whatever remains forms groups with no
//!    resolvable ancestor. Each such group with no unresolved parent outside
//!    itself is seeded at depth 0 and resolution continues from there:
//!    - a record with no parent in the snapshot becomes a synthetic root;
//!    - members of a closed cycle (including a record that names itself)
//!      are anchored at depth 0 but stay non-roots, since their parents are
//!      all present.

use std::cmp::Reverse;
use std::collections::hash_map::Entry;
use std::collections::{BTreeSet, BinaryHeap, HashMap, HashSet, VecDeque};

use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use tracing::{debug, info};

use crate::index::RecordIndex;

/// Output of depth assignment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DepthAssignment {
    /// Depth for every indexed key
    pub depths: HashMap<String, usize>,
    /// Keys promoted to roots by the fallback pass
    pub synthetic_roots: BTreeSet<String>,
    /// Closed-cycle members seeded at depth 0 without becoming roots
    pub cycle_anchors: BTreeSet<String>,
}

impl DepthAssignment {
    /// Depth of `key`, if it was indexed
    pub fn depth(&self, key: &str) -> Option<usize> {
        self.depths.get(key).copied()
    }
}

/// Assign a depth to every node in `index`, starting from `roots`.
pub fn assign_depths(index: &RecordIndex, roots: &BTreeSet<String>) -> DepthAssignment {
    let mut depths: HashMap<&str, usize> = HashMap::with_capacity(index.len());
    let mut queue: VecDeque<&str> = VecDeque::new();

    for root in roots {
        if let Some((key, _)) = index.entry(root) {
            depths.insert(key, 0);
            queue.push_back(key);
        }
    }

    while let Some(key) = queue.pop_front() {
        let depth = depths[key];
        let Some(node) = index.get(key) else {
            continue;
        };
        for child in &node.record.children {
            let Some((child_key, _)) = index.entry(child) else {
                continue;
            };
            if let Entry::Vacant(slot) = depths.entry(child_key) {
                slot.insert(depth + 1);
                queue.push_back(child_key);
            }
        }
    }

    debug!(
        "Forward pass reached {} of {} records",
        depths.len(),
        index.len()
    );

    let mut seeds = FallbackSeeds::default();
    if depths.len() < index.len() {
        resolve_unreached(index, &mut depths, &mut seeds);
    }

    if !seeds.synthetic_roots.is_empty() {
        info!(
            "Promoted {} unreachable records to synthetic roots",
            seeds.synthetic_roots.len()
        );
    }
    if !seeds.cycle_anchors.is_empty() {
        info!(
            "Anchored {} members of unreachable cycles at depth 0",
            seeds.cycle_anchors.len()
        );
    }

    DepthAssignment {
        depths: depths
            .into_iter()
            .map(|(key, depth)| (key.to_string(), depth))
            .collect(),
        synthetic_roots: seeds.synthetic_roots,
        cycle_anchors: seeds.cycle_anchors,
    }
}

/// Keys seeded at depth 0 by the fallback pass.
#[derive(Default)]
struct FallbackSeeds {
    synthetic_roots: BTreeSet<String>,
    cycle_anchors: BTreeSet<String>,
}

/// Fallback pass for records the forward BFS did not reach.
fn resolve_unreached<'a>(
    index: &'a RecordIndex,
    depths: &mut HashMap<&'a str, usize>,
    seeds: &mut FallbackSeeds,
) {
    let derived = index.derived_children();
    let settled: HashSet<&'a str> = depths.keys().copied().collect();

    let mut heap: BinaryHeap<Reverse<(usize, &'a str)>> =
        depths.iter().map(|(&key, &depth)| Reverse((depth, key))).collect();
    relax(&mut heap, depths, &settled, &derived);

    loop {
        let unresolved: Vec<&'a str> = index
            .sorted_keys()
            .into_iter()
            .filter(|key| !depths.contains_key(key))
            .collect();
        if unresolved.is_empty() {
            break;
        }

        for component in source_components(index, &unresolved) {
            let parentless = match component.as_slice() {
                [key] => index.present_parents(key).next().is_none(),
                _ => false,
            };
            for key in component {
                if parentless {
                    debug!("Promoting {} to synthetic root", key);
                    seeds.synthetic_roots.insert(key.to_string());
                } else {
                    debug!("Anchoring cycle member {} at depth 0", key);
                    seeds.cycle_anchors.insert(key.to_string());
                }
                depths.insert(key, 0);
                heap.push(Reverse((0, key)));
            }
        }
        relax(&mut heap, depths, &settled, &derived);
    }
}

/// Lower depths along parent-derived edges in increasing depth order.
///
/// Nodes in `settled` keep the depth the forward pass gave them.
fn relax<'a>(
    heap: &mut BinaryHeap<Reverse<(usize, &'a str)>>,
    depths: &mut HashMap<&'a str, usize>,
    settled: &HashSet<&'a str>,
    derived: &HashMap<&'a str, Vec<&'a str>>,
) {
    while let Some(Reverse((depth, key))) = heap.pop() {
        if depths.get(key).is_some_and(|&current| current < depth) {
            continue;
        }
        let children = derived.get(key).map(Vec::as_slice).unwrap_or_default();
        for &child in children {
            if settled.contains(child) {
                continue;
            }
            let candidate = depth + 1;
            if depths.get(child).is_none_or(|&current| candidate < current) {
                depths.insert(child, candidate);
                heap.push(Reverse((candidate, child)));
            }
        }
    }
}

/// Strongly connected components of the unresolved subgraph that have no
/// unresolved parent outside themselves. Members and components are sorted.
///
/// A record whose parents are all missing is a singleton source component;
/// a closed cycle is a single source component containing every member.
fn source_components<'a>(index: &'a RecordIndex, unresolved: &[&'a str]) -> Vec<Vec<&'a str>> {
    let mut graph: DiGraph<&'a str, ()> = DiGraph::with_capacity(unresolved.len(), 0);
    let mut positions: HashMap<&'a str, NodeIndex> = HashMap::with_capacity(unresolved.len());
    for &key in unresolved {
        positions.insert(key, graph.add_node(key));
    }

    for &key in unresolved {
        let child = positions[key];
        for parent in index.present_parents(key) {
            if let Some(&parent_idx) = positions.get(parent) {
                graph.update_edge(parent_idx, child, ());
            }
        }
    }

    let mut sources = Vec::new();
    for component in tarjan_scc(&graph) {
        let members: HashSet<NodeIndex> = component.iter().copied().collect();
        let is_source = component.iter().all(|&idx| {
            graph
                .neighbors_directed(idx, Direction::Incoming)
                .all(|parent| members.contains(&parent))
        });
        if is_source {
            let mut keys: Vec<&'a str> = component.iter().map(|&idx| graph[idx]).collect();
            keys.sort_unstable();
            sources.push(keys);
        }
    }
    sources.sort_unstable();
    sources
}
