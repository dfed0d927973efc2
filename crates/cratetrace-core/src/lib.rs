//! cratetrace Core - Provenance graph reconstruction
//!
//! This crate turns a flat, unordered snapshot of ledger provenance records
//! into a navigable graph:
//! - Record indexing with an explicit duplicate-key policy
//! - Root classification (records with no parents)
//! - Depth assignment by multi-source BFS with an orphan/cycle fallback
//! - Canonical root-to-record lineage tracing
//! - Consistency checks between `parents` and `children` references
//!
//! The builder is a pure, synchronous transform: it performs no I/O and every
//! call produces a fresh, immutable [`ProvenanceGraph`].

pub mod builder;
pub mod consistency;
pub mod depth;
pub mod graph;
pub mod index;
pub mod lineage;
pub mod record;

// Re-exports for convenience
pub use builder::{build_graph, BuilderConfig, BuilderError, GraphBuilder};
pub use consistency::{check_edges, ConsistencyReport, EdgeMismatch};
pub use graph::{GraphDiagnostics, GraphNode, ProvenanceGraph};
pub use index::{DuplicatePolicy, RecordIndex};
pub use record::{OperationKind, ProvenanceRecord};
