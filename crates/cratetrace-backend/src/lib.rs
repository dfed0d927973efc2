//! cratetrace Backend - Ledger access and supply-chain queries
//!
//! This crate connects the pure graph builder in `cratetrace-core` to the
//! outside world:
//! - [`LedgerReader`] implementations that fetch a flat record snapshot
//! - [`QueryFacade`], which builds a fresh graph per query and answers
//!   history, statistics and search requests
//!
//! ## Ledger Readers
//!
//! - [`SnapshotLedger`]: JSON export on disk
//! - [`RemoteLedger`]: HTTP endpoint returning the same JSON
//! - [`InMemoryLedger`]: a fixed record list
//!
//! ## Example
//!
//! ```ignore
//! use cratetrace_backend::{QueryFacade, SnapshotLedger};
//! use cratetrace_core::BuilderConfig;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let reader = Arc::new(SnapshotLedger::new("ledger.json"));
//!     let facade = QueryFacade::new(reader, BuilderConfig::default());
//!
//!     let history = facade.crate_history("EH9HZ1Vw").await?;
//!     println!("{} hops from {}", history.hops(), history.root.key());
//!     Ok(())
//! }
//! ```

mod decode;
mod error;
mod facade;
mod memory;
mod remote;
mod setup;
mod snapshot;
mod traits;
mod types;

pub use decode::{decode_snapshot, decode_value};
pub use error::BackendError;
pub use facade::{find_nodes, QueryFacade};
pub use memory::InMemoryLedger;
pub use remote::RemoteLedger;
pub use setup::{builder_config, open_ledger};
pub use snapshot::SnapshotLedger;
pub use traits::LedgerReader;
pub use types::*;

/// Result type for backend operations.
pub type Result<T> = std::result::Result<T, BackendError>;
