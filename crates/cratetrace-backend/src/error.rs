//! Backend error types.

use thiserror::Error;

/// Errors that can occur while fetching records or answering queries.
#[derive(Error, Debug)]
pub enum BackendError {
    /// The ledger could not be reached
    #[error("ledger unreachable: {0}")]
    Connectivity(String),

    /// The ledger answered with a document that is not a record list
    #[error("failed to decode ledger snapshot: {0}")]
    Decode(String),

    /// Graph construction failed
    #[error("graph build failed: {0}")]
    Build(#[from] cratetrace_core::BuilderError),

    /// Requested record is not in the graph
    #[error("crate '{key}' not found in supply chain")]
    NotFound { key: String },

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(#[from] cratetrace_config::ConfigError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Remote ledger returned an error status
    #[error("remote ledger error: {status} - {message}")]
    RemoteServer { status: u16, message: String },

    /// Generic error with context
    #[error("{context}: {message}")]
    WithContext { context: String, message: String },
}

impl BackendError {
    /// Create a Connectivity error.
    pub fn connectivity(message: impl Into<String>) -> Self {
        Self::Connectivity(message.into())
    }

    /// Create a Decode error.
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode(message.into())
    }

    /// Create a NotFound error.
    pub fn not_found(key: impl Into<String>) -> Self {
        Self::NotFound { key: key.into() }
    }

    /// Create a RemoteServer error.
    pub fn remote_server(status: u16, message: impl Into<String>) -> Self {
        Self::RemoteServer {
            status,
            message: message.into(),
        }
    }

    /// Add context to any error.
    pub fn with_context(context: impl Into<String>, message: impl Into<String>) -> Self {
        Self::WithContext {
            context: context.into(),
            message: message.into(),
        }
    }

    /// Whether the error came from fetching rather than from the data itself.
    pub fn is_fetch_failure(&self) -> bool {
        matches!(
            self,
            Self::Connectivity(_) | Self::RemoteServer { .. } | Self::Io(_)
        )
    }
}
