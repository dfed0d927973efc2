//! HTTP ledger reader.
//!
//! Fetches the full record list with a single GET. The endpoint must return
//! the same JSON shapes a snapshot file may hold.

use std::time::Duration;

use async_trait::async_trait;
use cratetrace_config::RemoteLedgerConfig;
use cratetrace_core::ProvenanceRecord;
use reqwest::{Client, StatusCode};
use tracing::{debug, info, warn};

use crate::decode::decode_snapshot;
use crate::error::BackendError;
use crate::traits::LedgerReader;

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Reads records from an HTTP ledger endpoint.
pub struct RemoteLedger {
    /// HTTP client
    client: Client,

    /// Endpoint URL
    url: String,

    /// Bearer token (optional)
    api_key: Option<String>,

    /// Request timeout in seconds
    timeout_secs: u64,
}

impl RemoteLedger {
    /// Create a reader for `url` with the default timeout.
    pub fn new(url: impl Into<String>) -> Result<Self, BackendError> {
        Self::build(url.into(), None, DEFAULT_TIMEOUT_SECS)
    }

    /// Create a reader from configuration.
    ///
    /// The bearer token is read from the environment variable named by
    /// `api_key_env`; an unset variable means no authentication.
    pub fn from_config(config: &RemoteLedgerConfig) -> Result<Self, BackendError> {
        let api_key = config.api_key_env.as_deref().and_then(|name| {
            let value = std::env::var(name).ok().filter(|v| !v.is_empty());
            if value.is_none() {
                debug!("{} not set, fetching without authentication", name);
            }
            value
        });
        Self::build(config.url.clone(), api_key, config.timeout_secs)
    }

    fn build(url: String, api_key: Option<String>, timeout_secs: u64) -> Result<Self, BackendError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| BackendError::with_context("HTTP client", e.to_string()))?;

        Ok(Self {
            client,
            url,
            api_key,
            timeout_secs,
        })
    }

    /// Set the bearer token for authentication.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Get the endpoint URL.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Get the request timeout in seconds.
    pub fn timeout_secs(&self) -> u64 {
        self.timeout_secs
    }
}

#[async_trait]
impl LedgerReader for RemoteLedger {
    async fn fetch_all_records(&self) -> Result<Vec<ProvenanceRecord>, BackendError> {
        debug!("Fetching ledger records from {}", self.url);

        let mut request = self
            .client
            .get(&self.url)
            .header("Accept", "application/json");
        if let Some(ref api_key) = self.api_key {
            request = request.bearer_auth(api_key);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                BackendError::connectivity(format!(
                    "request to {} timed out after {}s",
                    self.url, self.timeout_secs
                ))
            } else if e.is_connect() {
                BackendError::connectivity(format!("connection to {} failed: {}", self.url, e))
            } else {
                BackendError::connectivity(format!("request to {} failed: {}", self.url, e))
            }
        })?;

        let status = response.status();
        match status {
            StatusCode::OK => {
                let bytes = response.bytes().await.map_err(|e| {
                    BackendError::connectivity(format!("failed to read response body: {}", e))
                })?;
                let records = decode_snapshot(&bytes)?;
                info!("Fetched {} records from {}", records.len(), self.url);
                Ok(records)
            }
            StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => Err(
                BackendError::connectivity(format!("ledger at {} timed out", self.url)),
            ),
            _ => {
                let body = response.text().await.unwrap_or_default();
                warn!("Ledger returned {}: {}", status, body);
                let message = if body.is_empty() {
                    status.canonical_reason().unwrap_or("unknown error").to_string()
                } else {
                    body
                };
                Err(BackendError::remote_server(status.as_u16(), message))
            }
        }
    }

    fn source(&self) -> &str {
        &self.url
    }
}
