//! Provenance record model
//!
//! A [`ProvenanceRecord`] is one immutable custody event as stored on the
//! ledger. Field names follow the graph vocabulary (`key`, `parents`, ...);
//! the ledger account names (`pubkey`, `parent_crates`, ...) are accepted as
//! aliases when decoding.

use serde::{Deserialize, Serialize};

// ============================================================================
// Operation Kind
// ============================================================================

/// The custody operation that produced a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum OperationKind {
    /// A new crate entered the supply chain
    Created,
    /// Custody moved to a different holder
    Transferred,
    /// Several parent crates were merged into one
    Mixed,
    /// One parent crate was divided among several children
    Split,
}

impl OperationKind {
    /// All operation kinds, in declaration order.
    pub const ALL: [OperationKind; 4] = [
        OperationKind::Created,
        OperationKind::Transferred,
        OperationKind::Mixed,
        OperationKind::Split,
    ];

    /// Get the canonical string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationKind::Created => "Created",
            OperationKind::Transferred => "Transferred",
            OperationKind::Mixed => "Mixed",
            OperationKind::Split => "Split",
        }
    }
}

impl std::fmt::Display for OperationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when an operation kind string is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown operation kind '{0}' (expected Created, Transferred, Mixed or Split)")]
pub struct UnknownOperationKind(pub String);

impl std::str::FromStr for OperationKind {
    type Err = UnknownOperationKind;

    /// Parses case-insensitively. Qualified enum renderings such as
    /// `OperationType.Mixed` or `OperationType::Mixed` resolve to their last segment.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let name = trimmed
            .rsplit(|c: char| c == '.' || c == ':')
            .next()
            .unwrap_or(trimmed)
            .to_ascii_lowercase();

        match name.as_str() {
            "created" => Ok(OperationKind::Created),
            "transferred" => Ok(OperationKind::Transferred),
            "mixed" => Ok(OperationKind::Mixed),
            "split" => Ok(OperationKind::Split),
            _ => Err(UnknownOperationKind(s.to_string())),
        }
    }
}

impl<'de> Deserialize<'de> for OperationKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

// ============================================================================
// Provenance Record
// ============================================================================

/// One immutable provenance entry fetched from the ledger.
///
/// `children` is a convenience back-reference maintained by the ledger and may
/// disagree with `parents`; ancestry is always derived from `parents`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvenanceRecord {
    /// Content-addressed identifier (ledger account address)
    #[serde(alias = "pubkey")]
    pub key: String,

    /// Human-readable identifier, not guaranteed unique
    #[serde(alias = "crate_id", default)]
    pub label: String,

    /// Identity of the current holder
    #[serde(alias = "authority", default)]
    pub custodian: String,

    /// Weight in grams
    pub weight: u64,

    /// Unix timestamp of the custody event
    #[serde(alias = "timestamp", default)]
    pub created_at: i64,

    /// Opaque content digest
    #[serde(alias = "hash", default)]
    pub content_hash: String,

    /// Opaque off-chain content locator
    #[serde(alias = "ipfs_cid", default)]
    pub content_locator: String,

    /// Operation that produced this record
    #[serde(alias = "operation_type")]
    pub operation_kind: OperationKind,

    /// Keys of the records this one was derived from (empty for origins)
    #[serde(alias = "parent_crates", default)]
    pub parents: Vec<String>,

    /// Keys of records that reference this one, as reported by the ledger
    #[serde(alias = "child_crates", default)]
    pub children: Vec<String>,

    /// Parent weights at the time of the operation
    #[serde(default)]
    pub parent_weights: Vec<u64>,

    /// Weight distribution for split operations
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub split_distribution: Option<Vec<u64>>,
}

impl ProvenanceRecord {
    /// Create a record with the given key and operation. The weight starts at
    /// one gram and every other field is empty.
    pub fn new(key: impl Into<String>, operation_kind: OperationKind) -> Self {
        Self {
            key: key.into(),
            label: String::new(),
            custodian: String::new(),
            weight: 1,
            created_at: 0,
            content_hash: String::new(),
            content_locator: String::new(),
            operation_kind,
            parents: Vec::new(),
            children: Vec::new(),
            parent_weights: Vec::new(),
            split_distribution: None,
        }
    }

    /// Set the parent keys
    pub fn with_parents<I, S>(mut self, parents: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.parents = parents.into_iter().map(Into::into).collect();
        self
    }

    /// Set the child back-references
    pub fn with_children<I, S>(mut self, children: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.children = children.into_iter().map(Into::into).collect();
        self
    }

    /// Set the human-readable label
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Set the custodian
    pub fn with_custodian(mut self, custodian: impl Into<String>) -> Self {
        self.custodian = custodian.into();
        self
    }

    /// Set the weight in grams
    pub fn with_weight(mut self, weight: u64) -> Self {
        self.weight = weight;
        self
    }

    /// Set the creation timestamp
    pub fn with_created_at(mut self, created_at: i64) -> Self {
        self.created_at = created_at;
        self
    }

    /// Whether the record declares no parents (a candidate root)
    pub fn is_origin(&self) -> bool {
        self.parents.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_kind_serialization() {
        let json = serde_json::to_string(&OperationKind::Mixed).unwrap();
        assert_eq!(json, "\"Mixed\"");
    }

    #[test]
    fn test_operation_kind_lenient_parsing() {
        assert_eq!("split".parse::<OperationKind>(), Ok(OperationKind::Split));
        assert_eq!(
            "OperationType.Transferred".parse::<OperationKind>(),
            Ok(OperationKind::Transferred)
        );
        assert_eq!(
            "OperationType::Created".parse::<OperationKind>(),
            Ok(OperationKind::Created)
        );
        assert!("Burned".parse::<OperationKind>().is_err());
    }

    #[test]
    fn test_record_decodes_ledger_field_names() {
        let json = r#"{
            "pubkey": "EH9HZ1Vw",
            "crate_id": "CRATE_002",
            "authority": "6ZTB7Uov",
            "weight": 2500,
            "timestamp": 1700000000,
            "hash": "abc123",
            "ipfs_cid": "bafy",
            "operation_type": "Transferred",
            "parent_crates": ["DtHLdSPx"],
            "child_crates": [],
            "parent_weights": [2500]
        }"#;

        let record: ProvenanceRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.key, "EH9HZ1Vw");
        assert_eq!(record.label, "CRATE_002");
        assert_eq!(record.custodian, "6ZTB7Uov");
        assert_eq!(record.created_at, 1_700_000_000);
        assert_eq!(record.content_locator, "bafy");
        assert_eq!(record.operation_kind, OperationKind::Transferred);
        assert_eq!(record.parents, vec!["DtHLdSPx".to_string()]);
        assert!(record.split_distribution.is_none());
        assert!(!record.is_origin());
    }

    #[test]
    fn test_record_missing_optional_fields() {
        let json = r#"{"key": "A", "weight": 10, "operation_kind": "created"}"#;
        let record: ProvenanceRecord = serde_json::from_str(json).unwrap();
        assert!(record.is_origin());
        assert!(record.children.is_empty());
        assert!(record.label.is_empty());
    }

    #[test]
    fn test_record_rejects_unknown_operation() {
        let json = r#"{"key": "A", "weight": 10, "operation_kind": "Burned"}"#;
        let err = serde_json::from_str::<ProvenanceRecord>(json).unwrap_err();
        assert!(err.to_string().contains("Burned"));
    }
}
