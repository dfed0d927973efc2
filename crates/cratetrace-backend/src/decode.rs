//! Snapshot decoding shared by every ledger reader.
//!
//! Accepted shapes:
//! - a top-level array of records
//! - an object with a `records` or `accounts` array
//!
//! Each entry is decoded on its own; an entry that fails to decode, has an
//! empty key, or has zero weight is dropped with a warning.

use cratetrace_core::ProvenanceRecord;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::BackendError;

/// Object fields that may hold the record list, in lookup order.
const LIST_FIELDS: [&str; 2] = ["records", "accounts"];

/// Decode a snapshot document into records.
pub fn decode_snapshot(bytes: &[u8]) -> Result<Vec<ProvenanceRecord>, BackendError> {
    let document: Value = serde_json::from_slice(bytes)
        .map_err(|e| BackendError::decode(format!("invalid JSON: {}", e)))?;
    decode_value(document)
}

/// Decode an already parsed snapshot document into records.
pub fn decode_value(document: Value) -> Result<Vec<ProvenanceRecord>, BackendError> {
    let entries = match document {
        Value::Array(entries) => entries,
        Value::Object(mut fields) => LIST_FIELDS
            .iter()
            .find_map(|name| match fields.remove(*name) {
                Some(Value::Array(entries)) => Some(entries),
                _ => None,
            })
            .ok_or_else(|| {
                BackendError::decode("expected a `records` or `accounts` array in snapshot object")
            })?,
        other => {
            return Err(BackendError::decode(format!(
                "expected an array of records, found {}",
                json_type(&other)
            )))
        }
    };

    let total = entries.len();
    let records: Vec<ProvenanceRecord> = entries
        .into_iter()
        .enumerate()
        .filter_map(|(position, entry)| decode_entry(position, entry))
        .collect();

    if records.len() < total {
        warn!(
            "Dropped {} of {} malformed ledger entries",
            total - records.len(),
            total
        );
    }
    debug!("Decoded {} ledger records", records.len());

    Ok(records)
}

fn decode_entry(position: usize, entry: Value) -> Option<ProvenanceRecord> {
    let record: ProvenanceRecord = match serde_json::from_value(entry) {
        Ok(record) => record,
        Err(e) => {
            warn!("Skipping ledger entry #{}: {}", position, e);
            return None;
        }
    };

    if record.key.trim().is_empty() {
        warn!("Skipping ledger entry #{}: empty key", position);
        return None;
    }
    if record.weight == 0 {
        warn!("Skipping ledger entry {}: zero weight", record.key);
        return None;
    }

    Some(record)
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cratetrace_core::OperationKind;

    #[test]
    fn test_decode_top_level_array() {
        let json = br#"[
            {"key": "A", "weight": 1000, "operation_kind": "Created"},
            {"key": "B", "weight": 1000, "operation_kind": "Transferred", "parents": ["A"]}
        ]"#;

        let records = decode_snapshot(json).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].parents, vec!["A".to_string()]);
    }

    #[test]
    fn test_decode_accounts_object_with_ledger_names() {
        let json = br#"{"accounts": [{
            "pubkey": "DtHLdSPx",
            "crate_id": "CRATE_001",
            "authority": "6ZTB7Uov",
            "weight": 5000,
            "timestamp": 1700000000,
            "hash": "h",
            "ipfs_cid": "c",
            "operation_type": "OperationType.Created",
            "parent_crates": [],
            "child_crates": ["EH9HZ1Vw"],
            "parent_weights": [],
            "split_distribution": null
        }]}"#;

        let records = decode_snapshot(json).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].key, "DtHLdSPx");
        assert_eq!(records[0].operation_kind, OperationKind::Created);
        assert_eq!(records[0].children, vec!["EH9HZ1Vw".to_string()]);
    }

    #[test]
    fn test_malformed_entries_are_dropped() {
        let json = br#"{"records": [
            {"key": "A", "weight": 1000, "operation_kind": "Created"},
            {"key": "", "weight": 1000, "operation_kind": "Created"},
            {"key": "Z", "weight": 0, "operation_kind": "Created"},
            {"key": "Q", "weight": 10, "operation_kind": "Burned"},
            {"weight": 10, "operation_kind": "Created"},
            42
        ]}"#;

        let records = decode_snapshot(json).unwrap();
        let keys: Vec<&str> = records.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(keys, vec!["A"]);
    }

    #[test]
    fn test_invalid_json_is_decode_error() {
        let err = decode_snapshot(b"{not json").unwrap_err();
        assert!(matches!(err, BackendError::Decode(_)));
    }

    #[test]
    fn test_unexpected_shape_is_decode_error() {
        let err = decode_snapshot(br#"{"crates": []}"#).unwrap_err();
        assert!(matches!(err, BackendError::Decode(_)));

        let err = decode_snapshot(b"\"records\"").unwrap_err();
        assert!(err.to_string().contains("a string"));
    }

    #[test]
    fn test_empty_snapshot() {
        assert!(decode_snapshot(b"[]").unwrap().is_empty());
    }
}
