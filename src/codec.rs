// JSON encoding of a whole record list

use crate::record::Record;
use eyre::{Context, Result};
use serde_json::Value;
use std::collections::HashSet;
use tracing::{debug, info, warn};

/// Serialize a list of records as a single JSON array
pub fn encode_list<T: Record>(records: &[T]) -> Result<Vec<u8>> {
    serde_json::to_vec(records).context("Failed to serialize record list")
}

/// Decode a record list, degrading to an empty list on any shape problem
///
/// - `None` (key never written) yields an empty list.
/// - Bytes that are not valid JSON, or JSON that is not an array, yield an
///   empty list.
/// - Elements that don't decode as `T`, fail `Record::is_valid`, or repeat an
///   id already seen are skipped. Stored order is otherwise preserved.
pub fn decode_list<T: Record>(bytes: Option<&[u8]>) -> Vec<T> {
    let key = T::storage_key();

    let Some(bytes) = bytes else {
        info!(key, "No stored records, starting empty");
        return Vec::new();
    };

    let value: Value = match serde_json::from_slice(bytes) {
        Ok(v) => v,
        Err(e) => {
            warn!(key, error = ?e, "Failed to parse stored records, starting empty");
            return Vec::new();
        }
    };

    let Value::Array(items) = value else {
        warn!(key, "Stored records are not a list, starting empty");
        return Vec::new();
    };

    let mut seen = HashSet::new();
    let mut records = Vec::with_capacity(items.len());

    for (index, item) in items.into_iter().enumerate() {
        let record: T = match serde_json::from_value(item) {
            Ok(r) => r,
            Err(e) => {
                warn!(key, index, error = ?e, "Failed to decode record, skipping");
                continue;
            }
        };

        if !record.is_valid() {
            warn!(key, index, id = record.id(), "Invalid record, skipping");
            continue;
        }

        if !seen.insert(record.id().to_string()) {
            warn!(key, index, id = record.id(), "Duplicate record id, skipping");
            continue;
        }

        records.push(record);
    }

    debug!(key, count = records.len(), "Decoded stored records");
    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::Task;

    fn task(id: &str, title: &str, completed: bool, created_at: i64) -> Task {
        Task {
            id: id.to_string(),
            title: title.to_string(),
            completed,
            created_at,
        }
    }

    #[test]
    fn test_encode_then_decode_preserves_fields_and_order() {
        let tasks = vec![
            task("c", "Third", false, 3000),
            task("b", "Second", true, 2000),
            task("a", "First", false, 1000),
        ];

        let bytes = encode_list(&tasks).unwrap();
        let decoded: Vec<Task> = decode_list(Some(&bytes));
        assert_eq!(decoded, tasks);
    }

    #[test]
    fn test_encode_empty_list() {
        let bytes = encode_list::<Task>(&[]).unwrap();
        assert_eq!(bytes, b"[]");
    }

    #[test]
    fn test_decode_missing() {
        let decoded: Vec<Task> = decode_list(None);
        assert!(decoded.is_empty());
    }

    #[test]
    fn test_decode_malformed_json() {
        let decoded: Vec<Task> = decode_list(Some(b"[{\"id\":\"a\",\"title\""));
        assert!(decoded.is_empty());

        let decoded: Vec<Task> = decode_list(Some(b"not json at all"));
        assert!(decoded.is_empty());
    }

    #[test]
    fn test_decode_non_list() {
        let decoded: Vec<Task> = decode_list(Some(br#"{"id":"a","title":"x","completed":false,"createdAt":1}"#));
        assert!(decoded.is_empty());

        let decoded: Vec<Task> = decode_list(Some(b"null"));
        assert!(decoded.is_empty());

        let decoded: Vec<Task> = decode_list(Some(b"42"));
        assert!(decoded.is_empty());
    }

    #[test]
    fn test_decode_skips_bad_elements() {
        let payload = br#"[
            {"id":"a","title":"Valid","completed":false,"createdAt":1000},
            {"id":"b","title":"Missing createdAt","completed":false},
            "just a string",
            {"id":"c","title":"   ","completed":true,"createdAt":1000},
            {"id":"a","title":"Duplicate","completed":true,"createdAt":2000},
            {"id":"d","title":"Also Valid","completed":true,"createdAt":500,"extra":"ignored"}
        ]"#;

        let decoded: Vec<Task> = decode_list(Some(payload));
        assert_eq!(decoded.len(), 2);
        assert_eq!(decoded[0].id, "a");
        assert_eq!(decoded[0].title, "Valid");
        assert_eq!(decoded[1].id, "d");
        assert!(decoded[1].completed);
    }
}
