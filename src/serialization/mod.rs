//! JSON collection codec with an explicit date boundary.
//!
//! This module is the canonical serialization format for everything the
//! datastore persists. Each collection is stored as a single JSON array
//! of camelCase records, with date-valued fields encoded as RFC 3339
//! strings through chrono's serde implementation:
//!
//! ```text
//! customers_u1 -> [{"id":"…","name":"…","createdAt":"2026-08-30T12:00:00Z",…},…]
//! ```
//!
//! The layout is deliberately identical to the legacy browser store, so
//! an existing blob decodes without migration. Dates round-trip
//! structurally: encoding always produces RFC 3339 and decoding always
//! parses it back into `DateTime<Utc>`, so there is no "re-hydrate the
//! strings by hand on every read" step for callers to forget.
//!
//! # Example
//!
//! ```rust
//! use crm_kit::serialization::{encode_collection, decode_collection};
//! use serde::{Serialize, Deserialize};
//!
//! #[derive(Serialize, Deserialize, PartialEq, Debug)]
//! struct Row { id: u64, name: String }
//!
//! # fn main() -> crm_kit::Result<()> {
//! let rows = vec![Row { id: 1, name: "Alice".to_string() }];
//!
//! let blob = encode_collection(&rows)?;
//! let decoded: Vec<Row> = decode_collection(&blob)?;
//! assert_eq!(rows, decoded);
//! # Ok(())
//! # }
//! ```

use crate::error::{Error, Result};
use serde::{de::DeserializeOwned, Serialize};

/// Encode a collection as a JSON array string.
///
/// An empty slice encodes as `"[]"`, which decodes back to an empty
/// collection rather than an absent one.
///
/// # Errors
///
/// Returns `Error::SerializationError` if any record fails to serialize.
pub fn encode_collection<T: Serialize>(items: &[T]) -> Result<String> {
    serde_json::to_string(items).map_err(|e| {
        log::error!("Collection serialization failed: {}", e);
        Error::SerializationError(e.to_string())
    })
}

/// Decode a JSON array string back into a collection.
///
/// # Errors
///
/// Returns `Error::DeserializationError` for anything that is not a
/// well-formed JSON array of records. Callers holding user data should
/// treat that as an empty collection (fail open) rather than surfacing
/// the parse failure; the repository layer does exactly that.
pub fn decode_collection<T: DeserializeOwned>(blob: &str) -> Result<Vec<T>> {
    serde_json::from_str(blob).map_err(|e| {
        log::warn!("Collection deserialization failed: {}", e);
        Error::DeserializationError(e.to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};
    use serde::Deserialize;

    #[derive(Serialize, Deserialize, PartialEq, Debug, Clone)]
    #[serde(rename_all = "camelCase")]
    struct TestRow {
        id: u64,
        name: String,
        happened_at: DateTime<Utc>,
    }

    fn row(id: u64) -> TestRow {
        TestRow {
            id,
            name: format!("row {}", id),
            happened_at: Utc.with_ymd_and_hms(2026, 3, 14, 9, 26, 53).unwrap(),
        }
    }

    #[test]
    fn test_roundtrip() {
        let rows = vec![row(1), row(2)];

        let blob = encode_collection(&rows).unwrap();
        let decoded: Vec<TestRow> = decode_collection(&blob).unwrap();

        assert_eq!(rows, decoded);
    }

    #[test]
    fn test_empty_collection_roundtrip() {
        let rows: Vec<TestRow> = vec![];

        let blob = encode_collection(&rows).unwrap();
        assert_eq!(blob, "[]");

        let decoded: Vec<TestRow> = decode_collection(&blob).unwrap();
        assert!(decoded.is_empty());
    }

    #[test]
    fn test_dates_encode_as_rfc3339_strings() {
        let blob = encode_collection(&[row(1)]).unwrap();

        // The persisted form is a plain ISO-8601 string, as the legacy
        // layout requires.
        assert!(blob.contains("\"happenedAt\":\"2026-03-14T09:26:53Z\""));
    }

    #[test]
    fn test_dates_compare_equal_after_roundtrip() {
        let original = row(7);
        let blob = encode_collection(&[original.clone()]).unwrap();
        let decoded: Vec<TestRow> = decode_collection(&blob).unwrap();

        assert_eq!(decoded[0].happened_at, original.happened_at);
    }

    #[test]
    fn test_malformed_blob_rejected() {
        let result: Result<Vec<TestRow>> = decode_collection("{not an array");
        assert!(matches!(
            result.unwrap_err(),
            Error::DeserializationError(_)
        ));
    }

    #[test]
    fn test_wrong_shape_rejected() {
        // Well-formed JSON, wrong shape
        let result: Result<Vec<TestRow>> = decode_collection("{\"id\": 1}");
        assert!(matches!(
            result.unwrap_err(),
            Error::DeserializationError(_)
        ));
    }

    #[test]
    fn test_legacy_blob_decodes() {
        // A blob written by the previous implementation, verbatim
        let blob = r#"[{"id":"1700000000000","name":"legacy","happenedAt":"2024-11-14T22:13:20.000Z"}]"#;

        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct LegacyRow {
            id: String,
            name: String,
            happened_at: DateTime<Utc>,
        }

        let decoded: Vec<LegacyRow> = decode_collection(blob).unwrap();
        assert_eq!(decoded[0].id, "1700000000000");
        assert_eq!(decoded[0].name, "legacy");
        assert_eq!(
            decoded[0].happened_at,
            Utc.with_ymd_and_hms(2024, 11, 14, 22, 13, 20).unwrap()
        );
    }
}
