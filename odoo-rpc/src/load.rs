//! # Bulk Load Batching
//!
//! The `load` server call takes one key header plus positional value rows,
//! so heterogeneous input records must first be grouped into batches that
//! share a key set. The grouping here is pure; the client drives one `load`
//! round trip per group and accumulates the results.

use indexmap::IndexMap;
use serde_json::{Map, Value};

/// One homogeneous batch: a key header plus positional value rows.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadGroup {
    pub keys: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

/// Accumulated result of a batched load.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadResult {
    pub ids: Vec<Value>,
    pub messages: Vec<Value>,
}

/// Result of a single-record load.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadOneResult {
    pub id: Option<Value>,
    pub messages: Vec<Value>,
}

/// Groups records by their key sequence.
///
/// The fingerprint is the record's key list in iteration order. It is
/// order-sensitive on purpose: every row in a group must align positionally
/// with that group's key header, so the same keys in a different order form
/// a different group. First-seen group order and within-group row order are
/// both preserved.
pub fn group_records(records: Vec<Map<String, Value>>) -> Vec<LoadGroup> {
    let mut groups: IndexMap<Vec<String>, Vec<Vec<Value>>> = IndexMap::new();

    for record in records {
        let mut keys = Vec::with_capacity(record.len());
        let mut row = Vec::with_capacity(record.len());
        for (key, value) in record {
            keys.push(key);
            row.push(value);
        }
        groups.entry(keys).or_default().push(row);
    }

    groups
        .into_iter()
        .map(|(keys, rows)| LoadGroup { keys, rows })
        .collect()
}
