//! # Records and the Model Registry
//!
//! Rows returned by `read` are wrapped into [`Record`] instances: read-only
//! views over the row's data with "dot notation" lookups. Which constructor
//! wraps which remote model is decided by the [`ModelRegistry`], a plain
//! lookup table with a default fallback — no by-name reflection.

use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Constructor used to wrap one returned row.
pub type RecordCtor = fn(Map<String, Value>) -> Record;

/// A read-only wrapper around one row of model data.
///
/// Exclusively owns a copy of the row. Serializes back to the same mapping
/// it was constructed from.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Record {
    data: Map<String, Value>,
}

impl Record {
    pub fn new(data: Map<String, Value>) -> Self {
        Self { data }
    }

    /// Looks up a field by dotted path; numeric segments index into arrays
    /// (`"parent_ids.2"`).
    pub fn get(&self, path: &str) -> Option<&Value> {
        let mut segments = path.split('.');
        let mut current = self.data.get(segments.next()?)?;

        for segment in segments {
            current = match current {
                Value::Object(map) => map.get(segment)?,
                Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }

        Some(current)
    }

    /// Like [`Record::get`], falling back to `default` for missing paths.
    pub fn get_or<'a>(&'a self, path: &str, default: &'a Value) -> &'a Value {
        self.get(path).unwrap_or(default)
    }

    pub fn data(&self) -> &Map<String, Value> {
        &self.data
    }

    pub fn into_data(self) -> Map<String, Value> {
        self.data
    }
}

/// Maps remote model names to the wrapper constructor `read` applies.
///
/// Mutable at any time; reads use the mapping in effect at call time.
/// Unmapped models fall back to [`Record::new`].
#[derive(Debug, Clone, Default)]
pub struct ModelRegistry {
    map: HashMap<String, RecordCtor>,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, model: impl Into<String>, ctor: RecordCtor) {
        self.map.insert(model.into(), ctor);
    }

    pub fn extend(&mut self, mappings: impl IntoIterator<Item = (String, RecordCtor)>) {
        self.map.extend(mappings);
    }

    pub fn remove(&mut self, model: &str) {
        self.map.remove(model);
    }

    /// The constructor registered for `model`, or the default.
    pub fn resolve(&self, model: &str) -> RecordCtor {
        self.map.get(model).copied().unwrap_or(Record::new)
    }
}
