//! Row identity and named-field access
//!
//! The table engine treats rows as opaque. It only reaches into a row through
//! column accessors and through this trait, which supplies the stable key used
//! for selection and a by-name lookup for key-based accessors.

use crate::data::value::CellValue;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use std::fmt;
use std::sync::Arc;

/// Stable per-row identity used by row selection
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RowKey(pub String);

impl RowKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RowKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RowKey {
    fn from(s: &str) -> Self {
        RowKey(s.to_string())
    }
}

impl From<String> for RowKey {
    fn from(s: String) -> Self {
        RowKey(s)
    }
}

/// What the engine needs to know about a row
pub trait Record {
    /// Identity used for selection; must be unique within one row set
    fn row_key(&self) -> RowKey;

    /// Look up a field by name. None means the row has no such field.
    fn field(&self, name: &str) -> Option<CellValue>;
}

impl<R: Record + ?Sized> Record for Arc<R> {
    fn row_key(&self) -> RowKey {
        (**self).row_key()
    }

    fn field(&self, name: &str) -> Option<CellValue> {
        (**self).field(name)
    }
}

/// A loosely typed record backed by a JSON object, as delivered by the REST
/// list endpoints or read from a CSV export
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRecord {
    key: RowKey,
    fields: Map<String, JsonValue>,
}

impl JsonRecord {
    pub fn new(key: impl Into<RowKey>, fields: Map<String, JsonValue>) -> Self {
        Self {
            key: key.into(),
            fields,
        }
    }

    /// Build a record, taking its key from the first of `key_fields` present.
    /// Falls back to the row ordinal so every record stays addressable.
    pub fn from_object(fields: Map<String, JsonValue>, key_fields: &[&str], ordinal: usize) -> Self {
        let key = key_fields
            .iter()
            .find_map(|name| fields.get(*name).and_then(json_key_text))
            .unwrap_or_else(|| format!("#{}", ordinal));
        Self {
            key: RowKey(key),
            fields,
        }
    }

    pub fn fields(&self) -> &Map<String, JsonValue> {
        &self.fields
    }

    /// Field names in source order
    pub fn field_names(&self) -> Vec<String> {
        self.fields.keys().cloned().collect()
    }
}

impl Record for JsonRecord {
    fn row_key(&self) -> RowKey {
        self.key.clone()
    }

    fn field(&self, name: &str) -> Option<CellValue> {
        lookup_path(&self.fields, name).map(CellValue::from_json)
    }
}

/// Resolve `a.b.c` style paths into nested objects (e.g. `guest.name`)
fn lookup_path<'a>(fields: &'a Map<String, JsonValue>, path: &str) -> Option<&'a JsonValue> {
    if let Some(value) = fields.get(path) {
        return Some(value);
    }

    let mut parts = path.split('.');
    let mut current = fields.get(parts.next()?)?;
    for part in parts {
        current = current.as_object()?.get(part)?;
    }
    Some(current)
}

fn json_key_text(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::String(s) if !s.is_empty() => Some(s.clone()),
        JsonValue::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
