//! Data records supplied to the binding resolver.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A mapping of semantic field names to raw values.
///
/// Values are looked up by name or by dotted path into nested objects
/// (`promotion.discount`). `null`, blank strings and empty arrays read as
/// absent, so every lookup is an explicit `Option`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DataRecord {
    values: Map<String, Value>,
}

impl DataRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap a JSON object. Returns `None` for any other JSON value.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(values) => Some(Self { values }),
            _ => None,
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Assemble a record from the product, promotion and company sources.
    ///
    /// Each source is nested under its own key (`product.*`, `promotion.*`,
    /// `company.*`). Product keys are also exposed at the root since most
    /// templates bind to them directly.
    pub fn from_sources(product: Value, promotion: Value, company: Value) -> Self {
        let mut record = Self::new();
        if let Value::Object(fields) = &product {
            for (key, value) in fields {
                record.values.insert(key.clone(), value.clone());
            }
        }
        for (key, source) in [
            ("product", product),
            ("promotion", promotion),
            ("company", company),
        ] {
            if source.is_object() {
                record.values.insert(key.to_string(), source);
            }
        }
        record
    }

    /// Builder-style insert, see [`DataRecord::insert`]
    pub fn with(mut self, path: &str, value: impl Into<Value>) -> Self {
        self.insert(path, value);
        self
    }

    /// Set a value by dotted path, creating intermediate objects as needed.
    ///
    /// An intermediate non-object value on the path is replaced.
    pub fn insert(&mut self, path: &str, value: impl Into<Value>) {
        let mut segments = path.split('.').peekable();
        let mut current = &mut self.values;
        while let Some(segment) = segments.next() {
            if segments.peek().is_none() {
                current.insert(segment.to_string(), value.into());
                return;
            }
            let entry = current
                .entry(segment.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if !entry.is_object() {
                *entry = Value::Object(Map::new());
            }
            let Value::Object(next) = entry else {
                return;
            };
            current = next;
        }
    }

    /// Look up a raw value by name or dotted path.
    ///
    /// A flat key that literally contains dots wins over a nested path.
    pub fn get(&self, path: &str) -> Option<&Value> {
        if let Some(value) = self.values.get(path) {
            return present(value);
        }
        let mut segments = path.split('.');
        let first = segments.next()?;
        let mut current = self.values.get(first)?;
        for segment in segments {
            current = current.as_object()?.get(segment)?;
        }
        present(current)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.get(path).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.values
    }
}

impl From<Map<String, Value>> for DataRecord {
    fn from(values: Map<String, Value>) -> Self {
        Self { values }
    }
}

/// Whether a raw value counts as absent
pub fn is_absent(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

fn present(value: &Value) -> Option<&Value> {
    if is_absent(value) { None } else { Some(value) }
}
