//! Ordered request parameters.
//!
//! Concrete endpoints pass optional arguments straight through: a `None`
//! becomes a null entry, and null entries never reach the wire, neither in
//! the query string nor in a JSON body.

use serde_json::{Map, Value};

/// An ordered mapping of parameter name to JSON scalar or null.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Params {
    entries: Vec<(String, Value)>,
}

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace `key`. Replacing keeps the original position.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == key) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Entries that will be sent, in insertion order.
    pub fn present(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries
            .iter()
            .filter(|(_, value)| !value.is_null())
            .map(|(key, value)| (key.as_str(), value))
    }

    /// Query-string pairs. Strings are sent verbatim, other scalars as JSON text.
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        self.present()
            .map(|(key, value)| {
                let text = match value {
                    Value::String(text) => text.clone(),
                    other => other.to_string(),
                };
                (key.to_string(), text)
            })
            .collect()
    }

    /// JSON object holding the non-null entries.
    pub fn to_json_object(&self) -> Map<String, Value> {
        self.present()
            .map(|(key, value)| (key.to_string(), value.clone()))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.present().next().is_none()
    }
}
