//! Small shared helpers: UID generation and attribute maps.

use crc32fast::Hasher;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::{SystemTime, UNIX_EPOCH};

/// Derive a short seed from an arbitrary string using CRC32
pub fn seed_from(input: &str) -> String {
    let mut hasher = Hasher::new();
    hasher.update(input.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Sequential UID generator for components
///
/// Names look like `{seed}-{count}`. Two editors replaying the same history
/// must use distinct seeds, so the seed is usually derived from a client or
/// session id.
#[derive(Debug, Clone)]
pub struct IdGenerator {
    seed: String,
    count: u64,
}

impl IdGenerator {
    /// Generator seeded from the CRC32 of `source`
    pub fn new(source: &str) -> Self {
        Self::from_seed(seed_from(source))
    }

    pub fn from_seed(seed: String) -> Self {
        Self { seed, count: 0 }
    }

    /// Generator seeded from the current time
    pub fn from_clock() -> Self {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or_default();
        Self::new(&nanos.to_string())
    }

    /// Generate the next UID
    pub fn next_id(&mut self) -> String {
        self.count += 1;
        format!("{}-{}", self.seed, self.count)
    }

    pub fn seed(&self) -> &str {
        &self.seed
    }
}

/// Variant attributes carried by operations and component models
///
/// Backed by a `BTreeMap` so serialized output and equality checks are
/// independent of insertion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Attrs(BTreeMap<String, Value>);

impl Attrs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// String attribute; `null` and non-string values read as absent
    pub fn str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    /// String attribute with a fallback
    pub fn str_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.str(key).unwrap_or(default)
    }

    /// Overlay `overrides` on top of `defaults`; keys present in both take
    /// the override value
    pub fn extend(defaults: &Attrs, overrides: &Attrs) -> Attrs {
        let mut merged = defaults.clone();
        for (key, value) in overrides.iter() {
            merged.0.insert(key.clone(), value.clone());
        }
        merged
    }

    /// The subset of `self` restricted to the keys of `other`, with `null`
    /// for keys `self` does not have
    pub fn project(&self, other: &Attrs) -> Attrs {
        let mut projected = Attrs::new();
        for key in other.keys() {
            let value = self.0.get(key).cloned().unwrap_or(Value::Null);
            projected.0.insert(key.clone(), value);
        }
        projected
    }

    /// Convert into a JSON object value
    pub fn into_value(self) -> Value {
        Value::Object(self.0.into_iter().collect())
    }

    /// Build from a JSON object, ignoring non-object values
    pub fn from_value(value: &Value) -> Attrs {
        match value {
            Value::Object(map) => Attrs(map.iter().map(|(k, v)| (k.clone(), v.clone())).collect()),
            _ => Attrs::new(),
        }
    }
}

impl FromIterator<(String, Value)> for Attrs {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        Attrs(iter.into_iter().collect())
    }
}

/// Convert an optional string into a JSON value (`null` when absent)
pub(crate) fn opt_str(value: &Option<String>) -> Value {
    match value {
        Some(s) => Value::String(s.clone()),
        None => Value::Null,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_seed_is_stable() {
        assert_eq!(seed_from("client-1"), seed_from("client-1"));
        assert_ne!(seed_from("client-1"), seed_from("client-2"));
    }

    #[test]
    fn test_sequential_ids() {
        let mut ids = IdGenerator::new("session");

        let id1 = ids.next_id();
        let id2 = ids.next_id();

        assert!(id1.ends_with("-1"));
        assert!(id2.ends_with("-2"));
        assert!(id1.starts_with(ids.seed()));
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_extend_overrides_defaults() {
        let defaults = Attrs::new()
            .with("width", "100%")
            .with("height", "360px");
        let passed = Attrs::new().with("height", "200px").with("src", "x");

        let merged = Attrs::extend(&defaults, &passed);

        assert_eq!(merged.str("width"), Some("100%"));
        assert_eq!(merged.str("height"), Some("200px"));
        assert_eq!(merged.str("src"), Some("x"));
    }

    #[test]
    fn test_project_fills_missing_with_null() {
        let current = Attrs::new().with("caption", "old");
        let keys = Attrs::new().with("caption", "new").with("src", "s");

        let projected = current.project(&keys);

        assert_eq!(projected.get("caption"), Some(&json!("old")));
        assert_eq!(projected.get("src"), Some(&Value::Null));
    }
}
