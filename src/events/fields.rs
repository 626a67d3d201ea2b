//! Ordered key/value bag for upstream fields without a typed home.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Ordered key/value structure used for tool inputs/outputs and event metadata.
///
/// Keys keep their insertion (wire) order, and values are arbitrary JSON, so
/// a bag read from the wire serializes back with the same fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fields(Map<String, Value>);

impl Fields {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a bag from an arbitrary JSON value.
    ///
    /// Objects become the bag itself, `null` becomes an empty bag, and any
    /// other value is kept under the `value` key.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(map) => Fields(map),
            Value::Null => Fields::new(),
            other => {
                let mut fields = Fields::new();
                fields.insert("value", other);
                fields
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// String value for `key`, if present and a string.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Insert a value, returning the previous one. Re-inserting an existing
    /// key keeps its original position.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.shift_remove(key)
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

impl From<Map<String, Value>> for Fields {
    fn from(map: Map<String, Value>) -> Self {
        Fields(map)
    }
}

impl FromIterator<(String, Value)> for Fields {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Fields(iter.into_iter().collect())
    }
}

impl IntoIterator for Fields {
    type Item = (String, Value);
    type IntoIter = serde_json::map::IntoIter;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_preserves_wire_order() {
        let fields = Fields::from_value(json!({"zeta": 1, "alpha": 2, "mid": 3}));
        let keys: Vec<_> = fields.keys().cloned().collect();
        assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
        assert_eq!(
            serde_json::to_string(&fields).unwrap(),
            r#"{"zeta":1,"alpha":2,"mid":3}"#
        );
    }

    #[test]
    fn test_from_non_object_value() {
        assert!(Fields::from_value(Value::Null).is_empty());

        let wrapped = Fields::from_value(json!("plain output"));
        assert_eq!(wrapped.get_str("value"), Some("plain output"));
    }

    #[test]
    fn test_nested_values_survive() {
        let raw = json!({"args": {"path": "/tmp", "flags": ["-l", "-a"]}, "count": 2});
        let fields = Fields::from_value(raw.clone());
        assert_eq!(fields.into_value(), raw);
    }

    #[test]
    fn test_remove_keeps_order_of_rest() {
        let mut fields = Fields::from_value(json!({"a": 1, "b": 2, "c": 3}));
        fields.remove("b");
        let keys: Vec<_> = fields.keys().cloned().collect();
        assert_eq!(keys, vec!["a", "c"]);
    }
}
