//! Defines [`Metadata`], the dynamically typed front matter of a source file,
//! along with the conversion from decoded YAML into template values.

use log::warn;
use tera::{Map, Value};

/// A string-keyed mapping of dynamically typed values. Accessors return a
/// default (or `None`) on a type mismatch rather than failing.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Metadata(Map<String, Value>);

impl Metadata {
    pub fn new() -> Metadata {
        Metadata::default()
    }

    /// Converts a decoded YAML document into [`Metadata`]. Returns `None` if
    /// the top-level value isn't a mapping (a null document is an empty
    /// mapping).
    pub fn from_yaml(yaml: &serde_yaml::Value) -> Option<Metadata> {
        match yaml {
            serde_yaml::Value::Null => Some(Metadata::new()),
            serde_yaml::Value::Mapping(_) => match from_yaml(yaml) {
                Value::Object(m) => Some(Metadata(m)),
                _ => None,
            },
            _ => None,
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    pub fn get_bool(&self, key: &str, default: bool) -> bool {
        self.0.get(key).and_then(Value::as_bool).unwrap_or(default)
    }

    /// Reads a list of strings. Non-string list elements are skipped with a
    /// warning, a bare string is treated as a one-element list, and anything
    /// else yields an empty list.
    pub fn get_strings(&self, key: &str) -> Vec<String> {
        match self.0.get(key) {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::String(s)) => vec![s.clone()],
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(|item| match item {
                    Value::String(s) => Some(s.clone()),
                    other => {
                        warn!("Skipping non-string `{}` entry: {}", key, other);
                        None
                    }
                })
                .collect(),
            Some(other) => {
                warn!("Expected a list for `{}`, found: {}", key, other);
                Vec::new()
            }
        }
    }

    /// Merges `other` into `self`; keys in `other` win.
    pub fn extend(&mut self, other: Map<String, Value>) {
        for (k, v) in other {
            self.0.insert(k, v);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn to_value(&self) -> Value {
        Value::Object(self.0.clone())
    }
}

/// Converts a YAML value into a template value. Scalar mapping keys are
/// stringified; sequence or mapping keys are dropped.
pub fn from_yaml(yaml: &serde_yaml::Value) -> Value {
    use serde_yaml::Value as Yaml;
    match yaml {
        Yaml::Null => Value::Null,
        Yaml::Bool(b) => Value::Bool(*b),
        Yaml::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::from(i)
            } else if let Some(u) = n.as_u64() {
                Value::from(u)
            } else {
                n.as_f64().map(Value::from).unwrap_or(Value::Null)
            }
        }
        Yaml::String(s) => Value::String(s.clone()),
        Yaml::Sequence(items) => Value::Array(items.iter().map(from_yaml).collect()),
        Yaml::Mapping(mapping) => {
            let mut m = Map::new();
            for (k, v) in mapping.iter() {
                let key = match k {
                    Yaml::String(s) => s.clone(),
                    Yaml::Number(n) => n.to_string(),
                    Yaml::Bool(b) => b.to_string(),
                    Yaml::Null => String::from("null"),
                    _ => {
                        warn!("Dropping front matter entry with a non-scalar key");
                        continue;
                    }
                };
                m.insert(key, from_yaml(v));
            }
            Value::Object(m)
        }
    }
}
