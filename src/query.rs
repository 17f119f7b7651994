//! Query-string building.
//!
//! The Pingup API takes every parameter in the query string, writes included.
//! Parameters keep their insertion order so the same input always encodes to
//! the same bytes. Nested JSON values are flattened with bracket notation
//! (`timeSlot[startTime]=...`, `ids[0]=...`).

use serde_json::Value;
use url::form_urlencoded::byte_serialize;

/// An ordered list of `(key, value)` pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    pairs: Vec<(String, String)>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a parameter, even when `value` is empty.
    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.pairs.push((key.into(), value.into()));
        self
    }

    /// Append a parameter only when it is set.
    pub fn push_opt<T: ToString>(&mut self, key: &str, value: Option<T>) -> &mut Self {
        if let Some(v) = value {
            self.pairs.push((key.to_string(), v.to_string()));
        }
        self
    }

    /// Append a JSON value, flattening objects and arrays into bracketed keys.
    ///
    /// `null` is skipped and booleans become `1`/`0`.
    pub fn push_value(&mut self, key: &str, value: &Value) -> &mut Self {
        match value {
            Value::Null => {}
            Value::Bool(b) => {
                self.push(key, if *b { "1" } else { "0" });
            }
            Value::Number(n) => {
                self.push(key, n.to_string());
            }
            Value::String(s) => {
                self.push(key, s.as_str());
            }
            Value::Array(items) => {
                for (i, item) in items.iter().enumerate() {
                    self.push_value(&format!("{key}[{i}]"), item);
                }
            }
            Value::Object(map) => {
                for (k, item) in map {
                    self.push_value(&format!("{key}[{k}]"), item);
                }
            }
        }
        self
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Form-urlencode the pairs, joined by `&`.
    pub fn encode(&self) -> String {
        self.pairs
            .iter()
            .map(|(k, v)| format!("{}={}", encode_component(k), encode_component(v)))
            .collect::<Vec<_>>()
            .join("&")
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Query {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            pairs: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

fn encode_component(s: &str) -> String {
    byte_serialize(s.as_bytes()).collect()
}

/// Percent-encode one path segment. Spaces become `%20`, `/` is escaped.
pub fn encode_segment(s: &str) -> String {
    // byte_serialize escapes a literal '+' as %2B, so every '+' left is a space.
    encode_component(s).replace('+', "%20")
}
