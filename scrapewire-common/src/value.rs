//! Loosely-typed values decoded from a monitored source.
//!
//! Status pages, process queries and script output all arrive as a tree of
//! string keys to heterogeneous values. [`RawValue`] models that tree as a small
//! tagged variant with accessors that return `None` on a type mismatch, so the
//! field mapper can substitute defaults instead of failing.

use std::collections::BTreeMap;

/// A node in a decoded snapshot.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum RawValue {
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    List(Vec<RawValue>),
    Object(BTreeMap<String, RawValue>),
}

/// The unparsed structured response from one fetch.
pub type RawSnapshot = RawValue;

impl RawValue {
    /// Build an object from key/value pairs.
    pub fn object<I, K>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, RawValue)>,
        K: Into<String>,
    {
        RawValue::Object(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Decode a JSON document.
    pub fn from_json_slice(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice::<serde_json::Value>(bytes).map(Self::from)
    }

    /// Decode a YAML document (JSON is accepted too).
    pub fn from_yaml_slice(bytes: &[u8]) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_slice::<serde_yaml::Value>(bytes).map(Self::from)
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            RawValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            RawValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[RawValue]> {
        match self {
            RawValue::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&BTreeMap<String, RawValue>> {
        match self {
            RawValue::Object(map) => Some(map),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, RawValue::Null)
    }

    /// Number of children of a list or object.
    pub fn len(&self) -> Option<usize> {
        match self {
            RawValue::List(items) => Some(items.len()),
            RawValue::Object(map) => Some(map.len()),
            _ => None,
        }
    }

    /// Short name of the variant, for diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            RawValue::Null => "null",
            RawValue::Bool(_) => "bool",
            RawValue::Number(_) => "number",
            RawValue::String(_) => "string",
            RawValue::List(_) => "list",
            RawValue::Object(_) => "object",
        }
    }

    /// Get a direct child of an object by exact key.
    pub fn get(&self, key: &str) -> Option<&RawValue> {
        self.as_object().and_then(|map| map.get(key))
    }

    /// Resolve a dot-separated path.
    ///
    /// Each segment is applied to the current node:
    /// - on an object, an exact key match wins; otherwise a segment containing
    ///   glob metacharacters (`*`, `?`, `[`) selects the first key, in sorted
    ///   order, that matches the pattern;
    /// - on a list, the segment must be a decimal index.
    ///
    /// An empty path resolves to `self`.
    pub fn lookup(&self, path: &str) -> Option<&RawValue> {
        if path.is_empty() {
            return Some(self);
        }

        path.split('.')
            .try_fold(self, |node, segment| node.child(segment))
    }

    /// Resolve a path to a number, substituting zero when the path is absent
    /// or the value is not numeric.
    pub fn number_or_zero(&self, path: &str) -> f64 {
        self.lookup(path).and_then(RawValue::as_f64).unwrap_or(0.0)
    }

    fn child(&self, segment: &str) -> Option<&RawValue> {
        match self {
            RawValue::Object(map) => {
                if let Some(value) = map.get(segment) {
                    return Some(value);
                }
                if !is_glob(segment) {
                    return None;
                }
                let pattern = glob::Pattern::new(segment).ok()?;
                map.iter()
                    .find(|(key, _)| pattern.matches(key))
                    .map(|(_, value)| value)
            }
            RawValue::List(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        }
    }
}

fn is_glob(segment: &str) -> bool {
    segment.contains(['*', '?', '['])
}

impl From<serde_json::Value> for RawValue {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value;

        match value {
            Value::Null => RawValue::Null,
            Value::Bool(b) => RawValue::Bool(b),
            Value::Number(n) => n.as_f64().map(RawValue::Number).unwrap_or(RawValue::Null),
            Value::String(s) => RawValue::String(s),
            Value::Array(items) => RawValue::List(items.into_iter().map(Self::from).collect()),
            Value::Object(map) => {
                RawValue::Object(map.into_iter().map(|(k, v)| (k, Self::from(v))).collect())
            }
        }
    }
}

impl From<serde_yaml::Value> for RawValue {
    fn from(value: serde_yaml::Value) -> Self {
        use serde_yaml::Value;

        match value {
            Value::Null => RawValue::Null,
            Value::Bool(b) => RawValue::Bool(b),
            Value::Number(n) => n.as_f64().map(RawValue::Number).unwrap_or(RawValue::Null),
            Value::String(s) => RawValue::String(s),
            Value::Sequence(items) => {
                RawValue::List(items.into_iter().map(Self::from).collect())
            }
            Value::Mapping(map) => RawValue::Object(
                map.into_iter()
                    .filter_map(|(k, v)| yaml_key(k).map(|k| (k, Self::from(v))))
                    .collect(),
            ),
            Value::Tagged(tagged) => Self::from(tagged.value),
        }
    }
}

/// Mapping keys must be scalars to be addressable by a path.
fn yaml_key(key: serde_yaml::Value) -> Option<String> {
    use serde_yaml::Value;

    match key {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

impl From<f64> for RawValue {
    fn from(v: f64) -> Self {
        RawValue::Number(v)
    }
}

impl From<u64> for RawValue {
    fn from(v: u64) -> Self {
        RawValue::Number(v as f64)
    }
}

impl From<i64> for RawValue {
    fn from(v: i64) -> Self {
        RawValue::Number(v as f64)
    }
}

impl From<bool> for RawValue {
    fn from(v: bool) -> Self {
        RawValue::Bool(v)
    }
}

impl From<String> for RawValue {
    fn from(v: String) -> Self {
        RawValue::String(v)
    }
}

impl From<&str> for RawValue {
    fn from(v: &str) -> Self {
        RawValue::String(v.to_string())
    }
}

impl From<Vec<RawValue>> for RawValue {
    fn from(v: Vec<RawValue>) -> Self {
        RawValue::List(v)
    }
}
