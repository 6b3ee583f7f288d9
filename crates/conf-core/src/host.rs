//! Host values reachable through `#path` and dotted names

use conf_model::Value;
use indexmap::IndexMap;

/// Named values exposed to `#path` tokens and expression names.
///
/// Values are registered under dotted paths. A lookup uses the longest
/// registered prefix of the requested path and indexes the remaining
/// segments into maps and arrays.
#[derive(Debug, Clone, Default)]
pub struct HostRegistry {
    roots: IndexMap<String, Value>,
}

impl HostRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `value` under the dotted `path`, replacing any previous value.
    pub fn register(&mut self, path: impl Into<String>, value: impl Into<Value>) {
        self.roots.insert(path.into(), value.into());
    }

    /// Builder-style [`register`](Self::register).
    pub fn with(mut self, path: impl Into<String>, value: impl Into<Value>) -> Self {
        self.register(path, value);
        self
    }

    pub fn contains(&self, path: &str) -> bool {
        self.roots.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.roots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Look up a path given as segments.
    pub fn lookup(&self, path: &[String]) -> Option<Value> {
        (1..=path.len()).rev().find_map(|split| {
            let root = self.roots.get(&path[..split].join("."))?;
            descend(root, &path[split..])
        })
    }
}

/// Index `segments` into nested maps and arrays.
pub(crate) fn descend(value: &Value, segments: &[String]) -> Option<Value> {
    let mut current = value;
    for segment in segments {
        current = match current {
            Value::Map(map) => map.get(segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current.clone())
}
