//! Concrete input environments.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use tracing::warn;

use ruletree_core::{ConfigError, Environment, Input, Path};

/// Raw inputs held in memory, keyed by path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MapEnv {
    values: BTreeMap<Path, Vec<Input>>,
}

impl MapEnv {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a raw input at `path`. Repeated inserts build a multi-value.
    pub fn insert(&mut self, path: impl Into<Path>, input: Input) {
        self.values.entry(path.into()).or_default().push(input);
    }

    pub fn with(mut self, path: impl Into<Path>, input: Input) -> Self {
        self.insert(path, input);
        self
    }

    pub fn text(self, path: impl Into<Path>, value: impl Into<String>) -> Self {
        self.with(path, Input::text(value))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[async_trait]
impl Environment for MapEnv {
    async fn lookup(&self, path: &Path) -> Vec<Input> {
        self.values.get(path).cloned().unwrap_or_default()
    }
}

/// Inputs read from a structured JSON or YAML document.
///
/// Objects descend by key, so `{"person": {"age": 17}}` supplies `"17"` at
/// `person.age`. Arrays supply one input per element at the same path, which
/// is what multi-valued fields consume. `null` supplies nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentEnv {
    inner: MapEnv,
}

impl DocumentEnv {
    pub fn from_value(document: &Value) -> Self {
        let mut inner = MapEnv::new();
        flatten(document, Path::root(), false, &mut inner);
        Self { inner }
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let document: Value = serde_json::from_str(json)?;
        Ok(Self::from_value(&document))
    }

    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let document: Value = serde_yaml::from_str(yaml)?;
        Ok(Self::from_value(&document))
    }

    pub fn from_json_file(path: impl AsRef<std::path::Path>) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    pub fn from_yaml_file(path: impl AsRef<std::path::Path>) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }

    /// Number of distinct paths that received input.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

fn flatten(value: &Value, path: Path, in_array: bool, out: &mut MapEnv) {
    match value {
        Value::Null => {}
        Value::Bool(b) => out.insert(path, Input::text(b.to_string())),
        Value::Number(n) => out.insert(path, Input::text(n.to_string())),
        Value::String(s) => out.insert(path, Input::text(s.as_str())),
        Value::Object(map) => {
            if in_array {
                warn!(path = %path, "Object inside an array; its entries are merged with its siblings");
            }
            for (key, child) in map {
                flatten(child, path.child(key.as_str()), in_array, out);
            }
        }
        Value::Array(items) => {
            if in_array {
                warn!(path = %path, "Nested array flattened into its parent");
            }
            for item in items {
                flatten(item, path.clone(), true, out);
            }
        }
    }
}

#[async_trait]
impl Environment for DocumentEnv {
    async fn lookup(&self, path: &Path) -> Vec<Input> {
        self.inner.lookup(path).await
    }
}
