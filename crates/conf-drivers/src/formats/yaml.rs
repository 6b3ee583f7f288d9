//! YAML driver

use super::{layer_from_tree, tree_from_configuration};
use crate::driver::Driver;
use crate::{Error, Result};
use conf_model::{Configuration, Layer, Value};

/// Driver for YAML resources: a mapping of category mappings.
#[derive(Debug, Default)]
pub struct YamlDriver;

impl YamlDriver {
    pub fn new() -> Self {
        Self
    }
}

impl Driver for YamlDriver {
    fn name(&self) -> &str {
        "YAML"
    }

    fn extensions(&self) -> &[&str] {
        &["yaml", "yml"]
    }

    fn parse(&self, layer_name: &str, text: &str) -> Result<Layer> {
        let doc: serde_yaml::Value =
            serde_yaml::from_str(text).map_err(|e| Error::parse("YAML", e.to_string()))?;
        layer_from_tree("YAML", layer_name, from_yaml(doc)?)
    }

    fn render(&self, conf: &Configuration) -> Result<String> {
        let tree = Value::Map(tree_from_configuration(conf));
        serde_yaml::to_string(&to_yaml(&tree)).map_err(|e| Error::render("YAML", e.to_string()))
    }
}

fn from_yaml(value: serde_yaml::Value) -> Result<Value> {
    Ok(match value {
        serde_yaml::Value::Null => Value::Null,
        serde_yaml::Value::Bool(b) => Value::Bool(b),
        serde_yaml::Value::Number(n) => match n.as_i64() {
            Some(i) => Value::Int(i),
            None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
        },
        serde_yaml::Value::String(s) => Value::Str(s),
        serde_yaml::Value::Sequence(items) => Value::Array(
            items
                .into_iter()
                .map(from_yaml)
                .collect::<Result<Vec<_>>>()?,
        ),
        serde_yaml::Value::Mapping(mapping) => {
            let mut map = indexmap::IndexMap::new();
            for (key, value) in mapping {
                let key = match from_yaml(key)? {
                    Value::Str(s) => s,
                    scalar @ (Value::Bool(_) | Value::Int(_) | Value::Float(_)) => scalar.to_string(),
                    other => {
                        return Err(Error::parse(
                            "YAML",
                            format!("unsupported mapping key of type {}", other.type_name()),
                        ));
                    }
                };
                map.insert(key, from_yaml(value)?);
            }
            Value::Map(map)
        }
        serde_yaml::Value::Tagged(tagged) => from_yaml(tagged.value)?,
    })
}

fn to_yaml(value: &Value) -> serde_yaml::Value {
    match value {
        Value::Null => serde_yaml::Value::Null,
        Value::Bool(b) => serde_yaml::Value::Bool(*b),
        Value::Int(i) => serde_yaml::Value::Number((*i).into()),
        Value::Float(f) => serde_yaml::Value::Number((*f).into()),
        Value::Str(s) => serde_yaml::Value::String(s.clone()),
        Value::Array(items) => serde_yaml::Value::Sequence(items.iter().map(to_yaml).collect()),
        Value::Map(map) => serde_yaml::Value::Mapping(
            map.iter()
                .map(|(k, v)| (serde_yaml::Value::String(k.clone()), to_yaml(v)))
                .collect(),
        ),
    }
}
