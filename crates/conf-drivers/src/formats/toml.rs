//! TOML driver

use super::{layer_from_tree, tree_from_configuration};
use crate::driver::Driver;
use crate::{Error, Result};
use conf_model::{Configuration, Layer, Value};

/// Driver for TOML resources: one table per category.
#[derive(Debug, Default)]
pub struct TomlDriver;

impl TomlDriver {
    pub fn new() -> Self {
        Self
    }
}

impl Driver for TomlDriver {
    fn name(&self) -> &str {
        "TOML"
    }

    fn extensions(&self) -> &[&str] {
        &["toml"]
    }

    fn parse(&self, layer_name: &str, text: &str) -> Result<Layer> {
        let table: toml::Table = text
            .parse()
            .map_err(|e: toml::de::Error| Error::parse("TOML", e.to_string()))?;
        layer_from_tree("TOML", layer_name, from_toml(toml::Value::Table(table)))
    }

    fn render(&self, conf: &Configuration) -> Result<String> {
        let mut table = toml::Table::new();
        for (category, params) in tree_from_configuration(conf) {
            if let Some(value) = to_toml(&params) {
                table.insert(category, value);
            }
        }
        toml::to_string(&table).map_err(|e| Error::render("TOML", e.to_string()))
    }
}

fn from_toml(value: toml::Value) -> Value {
    match value {
        toml::Value::String(s) => Value::Str(s),
        toml::Value::Integer(i) => Value::Int(i),
        toml::Value::Float(f) => Value::Float(f),
        toml::Value::Boolean(b) => Value::Bool(b),
        toml::Value::Datetime(dt) => Value::Str(dt.to_string()),
        toml::Value::Array(items) => Value::Array(items.into_iter().map(from_toml).collect()),
        toml::Value::Table(table) => {
            Value::Map(table.into_iter().map(|(k, v)| (k, from_toml(v))).collect())
        }
    }
}

/// TOML has no null; null values are left out.
fn to_toml(value: &Value) -> Option<toml::Value> {
    Some(match value {
        Value::Null => return None,
        Value::Bool(b) => toml::Value::Boolean(*b),
        Value::Int(i) => toml::Value::Integer(*i),
        Value::Float(f) => toml::Value::Float(*f),
        Value::Str(s) => toml::Value::String(s.clone()),
        Value::Array(items) => toml::Value::Array(items.iter().filter_map(to_toml).collect()),
        Value::Map(map) => toml::Value::Table(
            map.iter()
                .filter_map(|(k, v)| to_toml(v).map(|v| (k.clone(), v)))
                .collect(),
        ),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use conf_model::{Category, ParamType, Parameter};
    use pretty_assertions::assert_eq;

    #[test]
    fn categories_are_tables() {
        let layer = TomlDriver
            .parse(
                "app.toml",
                "[server]\nport = 8080\n\"port::type\" = \"int\"\nhost = \"@net.host\"\n\n[net]\nhost = \"localhost\"\n",
            )
            .unwrap();

        let names: Vec<_> = layer
            .entries()
            .iter()
            .map(|e| format!("{}.{}", e.category, e.name))
            .collect();
        assert_eq!(names, vec!["server.port", "server.host", "net.host"]);
        assert_eq!(layer.entries()[0].ptype, Some(ParamType::Int));
    }

    #[test]
    fn datetimes_are_text() {
        let layer = TomlDriver
            .parse("d.toml", "[meta]\ncreated = 1979-05-27T07:32:00Z\n")
            .unwrap();
        assert_eq!(layer.entries()[0].raw, Value::from("1979-05-27T07:32:00Z"));
    }

    #[test]
    fn render_skips_null() {
        let conf = Configuration::new().with(
            Category::literal("C")
                .with(Parameter::literal("gone", Value::Null))
                .with(Parameter::literal("kept", Value::Int(1))),
        );
        insta::assert_snapshot!(TomlDriver.render(&conf).unwrap(), @r"
        [C]
        kept = 1
        ");
    }
}
