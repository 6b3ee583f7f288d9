//! Built-in format drivers

mod ini;
mod json;
mod toml;
mod xml;
mod yaml;

pub use self::ini::IniDriver;
pub use self::json::JsonDriver;
pub use self::toml::TomlDriver;
pub use self::xml::XmlDriver;
pub use self::yaml::YamlDriver;

use crate::{Error, Result};
use conf_model::{Configuration, Layer, TYPE_SUFFIX, Value};
use indexmap::IndexMap;

/// Build a layer from a mapping of category mappings.
///
/// Used by the structured formats once their document is converted to a
/// [`Value`] tree.
pub(crate) fn layer_from_tree(format: &str, layer_name: &str, tree: Value) -> Result<Layer> {
    let mut layer = Layer::new(layer_name);
    let categories = match tree {
        Value::Null => return Ok(layer),
        Value::Map(categories) => categories,
        other => {
            return Err(Error::parse(
                format,
                format!(
                    "expected a mapping of categories, found {}",
                    other.type_name()
                ),
            ));
        }
    };

    for (category, params) in categories {
        match params {
            Value::Map(params) => layer.push_category(&category, params.into_iter().collect())?,
            Value::Null => layer.add_category(&category),
            other => {
                return Err(Error::parse(
                    format,
                    format!(
                        "category {} must be a mapping, found {}",
                        category,
                        other.type_name()
                    ),
                ));
            }
        }
    }
    Ok(layer)
}

/// Raw values and declared types of every category, as a value tree.
pub(crate) fn tree_from_configuration(conf: &Configuration) -> IndexMap<String, Value> {
    conf.categories()
        .map(|category| {
            let mut params = IndexMap::new();
            for param in category.params() {
                let name = param.name().as_str();
                params.insert(name.to_string(), param.raw().clone());
                if let Some(ptype) = param.ptype() {
                    params.insert(format!("{}{}", name, TYPE_SUFFIX), Value::Str(ptype.to_string()));
                }
            }
            (category.name().as_str().to_string(), Value::Map(params))
        })
        .collect()
}

/// Text form of a raw value for formats that only store strings.
///
/// Typed values are written as whole-value expressions so they read back
/// with the same type.
pub(crate) fn raw_text(value: &Value) -> String {
    match value {
        Value::Str(text) => text.clone(),
        other => format!("={}", other.to_expr_literal()),
    }
}

/// Category names with their `(key, text)` rows, types included.
pub(crate) fn text_rows(conf: &Configuration) -> Vec<(String, Vec<(String, String)>)> {
    tree_from_configuration(conf)
        .into_iter()
        .map(|(category, params)| {
            let rows = match params {
                Value::Map(params) => params
                    .iter()
                    .map(|(key, value)| (key.clone(), raw_text(value)))
                    .collect(),
                _ => Vec::new(),
            };
            (category, rows)
        })
        .collect()
}
