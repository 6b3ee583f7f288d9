//! JSON driver

use super::{layer_from_tree, tree_from_configuration};
use crate::driver::Driver;
use crate::{Error, Result};
use conf_model::{Configuration, Layer, Value};

/// Driver for JSON resources: an object of category objects.
#[derive(Debug, Default)]
pub struct JsonDriver;

impl JsonDriver {
    pub fn new() -> Self {
        Self
    }
}

impl Driver for JsonDriver {
    fn name(&self) -> &str {
        "JSON"
    }

    fn extensions(&self) -> &[&str] {
        &["json"]
    }

    fn parse(&self, layer_name: &str, text: &str) -> Result<Layer> {
        if text.trim().is_empty() {
            return Ok(Layer::new(layer_name));
        }
        let json: serde_json::Value =
            serde_json::from_str(text).map_err(|e| Error::parse("JSON", e.to_string()))?;
        layer_from_tree("JSON", layer_name, Value::from_json(json))
    }

    fn render(&self, conf: &Configuration) -> Result<String> {
        let tree = Value::Map(tree_from_configuration(conf));
        let mut text = serde_json::to_string_pretty(&tree.to_json())
            .map_err(|e| Error::render("JSON", e.to_string()))?;
        text.push('\n');
        Ok(text)
    }
}
