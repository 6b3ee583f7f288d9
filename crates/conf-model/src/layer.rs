//! Configuration layers
//!
//! A layer is one named fragment of configuration, typically read from a
//! single resource. Declared types travel next to their value under a sibling
//! key ending in [`TYPE_SUFFIX`]:
//!
//! ```ini
//! [server]
//! port = 8080
//! port::type = int
//! ```

use crate::{Error, ParamType, Result, Value};
use std::collections::HashSet;

/// Suffix marking a sibling key that declares a parameter's type.
pub const TYPE_SUFFIX: &str = "::type";

/// A single parameter as contributed by a layer.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerEntry {
    pub category: String,
    pub name: String,
    pub raw: Value,
    pub ptype: Option<ParamType>,
}

/// An ordered, named source of configuration entries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Layer {
    name: String,
    /// Categories in the order they were declared, including empty ones
    categories: Vec<String>,
    entries: Vec<LayerEntry>,
}

impl Layer {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn entries(&self) -> &[LayerEntry] {
        &self.entries
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    /// Declare a category without adding parameters to it.
    pub fn add_category(&mut self, category: &str) {
        if !self.categories.iter().any(|c| c == category) {
            self.categories.push(category.to_string());
        }
    }

    /// Append one entry.
    pub fn push(
        &mut self,
        category: &str,
        name: impl Into<String>,
        raw: impl Into<Value>,
        ptype: Option<ParamType>,
    ) {
        self.add_category(category);
        self.entries.push(LayerEntry {
            category: category.to_string(),
            name: name.into(),
            raw: raw.into(),
            ptype,
        });
    }

    /// Builder-style [`push`](Self::push).
    pub fn with(
        mut self,
        category: &str,
        name: impl Into<String>,
        raw: impl Into<Value>,
        ptype: Option<ParamType>,
    ) -> Self {
        self.push(category, name, raw, ptype);
        self
    }

    /// Append a category's raw key/value pairs, pairing `::type` keys with
    /// the values they describe.
    ///
    /// Keys keep their order of first appearance.
    pub fn push_category(&mut self, category: &str, pairs: Vec<(String, Value)>) -> Result<()> {
        self.add_category(category);

        let mut types: Vec<(String, ParamType)> = Vec::new();
        let mut values: Vec<(String, Value)> = Vec::new();
        for (key, value) in pairs {
            match key.strip_suffix(TYPE_SUFFIX) {
                Some(target) => {
                    let text = value.to_string();
                    types.push((target.to_string(), text.parse()?));
                }
                None => values.push((key, value)),
            }
        }

        for (target, _) in &types {
            if !values.iter().any(|(key, _)| key == target) {
                return Err(Error::OrphanType {
                    layer: self.name.clone(),
                    category: category.to_string(),
                    parameter: target.clone(),
                });
            }
        }

        for (key, value) in values {
            let ptype = types
                .iter()
                .rev()
                .find(|(target, _)| *target == key)
                .map(|(_, t)| t.clone());
            self.push(category, key, value, ptype);
        }
        Ok(())
    }

    /// Reject a layer that declares the same parameter twice.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for entry in &self.entries {
            if !seen.insert((entry.category.as_str(), entry.name.as_str())) {
                return Err(Error::DuplicateName {
                    layer: self.name.clone(),
                    category: entry.category.clone(),
                    parameter: entry.name.clone(),
                });
            }
        }
        Ok(())
    }
}
