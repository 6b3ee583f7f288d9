//! Categories of parameters

use crate::{ParamName, Parameter};
use indexmap::IndexMap;

/// A named, insertion-ordered group of parameters.
///
/// Parameters are keyed by the text of their name, so a literal and a
/// pattern can never share the same key.
#[derive(Debug, Clone, PartialEq)]
pub struct Category {
    name: ParamName,
    params: IndexMap<String, Parameter>,
}

impl Category {
    pub fn new(name: ParamName) -> Self {
        Self {
            name,
            params: IndexMap::new(),
        }
    }

    pub fn literal(name: impl Into<String>) -> Self {
        Self::new(ParamName::literal(name))
    }

    /// Builder-style insert.
    pub fn with(mut self, param: Parameter) -> Self {
        self.insert(param);
        self
    }

    pub fn name(&self) -> &ParamName {
        &self.name
    }

    pub fn get(&self, name: &str) -> Option<&Parameter> {
        self.params.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Parameter> {
        self.params.get_mut(name)
    }

    /// Insert or replace a parameter, returning the one it replaced.
    pub fn insert(&mut self, param: Parameter) -> Option<Parameter> {
        self.params.insert(param.name().as_str().to_string(), param)
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn params(&self) -> impl Iterator<Item = &Parameter> {
        self.params.values()
    }

    pub fn params_mut(&mut self) -> impl Iterator<Item = &mut Parameter> {
        self.params.values_mut()
    }

    /// Finalized, literal-named parameters.
    pub fn literals(&self) -> impl Iterator<Item = &Parameter> {
        self.params.values().filter(|p| !p.name().is_pattern())
    }

    /// Pattern-named template parameters.
    pub fn templates(&self) -> impl Iterator<Item = &Parameter> {
        self.params.values().filter(|p| p.name().is_pattern())
    }

    /// The first template, in insertion order, matching `literal`.
    pub fn find_template(&self, literal: &str) -> Option<&Parameter> {
        self.templates().find(|t| t.name().matches(literal))
    }
}
