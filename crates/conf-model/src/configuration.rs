//! The effective configuration

use crate::{Category, ParamName, ParameterError, Value};
use indexmap::IndexMap;

/// An insertion-ordered set of categories.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Configuration {
    categories: IndexMap<String, Category>,
}

impl Configuration {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, category: Category) -> Self {
        self.insert(category);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Category> {
        self.categories.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Category> {
        self.categories.get_mut(name)
    }

    pub fn insert(&mut self, category: Category) -> Option<Category> {
        self.categories
            .insert(category.name().as_str().to_string(), category)
    }

    /// The category named `name`, created empty when missing.
    pub fn entry(&mut self, name: &str) -> &mut Category {
        self.categories
            .entry(name.to_string())
            .or_insert_with(|| Category::literal(name))
    }

    pub fn categories(&self) -> impl Iterator<Item = &Category> {
        self.categories.values()
    }

    pub fn categories_mut(&mut self) -> impl Iterator<Item = &mut Category> {
        self.categories.values_mut()
    }

    /// The first template category, in insertion order, matching `literal`.
    pub fn find_template(&self, literal: &str) -> Option<&Category> {
        self.categories
            .values()
            .find(|c| c.name().is_pattern() && c.name().matches(literal))
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Resolved values of literal parameters in literal categories.
    pub fn values(&self) -> IndexMap<(String, String), Value> {
        self.literal_params()
            .filter_map(|(cat, param)| {
                param
                    .resolved()
                    .map(|v| ((cat.to_string(), param.name().to_string()), v.clone()))
            })
            .collect()
    }

    /// Errors recorded by the last resolution pass.
    pub fn errors(&self) -> Vec<((String, String), ParameterError)> {
        self.literal_params()
            .filter_map(|(cat, param)| {
                param
                    .error()
                    .map(|e| ((cat.to_string(), param.name().to_string()), e.clone()))
            })
            .collect()
    }

    /// Every literal parameter with its category name.
    pub fn literal_params(&self) -> impl Iterator<Item = (&str, &crate::Parameter)> {
        self.categories
            .values()
            .filter(|c| !matches!(c.name(), ParamName::Pattern { .. }))
            .flat_map(|c| c.literals().map(move |p| (c.name().as_str(), p)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Parameter;

    #[test]
    fn values_skip_unresolved_and_templates() {
        let mut resolved = Parameter::literal("a", "1");
        resolved.record_success(Value::Int(1));

        let conf = Configuration::new()
            .with(
                Category::literal("C")
                    .with(resolved)
                    .with(Parameter::literal("b", "2")),
            )
            .with(Category::new(ParamName::pattern("T.*").unwrap()).with(Parameter::literal("x", "y")));

        let values = conf.values();
        assert_eq!(values.len(), 1);
        assert_eq!(values[&("C".to_string(), "a".to_string())], Value::Int(1));
        assert_eq!(conf.literal_params().count(), 2);
    }

    #[test]
    fn entry_creates_missing_category() {
        let mut conf = Configuration::new();
        conf.entry("new").insert(Parameter::literal("p", "v"));
        assert_eq!(conf.get("new").and_then(|c| c.get("p")).map(|p| p.raw()), Some(&Value::from("v")));
    }
}
