//! Layer merging
//!
//! Layers are merged lowest precedence first. For every entry:
//!
//! 1. an existing parameter with the same name is overridden, pushing its
//!    previous value onto the history
//! 2. otherwise the first template whose pattern matches the name is
//!    instantiated with the new value, inheriting the template's type
//! 3. otherwise a new parameter is created
//!
//! Categories follow the same rule: a literal category that is not yet
//! present but matches a template category starts as a copy of it.

use crate::Result;
use conf_model::{Category, Configuration, Layer, LayerEntry, ParamName, Parameter};

/// Merges layers into a [`Configuration`].
#[derive(Debug, Clone, Copy, Default)]
pub struct LayerMerger;

impl LayerMerger {
    pub fn new() -> Self {
        Self
    }

    /// Merge `layers`, lowest precedence first, into an empty configuration.
    pub fn merge<'a>(&self, layers: impl IntoIterator<Item = &'a Layer>) -> Result<Configuration> {
        let mut conf = Configuration::new();
        for layer in layers {
            self.merge_into(&mut conf, layer)?;
        }
        Ok(conf)
    }

    /// Merge one layer on top of `conf`.
    ///
    /// A layer that declares the same parameter twice, or carries an invalid
    /// name pattern, is rejected before anything is merged.
    pub fn merge_into(&self, conf: &mut Configuration, layer: &Layer) -> Result<()> {
        layer.validate()?;
        for name in layer.categories().iter().chain(layer.entries().iter().map(|e| &e.name)) {
            ParamName::parse(name)?;
        }

        for category in layer.categories() {
            ensure_category(conf, category)?;
        }
        for entry in layer.entries() {
            let category = ensure_category(conf, &entry.category)?;
            merge_entry(category, entry, layer.name())?;
        }

        tracing::debug!(
            layer = layer.name(),
            entries = layer.entries().len(),
            categories = conf.len(),
            "Merged layer"
        );
        Ok(())
    }
}

fn ensure_category<'c>(conf: &'c mut Configuration, name: &str) -> Result<&'c mut Category> {
    if conf.get(name).is_none() {
        let parsed = ParamName::parse(name)?;
        let category = match conf.find_template(name) {
            Some(template) if !parsed.is_pattern() => {
                tracing::debug!(category = name, template = %template.name(), "Instantiating category template");
                instantiate_category(template, name)
            }
            _ => Category::new(parsed),
        };
        conf.insert(category);
    }
    Ok(conf.entry(name))
}

fn instantiate_category(template: &Category, name: &str) -> Category {
    let mut category = Category::literal(name);
    for param in template.params() {
        let mut copy = param.clone();
        copy.clear_resolution();
        category.insert(copy);
    }
    category
}

fn merge_entry(category: &mut Category, entry: &LayerEntry, layer: &str) -> Result<()> {
    if let Some(existing) = category.get_mut(&entry.name) {
        tracing::trace!(category = %entry.category, parameter = %entry.name, layer, "Overriding parameter");
        existing.override_with(entry.raw.clone(), entry.ptype.clone(), Some(layer.to_string()));
        return Ok(());
    }

    let name = ParamName::parse(&entry.name)?;
    let param = match category.find_template(&entry.name) {
        Some(template) if !name.is_pattern() => template.instantiate(
            entry.name.clone(),
            entry.raw.clone(),
            entry.ptype.clone(),
            Some(layer.to_string()),
        ),
        _ => {
            let mut param = Parameter::new(name, entry.raw.clone()).with_layer(layer);
            if let Some(ptype) = &entry.ptype {
                param = param.with_type(ptype.clone());
            }
            param
        }
    };
    category.insert(param);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use conf_model::{ParamType, Value};
    use pretty_assertions::assert_eq;

    fn merged(layers: &[Layer]) -> Configuration {
        LayerMerger::new().merge(layers).unwrap()
    }

    #[test]
    fn later_layers_override_and_keep_history() {
        let conf = merged(&[
            Layer::new("base").with("A", "p", "10", None),
            Layer::new("user").with("A", "p", "20", None),
        ]);

        let param = conf.get("A").unwrap().get("p").unwrap();
        assert_eq!(param.raw(), &Value::from("20"));
        assert_eq!(param.layer(), Some("user"));
        assert_eq!(param.history().len(), 1);
        assert_eq!(param.history()[0].raw, Value::from("10"));
        assert_eq!(param.history()[0].layer.as_deref(), Some("base"));
    }

    #[test]
    fn template_is_instantiated_with_its_type() {
        let conf = merged(&[
            Layer::new("defaults").with("T", "x.*", "0", Some(ParamType::Int)),
            Layer::new("user").with("T", "xyz", "5", None),
        ]);

        let category = conf.get("T").unwrap();
        let xyz = category.get("xyz").unwrap();
        assert_eq!(xyz.ptype(), Some(&ParamType::Int));
        assert_eq!(xyz.raw(), &Value::from("5"));
        assert!(xyz.history().is_empty());
        assert!(category.get("x.*").unwrap().name().is_pattern());
    }

    #[test]
    fn exact_match_beats_template() {
        let conf = merged(&[
            Layer::new("defaults")
                .with("T", "x.*", "0", Some(ParamType::Int))
                .with("T", "xyz", "1", Some(ParamType::Str)),
            Layer::new("user").with("T", "xyz", "5", None),
        ]);

        let xyz = conf.get("T").unwrap().get("xyz").unwrap();
        assert_eq!(xyz.ptype(), Some(&ParamType::Str));
        assert_eq!(xyz.history().len(), 1);
    }

    #[test]
    fn category_template_is_copied() {
        let conf = merged(&[
            Layer::new("defaults")
                .with("db_.*", "port", "5432", Some(ParamType::Int))
                .with("db_.*", "host", "localhost", None),
            Layer::new("user").with("db_main", "host", "db.internal", None),
        ]);

        let main = conf.get("db_main").unwrap();
        assert!(!main.name().is_pattern());
        assert_eq!(main.get("port").unwrap().ptype(), Some(&ParamType::Int));
        assert_eq!(main.get("host").unwrap().raw(), &Value::from("db.internal"));
        assert!(conf.get("db_.*").unwrap().name().is_pattern());
    }

    #[test]
    fn empty_categories_are_declared() {
        let mut layer = Layer::new("base");
        layer.add_category("empty");
        let conf = merged(&[layer]);
        assert!(conf.get("empty").unwrap().is_empty());
    }

    #[test]
    fn duplicate_name_rejects_whole_layer() {
        let mut conf = merged(&[Layer::new("base").with("A", "p", "1", None)]);
        let bad = Layer::new("bad")
            .with("A", "q", "1", None)
            .with("A", "q", "2", None);

        let err = LayerMerger::new().merge_into(&mut conf, &bad).unwrap_err();
        assert!(matches!(
            err,
            Error::Model(conf_model::Error::DuplicateName { .. })
        ));
        assert!(conf.get("A").unwrap().get("q").is_none());
    }

    #[test]
    fn invalid_pattern_rejects_whole_layer() {
        let mut conf = Configuration::new();
        let bad = Layer::new("bad")
            .with("A", "ok", "1", None)
            .with("A", "broken[", "2", None);

        let err = LayerMerger::new().merge_into(&mut conf, &bad).unwrap_err();
        assert!(matches!(
            err,
            Error::Model(conf_model::Error::InvalidPattern { .. })
        ));
        assert!(conf.is_empty());
    }
}
