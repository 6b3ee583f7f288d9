//! End-to-end integration test for the resolution pipeline
//!
//! These tests exercise the complete flow: locate -> load -> merge -> resolve -> bind.

use conf_core::{Binder, ConfLoader, Configurable, LayerMerger, Resolver, field_value};
use conf_drivers::DriverRegistry;
use conf_fs::Locator;
use conf_model::{Layer, ParamType, Value};
use conf_test_utils::{TestTree, fixtures};
use pretty_assertions::assert_eq;

fn loader_for(tree: &TestTree) -> ConfLoader {
    ConfLoader::new(
        Locator::new().with_dir(tree.root()),
        DriverRegistry::with_builtins(),
    )
}

/// A target with typed fields
#[derive(Debug, Default, PartialEq)]
struct MyObject {
    myattr: String,
    six: i64,
    twelve: f64,
}

impl Configurable for MyObject {
    fn set_field(&mut self, name: &str, value: &Value) -> conf_core::Result<bool> {
        match name {
            "myattr" => self.myattr = field_value(name, value, |v| v.as_str().map(String::from))?,
            "six" => self.six = field_value(name, value, Value::as_i64)?,
            "twelve" => self.twelve = field_value(name, value, Value::as_f64)?,
            _ => return Ok(false),
        }
        Ok(true)
    }

    fn get_field(&self, name: &str) -> Option<Value> {
        match name {
            "myattr" => Some(Value::from(self.myattr.as_str())),
            "six" => Some(Value::Int(self.six)),
            "twelve" => Some(Value::Float(self.twelve)),
            _ => None,
        }
    }
}

#[test]
fn test_myobject_resolves_from_every_format() {
    for (file, content) in fixtures::all() {
        let tree = TestTree::new();
        tree.write(file, content);

        let layer = loader_for(&tree).load(file).unwrap();
        let mut conf = LayerMerger::new().merge([&layer]).unwrap();
        let resolution = Resolver::default().resolve(&mut conf);

        assert!(resolution.is_complete(), "{file}: {:?}", resolution.errors);
        let values = resolution.category("MYOBJECT");
        assert_eq!(values.get("myattr"), Some(&Value::from("myvalue")), "{file}");
        assert_eq!(values.get("six"), Some(&Value::Int(6)), "{file}");
        assert_eq!(values.get("twelve"), Some(&Value::Float(12.0)), "{file}");
    }
}

#[test]
fn test_declared_integer_type_coerces_twelve() {
    let tree = TestTree::new();
    tree.write("myobject.toml", fixtures::MYOBJECT_TOML);
    let defaults = Layer::new("defaults").with("MYOBJECT", "twelve", "0", Some(ParamType::Int));

    let file = loader_for(&tree).load("myobject.toml").unwrap();
    let mut conf = LayerMerger::new().merge([&defaults, &file]).unwrap();
    let resolution = Resolver::default().resolve(&mut conf);

    assert_eq!(resolution.get("MYOBJECT", "twelve"), Some(&Value::Int(12)));
}

#[test]
fn test_resolved_values_bind_to_target() {
    let tree = TestTree::new();
    tree.write("myobject.ini", fixtures::MYOBJECT_INI);

    let layers = loader_for(&tree).load_layers(&["myobject.ini"]).unwrap();
    let mut conf = LayerMerger::new().merge(&layers).unwrap();
    let resolution = Resolver::default().resolve(&mut conf);

    let mut target = MyObject::default();
    let report = Binder::new()
        .with_categories(["MYOBJECT"])
        .apply(&resolution, &mut target);

    assert!(report.is_clean());
    assert_eq!(
        target,
        MyObject {
            myattr: "myvalue".into(),
            six: 6,
            twelve: 12.0,
        }
    );
}

#[test]
fn test_saved_configuration_resolves_identically() {
    let tree = TestTree::new();
    tree.write("myobject.json", fixtures::MYOBJECT_JSON);
    let loader = loader_for(&tree);

    let layer = loader.load("myobject.json").unwrap();
    let mut conf = LayerMerger::new().merge([&layer]).unwrap();
    let expected = Resolver::default().resolve(&mut conf);

    for target in ["copy.ini", "copy.toml", "copy.yaml", "copy.xml"] {
        loader.save(&conf, target).unwrap();
        let reloaded = loader.load(target).unwrap();
        let mut copy = LayerMerger::new().merge([&reloaded]).unwrap();
        let resolution = Resolver::default().resolve(&mut copy);
        assert_eq!(resolution.values, expected.values, "{target}");
    }
}
