//! Scenario-based Integration Tests
//!
//! Each module covers one production scenario of the resolution engine,
//! driven through real files in temporary directories.

use conf_core::{
    Binder, ConfEngine, ConfLoader, Configurable, HostRegistry, LayerMerger, ResolveOptions,
    Resolver, StalePolicy,
};
use conf_drivers::DriverRegistry;
use conf_expr::{EvalOptions, ExprLanguage, Scope};
use conf_fs::Locator;
use conf_model::{Layer, ParamType, ParameterError, Value};
use conf_test_utils::TestTree;
use indexmap::IndexMap;
use pretty_assertions::assert_eq;
use std::sync::{Arc, Mutex};

// =============================================================================
// Test Infrastructure
// =============================================================================

/// Search directories standing in for system, user and local configuration
pub struct Sites {
    pub local: TestTree,
    pub user: TestTree,
    pub system: TestTree,
}

impl Default for Sites {
    fn default() -> Self {
        Self::new()
    }
}

impl Sites {
    pub fn new() -> Self {
        Self {
            local: TestTree::new(),
            user: TestTree::new(),
            system: TestTree::new(),
        }
    }

    /// Locator searching local, then user, then system
    pub fn locator(&self) -> Locator {
        Locator::new()
            .with_dir(self.local.root())
            .with_dir(self.user.root())
            .with_dir(self.system.root())
    }

    pub fn loader(&self) -> ConfLoader {
        ConfLoader::new(self.locator(), DriverRegistry::with_builtins())
    }

    pub fn resolve(&self, hints: &[&str], resolver: &Resolver) -> conf_core::Resolution {
        let layers = self.loader().load_layers(hints).unwrap();
        let mut conf = LayerMerger::new().merge(&layers).unwrap();
        resolver.resolve(&mut conf)
    }
}

// =============================================================================
// Scenario 1: Layered Precedence
// =============================================================================

mod s1_layering {
    use super::*;
    use pretty_assertions::assert_eq;

    /// S1.1: The same file in several directories overrides by directory precedence
    #[test]
    fn s1_1_local_overrides_user_overrides_system() {
        let sites = Sites::new();
        sites.system.write("app.ini", "[server]\nport = 80\nport::type = int\nhost = system\n");
        sites.user.write("app.ini", "[server]\nport = 8080\n");
        sites.local.write("app.ini", "[server]\nport = =@.port + 1\n");

        let resolution = sites.resolve(&["app.ini"], &Resolver::default());

        assert_eq!(resolution.get("server", "port"), Some(&Value::Int(8081)));
        assert_eq!(resolution.get("server", "host"), Some(&Value::from("system")));
    }

    /// S1.2: Later hints override earlier ones regardless of format
    #[test]
    fn s1_2_later_hint_overrides_earlier_format() {
        let sites = Sites::new();
        sites.system.write("app.ini", "[db]\nname = main\npool = 4\npool::type = int\n");
        sites.user.write("app.yaml", "db:\n  pool: =@.pool * 2\n");

        let resolution = sites.resolve(&["app.ini", "app.yaml"], &Resolver::default());

        assert_eq!(resolution.get("db", "pool"), Some(&Value::Int(8)));
        assert_eq!(resolution.get("db", "name"), Some(&Value::from("main")));
    }

    /// S1.3: A resource-scoped reference reads the value one file contributed
    #[test]
    fn s1_3_resource_reference_reads_named_file() {
        let sites = Sites::new();
        sites.system.write("base.toml", "[paths]\nroot = \"/srv\"\n");
        sites.user.write("site.json", r#"{"paths": {"root": "/home/app"}}"#);
        sites.user.write(
            "derived.ini",
            "[paths]\nlogs = @base.toml/paths.root/logs\ndata = %@paths.root + '/data'%\n",
        );

        let resolution = sites.resolve(
            &["base.toml", "site.json", "derived.ini"],
            &Resolver::default(),
        );

        assert_eq!(resolution.get("paths", "logs"), Some(&Value::from("/srv/logs")));
        assert_eq!(resolution.get("paths", "data"), Some(&Value::from("/home/app/data")));
    }
}

// =============================================================================
// Scenario 2: Templates Declared in Files
// =============================================================================

mod s2_templates {
    use super::*;
    use pretty_assertions::assert_eq;

    /// S2.1: A pattern parameter types every matching literal
    #[test]
    fn s2_1_pattern_parameter_types_matching_literals() {
        let sites = Sites::new();
        sites.system.write("ports.ini", "[net]\nport_.* = 0\nport_.*::type = int\n");
        sites.user.write("ports.ini", "[net]\nport_http = 80\nport_https = 443\nlabel = 80\n");

        let resolution = sites.resolve(&["ports.ini"], &Resolver::default());

        assert_eq!(resolution.get("net", "port_http"), Some(&Value::Int(80)));
        assert_eq!(resolution.get("net", "port_https"), Some(&Value::Int(443)));
        assert_eq!(resolution.get("net", "label"), Some(&Value::from("80")));
        assert_eq!(resolution.get("net", "port_.*"), None);
    }

    /// S2.2: A pattern category seeds every matching category
    #[test]
    fn s2_2_pattern_category_seeds_matching_categories() {
        let sites = Sites::new();
        sites.system.write(
            "db.json",
            r#"{"db_.*": {"port": 5432, "url": "postgres://@host:@port"}}"#,
        );
        sites.user.write(
            "db.json",
            r#"{"db_main": {"host": "main.internal"}, "db_replica": {"host": "replica.internal", "port": 6432}}"#,
        );

        let resolution = sites.resolve(&["db.json"], &Resolver::default());

        assert_eq!(
            resolution.get("db_main", "url"),
            Some(&Value::from("postgres://main.internal:5432"))
        );
        assert_eq!(
            resolution.get("db_replica", "url"),
            Some(&Value::from("postgres://replica.internal:6432"))
        );
    }
}

// =============================================================================
// Scenario 3: Safety and Strictness
// =============================================================================

mod s3_safety {
    use super::*;
    use pretty_assertions::assert_eq;

    /// S3.1: File reads are rejected until safe mode is turned off
    #[test]
    fn s3_1_io_requires_unsafe_mode() {
        let sites = Sites::new();
        let secret = sites.local.write("secret.txt", "s3cr3t");
        sites.local.write(
            "app.toml",
            &format!("[auth]\ntoken = \"=read('{}')\"\n", secret.as_str()),
        );

        let resolution = sites.resolve(&["app.toml"], &Resolver::default());
        assert_eq!(
            resolution.error("auth", "token"),
            Some(&ParameterError::UnsafeExpression {
                operation: "read".into()
            })
        );

        let options = ResolveOptions::from_toml("safe = false\n").unwrap();
        let resolution = sites.resolve(&["app.toml"], &Resolver::new(options));
        assert_eq!(resolution.get("auth", "token"), Some(&Value::from("s3cr3t")));
    }

    /// S3.2: Strict options turn unknown host paths into errors
    #[test]
    fn s3_2_strict_options_from_toml() {
        let sites = Sites::new();
        sites.local.write("app.ini", "[A]\nversion = #app.version\nname = #app.name\n");
        let host = HostRegistry::new().with("app.version", "1.2.3");

        let lenient = Resolver::default().with_host(host.clone());
        let resolution = sites.resolve(&["app.ini"], &lenient);
        assert_eq!(resolution.get("A", "version"), Some(&Value::from("1.2.3")));
        assert_eq!(resolution.get("A", "name"), Some(&Value::from("app.name")));

        let options = ResolveOptions::from_toml("besteffort = false\n").unwrap();
        let strict = Resolver::new(options).with_host(host);
        let resolution = sites.resolve(&["app.ini"], &strict);
        assert_eq!(resolution.get("A", "version"), Some(&Value::from("1.2.3")));
        assert_eq!(
            resolution.error("A", "name"),
            Some(&ParameterError::NameResolution {
                name: "app.name".into()
            })
        );
    }

    /// S3.3: Array values use the configured delimiter
    #[test]
    fn s3_3_custom_delimiter() {
        let sites = Sites::new();
        sites.local.write("app.ini", "[A]\nhosts = a;b;c\nhosts::type = str[]\n");

        let options = ResolveOptions::from_toml("delimiter = \";\"\n").unwrap();
        let resolution = sites.resolve(&["app.ini"], &Resolver::new(options));
        assert_eq!(resolution.get("A", "hosts"), Some(&vec!["a", "b", "c"].into()));
    }
}

// =============================================================================
// Scenario 4: Custom Expression Languages
// =============================================================================

mod s4_languages {
    use super::*;
    use pretty_assertions::assert_eq;

    /// Upper-cases its source text
    struct Shout;

    impl ExprLanguage for Shout {
        fn name(&self) -> &str {
            "shout"
        }

        fn evaluate(
            &self,
            source: &str,
            _scope: &mut dyn Scope,
            _options: &EvalOptions,
        ) -> conf_expr::Result<Value> {
            Ok(Value::Str(source.trim().to_uppercase()))
        }
    }

    /// S4.1: A registered language is usable in both expression forms
    #[test]
    fn s4_1_registered_language_in_both_forms() {
        let sites = Sites::new();
        sites.local.write(
            "app.ini",
            "[A]\nwhole = =shout:hello\ninline = say %shout:hi% twice\nunknown = =lua:1\n",
        );
        let mut resolver = Resolver::default();
        resolver.languages_mut().register(Box::new(Shout));

        let resolution = sites.resolve(&["app.ini"], &resolver);

        assert_eq!(resolution.get("A", "whole"), Some(&Value::from("HELLO")));
        assert_eq!(resolution.get("A", "inline"), Some(&Value::from("say HI twice")));
        assert_eq!(
            resolution.error("A", "unknown"),
            Some(&ParameterError::UnknownLanguage { name: "lua".into() })
        );
    }
}

// =============================================================================
// Scenario 5: Live Targets
// =============================================================================

mod s5_targets {
    use super::*;
    use pretty_assertions::assert_eq;

    #[derive(Debug, Default)]
    struct Pool {
        size: i64,
    }

    impl Configurable for Pool {
        fn set_field(&mut self, name: &str, value: &Value) -> conf_core::Result<bool> {
            match name {
                "size" => self.size = conf_core::field_value(name, value, Value::as_i64)?,
                _ => return Ok(false),
            }
            Ok(true)
        }

        fn get_field(&self, name: &str) -> Option<Value> {
            (name == "size").then_some(Value::Int(self.size))
        }

        fn field_names(&self) -> Vec<String> {
            vec!["size".into()]
        }
    }

    fn engine(sites: &Sites) -> ConfEngine {
        ConfEngine::new(sites.loader(), Resolver::default())
            .with_defaults(Layer::new("defaults").with("pool", "size", "4", Some(ParamType::Int)))
            .with_resource("pool.ini")
    }

    /// S5.1: Every live target follows reloads; dropped targets are forgotten
    #[test]
    fn s5_1_reload_updates_live_targets() {
        let sites = Sites::new();
        let mut engine = engine(&sites);
        engine.reload().unwrap();

        let first = Arc::new(Mutex::new(Pool::default()));
        let second = Arc::new(Mutex::new(Pool::default()));
        engine.register(&first, Binder::new());
        engine.register(&second, Binder::new());
        assert_eq!(first.lock().unwrap().size, 4);

        drop(second);
        sites.local.write("pool.ini", "[pool]\nsize = =@.size * 4\n");
        engine.reload().unwrap();
        assert_eq!(first.lock().unwrap().size, 16);
    }

    /// S5.2: A broken edit keeps the last known good value unless discarded
    #[test]
    fn s5_2_broken_edit_keeps_last_known_good() {
        let sites = Sites::new();
        sites.local.write("pool.ini", "[pool]\nsize = 10\n");
        let mut engine = engine(&sites);
        engine.reload().unwrap();

        let kept = Arc::new(Mutex::new(Pool::default()));
        let discarded = Arc::new(Mutex::new(Pool::default()));
        engine.register(&kept, Binder::new());
        engine.register(
            &discarded,
            Binder::new().with_stale_policy(StalePolicy::Discard),
        );

        sites.local.write("pool.ini", "[pool]\nsize = ten\n");
        let resolution = engine.reload().unwrap();
        assert!(matches!(
            resolution.error("pool", "size"),
            Some(ParameterError::TypeConversion { .. })
        ));
        assert_eq!(kept.lock().unwrap().size, 10);
        assert_eq!(discarded.lock().unwrap().size, 10);

        *discarded.lock().unwrap() = Pool::default();
        engine.refresh();
        assert_eq!(kept.lock().unwrap().size, 10);
        assert_eq!(discarded.lock().unwrap().size, 0);
    }

    /// S5.3: A target's own fields are visible while it is being configured
    #[test]
    fn s5_3_configure_reads_target_fields() {
        let sites = Sites::new();
        sites.local.write("pool.ini", "[pool]\nsize = =max(configurable.size, 8)\n");
        let mut engine = engine(&sites);
        engine.reload().unwrap();

        let mut pool = Pool { size: 12 };
        let report = engine.configure(&mut pool, &Binder::new());
        assert_eq!(report.applied, vec!["size"]);
        assert_eq!(pool.size, 12);

        let mut small = Pool { size: 2 };
        engine.configure(&mut small, &Binder::new());
        assert_eq!(small.size, 8);
    }

    /// S5.4: Saving writes the effective raw values back out
    #[test]
    fn s5_4_save_writes_effective_configuration() {
        let sites = Sites::new();
        sites.user.write("pool.ini", "[pool]\nsize = 6\n");
        let mut engine = engine(&sites);
        engine.reload().unwrap();

        let path = engine.save("pool.ini").unwrap();
        assert_eq!(path.file_name(), Some("pool.ini"));
        sites.user.assert_file_contains("pool.ini", "size = 6");
        sites.user.assert_file_contains("pool.ini", "size::type = int");
    }

    /// S5.5: A map target accepts every field of the bound categories
    #[test]
    fn s5_5_map_target_collects_fields() {
        let sites = Sites::new();
        sites.local.write("pool.ini", "[pool]\nsize = 3\n[extra]\nname = x\n");
        let mut engine = engine(&sites);
        engine.reload().unwrap();

        let mut fields: IndexMap<String, Value> = IndexMap::new();
        engine.configure(&mut fields, &Binder::new().with_categories(["pool"]));
        assert_eq!(fields.get("size"), Some(&Value::Int(3)));
        assert!(!fields.contains_key("name"));
    }
}
