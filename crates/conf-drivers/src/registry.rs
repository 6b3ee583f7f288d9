//! Driver selection by file extension

use crate::driver::Driver;
use crate::formats::{IniDriver, JsonDriver, TomlDriver, XmlDriver, YamlDriver};
use crate::{Error, Result};
use conf_fs::NormalizedPath;
use conf_model::{Configuration, Layer};

/// Registry of drivers keyed by the extensions they handle.
///
/// Later registrations take precedence for a shared extension.
pub struct DriverRegistry {
    drivers: Vec<Box<dyn Driver>>,
}

impl DriverRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            drivers: Vec::new(),
        }
    }

    /// Create a registry with the JSON, TOML, YAML, INI and XML drivers.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(JsonDriver));
        registry.register(Box::new(TomlDriver));
        registry.register(Box::new(YamlDriver));
        registry.register(Box::new(IniDriver));
        registry.register(Box::new(XmlDriver));
        registry
    }

    pub fn register(&mut self, driver: Box<dyn Driver>) {
        self.drivers.push(driver);
    }

    /// Driver for a file extension, case-insensitive.
    pub fn for_extension(&self, extension: &str) -> Option<&dyn Driver> {
        let extension = extension.to_lowercase();
        self.drivers
            .iter()
            .rev()
            .find(|d| d.extensions().contains(&extension.as_str()))
            .map(|d| d.as_ref())
    }

    /// Driver for a path, by its extension.
    pub fn for_path(&self, path: &NormalizedPath) -> Result<&dyn Driver> {
        let extension = path.extension().unwrap_or("");
        self.for_extension(extension)
            .ok_or_else(|| Error::UnsupportedFormat {
                extension: extension.to_string(),
            })
    }

    pub fn load(&self, path: &NormalizedPath) -> Result<Layer> {
        self.for_path(path)?.load(path)
    }

    pub fn save(&self, conf: &Configuration, path: &NormalizedPath) -> Result<()> {
        self.for_path(path)?.save(conf, path)
    }

    /// Every handled extension.
    pub fn extensions(&self) -> Vec<&str> {
        let mut all: Vec<&str> = self
            .drivers
            .iter()
            .flat_map(|d| d.extensions().iter().copied())
            .collect();
        all.sort();
        all.dedup();
        all
    }
}

impl Default for DriverRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for DriverRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.drivers.iter().map(|d| d.name()))
            .finish()
    }
}
