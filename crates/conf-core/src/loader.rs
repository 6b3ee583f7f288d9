//! Locating and reading configuration resources

use crate::Result;
use conf_drivers::DriverRegistry;
use conf_fs::{Locator, NormalizedPath};
use conf_model::{Configuration, Layer};

/// Reads layers from located resources through the driver registry.
#[derive(Debug)]
pub struct ConfLoader {
    locator: Locator,
    drivers: DriverRegistry,
}

impl ConfLoader {
    pub fn new(locator: Locator, drivers: DriverRegistry) -> Self {
        Self { locator, drivers }
    }

    /// Standard search order and built-in drivers.
    pub fn from_env() -> Self {
        Self::new(Locator::from_env(), DriverRegistry::with_builtins())
    }

    pub fn locator(&self) -> &Locator {
        &self.locator
    }

    pub fn drivers(&self) -> &DriverRegistry {
        &self.drivers
    }

    pub fn drivers_mut(&mut self) -> &mut DriverRegistry {
        &mut self.drivers
    }

    /// Load the highest-precedence resource for `hint`.
    pub fn load(&self, hint: &str) -> Result<Layer> {
        let path = self.locator.locate(hint)?;
        Ok(self.drivers.load(&path)?)
    }

    /// Load every located resource for each hint, lowest precedence first.
    ///
    /// Hints are given lowest precedence first as well. A hint with no
    /// existing resource contributes nothing.
    pub fn load_layers(&self, hints: &[&str]) -> Result<Vec<Layer>> {
        let mut layers = Vec::new();
        for hint in hints {
            let found = self.locator.locate_all(hint);
            if found.is_empty() {
                tracing::debug!(hint, "No resource found");
                continue;
            }
            for path in found.iter().rev() {
                tracing::debug!(path = %path, "Loading layer");
                layers.push(self.drivers.load(path)?);
            }
        }
        Ok(layers)
    }

    /// Write `conf` to the resource for `hint`.
    ///
    /// Writes over the highest-precedence existing resource; otherwise an
    /// absolute hint is used as is and a relative one is created in the
    /// highest-precedence search directory.
    pub fn save(&self, conf: &Configuration, hint: &str) -> Result<NormalizedPath> {
        let path = match self.locator.locate(hint) {
            Ok(path) => path,
            Err(err) => {
                let hint_path = NormalizedPath::new(hint);
                match self.locator.dirs().first() {
                    _ if hint_path.is_absolute() => hint_path,
                    Some(dir) => NormalizedPath::new(dir).join(hint),
                    None => return Err(err.into()),
                }
            }
        };
        self.drivers.save(conf, &path)?;
        tracing::debug!(path = %path, "Saved configuration");
        Ok(path)
    }
}

impl Default for ConfLoader {
    fn default() -> Self {
        Self::from_env()
    }
}
