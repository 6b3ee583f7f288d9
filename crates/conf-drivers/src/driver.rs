//! Driver capability

use crate::Result;
use conf_fs::{NormalizedPath, io};
use conf_model::{Configuration, Layer};

/// Reads configuration layers from, and writes configurations to, one format.
pub trait Driver: Send + Sync {
    /// Format name used in messages
    fn name(&self) -> &str;

    /// File extensions handled, lowercase and without the dot
    fn extensions(&self) -> &[&str];

    /// Parse resource text into a layer named `layer_name`.
    fn parse(&self, layer_name: &str, text: &str) -> Result<Layer>;

    /// Render the raw values and declared types of `conf`.
    fn render(&self, conf: &Configuration) -> Result<String>;

    /// Load a resource as a layer named after its file.
    ///
    /// A layer declaring the same parameter twice is rejected.
    fn load(&self, path: &NormalizedPath) -> Result<Layer> {
        let text = io::read_text(path)?;
        let layer_name = path.file_name().unwrap_or(path.as_str());
        let layer = self.parse(layer_name, &text)?;
        layer.validate()?;
        tracing::debug!(
            %path,
            driver = self.name(),
            entries = layer.entries().len(),
            "Loaded configuration layer"
        );
        Ok(layer)
    }

    /// Render `conf` and write it atomically to `path`.
    fn save(&self, conf: &Configuration, path: &NormalizedPath) -> Result<()> {
        let text = self.render(conf)?;
        io::write_atomic(path, text.as_bytes())?;
        tracing::debug!(%path, driver = self.name(), "Saved configuration");
        Ok(())
    }
}
