//! Configuration resource drivers.
//!
//! A [`Driver`] turns the text of one resource into a [`Layer`] and renders a
//! [`Configuration`] back to text. Declared types travel with the data as a
//! sibling `<param>::type` key in every format.
//!
//! Built-in drivers: JSON, TOML, YAML, INI and XML. [`DriverRegistry`] picks
//! one by file extension.
//!
//! [`Layer`]: conf_model::Layer
//! [`Configuration`]: conf_model::Configuration

pub mod driver;
pub mod error;
pub mod formats;
pub mod registry;

pub use driver::Driver;
pub use error::{Error, Result};
pub use formats::{IniDriver, JsonDriver, TomlDriver, XmlDriver, YamlDriver};
pub use registry::DriverRegistry;
