//! Filesystem access for layered configuration
//!
//! Provides normalized paths, configuration-resource location lookup and
//! locked atomic writes used by the file-backed drivers.

pub mod constants;
pub mod error;
pub mod io;
pub mod locate;
pub mod path;

pub use constants::{CONF_DIR_ENV, ConventionalDir};
pub use error::{Error, Result};
pub use locate::Locator;
pub use path::NormalizedPath;
