//! Layered configuration resolution engine.
//!
//! Configuration is assembled from layers (a defaults layer declared in code,
//! then files found by the locator), merged lowest precedence first, and
//! resolved into typed values:
//!
//! - [`LayerMerger`]: overrides with history and regex templates
//! - [`Resolver`]: `@` references, `#` host paths and `%expr%`/`=expr`
//!   expressions, with cycle detection and type coercion
//! - [`Binder`] and [`ConfigurableRegistry`]: push resolved values to targets
//! - [`ConfLoader`] and [`ConfEngine`]: locate, load, merge, resolve, apply
//!
//! # Example
//!
//! ```
//! use conf_core::{LayerMerger, Resolver};
//! use conf_model::{Layer, ParamType, Value};
//!
//! let defaults = Layer::new("defaults")
//!     .with("server", "port", "8080", Some(ParamType::Int))
//!     .with("server", "url", "http://localhost:@port/", None);
//! let user = Layer::new("user").with("server", "port", "=@.port + 1", None);
//!
//! let mut conf = LayerMerger::new().merge(&[defaults, user]).unwrap();
//! let resolution = Resolver::default().resolve(&mut conf);
//!
//! assert_eq!(resolution.get("server", "port"), Some(&Value::Int(8081)));
//! assert_eq!(
//!     resolution.get("server", "url"),
//!     Some(&Value::from("http://localhost:8081/"))
//! );
//! ```

pub mod binder;
pub mod engine;
pub mod error;
pub mod host;
pub mod loader;
pub mod logging;
pub mod merge;
pub mod options;
pub mod registry;
pub mod resolver;

pub use binder::{ApplyReport, Binder, Configurable, StalePolicy, field_value, snapshot};
pub use engine::ConfEngine;
pub use error::{Error, Result};
pub use host::HostRegistry;
pub use loader::ConfLoader;
pub use merge::LayerMerger;
pub use options::ResolveOptions;
pub use registry::{ConfigurableRegistry, SharedConfigurable, TargetId};
pub use resolver::{MAX_REFERENCE_DEPTH, Resolution, ResolutionError, Resolver};
