//! Configuration model for layered configuration.
//!
//! This crate provides the in-memory entity graph the resolution engine
//! operates on, together with typed values and the value coercer:
//!
//! - [`Configuration`] → [`Category`] → [`Parameter`], all insertion-ordered
//! - [`ParamName`]: literal names and regex templates
//! - [`Layer`]: one named fragment read from a resource or declared in code
//! - [`Value`] and [`ParamType`]: typed values and declared target types
//! - [`Coercer`]: converts resolved values to their declared type
//!
//! # Example
//!
//! ```
//! use conf_model::{Coercer, ParamType, Value};
//!
//! let coercer = Coercer::default();
//! let ptype: ParamType = "array<int>".parse().unwrap();
//! let value = coercer.coerce(Value::from("1,2,3"), Some(&ptype)).unwrap();
//! assert_eq!(value, Value::Array(vec![1.into(), 2.into(), 3.into()]));
//! ```

pub mod category;
pub mod coerce;
pub mod configuration;
pub mod error;
pub mod layer;
pub mod name;
pub mod parameter;
pub mod ptype;
pub mod value;

pub use category::Category;
pub use coerce::{Coercer, FALSY, TRUTHY};
pub use configuration::Configuration;
pub use error::{Error, ParameterError, Result};
pub use layer::{Layer, LayerEntry, TYPE_SUFFIX};
pub use name::ParamName;
pub use parameter::{HistoryEntry, Parameter};
pub use ptype::ParamType;
pub use value::Value;
