//! Declared parameter types

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The declared target type of a parameter.
///
/// Parses from the text used in resources: `bool`, `int`, `float`, `str`,
/// `map`, `array<T>` (also `list<T>` and `T[]`) and common aliases.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ParamType {
    Bool,
    Int,
    Float,
    Str,
    Map,
    Array(Box<ParamType>),
}

impl ParamType {
    /// Shorthand for `Array(element)`.
    pub fn array_of(element: ParamType) -> Self {
        ParamType::Array(Box::new(element))
    }
}

impl FromStr for ParamType {
    type Err = Error;

    fn from_str(text: &str) -> Result<Self> {
        let trimmed = text.trim();
        let lower = trimmed.to_ascii_lowercase();

        if let Some(element) = lower.strip_suffix("[]") {
            return Ok(ParamType::array_of(element.parse()?));
        }
        for prefix in ["array<", "list<"] {
            if let Some(rest) = lower.strip_prefix(prefix) {
                let element = rest.strip_suffix('>').ok_or_else(|| Error::UnknownType {
                    text: trimmed.to_string(),
                })?;
                return Ok(ParamType::array_of(element.parse()?));
            }
        }

        match lower.as_str() {
            "bool" | "boolean" => Ok(ParamType::Bool),
            "int" | "integer" => Ok(ParamType::Int),
            "float" | "number" => Ok(ParamType::Float),
            "str" | "string" => Ok(ParamType::Str),
            "map" | "dict" | "object" => Ok(ParamType::Map),
            // Untyped arrays hold strings
            "array" | "list" => Ok(ParamType::array_of(ParamType::Str)),
            _ => Err(Error::UnknownType {
                text: trimmed.to_string(),
            }),
        }
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamType::Bool => write!(f, "bool"),
            ParamType::Int => write!(f, "int"),
            ParamType::Float => write!(f, "float"),
            ParamType::Str => write!(f, "str"),
            ParamType::Map => write!(f, "map"),
            ParamType::Array(element) => write!(f, "array<{}>", element),
        }
    }
}

impl TryFrom<String> for ParamType {
    type Error = Error;

    fn try_from(text: String) -> Result<Self> {
        text.parse()
    }
}

impl From<ParamType> for String {
    fn from(ptype: ParamType) -> Self {
        ptype.to_string()
    }
}
