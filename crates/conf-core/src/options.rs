//! Resolver options

use crate::{Error, Result};
use conf_expr::EvalOptions;
use conf_model::Coercer;
use serde::{Deserialize, Serialize};

/// Options controlling a resolution pass.
///
/// Can be read from a TOML document; missing keys keep their defaults:
///
/// ```toml
/// safe = true
/// besteffort = false
/// delimiter = ";"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolveOptions {
    /// Reject I/O operations in expressions
    pub safe: bool,
    /// Keep unresolvable host paths and names as text
    pub besteffort: bool,
    /// Separator for array values given as text
    pub delimiter: String,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            safe: true,
            besteffort: true,
            delimiter: ",".to_string(),
        }
    }
}

impl ResolveOptions {
    /// Parse options from TOML text.
    pub fn from_toml(text: &str) -> Result<Self> {
        let options: Self = toml::from_str(text)?;
        options.validate()?;
        Ok(options)
    }

    pub fn validate(&self) -> Result<()> {
        if self.delimiter.is_empty() {
            return Err(Error::InvalidOptions {
                message: "delimiter must not be empty".to_string(),
            });
        }
        Ok(())
    }

    pub fn eval_options(&self) -> EvalOptions {
        EvalOptions {
            safe: self.safe,
            besteffort: self.besteffort,
        }
    }

    pub fn coercer(&self) -> Coercer {
        Coercer::new(self.delimiter.clone())
    }
}
