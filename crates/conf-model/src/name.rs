//! Parameter and category names
//!
//! A name is either a literal, identifying exactly one entry, or a regex
//! pattern acting as a template for every literal name it matches.

use crate::{Error, Result};
use regex::Regex;
use std::fmt;

/// Characters whose presence turns a name into a pattern.
const PATTERN_CHARS: &[char] = &[
    '.', '*', '+', '?', '[', ']', '(', ')', '{', '}', '|', '^', '$', '\\',
];

/// A literal name or a regex template.
#[derive(Debug, Clone)]
pub enum ParamName {
    Literal(String),
    Pattern { source: String, regex: Regex },
}

impl ParamName {
    /// Create a literal name.
    pub fn literal(name: impl Into<String>) -> Self {
        ParamName::Literal(name.into())
    }

    /// Create a pattern name. The pattern must match a whole name.
    pub fn pattern(source: impl Into<String>) -> Result<Self> {
        let source = source.into();
        let regex = Regex::new(&format!("^(?:{})$", source)).map_err(|e| Error::InvalidPattern {
            pattern: source.clone(),
            message: e.to_string(),
        })?;
        Ok(ParamName::Pattern { source, regex })
    }

    /// Classify `name` as a pattern when it contains regex metacharacters.
    pub fn parse(name: &str) -> Result<Self> {
        if name.contains(PATTERN_CHARS) {
            Self::pattern(name)
        } else {
            Ok(Self::literal(name))
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ParamName::Literal(name) => name,
            ParamName::Pattern { source, .. } => source,
        }
    }

    pub fn is_pattern(&self) -> bool {
        matches!(self, ParamName::Pattern { .. })
    }

    /// Whether `literal` is identified by this name.
    pub fn matches(&self, literal: &str) -> bool {
        match self {
            ParamName::Literal(name) => name == literal,
            ParamName::Pattern { regex, .. } => regex.is_match(literal),
        }
    }
}

impl PartialEq for ParamName {
    fn eq(&self, other: &Self) -> bool {
        self.is_pattern() == other.is_pattern() && self.as_str() == other.as_str()
    }
}

impl Eq for ParamName {}

impl fmt::Display for ParamName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
