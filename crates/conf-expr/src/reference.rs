//! Reference token grammar
//!
//! `@[resource/][category.][dots]name`
//!
//! - `@p` names `p` in the current category
//! - `@C.p` names `p` in category `C`
//! - `@app.ini/C.p` names the value of `C.p` contributed by resource `app.ini`
//! - each dot before the name steps one layer back: `@.p` is the previous
//!   value of `p`, `@C..p` the one before the previous value of `C.p`

use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

static REFERENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^@(?:(?P<resource>[\w.-]+)/)?(?:(?P<category>\w+)\.)?(?P<history>\.*)(?P<name>\w+)")
        .unwrap()
});

/// A parsed `@` reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Reference {
    pub resource: Option<String>,
    pub category: Option<String>,
    /// Layers back from the current value; `0` is the current value
    pub back: usize,
    pub name: String,
}

impl Reference {
    /// Match a reference at the start of `text`, which must begin with `@`.
    ///
    /// Returns the reference and the number of bytes it spans.
    pub fn match_at(text: &str) -> Option<(Reference, usize)> {
        let caps = REFERENCE.captures(text)?;
        let whole = caps.get(0)?;
        let reference = Reference {
            resource: caps.name("resource").map(|m| m.as_str().to_string()),
            category: caps.name("category").map(|m| m.as_str().to_string()),
            back: caps.name("history").map_or(0, |m| m.as_str().len()),
            name: caps.name("name")?.as_str().to_string(),
        };
        Some((reference, whole.end()))
    }

    /// Parse a complete reference token, with or without the leading `@`.
    pub fn parse(text: &str) -> Option<Reference> {
        let owned;
        let text = if text.starts_with('@') {
            text
        } else {
            owned = format!("@{}", text);
            &owned
        };
        match Self::match_at(text) {
            Some((reference, len)) if len == text.len() => Some(reference),
            _ => None,
        }
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@")?;
        if let Some(resource) = &self.resource {
            write!(f, "{}/", resource)?;
        }
        if let Some(category) = &self.category {
            write!(f, "{}.", category)?;
        }
        write!(f, "{}{}", ".".repeat(self.back), self.name)
    }
}
