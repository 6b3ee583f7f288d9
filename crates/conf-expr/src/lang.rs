//! Expression languages and their registry

use crate::eval::{self, EvalOptions, Scope};
use crate::{Error, Result, parser, safety};
use conf_model::Value;

/// Name of the built-in restricted language.
pub const EXPR_LANG: &str = "expr";

/// Name of the JSON literal language.
pub const JSON_LANG: &str = "json";

/// A sub-language usable in `=lang:expr` and `%lang:expr%` forms.
pub trait ExprLanguage: Send + Sync {
    /// Name used as the `lang:` prefix.
    fn name(&self) -> &str;

    /// Evaluate `source` against `scope`.
    fn evaluate(&self, source: &str, scope: &mut dyn Scope, options: &EvalOptions)
    -> Result<Value>;
}

/// The restricted arithmetic/lookup language.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExprLang;

impl ExprLanguage for ExprLang {
    fn name(&self) -> &str {
        EXPR_LANG
    }

    fn evaluate(
        &self,
        source: &str,
        scope: &mut dyn Scope,
        options: &EvalOptions,
    ) -> Result<Value> {
        let expr = parser::parse(source)?;
        if options.safe {
            safety::check(&expr)?;
        }
        tracing::trace!(source, "Evaluating expression");
        eval::evaluate(&expr, scope, options)
    }
}

/// JSON literals. References and names are not supported.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonLang;

impl ExprLanguage for JsonLang {
    fn name(&self) -> &str {
        JSON_LANG
    }

    fn evaluate(
        &self,
        source: &str,
        _scope: &mut dyn Scope,
        _options: &EvalOptions,
    ) -> Result<Value> {
        serde_json::from_str::<serde_json::Value>(source)
            .map(Value::from_json)
            .map_err(|e| Error::syntax(offset(source, e.line(), e.column()), e.to_string()))
    }
}

/// Byte offset of a 1-based line/column pair.
fn offset(source: &str, line: usize, column: usize) -> usize {
    let line_start: usize = source
        .split_inclusive('\n')
        .take(line.saturating_sub(1))
        .map(str::len)
        .sum();
    (line_start + column.saturating_sub(1)).min(source.len())
}

/// Registry of expression languages.
///
/// The first registered language is the default.
pub struct LanguageRegistry {
    languages: Vec<Box<dyn ExprLanguage>>,
}

impl LanguageRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            languages: Vec::new(),
        }
    }

    /// Create a registry with `expr` (default) and `json`.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(ExprLang));
        registry.register(Box::new(JsonLang));
        registry
    }

    /// Register a language, replacing any language with the same name in place.
    pub fn register(&mut self, language: Box<dyn ExprLanguage>) {
        match self
            .languages
            .iter_mut()
            .find(|l| l.name() == language.name())
        {
            Some(slot) => *slot = language,
            None => self.languages.push(language),
        }
    }

    /// Get a language by name.
    pub fn get(&self, name: &str) -> Option<&dyn ExprLanguage> {
        self.languages
            .iter()
            .find(|l| l.name() == name)
            .map(|l| l.as_ref())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// The default language.
    pub fn default_language(&self) -> Option<&dyn ExprLanguage> {
        self.languages.first().map(|l| l.as_ref())
    }

    /// Registered names, default first.
    pub fn list(&self) -> Vec<&str> {
        self.languages.iter().map(|l| l.name()).collect()
    }

    /// Evaluate `source` in language `lang`, or the default language.
    pub fn evaluate(
        &self,
        lang: Option<&str>,
        source: &str,
        scope: &mut dyn Scope,
        options: &EvalOptions,
    ) -> Result<Value> {
        let language = match lang {
            Some(name) => self.get(name),
            None => self.default_language(),
        }
        .ok_or_else(|| Error::UnknownLanguage {
            name: lang.unwrap_or_default().to_string(),
        })?;
        language.evaluate(source, scope, options)
    }
}

impl Default for LanguageRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for LanguageRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.list()).finish()
    }
}
