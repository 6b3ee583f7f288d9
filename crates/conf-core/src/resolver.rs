//! Reference and expression resolution
//!
//! A resolution pass turns the raw value of every literal parameter into a
//! typed value:
//!
//! - `=expr` or `=lang:expr` evaluates the whole value and keeps the type of
//!   the result
//! - otherwise the value is text in which `@ref`, `#path` and `%expr%` (or
//!   `%lang:expr%`) tokens are replaced by the string form of their value
//! - `\@`, `\#`, `\%`, `\=` and `\\` stand for the character itself
//!
//! The result is then coerced to the parameter's declared type. Within a
//! pass, each parameter is resolved at most once per history depth, and a
//! reference back to a parameter still being resolved is a cycle.

use crate::ResolveOptions;
use crate::host::{HostRegistry, descend};
use conf_expr::{LanguageRegistry, MAX_STRING_LEN, Reference, Scope};
use conf_model::{Coercer, Configuration, Parameter, ParameterError, Value};
use indexmap::IndexMap;
use regex::Regex;
use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

static LANGUAGE_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?P<lang>[A-Za-z_]\w*):").unwrap());

static HOST_PATH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#(?P<path>[A-Za-z_]\w*(?:\.\w+)*)").unwrap());

/// Most parameters one resolution may have in progress at once.
pub const MAX_REFERENCE_DEPTH: usize = 32;

type Outcome = std::result::Result<Value, ParameterError>;

/// Resolves raw parameter values against a configuration.
#[derive(Debug)]
pub struct Resolver {
    options: ResolveOptions,
    coercer: Coercer,
    languages: LanguageRegistry,
    host: HostRegistry,
}

impl Resolver {
    /// Create a resolver with the built-in expression languages and no host values.
    pub fn new(options: ResolveOptions) -> Self {
        Self {
            coercer: options.coercer(),
            options,
            languages: LanguageRegistry::with_builtins(),
            host: HostRegistry::new(),
        }
    }

    pub fn with_languages(mut self, languages: LanguageRegistry) -> Self {
        self.languages = languages;
        self
    }

    pub fn with_host(mut self, host: HostRegistry) -> Self {
        self.host = host;
        self
    }

    pub fn options(&self) -> &ResolveOptions {
        &self.options
    }

    pub fn languages(&self) -> &LanguageRegistry {
        &self.languages
    }

    pub fn languages_mut(&mut self) -> &mut LanguageRegistry {
        &mut self.languages
    }

    pub fn host(&self) -> &HostRegistry {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut HostRegistry {
        &mut self.host
    }

    /// Resolve every literal parameter of every literal category.
    pub fn resolve(&self, conf: &mut Configuration) -> Resolution {
        self.resolve_with(conf, None)
    }

    /// Resolve every literal parameter, exposing `configurable` to
    /// expressions under the `configurable.` prefix.
    ///
    /// Only the resolved value and error of each parameter are written back.
    /// A failed parameter keeps its last known good value.
    pub fn resolve_with(
        &self,
        conf: &mut Configuration,
        configurable: Option<&IndexMap<String, Value>>,
    ) -> Resolution {
        let outcomes: Vec<(String, String, Outcome)> = {
            let snapshot: &Configuration = conf;
            let keys: Vec<(String, String)> = snapshot
                .literal_params()
                .map(|(category, param)| (category.to_string(), param.name().to_string()))
                .collect();
            let mut pass = Pass::new(self, snapshot, configurable);
            keys.into_iter()
                .map(|(category, name)| {
                    let outcome = pass.resolve(Key::new(&category, &name, 0));
                    (category, name, outcome)
                })
                .collect()
        };

        let mut resolution = Resolution::default();
        for (category, name, outcome) in outcomes {
            let Some(param) = conf.get_mut(&category).and_then(|c| c.get_mut(&name)) else {
                continue;
            };
            match outcome {
                Ok(value) => {
                    param.record_success(value.clone());
                    resolution.values.insert((category, name), value);
                }
                Err(error) => {
                    tracing::warn!(%category, parameter = %name, %error, "Parameter failed to resolve");
                    resolution.errors.push(ResolutionError {
                        last_known_good: param.resolved().cloned(),
                        category,
                        parameter: name,
                        error: error.clone(),
                    });
                    param.record_failure(error);
                }
            }
        }

        tracing::debug!(
            resolved = resolution.values.len(),
            failed = resolution.errors.len(),
            "Resolution pass complete"
        );
        resolution
    }

    /// Resolve a single parameter and record the outcome on it.
    pub fn resolve_parameter(
        &self,
        conf: &mut Configuration,
        category: &str,
        name: &str,
    ) -> Outcome {
        let outcome = Pass::new(self, conf, None).resolve(Key::new(category, name, 0));
        if let Some(param) = conf.get_mut(category).and_then(|c| c.get_mut(name)) {
            match &outcome {
                Ok(value) => param.record_success(value.clone()),
                Err(error) => param.record_failure(error.clone()),
            }
        }
        outcome
    }

    /// Resolve a raw value as if it were a parameter of `category`, without
    /// storing it or coercing the result.
    pub fn resolve_value(&self, conf: &Configuration, category: &str, raw: &Value) -> Outcome {
        Pass::new(self, conf, None).resolve_raw(category, raw)
    }
}

impl Default for Resolver {
    fn default() -> Self {
        Self::new(ResolveOptions::default())
    }
}

/// The outcome of a resolution pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Resolution {
    /// Resolved values keyed by (category, parameter), in configuration order
    pub values: IndexMap<(String, String), Value>,
    /// Parameters that failed to resolve
    pub errors: Vec<ResolutionError>,
}

impl Resolution {
    pub fn get(&self, category: &str, parameter: &str) -> Option<&Value> {
        self.values
            .get(&(category.to_string(), parameter.to_string()))
    }

    pub fn error(&self, category: &str, parameter: &str) -> Option<&ParameterError> {
        self.errors
            .iter()
            .find(|e| e.category == category && e.parameter == parameter)
            .map(|e| &e.error)
    }

    /// True when no parameter failed.
    pub fn is_complete(&self) -> bool {
        self.errors.is_empty()
    }

    /// Resolved values of one category, keyed by parameter name.
    pub fn category(&self, category: &str) -> IndexMap<String, Value> {
        self.values
            .iter()
            .filter(|((c, _), _)| c == category)
            .map(|((_, name), value)| (name.clone(), value.clone()))
            .collect()
    }

    /// Category names in order of first appearance.
    pub fn categories(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        let all = self
            .values
            .keys()
            .map(|(c, _)| c.as_str())
            .chain(self.errors.iter().map(|e| e.category.as_str()));
        for name in all {
            if !names.contains(&name) {
                names.push(name);
            }
        }
        names
    }
}

/// A parameter that failed to resolve.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolutionError {
    pub category: String,
    pub parameter: String,
    pub error: ParameterError,
    /// Value from an earlier successful pass
    pub last_known_good: Option<Value>,
}

impl fmt::Display for ResolutionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}: {}", self.category, self.parameter, self.error)
    }
}

/// A parameter at a history depth.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct Key {
    category: String,
    name: String,
    back: usize,
}

impl Key {
    fn new(category: &str, name: &str, back: usize) -> Self {
        Self {
            category: category.to_string(),
            name: name.to_string(),
            back,
        }
    }

    fn label(&self) -> String {
        format!("{}.{}{}", self.category, ".".repeat(self.back), self.name)
    }
}

/// State of one resolution pass.
struct Pass<'a> {
    resolver: &'a Resolver,
    conf: &'a Configuration,
    configurable: Option<&'a IndexMap<String, Value>>,
    memo: HashMap<Key, Outcome>,
    /// Parameters being resolved, outermost first
    stack: Vec<Key>,
}

impl<'a> Pass<'a> {
    fn new(
        resolver: &'a Resolver,
        conf: &'a Configuration,
        configurable: Option<&'a IndexMap<String, Value>>,
    ) -> Self {
        Self {
            resolver,
            conf,
            configurable,
            memo: HashMap::new(),
            stack: Vec::new(),
        }
    }

    fn resolve(&mut self, key: Key) -> Outcome {
        if let Some(outcome) = self.memo.get(&key) {
            return outcome.clone();
        }
        if let Some(start) = self.stack.iter().position(|k| *k == key) {
            let mut chain: Vec<String> = self.stack[start..].iter().map(Key::label).collect();
            chain.push(key.label());
            return Err(ParameterError::CyclicReference { chain });
        }
        if self.stack.len() >= MAX_REFERENCE_DEPTH {
            return Err(ParameterError::reference(
                format!("@{}", key.label()),
                "reference chain too deep",
            ));
        }

        let conf = self.conf;
        let param = conf
            .get(&key.category)
            .and_then(|c| c.get(&key.name))
            .ok_or_else(|| ParameterError::reference(format!("@{}", key.label()), "unknown parameter"))?;
        let raw = param.raw_at(key.back).ok_or_else(|| {
            ParameterError::reference(
                format!("@{}", key.label()),
                format!("no value {} layers back", key.back),
            )
        })?;

        self.stack.push(key.clone());
        let outcome = self
            .resolve_raw(&key.category, raw)
            .and_then(|value| self.resolver.coercer.coerce(value, param.ptype()));
        self.stack.pop();

        tracing::trace!(parameter = %key.label(), ok = outcome.is_ok(), "Resolved parameter");
        self.memo.insert(key, outcome.clone());
        outcome
    }

    fn resolve_raw(&mut self, category: &str, raw: &Value) -> Outcome {
        let Value::Str(text) = raw else {
            return Ok(raw.clone());
        };
        match text.trim_start().strip_prefix('=') {
            Some(body) => {
                let (lang, source) = split_language(body);
                self.evaluate(category, lang, source)
            }
            None => self.expand(category, text).map(Value::Str),
        }
    }

    fn evaluate(&mut self, category: &str, lang: Option<&str>, source: &str) -> Outcome {
        let resolver = self.resolver;
        let options = resolver.options.eval_options();
        let mut scope = PassScope {
            pass: self,
            category,
        };
        resolver
            .languages
            .evaluate(lang, source, &mut scope, &options)
            .map_err(ParameterError::from)
    }

    /// Replace the tokens of a text value.
    fn expand(&mut self, category: &str, text: &str) -> std::result::Result<String, ParameterError> {
        let mut out = String::with_capacity(text.len());
        let mut rest = text;
        while let Some(c) = rest.chars().next() {
            check_text_len(&out)?;
            match c {
                '\\' => match rest[1..].chars().next() {
                    Some(next @ ('@' | '#' | '%' | '=' | '\\')) => {
                        out.push(next);
                        rest = &rest[2..];
                    }
                    _ => {
                        out.push('\\');
                        rest = &rest[1..];
                    }
                },
                '@' => match Reference::match_at(rest) {
                    Some((reference, len)) => {
                        let value = self.resolve_reference(category, &reference)?;
                        out.push_str(&value.to_string());
                        rest = &rest[len..];
                    }
                    None => {
                        out.push('@');
                        rest = &rest[1..];
                    }
                },
                '#' => match HOST_PATH.captures(rest) {
                    Some(caps) => {
                        let path_text = &caps["path"];
                        let path: Vec<String> = path_text.split('.').map(String::from).collect();
                        match self.lookup(&path)? {
                            Some(value) => out.push_str(&value.to_string()),
                            None if self.resolver.options.besteffort => {
                                tracing::debug!(path = path_text, "Unresolved host path kept as text");
                                out.push_str(path_text);
                            }
                            None => {
                                return Err(ParameterError::NameResolution {
                                    name: path_text.to_string(),
                                });
                            }
                        }
                        rest = &rest[caps[0].len()..];
                    }
                    None => {
                        out.push('#');
                        rest = &rest[1..];
                    }
                },
                '%' => match closing_percent(&rest[1..]) {
                    Some(end) => {
                        let body = rest[1..=end].replace("\\%", "%");
                        let (lang, source) = split_language(&body);
                        let value = self.evaluate(category, lang, source)?;
                        out.push_str(&value.to_string());
                        rest = &rest[end + 2..];
                    }
                    None => {
                        out.push('%');
                        rest = &rest[1..];
                    }
                },
                _ => {
                    out.push(c);
                    rest = &rest[c.len_utf8()..];
                }
            }
        }
        check_text_len(&out)?;
        Ok(out)
    }

    fn resolve_reference(&mut self, current: &str, reference: &Reference) -> Outcome {
        let category = reference.category.as_deref().unwrap_or(current);
        let conf = self.conf;
        let param = conf
            .get(category)
            .ok_or_else(|| {
                ParameterError::reference(reference.to_string(), format!("unknown category {}", category))
            })?
            .get(&reference.name)
            .ok_or_else(|| {
                ParameterError::reference(
                    reference.to_string(),
                    format!("unknown parameter {}.{}", category, reference.name),
                )
            })?;

        // Inside a parameter's own history, `@.p` steps back from the depth
        // being resolved rather than from the current value.
        let base = match &reference.resource {
            None => self
                .stack
                .last()
                .filter(|key| reference.back > 0 && key.category == category && key.name == reference.name)
                .map_or(0, |key| key.back),
            Some(resource) => layer_depth(param, resource).ok_or_else(|| {
                ParameterError::reference(reference.to_string(), format!("no value from {}", resource))
            })?,
        };
        let back = base + reference.back;
        if param.raw_at(back).is_none() {
            return Err(ParameterError::reference(
                reference.to_string(),
                format!("no value {} layers back", back),
            ));
        }
        self.resolve(Key::new(category, &reference.name, back))
    }

    /// Look up a dotted name: `conf.CATEGORY[.param[...]]`,
    /// `configurable[.field[...]]` or a host value.
    fn lookup(&mut self, path: &[String]) -> std::result::Result<Option<Value>, ParameterError> {
        match path.split_first() {
            Some((root, rest)) if root == "conf" => self.lookup_conf(rest),
            Some((root, rest)) if root == "configurable" => Ok(self
                .configurable
                .and_then(|fields| lookup_fields(fields, rest))),
            _ => Ok(self.resolver.host.lookup(path)),
        }
    }

    fn lookup_conf(&mut self, path: &[String]) -> std::result::Result<Option<Value>, ParameterError> {
        let Some((category, rest)) = path.split_first() else {
            return Ok(None);
        };
        let conf = self.conf;
        let Some(found) = conf.get(category) else {
            return Ok(None);
        };
        match rest.split_first() {
            None => {
                let mut map = IndexMap::new();
                for param in found.literals() {
                    let name = param.name().as_str();
                    map.insert(name.to_string(), self.resolve(Key::new(category, name, 0))?);
                }
                Ok(Some(Value::Map(map)))
            }
            Some((name, rest)) => {
                if found.get(name).is_none() {
                    return Ok(None);
                }
                let value = self.resolve(Key::new(category, name, 0))?;
                Ok(descend(&value, rest))
            }
        }
    }
}

/// Exposes a pass to the expression evaluator.
struct PassScope<'p, 'a> {
    pass: &'p mut Pass<'a>,
    category: &'p str,
}

impl Scope for PassScope<'_, '_> {
    fn reference(&mut self, reference: &Reference) -> conf_expr::Result<Value> {
        Ok(self.pass.resolve_reference(self.category, reference)?)
    }

    fn lookup(&mut self, path: &[String]) -> conf_expr::Result<Option<Value>> {
        Ok(self.pass.lookup(path)?)
    }
}

fn check_text_len(text: &str) -> std::result::Result<(), ParameterError> {
    if text.len() > MAX_STRING_LEN {
        return Err(ParameterError::evaluation(format!(
            "expanded text exceeds the {} byte limit",
            MAX_STRING_LEN
        )));
    }
    Ok(())
}

fn split_language(body: &str) -> (Option<&str>, &str) {
    match LANGUAGE_PREFIX.captures(body) {
        Some(caps) => {
            let lang = caps.name("lang").map(|m| m.as_str());
            (lang, &body[caps[0].len()..])
        }
        None => (None, body),
    }
}

/// Offset of the `%` closing a non-empty expression, skipping escapes.
fn closing_percent(text: &str) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'%' => return (i > 0).then_some(i),
            _ => i += 1,
        }
    }
    None
}

/// History depth of the value contributed by `layer`, newest first.
fn layer_depth(param: &Parameter, layer: &str) -> Option<usize> {
    if param.layer() == Some(layer) {
        return Some(0);
    }
    param
        .history()
        .iter()
        .rev()
        .position(|entry| entry.layer.as_deref() == Some(layer))
        .map(|i| i + 1)
}

fn lookup_fields(fields: &IndexMap<String, Value>, path: &[String]) -> Option<Value> {
    match path.split_first() {
        None => Some(Value::Map(fields.clone())),
        Some((field, rest)) => descend(fields.get(field)?, rest),
    }
}
