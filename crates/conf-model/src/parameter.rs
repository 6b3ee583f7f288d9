//! Parameters and their layer history

use crate::{ParamName, ParamType, ParameterError, Value};

/// A value contributed by an earlier layer under the same identity.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub raw: Value,
    /// Name of the contributing layer, when known
    pub layer: Option<String>,
}

/// A named parameter with its raw value, declared type and resolution state.
///
/// Only the merger changes `raw`, `ptype` and `history`. Resolution only
/// records a resolved value or an error.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    name: ParamName,
    raw: Value,
    ptype: Option<ParamType>,
    layer: Option<String>,
    resolved: Option<Value>,
    error: Option<ParameterError>,
    history: Vec<HistoryEntry>,
}

impl Parameter {
    pub fn new(name: ParamName, raw: impl Into<Value>) -> Self {
        Self {
            name,
            raw: raw.into(),
            ptype: None,
            layer: None,
            resolved: None,
            error: None,
            history: Vec::new(),
        }
    }

    /// Create a literal-named parameter.
    pub fn literal(name: impl Into<String>, raw: impl Into<Value>) -> Self {
        Self::new(ParamName::literal(name), raw)
    }

    pub fn with_type(mut self, ptype: ParamType) -> Self {
        self.ptype = Some(ptype);
        self
    }

    pub fn with_layer(mut self, layer: impl Into<String>) -> Self {
        self.layer = Some(layer.into());
        self
    }

    pub fn name(&self) -> &ParamName {
        &self.name
    }

    pub fn raw(&self) -> &Value {
        &self.raw
    }

    pub fn ptype(&self) -> Option<&ParamType> {
        self.ptype.as_ref()
    }

    /// Layer that contributed the current raw value.
    pub fn layer(&self) -> Option<&str> {
        self.layer.as_deref()
    }

    pub fn resolved(&self) -> Option<&Value> {
        self.resolved.as_ref()
    }

    pub fn error(&self) -> Option<&ParameterError> {
        self.error.as_ref()
    }

    /// Earlier raw values, oldest first. The current raw value is not included.
    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    /// Raw value `back` layers before the current one; `0` is the current value.
    pub fn raw_at(&self, back: usize) -> Option<&Value> {
        if back == 0 {
            return Some(&self.raw);
        }
        let len = self.history.len();
        if back > len {
            return None;
        }
        Some(&self.history[len - back].raw)
    }

    /// Replace the raw value with one from a later layer.
    ///
    /// The current raw value moves into history. A declared type survives
    /// unless the later layer supplies its own.
    pub fn override_with(&mut self, raw: Value, ptype: Option<ParamType>, layer: Option<String>) {
        let previous = std::mem::replace(&mut self.raw, raw);
        let previous_layer = std::mem::replace(&mut self.layer, layer);
        self.history.push(HistoryEntry {
            raw: previous,
            layer: previous_layer,
        });
        if ptype.is_some() {
            self.ptype = ptype;
        }
    }

    /// Spawn a literal parameter from this template.
    ///
    /// The new parameter takes the incoming raw value, the incoming type or
    /// else the template's, and starts with an empty history.
    pub fn instantiate(
        &self,
        name: impl Into<String>,
        raw: Value,
        ptype: Option<ParamType>,
        layer: Option<String>,
    ) -> Self {
        Self {
            name: ParamName::literal(name),
            raw,
            ptype: ptype.or_else(|| self.ptype.clone()),
            layer,
            resolved: None,
            error: None,
            history: Vec::new(),
        }
    }

    pub fn record_success(&mut self, value: Value) {
        self.resolved = Some(value);
        self.error = None;
    }

    /// Attach a failure. Any previously resolved value is kept as last known good.
    pub fn record_failure(&mut self, error: ParameterError) {
        self.error = Some(error);
    }

    /// Forget any resolution state.
    pub fn clear_resolution(&mut self) {
        self.resolved = None;
        self.error = None;
    }
}
