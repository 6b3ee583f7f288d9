//! Value coercion to declared types

use crate::{ParamType, ParameterError, Value};
use indexmap::IndexMap;

/// Tokens read as `true`, compared case-insensitively.
pub const TRUTHY: &[&str] = &["true", "1", "yes", "on", "y", "t"];

/// Tokens read as `false`, compared case-insensitively.
pub const FALSY: &[&str] = &["false", "0", "no", "off", "n", "f", ""];

/// Converts resolved values to their declared [`ParamType`].
///
/// Coercing a value that already has the target type returns it unchanged.
#[derive(Debug, Clone)]
pub struct Coercer {
    delimiter: String,
}

impl Default for Coercer {
    fn default() -> Self {
        Self::new(",")
    }
}

impl Coercer {
    /// Create a coercer splitting array text on `delimiter`.
    pub fn new(delimiter: impl Into<String>) -> Self {
        Self {
            delimiter: delimiter.into(),
        }
    }

    pub fn delimiter(&self) -> &str {
        &self.delimiter
    }

    /// Coerce `value` to `ptype`. Without a declared type the value is returned as is.
    pub fn coerce(
        &self,
        value: Value,
        ptype: Option<&ParamType>,
    ) -> Result<Value, ParameterError> {
        let Some(ptype) = ptype else {
            return Ok(value);
        };
        if value.is_null() {
            return Ok(value);
        }

        match ptype {
            ParamType::Bool => to_bool(value),
            ParamType::Int => to_int(value),
            ParamType::Float => to_float(value),
            ParamType::Str => Ok(match value {
                Value::Str(s) => Value::Str(s),
                other => Value::Str(other.to_string()),
            }),
            ParamType::Map => to_map(value),
            ParamType::Array(element) => self.to_array(value, element),
        }
    }

    fn to_array(&self, value: Value, element: &ParamType) -> Result<Value, ParameterError> {
        let items = match value {
            Value::Array(items) => items,
            Value::Str(text) => self.split(&text, element)?,
            scalar => vec![scalar],
        };
        items
            .into_iter()
            .map(|item| self.coerce(item, Some(element)))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array)
    }

    fn split(&self, text: &str, element: &ParamType) -> Result<Vec<Value>, ParameterError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Ok(Vec::new());
        }
        if trimmed.starts_with('[') {
            return match serde_json::from_str::<serde_json::Value>(trimmed) {
                Ok(serde_json::Value::Array(items)) => {
                    Ok(items.into_iter().map(Value::from_json).collect())
                }
                Ok(_) | Err(_) => Err(conversion(
                    text,
                    &ParamType::array_of(element.clone()),
                    "not a JSON array",
                )),
            };
        }
        Ok(trimmed
            .split(self.delimiter.as_str())
            .map(|part| Value::Str(part.trim().to_string()))
            .collect())
    }
}

fn conversion(value: impl ToString, target: &ParamType, reason: &str) -> ParameterError {
    ParameterError::TypeConversion {
        value: value.to_string(),
        target: target.to_string(),
        reason: reason.to_string(),
    }
}

fn to_bool(value: Value) -> Result<Value, ParameterError> {
    match value {
        Value::Bool(b) => Ok(Value::Bool(b)),
        Value::Int(0) => Ok(Value::Bool(false)),
        Value::Int(1) => Ok(Value::Bool(true)),
        Value::Str(ref s) => {
            let token = s.trim().to_ascii_lowercase();
            if TRUTHY.contains(&token.as_str()) {
                Ok(Value::Bool(true))
            } else if FALSY.contains(&token.as_str()) {
                Ok(Value::Bool(false))
            } else {
                Err(conversion(&value, &ParamType::Bool, "not a boolean token"))
            }
        }
        other => Err(conversion(&other, &ParamType::Bool, "not a boolean")),
    }
}

fn to_int(value: Value) -> Result<Value, ParameterError> {
    match value {
        Value::Int(i) => Ok(Value::Int(i)),
        Value::Bool(b) => Ok(Value::Int(i64::from(b))),
        Value::Float(f) => float_to_int(f).ok_or_else(|| {
            conversion(Value::Float(f), &ParamType::Int, "not an integral number")
        }),
        Value::Str(ref s) => {
            let text = s.trim();
            if let Ok(i) = text.parse::<i64>() {
                return Ok(Value::Int(i));
            }
            text.parse::<f64>()
                .ok()
                .and_then(float_to_int)
                .ok_or_else(|| conversion(&value, &ParamType::Int, "not an integer"))
        }
        other => Err(conversion(&other, &ParamType::Int, "not a number")),
    }
}

fn float_to_int(f: f64) -> Option<Value> {
    if f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
        Some(Value::Int(f as i64))
    } else {
        None
    }
}

fn to_float(value: Value) -> Result<Value, ParameterError> {
    match value {
        Value::Float(f) => Ok(Value::Float(f)),
        Value::Int(i) => Ok(Value::Float(i as f64)),
        Value::Bool(b) => Ok(Value::Float(if b { 1.0 } else { 0.0 })),
        Value::Str(ref s) => match s.trim().parse::<f64>() {
            Ok(f) if f.is_nan() => Err(conversion(&value, &ParamType::Float, "not a number")),
            Ok(f) => Ok(Value::Float(f)),
            Err(e) => Err(conversion(&value, &ParamType::Float, &e.to_string())),
        },
        other => Err(conversion(&other, &ParamType::Float, "not a number")),
    }
}

fn to_map(value: Value) -> Result<Value, ParameterError> {
    match value {
        Value::Map(map) => Ok(Value::Map(map)),
        Value::Str(ref s) => {
            let text = s.trim();
            if text.is_empty() {
                return Ok(Value::Map(IndexMap::new()));
            }
            match serde_json::from_str::<serde_json::Value>(text) {
                Ok(json @ serde_json::Value::Object(_)) => Ok(Value::from_json(json)),
                Ok(_) => Err(conversion(&value, &ParamType::Map, "not a JSON object")),
                Err(e) => Err(conversion(&value, &ParamType::Map, &e.to_string())),
            }
        }
        other => Err(conversion(&other, &ParamType::Map, "not a mapping")),
    }
}
