//! Builtin functions callable from expressions

use crate::eval::EvalOptions;
use crate::{Error, Result};
use conf_model::Value;
use std::cmp::Ordering;

/// Functions always available.
pub const BUILTINS: &[&str] = &[
    "len", "str", "int", "float", "bool", "abs", "min", "max", "round", "upper", "lower", "strip",
    "split", "join", "keys", "values",
];

/// Functions performing I/O, available only when evaluation is not safe.
pub const IO_BUILTINS: &[&str] = &["open", "read", "env"];

pub fn is_builtin(name: &str, options: &EvalOptions) -> bool {
    BUILTINS.contains(&name) || (!options.safe && IO_BUILTINS.contains(&name))
}

/// Call builtin `name`. Callers check [`is_builtin`] first.
pub fn call(name: &str, args: Vec<Value>) -> Result<Value> {
    match name {
        "len" => {
            let [value] = exact::<1>(name, args)?;
            let len = match &value {
                Value::Str(s) => s.chars().count(),
                Value::Array(items) => items.len(),
                Value::Map(map) => map.len(),
                other => return Err(type_error(name, other)),
            };
            Ok(Value::Int(len as i64))
        }
        "str" => {
            let [value] = exact::<1>(name, args)?;
            Ok(Value::Str(value.to_string()))
        }
        "int" => {
            let [value] = exact::<1>(name, args)?;
            match value {
                Value::Int(i) => Ok(Value::Int(i)),
                Value::Bool(b) => Ok(Value::Int(i64::from(b))),
                Value::Float(f) => float_to_int(name, f.trunc()),
                Value::Str(ref s) => s
                    .trim()
                    .parse::<i64>()
                    .map(Value::Int)
                    .map_err(|_| Error::evaluation(format!("invalid literal for int(): {:?}", s))),
                other => Err(type_error(name, &other)),
            }
        }
        "float" => {
            let [value] = exact::<1>(name, args)?;
            match value {
                Value::Float(f) => Ok(Value::Float(f)),
                Value::Int(i) => Ok(Value::Float(i as f64)),
                Value::Bool(b) => Ok(Value::Float(if b { 1.0 } else { 0.0 })),
                Value::Str(ref s) => s
                    .trim()
                    .parse::<f64>()
                    .map(Value::Float)
                    .map_err(|_| Error::evaluation(format!("invalid literal for float(): {:?}", s))),
                other => Err(type_error(name, &other)),
            }
        }
        "bool" => {
            let [value] = exact::<1>(name, args)?;
            Ok(Value::Bool(value.is_truthy()))
        }
        "abs" => {
            let [value] = exact::<1>(name, args)?;
            match value {
                Value::Int(i) => i
                    .checked_abs()
                    .map(Value::Int)
                    .ok_or_else(|| Error::evaluation("integer overflow in abs()")),
                Value::Float(f) => Ok(Value::Float(f.abs())),
                other => Err(type_error(name, &other)),
            }
        }
        "min" | "max" => extremum(name, args),
        "round" => round(args),
        "upper" | "lower" | "strip" => {
            let [value] = exact::<1>(name, args)?;
            let text = string_arg(name, &value)?;
            Ok(Value::Str(match name {
                "upper" => text.to_uppercase(),
                "lower" => text.to_lowercase(),
                _ => text.trim().to_string(),
            }))
        }
        "split" => {
            let (text, sep) = match args.as_slice() {
                [text] => (string_arg(name, text)?, None),
                [text, sep] => (string_arg(name, text)?, Some(string_arg(name, sep)?)),
                _ => return Err(arity(name, "1 or 2", args.len())),
            };
            let parts: Vec<Value> = match sep {
                Some("") => return Err(Error::evaluation("split() separator is empty")),
                Some(sep) => text.split(sep).map(Value::from).collect(),
                None => text.split_whitespace().map(Value::from).collect(),
            };
            Ok(Value::Array(parts))
        }
        "join" => {
            let (items, sep) = match args.as_slice() {
                [items] => (items, ","),
                [items, sep] => (items, string_arg(name, sep)?),
                _ => return Err(arity(name, "1 or 2", args.len())),
            };
            let Value::Array(items) = items else {
                return Err(type_error(name, items));
            };
            let parts: Vec<String> = items.iter().map(Value::to_string).collect();
            Ok(Value::Str(parts.join(sep)))
        }
        "keys" | "values" => {
            let [value] = exact::<1>(name, args)?;
            let map = match value {
                Value::Map(map) => map,
                other => return Err(type_error(name, &other)),
            };
            Ok(Value::Array(if name == "keys" {
                map.into_keys().map(Value::Str).collect()
            } else {
                map.into_values().collect()
            }))
        }
        "open" | "read" => {
            let [path] = exact::<1>(name, args)?;
            let path = string_arg(name, &path)?;
            tracing::debug!(path, "Reading file from expression");
            std::fs::read_to_string(path)
                .map(Value::Str)
                .map_err(|e| Error::evaluation(format!("{}({:?}): {}", name, path, e)))
        }
        "env" => {
            let [var] = exact::<1>(name, args)?;
            let var = string_arg(name, &var)?;
            Ok(std::env::var(var).map(Value::Str).unwrap_or(Value::Null))
        }
        _ => Err(Error::NameResolution {
            name: name.to_string(),
        }),
    }
}

fn exact<const N: usize>(name: &str, args: Vec<Value>) -> Result<[Value; N]> {
    let count = args.len();
    args.try_into()
        .map_err(|_| arity(name, &N.to_string(), count))
}

fn arity(name: &str, expected: &str, got: usize) -> Error {
    Error::evaluation(format!(
        "{}() takes {} argument(s), {} given",
        name, expected, got
    ))
}

fn type_error(name: &str, value: &Value) -> Error {
    Error::evaluation(format!(
        "{}() does not accept {}",
        name,
        value.type_name()
    ))
}

fn string_arg<'a>(name: &str, value: &'a Value) -> Result<&'a str> {
    value.as_str().ok_or_else(|| type_error(name, value))
}

/// Order numbers with numbers and strings with strings.
pub(crate) fn compare(lhs: &Value, rhs: &Value) -> Option<Ordering> {
    match (lhs, rhs) {
        (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
        (Value::Str(a), Value::Str(b)) => Some(a.cmp(b)),
        (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
        _ => match (lhs.as_f64(), rhs.as_f64()) {
            (Some(a), Some(b)) if is_number(lhs) && is_number(rhs) => a.partial_cmp(&b),
            _ => None,
        },
    }
}

fn is_number(value: &Value) -> bool {
    matches!(value, Value::Int(_) | Value::Float(_))
}

fn extremum(name: &str, args: Vec<Value>) -> Result<Value> {
    let items = match <[Value; 1]>::try_from(args) {
        Ok([Value::Array(items)]) => items,
        Ok([single]) => vec![single],
        Err(args) => args,
    };
    let mut iter = items.into_iter();
    let Some(mut best) = iter.next() else {
        return Err(Error::evaluation(format!("{}() of an empty sequence", name)));
    };
    for item in iter {
        let ordering = compare(&item, &best).ok_or_else(|| {
            Error::evaluation(format!(
                "{}() cannot compare {} and {}",
                name,
                item.type_name(),
                best.type_name()
            ))
        })?;
        let better = if name == "min" {
            ordering == Ordering::Less
        } else {
            ordering == Ordering::Greater
        };
        if better {
            best = item;
        }
    }
    Ok(best)
}

/// Convert a float with no fractional part, rejecting values `i64` cannot hold.
fn float_to_int(name: &str, f: f64) -> Result<Value> {
    // i64::MIN is exactly representable, i64::MAX rounds up to 2^63
    if f.is_finite() && f >= i64::MIN as f64 && f < i64::MAX as f64 {
        Ok(Value::Int(f as i64))
    } else {
        Err(Error::evaluation(format!("{}() cannot convert {} to an integer", name, f)))
    }
}

fn round(args: Vec<Value>) -> Result<Value> {
    match args.as_slice() {
        [Value::Int(i)] => Ok(Value::Int(*i)),
        [Value::Float(f)] => float_to_int("round", f.round()),
        [value, Value::Int(digits)] if is_number(value) => {
            let factor = 10f64.powi(i32::try_from(*digits).unwrap_or(i32::MAX).min(15));
            let f = value.as_f64().unwrap_or_default();
            Ok(Value::Float((f * factor).round() / factor))
        }
        [value] | [value, _] => Err(type_error("round", value)),
        _ => Err(arity("round", "1 or 2", args.len())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn run(name: &str, args: Vec<Value>) -> Value {
        call(name, args).unwrap()
    }

    #[rstest]
    #[case("len", vec![Value::from("héllo")], Value::Int(5))]
    #[case("str", vec![Value::Float(2.0)], Value::from("2.0"))]
    #[case("int", vec![Value::from(" 42 ")], Value::Int(42))]
    #[case("int", vec![Value::Float(-2.7)], Value::Int(-2))]
    #[case("float", vec![Value::Int(3)], Value::Float(3.0))]
    #[case("bool", vec![Value::from("")], Value::Bool(false))]
    #[case("abs", vec![Value::Int(-4)], Value::Int(4))]
    #[case("min", vec![Value::Int(3), Value::Float(1.5)], Value::Float(1.5))]
    #[case("max", vec![Value::from(vec![1, 7, 3])], Value::Int(7))]
    #[case("round", vec![Value::Float(2.5)], Value::Int(3))]
    #[case("round", vec![Value::Float(1.23456), Value::Int(2)], Value::Float(1.23))]
    #[case("upper", vec![Value::from("abc")], Value::from("ABC"))]
    #[case("strip", vec![Value::from("  x ")], Value::from("x"))]
    #[case("split", vec![Value::from("a b  c")], Value::from(vec!["a", "b", "c"]))]
    #[case("split", vec![Value::from("a;b"), Value::from(";")], Value::from(vec!["a", "b"]))]
    #[case("join", vec![Value::from(vec![1, 2]), Value::from("-")], Value::from("1-2"))]
    fn builtin_results(#[case] name: &str, #[case] args: Vec<Value>, #[case] expected: Value) {
        assert_eq!(run(name, args), expected);
    }

    #[test]
    fn keys_and_values_keep_order() {
        let map = Value::from_json(serde_json::json!({"b": 1, "a": 2}));
        assert_eq!(run("keys", vec![map.clone()]), Value::from(vec!["b", "a"]));
        assert_eq!(run("values", vec![map]), Value::from(vec![1, 2]));
    }

    #[test]
    fn wrong_arity_and_types_fail() {
        assert!(matches!(call("len", vec![]), Err(Error::Evaluation { .. })));
        assert!(matches!(call("len", vec![Value::Int(1)]), Err(Error::Evaluation { .. })));
        assert!(matches!(call("min", vec![]), Err(Error::Evaluation { .. })));
        assert!(matches!(
            call("max", vec![Value::Int(1), Value::from("a")]),
            Err(Error::Evaluation { .. })
        ));
    }

    #[rstest]
    #[case("int", 1e19)]
    #[case("int", -1e19)]
    #[case("int", f64::INFINITY)]
    #[case("int", f64::NAN)]
    #[case("round", 9.3e18)]
    fn out_of_range_floats_do_not_saturate(#[case] name: &str, #[case] f: f64) {
        assert!(matches!(
            call(name, vec![Value::Float(f)]),
            Err(Error::Evaluation { .. })
        ));
    }

    #[test]
    fn int_accepts_the_extremes_it_can_hold() {
        assert_eq!(run("int", vec![Value::Float(-9.223372036854775808e18)]), Value::Int(i64::MIN));
        assert_eq!(run("int", vec![Value::Float(9.0e18)]), Value::Int(9_000_000_000_000_000_000));
    }

    #[test]
    fn io_builtins_depend_on_safety() {
        let safe = EvalOptions::default();
        let unsafe_opts = EvalOptions {
            safe: false,
            ..EvalOptions::default()
        };
        assert!(!is_builtin("open", &safe));
        assert!(is_builtin("open", &unsafe_opts));
        assert!(is_builtin("len", &safe));
    }

    #[test]
    fn read_returns_file_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("value.txt");
        std::fs::write(&path, "from disk").unwrap();
        let value = run("read", vec![Value::from(path.to_string_lossy().as_ref())]);
        assert_eq!(value, Value::from("from disk"));
    }
}
