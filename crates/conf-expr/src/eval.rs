//! Tree-walking evaluator

use crate::ast::{BinaryOp, Expr, MAX_DEPTH, UnaryOp};
use crate::builtins;
use crate::reference::Reference;
use crate::{Error, Result};
use conf_model::Value;
use indexmap::IndexMap;

/// Longest string, in bytes, an expression may build.
pub const MAX_STRING_LEN: usize = 1 << 20;

/// Most items an expression may build into one array.
pub const MAX_ARRAY_LEN: usize = 1 << 16;

/// Evaluation policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvalOptions {
    /// Reject I/O operations before evaluating anything
    pub safe: bool,
    /// Unknown dotted names evaluate to their own text instead of failing
    pub besteffort: bool,
}

impl Default for EvalOptions {
    fn default() -> Self {
        Self {
            safe: true,
            besteffort: true,
        }
    }
}

/// Names visible to an expression.
pub trait Scope {
    /// Resolve an `@` reference to a fully resolved value.
    fn reference(&mut self, reference: &Reference) -> Result<Value>;

    /// Look up a dotted path. `Ok(None)` means nothing is bound to it.
    fn lookup(&mut self, path: &[String]) -> Result<Option<Value>>;
}

/// A scope with no references and no names.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyScope;

impl Scope for EmptyScope {
    fn reference(&mut self, reference: &Reference) -> Result<Value> {
        Err(conf_model::ParameterError::reference(
            reference.to_string(),
            "no configuration in scope",
        )
        .into())
    }

    fn lookup(&mut self, _path: &[String]) -> Result<Option<Value>> {
        Ok(None)
    }
}

/// Evaluate a parsed expression.
pub fn evaluate(expr: &Expr, scope: &mut dyn Scope, options: &EvalOptions) -> Result<Value> {
    Evaluator {
        scope,
        options,
        depth: 0,
    }
    .eval(expr)
}

struct Evaluator<'a> {
    scope: &'a mut dyn Scope,
    options: &'a EvalOptions,
    depth: usize,
}

impl Evaluator<'_> {
    fn eval(&mut self, expr: &Expr) -> Result<Value> {
        // Parsed trees are already bounded; hand-built ones may not be
        if self.depth >= MAX_DEPTH {
            return Err(Error::evaluation("expression nested too deeply"));
        }
        self.depth += 1;
        let value = self.eval_node(expr);
        self.depth -= 1;
        value
    }

    fn eval_node(&mut self, expr: &Expr) -> Result<Value> {
        match expr {
            Expr::Literal(value) => Ok(value.clone()),
            Expr::Reference(reference) => self.scope.reference(reference),
            Expr::Name(name) => self.lookup(std::slice::from_ref(name)),
            Expr::Attribute { target, name } => match expr.path() {
                Some(path) => self.lookup(&path),
                None => {
                    let target = self.eval(target)?;
                    member(&target, name)
                }
            },
            Expr::Index { target, index } => {
                let target = self.eval(target)?;
                let index = self.eval(index)?;
                subscript(&target, &index)
            }
            Expr::Call { func, args } => self.call(func, args),
            Expr::Unary { op, operand } => {
                let value = self.eval(operand)?;
                unary(*op, value)
            }
            Expr::Binary {
                op: BinaryOp::And,
                lhs,
                rhs,
            } => {
                let lhs = self.eval(lhs)?;
                if lhs.is_truthy() { self.eval(rhs) } else { Ok(lhs) }
            }
            Expr::Binary {
                op: BinaryOp::Or,
                lhs,
                rhs,
            } => {
                let lhs = self.eval(lhs)?;
                if lhs.is_truthy() { Ok(lhs) } else { self.eval(rhs) }
            }
            Expr::Binary { op, lhs, rhs } => {
                let lhs = self.eval(lhs)?;
                let rhs = self.eval(rhs)?;
                binary(*op, lhs, rhs)
            }
            Expr::List(items) => items
                .iter()
                .map(|item| self.eval(item))
                .collect::<Result<Vec<_>>>()
                .map(Value::Array),
            Expr::Map(entries) => {
                let mut map = IndexMap::new();
                for (key, value) in entries {
                    let key = match self.eval(key)? {
                        Value::Array(_) | Value::Map(_) => {
                            return Err(Error::evaluation("map keys must be scalars"));
                        }
                        Value::Str(s) => s,
                        other => other.to_string(),
                    };
                    let value = self.eval(value)?;
                    map.insert(key, value);
                }
                Ok(Value::Map(map))
            }
        }
    }

    fn lookup(&mut self, path: &[String]) -> Result<Value> {
        if let Some(value) = self.scope.lookup(path)? {
            return Ok(value);
        }
        let text = path.join(".");
        if self.options.besteffort {
            tracing::debug!(path = %text, "Unresolved name kept as text");
            Ok(Value::Str(text))
        } else {
            Err(Error::NameResolution { name: text })
        }
    }

    fn call(&mut self, func: &Expr, args: &[Expr]) -> Result<Value> {
        let name = match func.path() {
            Some(path) => path.join("."),
            None => return Err(Error::evaluation("only builtin functions can be called")),
        };
        if !builtins::is_builtin(&name, self.options) {
            return Err(Error::NameResolution { name });
        }
        let args = args
            .iter()
            .map(|arg| self.eval(arg))
            .collect::<Result<Vec<_>>>()?;
        builtins::call(&name, args)
    }
}

fn member(target: &Value, name: &str) -> Result<Value> {
    match target {
        Value::Map(map) => map
            .get(name)
            .cloned()
            .ok_or_else(|| Error::evaluation(format!("no attribute {:?}", name))),
        other => Err(Error::evaluation(format!(
            "{} has no attribute {:?}",
            other.type_name(),
            name
        ))),
    }
}

fn subscript(target: &Value, index: &Value) -> Result<Value> {
    match (target, index) {
        (Value::Array(items), Value::Int(i)) => position(*i, items.len())
            .map(|i| items[i].clone())
            .ok_or_else(|| Error::evaluation(format!("index {} out of range", i))),
        (Value::Str(s), Value::Int(i)) => {
            let chars: Vec<char> = s.chars().collect();
            position(*i, chars.len())
                .map(|i| Value::Str(chars[i].to_string()))
                .ok_or_else(|| Error::evaluation(format!("index {} out of range", i)))
        }
        (Value::Map(map), Value::Str(key)) => map
            .get(key)
            .cloned()
            .ok_or_else(|| Error::evaluation(format!("key {:?} not found", key))),
        (target, index) => Err(Error::evaluation(format!(
            "cannot index {} with {}",
            target.type_name(),
            index.type_name()
        ))),
    }
}

/// Python-style index, negative counting from the end.
fn position(index: i64, len: usize) -> Option<usize> {
    let len = i64::try_from(len).ok()?;
    let index = if index < 0 { index + len } else { index };
    (0..len).contains(&index).then_some(index as usize)
}

fn unary(op: UnaryOp, value: Value) -> Result<Value> {
    match (op, value) {
        (UnaryOp::Not, value) => Ok(Value::Bool(!value.is_truthy())),
        (UnaryOp::Neg, Value::Int(i)) => i
            .checked_neg()
            .map(Value::Int)
            .ok_or_else(|| Error::evaluation("integer overflow")),
        (UnaryOp::Neg, Value::Float(f)) => Ok(Value::Float(-f)),
        (UnaryOp::Pos, value @ (Value::Int(_) | Value::Float(_))) => Ok(value),
        (_, value) => Err(Error::evaluation(format!(
            "bad operand type for unary operator: {}",
            value.type_name()
        ))),
    }
}

fn binary(op: BinaryOp, lhs: Value, rhs: Value) -> Result<Value> {
    match op {
        BinaryOp::Eq => Ok(Value::Bool(equal(&lhs, &rhs))),
        BinaryOp::NotEq => Ok(Value::Bool(!equal(&lhs, &rhs))),
        BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => {
            let ordering = builtins::compare(&lhs, &rhs).ok_or_else(|| unsupported(op, &lhs, &rhs))?;
            Ok(Value::Bool(match op {
                BinaryOp::Lt => ordering.is_lt(),
                BinaryOp::Le => ordering.is_le(),
                BinaryOp::Gt => ordering.is_gt(),
                _ => ordering.is_ge(),
            }))
        }
        BinaryOp::In => contains(&rhs, &lhs).map(Value::Bool),
        BinaryOp::NotIn => contains(&rhs, &lhs).map(|found| Value::Bool(!found)),
        _ => arithmetic(op, lhs, rhs),
    }
}

/// Equality with integers and floats comparing by numeric value.
fn equal(lhs: &Value, rhs: &Value) -> bool {
    match (lhs, rhs) {
        (Value::Int(a), Value::Float(b)) | (Value::Float(b), Value::Int(a)) => (*a as f64) == *b,
        (Value::Array(a), Value::Array(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(x, y)| equal(x, y))
        }
        _ => lhs == rhs,
    }
}

fn contains(container: &Value, item: &Value) -> Result<bool> {
    match (container, item) {
        (Value::Str(haystack), Value::Str(needle)) => Ok(haystack.contains(needle.as_str())),
        (Value::Array(items), item) => Ok(items.iter().any(|x| equal(x, item))),
        (Value::Map(map), Value::Str(key)) => Ok(map.contains_key(key)),
        _ => Err(unsupported(BinaryOp::In, item, container)),
    }
}

fn unsupported(op: BinaryOp, lhs: &Value, rhs: &Value) -> Error {
    Error::evaluation(format!(
        "unsupported operand types for {}: {} and {}",
        op.symbol(),
        lhs.type_name(),
        rhs.type_name()
    ))
}

fn arithmetic(op: BinaryOp, lhs: Value, rhs: Value) -> Result<Value> {
    match (op, &lhs, &rhs) {
        (BinaryOp::Add, Value::Str(a), Value::Str(b)) => {
            check_string_len(a.len().saturating_add(b.len()))?;
            Ok(Value::Str(format!("{}{}", a, b)))
        }
        (BinaryOp::Add, Value::Array(a), Value::Array(b)) => {
            if a.len().saturating_add(b.len()) > MAX_ARRAY_LEN {
                return Err(Error::evaluation("array too long"));
            }
            Ok(Value::Array(a.iter().chain(b).cloned().collect()))
        }
        (BinaryOp::Mul, Value::Str(s), Value::Int(n)) | (BinaryOp::Mul, Value::Int(n), Value::Str(s)) => {
            repeat(s, *n).map(Value::Str)
        }
        (_, Value::Int(a), Value::Int(b)) => integer(op, *a, *b),
        (_, Value::Int(_) | Value::Float(_), Value::Int(_) | Value::Float(_)) => {
            let a = lhs.as_f64().unwrap_or_default();
            let b = rhs.as_f64().unwrap_or_default();
            float(op, a, b)
        }
        _ => Err(unsupported(op, &lhs, &rhs)),
    }
}

/// `s * n`, empty for a negative count.
fn repeat(s: &str, n: i64) -> Result<String> {
    let count = usize::try_from(n).unwrap_or(0);
    let len = s.len().checked_mul(count).unwrap_or(usize::MAX);
    check_string_len(len)?;
    Ok(s.repeat(count))
}

fn check_string_len(len: usize) -> Result<()> {
    if len > MAX_STRING_LEN {
        return Err(Error::evaluation(format!(
            "string of {} bytes exceeds the {} byte limit",
            len, MAX_STRING_LEN
        )));
    }
    Ok(())
}

fn integer(op: BinaryOp, a: i64, b: i64) -> Result<Value> {
    let overflow = || Error::evaluation("integer overflow");
    let zero = || Error::evaluation("division by zero");
    match op {
        BinaryOp::Add => a.checked_add(b).map(Value::Int).ok_or_else(overflow),
        BinaryOp::Sub => a.checked_sub(b).map(Value::Int).ok_or_else(overflow),
        BinaryOp::Mul => a.checked_mul(b).map(Value::Int).ok_or_else(overflow),
        BinaryOp::Div if b == 0 => Err(zero()),
        BinaryOp::Div => Ok(Value::Float(a as f64 / b as f64)),
        BinaryOp::FloorDiv | BinaryOp::Mod if b == 0 => Err(zero()),
        BinaryOp::FloorDiv => {
            let q = a.checked_div(b).ok_or_else(overflow)?;
            let adjust = a % b != 0 && ((a < 0) != (b < 0));
            Ok(Value::Int(if adjust { q - 1 } else { q }))
        }
        BinaryOp::Mod => {
            let r = a.checked_rem(b).ok_or_else(overflow)?;
            let adjust = r != 0 && ((r < 0) != (b < 0));
            Ok(Value::Int(if adjust { r + b } else { r }))
        }
        _ => Err(unsupported(op, &Value::Int(a), &Value::Int(b))),
    }
}

fn float(op: BinaryOp, a: f64, b: f64) -> Result<Value> {
    match op {
        BinaryOp::Add => Ok(Value::Float(a + b)),
        BinaryOp::Sub => Ok(Value::Float(a - b)),
        BinaryOp::Mul => Ok(Value::Float(a * b)),
        BinaryOp::Div | BinaryOp::FloorDiv | BinaryOp::Mod if b == 0.0 => {
            Err(Error::evaluation("division by zero"))
        }
        BinaryOp::Div => Ok(Value::Float(a / b)),
        BinaryOp::FloorDiv => Ok(Value::Float((a / b).floor())),
        BinaryOp::Mod => Ok(Value::Float(a - b * (a / b).floor())),
        _ => Err(unsupported(op, &Value::Float(a), &Value::Float(b))),
    }
}
