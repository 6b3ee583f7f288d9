//! Static safety check run before evaluation in safe mode

use crate::ast::{Expr, MAX_DEPTH};
use crate::{Error, Result};

/// Names rejected anywhere in a call or attribute path when evaluating safely.
pub const DENYLIST: &[&str] = &[
    "open",
    "read",
    "write",
    "file",
    "exec",
    "eval",
    "system",
    "spawn",
    "import",
    "__import__",
    "subprocess",
    "socket",
    "remove",
    "unlink",
    "env",
    "os",
    "sys",
];

/// Roots whose dotted paths read configuration values and nothing else.
pub const DATA_ROOTS: &[&str] = &["conf", "configurable"];

pub fn is_denied(name: &str) -> bool {
    DENYLIST.contains(&name)
}

/// Reject any denied name used as a call target, a name or an attribute.
///
/// A path read under one of the [`DATA_ROOTS`] names parameters and fields,
/// so `conf.IO.read` is allowed while `conf.IO.read()` is not. Nothing in
/// the expression is evaluated.
pub fn check(expr: &Expr) -> Result<()> {
    walk(expr, 0)
}

fn walk(expr: &Expr, depth: usize) -> Result<()> {
    if depth >= MAX_DEPTH {
        return Err(Error::evaluation("expression nested too deeply"));
    }
    let next = depth + 1;
    match expr {
        Expr::Literal(_) | Expr::Reference(_) => Ok(()),
        Expr::Name(name) => deny(name),
        Expr::Attribute { .. } if is_data_path(expr) => Ok(()),
        Expr::Attribute { target, name } => {
            walk(target, next)?;
            deny(name)
        }
        Expr::Index { target, index } => {
            walk(target, next)?;
            walk(index, next)
        }
        Expr::Call { func, args } => {
            match func.path() {
                Some(path) => path.iter().try_for_each(|segment| deny(segment))?,
                None => walk(func, next)?,
            }
            args.iter().try_for_each(|arg| walk(arg, next))
        }
        Expr::Unary { operand, .. } => walk(operand, next),
        Expr::Binary { lhs, rhs, .. } => {
            walk(lhs, next)?;
            walk(rhs, next)
        }
        Expr::List(items) => items.iter().try_for_each(|item| walk(item, next)),
        Expr::Map(entries) => entries.iter().try_for_each(|(key, value)| {
            walk(key, next)?;
            walk(value, next)
        }),
    }
}

fn is_data_path(expr: &Expr) -> bool {
    expr.path()
        .and_then(|path| path.first().cloned())
        .is_some_and(|root| DATA_ROOTS.contains(&root.as_str()))
}

fn deny(name: &str) -> Result<()> {
    if is_denied(name) {
        tracing::warn!(operation = name, "Rejected unsafe expression");
        return Err(Error::Unsafe {
            operation: name.to_string(),
        });
    }
    Ok(())
}
