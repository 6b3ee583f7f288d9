//! Expression tree

use crate::reference::Reference;
use conf_model::Value;

/// Deepest expression tree the parser builds and the evaluator walks.
pub const MAX_DEPTH: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Pos,
    Not,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Or,
    And,
    Eq,
    NotEq,
    Lt,
    Le,
    Gt,
    Ge,
    In,
    NotIn,
    Add,
    Sub,
    Mul,
    Div,
    FloorDiv,
    Mod,
}

impl BinaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Or => "or",
            BinaryOp::And => "and",
            BinaryOp::Eq => "==",
            BinaryOp::NotEq => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
            BinaryOp::In => "in",
            BinaryOp::NotIn => "not in",
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::FloorDiv => "//",
            BinaryOp::Mod => "%",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(Value),
    Reference(Reference),
    Name(String),
    Attribute {
        target: Box<Expr>,
        name: String,
    },
    Index {
        target: Box<Expr>,
        index: Box<Expr>,
    },
    Call {
        func: Box<Expr>,
        args: Vec<Expr>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    List(Vec<Expr>),
    Map(Vec<(Expr, Expr)>),
}

impl Expr {
    /// The dotted path when this is a name or a chain of attributes on a name.
    pub fn path(&self) -> Option<Vec<String>> {
        match self {
            Expr::Name(name) => Some(vec![name.clone()]),
            Expr::Attribute { target, name } => {
                let mut path = target.path()?;
                path.push(name.clone());
                Some(path)
            }
            _ => None,
        }
    }

    /// Height of the tree, a lone literal being 1.
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut pending = vec![(self, 1)];
        while let Some((expr, depth)) = pending.pop() {
            deepest = deepest.max(depth);
            let next = depth + 1;
            match expr {
                Expr::Literal(_) | Expr::Reference(_) | Expr::Name(_) => {}
                Expr::Attribute { target, .. } => pending.push((target.as_ref(), next)),
                Expr::Unary { operand, .. } => pending.push((operand.as_ref(), next)),
                Expr::Index { target, index } => {
                    pending.push((target.as_ref(), next));
                    pending.push((index.as_ref(), next));
                }
                Expr::Binary { lhs, rhs, .. } => {
                    pending.push((lhs.as_ref(), next));
                    pending.push((rhs.as_ref(), next));
                }
                Expr::Call { func, args } => {
                    pending.push((func.as_ref(), next));
                    pending.extend(args.iter().map(|arg| (arg, next)));
                }
                Expr::List(items) => pending.extend(items.iter().map(|item| (item, next))),
                Expr::Map(entries) => {
                    for (key, value) in entries {
                        pending.push((key, next));
                        pending.push((value, next));
                    }
                }
            }
        }
        deepest
    }
}
