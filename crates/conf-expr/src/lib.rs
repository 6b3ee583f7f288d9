//! Restricted expression language for layered configuration.
//!
//! Expressions appear in parameter values as `=expr` (whole value, typed
//! result) or `%expr%` (substituted into text). The built-in `expr` language
//! supports literals, arithmetic, comparison and boolean operators, attribute
//! and index access, an allowlisted set of builtin functions and `@reference`
//! tokens. It has no statements, assignment or loops.
//!
//! Evaluation never touches the outside world unless [`EvalOptions::safe`] is
//! turned off: in safe mode, any denied name anywhere in the expression is
//! rejected before evaluation starts. Trees deeper than [`MAX_DEPTH`] and
//! strings longer than [`MAX_STRING_LEN`] fail the expression instead of
//! exhausting the stack or memory.
//!
//! # Example
//!
//! ```
//! use conf_expr::{EmptyScope, EvalOptions, LanguageRegistry};
//! use conf_model::Value;
//!
//! let languages = LanguageRegistry::with_builtins();
//! let value = languages
//!     .evaluate(None, "max([1, 5, 3]) * 2.0", &mut EmptyScope, &EvalOptions::default())
//!     .unwrap();
//! assert_eq!(value, Value::Float(10.0));
//! ```

pub mod ast;
pub mod builtins;
pub mod error;
pub mod eval;
pub mod lang;
pub mod lexer;
pub mod parser;
pub mod reference;
pub mod safety;

pub use error::{Error, Result};
pub use ast::MAX_DEPTH;
pub use eval::{EmptyScope, EvalOptions, MAX_ARRAY_LEN, MAX_STRING_LEN, Scope};
pub use lang::{EXPR_LANG, ExprLang, ExprLanguage, JSON_LANG, JsonLang, LanguageRegistry};
pub use parser::parse;
pub use reference::Reference;
