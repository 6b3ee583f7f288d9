//! Integration tests for the expression languages

use conf_expr::{EmptyScope, Error, EvalOptions, LanguageRegistry, Reference, Result, Scope};
use conf_model::{ParameterError, Value};
use rstest::rstest;
use std::collections::HashMap;

struct FakeScope {
    params: HashMap<String, Value>,
    reads: Vec<String>,
}

impl FakeScope {
    fn new() -> Self {
        let mut params = HashMap::new();
        params.insert("six".to_string(), Value::Int(6));
        params.insert("name".to_string(), Value::from("svc"));
        params.insert("ports".to_string(), Value::from(vec![80, 443]));
        Self {
            params,
            reads: Vec::new(),
        }
    }
}

impl Scope for FakeScope {
    fn reference(&mut self, reference: &Reference) -> Result<Value> {
        self.reads.push(reference.to_string());
        self.params
            .get(&reference.name)
            .cloned()
            .ok_or_else(|| ParameterError::reference(reference.to_string(), "unknown parameter").into())
    }

    fn lookup(&mut self, path: &[String]) -> Result<Option<Value>> {
        Ok(match path {
            [root, key] if root == "configurable" => self.params.get(key).cloned(),
            _ => None,
        })
    }
}

fn eval(source: &str, options: EvalOptions) -> Result<Value> {
    LanguageRegistry::with_builtins().evaluate(None, source, &mut FakeScope::new(), &options)
}

#[rstest]
#[case("@six * 2.0", Value::Float(12.0))]
#[case("@six * 2", Value::Int(12))]
#[case("upper(@name) + '-' + str(len(@ports))", Value::from("SVC-2"))]
#[case("443 in @ports", Value::Bool(true))]
#[case("@ports[0] + configurable.six", Value::Int(86))]
#[case("{'host': @name, 'port': @ports[-1]}['port']", Value::Int(443))]
fn test_expressions_with_scope(#[case] source: &str, #[case] expected: Value) {
    assert_eq!(eval(source, EvalOptions::default()).unwrap(), expected);
}

#[test]
fn test_unsafe_call_does_not_run() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("secret.txt");
    std::fs::write(&path, "secret").unwrap();

    let source = format!("open({:?})", path.to_string_lossy());
    let mut scope = FakeScope::new();
    let err = LanguageRegistry::with_builtins()
        .evaluate(None, &format!("@six + len({})", source), &mut scope, &EvalOptions::default())
        .unwrap_err();

    assert_eq!(err, Error::Unsafe { operation: "open".into() });
    // Rejected before evaluation, so no reference was followed either
    assert!(scope.reads.is_empty());

    let relaxed = EvalOptions {
        safe: false,
        ..EvalOptions::default()
    };
    assert_eq!(eval(&source, relaxed).unwrap(), Value::from("secret"));
}

#[test]
fn test_denied_names_fail_even_without_calls() {
    let err = eval("os.environ", EvalOptions::default()).unwrap_err();
    assert_eq!(err, Error::Unsafe { operation: "os".into() });
}

#[test]
fn test_best_effort_and_strict_names() {
    assert_eq!(
        eval("unknown.module.path", EvalOptions::default()).unwrap(),
        Value::from("unknown.module.path")
    );
    let strict = EvalOptions {
        besteffort: false,
        ..EvalOptions::default()
    };
    assert_eq!(
        eval("unknown.module.path", strict).unwrap_err(),
        Error::NameResolution {
            name: "unknown.module.path".into()
        }
    );
}

#[test]
fn test_reference_errors_pass_through_unchanged() {
    let err = eval("@missing + 1", EvalOptions::default()).unwrap_err();
    assert_eq!(
        ParameterError::from(err),
        ParameterError::reference("@missing", "unknown parameter")
    );
}

#[test]
fn test_syntax_errors() {
    let err = eval("1 +* 2", EvalOptions::default()).unwrap_err();
    insta::assert_snapshot!(err.to_string(), @"Syntax error at offset 3: unexpected token");

    let err = LanguageRegistry::with_builtins()
        .evaluate(None, "", &mut EmptyScope, &EvalOptions::default())
        .unwrap_err();
    assert!(matches!(err, Error::Syntax { position: 0, .. }));
}
