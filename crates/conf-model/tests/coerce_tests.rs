//! Coercion behavior across declared types

use conf_model::{Coercer, ParamType, Value};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn array_of_int() -> ParamType {
    ParamType::array_of(ParamType::Int)
}

#[test]
fn delimited_text_becomes_typed_array() {
    let coercer = Coercer::default();
    let once = coercer
        .coerce(Value::from("1,2,3"), Some(&array_of_int()))
        .unwrap();
    assert_eq!(once, Value::from(vec![1, 2, 3]));

    let twice = coercer.coerce(once.clone(), Some(&array_of_int())).unwrap();
    assert_eq!(twice, once);
}

#[test]
fn nested_arrays_from_json_text() {
    let ptype: ParamType = "array<array<int>>".parse().unwrap();
    let value = Coercer::default()
        .coerce(Value::from("[[1, 2], [3]]"), Some(&ptype))
        .unwrap();
    assert_eq!(
        value,
        Value::Array(vec![Value::from(vec![1, 2]), Value::from(vec![3])])
    );
}

fn scalar_type() -> impl Strategy<Value = ParamType> {
    prop_oneof![
        Just(ParamType::Bool),
        Just(ParamType::Int),
        Just(ParamType::Float),
        Just(ParamType::Str),
    ]
}

fn scalar_text() -> impl Strategy<Value = String> {
    prop_oneof![
        any::<i32>().prop_map(|i| i.to_string()),
        (-1.0e6f64..1.0e6).prop_map(|f| f.to_string()),
        prop::sample::select(vec!["yes", "off", "true", "0", "1"]).prop_map(String::from),
        "[a-z]{0,8}",
    ]
}

proptest! {
    #[test]
    fn integer_lists_parse(items in prop::collection::vec(any::<i64>(), 1..16)) {
        let text = items.iter().map(|i| i.to_string()).collect::<Vec<_>>().join(",");
        let value = Coercer::default().coerce(Value::from(text), Some(&array_of_int())).unwrap();
        prop_assert_eq!(value, Value::Array(items.into_iter().map(Value::Int).collect()));
    }

    #[test]
    fn coercion_is_idempotent(text in scalar_text(), ptype in scalar_type()) {
        let coercer = Coercer::default();
        if let Ok(once) = coercer.coerce(Value::from(text), Some(&ptype)) {
            let twice = coercer.coerce(once.clone(), Some(&ptype)).unwrap();
            prop_assert_eq!(twice, once);
        }
    }

    #[test]
    fn array_coercion_is_idempotent(text in "[a-z0-9 ,]{0,24}") {
        let ptype = ParamType::array_of(ParamType::Str);
        let coercer = Coercer::default();
        let once = coercer.coerce(Value::from(text), Some(&ptype)).unwrap();
        let twice = coercer.coerce(once.clone(), Some(&ptype)).unwrap();
        prop_assert_eq!(twice, once);
    }
}
