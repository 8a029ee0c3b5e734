use cmdtree::{ArgumentList, ParamDefinition, Value};
use expect_test::expect;
use pretty_assertions::assert_eq;

use crate::toks;

#[test]
fn undeclared_params_pass_through() {
    let args = ArgumentList::bind(toks("foo bar"), false, &[]).unwrap();
    assert_eq!(args.len(), 2);
    assert_eq!(args[0], Value::Str("foo".to_string()));
    assert_eq!(args[1], Value::Str("bar".to_string()));
    assert_eq!(args.by_name("foo"), None);
}

#[test]
fn declared_params_bind_by_name_and_position() {
    let params = vec![ParamDefinition::new("filename"), ParamDefinition::new("mode")];
    let args = ArgumentList::bind(toks("in.txt fast"), false, &params).unwrap();
    assert_eq!(args["filename"], Value::Str("in.txt".to_string()));
    assert_eq!(args["mode"], Value::Str("fast".to_string()));
    assert_eq!(args[1], Value::Str("fast".to_string()));
}

#[test]
fn arity_is_exact() {
    let params = vec![ParamDefinition::new("filename")];
    let err = ArgumentList::bind(toks("a b"), false, &params).unwrap_err();
    expect![[r#"incorrect number of arguments given: expected 1, but got 2"#]]
        .assert_eq(&err.to_string());
}

#[test]
fn no_params_rejects_everything() {
    let err = ArgumentList::bind(toks("a"), true, &[]).unwrap_err();
    expect![[r#"incorrect number of arguments given: expected 0, but got 1"#]]
        .assert_eq(&err.to_string());

    let args = ArgumentList::bind(Vec::new(), true, &[]).unwrap();
    assert!(args.is_empty());
}

#[test]
fn param_transform() {
    let params = vec![ParamDefinition::new("port")
        .transform(|s| s.parse::<i64>().map(Value::Int).map_err(|err| err.to_string()))];

    let args = ArgumentList::bind(toks("80"), false, &params).unwrap();
    assert_eq!(args["port"], Value::Int(80));

    let err = ArgumentList::bind(toks("nope"), false, &params).unwrap_err();
    expect![[r#"invalid value "nope" for port parameter"#]].assert_eq(&err.to_string());
}

#[test]
fn iteration_in_positional_order() {
    let args = ArgumentList::bind(toks("a b c"), false, &[]).unwrap();
    let seen: Vec<String> = args.iter().map(|v| v.to_string()).collect();
    assert_eq!(seen, ["a", "b", "c"]);
    assert_eq!(args.to_vec().len(), 3);
}

#[test]
#[should_panic = "no parameter named"]
fn indexing_by_unknown_name_panics() {
    let args = ArgumentList::bind(toks("a"), false, &[]).unwrap();
    let _ = &args["nope"];
}
