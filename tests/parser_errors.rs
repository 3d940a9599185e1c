// Structural failures: these must never be reported as validation errors.

use apispec_core::analyze;
use apispec_core::error::{ParseError, SpecError};
use miette::Diagnostic;

fn parse_error(source: &str) -> ParseError {
    match analyze(source, "test.json") {
        Err(SpecError::Parse(err)) => err,
        Err(other) => panic!("Expected parse error, got {other:?}"),
        Ok(_) => panic!("Expected parse error, got Ok"),
    }
}

#[test]
fn test_parser_error_missing_closing_brace() {
    let err = parse_error(r#"{ "name": "svc""#);
    assert!(matches!(err, ParseError::Syntax { .. }), "Should fail with missing }}");
}

#[test]
fn test_parser_error_trailing_comma() {
    let err = parse_error(r#"{ "name": "svc", }"#);
    assert!(matches!(err, ParseError::Syntax { .. }));
}

#[test]
fn test_parser_error_not_an_object() {
    let err = parse_error(r#""svc""#);
    assert!(matches!(err, ParseError::Shape { .. }));
}

#[test]
fn test_parser_error_enums_as_list() {
    let err = parse_error(r#"{ "name": "svc", "enums": [] }"#);
    assert!(matches!(err, ParseError::Shape { .. }));
}

#[test]
fn test_parser_error_field_without_type() {
    let err = parse_error(r#"{ "name": "svc", "models": { "m": { "fields": [{ "name": "f" }] } } }"#);
    assert!(matches!(err, ParseError::Shape { .. }));
}

#[test]
fn test_parser_error_required_not_boolean() {
    let err = parse_error(
        r#"{ "name": "svc", "models": { "m": { "fields": [{ "name": "f", "type": "string", "required": "yes" }] } } }"#,
    );
    assert!(matches!(err, ParseError::Shape { .. }));
}

#[test]
fn test_parser_error_deprecation_not_object() {
    let err = parse_error(r#"{ "name": "svc", "enums": { "e": { "values": [], "deprecation": "old" } } }"#);
    assert!(matches!(err, ParseError::Shape { .. }));
}

#[test]
fn test_parser_error_has_diagnostic_code_and_label() {
    let source = "{\n  \"name\": \"svc\",\n  \"models\": oops\n}";
    let err = parse_error(source);
    assert_eq!(
        err.code().map(|c| c.to_string()),
        Some("apispec::parse::syntax".to_string())
    );
    let label = err.labels().and_then(|mut labels| labels.next()).unwrap();
    let models_at = source.find("models").unwrap();
    let oops_at = source.find("oops").unwrap();
    assert!(label.offset() > models_at && label.offset() <= oops_at);
}
