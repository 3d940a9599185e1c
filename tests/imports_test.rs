use apispec_core::error::{ImportError, SpecError};
use apispec_core::imports::extract_dependencies;
use apispec_core::parser::parse_document;
use apispec_core::resolver::{Dependency, Specification};
use std::path::Path;

#[test]
fn test_no_imports() {
    let doc = parse_document(r#"{ "name": "svc" }"#, "svc.json").unwrap();
    assert!(extract_dependencies(&doc).unwrap().is_empty());
}

#[test]
fn test_duplicate_imports_collapse() {
    let doc = parse_document(
        r#"{
            "name": "svc",
            "imports": [
                { "uri": "https://app.apibuilder.io/acme/common/latest/service.json" },
                { "uri": "https://www.apibuilder.io/acme/common/0.1.0/service.json" }
            ]
        }"#,
        "svc.json",
    )
    .unwrap();
    let deps = extract_dependencies(&doc).unwrap();
    assert_eq!(deps.into_iter().collect::<Vec<_>>(), vec![Dependency::new("acme", "common")]);
}

#[test]
fn test_unrecognized_locator_fails_the_document() {
    let doc = parse_document(
        r#"{
            "name": "svc",
            "imports": [
                { "uri": "https://app.apibuilder.io/acme/common/latest/service.json" },
                { "uri": "https://registry.example.org/acme/billing/latest/service.json" }
            ]
        }"#,
        "svc.json",
    )
    .unwrap();
    let err = extract_dependencies(&doc).unwrap_err();
    let ImportError::UnrecognizedLocator { uri, .. } = err;
    assert_eq!(uri, "https://registry.example.org/acme/billing/latest/service.json");
}

#[test]
fn test_specification_from_source_surfaces_import_error() {
    let text = r#"{ "name": "svc", "imports": [{ "uri": "not a url" }] }"#;
    let err = Specification::from_source("acme", "svc", Path::new("svc.json"), text).unwrap_err();
    assert!(matches!(err, SpecError::Import(_)));
}

#[test]
fn test_specification_from_source_surfaces_parse_error() {
    let err = Specification::from_source("acme", "svc", Path::new("svc.json"), "{").unwrap_err();
    assert!(matches!(err, SpecError::Parse(_)));
}
