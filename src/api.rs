use crate::error::SpecError;
use crate::model::Service;
use crate::parser::parse_document;
use crate::symbols::ImportedTypes;
use crate::validator::validate;
use serde::{Serialize, Serializer};

/// The result of a successful analysis of a specification document.
/// Holds the normalized service and provides its JSON and YAML renderings.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisResult {
    pub service: Service,
}

impl Serialize for AnalysisResult {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.service.serialize(serializer)
    }
}

impl AnalysisResult {
    /// Serializes the normalized service into a pretty-printed JSON string.
    ///
    /// # Errors
    /// Returns a `serde_json::Error` if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self)
    }

    /// Serializes the normalized service into a YAML string.
    ///
    /// # Errors
    /// Returns a `serde_yaml::Error` if serialization fails.
    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(&self)
    }
}

/// Parses and validates a specification document that imports nothing.
///
/// # Errors
/// Returns [`SpecError::Parse`] for structural failures and [`SpecError::Validation`]
/// with every violation otherwise.
pub fn analyze(source: &str, file_name: &str) -> Result<AnalysisResult, SpecError> {
    analyze_with_imports(source, file_name, &ImportedTypes::new())
}

/// Parses and validates a specification document, resolving references against the
/// already resolved `imported` type names as well as its own declarations.
///
/// # Errors
/// As [`analyze`].
pub fn analyze_with_imports(
    source: &str,
    file_name: &str,
    imported: &ImportedTypes,
) -> Result<AnalysisResult, SpecError> {
    let document = parse_document(source, file_name)?;
    let service = validate(&document, imported)?;
    Ok(AnalysisResult { service })
}

#[cfg(test)]
mod tests {
    use crate::analyze;

    #[test]
    fn test_simple_document_to_json() {
        let source = r#"{
            "name": "shop",
            "enums": { "size": { "values": [{ "name": "small" }] } },
            "models": {
                "item": { "fields": [{ "name": "size", "type": "size", "required": false }] }
            }
        }"#;

        let expected_json = serde_json::json!({
            "name": "shop",
            "enums": {
                "size": {
                    "name": "size",
                    "description": null,
                    "values": [{ "name": "small", "description": null, "deprecation": null }],
                    "deprecation": null
                }
            },
            "unions": {},
            "models": {
                "item": {
                    "name": "item",
                    "description": null,
                    "fields": [{
                        "name": "size",
                        "type": "size",
                        "required": false,
                        "description": null,
                        "deprecation": null
                    }],
                    "deprecation": null
                }
            },
            "resources": {}
        });

        let analysis_result = analyze(source, "shop.json").unwrap();
        let result = analysis_result.to_json().unwrap();
        let result_json: serde_json::Value = serde_json::from_str(&result).unwrap();

        assert_eq!(result_json, expected_json);
    }

    #[test]
    fn test_simple_document_to_yaml() {
        let source = r#"{ "name": "empty" }"#;

        let expected_yaml = "name: empty\nenums: {}\nunions: {}\nmodels: {}\nresources: {}\n";

        let analysis_result = analyze(source, "empty.json").unwrap();
        let result = analysis_result.to_yaml().unwrap();

        assert_eq!(result, expected_yaml);
    }
}
