//! Normalizes a [`RawDocument`] into a [`Service`], accumulating every violation.
//!
//! Containers are visited in a fixed order (enums, unions, models, resources) so the
//! error list is identical across runs. Builders return `None` for a node whose own
//! references failed; since every `None` is paired with a recorded violation, a
//! `Service` is only assembled from complete parts.

use crate::ast::{
    RawDeprecation, RawDocument, RawEnum, RawField, RawModel, RawOperation, RawParameter,
    RawResource, RawResponse, RawUnion,
};
use crate::error::ValidationErrors;
use crate::model::{
    Deprecation, Enum, EnumValue, Field, Method, Model, Operation, Parameter, Resource,
    Response, Service, TypeRef, Union, UnionType,
};
use crate::symbols::{ImportedTypes, SymbolTable};
use indexmap::IndexMap;
use std::collections::HashSet;

/// Validates `document` against its own declarations and the `imported` type names.
///
/// # Errors
/// Returns every violation found, in a deterministic order, when there is at least one.
pub fn validate(
    document: &RawDocument,
    imported: &ImportedTypes,
) -> Result<Service, ValidationErrors> {
    let (symbols, clashes) = SymbolTable::build(document, imported);
    let mut validator = Validator {
        document,
        symbols,
        errors: clashes,
    };

    if document.name.trim().is_empty() {
        validator.error("Service name must not be empty".to_string());
    }

    let enums = validator.enums();
    let unions = validator.unions();
    let models = validator.models();
    let resources = validator.resources();

    if validator.errors.is_empty() {
        log::debug!(
            "service '{}' is valid: {} enums, {} unions, {} models, {} resources",
            document.name,
            enums.len(),
            unions.len(),
            models.len(),
            resources.len()
        );
        Ok(Service {
            name: document.name.clone(),
            enums,
            unions,
            models,
            resources,
        })
    } else {
        log::debug!(
            "service '{}' has {} violation(s)",
            document.name,
            validator.errors.len()
        );
        Err(ValidationErrors::new(
            document.name.clone(),
            validator.errors,
        ))
    }
}

/// Copies a declared deprecation onto the output node. Presence is kept even when no
/// description was given.
fn propagate_deprecation(raw: &Option<RawDeprecation>) -> Option<Deprecation> {
    raw.as_ref().map(|d| Deprecation {
        description: d.description.clone(),
    })
}

/// Each name that occurs more than once, reported once, in first-occurrence order.
fn duplicates<'n>(names: impl IntoIterator<Item = &'n str>) -> Vec<&'n str> {
    let mut seen = HashSet::new();
    let mut dups = Vec::new();
    for name in names {
        if !seen.insert(name) && !dups.contains(&name) {
            dups.push(name);
        }
    }
    dups
}

fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// A status code key as an integer in `100..=599`. `"0200"` and `"+200"` both read as 200.
fn parse_status(code: &str) -> Option<u16> {
    code.trim()
        .parse::<u16>()
        .ok()
        .filter(|c| (100..=599).contains(c))
}

fn join_path(base: &str, suffix: Option<&str>) -> String {
    match suffix.map(str::trim).filter(|s| !s.is_empty()) {
        None => base.to_string(),
        Some(suffix) if suffix.starts_with('/') => {
            format!("{}{}", base.trim_end_matches('/'), suffix)
        }
        Some(suffix) => format!("{}/{}", base.trim_end_matches('/'), suffix),
    }
}

struct Validator<'a> {
    document: &'a RawDocument,
    symbols: SymbolTable,
    errors: Vec<String>,
}

impl Validator<'_> {
    fn error(&mut self, message: String) {
        self.errors.push(message);
    }

    fn check_duplicates<'n>(
        &mut self,
        names: impl IntoIterator<Item = &'n str>,
        describe: impl Fn(&str) -> String,
    ) {
        for dup in duplicates(names) {
            self.error(format!("{} appears more than once", describe(dup)));
        }
    }

    fn check_name(&mut self, label: &str, name: &str) {
        if !is_valid_name(name) {
            self.error(format!(
                "{label} name is invalid: must start with a letter and contain only letters, digits, '_' or '-'"
            ));
        }
    }

    fn resolve(&mut self, label: &str, type_name: &str) -> Option<TypeRef> {
        let resolved = self.symbols.resolve(type_name);
        if resolved.is_none() {
            self.error(format!("{label} type[{type_name}] not found"));
        }
        resolved
    }

    // === Enums ===

    fn enums(&mut self) -> IndexMap<String, Enum> {
        let document = self.document;
        self.check_duplicates(document.enums.names(), |n| format!("Enum[{n}]"));

        let mut enums = IndexMap::new();
        for (name, raw) in document.enums.iter() {
            let built = self.enum_def(name, raw);
            enums.entry(name.to_string()).or_insert(built);
        }
        enums
    }

    fn enum_def(&mut self, name: &str, raw: &RawEnum) -> Enum {
        let label = format!("Enum[{name}]");
        self.check_name(&label, name);
        self.check_duplicates(raw.values.iter().map(|v| v.name.as_str()), |v| {
            format!("{label} value[{v}]")
        });
        for value in &raw.values {
            self.check_name(&format!("{label} value[{}]", value.name), &value.name);
        }

        Enum {
            name: name.to_string(),
            description: raw.description.clone(),
            values: raw
                .values
                .iter()
                .map(|v| EnumValue {
                    name: v.name.clone(),
                    description: v.description.clone(),
                    deprecation: propagate_deprecation(&v.deprecation),
                })
                .collect(),
            deprecation: propagate_deprecation(&raw.deprecation),
        }
    }

    // === Unions ===

    fn unions(&mut self) -> IndexMap<String, Union> {
        let document = self.document;
        self.check_duplicates(document.unions.names(), |n| format!("Union[{n}]"));

        let mut unions = IndexMap::new();
        for (name, raw) in document.unions.iter() {
            if let Some(built) = self.union_def(name, raw) {
                unions.entry(name.to_string()).or_insert(built);
            }
        }
        unions
    }

    fn union_def(&mut self, name: &str, raw: &RawUnion) -> Option<Union> {
        let label = format!("Union[{name}]");
        self.check_name(&label, name);
        self.check_duplicates(raw.types.iter().map(|t| t.type_name.as_str()), |t| {
            format!("{label} type[{t}]")
        });

        let mut types = Vec::with_capacity(raw.types.len());
        let mut complete = true;
        for member in &raw.types {
            match self.resolve(&label, &member.type_name) {
                Some(type_ref) => types.push(UnionType {
                    type_ref,
                    deprecation: propagate_deprecation(&member.deprecation),
                }),
                None => complete = false,
            }
        }

        complete.then(|| Union {
            name: name.to_string(),
            description: raw.description.clone(),
            types,
            deprecation: propagate_deprecation(&raw.deprecation),
        })
    }

    // === Models ===

    fn models(&mut self) -> IndexMap<String, Model> {
        let document = self.document;
        self.check_duplicates(document.models.names(), |n| format!("Model[{n}]"));

        let mut models = IndexMap::new();
        for (name, raw) in document.models.iter() {
            if let Some(built) = self.model_def(name, raw) {
                models.entry(name.to_string()).or_insert(built);
            }
        }
        models
    }

    fn model_def(&mut self, name: &str, raw: &RawModel) -> Option<Model> {
        let label = format!("Model[{name}]");
        self.check_name(&label, name);
        self.check_duplicates(raw.fields.iter().map(|f| f.name.as_str()), |f| {
            format!("{label} field[{f}]")
        });

        let fields: Vec<Option<Field>> = raw
            .fields
            .iter()
            .map(|field| self.field(&label, field))
            .collect();

        Some(Model {
            name: name.to_string(),
            description: raw.description.clone(),
            fields: fields.into_iter().collect::<Option<Vec<_>>>()?,
            deprecation: propagate_deprecation(&raw.deprecation),
        })
    }

    fn field(&mut self, model_label: &str, raw: &RawField) -> Option<Field> {
        let label = format!("{model_label} field[{}]", raw.name);
        self.check_name(&label, &raw.name);
        let type_ref = self.resolve(&label, &raw.type_name)?;
        Some(Field {
            name: raw.name.clone(),
            type_ref,
            required: raw.required.unwrap_or(true),
            description: raw.description.clone(),
            deprecation: propagate_deprecation(&raw.deprecation),
        })
    }

    // === Resources ===

    /// Resource keys are compared by the type they front, so `"user"` and `" user"`
    /// are the same resource.
    fn resources(&mut self) -> IndexMap<String, Resource> {
        let document = self.document;
        let keys: Vec<String> = document
            .resources
            .names()
            .map(|name| {
                self.symbols
                    .resolve(name)
                    .map_or_else(|| name.trim().to_string(), |t| t.to_string())
            })
            .collect();
        self.check_duplicates(keys.iter().map(String::as_str), |n| format!("Resource[{n}]"));

        let mut resources = IndexMap::new();
        for (key, (_, raw)) in keys.iter().zip(document.resources.iter()) {
            if let Some(built) = self.resource(key, raw) {
                resources.entry(key.clone()).or_insert(built);
            }
        }
        resources
    }

    fn resource(&mut self, type_name: &str, raw: &RawResource) -> Option<Resource> {
        let label = format!("Resource[{type_name}]");
        let type_ref = match self.resolve(&label, type_name) {
            Some(t) if !t.is_named() => {
                self.error(format!(
                    "{label} type must be an enum, union, model or imported type"
                ));
                None
            }
            other => other,
        };

        let path = join_path("", Some(raw.path.as_deref().unwrap_or(type_name)));
        let operations: Vec<Option<Operation>> = raw
            .operations
            .iter()
            .map(|op| self.operation(&label, &path, op))
            .collect();

        Some(Resource {
            type_ref: type_ref?,
            description: raw.description.clone(),
            operations: operations.into_iter().collect::<Option<Vec<_>>>()?,
            deprecation: propagate_deprecation(&raw.deprecation),
            path,
        })
    }

    fn operation(
        &mut self,
        resource_label: &str,
        resource_path: &str,
        raw: &RawOperation,
    ) -> Option<Operation> {
        let method = raw.method.parse::<Method>().ok();
        let path = join_path(resource_path, raw.path.as_deref());
        let shown_method = method.map_or(raw.method.as_str(), |m| m.as_str());
        let label = format!("{resource_label} operation[{shown_method} {path}]");

        if method.is_none() {
            self.error(format!(
                "{label} method[{}] is not a valid HTTP method",
                raw.method
            ));
        }

        self.check_duplicates(raw.parameters.iter().map(|p| p.name.as_str()), |p| {
            format!("{label} parameter[{p}]")
        });
        let parameters: Vec<Option<Parameter>> = raw
            .parameters
            .iter()
            .map(|p| self.parameter(&label, p))
            .collect();

        let codes: Vec<String> = raw
            .responses
            .names()
            .map(|code| parse_status(code).map_or_else(|| code.to_string(), |c| c.to_string()))
            .collect();
        self.check_duplicates(codes.iter().map(String::as_str), |code| {
            format!("{label} response[{code}]")
        });
        let mut responses = IndexMap::new();
        let mut responses_complete = true;
        for (code, response) in raw.responses.iter() {
            match self.response(&label, code, response) {
                Some(built) => {
                    responses.entry(built.code).or_insert(built);
                }
                None => responses_complete = false,
            }
        }

        let parameters = parameters.into_iter().collect::<Option<Vec<_>>>()?;
        if !responses_complete {
            return None;
        }
        Some(Operation {
            method: method?,
            path,
            description: raw.description.clone(),
            parameters,
            responses,
            deprecation: propagate_deprecation(&raw.deprecation),
        })
    }

    fn parameter(&mut self, operation_label: &str, raw: &RawParameter) -> Option<Parameter> {
        let label = format!("{operation_label} parameter[{}]", raw.name);
        self.check_name(&label, &raw.name);
        let type_ref = self.resolve(&label, &raw.type_name)?;
        Some(Parameter {
            name: raw.name.clone(),
            type_ref,
            required: raw.required.unwrap_or(true),
            deprecation: propagate_deprecation(&raw.deprecation),
        })
    }

    fn response(
        &mut self,
        operation_label: &str,
        code: &str,
        raw: &RawResponse,
    ) -> Option<Response> {
        let label = format!("{operation_label} response[{code}]");
        let parsed = parse_status(code);
        if parsed.is_none() {
            self.error(format!(
                "{label} code must be an integer between 100 and 599"
            ));
        }
        let type_ref = self.resolve(&label, &raw.type_name);
        Some(Response {
            code: parsed?,
            type_ref: type_ref?,
            deprecation: propagate_deprecation(&raw.deprecation),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicates_reported_once_in_order() {
        assert_eq!(duplicates(["a", "b", "a", "c", "b", "a"]), vec!["a", "b"]);
        assert!(duplicates(["a", "b"]).is_empty());
    }

    #[test]
    fn test_name_format() {
        assert!(is_valid_name("user"));
        assert!(is_valid_name("content_type-v2"));
        assert!(!is_valid_name(""));
        assert!(!is_valid_name("1user"));
        assert!(!is_valid_name("user name"));
        assert!(!is_valid_name("io.models.user"));
    }

    #[test]
    fn test_parse_status() {
        assert_eq!(parse_status("200"), Some(200));
        assert_eq!(parse_status("0200"), Some(200));
        assert_eq!(parse_status("+200"), Some(200));
        assert_eq!(parse_status("99"), None);
        assert_eq!(parse_status("600"), None);
        assert_eq!(parse_status("abc"), None);
    }

    #[test]
    fn test_join_path() {
        assert_eq!(join_path("", Some("user")), "/user");
        assert_eq!(join_path("", Some("/users")), "/users");
        assert_eq!(join_path("/users", None), "/users");
        assert_eq!(join_path("/users", Some("")), "/users");
        assert_eq!(join_path("/users", Some("/:id")), "/users/:id");
        assert_eq!(join_path("/users/", Some(":id")), "/users/:id");
    }

    #[test]
    fn test_deprecation_presence_without_description() {
        let raw = Some(RawDeprecation { description: None });
        assert_eq!(
            propagate_deprecation(&raw),
            Some(Deprecation { description: None })
        );
        assert_eq!(propagate_deprecation(&None), None);
    }
}
