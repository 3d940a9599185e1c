use crate::ast::RawDocument;
use crate::model::{Primitive, Service, TypeRef};
use std::collections::{BTreeSet, HashMap};

/// Kind of a named, non-primitive type visible to a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    Enum,
    Union,
    Model,
    Imported,
}

impl TypeKind {
    #[must_use]
    pub fn article_name(self) -> &'static str {
        match self {
            TypeKind::Enum => "an enum",
            TypeKind::Union => "a union",
            TypeKind::Model => "a model",
            TypeKind::Imported => "an imported type",
        }
    }
}

/// Fully qualified type names made available by already resolved imports.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportedTypes {
    names: BTreeSet<String>,
}

impl ImportedTypes {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Exposes every enum, union and model of `service` under `namespace`, as
    /// `<namespace>.enums.<name>`, `<namespace>.unions.<name>` and
    /// `<namespace>.models.<name>`.
    pub fn add_service(&mut self, namespace: &str, service: &Service) {
        for name in service.enums.keys() {
            self.names.insert(format!("{namespace}.enums.{name}"));
        }
        for name in service.unions.keys() {
            self.names.insert(format!("{namespace}.unions.{name}"));
        }
        for name in service.models.keys() {
            self.names.insert(format!("{namespace}.models.{name}"));
        }
    }

    pub fn insert(&mut self, qualified_name: impl Into<String>) {
        self.names.insert(qualified_name.into());
    }

    #[must_use]
    pub fn contains(&self, qualified_name: &str) -> bool {
        self.names.contains(qualified_name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for ImportedTypes {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut imported = ImportedTypes::new();
        for name in iter {
            imported.insert(name);
        }
        imported
    }
}

/// Set of type names visible to one document while it is validated.
#[derive(Debug, Default)]
pub struct SymbolTable {
    pub types: HashMap<String, TypeKind>,
}

impl SymbolTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the table for `document`: its own enums, unions and models followed by the
    /// imported names. Primitives are implicit.
    ///
    /// A name declared in two containers keeps the kind of the first container in
    /// enums, unions, models order; each such clash is returned as a violation.
    #[must_use]
    pub fn build(document: &RawDocument, imported: &ImportedTypes) -> (Self, Vec<String>) {
        let mut table = SymbolTable::new();
        let mut clashes = Vec::new();

        let declared = document
            .enums
            .names()
            .map(|n| (n, TypeKind::Enum))
            .chain(document.unions.names().map(|n| (n, TypeKind::Union)))
            .chain(document.models.names().map(|n| (n, TypeKind::Model)));

        for (name, kind) in declared {
            match table.types.get(name) {
                Some(existing) if *existing != kind => {
                    let clash = format!(
                        "Name[{name}] is declared as both {} and {}",
                        existing.article_name(),
                        kind.article_name()
                    );
                    if !clashes.contains(&clash) {
                        clashes.push(clash);
                    }
                }
                Some(_) => {}
                None => {
                    table.types.insert(name.to_string(), kind);
                }
            }
        }

        for name in imported.iter() {
            table
                .types
                .entry(name.to_string())
                .or_insert(TypeKind::Imported);
        }

        log::debug!(
            "symbol table for '{}': {} declared/imported names",
            document.name,
            table.types.len()
        );
        (table, clashes)
    }

    /// Resolves a type reference as written in a document: a primitive, a declared or
    /// imported name, `[T]` or `map[T]`.
    #[must_use]
    pub fn resolve(&self, name: &str) -> Option<TypeRef> {
        let name = name.trim();
        if let Some(inner) = name.strip_prefix("map[").and_then(|s| s.strip_suffix(']')) {
            return self.resolve(inner).map(|t| TypeRef::Map(Box::new(t)));
        }
        if let Some(inner) = name.strip_prefix('[').and_then(|s| s.strip_suffix(']')) {
            return self.resolve(inner).map(|t| TypeRef::List(Box::new(t)));
        }
        if let Some(primitive) = Primitive::from_name(name) {
            return Some(TypeRef::Primitive(primitive));
        }
        self.types.get(name).map(|kind| match kind {
            TypeKind::Enum => TypeRef::Enum(name.to_string()),
            TypeKind::Union => TypeRef::Union(name.to_string()),
            TypeKind::Model => TypeRef::Model(name.to_string()),
            TypeKind::Imported => TypeRef::Imported(name.to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_document;

    fn table(source: &str, imported: &ImportedTypes) -> (SymbolTable, Vec<String>) {
        let doc = parse_document(source, "test.json").unwrap();
        SymbolTable::build(&doc, imported)
    }

    #[test]
    fn test_resolves_primitives_and_collections() {
        let (symbols, clashes) = table(r#"{ "name": "svc" }"#, &ImportedTypes::new());
        assert!(clashes.is_empty());
        assert_eq!(
            symbols.resolve("uuid"),
            Some(TypeRef::Primitive(Primitive::Uuid))
        );
        assert_eq!(
            symbols.resolve("map[[string]]"),
            Some(TypeRef::Map(Box::new(TypeRef::List(Box::new(
                TypeRef::Primitive(Primitive::String)
            )))))
        );
        assert_eq!(symbols.resolve("[nope]"), None);
        assert_eq!(symbols.resolve("String"), None);
    }

    #[test]
    fn test_resolves_declared_and_imported_names() {
        let source = r#"{
            "name": "svc",
            "enums": { "color": { "values": [{ "name": "red" }] } },
            "unions": { "thing": { "types": [{ "type": "user" }] } },
            "models": { "user": { "fields": [] } }
        }"#;
        let imported: ImportedTypes = ["io.common.models.error"].into_iter().collect();
        let (symbols, _) = table(source, &imported);

        assert_eq!(symbols.resolve("color"), Some(TypeRef::Enum("color".into())));
        assert_eq!(symbols.resolve("thing"), Some(TypeRef::Union("thing".into())));
        assert_eq!(symbols.resolve("user"), Some(TypeRef::Model("user".into())));
        assert_eq!(
            symbols.resolve("io.common.models.error"),
            Some(TypeRef::Imported("io.common.models.error".into()))
        );
    }

    #[test]
    fn test_reports_cross_container_clash_once() {
        let source = r#"{
            "name": "svc",
            "enums": { "user": { "values": [] } },
            "models": { "user": { "fields": [] }, "user": { "fields": [] } }
        }"#;
        let (symbols, clashes) = table(source, &ImportedTypes::new());
        assert_eq!(
            clashes,
            vec!["Name[user] is declared as both an enum and a model".to_string()]
        );
        assert_eq!(symbols.resolve("user"), Some(TypeRef::Enum("user".into())));
    }

    #[test]
    fn test_imported_service_names_are_qualified() {
        let source = r#"{
            "name": "common",
            "enums": { "status": { "values": [{ "name": "ok" }] } },
            "models": { "error": { "fields": [] } }
        }"#;
        let service = crate::validator::validate(
            &parse_document(source, "common.json").unwrap(),
            &ImportedTypes::new(),
        )
        .unwrap();
        let mut imported = ImportedTypes::new();
        imported.add_service("io.common", &service);
        assert!(imported.contains("io.common.enums.status"));
        assert!(imported.contains("io.common.models.error"));
        assert_eq!(imported.len(), 2);
    }
}
