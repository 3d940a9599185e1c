//! The normalized service model.
//!
//! Values here are only ever built by the validator, and only when the whole document
//! is free of violations. There is no mutation API.

use indexmap::IndexMap;
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Deprecation {
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Service {
    pub name: String,
    pub enums: IndexMap<String, Enum>,
    pub unions: IndexMap<String, Union>,
    pub models: IndexMap<String, Model>,
    pub resources: IndexMap<String, Resource>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Enum {
    pub name: String,
    pub description: Option<String>,
    pub values: Vec<EnumValue>,
    pub deprecation: Option<Deprecation>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnumValue {
    pub name: String,
    pub description: Option<String>,
    pub deprecation: Option<Deprecation>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Union {
    pub name: String,
    pub description: Option<String>,
    pub types: Vec<UnionType>,
    pub deprecation: Option<Deprecation>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnionType {
    #[serde(rename = "type")]
    pub type_ref: TypeRef,
    pub deprecation: Option<Deprecation>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Model {
    pub name: String,
    pub description: Option<String>,
    pub fields: Vec<Field>,
    pub deprecation: Option<Deprecation>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Field {
    pub name: String,
    #[serde(rename = "type")]
    pub type_ref: TypeRef,
    pub required: bool,
    pub description: Option<String>,
    pub deprecation: Option<Deprecation>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resource {
    #[serde(rename = "type")]
    pub type_ref: TypeRef,
    pub path: String,
    pub description: Option<String>,
    pub operations: Vec<Operation>,
    pub deprecation: Option<Deprecation>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Operation {
    pub method: Method,
    pub path: String,
    pub description: Option<String>,
    pub parameters: Vec<Parameter>,
    pub responses: IndexMap<u16, Response>,
    pub deprecation: Option<Deprecation>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "type")]
    pub type_ref: TypeRef,
    pub required: bool,
    pub deprecation: Option<Deprecation>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Response {
    pub code: u16,
    #[serde(rename = "type")]
    pub type_ref: TypeRef,
    pub deprecation: Option<Deprecation>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
    Connect,
    Options,
    Trace,
}

impl Method {
    pub const ALL: [Method; 9] = [
        Method::Get,
        Method::Post,
        Method::Put,
        Method::Patch,
        Method::Delete,
        Method::Head,
        Method::Connect,
        Method::Options,
        Method::Trace,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
            Method::Head => "HEAD",
            Method::Connect => "CONNECT",
            Method::Options => "OPTIONS",
            Method::Trace => "TRACE",
        }
    }
}

impl FromStr for Method {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Method::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s))
            .ok_or(())
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    Boolean,
    DateIso8601,
    DateTimeIso8601,
    Decimal,
    Double,
    Integer,
    Long,
    Object,
    String,
    Unit,
    Uuid,
}

impl Primitive {
    pub const ALL: [Primitive; 11] = [
        Primitive::Boolean,
        Primitive::DateIso8601,
        Primitive::DateTimeIso8601,
        Primitive::Decimal,
        Primitive::Double,
        Primitive::Integer,
        Primitive::Long,
        Primitive::Object,
        Primitive::String,
        Primitive::Unit,
        Primitive::Uuid,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Primitive::Boolean => "boolean",
            Primitive::DateIso8601 => "date-iso8601",
            Primitive::DateTimeIso8601 => "date-time-iso8601",
            Primitive::Decimal => "decimal",
            Primitive::Double => "double",
            Primitive::Integer => "integer",
            Primitive::Long => "long",
            Primitive::Object => "object",
            Primitive::String => "string",
            Primitive::Unit => "unit",
            Primitive::Uuid => "uuid",
        }
    }

    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Primitive::ALL.into_iter().find(|p| p.as_str() == name)
    }
}

/// A resolved reference to a type. `Display` gives back the source spelling.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeRef {
    Primitive(Primitive),
    Enum(String),
    Union(String),
    Model(String),
    /// A fully qualified name supplied by an imported specification.
    Imported(String),
    List(Box<TypeRef>),
    Map(Box<TypeRef>),
}

impl TypeRef {
    /// True for references a resource can front: declared or imported named types.
    #[must_use]
    pub fn is_named(&self) -> bool {
        matches!(
            self,
            TypeRef::Enum(_) | TypeRef::Union(_) | TypeRef::Model(_) | TypeRef::Imported(_)
        )
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Primitive(p) => f.write_str(p.as_str()),
            TypeRef::Enum(name)
            | TypeRef::Union(name)
            | TypeRef::Model(name)
            | TypeRef::Imported(name) => f.write_str(name),
            TypeRef::List(inner) => write!(f, "[{inner}]"),
            TypeRef::Map(inner) => write!(f, "map[{inner}]"),
        }
    }
}

impl Serialize for TypeRef {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}
