//! Raw document tree, exactly as declared in the source text.
//!
//! Nothing here is validated beyond its shape. Named maps are kept as [`Entries`] so a
//! key declared twice survives parsing and can be reported by the validator.

use serde::de::{Deserialize, Deserializer, MapAccess, Visitor};
use std::fmt;
use std::marker::PhantomData;

#[derive(Debug, PartialEq, Clone, serde::Deserialize)]
pub struct RawDocument {
    pub name: String,
    #[serde(default)]
    pub imports: Vec<RawImport>,
    #[serde(default)]
    pub enums: Entries<RawEnum>,
    #[serde(default)]
    pub unions: Entries<RawUnion>,
    #[serde(default)]
    pub models: Entries<RawModel>,
    #[serde(default)]
    pub resources: Entries<RawResource>,
}

#[derive(Debug, PartialEq, Clone, serde::Deserialize)]
pub struct RawImport {
    pub uri: String,
}

#[derive(Debug, PartialEq, Clone, serde::Deserialize)]
pub struct RawDeprecation {
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, PartialEq, Clone, serde::Deserialize)]
pub struct RawEnum {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub values: Vec<RawEnumValue>,
    #[serde(default)]
    pub deprecation: Option<RawDeprecation>,
}

#[derive(Debug, PartialEq, Clone, serde::Deserialize)]
pub struct RawEnumValue {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub deprecation: Option<RawDeprecation>,
}

#[derive(Debug, PartialEq, Clone, serde::Deserialize)]
pub struct RawUnion {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub types: Vec<RawUnionType>,
    #[serde(default)]
    pub deprecation: Option<RawDeprecation>,
}

#[derive(Debug, PartialEq, Clone, serde::Deserialize)]
pub struct RawUnionType {
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default)]
    pub deprecation: Option<RawDeprecation>,
}

#[derive(Debug, PartialEq, Clone, serde::Deserialize)]
pub struct RawModel {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub fields: Vec<RawField>,
    #[serde(default)]
    pub deprecation: Option<RawDeprecation>,
}

#[derive(Debug, PartialEq, Clone, serde::Deserialize)]
pub struct RawField {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default)]
    pub required: Option<bool>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub deprecation: Option<RawDeprecation>,
}

#[derive(Debug, PartialEq, Clone, serde::Deserialize)]
pub struct RawResource {
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub operations: Vec<RawOperation>,
    #[serde(default)]
    pub deprecation: Option<RawDeprecation>,
}

#[derive(Debug, PartialEq, Clone, serde::Deserialize)]
pub struct RawOperation {
    pub method: String,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub parameters: Vec<RawParameter>,
    #[serde(default)]
    pub responses: Entries<RawResponse>,
    #[serde(default)]
    pub deprecation: Option<RawDeprecation>,
}

#[derive(Debug, PartialEq, Clone, serde::Deserialize)]
pub struct RawParameter {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default)]
    pub required: Option<bool>,
    #[serde(default)]
    pub deprecation: Option<RawDeprecation>,
}

#[derive(Debug, PartialEq, Clone, serde::Deserialize)]
pub struct RawResponse {
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default)]
    pub deprecation: Option<RawDeprecation>,
}

/// An object keyed by name, in declaration order, with repeated keys preserved.
#[derive(Debug, PartialEq, Clone)]
pub struct Entries<T>(pub Vec<(String, T)>);

impl<T> Default for Entries<T> {
    fn default() -> Self {
        Entries(Vec::new())
    }
}

impl<T> Entries<T> {
    pub fn iter(&self) -> impl Iterator<Item = (&str, &T)> {
        self.0.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(name, _)| name.as_str())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Entries<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct EntriesVisitor<T>(PhantomData<T>);

        impl<'de, T: Deserialize<'de>> Visitor<'de> for EntriesVisitor<T> {
            type Value = Entries<T>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an object keyed by name")
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((key, value)) = map.next_entry::<String, T>()? {
                    entries.push((key, value));
                }
                Ok(Entries(entries))
            }
        }

        deserializer.deserialize_map(EntriesVisitor(PhantomData))
    }
}
