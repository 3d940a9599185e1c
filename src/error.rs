use crate::resolver::Dependency;
use miette::{Diagnostic, NamedSource, SourceSpan};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug, Diagnostic)]
pub enum SpecError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Validation(#[from] ValidationErrors),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Import(#[from] ImportError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Selection(#[from] SelectionError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Resolution(#[from] ResolutionError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Publish(#[from] PublishError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),
}

impl SpecError {
    /// Process exit status a publishing front end should terminate with.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            SpecError::Selection(_) => 2,
            SpecError::Resolution(_) => 3,
            SpecError::Publish(_) => 4,
            _ => 1,
        }
    }
}

/// Structural failure: the document is not a tree of the expected shape.
#[derive(Error, Debug, Diagnostic)]
pub enum ParseError {
    #[error("Malformed document: {message}")]
    #[diagnostic(
        code(apispec::parse::syntax),
        help("The document must be valid JSON.")
    )]
    Syntax {
        message: String,
        #[source_code]
        src: NamedSource<String>,
        #[label("here")]
        span: SourceSpan,
    },

    #[error("Unexpected document shape: {message}")]
    #[diagnostic(
        code(apispec::parse::shape),
        help("Top level must carry `name`; `enums`, `unions`, `models`, `resources` and `responses` must be objects keyed by name.")
    )]
    Shape {
        message: String,
        #[source_code]
        src: NamedSource<String>,
        #[label("here")]
        span: SourceSpan,
    },
}

/// The complete, ordered list of semantic violations found in one document.
#[derive(Error, Debug, Diagnostic, Clone, PartialEq, Eq)]
#[error("{} validation error(s) in service '{service}'", .errors.len())]
#[diagnostic(code(apispec::validation::failed))]
pub struct ValidationErrors {
    pub service: String,
    #[help]
    summary: String,
    errors: Vec<String>,
}

impl ValidationErrors {
    pub(crate) fn new(service: String, errors: Vec<String>) -> Self {
        Self {
            summary: errors.join("\n"),
            service,
            errors,
        }
    }

    #[must_use]
    pub fn messages(&self) -> &[String] {
        &self.errors
    }

    #[must_use]
    pub fn into_messages(self) -> Vec<String> {
        self.errors
    }
}

#[derive(Error, Debug, Diagnostic, Clone, PartialEq, Eq)]
pub enum ImportError {
    #[error("Import locator '{uri}' is not recognized: {reason}")]
    #[diagnostic(
        code(apispec::import::unrecognized_locator),
        help("Imports must look like https://app.apibuilder.io/<org>/<app>/... or https://www.apibuilder.io/<org>/<app>/...")
    )]
    UnrecognizedLocator { uri: String, reason: String },
}

#[derive(Error, Debug, Diagnostic, Clone, PartialEq, Eq)]
pub enum SelectionError {
    #[error("Specification(s) not found: {}", .names.join(", "))]
    #[diagnostic(code(apispec::select::not_found))]
    NotFound { names: Vec<String> },
}

#[derive(Error, Debug, Diagnostic, Clone, PartialEq, Eq)]
pub enum ResolutionError {
    #[error("Could not resolve publish order for: {}", DisplayList(.unresolved))]
    #[diagnostic(
        code(apispec::resolve::unresolved),
        help("Each listed specification depends on something that is either part of a cycle or missing from the batch.")
    )]
    Unresolved {
        unresolved: Vec<Dependency>,
        /// Dependencies that name no specification in the batch at all.
        missing: Vec<Dependency>,
    },
}

#[derive(Error, Debug, Diagnostic)]
pub enum PublishError {
    #[error("Publishing {spec} failed: {message}")]
    #[diagnostic(code(apispec::publish::failed))]
    Failed { spec: Dependency, message: String },

    #[error("Could not run publish command '{program}'")]
    #[diagnostic(code(apispec::publish::spawn))]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Could not determine version: {message}")]
    #[diagnostic(code(apispec::publish::version))]
    Version { message: String },
}

#[derive(Error, Debug, Diagnostic)]
pub enum ConfigError {
    #[error("Could not read config file {}", .path.display())]
    #[diagnostic(code(apispec::config::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config")]
    #[diagnostic(code(apispec::config::invalid))]
    Invalid(#[from] serde_yaml::Error),

    #[error("Config field '{field}' must not be empty")]
    #[diagnostic(code(apispec::config::empty_field))]
    EmptyField { field: &'static str },
}

struct DisplayList<'a>(&'a [Dependency]);

impl fmt::Display for DisplayList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, dep) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{dep}")?;
        }
        Ok(())
    }
}
