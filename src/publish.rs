//! Publishing a batch of specifications in dependency order.
//!
//! The external pieces (the version authority and the publishing command) sit behind
//! traits; [`run`] only sequences them.

use crate::config::PublishConfig;
use crate::error::{PublishError, SpecError};
use crate::resolver::{Dependency, Resolver, Specification};
use std::path::Path;
use std::process::Command;

/// Environment variable carrying the configured profile to the publisher.
pub const PROFILE_ENV: &str = "APIBUILDER_PROFILE";

/// Source of the version tag when none is configured.
pub trait VersionAuthority {
    /// # Errors
    /// Returns [`PublishError::Version`] when no version can be determined.
    fn version(&self) -> Result<String, PublishError>;
}

/// A version authority that always answers with the same tag.
#[derive(Debug, Clone)]
pub struct FixedVersion(pub String);

impl VersionAuthority for FixedVersion {
    fn version(&self) -> Result<String, PublishError> {
        Ok(self.0.clone())
    }
}

#[derive(Debug)]
pub struct PublishRequest<'a> {
    pub specification: &'a Specification,
    pub version: &'a str,
    pub env: &'a [(String, String)],
}

pub trait Publisher {
    /// # Errors
    /// Any error halts the run; nothing already published is rolled back.
    fn publish(&mut self, request: &PublishRequest<'_>) -> Result<(), PublishError>;
}

/// Runs `program [args..] <organization> <application> <version> <source>` once per
/// specification, with the request environment applied.
#[derive(Debug, Clone)]
pub struct CommandPublisher {
    program: String,
    args: Vec<String>,
}

impl CommandPublisher {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_args<S: Into<String>>(mut self, args: impl IntoIterator<Item = S>) -> Self {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }
}

impl Publisher for CommandPublisher {
    fn publish(&mut self, request: &PublishRequest<'_>) -> Result<(), PublishError> {
        let spec = request.specification;
        let status = Command::new(&self.program)
            .args(&self.args)
            .arg(&spec.organization)
            .arg(&spec.application)
            .arg(request.version)
            .arg(&spec.source)
            .envs(request.env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .status()
            .map_err(|source| PublishError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if status.success() {
            Ok(())
        } else {
            Err(PublishError::Failed {
                spec: spec.identity(),
                message: format!("'{}' exited with {status}", self.program),
            })
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishReport {
    pub version: String,
    pub published: Vec<Dependency>,
}

/// Builds a specification for each loaded document under the configured organization,
/// naming the application after the file stem.
///
/// # Errors
/// The first document that fails to parse or has an unrecognized import.
pub fn specifications_from_sources<'a>(
    config: &PublishConfig,
    sources: impl IntoIterator<Item = (&'a Path, &'a str)>,
) -> Result<Vec<Specification>, SpecError> {
    sources
        .into_iter()
        .map(|(path, text)| {
            let application = path
                .file_stem()
                .map_or_else(|| path.to_string_lossy(), |stem| stem.to_string_lossy());
            Specification::from_source(&config.organization, &application, path, text)
        })
        .collect()
}

/// Selects, orders and publishes `specifications` according to `config`.
///
/// # Errors
/// In order of checking: unknown requested names, unresolvable dependencies, a failing
/// version authority, and the first failing publish (which stops the run).
pub fn run(
    config: &PublishConfig,
    specifications: Vec<Specification>,
    authority: &dyn VersionAuthority,
    publisher: &mut dyn Publisher,
) -> Result<PublishReport, SpecError> {
    let resolver = Resolver::new(specifications);
    let order = resolver.resolve_selected(&config.specs)?;

    let version = match &config.version {
        Some(version) => version.clone(),
        None => authority.version()?,
    };
    let env: Vec<(String, String)> = config
        .profile
        .iter()
        .map(|profile| (PROFILE_ENV.to_string(), profile.clone()))
        .collect();

    log::info!(
        "publishing {} specification(s) at version {version}",
        order.len()
    );
    let mut published = Vec::with_capacity(order.len());
    for specification in &order {
        log::info!("publishing {}", specification.identity());
        let request = PublishRequest {
            specification,
            version: &version,
            env: &env,
        };
        if let Err(err) = publisher.publish(&request) {
            log::warn!(
                "stopping after {} of {} specification(s): {err}",
                published.len(),
                order.len()
            );
            return Err(err.into());
        }
        published.push(specification.identity());
    }

    Ok(PublishReport { version, published })
}
