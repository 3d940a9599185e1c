use crate::error::ConfigError;
use serde::Deserialize;
use std::path::Path;

/// Settings for one publish run.
///
/// ```yaml
/// organization: acme
/// specs: [billing, common]
/// version: 1.4.0
/// profile: staging
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PublishConfig {
    /// Organization every local specification is published under.
    pub organization: String,
    /// Applications to publish; empty means all of them.
    #[serde(default)]
    pub specs: Vec<String>,
    /// Explicit version tag. When absent the version authority is asked.
    #[serde(default)]
    pub version: Option<String>,
    /// Profile handed to the publisher through its environment.
    #[serde(default)]
    pub profile: Option<String>,
}

impl PublishConfig {
    pub fn new(organization: impl Into<String>) -> Self {
        Self {
            organization: organization.into(),
            specs: Vec::new(),
            version: None,
            profile: None,
        }
    }

    #[must_use]
    pub fn with_specs<S: Into<String>>(mut self, specs: impl IntoIterator<Item = S>) -> Self {
        self.specs = specs.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    #[must_use]
    pub fn with_profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = Some(profile.into());
        self
    }

    /// # Errors
    /// Returns [`ConfigError::Invalid`] for malformed YAML or unknown keys and
    /// [`ConfigError::EmptyField`] when the organization is blank.
    pub fn from_yaml_str(source: &str) -> Result<Self, ConfigError> {
        let config: PublishConfig = serde_yaml::from_str(source)?;
        config.check()?;
        Ok(config)
    }

    /// # Errors
    /// Returns [`ConfigError::Io`] when the file cannot be read, otherwise as
    /// [`PublishConfig::from_yaml_str`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        log::debug!("loaded publish config from {}", path.display());
        Self::from_yaml_str(&source)
    }

    fn check(&self) -> Result<(), ConfigError> {
        if self.organization.trim().is_empty() {
            return Err(ConfigError::EmptyField {
                field: "organization",
            });
        }
        if matches!(&self.version, Some(v) if v.trim().is_empty()) {
            return Err(ConfigError::EmptyField { field: "version" });
        }
        Ok(())
    }
}
