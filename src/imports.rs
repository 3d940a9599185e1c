use crate::ast::RawDocument;
use crate::error::ImportError;
use crate::resolver::Dependency;
use std::collections::BTreeSet;
use url::Url;

/// The locator shapes an import may take. Both carry the organization and application
/// as the first two path segments: `https://<host>/<org>/<app>/...`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocatorShape {
    App,
    Www,
}

impl LocatorShape {
    pub const ALL: [LocatorShape; 2] = [LocatorShape::App, LocatorShape::Www];

    #[must_use]
    pub fn host(self) -> &'static str {
        match self {
            LocatorShape::App => "app.apibuilder.io",
            LocatorShape::Www => "www.apibuilder.io",
        }
    }

    fn for_host(host: &str) -> Option<Self> {
        LocatorShape::ALL
            .into_iter()
            .find(|shape| shape.host().eq_ignore_ascii_case(host))
    }
}

/// Parses one import locator into the specification it points at.
///
/// # Errors
/// Returns [`ImportError::UnrecognizedLocator`] when the locator is not a URL of one of
/// the [`LocatorShape`]s.
pub fn parse_locator(uri: &str) -> Result<Dependency, ImportError> {
    let unrecognized = |reason: &str| ImportError::UnrecognizedLocator {
        uri: uri.to_string(),
        reason: reason.to_string(),
    };

    let url = Url::parse(uri.trim()).map_err(|e| unrecognized(&e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(unrecognized("scheme must be http or https"));
    }
    let host = url.host_str().ok_or_else(|| unrecognized("missing host"))?;
    if LocatorShape::for_host(host).is_none() {
        return Err(unrecognized(&format!("unknown host '{host}'")));
    }

    let mut segments = url
        .path_segments()
        .into_iter()
        .flatten()
        .filter(|s| !s.is_empty());
    match (segments.next(), segments.next()) {
        (Some(organization), Some(application)) => {
            Ok(Dependency::new(organization, application))
        }
        _ => Err(unrecognized(
            "path must start with /<organization>/<application>",
        )),
    }
}

/// Collects the specifications `document` imports from.
///
/// # Errors
/// Fails on the first unrecognized locator; an import is never skipped.
pub fn extract_dependencies(document: &RawDocument) -> Result<BTreeSet<Dependency>, ImportError> {
    let dependencies = document
        .imports
        .iter()
        .map(|import| parse_locator(&import.uri))
        .collect::<Result<BTreeSet<_>, _>>()?;
    log::debug!(
        "service '{}' imports {} specification(s)",
        document.name,
        dependencies.len()
    );
    Ok(dependencies)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_both_hosts_are_recognized() {
        assert_eq!(
            parse_locator("https://app.apibuilder.io/acme/common/latest/service.json").unwrap(),
            Dependency::new("acme", "common")
        );
        assert_eq!(
            parse_locator("http://www.apibuilder.io/acme/billing/1.2.0/service.json").unwrap(),
            Dependency::new("acme", "billing")
        );
    }

    #[test]
    fn test_host_is_case_insensitive() {
        assert!(parse_locator("https://APP.apibuilder.io/acme/common").is_ok());
    }

    #[test]
    fn test_unknown_host_is_rejected() {
        let err = parse_locator("https://example.com/acme/common/latest/service.json").unwrap_err();
        let ImportError::UnrecognizedLocator { reason, .. } = err;
        assert!(reason.contains("example.com"));
    }

    #[test]
    fn test_missing_application_segment_is_rejected() {
        assert!(parse_locator("https://app.apibuilder.io/acme").is_err());
        assert!(parse_locator("https://app.apibuilder.io/").is_err());
    }

    #[test]
    fn test_not_a_url_is_rejected() {
        assert!(parse_locator("acme/common").is_err());
        assert!(parse_locator("ftp://app.apibuilder.io/acme/common").is_err());
    }
}
