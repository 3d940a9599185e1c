//! Publish ordering for a batch of interdependent specifications.

use crate::error::{ResolutionError, SelectionError, SpecError};
use crate::imports::extract_dependencies;
use crate::parser::parse_document;
use serde::Serialize;
use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::path::{Path, PathBuf};

/// Identifies a specification by organization and application.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Dependency {
    pub organization: String,
    pub application: String,
}

impl Dependency {
    pub fn new(organization: impl Into<String>, application: impl Into<String>) -> Self {
        Self {
            organization: organization.into(),
            application: application.into(),
        }
    }
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.organization, self.application)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Specification {
    pub organization: String,
    pub application: String,
    pub dependencies: BTreeSet<Dependency>,
    pub source: PathBuf,
}

impl Specification {
    pub fn new(
        organization: impl Into<String>,
        application: impl Into<String>,
        dependencies: impl IntoIterator<Item = Dependency>,
        source: impl Into<PathBuf>,
    ) -> Self {
        Self {
            organization: organization.into(),
            application: application.into(),
            dependencies: dependencies.into_iter().collect(),
            source: source.into(),
        }
    }

    /// Builds a specification from already loaded document text. The organization is
    /// supplied by the caller; the dependencies come from the document's imports.
    ///
    /// # Errors
    /// Returns a parse error for malformed text and an import error for an
    /// unrecognized locator. Both only concern this one document.
    pub fn from_source(
        organization: &str,
        application: &str,
        source: &Path,
        text: &str,
    ) -> Result<Self, SpecError> {
        let document = parse_document(text, &source.to_string_lossy())?;
        let dependencies = extract_dependencies(&document)?;
        Ok(Self::new(organization, application, dependencies, source))
    }

    #[must_use]
    pub fn identity(&self) -> Dependency {
        Dependency::new(&self.organization, &self.application)
    }

    fn matches(&self, name: &str) -> bool {
        self.application == name || format!("{}/{}", self.organization, self.application) == name
    }
}

/// Holds every known specification, sorted by (organization, application).
#[derive(Debug, Clone, Default)]
pub struct Resolver {
    known: Vec<Specification>,
}

impl Resolver {
    pub fn new(specifications: impl IntoIterator<Item = Specification>) -> Self {
        let mut known: Vec<Specification> = specifications.into_iter().collect();
        known.sort_by(|a, b| {
            (&a.organization, &a.application).cmp(&(&b.organization, &b.application))
        });
        Self { known }
    }

    #[must_use]
    pub fn specifications(&self) -> &[Specification] {
        &self.known
    }

    /// Picks the specifications named by application (or `org/app`). An empty list
    /// selects everything.
    ///
    /// # Errors
    /// Returns [`SelectionError::NotFound`] naming every requested name that matches
    /// no known specification.
    pub fn select(&self, names: &[String]) -> Result<Vec<&Specification>, SelectionError> {
        if names.is_empty() {
            return Ok(self.known.iter().collect());
        }

        let mut missing: Vec<String> = Vec::new();
        for name in names {
            if !self.known.iter().any(|s| s.matches(name)) && !missing.contains(name) {
                missing.push(name.clone());
            }
        }
        if !missing.is_empty() {
            log::warn!("requested specification(s) not found: {}", missing.join(", "));
            return Err(SelectionError::NotFound { names: missing });
        }

        Ok(self
            .known
            .iter()
            .filter(|s| names.iter().any(|n| s.matches(n)))
            .collect())
    }

    /// Publish order for every known specification.
    ///
    /// # Errors
    /// See [`resolve_order`].
    pub fn resolve(&self) -> Result<Vec<Specification>, ResolutionError> {
        resolve_order(self.known.clone(), &HashSet::new())
    }

    /// Publish order for the named subset. Dependencies on known specifications that were
    /// not selected count as already published.
    ///
    /// # Errors
    /// Selection errors are reported before any ordering is attempted.
    pub fn resolve_selected(&self, names: &[String]) -> Result<Vec<Specification>, SpecError> {
        let selected = self.select(names)?;
        let chosen: HashSet<Dependency> = selected.iter().map(|s| s.identity()).collect();
        let published: HashSet<Dependency> = self
            .known
            .iter()
            .map(Specification::identity)
            .filter(|id| !chosen.contains(id))
            .collect();
        let batch = selected.into_iter().cloned().collect();
        Ok(resolve_order(batch, &published)?)
    }
}

/// Orders `specifications` so each one follows everything it depends on.
///
/// Specifications are first sorted by (organization, application); each step then takes
/// the first remaining one whose dependencies are all placed or listed in `published`.
///
/// # Errors
/// When a full scan places nothing, every remaining specification is reported, along
/// with the dependencies that name no specification known to this call.
pub fn resolve_order(
    mut specifications: Vec<Specification>,
    published: &HashSet<Dependency>,
) -> Result<Vec<Specification>, ResolutionError> {
    specifications
        .sort_by(|a, b| (&a.organization, &a.application).cmp(&(&b.organization, &b.application)));

    let total = specifications.len();
    let mut slots: Vec<Option<Specification>> = specifications.into_iter().map(Some).collect();
    let mut placed: HashSet<Dependency> = published.clone();
    let mut ordered = Vec::with_capacity(total);
    let mut first_pending = 0;

    while ordered.len() < total {
        let ready = slots
            .iter()
            .enumerate()
            .skip(first_pending)
            .find_map(|(i, slot)| {
                slot.as_ref()
                    .filter(|s| s.dependencies.iter().all(|d| placed.contains(d)))
                    .map(|_| i)
            });
        let Some(index) = ready else {
            break;
        };
        if let Some(spec) = slots[index].take() {
            log::debug!("placing {} at position {}", spec.identity(), ordered.len());
            placed.insert(spec.identity());
            ordered.push(spec);
        }
        while first_pending < slots.len() && slots[first_pending].is_none() {
            first_pending += 1;
        }
    }

    if ordered.len() == total {
        return Ok(ordered);
    }

    let remaining: Vec<Specification> = slots.into_iter().flatten().collect();
    let known: HashSet<Dependency> = ordered
        .iter()
        .chain(remaining.iter())
        .map(Specification::identity)
        .chain(published.iter().cloned())
        .collect();
    let missing: BTreeSet<Dependency> = remaining
        .iter()
        .flat_map(|s| s.dependencies.iter())
        .filter(|d| !known.contains(*d))
        .cloned()
        .collect();
    let unresolved: Vec<Dependency> = remaining.iter().map(Specification::identity).collect();

    log::warn!(
        "dependency resolution stalled after {} of {} specification(s)",
        ordered.len(),
        total
    );
    Err(ResolutionError::Unresolved {
        unresolved,
        missing: missing.into_iter().collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(app: &str, deps: &[&str]) -> Specification {
        Specification::new(
            "acme",
            app,
            deps.iter().map(|d| Dependency::new("acme", *d)),
            format!("{app}.json"),
        )
    }

    fn apps(order: &[Specification]) -> Vec<&str> {
        order.iter().map(|s| s.application.as_str()).collect()
    }

    #[test]
    fn test_ties_follow_sorted_order() {
        let order = resolve_order(
            vec![spec("c", &[]), spec("a", &[]), spec("b", &[])],
            &HashSet::new(),
        )
        .unwrap();
        assert_eq!(apps(&order), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_dependency_is_placed_first() {
        let order = resolve_order(vec![spec("a", &["b"]), spec("b", &[])], &HashSet::new())
            .unwrap();
        assert_eq!(apps(&order), vec!["b", "a"]);
    }

    #[test]
    fn test_rescans_from_start_after_each_placement() {
        // b unblocks a, which must come before c even though c was ready earlier.
        let order = resolve_order(
            vec![spec("a", &["b"]), spec("b", &[]), spec("c", &[])],
            &HashSet::new(),
        )
        .unwrap();
        assert_eq!(apps(&order), vec!["b", "a", "c"]);
    }

    #[test]
    fn test_self_dependency_is_unresolved() {
        let err = resolve_order(vec![spec("a", &["a"])], &HashSet::new()).unwrap_err();
        let ResolutionError::Unresolved { unresolved, missing } = err;
        assert_eq!(unresolved, vec![Dependency::new("acme", "a")]);
        assert!(missing.is_empty());
    }

    #[test]
    fn test_published_dependencies_count_as_placed() {
        let published: HashSet<Dependency> = [Dependency::new("acme", "b")].into_iter().collect();
        let order = resolve_order(vec![spec("a", &["b"])], &published).unwrap();
        assert_eq!(apps(&order), vec!["a"]);
    }

    #[test]
    fn test_empty_batch() {
        assert!(resolve_order(Vec::new(), &HashSet::new()).unwrap().is_empty());
    }
}
