pub mod loader;

use cartpath_common::protocol::{Marker, Role};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use thiserror::Error;

pub use loader::FixtureLoader;

#[derive(Debug, Error)]
pub enum FixtureError {
    #[error("No fixture named '{0}'")]
    FixtureNotFound(String),
    #[error("Fixture '{fixture}' has no locator for role '{role}'")]
    MissingLocator { fixture: String, role: Role },
    #[error("Fixture directory not found at {0}")]
    DirectoryNotFound(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error in {path}: {source}")]
    Yaml {
        path: PathBuf,
        source: serde_yaml::Error,
    },
    #[error("Glob pattern error: {0}")]
    Pattern(#[from] glob::PatternError),
    #[error("Glob iteration error: {0}")]
    Glob(#[from] glob::GlobError),
}

/// Role → locator record for one scenario.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Fixture {
    /// Overrides the configured selected-option marker for this storefront.
    #[serde(
        rename = "selectedMarker",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub selected_marker: Option<Marker>,
    #[serde(flatten)]
    pub locators: BTreeMap<Role, String>,
}

impl Fixture {
    pub fn with_locator(mut self, role: Role, locator: impl Into<String>) -> Self {
        self.locators.insert(role, locator.into());
        self
    }

    pub fn locator(&self, role: Role) -> Option<&str> {
        self.locators.get(&role).map(String::as_str)
    }
}

/// Fixtures indexed by scenario name.
#[derive(Debug, Clone, Default)]
pub struct FixtureStore {
    fixtures: HashMap<String, Fixture>,
}

impl FixtureStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a fixture, replacing any previous one with the same name.
    pub fn insert(&mut self, name: impl Into<String>, fixture: Fixture) {
        self.fixtures.insert(name.into(), fixture);
    }

    pub fn resolve(&self, name: &str) -> Result<&Fixture, FixtureError> {
        self.fixtures
            .get(name)
            .ok_or_else(|| FixtureError::FixtureNotFound(name.to_string()))
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.fixtures.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.fixtures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fixtures.is_empty()
    }
}
