// External dependency facts: per-jar hierarchy, composition and enum inventories.

use std::cell::OnceCell;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::DependenciesSection;
use crate::error::DependencyError;

/// Maven-style coordinate of a required jar.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct JarCoordinate {
    pub group_id: String,
    pub artifact_id: String,
    pub version: String,
}

impl JarCoordinate {
    pub fn new(group_id: &str, artifact_id: &str, version: &str) -> Self {
        Self {
            group_id: group_id.to_string(),
            artifact_id: artifact_id.to_string(),
            version: version.to_string(),
        }
    }

    /// File stems a facts file for this jar may be stored under, in lookup order.
    pub fn candidate_names(&self) -> [String; 2] {
        [
            format!("{}-{}", self.group_id, self.version),
            format!("{}-{}", self.artifact_id, self.version),
        ]
    }
}

impl fmt::Display for JarCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.group_id, self.artifact_id, self.version)
    }
}

/// What one jar declares.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalDepInfo {
    /// Every declared class → its direct supertypes.
    #[serde(default)]
    pub hierarchy: BTreeMap<String, Vec<String>>,
    /// Class → declared field type names.
    #[serde(default)]
    pub composition: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub enums: BTreeSet<String>,
}

/// Source of per-jar facts.
pub trait DependencyFacts: fmt::Debug {
    fn facts_for(&self, jar: &JarCoordinate) -> Result<ExternalDepInfo, DependencyError>;
}

/// Reads `{dir}/{group}-{version}.json`, falling back to `{dir}/{artifact}-{version}.json`.
#[derive(Debug)]
pub struct JsonDirectoryFacts {
    dir: PathBuf,
}

impl JsonDirectoryFacts {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl DependencyFacts for JsonDirectoryFacts {
    fn facts_for(&self, jar: &JarCoordinate) -> Result<ExternalDepInfo, DependencyError> {
        for stem in jar.candidate_names() {
            let path = self.dir.join(format!("{stem}.json"));
            if path.is_file() {
                let text = std::fs::read_to_string(&path)?;
                return Ok(serde_json::from_str(&text)?);
            }
        }
        Err(DependencyError::Missing(jar.to_string()))
    }
}

/// Facts for every configured jar, read on first use and kept for the commit.
///
/// A jar whose facts cannot be read contributes nothing.
#[derive(Debug)]
pub struct ExternalDeps {
    jars: Vec<JarCoordinate>,
    provider: Option<Box<dyn DependencyFacts>>,
    loaded: OnceCell<Vec<(JarCoordinate, ExternalDepInfo)>>,
}

impl Default for ExternalDeps {
    fn default() -> Self {
        Self::none()
    }
}

impl ExternalDeps {
    pub fn none() -> Self {
        Self {
            jars: Vec::new(),
            provider: None,
            loaded: OnceCell::new(),
        }
    }

    pub fn new(jars: Vec<JarCoordinate>, provider: Box<dyn DependencyFacts>) -> Self {
        Self {
            jars,
            provider: Some(provider),
            loaded: OnceCell::new(),
        }
    }

    pub fn from_config(section: &DependenciesSection) -> Self {
        match &section.facts_dir {
            Some(dir) if !section.jars.is_empty() => Self::new(
                section.jars.clone(),
                Box::new(JsonDirectoryFacts::new(dir.clone())),
            ),
            _ => Self::none(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.jars.is_empty() || self.provider.is_none()
    }

    fn facts(&self) -> &[(JarCoordinate, ExternalDepInfo)] {
        self.loaded.get_or_init(|| {
            let Some(provider) = &self.provider else {
                return Vec::new();
            };
            self.jars
                .iter()
                .filter_map(|jar| match provider.facts_for(jar) {
                    Ok(info) => {
                        debug!(%jar, classes = info.hierarchy.len(), "Loaded dependency facts");
                        Some((jar.clone(), info))
                    }
                    Err(e) => {
                        warn!(%jar, error = %e, "Dependency facts unavailable");
                        None
                    }
                })
                .collect()
        })
    }

    /// Find a dependency type named `lookup` inside one of the on-demand imported packages.
    pub fn qualify(&self, lookup: &str, on_demand: &[String]) -> Option<(String, &JarCoordinate)> {
        if on_demand.is_empty() {
            return None;
        }
        let suffix = format!(".{lookup}");
        let scoped = |name: &&String| {
            name.ends_with(&suffix) && on_demand.iter().any(|i| name.contains(i.as_str()))
        };
        self.facts().iter().find_map(|(jar, info)| {
            info.hierarchy
                .keys()
                .find(scoped)
                .or_else(|| info.enums.iter().find(scoped))
                .map(|name| (name.clone(), jar))
        })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.facts()
            .iter()
            .any(|(_, info)| info.hierarchy.contains_key(name) || info.enums.contains(name))
    }

    pub fn is_enum(&self, name: &str) -> bool {
        self.facts().iter().any(|(_, info)| info.enums.contains(name))
    }

    /// Supertype adjacency across every jar.
    pub fn hierarchy_edges(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.facts().iter().flat_map(|(_, info)| {
            info.hierarchy
                .iter()
                .map(|(name, supers)| (name.as_str(), supers.as_slice()))
        })
    }

    pub fn field_types_of<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.facts().iter().flat_map(move |(_, info)| {
            info.composition
                .get(name)
                .into_iter()
                .flatten()
                .map(String::as_str)
        })
    }
}
