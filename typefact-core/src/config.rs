use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::deps::JarCoordinate;
use crate::error::ConfigError;

/// Top-level configuration, matching `typefact.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TypeFactConfig {
    #[serde(default)]
    pub qualification: QualificationSection,
    #[serde(default)]
    pub context: ContextSection,
    #[serde(default)]
    pub jdk: JdkSection,
    #[serde(default)]
    pub dependencies: DependenciesSection,
}

impl TypeFactConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.qualification.cache_capacity == 0 {
            return Err(ConfigError::Invalid {
                key: "qualification.cache_capacity",
                reason: "must be at least 1".into(),
            });
        }
        let globs = [
            ("context.include_patterns", &self.context.include_patterns),
            ("context.exclude_patterns", &self.context.exclude_patterns),
        ];
        for (key, patterns) in globs {
            for pattern in patterns {
                glob::Pattern::new(pattern).map_err(|e| ConfigError::Invalid {
                    key,
                    reason: format!("{pattern:?}: {e}"),
                })?;
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QualificationSection {
    /// Entries kept by the resolution memo before the oldest is evicted.
    pub cache_capacity: usize,
}

impl Default for QualificationSection {
    fn default() -> Self {
        Self {
            cache_capacity: 10_000,
        }
    }
}

/// Which files of a commit feed the global context.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextSection {
    pub include_patterns: Vec<String>,
    pub exclude_patterns: Vec<String>,
}

impl Default for ContextSection {
    fn default() -> Self {
        Self {
            include_patterns: vec!["**/*.java".into()],
            exclude_patterns: vec![
                "**/package-info.java".into(),
                "**/module-info.java".into(),
            ],
        }
    }
}

impl ContextSection {
    /// Whether `path` passes the include/exclude filters. Invalid patterns match nothing.
    pub fn matches(&self, path: &str) -> bool {
        let hit = |patterns: &[String]| {
            patterns
                .iter()
                .filter_map(|p| glob::Pattern::new(p).ok())
                .any(|p| p.matches(path))
        };
        hit(&self.include_patterns) && !hit(&self.exclude_patterns)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JdkSection {
    /// JSON inventory replacing the built-in one.
    pub index_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DependenciesSection {
    /// Directory holding `{group}-{version}.json` fact files.
    pub facts_dir: Option<PathBuf>,
    #[serde(default)]
    pub jars: Vec<JarCoordinate>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let config = TypeFactConfig::from_toml_str("").unwrap();
        assert_eq!(config.qualification.cache_capacity, 10_000);
        assert_eq!(config.context.include_patterns, vec!["**/*.java"]);
        assert!(config.jdk.index_path.is_none());
        assert!(config.dependencies.jars.is_empty());
    }

    #[test]
    fn parses_all_sections() {
        let config = TypeFactConfig::from_toml_str(
            r#"
[qualification]
cache_capacity = 64

[context]
include_patterns = ["src/main/**/*.java"]
exclude_patterns = []

[jdk]
index_path = "jdk.json"

[dependencies]
facts_dir = "deps"
jars = [{ group_id = "com.google.guava", artifact_id = "guava", version = "31.1" }]
"#,
        )
        .unwrap();
        assert_eq!(config.qualification.cache_capacity, 64);
        assert_eq!(config.jdk.index_path.as_deref(), Some(Path::new("jdk.json")));
        assert_eq!(config.dependencies.jars.len(), 1);
        assert_eq!(config.dependencies.jars[0].artifact_id, "guava");
    }

    #[test]
    fn partial_sections_keep_defaults() {
        let config =
            TypeFactConfig::from_toml_str("[context]\ninclude_patterns = [\"src/**/*.java\"]\n").unwrap();
        assert_eq!(config.context.include_patterns, vec!["src/**/*.java"]);
        assert_eq!(
            config.context.exclude_patterns,
            ContextSection::default().exclude_patterns
        );

        let config = TypeFactConfig::from_toml_str("[qualification]\n").unwrap();
        assert_eq!(config.qualification.cache_capacity, 10_000);
    }

    #[test]
    fn rejects_zero_capacity() {
        let err = TypeFactConfig::from_toml_str("[qualification]\ncache_capacity = 0\n").unwrap_err();
        assert!(
            matches!(err, ConfigError::Invalid { key: "qualification.cache_capacity", .. }),
            "got: {err:?}"
        );
    }

    #[test]
    fn rejects_bad_glob() {
        let err = TypeFactConfig::from_toml_str("[context]\ninclude_patterns = [\"[\"]\n")
            .unwrap_err();
        assert!(
            matches!(err, ConfigError::Invalid { key: "context.include_patterns", .. }),
            "got: {err:?}"
        );
    }

    #[test]
    fn rejects_malformed_toml() {
        let err = TypeFactConfig::from_toml_str("[qualification\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)), "got: {err:?}");
    }

    #[test]
    fn file_filters() {
        let section = ContextSection::default();
        assert!(section.matches("src/main/java/a/B.java"));
        assert!(!section.matches("src/main/java/a/package-info.java"));
        assert!(!section.matches("README.md"));
    }

    #[test]
    fn load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("typefact.toml");
        std::fs::write(&path, "[qualification]\ncache_capacity = 5\n").unwrap();
        assert_eq!(TypeFactConfig::load(&path).unwrap().qualification.cache_capacity, 5);

        let missing = TypeFactConfig::load(&dir.path().join("nope.toml")).unwrap_err();
        assert!(matches!(missing, ConfigError::Read { .. }), "got: {missing:?}");
    }
}
