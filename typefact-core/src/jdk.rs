// JDK type inventory: classes, enums, supertype edges and field types.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::JdkError;

const BUILTIN_INDEX: &str = include_str!("../data/jdk_index.json");

const OBJECT: &str = "java.lang.Object";

/// Inventory of JDK types consulted by qualification, hierarchy and composition lookups.
///
/// Supertype lists never contain `java.lang.Object`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JdkIndex {
    /// Non-enum classes and interfaces.
    #[serde(default)]
    pub classes: BTreeSet<String>,
    #[serde(default)]
    pub enums: BTreeSet<String>,
    /// Qualified name → direct supertypes.
    #[serde(default)]
    pub super_types: BTreeMap<String, Vec<String>>,
    /// Qualified name → declared field type names.
    #[serde(default)]
    pub fields: BTreeMap<String, Vec<String>>,
}

impl JdkIndex {
    /// The inventory shipped with the crate.
    pub fn builtin() -> Self {
        match Self::from_json(BUILTIN_INDEX) {
            Ok(index) => index,
            Err(e) => {
                warn!(error = %e, "Built-in JDK index is malformed, continuing with an empty one");
                Self::default()
            }
        }
    }

    pub fn from_json(text: &str) -> Result<Self, JdkError> {
        let mut index: Self = serde_json::from_str(text)?;
        for supers in index.super_types.values_mut() {
            supers.retain(|s| s != OBJECT);
        }
        index.super_types.retain(|_, supers| !supers.is_empty());
        Ok(index)
    }

    pub fn load(path: &Path) -> Result<Self, JdkError> {
        let text = std::fs::read_to_string(path).map_err(|source| JdkError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let index = Self::from_json(&text)?;
        debug!(
            path = %path.display(),
            classes = index.classes.len(),
            enums = index.enums.len(),
            "Loaded JDK index"
        );
        Ok(index)
    }

    /// Add every entry of `other`; supertype and field lists are unioned.
    pub fn merge(&mut self, other: JdkIndex) {
        self.classes.extend(other.classes);
        self.enums.extend(other.enums);
        for (name, supers) in other.super_types {
            let entry = self.super_types.entry(name).or_default();
            for s in supers {
                if s != OBJECT && !entry.contains(&s) {
                    entry.push(s);
                }
            }
        }
        for (name, fields) in other.fields {
            self.fields.entry(name).or_default().extend(fields);
        }
    }

    pub fn is_enum(&self, name: &str) -> bool {
        self.enums.contains(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.classes.contains(name) || self.enums.contains(name)
    }

    /// Classes and enums together.
    pub fn all_types(&self) -> impl Iterator<Item = &str> {
        self.classes.iter().chain(self.enums.iter()).map(String::as_str)
    }

    /// Non-enum classes implicitly visible through `java.lang`.
    pub fn java_lang_classes(&self) -> impl Iterator<Item = &str> {
        self.classes
            .iter()
            .map(String::as_str)
            .filter(|n| in_java_lang(n))
    }

    pub fn java_lang_enums(&self) -> impl Iterator<Item = &str> {
        self.enums
            .iter()
            .map(String::as_str)
            .filter(|n| in_java_lang(n))
    }

    pub fn super_types_of(&self, name: &str) -> &[String] {
        self.super_types.get(name).map_or(&[][..], Vec::as_slice)
    }

    pub fn field_types_of(&self, name: &str) -> &[String] {
        self.fields.get(name).map_or(&[][..], Vec::as_slice)
    }
}

/// Members of `java.lang` itself (nested types included), not of its subpackages.
fn in_java_lang(name: &str) -> bool {
    name.strip_prefix("java.lang.")
        .and_then(|rest| rest.chars().next())
        .is_some_and(char::is_uppercase)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_index_loads() {
        let jdk = JdkIndex::builtin();
        assert!(jdk.classes.contains("java.lang.String"));
        assert!(jdk.classes.contains("java.util.ArrayList"));
        assert!(jdk.is_enum("java.util.concurrent.TimeUnit"));
        assert!(!jdk.classes.contains("java.util.concurrent.TimeUnit"), "enums are kept apart");
        assert!(
            jdk.super_types_of("java.util.ArrayList")
                .contains(&"java.util.List".to_string())
        );
    }

    #[test]
    fn java_lang_excludes_subpackages() {
        let jdk = JdkIndex::builtin();
        let lang: Vec<&str> = jdk.java_lang_classes().collect();
        assert!(lang.contains(&"java.lang.Integer"));
        assert!(!lang.contains(&"java.lang.reflect.Method"), "got: {lang:?}");
        let lang_enums: Vec<&str> = jdk.java_lang_enums().collect();
        assert_eq!(lang_enums, vec!["java.lang.Thread.State"]);
    }

    #[test]
    fn object_is_never_a_supertype() {
        let jdk = JdkIndex::from_json(
            r#"{"classes":["a.B"],"super_types":{"a.B":["java.lang.Object"],"a.C":["java.lang.Object","a.B"]}}"#,
        )
        .unwrap();
        assert!(jdk.super_types_of("a.B").is_empty());
        assert_eq!(jdk.super_types_of("a.C"), ["a.B".to_string()]);
        assert!(!jdk.super_types.contains_key("a.B"));
    }

    #[test]
    fn merge_unions_entries() {
        let mut jdk = JdkIndex::builtin();
        let extra = JdkIndex::from_json(
            r#"{"classes":["javax.swing.JList"],"super_types":{"java.util.ArrayList":["javax.swing.Marker"]}}"#,
        )
        .unwrap();
        jdk.merge(extra);
        assert!(jdk.contains("javax.swing.JList"));
        let supers = jdk.super_types_of("java.util.ArrayList");
        assert!(supers.contains(&"java.util.List".to_string()));
        assert!(supers.contains(&"javax.swing.Marker".to_string()));
    }

    #[test]
    fn load_reports_missing_and_malformed_files() {
        let dir = tempfile::tempdir().unwrap();
        let err = JdkIndex::load(&dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, JdkError::Io { .. }), "got: {err:?}");

        let bad = dir.path().join("bad.json");
        std::fs::write(&bad, "{ not json").unwrap();
        let err = JdkIndex::load(&bad).unwrap_err();
        assert!(matches!(err, JdkError::Format(_)), "got: {err:?}");
    }
}
