//! Commit-wide view of declared types, hierarchy and composition edges.
//!
//! A [`GlobalContext`] is built once per analyzed commit from the files the
//! commit touches plus the parent revision's files, and dropped afterwards.
//! Construction happens in two phases: declarations are indexed first, then
//! every supertype and field type is qualified against those indices.

use std::cell::OnceCell;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace, warn};
use typefact_graphs::{Imports, JavaFile, Namespace, TypeGraph};

use crate::composition::{self, CompositionSources, JdkFieldIndex};
use crate::config::TypeFactConfig;
use crate::context::Context;
use crate::deps::ExternalDeps;
use crate::error::Result;
use crate::hierarchy::{HierarchyGraph, HierarchyRelation};
use crate::jdk::JdkIndex;
use crate::qualify::{Qualifier, namespace_by_prefix};
use crate::type_fact::TypeFact;

/// Which revision a file's content comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FileStatus {
    Before,
    After,
    Unchanged,
}

impl FileStatus {
    /// Declarations from newer content take precedence when names collide.
    fn precedence(self) -> u8 {
        match self {
            Self::After => 0,
            Self::Unchanged => 1,
            Self::Before => 2,
        }
    }
}

/// Content of one file in the analyzed commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub content: String,
    pub status: FileStatus,
}

impl SourceFile {
    pub fn new(content: impl Into<String>, status: FileStatus) -> Self {
        Self {
            content: content.into(),
            status,
        }
    }
}

/// Declarations contributed by one file.
#[derive(Debug, Clone)]
pub struct Information {
    pub path: String,
    pub package: String,
    pub type_decls: BTreeSet<String>,
    pub enum_decls: BTreeSet<String>,
    pub imports: Imports,
    /// Declared type → direct supertypes (generic arguments stripped).
    pub super_types: BTreeMap<String, Vec<TypeFact>>,
    /// Declared type → field types.
    pub composes: BTreeMap<String, Vec<TypeFact>>,
    pub status: FileStatus,
}

impl Information {
    /// Default constructor: parse `content` as Java.
    pub fn from_java_source(path: &str, content: &str, status: FileStatus) -> Result<Self> {
        let file = JavaFile::parse(content, path)?;
        Ok(Self::from_java_file(path, &file, status))
    }

    pub fn from_java_file(path: &str, file: &JavaFile, status: FileStatus) -> Self {
        let context = Arc::new(Context::for_types(file));
        let facts = |graphs: &BTreeMap<String, Vec<TypeGraph>>| -> BTreeMap<String, Vec<TypeFact>> {
            graphs
                .iter()
                .map(|(owner, gs)| {
                    let fs = gs
                        .iter()
                        .map(|g| TypeFact::new(g, Arc::clone(&context)))
                        .collect();
                    (owner.clone(), fs)
                })
                .collect()
        };
        Self {
            path: path.to_string(),
            package: file.package.clone(),
            type_decls: file.type_decls.keys().cloned().collect(),
            enum_decls: file.enums.clone(),
            imports: file.imports.clone(),
            super_types: facts(&file.super_types),
            composes: facts(&file.fields),
            status,
        }
    }

    fn declared(&self) -> impl Iterator<Item = &String> {
        self.type_decls.iter().chain(&self.enum_decls)
    }
}

/// Per-commit aggregate consulted by qualification, hierarchy and composition lookups.
///
/// Lazily extended state lives in a `OnceCell`, so a context is confined to one thread.
#[derive(Debug)]
pub struct GlobalContext {
    /// Distinguishes this context from every other built in the process.
    generation: u64,
    /// Package → per-file records, newest content first.
    files: BTreeMap<String, Vec<Information>>,
    jdk: JdkIndex,
    deps: ExternalDeps,
    /// Package → declared types, then declared enums.
    packages: BTreeMap<String, Vec<String>>,
    internal_classes: BTreeSet<String>,
    internal_enums: BTreeSet<String>,
    /// Simple name → qualified internal names, classes before enums.
    by_simple_name: HashMap<String, Vec<String>>,
    imports: Imports,
    /// Internal type → pretty-printed qualified supertypes.
    hierarchy: BTreeMap<String, Vec<String>>,
    /// Internal type → qualified field types.
    composition: BTreeMap<String, Vec<TypeGraph>>,
    jdk_fields: JdkFieldIndex,
    hierarchy_graph: HierarchyGraph,
    /// `hierarchy_graph` plus dependency edges, built on first need.
    extended_hierarchy: OnceCell<HierarchyGraph>,
}

static NEXT_GENERATION: AtomicU64 = AtomicU64::new(0);

impl GlobalContext {
    /// Build the context for one commit.
    ///
    /// `files` maps repository paths to content; paths outside the configured
    /// include/exclude globs are ignored and files `make_info` rejects are
    /// logged and skipped.
    pub fn build<F>(
        files: &BTreeMap<String, SourceFile>,
        jdk: JdkIndex,
        deps: ExternalDeps,
        config: &TypeFactConfig,
        mut make_info: F,
    ) -> Self
    where
        F: FnMut(&str, &str, FileStatus) -> Result<Information>,
    {
        let mut infos = Vec::new();
        for (path, file) in files {
            if !config.context.matches(path) {
                trace!(path = %path, "Outside context filters");
                continue;
            }
            match make_info(path, &file.content, file.status) {
                Ok(info) => infos.push(info),
                Err(e) => warn!(path = %path, error = %e, "Skipping file"),
            }
        }
        infos.sort_by_key(|i| i.status.precedence());

        let mut gc = Self::index(infos, jdk, deps);
        let mut qualifier = Qualifier::from_config(&config.qualification);
        gc.qualify_declarations(&mut qualifier);

        info!(
            files = gc.files.values().map(Vec::len).sum::<usize>(),
            classes = gc.internal_classes.len(),
            enums = gc.internal_enums.len(),
            hierarchy_edges = gc.hierarchy_graph.edge_count(),
            "Built global context"
        );
        gc
    }

    /// Build with the JDK index, dependency facts and Java parser named by `config`.
    pub fn from_sources(files: &BTreeMap<String, SourceFile>, config: &TypeFactConfig) -> Result<Self> {
        let mut jdk = JdkIndex::builtin();
        if let Some(path) = &config.jdk.index_path {
            jdk.merge(JdkIndex::load(path)?);
        }
        let deps = ExternalDeps::from_config(&config.dependencies);
        Ok(Self::build(files, jdk, deps, config, Information::from_java_source))
    }

    fn index(infos: Vec<Information>, jdk: JdkIndex, deps: ExternalDeps) -> Self {
        let mut files: BTreeMap<String, Vec<Information>> = BTreeMap::new();
        let mut packages: BTreeMap<String, Vec<String>> = BTreeMap::new();
        let mut internal_classes = BTreeSet::new();
        let mut internal_enums = BTreeSet::new();
        let mut imports = Imports::default();

        for info in infos {
            let declared = packages.entry(info.package.clone()).or_default();
            for name in info.declared() {
                if !declared.contains(name) {
                    declared.push(name.clone());
                }
            }
            internal_classes.extend(info.type_decls.iter().cloned());
            internal_enums.extend(info.enum_decls.iter().cloned());
            imports.extend(&info.imports);
            files.entry(info.package.clone()).or_default().push(info);
        }

        let mut by_simple_name: HashMap<String, Vec<String>> = HashMap::new();
        for name in internal_classes.iter().chain(&internal_enums) {
            by_simple_name
                .entry(simple_name(name).to_string())
                .or_default()
                .push(name.clone());
        }

        let jdk_fields = JdkFieldIndex::new(&jdk);
        debug!(
            packages = packages.len(),
            jdk_types = jdk.classes.len() + jdk.enums.len(),
            "Indexed declarations"
        );

        Self {
            generation: NEXT_GENERATION.fetch_add(1, Ordering::Relaxed),
            files,
            jdk,
            deps,
            packages,
            internal_classes,
            internal_enums,
            by_simple_name,
            imports,
            hierarchy: BTreeMap::new(),
            composition: BTreeMap::new(),
            jdk_fields,
            hierarchy_graph: HierarchyGraph::default(),
            extended_hierarchy: OnceCell::new(),
        }
    }

    /// Second phase: qualify supertypes and field types, then derive the edge maps.
    fn qualify_declarations(&mut self, qualifier: &mut Qualifier) {
        let mut files = std::mem::take(&mut self.files);
        let mut unresolved = 0usize;

        let gc: &Self = self;
        for info in files.values_mut().flatten() {
            for facts in info.super_types.values_mut().chain(info.composes.values_mut()) {
                let pending = std::mem::take(facts);
                *facts = pending
                    .into_iter()
                    .map(|f| f.qualify(qualifier, gc))
                    .inspect(|f| {
                        if !f.is_resolved() {
                            unresolved += 1;
                        }
                    })
                    .collect();
            }
        }
        if unresolved > 0 {
            debug!(unresolved, "Declaration types left partially qualified");
        }

        // Newest content comes first within a package, so the first entry wins.
        for info in files.values().flatten() {
            for (owner, supers) in &info.super_types {
                self.hierarchy
                    .entry(owner.clone())
                    .or_insert_with(|| supers.iter().map(TypeFact::pretty).collect());
            }
            for (owner, fields) in &info.composes {
                self.composition
                    .entry(owner.clone())
                    .or_insert_with(|| fields.iter().map(|f| f.graph().clone()).collect());
            }
        }
        self.files = files;

        self.hierarchy_graph = HierarchyGraph::from_edges(
            self.hierarchy
                .iter()
                .chain(&self.jdk.super_types)
                .map(|(name, supers)| (name.as_str(), supers.as_slice())),
        );
    }

    // ── Lookups ────────────────────────────────────────────────────

    /// Identity used to keep cached global qualifications apart across commits.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn jdk(&self) -> &JdkIndex {
        &self.jdk
    }

    pub fn deps(&self) -> &ExternalDeps {
        &self.deps
    }

    pub fn information(&self) -> impl Iterator<Item = &Information> {
        self.files.values().flatten()
    }

    pub fn files_in_package(&self, package: &str) -> &[Information] {
        self.files.get(package).map_or(&[][..], Vec::as_slice)
    }

    /// Types and enums declared in `package`.
    pub fn types_in_package(&self, package: &str) -> impl Iterator<Item = &str> {
        self.packages
            .get(package)
            .into_iter()
            .flatten()
            .map(String::as_str)
    }

    /// Non-empty packages declared by the commit.
    pub fn internal_packages(&self) -> impl Iterator<Item = &str> {
        self.packages
            .keys()
            .filter(|p| !p.is_empty())
            .map(String::as_str)
    }

    pub fn internal_classes(&self) -> &BTreeSet<String> {
        &self.internal_classes
    }

    pub fn internal_enums(&self) -> &BTreeSet<String> {
        &self.internal_enums
    }

    /// Internal classes then enums whose qualified name ends with `.{lookup}`.
    pub fn internal_named<'a>(&'a self, lookup: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.by_simple_name
            .get(simple_name(lookup))
            .into_iter()
            .flatten()
            .map(String::as_str)
            .filter(move |name| {
                name.strip_suffix(lookup)
                    .is_some_and(|head| head.ends_with('.'))
            })
    }

    /// Imports of every file, merged.
    pub fn all_imports(&self) -> &Imports {
        &self.imports
    }

    pub fn is_internal(&self, name: &str) -> bool {
        self.internal_classes.contains(name) || self.internal_enums.contains(name)
    }

    /// Internal, JDK or dependency enum.
    pub fn is_enum(&self, name: &str) -> bool {
        self.internal_enums.contains(name) || self.jdk.is_enum(name) || self.deps.is_enum(name)
    }

    /// Namespace of an already qualified name, by membership.
    pub fn namespace_of(&self, name: &str) -> Namespace {
        if self.is_internal(name) {
            Namespace::Internal
        } else if self.jdk.contains(name) {
            Namespace::Jdk
        } else {
            namespace_by_prefix(name)
        }
    }

    /// Internal type → pretty-printed qualified supertypes.
    pub fn hierarchy(&self) -> &BTreeMap<String, Vec<String>> {
        &self.hierarchy
    }

    /// Internal type → qualified field types.
    pub fn composition(&self) -> &BTreeMap<String, Vec<TypeGraph>> {
        &self.composition
    }

    /// Qualified supertypes declared for `class`, from the newest file declaring it.
    pub fn super_types_of(&self, class: &str) -> &[TypeFact] {
        self.information()
            .find_map(|i| i.super_types.get(class))
            .map_or(&[][..], Vec::as_slice)
    }

    // ── Relations ──────────────────────────────────────────────────

    /// Inheritance relation between two simple types, falling back to dependency edges.
    pub fn hierarchy_relation(&self, from: &TypeGraph, to: &TypeGraph) -> HierarchyRelation {
        let (a, b) = (from.name(), to.name());
        let relation = self.hierarchy_graph.relation(a, b);
        if relation != HierarchyRelation::NoRelation || self.deps.is_empty() {
            return relation;
        }
        let extended = self.extended_hierarchy.get_or_init(|| {
            let mut graph = self.hierarchy_graph.clone();
            graph.add_edges(self.deps.hierarchy_edges());
            debug!(edges = graph.edge_count(), "Extended hierarchy with dependency edges");
            graph
        });
        extended.relation(a, b)
    }

    pub fn composes(&self, a: &TypeGraph, b: &TypeGraph) -> bool {
        composition::composes(
            a,
            b,
            &CompositionSources {
                internal: &self.composition,
                jdk: &self.jdk_fields,
                deps: &self.deps,
            },
        )
    }
}

fn simple_name(name: &str) -> &str {
    name.rsplit('.').next().unwrap_or(name)
}

// ── Tests ──────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::qualify::resolve_global;
    use typefact_graphs::pretty;

    const ANIMAL: &str = "package zoo;\npublic abstract class Animal {}\n";
    const DOG: &str = r"
package zoo;

import zoo.food.Bone;

public class Dog extends Animal implements Comparable<Dog> {
    private Bone bone;
    private String name;
}
";
    const BONE: &str = "package zoo.food;\npublic class Bone {}\n";
    const SIZE: &str = "package zoo;\npublic enum Size { SMALL, LARGE }\n";

    fn files() -> BTreeMap<String, SourceFile> {
        let mut files = BTreeMap::new();
        files.insert("src/zoo/Animal.java".into(), SourceFile::new(ANIMAL, FileStatus::Unchanged));
        files.insert("src/zoo/Dog.java".into(), SourceFile::new(DOG, FileStatus::After));
        files.insert("src/zoo/food/Bone.java".into(), SourceFile::new(BONE, FileStatus::Unchanged));
        files.insert("src/zoo/Size.java".into(), SourceFile::new(SIZE, FileStatus::After));
        files.insert("README.md".into(), SourceFile::new("# zoo", FileStatus::After));
        files
    }

    fn gc() -> GlobalContext {
        GlobalContext::from_sources(&files(), &TypeFactConfig::default()).unwrap()
    }

    #[test]
    fn indexes_declarations() {
        let gc = gc();
        assert!(gc.internal_classes().contains("zoo.Dog"));
        assert!(gc.internal_classes().contains("zoo.food.Bone"));
        assert!(gc.internal_enums().contains("zoo.Size"));
        assert!(gc.is_enum("zoo.Size"));
        let in_zoo: Vec<&str> = gc.types_in_package("zoo").collect();
        assert!(in_zoo.contains(&"zoo.Animal"), "got: {in_zoo:?}");
        assert_eq!(gc.internal_packages().collect::<Vec<_>>(), vec!["zoo", "zoo.food"]);
        assert_eq!(gc.information().count(), 4, "README.md is filtered out");
        assert_eq!(gc.files_in_package("zoo").len(), 3);
        assert!(gc.files_in_package("nowhere").is_empty());
    }

    #[test]
    fn supertypes_are_qualified_and_stripped() {
        let gc = gc();
        assert_eq!(
            gc.hierarchy().get("zoo.Dog"),
            Some(&vec!["zoo.Animal".to_string(), "java.lang.Comparable".to_string()])
        );
        assert!(gc.super_types_of("zoo.Dog").iter().all(TypeFact::is_resolved));
    }

    #[test]
    fn fields_feed_composition() {
        let gc = gc();
        let fields: Vec<String> = gc.composition()["zoo.Dog"].iter().map(pretty).collect();
        assert_eq!(fields, vec!["zoo.food.Bone", "java.lang.String"]);
        assert!(gc.composes(&TypeGraph::simple("zoo.Dog"), &TypeGraph::simple("zoo.food.Bone")));
        assert!(!gc.composes(&TypeGraph::simple("zoo.Dog"), &TypeGraph::simple("zoo.Size")));
    }

    #[test]
    fn dog_extends_animal() {
        let gc = gc();
        let dog = TypeGraph::simple("zoo.Dog");
        let animal = TypeGraph::simple("zoo.Animal");
        assert_eq!(gc.hierarchy_relation(&dog, &animal), HierarchyRelation::RSuperT);
        assert_eq!(gc.hierarchy_relation(&animal, &dog), HierarchyRelation::TSuperR);
    }

    #[test]
    fn global_chain_tiers() {
        let gc = gc();
        let ctx = Context::new(
            "zoo",
            Imports {
                single: Vec::new(),
                on_demand: vec!["java.util".into()],
            },
            Vec::new(),
            BTreeMap::new(),
            BTreeSet::new(),
        );
        let resolve = |name: &str| resolve_global(&TypeGraph::simple(name), &ctx, &gc);

        let string = resolve("String");
        assert_eq!(string.name(), "java.lang.String");
        assert_eq!(string.root.namespace, Some(Namespace::Jdk));

        let list = resolve("ArrayList");
        assert_eq!(list.name(), "java.util.ArrayList");

        let animal = resolve("Animal");
        assert_eq!(animal.name(), "zoo.Animal");
        assert_eq!(animal.root.namespace, Some(Namespace::Internal));

        // Neither in the package nor imported.
        let bone = resolve("Bone");
        assert_eq!(bone.name(), "zoo.food.Bone");

        let size = resolve("Size");
        assert_eq!(size.root.type_sem, Some(typefact_graphs::TypeSem::Enum));

        let unknown = resolve("Nothing");
        assert_eq!(unknown.root.namespace, Some(Namespace::DontKnow));
    }

    #[test]
    fn newest_declaration_wins() {
        let mut files = BTreeMap::new();
        files.insert(
            "a/old/Dog.java".into(),
            SourceFile::new("package zoo;\nclass Dog extends Pet {}\nclass Pet {}\n", FileStatus::Before),
        );
        files.insert(
            "b/new/Dog.java".into(),
            SourceFile::new(
                "package zoo;\nclass Dog extends Animal {}\nclass Animal {}\n",
                FileStatus::After,
            ),
        );
        let gc = GlobalContext::from_sources(&files, &TypeFactConfig::default()).unwrap();
        assert_eq!(gc.hierarchy()["zoo.Dog"], vec!["zoo.Animal".to_string()]);
    }

    #[test]
    fn unparseable_files_are_skipped() {
        let mut calls = 0;
        let gc = GlobalContext::build(
            &files(),
            JdkIndex::builtin(),
            ExternalDeps::none(),
            &TypeFactConfig::default(),
            |path, content, status| {
                calls += 1;
                if path.ends_with("Bone.java") {
                    return Err(crate::error::TypeFactError::Graph(
                        typefact_graphs::GraphError::Parse {
                            path: path.to_string(),
                            message: "boom".into(),
                        },
                    ));
                }
                Information::from_java_source(path, content, status)
            },
        );
        assert_eq!(calls, 4);
        assert!(!gc.is_internal("zoo.food.Bone"));
        assert!(gc.is_internal("zoo.Dog"));
    }
}
