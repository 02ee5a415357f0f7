//! Best-effort qualification of bare type names.
//!
//! Every name-bearing node of a type graph is run through an ordered
//! fallback chain; the first tier that recognises the name wins. The local
//! chain only consults the file's own [`Context`]; the global chain also
//! consults the commit's [`GlobalContext`], the JDK index and the configured
//! dependency jars. Nodes no tier recognises are marked `DontKnow`.

pub mod cache;

use tracing::trace;
use typefact_graphs::{Namespace, TypeGraph, TypeKind, TypeNode, TypeSem};

use crate::config::QualificationSection;
use crate::context::Context;
use crate::global_context::GlobalContext;

pub use cache::{CacheStats, Pass, QualificationCache};

/// Qualifies type graphs, memoizing results per context.
///
/// Global results are keyed by the [`GlobalContext`] generation, so one
/// instance may be reused across commits. It takes `&mut self` and is not
/// meant to be shared.
#[derive(Debug)]
pub struct Qualifier {
    cache: QualificationCache,
}

impl Default for Qualifier {
    fn default() -> Self {
        Self::from_config(&QualificationSection::default())
    }
}

impl Qualifier {
    pub fn new(capacity: usize) -> Self {
        Self {
            cache: QualificationCache::new(capacity),
        }
    }

    pub fn from_config(section: &QualificationSection) -> Self {
        Self::new(section.cache_capacity)
    }

    /// Local chain only (primitives, type variables, dotted names, local declarations, imports).
    pub fn local(&mut self, graph: &TypeGraph, ctx: &Context) -> TypeGraph {
        self.cached(Pass::Local, graph, ctx, |g| resolve_local(g, ctx))
    }

    /// Full chain, consulting the commit-wide context.
    pub fn global(&mut self, graph: &TypeGraph, ctx: &Context, gc: &GlobalContext) -> TypeGraph {
        self.cached(Pass::Global(gc.generation()), graph, ctx, |g| resolve_global(g, ctx, gc))
    }

    pub fn stats(&self) -> CacheStats {
        self.cache.stats()
    }

    fn cached(
        &mut self,
        pass: Pass,
        graph: &TypeGraph,
        ctx: &Context,
        resolve: impl FnOnce(&TypeGraph) -> TypeGraph,
    ) -> TypeGraph {
        let fingerprint = ctx.fingerprint();
        if let Some(hit) = self.cache.get(fingerprint, pass, graph) {
            return hit;
        }
        let resolved = resolve(graph);
        self.cache
            .insert(fingerprint, pass, graph.clone(), resolved.clone());
        resolved
    }
}

/// Uncached local pass. The input graph is left untouched.
pub fn resolve_local(graph: &TypeGraph, ctx: &Context) -> TypeGraph {
    graph.transform(&mut |node| resolve_node(node, ctx, None))
}

/// Uncached global pass. Already settled nodes keep their qualification,
/// except that `External` names the commit declares become `Internal`.
pub fn resolve_global(graph: &TypeGraph, ctx: &Context, gc: &GlobalContext) -> TypeGraph {
    graph.transform(&mut |node| resolve_node(node, ctx, Some(gc)))
}

/// Reclassify `External` names that the commit itself declares.
pub fn refine(graph: &TypeGraph, gc: &GlobalContext) -> TypeGraph {
    graph.transform(&mut |node| refine_node(node, gc))
}

fn refine_node(node: &TypeNode, gc: &GlobalContext) -> TypeNode {
    if node.namespace == Some(Namespace::External) && gc.is_internal(&node.name) {
        let type_sem = if gc.is_enum(&node.name) {
            TypeSem::Enum
        } else {
            TypeSem::Object
        };
        return TypeNode {
            namespace: Some(Namespace::Internal),
            type_sem: Some(type_sem),
            ..node.clone()
        };
    }
    node.clone()
}

fn resolve_node(node: &TypeNode, ctx: &Context, gc: Option<&GlobalContext>) -> TypeNode {
    if !node.is_name_bearing() {
        return node.clone();
    }
    if node.is_settled() {
        return match gc {
            Some(gc) => refine_node(node, gc),
            None => node.clone(),
        };
    }
    if node.kind == TypeKind::Primitive {
        return TypeNode {
            namespace: Some(Namespace::Jdk),
            type_sem: Some(TypeSem::PrimitiveType),
            ..node.clone()
        };
    }

    let resolver = Resolver { ctx, gc };
    match resolver.resolve(&node.name, false) {
        Some(Resolution { name, namespace }) => {
            let type_sem = if namespace != Namespace::TypeVariable && resolver.is_enum(&name) {
                TypeSem::Enum
            } else {
                TypeSem::Object
            };
            trace!(lookup = %node.name, qualified = %name, ?namespace, "Qualified type name");
            TypeNode {
                name,
                namespace: Some(namespace),
                type_sem: Some(type_sem),
                ..node.clone()
            }
        }
        None => {
            trace!(lookup = %node.name, global = gc.is_some(), "No qualification found");
            TypeNode {
                namespace: Some(Namespace::DontKnow),
                ..node.clone()
            }
        }
    }
}

/// Namespace guessed from the package prefix alone.
pub fn namespace_by_prefix(name: &str) -> Namespace {
    if name.starts_with("java.") || name.starts_with("javax.") {
        Namespace::Jdk
    } else {
        Namespace::External
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Resolution {
    name: String,
    namespace: Namespace,
}

impl Resolution {
    fn new(name: &str, namespace: Namespace) -> Self {
        Self {
            name: name.to_string(),
            namespace,
        }
    }
}

struct Resolver<'a> {
    ctx: &'a Context,
    gc: Option<&'a GlobalContext>,
}

impl Resolver<'_> {
    /// `qualifier` is set while resolving the leading segment of a dotted name.
    fn resolve(&self, lookup: &str, qualifier: bool) -> Option<Resolution> {
        self.type_variable(lookup)
            .or_else(|| self.dotted(lookup))
            .or_else(|| self.declared_locally(lookup))
            .or_else(|| self.imported(lookup, qualifier))
            .or_else(|| {
                let gc = self.gc?;
                let suffix = format!(".{lookup}");
                self.java_lang(gc, &suffix)
                    .or_else(|| self.on_demand_jdk(gc, &suffix))
                    .or_else(|| self.package_scoped(gc, lookup, &suffix))
                    .or_else(|| Self::brute_force(gc, lookup))
                    .or_else(|| Self::commit_imports(gc, &suffix))
                    .or_else(|| self.external(gc, lookup))
            })
    }

    fn membership(&self, name: &str) -> Namespace {
        self.gc
            .map_or_else(|| namespace_by_prefix(name), |gc| gc.namespace_of(name))
    }

    fn is_enum(&self, name: &str) -> bool {
        self.ctx.is_local_enum(name) || self.gc.is_some_and(|gc| gc.is_enum(name))
    }

    fn type_variable(&self, lookup: &str) -> Option<Resolution> {
        self.ctx
            .is_type_variable(lookup)
            .then(|| Resolution::new(lookup, Namespace::TypeVariable))
    }

    fn dotted(&self, lookup: &str) -> Option<Resolution> {
        let (head, rest) = lookup.split_once('.')?;
        if rest.contains('.') {
            return Some(Resolution::new(lookup, self.membership(lookup)));
        }
        let head = self.resolve(head, true)?;
        if head.namespace == Namespace::TypeVariable {
            return None;
        }
        Some(Resolution {
            name: format!("{}.{rest}", head.name),
            namespace: head.namespace,
        })
    }

    fn declared_locally(&self, lookup: &str) -> Option<Resolution> {
        self.ctx
            .local_type(lookup)
            .or_else(|| self.ctx.local_enum(lookup))
            .map(|name| Resolution::new(name, Namespace::Internal))
    }

    fn imported(&self, lookup: &str, qualifier: bool) -> Option<Resolution> {
        let suffix = format!(".{lookup}");
        let imports = self.ctx.imports();
        imports
            .single
            .iter()
            .find(|i| i.ends_with(&suffix))
            .or_else(|| {
                qualifier
                    .then(|| {
                        imports
                            .on_demand
                            .iter()
                            .find(|i| i.rsplit('.').next() == Some(lookup))
                    })
                    .flatten()
            })
            .map(|name| Resolution::new(name, self.membership(name)))
    }

    fn java_lang(&self, gc: &GlobalContext, suffix: &str) -> Option<Resolution> {
        let jdk = gc.jdk();
        jdk.java_lang_classes()
            .find(|c| c.ends_with(suffix))
            .or_else(|| jdk.java_lang_enums().find(|e| e.ends_with(suffix)))
            .map(|name| Resolution::new(name, Namespace::Jdk))
    }

    fn on_demand_jdk(&self, gc: &GlobalContext, suffix: &str) -> Option<Resolution> {
        let on_demand = self.ctx.on_demand_imports();
        if on_demand.is_empty() {
            return None;
        }
        gc.jdk()
            .all_types()
            .find(|t| t.ends_with(suffix) && on_demand.iter().any(|i| in_package(t, i)))
            .map(|name| Resolution::new(name, Namespace::Jdk))
    }

    fn package_scoped(&self, gc: &GlobalContext, lookup: &str, suffix: &str) -> Option<Resolution> {
        let package = self.ctx.package();
        let on_demand = self.ctx.on_demand_imports();
        gc.types_in_package(package)
            .find(|t| t.ends_with(suffix))
            .or_else(|| {
                on_demand
                    .iter()
                    .find_map(|i| gc.types_in_package(i).find(|t| t.ends_with(suffix)))
            })
            .or_else(|| {
                gc.internal_named(lookup).find(|t| {
                    (!package.is_empty() && t.contains(package))
                        || on_demand.iter().any(|i| t.contains(i.as_str()))
                })
            })
            .map(|name| Resolution::new(name, Namespace::Internal))
    }

    fn brute_force(gc: &GlobalContext, lookup: &str) -> Option<Resolution> {
        gc.internal_named(lookup)
            .next()
            .map(|name| Resolution::new(name, Namespace::Internal))
    }

    fn commit_imports(gc: &GlobalContext, suffix: &str) -> Option<Resolution> {
        let imports = gc.all_imports();
        if let Some(name) = imports.single.iter().find(|i| i.ends_with(suffix)) {
            return Some(Resolution::new(name, gc.namespace_of(name)));
        }
        gc.internal_packages()
            .filter(|p| imports.on_demand.iter().any(|i| i.contains(p)))
            .find_map(|p| gc.types_in_package(p).find(|t| t.ends_with(suffix)))
            .map(|name| Resolution::new(name, Namespace::Internal))
    }

    fn external(&self, gc: &GlobalContext, lookup: &str) -> Option<Resolution> {
        gc.deps()
            .qualify(lookup, self.ctx.on_demand_imports())
            .map(|(name, _)| Resolution::new(&name, Namespace::External))
    }
}

/// `name` is declared directly in, or nested below, `package`.
fn in_package(name: &str, package: &str) -> bool {
    name.strip_prefix(package)
        .is_some_and(|rest| rest.starts_with('.'))
}

// ── Tests ──────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{BTreeMap, BTreeSet};
    use typefact_graphs::{Imports, pretty};

    fn ctx(package: &str, single: &[&str], on_demand: &[&str]) -> Context {
        let mut type_params = BTreeMap::new();
        type_params.insert(format!("{package}.Box"), vec!["T".to_string()]);
        let mut enums = BTreeSet::new();
        enums.insert(format!("{package}.Color"));
        Context::new(
            package,
            Imports {
                single: single.iter().map(ToString::to_string).collect(),
                on_demand: on_demand.iter().map(ToString::to_string).collect(),
            },
            vec!["M".to_string()],
            type_params,
            enums,
        )
    }

    fn node_of(g: &TypeGraph) -> &TypeNode {
        &g.root
    }

    #[test]
    fn primitives_are_jdk() {
        let g = resolve_local(&TypeGraph::primitive("int"), &ctx("p", &[], &[]));
        assert_eq!(g.root.namespace, Some(Namespace::Jdk));
        assert_eq!(g.root.type_sem, Some(TypeSem::PrimitiveType));
        assert!(g.is_resolved());
    }

    #[test]
    fn type_variables_from_method_and_type_scope() {
        let c = ctx("p", &[], &[]);
        for name in ["T", "M"] {
            let g = resolve_local(&TypeGraph::simple(name), &c);
            assert_eq!(g.name(), name);
            assert!(g.root.is_type_variable(), "{name} should be a type variable");
        }
    }

    #[test]
    fn local_declarations_are_internal() {
        let c = ctx("com.acme", &[], &[]);
        let g = resolve_local(&TypeGraph::simple("Box"), &c);
        assert_eq!(g.name(), "com.acme.Box");
        assert_eq!(g.root.namespace, Some(Namespace::Internal));
        assert_eq!(g.root.type_sem, Some(TypeSem::Object));

        let e = resolve_local(&TypeGraph::simple("Color"), &c);
        assert_eq!(e.name(), "com.acme.Color");
        assert_eq!(e.root.type_sem, Some(TypeSem::Enum));
    }

    #[test]
    fn single_imports_use_prefix_namespace() {
        let c = ctx("p", &["java.util.List", "com.google.common.collect.ImmutableList"], &[]);
        let list = resolve_local(&TypeGraph::simple("List"), &c);
        assert_eq!(list.name(), "java.util.List");
        assert_eq!(list.root.namespace, Some(Namespace::Jdk));

        let guava = resolve_local(&TypeGraph::simple("ImmutableList"), &c);
        assert_eq!(guava.root.namespace, Some(Namespace::External));
    }

    #[test]
    fn dotted_names_resolve_their_qualifier() {
        let c = ctx("p", &["java.util.Map"], &["com.acme.Outer"]);
        let entry = resolve_local(&TypeGraph::simple("Map.Entry"), &c);
        assert_eq!(entry.name(), "java.util.Map.Entry");
        assert_eq!(entry.root.namespace, Some(Namespace::Jdk));

        // The qualifier alone may match an on-demand import's last segment.
        let inner = resolve_local(&TypeGraph::simple("Outer.Inner"), &c);
        assert_eq!(inner.name(), "com.acme.Outer.Inner");

        // Two or more dots are taken as already qualified.
        let full = resolve_local(&TypeGraph::simple("org.example.Thing"), &c);
        assert_eq!(full.name(), "org.example.Thing");
        assert_eq!(full.root.namespace, Some(Namespace::External));
    }

    #[test]
    fn on_demand_import_does_not_match_plain_lookup() {
        let c = ctx("p", &[], &["com.acme.Outer"]);
        let g = resolve_local(&TypeGraph::simple("Outer"), &c);
        assert_eq!(g.root.namespace, Some(Namespace::DontKnow));
        assert!(!g.is_resolved());
    }

    #[test]
    fn unresolved_nodes_are_marked_dont_know() {
        let c = ctx("p", &[], &[]);
        let g = TypeGraph::parameterized(TypeGraph::simple("Mystery"), vec![TypeGraph::simple("T")]);
        let r = resolve_local(&g, &c);
        assert_eq!(r.of().map(|o| node_of(o).namespace), Some(Some(Namespace::DontKnow)));
        assert!(r.params().all(|p| p.root.is_type_variable()));
        assert!(!r.is_resolved());
    }

    #[test]
    fn local_pass_is_idempotent() {
        let c = ctx("p", &["java.util.List"], &[]);
        let g = TypeGraph::parse("List<Box<T>>").unwrap();
        let once = resolve_local(&g, &c);
        let twice = resolve_local(&once, &c);
        assert_eq!(once, twice);
        assert_eq!(pretty(&once), "java.util.List<p.Box<T>>");
    }

    #[test]
    fn cached_results_are_reused() {
        let c = ctx("p", &["java.util.List"], &[]);
        let mut q = Qualifier::new(8);
        let g = TypeGraph::simple("List");
        let a = q.local(&g, &c);
        let b = q.local(&g, &c);
        assert_eq!(a, b);
        let stats = q.stats();
        assert_eq!((stats.hits, stats.misses), (1, 1));
    }

    fn commit_declaring(qualified: &str) -> GlobalContext {
        use crate::config::TypeFactConfig;
        use crate::global_context::{FileStatus, SourceFile};

        let (package, name) = qualified.rsplit_once('.').unwrap();
        let mut files = BTreeMap::new();
        files.insert(
            format!("src/{package}/{name}.java"),
            SourceFile::new(format!("package {package};\npublic class {name} {{}}\n"), FileStatus::After),
        );
        GlobalContext::from_sources(&files, &TypeFactConfig::default()).unwrap()
    }

    #[test]
    fn global_results_do_not_leak_across_commits() {
        let c = ctx("x", &[], &[]);
        let g = TypeGraph::simple("Foo");
        let first = commit_declaring("a.Foo");
        let second = commit_declaring("b.Foo");
        assert_ne!(first.generation(), second.generation());

        let mut q = Qualifier::new(8);
        assert_eq!(q.global(&g, &c, &first).name(), "a.Foo");
        assert_eq!(q.global(&g, &c, &second).name(), "b.Foo");
        // Same commit again is still served from the cache.
        assert_eq!(q.global(&g, &c, &first).name(), "a.Foo");
        assert_eq!(q.stats().hits, 1);
    }

    #[test]
    fn prefix_heuristic() {
        assert_eq!(namespace_by_prefix("java.util.List"), Namespace::Jdk);
        assert_eq!(namespace_by_prefix("javax.inject.Inject"), Namespace::Jdk);
        assert_eq!(namespace_by_prefix("javafx.scene.Node"), Namespace::External);
    }
}
