// Field-of relationships between two types.

use std::collections::{BTreeMap, HashMap, HashSet};

use tracing::trace;
use typefact_graphs::{TypeGraph, TypeKind, pretty};

use crate::deps::ExternalDeps;
use crate::jdk::JdkIndex;

/// JDK field types per owner, indexed by every dotted suffix of the field type.
#[derive(Debug, Clone, Default)]
pub struct JdkFieldIndex {
    fields: HashMap<String, HashSet<String>>,
}

impl JdkFieldIndex {
    pub fn new(jdk: &JdkIndex) -> Self {
        let fields = jdk
            .fields
            .iter()
            .map(|(owner, types)| {
                let suffixes = types.iter().flat_map(|t| suffixes(t)).collect();
                (owner.clone(), suffixes)
            })
            .collect();
        Self { fields }
    }

    /// Some field of `owner` has type `target` (qualified or not).
    pub fn references(&self, owner: &str, target: &str) -> bool {
        self.fields
            .get(owner)
            .is_some_and(|types| types.contains(target))
    }
}

/// `a.b.C` → `a.b.C`, `b.C`, `C`.
fn suffixes(name: &str) -> Vec<String> {
    let mut out = vec![name.to_string()];
    let mut rest = name;
    while let Some((_, tail)) = rest.split_once('.') {
        out.push(tail.to_string());
        rest = tail;
    }
    out
}

/// Name used to look a graph up in the composition maps.
pub fn owner_name(graph: &TypeGraph) -> String {
    match graph.kind() {
        TypeKind::Simple | TypeKind::Primitive => graph.name().to_string(),
        TypeKind::Parameterized => graph.of().map_or_else(|| pretty(graph), owner_name),
        _ => pretty(graph),
    }
}

/// Evidence sources consulted by [`composes`], cheapest first.
#[derive(Debug, Clone, Copy)]
pub struct CompositionSources<'a> {
    /// Internal owner → qualified field types.
    pub internal: &'a BTreeMap<String, Vec<TypeGraph>>,
    pub jdk: &'a JdkFieldIndex,
    pub deps: &'a ExternalDeps,
}

/// Either type declares a field referencing the other.
pub fn composes(a: &TypeGraph, b: &TypeGraph, sources: &CompositionSources<'_>) -> bool {
    let (a, b) = (owner_name(a), owner_name(b));

    if internal_references(sources.internal, &a, &b) || internal_references(sources.internal, &b, &a) {
        trace!(%a, %b, "Composition found in internal fields");
        return true;
    }
    if sources.jdk.references(&a, &b) || sources.jdk.references(&b, &a) {
        trace!(%a, %b, "Composition found in JDK fields");
        return true;
    }
    if !sources.deps.is_empty()
        && (external_references(sources.deps, &a, &b) || external_references(sources.deps, &b, &a))
    {
        trace!(%a, %b, "Composition found in dependency fields");
        return true;
    }
    false
}

fn internal_references(internal: &BTreeMap<String, Vec<TypeGraph>>, owner: &str, target: &str) -> bool {
    internal.get(owner).is_some_and(|fields| {
        fields
            .iter()
            .any(|f| pretty(f) == target || f.any_node_match(&|n| n.name == target))
    })
}

fn external_references(deps: &ExternalDeps, owner: &str, target: &str) -> bool {
    deps.field_types_of(owner).any(|f| f == target)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn qualified(name: &str) -> TypeGraph {
        TypeGraph::simple(name)
    }

    fn internal() -> BTreeMap<String, Vec<TypeGraph>> {
        let mut map = BTreeMap::new();
        map.insert(
            "zoo.Keeper".to_string(),
            vec![TypeGraph::parameterized(
                qualified("java.util.List"),
                vec![qualified("zoo.Animal")],
            )],
        );
        map.insert("zoo.Cage".to_string(), vec![qualified("zoo.Lock")]);
        map
    }

    #[test]
    fn internal_fields_in_both_directions() {
        let internal = internal();
        let jdk = JdkFieldIndex::default();
        let deps = ExternalDeps::none();
        let sources = CompositionSources {
            internal: &internal,
            jdk: &jdk,
            deps: &deps,
        };
        assert!(composes(&qualified("zoo.Cage"), &qualified("zoo.Lock"), &sources));
        assert!(composes(&qualified("zoo.Lock"), &qualified("zoo.Cage"), &sources));
        // Generic arguments of a field count as references.
        assert!(composes(&qualified("zoo.Keeper"), &qualified("zoo.Animal"), &sources));
        assert!(!composes(&qualified("zoo.Cage"), &qualified("zoo.Animal"), &sources));
    }

    #[test]
    fn jdk_suffix_index() {
        let jdk = JdkIndex::from_json(
            r#"{"classes":["java.util.Optional"],"fields":{"java.util.Optional":["java.lang.Object"]}}"#,
        )
        .unwrap();
        let index = JdkFieldIndex::new(&jdk);
        assert!(index.references("java.util.Optional", "java.lang.Object"));
        assert!(index.references("java.util.Optional", "Object"));
        assert!(!index.references("java.util.Optional", "lang"));
    }

    #[test]
    fn owner_of_parameterized_is_raw_type() {
        let g = TypeGraph::parameterized(qualified("java.util.List"), vec![qualified("a.B")]);
        assert_eq!(owner_name(&g), "java.util.List");
    }

    #[test]
    fn suffix_list() {
        assert_eq!(suffixes("a.b.C"), vec!["a.b.C", "b.C", "C"]);
        assert_eq!(suffixes("C"), vec!["C"]);
    }
}
