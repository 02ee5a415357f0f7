// Inheritance relation between two qualified type names.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::Dfs;
use serde::{Serialize, Serializer};

const OBJECT: &str = "java.lang.Object";

/// How the type before a change relates to the type after it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HierarchyRelation {
    /// The new type is a supertype of the old one.
    TSuperR,
    /// The old type is a supertype of the new one.
    RSuperT,
    /// The two share a supertype other than `java.lang.Object`.
    Sibling,
    NoRelation,
    /// The kind pair has no inheritance semantics.
    NoHierarchySupport,
}

impl HierarchyRelation {
    /// The relation seen from the other side.
    #[must_use]
    pub fn reversed(self) -> Self {
        match self {
            Self::TSuperR => Self::RSuperT,
            Self::RSuperT => Self::TSuperR,
            other => other,
        }
    }
}

impl fmt::Display for HierarchyRelation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::TSuperR => "T_SUPER_R",
            Self::RSuperT => "R_SUPER_T",
            Self::Sibling => "SIBLING",
            Self::NoRelation => "NO_RELATION",
            Self::NoHierarchySupport => "NO_HIERARCHY_SUPPORT",
        };
        f.write_str(s)
    }
}

impl Serialize for HierarchyRelation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Supertype edges (`class → direct supertype`) loaded into a petgraph `DiGraph`.
#[derive(Debug, Clone, Default)]
pub struct HierarchyGraph {
    graph: DiGraph<String, ()>,
    node_to_index: HashMap<String, NodeIndex>,
}

impl HierarchyGraph {
    pub fn from_edges<'a>(edges: impl IntoIterator<Item = (&'a str, &'a [String])>) -> Self {
        let mut graph = Self::default();
        graph.add_edges(edges);
        graph
    }

    pub fn add_edges<'a>(&mut self, edges: impl IntoIterator<Item = (&'a str, &'a [String])>) {
        for (name, supers) in edges {
            let source = self.index(name);
            for s in supers {
                if s == OBJECT {
                    continue;
                }
                let target = self.index(s);
                if !self.graph.contains_edge(source, target) {
                    self.graph.add_edge(source, target, ());
                }
            }
        }
    }

    fn index(&mut self, name: &str) -> NodeIndex {
        if let Some(&idx) = self.node_to_index.get(name) {
            return idx;
        }
        let idx = self.graph.add_node(name.to_string());
        self.node_to_index.insert(name.to_string(), idx);
        idx
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Every transitive supertype of `name`, excluding `name` itself. Unknown names have none.
    pub fn super_types(&self, name: &str) -> BTreeSet<&str> {
        let Some(&start) = self.node_to_index.get(name) else {
            return BTreeSet::new();
        };
        let mut closure = BTreeSet::new();
        let mut dfs = Dfs::new(&self.graph, start);
        while let Some(idx) = dfs.next(&self.graph) {
            if idx != start {
                closure.insert(self.graph[idx].as_str());
            }
        }
        closure
    }

    /// First match wins: `to` above `from`, `from` above `to`, shared supertype, nothing.
    pub fn relation(&self, from: &str, to: &str) -> HierarchyRelation {
        let from_supers = self.super_types(from);
        if from_supers.contains(to) {
            return HierarchyRelation::RSuperT;
        }
        let to_supers = self.super_types(to);
        if to_supers.contains(from) {
            return HierarchyRelation::TSuperR;
        }
        if !from_supers.is_disjoint(&to_supers) {
            return HierarchyRelation::Sibling;
        }
        HierarchyRelation::NoRelation
    }
}

/// Relation of `from` to `to` over the internal and JDK supertype maps.
pub fn relation(
    from: &str,
    to: &str,
    internal: &BTreeMap<String, Vec<String>>,
    jdk: &BTreeMap<String, Vec<String>>,
) -> HierarchyRelation {
    let edges = internal
        .iter()
        .chain(jdk)
        .map(|(name, supers)| (name.as_str(), supers.as_slice()));
    HierarchyGraph::from_edges(edges).relation(from, to)
}
