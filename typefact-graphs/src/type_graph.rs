// Type graph model: one immutable recursive tree per syntactic type expression.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::GraphError;

// ── Node classification ────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TypeKind {
    Primitive,
    Simple,
    Parameterized,
    Array,
    WildCard,
    Union,
    Intersection,
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Primitive => "Primitive",
            Self::Simple => "Simple",
            Self::Parameterized => "Parameterized",
            Self::Array => "Array",
            Self::WildCard => "WildCard",
            Self::Union => "Union",
            Self::Intersection => "Intersection",
        };
        f.write_str(s)
    }
}

/// Where a named type was found during qualification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Namespace {
    /// Declared by the analyzed project.
    Internal,
    /// Part of the JDK (or a primitive).
    Jdk,
    /// Declared by a third-party dependency.
    External,
    /// A generic type parameter in scope.
    TypeVariable,
    /// Every lookup tier failed.
    DontKnow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeSem {
    Object,
    Enum,
    PrimitiveType,
}

/// One node of a [`TypeGraph`].
///
/// `namespace` and `type_sem` stay `None` until a qualification pass assigns them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeNode {
    pub kind: TypeKind,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<Namespace>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_sem: Option<TypeSem>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<String>,
}

impl TypeNode {
    pub fn new(kind: TypeKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            namespace: None,
            type_sem: None,
            annotations: Vec::new(),
        }
    }

    /// Composite nodes carry no name and never need qualification.
    pub fn is_name_bearing(&self) -> bool {
        !self.name.is_empty()
    }

    /// True once the node needs no further qualification work.
    pub fn is_settled(&self) -> bool {
        !self.is_name_bearing()
            || matches!(self.namespace, Some(ns) if ns != Namespace::DontKnow)
    }

    pub fn is_type_variable(&self) -> bool {
        self.namespace == Some(Namespace::TypeVariable)
    }
}

// ── Edge labels ────────────────────────────────────────────────────

/// Label of an edge from a composite node to one of its children.
///
/// The derived ordering keeps `of` first and indexed labels in numeric order,
/// so iterating a graph's edges visits parameters in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EdgeLabel {
    Of,
    Param(usize),
    Extends,
    Super,
    Union(usize),
    Intersection(usize),
}

impl EdgeLabel {
    pub fn is_param(self) -> bool {
        matches!(self, Self::Param(_))
    }
}

impl fmt::Display for EdgeLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Of => f.write_str("of"),
            Self::Param(i) => write!(f, "Param:{i}"),
            Self::Extends => f.write_str("extends"),
            Self::Super => f.write_str("super"),
            Self::Union(i) => write!(f, "Union:{i}"),
            Self::Intersection(i) => write!(f, "Intersection:{i}"),
        }
    }
}

impl FromStr for EdgeLabel {
    type Err = GraphError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || GraphError::EdgeLabel(s.to_string());
        match s {
            "of" => Ok(Self::Of),
            "extends" => Ok(Self::Extends),
            "super" => Ok(Self::Super),
            _ => {
                let (prefix, index) = s.split_once(':').ok_or_else(bad)?;
                let index: usize = index.parse().map_err(|_| bad())?;
                match prefix {
                    "Param" => Ok(Self::Param(index)),
                    "Union" => Ok(Self::Union(index)),
                    "Intersection" => Ok(Self::Intersection(index)),
                    _ => Err(bad()),
                }
            }
        }
    }
}

impl Serialize for EdgeLabel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for EdgeLabel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

// ── Graph ──────────────────────────────────────────────────────────

/// A syntactic type expression: a root node plus labelled child graphs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeGraph {
    pub root: TypeNode,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub edges: BTreeMap<EdgeLabel, TypeGraph>,
}

impl TypeGraph {
    pub fn leaf(root: TypeNode) -> Self {
        Self {
            root,
            edges: BTreeMap::new(),
        }
    }

    pub fn primitive(name: &str) -> Self {
        Self::leaf(TypeNode::new(TypeKind::Primitive, name))
    }

    pub fn simple(name: &str) -> Self {
        Self::leaf(TypeNode::new(TypeKind::Simple, name))
    }

    pub fn parameterized(of: TypeGraph, params: Vec<TypeGraph>) -> Self {
        let mut edges = BTreeMap::new();
        edges.insert(EdgeLabel::Of, of);
        for (i, p) in params.into_iter().enumerate() {
            edges.insert(EdgeLabel::Param(i), p);
        }
        Self {
            root: TypeNode::new(TypeKind::Parameterized, ""),
            edges,
        }
    }

    pub fn array(of: TypeGraph) -> Self {
        let mut edges = BTreeMap::new();
        edges.insert(EdgeLabel::Of, of);
        Self {
            root: TypeNode::new(TypeKind::Array, ""),
            edges,
        }
    }

    /// The unbounded wildcard `?`.
    pub fn wildcard() -> Self {
        Self::leaf(TypeNode::new(TypeKind::WildCard, ""))
    }

    pub fn wildcard_extends(bound: TypeGraph) -> Self {
        let mut g = Self::wildcard();
        g.edges.insert(EdgeLabel::Extends, bound);
        g
    }

    pub fn wildcard_super(bound: TypeGraph) -> Self {
        let mut g = Self::wildcard();
        g.edges.insert(EdgeLabel::Super, bound);
        g
    }

    pub fn union(members: Vec<TypeGraph>) -> Self {
        Self::members(TypeKind::Union, members, EdgeLabel::Union)
    }

    pub fn intersection(members: Vec<TypeGraph>) -> Self {
        Self::members(TypeKind::Intersection, members, EdgeLabel::Intersection)
    }

    fn members(kind: TypeKind, members: Vec<TypeGraph>, label: fn(usize) -> EdgeLabel) -> Self {
        Self {
            root: TypeNode::new(kind, ""),
            edges: members
                .into_iter()
                .enumerate()
                .map(|(i, m)| (label(i), m))
                .collect(),
        }
    }

    #[must_use]
    pub fn with_annotations(mut self, annotations: Vec<String>) -> Self {
        self.root.annotations = annotations;
        self
    }

    pub fn kind(&self) -> TypeKind {
        self.root.kind
    }

    pub fn name(&self) -> &str {
        &self.root.name
    }

    pub fn edge(&self, label: EdgeLabel) -> Option<&TypeGraph> {
        self.edges.get(&label)
    }

    /// The raw type of a parameterized graph, or the element type of an array.
    pub fn of(&self) -> Option<&TypeGraph> {
        self.edge(EdgeLabel::Of)
    }

    /// Generic arguments in declaration order.
    pub fn params(&self) -> impl Iterator<Item = &TypeGraph> {
        self.edges
            .iter()
            .filter(|(label, _)| label.is_param())
            .map(|(_, g)| g)
    }

    /// The `extends`/`super` bound of a wildcard, if any.
    pub fn bound(&self) -> Option<(EdgeLabel, &TypeGraph)> {
        self.edge(EdgeLabel::Extends)
            .map(|g| (EdgeLabel::Extends, g))
            .or_else(|| self.edge(EdgeLabel::Super).map(|g| (EdgeLabel::Super, g)))
    }

    /// Rebuild the graph with `f` applied to every node. The receiver is left untouched.
    #[must_use]
    pub fn transform(&self, f: &mut impl FnMut(&TypeNode) -> TypeNode) -> TypeGraph {
        let root = f(&self.root);
        let edges = self
            .edges
            .iter()
            .map(|(label, child)| (*label, child.transform(f)))
            .collect();
        TypeGraph { root, edges }
    }

    pub fn all_nodes_match(&self, pred: &impl Fn(&TypeNode) -> bool) -> bool {
        pred(&self.root) && self.edges.values().all(|g| g.all_nodes_match(pred))
    }

    pub fn any_node_match(&self, pred: &impl Fn(&TypeNode) -> bool) -> bool {
        pred(&self.root) || self.edges.values().any(|g| g.any_node_match(pred))
    }

    /// Every name-bearing node carries a namespace other than `DontKnow`.
    pub fn is_resolved(&self) -> bool {
        self.all_nodes_match(&TypeNode::is_settled)
    }

    /// Drop generic arguments, keeping only the raw type (used for supertype edges).
    #[must_use]
    pub fn strip_params(&self) -> TypeGraph {
        match self.kind() {
            TypeKind::Parameterized => match self.of() {
                Some(of) => of
                    .strip_params()
                    .with_annotations(self.root.annotations.clone()),
                None => self.clone(),
            },
            _ => TypeGraph {
                root: self.root.clone(),
                edges: self
                    .edges
                    .iter()
                    .map(|(label, child)| (*label, child.strip_params()))
                    .collect(),
            },
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────────
