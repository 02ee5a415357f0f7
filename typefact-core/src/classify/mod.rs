//! Type change classification.
//!
//! [`classify`] dispatches once on the `(from kind, to kind)` pair of two
//! resolved type graphs. Most cells are purely structural; `Simple → Simple`
//! asks an [`Oracle`] for hierarchy and composition facts. The syntactic
//! variant uses [`Syntactic`], the semantic one a [`GlobalContext`].
//!
//! The result is an ordered list of [`TypeChange`]s: the top-level verdict
//! first, then every nested change in the order it was visited.

pub mod elements;
pub mod oracle;
pub mod primitives;
pub mod tags;

use std::fmt;

use serde::Serialize;
use tracing::trace;
use typefact_graphs::{EdgeLabel, TypeGraph, TypeKind, TypeSem, pretty, pretty_eq};

use crate::global_context::GlobalContext;
use crate::hierarchy::HierarchyRelation;
use crate::type_fact::TypeFact;

pub use elements::{ElementChange, analyze, changed_elements};
pub use oracle::{Oracle, Syntactic};
pub use tags::ChangeTag;

/// One `(from, to, tags)` verdict. `tags[0]` is always the kind tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeChange {
    pub from: TypeGraph,
    pub to: TypeGraph,
    pub tags: Vec<ChangeTag>,
}

impl TypeChange {
    pub fn has(&self, tag: ChangeTag) -> bool {
        self.tags.contains(&tag)
    }

    pub fn relation(&self) -> Option<HierarchyRelation> {
        self.tags.iter().find_map(|t| t.relation())
    }
}

impl fmt::Display for TypeChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}:", pretty(&self.from), pretty(&self.to))?;
        for (i, tag) in self.tags.iter().enumerate() {
            let sep = if i == 0 { " " } else { ", " };
            write!(f, "{sep}{tag}")?;
        }
        Ok(())
    }
}

/// Classify the change between two facts.
///
/// Unless both facts are fully resolved, the result is a single placeholder
/// carrying only the kind tag.
pub fn classify<O: Oracle + ?Sized>(from: &TypeFact, to: &TypeFact, oracle: &O) -> Vec<TypeChange> {
    if from.is_resolved() && to.is_resolved() {
        classify_graphs(from.graph(), to.graph(), oracle)
    } else {
        trace!(from = %from.pretty(), to = %to.pretty(), "Unresolved input, placeholder verdict");
        vec![placeholder(from.graph(), to.graph())]
    }
}

/// Classify two already resolved graphs.
pub fn classify_graphs<O: Oracle + ?Sized>(from: &TypeGraph, to: &TypeGraph, oracle: &O) -> Vec<TypeChange> {
    let mut classifier = Classifier {
        oracle,
        changes: Vec::new(),
    };
    classifier.visit(from, to);
    classifier.changes
}

/// Structural classification with no project knowledge.
pub fn syntactic(from: &TypeFact, to: &TypeFact) -> Vec<TypeChange> {
    classify(from, to, &Syntactic)
}

/// Classification backed by the commit's hierarchy and composition facts.
pub fn semantic(from: &TypeFact, to: &TypeFact, gc: &GlobalContext) -> Vec<TypeChange> {
    classify(from, to, gc)
}

fn placeholder(from: &TypeGraph, to: &TypeGraph) -> TypeChange {
    TypeChange {
        from: from.clone(),
        to: to.clone(),
        tags: vec![ChangeTag::for_kinds(from.kind(), to.kind())],
    }
}

fn is_enum(g: &TypeGraph) -> bool {
    g.kind() == TypeKind::Simple && g.root.type_sem == Some(TypeSem::Enum)
}

fn is_type_variable(g: &TypeGraph) -> bool {
    g.kind() == TypeKind::Simple && g.root.is_type_variable()
}

/// Autoboxing between a primitive and its wrapper class.
///
/// Compares qualified names rather than pretty forms, so type annotations
/// (`int` to `@NonNull Integer`) do not hide the conversion.
fn boxes(primitive: &TypeGraph, wrapper: &TypeGraph) -> bool {
    primitive.kind() == TypeKind::Primitive
        && wrapper.kind() == TypeKind::Simple
        && primitives::is_boxing(primitive.name(), wrapper.name())
}

/// Equal multisets of pretty-printed arguments.
fn same_arguments(a: &[&TypeGraph], b: &[&TypeGraph]) -> bool {
    let sorted = |xs: &[&TypeGraph]| {
        let mut v: Vec<String> = xs.iter().map(|g| pretty(g)).collect();
        v.sort_unstable();
        v
    };
    sorted(a) == sorted(b)
}

struct Classifier<'o, O: ?Sized> {
    oracle: &'o O,
    changes: Vec<TypeChange>,
}

impl<O: Oracle + ?Sized> Classifier<'_, O> {
    /// Reserve the slot for `(from, to)` before dispatching, so the parent
    /// verdict precedes every nested one.
    fn visit(&mut self, from: &TypeGraph, to: &TypeGraph) {
        let slot = self.changes.len();
        self.changes.push(placeholder(from, to));
        let tags = self.dispatch(from, to);
        self.changes[slot].tags = tags;
    }

    /// Nested change; pretty-equal pairs carry none.
    fn nested(&mut self, from: &TypeGraph, to: &TypeGraph) {
        if !pretty_eq(from, to) {
            self.visit(from, to);
        }
    }

    fn dispatch(&mut self, from: &TypeGraph, to: &TypeGraph) -> Vec<ChangeTag> {
        use TypeKind::{Array, Parameterized, Primitive, Simple, WildCard};

        let mut tags = vec![ChangeTag::for_kinds(from.kind(), to.kind())];
        let cell = match (from.kind(), to.kind()) {
            (Primitive, Primitive) => primitive_to_primitive(from, to),
            (Primitive, Simple) => primitive_to_simple(from, to),
            (Simple, Primitive) => simple_to_primitive(from, to),
            (Primitive, Parameterized) => primitive_to_parameterized(from, to),
            (Parameterized, Primitive) => vec![no_hierarchy()],
            (Simple, Simple) => self.simple_to_simple(from, to),
            (Primitive | Simple | Parameterized, Array) => self.to_array(from, to),
            (Array, Primitive | Simple | Parameterized) => self.from_array(from, to),
            (Simple, Parameterized) => self.simple_to_parameterized(from, to),
            (Parameterized, Simple) => self.parameterized_to_simple(from, to),
            (Parameterized, Parameterized) => self.parameterized_to_parameterized(from, to),
            (Array, Array) => {
                if let (Some(a), Some(b)) = (from.of(), to.of()) {
                    self.nested(a, b);
                }
                vec![no_hierarchy()]
            }
            (WildCard, WildCard) => self.wildcard_to_wildcard(from, to),
            (Primitive | Simple | Parameterized | Array, WildCard) => self.to_wildcard(from, to),
            (WildCard, Primitive | Simple | Parameterized | Array) => self.from_wildcard(from, to),
            // Union and Intersection have no cells.
            _ => Vec::new(),
        };
        tags.extend(cell);
        tags
    }

    fn simple_to_simple(&mut self, from: &TypeGraph, to: &TypeGraph) -> Vec<ChangeTag> {
        match (is_type_variable(from), is_type_variable(to)) {
            (true, true) => vec![no_hierarchy(), ChangeTag::ChangeTypeVariable],
            (false, true) => vec![
                ChangeTag::Hierarchy(HierarchyRelation::TSuperR),
                ChangeTag::IntroduceTypeVariable,
            ],
            (true, false) => vec![
                ChangeTag::Hierarchy(HierarchyRelation::TSuperR),
                ChangeTag::RemoveTypeVariable,
            ],
            (false, false) => {
                let mut tags = Vec::new();
                if let Some(relation) = self.oracle.hierarchy(from, to) {
                    tags.push(ChangeTag::Hierarchy(relation));
                }
                if is_enum(to) {
                    tags.push(ChangeTag::IntroduceEnum);
                }
                match self.oracle.composes(from, to) {
                    Some(true) => tags.push(ChangeTag::Composition),
                    Some(false) => tags.push(ChangeTag::NoComposition),
                    None => {}
                }
                tags
            }
        }
    }

    fn to_array(&mut self, from: &TypeGraph, to: &TypeGraph) -> Vec<ChangeTag> {
        let mut tags = vec![no_hierarchy()];
        match to.of() {
            Some(element) if pretty_eq(element, from) => tags.push(ChangeTag::ConvertToArray),
            Some(element) => self.nested(from, element),
            None => {}
        }
        tags
    }

    fn from_array(&mut self, from: &TypeGraph, to: &TypeGraph) -> Vec<ChangeTag> {
        let mut tags = vec![no_hierarchy()];
        match from.of() {
            Some(element) if pretty_eq(element, to) => tags.push(ChangeTag::ConvertFromArray),
            Some(element) => self.nested(element, to),
            None => {}
        }
        tags
    }

    fn simple_to_parameterized(&mut self, from: &TypeGraph, to: &TypeGraph) -> Vec<ChangeTag> {
        let mut tags = vec![no_hierarchy()];
        let Some(raw) = to.of() else { return tags };
        if pretty_eq(raw, from) {
            tags.push(ChangeTag::AddTypeParameters);
        } else {
            if to.params().any(|p| pretty_eq(p, from)) {
                tags.push(ChangeTag::WrapWithParameterizedType);
            }
            self.nested(from, raw);
        }
        tags
    }

    fn parameterized_to_simple(&mut self, from: &TypeGraph, to: &TypeGraph) -> Vec<ChangeTag> {
        let mut tags = vec![no_hierarchy()];
        if let Some(raw) = from.of() {
            if pretty_eq(raw, to) {
                tags.push(ChangeTag::RemoveTypeParameters);
            } else {
                if from.params().any(|p| pretty_eq(p, to)) {
                    tags.push(ChangeTag::UnwrapParameterizedType);
                }
                self.nested(raw, to);
            }
        }
        if is_enum(to) {
            tags.push(ChangeTag::IntroduceEnum);
        }
        tags
    }

    fn parameterized_to_parameterized(&mut self, from: &TypeGraph, to: &TypeGraph) -> Vec<ChangeTag> {
        let mut tags = vec![no_hierarchy()];
        let (Some(raw_from), Some(raw_to)) = (from.of(), to.of()) else {
            return tags;
        };
        if !pretty_eq(raw_from, raw_to) {
            tags.push(ChangeTag::UpdateContainer);
            self.nested(raw_from, raw_to);
            return tags;
        }

        tags.push(ChangeTag::UpdateTypeParameters);
        let before: Vec<&TypeGraph> = from.params().collect();
        let after: Vec<&TypeGraph> = to.params().collect();
        if before.len() < after.len() {
            tags.push(ChangeTag::AddTypeParameters);
        } else if before.len() > after.len() {
            tags.push(ChangeTag::RemoveTypeParameters);
        } else if same_arguments(&before, &after) {
            if before.iter().zip(&after).any(|(a, b)| !pretty_eq(a, b)) {
                tags.push(ChangeTag::ReorderTypeParameters);
            }
        } else {
            for (a, b) in before.iter().zip(&after) {
                self.nested(a, b);
            }
        }
        tags
    }

    fn to_wildcard(&mut self, from: &TypeGraph, to: &TypeGraph) -> Vec<ChangeTag> {
        match to.bound() {
            None => vec![ChangeTag::Hierarchy(HierarchyRelation::RSuperT)],
            Some((label, bound)) => {
                let (added, relation) = match label {
                    EdgeLabel::Super => (ChangeTag::AddLowerBound, HierarchyRelation::TSuperR),
                    _ => (ChangeTag::AddUpperBound, HierarchyRelation::RSuperT),
                };
                if pretty_eq(from, bound) {
                    vec![added, ChangeTag::ConvertToWildCard, ChangeTag::Hierarchy(relation)]
                } else {
                    self.nested(from, bound);
                    vec![added, no_hierarchy()]
                }
            }
        }
    }

    fn from_wildcard(&mut self, from: &TypeGraph, to: &TypeGraph) -> Vec<ChangeTag> {
        match from.bound() {
            None => vec![ChangeTag::Hierarchy(HierarchyRelation::TSuperR)],
            Some((label, bound)) => {
                let relation = match label {
                    EdgeLabel::Super => HierarchyRelation::RSuperT,
                    _ => HierarchyRelation::TSuperR,
                };
                if pretty_eq(bound, to) {
                    vec![ChangeTag::ConvertFromWildCard, ChangeTag::Hierarchy(relation)]
                } else {
                    self.nested(bound, to);
                    vec![no_hierarchy()]
                }
            }
        }
    }

    fn wildcard_to_wildcard(&mut self, from: &TypeGraph, to: &TypeGraph) -> Vec<ChangeTag> {
        use EdgeLabel::{Extends, Super};
        use HierarchyRelation::{RSuperT, TSuperR};

        match (from.bound(), to.bound()) {
            (Some((a_label, a)), Some((b_label, b))) => {
                let mut tags = vec![no_hierarchy()];
                match (a_label, b_label) {
                    (Extends, Super) => tags.push(ChangeTag::UpperToLowerBound),
                    (Super, Extends) => tags.push(ChangeTag::LowerToUpperBound),
                    _ => {}
                }
                self.nested(a, b);
                tags
            }
            (Some((Super, _)), None) => vec![ChangeTag::RemoveLowerBound, ChangeTag::Hierarchy(RSuperT)],
            (Some(_), None) => vec![ChangeTag::RemoveUpperBound, ChangeTag::Hierarchy(RSuperT)],
            (None, Some((Super, _))) => vec![ChangeTag::IntroduceLowerBound, ChangeTag::Hierarchy(TSuperR)],
            (None, Some(_)) => vec![ChangeTag::IntroduceUpperBound, ChangeTag::Hierarchy(TSuperR)],
            (None, None) => vec![no_hierarchy()],
        }
    }
}

fn no_hierarchy() -> ChangeTag {
    ChangeTag::Hierarchy(HierarchyRelation::NoHierarchySupport)
}

fn primitive_to_primitive(from: &TypeGraph, to: &TypeGraph) -> Vec<ChangeTag> {
    let mut tags = vec![no_hierarchy()];
    if primitives::is_widening(from.name(), to.name()) {
        tags.push(ChangeTag::PrimitiveWidening);
    }
    if primitives::is_narrowing(from.name(), to.name()) {
        tags.push(ChangeTag::PrimitiveNarrowing);
    }
    tags
}

fn primitive_to_simple(from: &TypeGraph, to: &TypeGraph) -> Vec<ChangeTag> {
    let mut tags = vec![no_hierarchy()];
    if boxes(from, to) {
        tags.push(ChangeTag::Boxing);
    }
    if is_type_variable(to) {
        tags.push(ChangeTag::IntroduceTypeVariable);
    }
    if is_enum(to) {
        tags.push(ChangeTag::IntroduceEnum);
    }
    tags
}

fn simple_to_primitive(from: &TypeGraph, to: &TypeGraph) -> Vec<ChangeTag> {
    let mut tags = vec![no_hierarchy()];
    if boxes(to, from) {
        tags.push(ChangeTag::Unboxing);
    }
    tags
}

fn primitive_to_parameterized(from: &TypeGraph, to: &TypeGraph) -> Vec<ChangeTag> {
    let mut tags = vec![no_hierarchy()];
    if to.params().any(|p| boxes(from, p)) {
        tags.push(ChangeTag::Boxing);
    }
    if to.params().any(is_enum) {
        tags.push(ChangeTag::IntroduceEnum);
    }
    tags
}

// ── Tests ──────────────────────────────────────────────────────────
