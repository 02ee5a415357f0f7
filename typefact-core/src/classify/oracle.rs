use typefact_graphs::TypeGraph;

use crate::global_context::GlobalContext;
use crate::hierarchy::HierarchyRelation;

/// Project knowledge consulted for `Simple → Simple` changes.
///
/// `None` means the oracle has nothing to say and no tag is emitted.
pub trait Oracle {
    fn hierarchy(&self, from: &TypeGraph, to: &TypeGraph) -> Option<HierarchyRelation>;

    fn composes(&self, from: &TypeGraph, to: &TypeGraph) -> Option<bool>;
}

/// Knows nothing beyond the two graphs.
#[derive(Debug, Clone, Copy, Default)]
pub struct Syntactic;

impl Oracle for Syntactic {
    fn hierarchy(&self, _from: &TypeGraph, _to: &TypeGraph) -> Option<HierarchyRelation> {
        None
    }

    fn composes(&self, _from: &TypeGraph, _to: &TypeGraph) -> Option<bool> {
        None
    }
}

impl Oracle for GlobalContext {
    fn hierarchy(&self, from: &TypeGraph, to: &TypeGraph) -> Option<HierarchyRelation> {
        Some(self.hierarchy_relation(from, to))
    }

    fn composes(&self, from: &TypeGraph, to: &TypeGraph) -> Option<bool> {
        Some(GlobalContext::composes(self, from, to))
    }
}
