use std::sync::Arc;

use typefact_graphs::{TypeGraph, pretty};

use crate::context::Context;
use crate::global_context::GlobalContext;
use crate::qualify::{self, Qualifier};

/// A type expression on its way to full qualification.
///
/// While some node is still unknown the fact keeps the context needed to
/// retry; once every node is settled only the resolved graph remains.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeFact {
    Unresolved {
        graph: TypeGraph,
        context: Arc<Context>,
    },
    Resolved {
        graph: TypeGraph,
    },
}

impl TypeFact {
    /// Run the local pass over `graph`.
    pub fn new(graph: &TypeGraph, context: Arc<Context>) -> Self {
        let qualified = qualify::resolve_local(graph, &context);
        Self::settle(qualified, context)
    }

    /// Like [`TypeFact::new`], memoized through `qualifier`.
    pub fn with_qualifier(graph: &TypeGraph, context: Arc<Context>, qualifier: &mut Qualifier) -> Self {
        let qualified = qualifier.local(graph, &context);
        Self::settle(qualified, context)
    }

    fn settle(graph: TypeGraph, context: Arc<Context>) -> Self {
        if graph.is_resolved() {
            Self::Resolved { graph }
        } else {
            Self::Unresolved { graph, context }
        }
    }

    /// Run the global pass. Resolved facts only get their `External` names refined.
    #[must_use]
    pub fn qualify(self, qualifier: &mut Qualifier, gc: &GlobalContext) -> Self {
        match self {
            Self::Resolved { graph } => Self::Resolved {
                graph: qualify::refine(&graph, gc),
            },
            Self::Unresolved { graph, context } => {
                let qualified = qualifier.global(&graph, &context, gc);
                Self::settle(qualified, context)
            }
        }
    }

    pub fn graph(&self) -> &TypeGraph {
        match self {
            Self::Unresolved { graph, .. } | Self::Resolved { graph } => graph,
        }
    }

    pub fn into_graph(self) -> TypeGraph {
        match self {
            Self::Unresolved { graph, .. } | Self::Resolved { graph } => graph,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, Self::Resolved { .. })
    }

    pub fn context(&self) -> Option<&Context> {
        match self {
            Self::Unresolved { context, .. } => Some(context),
            Self::Resolved { .. } => None,
        }
    }

    pub fn pretty(&self) -> String {
        pretty(self.graph())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{BTreeMap, BTreeSet};
    use typefact_graphs::Imports;

    fn context() -> Arc<Context> {
        Arc::new(Context::new(
            "p",
            Imports {
                single: vec!["java.util.List".into()],
                on_demand: Vec::new(),
            },
            Vec::new(),
            BTreeMap::new(),
            BTreeSet::new(),
        ))
    }

    #[test]
    fn fully_local_graph_drops_context() {
        let fact = TypeFact::new(&TypeGraph::parse("List<int[]>").unwrap(), context());
        assert!(fact.is_resolved());
        assert!(fact.context().is_none());
        assert_eq!(fact.pretty(), "java.util.List<int[]>");
    }

    #[test]
    fn unknown_name_keeps_context() {
        let fact = TypeFact::new(&TypeGraph::parse("List<String>").unwrap(), context());
        assert!(!fact.is_resolved());
        assert_eq!(fact.context().map(Context::package), Some("p"));
    }

    #[test]
    fn cached_construction_matches_uncached() {
        let mut q = Qualifier::new(4);
        let g = TypeGraph::parse("List<String>").unwrap();
        let a = TypeFact::with_qualifier(&g, context(), &mut q);
        let b = TypeFact::new(&g, context());
        assert_eq!(a, b);
    }
}
