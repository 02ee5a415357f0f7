// Declaration sites whose type changed between two revisions of a file.

use std::sync::Arc;

use serde::Serialize;
use tracing::debug;
use typefact_graphs::{ElementKey, JavaFile, TypeGraph, pretty_eq};

use super::{TypeChange, semantic};
use crate::context::Context;
use crate::global_context::GlobalContext;
use crate::qualify::Qualifier;
use crate::type_fact::TypeFact;

/// A field, return or parameter present in both revisions with a different type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ElementChange {
    pub key: ElementKey,
    pub before: TypeGraph,
    pub after: TypeGraph,
}

/// Elements declared in both files whose unqualified types differ.
pub fn changed_elements(before: &JavaFile, after: &JavaFile) -> Vec<ElementChange> {
    before
        .typed_elements
        .iter()
        .filter_map(|(key, old)| {
            let new = after.typed_elements.get(key)?;
            (!pretty_eq(old, new)).then(|| ElementChange {
                key: key.clone(),
                before: old.clone(),
                after: new.clone(),
            })
        })
        .collect()
}

/// Qualify and classify every changed element of a file.
///
/// Each side is qualified in the context of its own revision, first locally
/// and then against `gc`.
pub fn analyze(
    before: &JavaFile,
    after: &JavaFile,
    gc: &GlobalContext,
    qualifier: &mut Qualifier,
) -> Vec<(ElementKey, Vec<TypeChange>)> {
    let changed = changed_elements(before, after);
    debug!(changed = changed.len(), package = %after.package, "Classifying element type changes");

    changed
        .into_iter()
        .map(|change| {
            let from = fact(before, &change.key, &change.before, gc, qualifier);
            let to = fact(after, &change.key, &change.after, gc, qualifier);
            (change.key, semantic(&from, &to, gc))
        })
        .collect()
}

fn fact(
    file: &JavaFile,
    key: &ElementKey,
    graph: &TypeGraph,
    gc: &GlobalContext,
    qualifier: &mut Qualifier,
) -> TypeFact {
    let context = Arc::new(Context::for_element(file, key));
    TypeFact::with_qualifier(graph, context, qualifier).qualify(qualifier, gc)
}
