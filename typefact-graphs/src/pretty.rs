// Canonical string form of a type graph. Used as the equality key across the crate.

use crate::type_graph::{EdgeLabel, TypeGraph, TypeKind};

/// Render a graph as Java-like source text.
///
/// The output depends only on graph structure, so two graphs with the same
/// `pretty` form are treated as the same type everywhere.
pub fn pretty(graph: &TypeGraph) -> String {
    let mut out = String::new();
    write_graph(graph, &mut out);
    out
}

/// Compare two graphs by their canonical form.
pub fn pretty_eq(a: &TypeGraph, b: &TypeGraph) -> bool {
    pretty(a) == pretty(b)
}

fn write_graph(graph: &TypeGraph, out: &mut String) {
    for annotation in &graph.root.annotations {
        out.push_str(annotation);
        out.push(' ');
    }

    match graph.kind() {
        TypeKind::Primitive | TypeKind::Simple => out.push_str(graph.name()),
        TypeKind::Parameterized => {
            if let Some(of) = graph.of() {
                write_graph(of, out);
            }
            out.push('<');
            write_joined(graph.params(), ", ", out);
            out.push('>');
        }
        TypeKind::Array => {
            if let Some(of) = graph.of() {
                write_graph(of, out);
            }
            out.push_str("[]");
        }
        TypeKind::WildCard => {
            out.push('?');
            match graph.bound() {
                Some((EdgeLabel::Super, bound)) => {
                    out.push_str(" super ");
                    write_graph(bound, out);
                }
                Some((_, bound)) => {
                    out.push_str(" extends ");
                    write_graph(bound, out);
                }
                None => {}
            }
        }
        // Both member kinds share one separator, so `A & B` is ambiguous between them.
        TypeKind::Union | TypeKind::Intersection => {
            write_joined(graph.edges.values(), " & ", out);
        }
    }
}

fn write_joined<'a>(items: impl Iterator<Item = &'a TypeGraph>, sep: &str, out: &mut String) {
    for (i, item) in items.enumerate() {
        if i > 0 {
            out.push_str(sep);
        }
        write_graph(item, out);
    }
}

// ── Tests ──────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::type_graph::{Namespace, TypeNode};
    use proptest::prelude::*;

    fn s(name: &str) -> TypeGraph {
        TypeGraph::simple(name)
    }

    #[test]
    fn renders_each_kind() {
        insta::assert_snapshot!(pretty(&TypeGraph::primitive("int")), @"int");
        insta::assert_snapshot!(
            pretty(&TypeGraph::parameterized(s("Map"), vec![s("String"), s("Integer")])),
            @"Map<String, Integer>"
        );
        insta::assert_snapshot!(pretty(&TypeGraph::array(TypeGraph::array(s("byte")))), @"byte[][]");
        insta::assert_snapshot!(pretty(&TypeGraph::wildcard()), @"?");
        insta::assert_snapshot!(pretty(&TypeGraph::wildcard_extends(s("Number"))), @"? extends Number");
        insta::assert_snapshot!(pretty(&TypeGraph::wildcard_super(s("T"))), @"? super T");
        insta::assert_snapshot!(
            pretty(&TypeGraph::union(vec![s("IOException"), s("SQLException")])),
            @"IOException & SQLException"
        );
    }

    #[test]
    fn renders_annotations_before_name() {
        let g = s("String").with_annotations(vec!["@NonNull".into()]);
        insta::assert_snapshot!(pretty(&g), @"@NonNull String");
    }

    #[test]
    fn union_and_intersection_print_alike() {
        let members = vec![s("A"), s("B")];
        assert_eq!(
            pretty(&TypeGraph::union(members.clone())),
            pretty(&TypeGraph::intersection(members))
        );
    }

    #[test]
    fn qualification_metadata_does_not_affect_output() {
        let bare = s("java.util.List");
        let tagged = bare.transform(&mut |n| TypeNode {
            namespace: Some(Namespace::Jdk),
            ..n.clone()
        });
        assert!(pretty_eq(&bare, &tagged));
    }

    fn arb_graph() -> impl Strategy<Value = TypeGraph> {
        let leaf = prop_oneof![
            "[A-Z][a-z]{0,6}".prop_map(|n| TypeGraph::simple(&n)),
            prop_oneof![Just("int"), Just("long"), Just("char")]
                .prop_map(TypeGraph::primitive),
        ];
        leaf.prop_recursive(3, 16, 3, |inner| {
            prop_oneof![
                inner.clone().prop_map(TypeGraph::array),
                (inner.clone(), prop::collection::vec(inner.clone(), 1..3))
                    .prop_map(|(of, ps)| TypeGraph::parameterized(of, ps)),
                inner.prop_map(TypeGraph::wildcard_extends),
            ]
        })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn pretty_is_deterministic(g in arb_graph()) {
            prop_assert_eq!(pretty(&g), pretty(&g.clone()));
        }

        #[test]
        fn equal_graphs_print_equal(g in arb_graph()) {
            let rebuilt = g.transform(&mut TypeNode::clone);
            prop_assert_eq!(pretty(&g), pretty(&rebuilt));
        }
    }
}
