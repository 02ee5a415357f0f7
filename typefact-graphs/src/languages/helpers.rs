use tree_sitter::Node;

/// Source slice covered by `node`.
pub fn text<'a>(node: Node<'_>, source: &'a str) -> &'a str {
    source.get(node.byte_range()).unwrap_or_default()
}

/// First child, named or anonymous, of the given grammar kind.
///
/// Needed for tokens such as `asterisk` and for nodes the Java grammar does
/// not expose under a field name.
pub fn child_of_kind<'a>(node: Node<'a>, kind: &str) -> Option<Node<'a>> {
    let mut cursor = node.walk();
    let found = node.children(&mut cursor).find(|child| child.kind() == kind);
    found
}

pub fn named_children(node: Node<'_>) -> Vec<Node<'_>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor).collect()
}

/// `Outer.Inner.name` from the stack of enclosing declarations.
pub fn dotted_name(context: &[String], name: &str) -> String {
    if context.is_empty() {
        name.to_string()
    } else {
        format!("{}.{name}", context.join("."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> tree_sitter::Tree {
        let mut parser = tree_sitter::Parser::new();
        parser
            .set_language(&tree_sitter_java::LANGUAGE.into())
            .unwrap();
        parser.parse(source, None).unwrap()
    }

    #[test]
    fn finds_on_demand_asterisk() {
        let source = "import java.util.*;\n";
        let tree = parse(source);
        let import = tree.root_node().named_child(0).unwrap();
        assert_eq!(import.kind(), "import_declaration");
        assert!(child_of_kind(import, "asterisk").is_some());
        assert_eq!(text(import, source), "import java.util.*;");
    }

    #[test]
    fn nested_names() {
        assert_eq!(dotted_name(&[], "A"), "A");
        assert_eq!(dotted_name(&["p.Outer".into(), "Inner".into()], "x"), "p.Outer.Inner.x");
    }
}
