pub mod helpers;
pub mod java;

use crate::{GraphError, Result};

/// Parse Java source with the tree-sitter grammar.
pub fn parse_java(source: &str, path: &str) -> Result<tree_sitter::Tree> {
    let mut parser = tree_sitter::Parser::new();
    parser
        .set_language(&tree_sitter_java::LANGUAGE.into())
        .map_err(|e| GraphError::TreeSitter(e.to_string()))?;
    parser.parse(source, None).ok_or_else(|| GraphError::Parse {
        path: path.to_string(),
        message: "parser returned no tree".to_string(),
    })
}
