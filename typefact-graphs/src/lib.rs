pub mod languages;
pub mod parse;
pub mod pretty;
pub mod type_graph;

pub use languages::java::{ElementKey, ElementKind, Imports, JavaFile, MethodDecl};
pub use pretty::{pretty, pretty_eq};
pub use type_graph::{EdgeLabel, Namespace, TypeGraph, TypeKind, TypeNode, TypeSem};

/// Error type for the type graph engine.
#[derive(thiserror::Error, Debug)]
pub enum GraphError {
    #[error("Parse error in {path}: {message}")]
    Parse { path: String, message: String },

    #[error("Unsupported type node: {0}")]
    UnsupportedTypeNode(String),

    #[error("Invalid type syntax {input:?}: {message}")]
    TypeSyntax { input: String, message: String },

    #[error("Invalid edge label: {0}")]
    EdgeLabel(String),

    #[error("Tree-sitter error: {0}")]
    TreeSitter(String),
}

pub type Result<T> = std::result::Result<T, GraphError>;
