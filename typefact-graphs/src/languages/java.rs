use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tracing::debug;
use tree_sitter::Node;

use crate::type_graph::{EdgeLabel, TypeGraph};
use crate::{GraphError, Result};

use super::helpers::{child_of_kind, dotted_name, named_children, text};
use super::parse_java;

// ── Type nodes → TypeGraph ─────────────────────────────────────────

/// Convert a tree-sitter Java type node into a [`TypeGraph`].
pub fn type_graph(node: Node<'_>, source: &str) -> Result<TypeGraph> {
    convert(node, source, false)
}

/// Like [`type_graph`] but drops generic arguments (`List<String>` → `List`).
pub fn type_graph_stripped(node: Node<'_>, source: &str) -> Result<TypeGraph> {
    convert(node, source, true)
}

fn convert(node: Node<'_>, source: &str, strip: bool) -> Result<TypeGraph> {
    match node.kind() {
        "integral_type" | "floating_point_type" | "boolean_type" | "void_type" => {
            Ok(TypeGraph::primitive(text(node, source).trim()))
        }
        "type_identifier" | "identifier" | "scoped_type_identifier" => {
            Ok(TypeGraph::simple(&scoped_name(node, source)?))
        }
        "generic_type" => {
            let children = named_children(node);
            let raw = children
                .iter()
                .find(|c| matches!(c.kind(), "type_identifier" | "scoped_type_identifier"))
                .ok_or_else(|| missing(node, "raw type"))?;
            let raw = convert(*raw, source, strip)?;
            if strip {
                return Ok(raw);
            }
            let params = match children.iter().find(|c| c.kind() == "type_arguments") {
                Some(args) => named_children(*args)
                    .into_iter()
                    .filter(|c| !is_annotation(*c))
                    .map(|c| convert(c, source, false))
                    .collect::<Result<Vec<_>>>()?,
                None => Vec::new(),
            };
            Ok(TypeGraph::parameterized(raw, params))
        }
        "array_type" => {
            let element = node.child_by_field_name("element").ok_or_else(|| missing(node, "element"))?;
            let mut graph = convert(element, source, strip)?;
            let dims = node.child_by_field_name("dimensions").map_or(1, count_dimensions);
            for _ in 0..dims {
                graph = TypeGraph::array(graph);
            }
            Ok(graph)
        }
        "annotated_type" => {
            let children = named_children(node);
            let inner = children
                .iter()
                .find(|c| !is_annotation(**c))
                .ok_or_else(|| missing(node, "annotated type"))?;
            let mut graph = convert(*inner, source, strip)?;
            let mut annotations: Vec<String> = children
                .iter()
                .filter(|c| is_annotation(**c))
                .map(|c| text(*c, source).to_string())
                .collect();
            annotations.append(&mut graph.root.annotations);
            Ok(graph.with_annotations(annotations))
        }
        "wildcard" => wildcard(node, source, strip),
        "catch_type" => Ok(TypeGraph::union(members(node, source, strip)?)),
        "type_bound" => {
            let mut members = members(node, source, strip)?;
            if members.len() == 1 {
                return members.pop().ok_or_else(|| missing(node, "bound"));
            }
            Ok(TypeGraph::intersection(members))
        }
        "cast_expression" => {
            let mut cursor = node.walk();
            let mut types = node
                .children_by_field_name("type", &mut cursor)
                .map(|c| convert(c, source, strip))
                .collect::<Result<Vec<_>>>()?;
            match types.len() {
                0 => Err(missing(node, "type")),
                1 => types.pop().ok_or_else(|| missing(node, "type")),
                _ => Ok(TypeGraph::intersection(types)),
            }
        }
        other => Err(GraphError::UnsupportedTypeNode(other.to_string())),
    }
}

fn wildcard(node: Node<'_>, source: &str, strip: bool) -> Result<TypeGraph> {
    let mut annotations = Vec::new();
    let mut label = None;
    let mut bound = None;
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        match child.kind() {
            "extends" => label = Some(EdgeLabel::Extends),
            "super" => label = Some(EdgeLabel::Super),
            _ if is_annotation(child) => annotations.push(text(child, source).to_string()),
            _ if child.is_named() && label.is_some() => bound = Some(convert(child, source, strip)?),
            _ => {}
        }
    }
    let graph = match (label, bound) {
        (Some(EdgeLabel::Super), Some(b)) => TypeGraph::wildcard_super(b),
        (Some(_), Some(b)) => TypeGraph::wildcard_extends(b),
        _ => TypeGraph::wildcard(),
    };
    Ok(graph.with_annotations(annotations))
}

fn members(node: Node<'_>, source: &str, strip: bool) -> Result<Vec<TypeGraph>> {
    named_children(node)
        .into_iter()
        .filter(|c| !is_annotation(*c))
        .map(|c| convert(c, source, strip))
        .collect()
}

/// Dotted name of a (possibly scoped) type reference; arguments on enclosing segments are dropped.
fn scoped_name(node: Node<'_>, source: &str) -> Result<String> {
    match node.kind() {
        "type_identifier" | "identifier" => Ok(text(node, source).to_string()),
        "generic_type" => {
            let raw = named_children(node)
                .into_iter()
                .find(|c| c.kind() != "type_arguments")
                .ok_or_else(|| missing(node, "raw type"))?;
            scoped_name(raw, source)
        }
        "scoped_type_identifier" | "scoped_identifier" => {
            let parts = named_children(node)
                .into_iter()
                .filter(|c| !is_annotation(*c))
                .map(|c| scoped_name(c, source))
                .collect::<Result<Vec<_>>>()?;
            Ok(parts.join("."))
        }
        other => Err(GraphError::UnsupportedTypeNode(other.to_string())),
    }
}

fn count_dimensions(dims: Node<'_>) -> usize {
    let mut cursor = dims.walk();
    dims.children(&mut cursor).filter(|c| c.kind() == "[").count()
}

fn is_annotation(node: Node<'_>) -> bool {
    matches!(node.kind(), "marker_annotation" | "annotation")
}

fn missing(node: Node<'_>, what: &str) -> GraphError {
    GraphError::UnsupportedTypeNode(format!("{} without {what}", node.kind()))
}

// ── Per-file declarations ──────────────────────────────────────────

/// Import declarations split by form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Imports {
    /// `import a.b.C;`
    pub single: Vec<String>,
    /// `import a.b.*;` recorded without the trailing `.*`.
    pub on_demand: Vec<String>,
}

impl Imports {
    pub fn is_empty(&self) -> bool {
        self.single.is_empty() && self.on_demand.is_empty()
    }

    pub fn extend(&mut self, other: &Imports) {
        self.single.extend(other.single.iter().cloned());
        self.on_demand.extend(other.on_demand.iter().cloned());
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodDecl {
    /// Qualified name of the declaring type.
    pub owner: String,
    pub name: String,
    pub type_params: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ElementKind {
    Field,
    Return,
    Parameter,
}

/// A declaration site whose type can change between revisions.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ElementKey {
    pub kind: ElementKind,
    /// Qualified name of the declaring type.
    pub owner: String,
    /// Field name, method name, or `method.parameter`.
    pub name: String,
}

/// Declarations extracted from one Java compilation unit.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JavaFile {
    pub package: String,
    pub imports: Imports,
    /// Qualified type name → its own generic parameter names.
    pub type_decls: BTreeMap<String, Vec<String>>,
    /// Qualified enum names, nested ones included.
    pub enums: BTreeSet<String>,
    pub methods: Vec<MethodDecl>,
    /// Qualified type name → direct supertypes with generic arguments stripped.
    pub super_types: BTreeMap<String, Vec<TypeGraph>>,
    /// Qualified type name → declared field types.
    pub fields: BTreeMap<String, Vec<TypeGraph>>,
    pub typed_elements: BTreeMap<ElementKey, TypeGraph>,
}

impl JavaFile {
    /// Parse `source` and extract its declarations.
    pub fn parse(source: &str, path: &str) -> Result<Self> {
        let tree = parse_java(source, path)?;
        if tree.root_node().has_error() {
            debug!(path, "Java source has syntax errors, extracting what parsed");
        }
        Ok(Self::from_tree(&tree, source))
    }

    pub fn from_tree(tree: &tree_sitter::Tree, source: &str) -> Self {
        let mut file = JavaFile::default();
        let mut context = Vec::new();
        walk_java_node(tree.root_node(), source, &mut context, &mut file);
        file
    }

    /// Simple names of every type declared in this file.
    pub fn declared_simple_names(&self) -> impl Iterator<Item = &str> {
        self.type_decls
            .keys()
            .chain(self.enums.iter())
            .map(|q| q.rsplit('.').next().unwrap_or(q))
    }
}

fn walk_java_node(node: Node<'_>, source: &str, context: &mut Vec<String>, file: &mut JavaFile) {
    match node.kind() {
        "package_declaration" => {
            if let Some(name) = named_children(node)
                .into_iter()
                .find(|c| matches!(c.kind(), "scoped_identifier" | "identifier"))
            {
                file.package = text(name, source).to_string();
                context.clear();
                context.push(file.package.clone());
            }
            return;
        }
        "import_declaration" => {
            collect_import(node, source, &mut file.imports);
            return;
        }
        "class_declaration" | "interface_declaration" | "record_declaration" => {
            type_decl(node, source, context, file);
            return;
        }
        "enum_declaration" => {
            if let Some(name_node) = node.child_by_field_name("name") {
                let name = text(name_node, source).to_string();
                file.enums.insert(dotted_name(context, &name));
                context.push(name);
                if let Some(body) = node.child_by_field_name("body") {
                    walk_java_children(body, source, context, file);
                }
                context.pop();
            }
            return;
        }
        "method_declaration" | "constructor_declaration" => {
            method_decl(node, source, context, file);
            return;
        }
        "field_declaration" => {
            field_decl(node, source, context, file);
            return;
        }
        _ => {}
    }

    walk_java_children(node, source, context, file);
}

fn walk_java_children(node: Node<'_>, source: &str, context: &mut Vec<String>, file: &mut JavaFile) {
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        walk_java_node(child, source, context, file);
    }
}

fn collect_import(node: Node<'_>, source: &str, imports: &mut Imports) {
    let Some(name) = named_children(node)
        .into_iter()
        .find(|c| matches!(c.kind(), "scoped_identifier" | "identifier"))
    else {
        return;
    };
    let name = text(name, source).to_string();
    if child_of_kind(node, "asterisk").is_some() {
        imports.on_demand.push(name);
    } else {
        imports.single.push(name);
    }
}

fn type_decl(node: Node<'_>, source: &str, context: &mut Vec<String>, file: &mut JavaFile) {
    let Some(name_node) = node.child_by_field_name("name") else {
        return;
    };
    let name = text(name_node, source).to_string();
    let qname = dotted_name(context, &name);

    file.type_decls
        .insert(qname.clone(), type_parameter_names(node, source));

    // superclass: `extends Foo`; interfaces: `implements A, B`; interface
    // declarations carry `extends A, B` as an unlabelled child.
    let mut supers = Vec::new();
    for wrapper in [
        node.child_by_field_name("superclass"),
        node.child_by_field_name("interfaces"),
        child_of_kind(node, "extends_interfaces"),
    ]
    .into_iter()
    .flatten()
    {
        collect_super_types(wrapper, source, &mut supers);
    }
    if !supers.is_empty() {
        file.super_types.insert(qname.clone(), supers);
    }

    // Record components behave as fields.
    if let Some(params) = node.child_by_field_name("parameters") {
        for param in named_children(params) {
            if let (Some(ty), Some(pname)) = (param.child_by_field_name("type"), param.child_by_field_name("name")) {
                add_field(file, &qname, text(pname, source), ty, source);
            }
        }
    }

    context.push(name);
    if let Some(body) = node.child_by_field_name("body") {
        walk_java_children(body, source, context, file);
    }
    context.pop();
}

fn collect_super_types(wrapper: Node<'_>, source: &str, out: &mut Vec<TypeGraph>) {
    for child in named_children(wrapper) {
        if child.kind() == "type_list" {
            collect_super_types(child, source, out);
            continue;
        }
        match type_graph_stripped(child, source) {
            Ok(graph) => out.push(graph),
            Err(e) => debug!(kind = child.kind(), error = %e, "Skipping supertype"),
        }
    }
}

fn type_parameter_names(node: Node<'_>, source: &str) -> Vec<String> {
    let Some(params) = node.child_by_field_name("type_parameters") else {
        return Vec::new();
    };
    named_children(params)
        .into_iter()
        .filter(|c| c.kind() == "type_parameter")
        .filter_map(|tp| {
            named_children(tp)
                .into_iter()
                .find(|c| matches!(c.kind(), "type_identifier" | "identifier"))
                .map(|n| text(n, source).to_string())
        })
        .collect()
}

fn method_decl(node: Node<'_>, source: &str, context: &[String], file: &mut JavaFile) {
    let Some(name_node) = node.child_by_field_name("name") else {
        return;
    };
    let name = text(name_node, source).to_string();
    let owner = context.join(".");

    if let Some(ty) = node.child_by_field_name("type") {
        add_element(file, ElementKind::Return, &owner, name.clone(), ty, source);
    }
    if let Some(params) = node.child_by_field_name("parameters") {
        for param in named_children(params) {
            let (Some(ty), Some(pname)) = (param_type(param), param_name(param)) else {
                continue;
            };
            let pname = format!("{name}.{}", text(pname, source));
            add_element(file, ElementKind::Parameter, &owner, pname, ty, source);
        }
    }

    file.methods.push(MethodDecl {
        owner,
        name,
        type_params: type_parameter_names(node, source),
    });
}

fn param_type(param: Node<'_>) -> Option<Node<'_>> {
    match param.kind() {
        "formal_parameter" => param.child_by_field_name("type"),
        // `String... args`: the type is the first non-modifier named child.
        "spread_parameter" => named_children(param)
            .into_iter()
            .find(|c| !matches!(c.kind(), "modifiers" | "variable_declarator")),
        _ => None,
    }
}

fn param_name(param: Node<'_>) -> Option<Node<'_>> {
    param.child_by_field_name("name").or_else(|| {
        child_of_kind(param, "variable_declarator").and_then(|d| d.child_by_field_name("name"))
    })
}

fn field_decl(node: Node<'_>, source: &str, context: &[String], file: &mut JavaFile) {
    let Some(ty) = node.child_by_field_name("type") else {
        return;
    };
    let owner = context.join(".");
    let mut cursor = node.walk();
    for declarator in node.children_by_field_name("declarator", &mut cursor) {
        if let Some(name) = declarator.child_by_field_name("name") {
            add_field(file, &owner, text(name, source), ty, source);
        }
    }
}

fn add_field(file: &mut JavaFile, owner: &str, name: &str, ty: Node<'_>, source: &str) {
    match type_graph(ty, source) {
        Ok(graph) => {
            file.fields
                .entry(owner.to_string())
                .or_default()
                .push(graph.clone());
            file.typed_elements
                .entry(ElementKey {
                    kind: ElementKind::Field,
                    owner: owner.to_string(),
                    name: name.to_string(),
                })
                .or_insert(graph);
        }
        Err(e) => debug!(owner, field = name, error = %e, "Skipping field type"),
    }
}

fn add_element(
    file: &mut JavaFile,
    kind: ElementKind,
    owner: &str,
    name: String,
    ty: Node<'_>,
    source: &str,
) {
    match type_graph(ty, source) {
        Ok(graph) => {
            // Overloads keep the first declaration.
            file.typed_elements
                .entry(ElementKey {
                    kind,
                    owner: owner.to_string(),
                    name,
                })
                .or_insert(graph);
        }
        Err(e) => debug!(owner, error = %e, "Skipping element type"),
    }
}

// ── Tests ──────────────────────────────────────────────────────────
