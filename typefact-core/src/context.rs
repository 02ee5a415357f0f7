// Per-file resolution scope.

use std::collections::{BTreeMap, BTreeSet};
use std::hash::{DefaultHasher, Hash, Hasher};

use typefact_graphs::{ElementKey, ElementKind, Imports, JavaFile};

/// Names visible to a type expression inside one source file.
///
/// Built once per file (or per method, when method-level generic parameters
/// matter) and shared read-only through `Arc`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Context {
    package: String,
    imports: Imports,
    method_type_vars: Vec<String>,
    /// Qualified type name → its own generic parameter names.
    type_params: BTreeMap<String, Vec<String>>,
    enums: BTreeSet<String>,
    fingerprint: u64,
}

impl Context {
    pub fn new(
        package: impl Into<String>,
        imports: Imports,
        method_type_vars: Vec<String>,
        type_params: BTreeMap<String, Vec<String>>,
        enums: BTreeSet<String>,
    ) -> Self {
        let mut ctx = Self {
            package: package.into(),
            imports,
            method_type_vars,
            type_params,
            enums,
            fingerprint: 0,
        };
        ctx.fingerprint = ctx.compute_fingerprint();
        ctx
    }

    /// Context of a file with every method's generic parameters in scope.
    pub fn for_file(file: &JavaFile) -> Self {
        let method_type_vars = file
            .methods
            .iter()
            .flat_map(|m| m.type_params.iter().cloned())
            .collect();
        Self::from_file(file, method_type_vars)
    }

    /// Type-level context: declared generic parameters only, no method's.
    pub fn for_types(file: &JavaFile) -> Self {
        Self::from_file(file, Vec::new())
    }

    /// Context with only the named method's generic parameters in scope.
    pub fn for_method(file: &JavaFile, owner: &str, method: &str) -> Self {
        let method_type_vars = file
            .methods
            .iter()
            .find(|m| m.owner == owner && m.name == method)
            .map(|m| m.type_params.clone())
            .unwrap_or_default();
        Self::from_file(file, method_type_vars)
    }

    /// Context for the declaration site `key`: methods see their own type parameters, fields none.
    pub fn for_element(file: &JavaFile, key: &ElementKey) -> Self {
        match key.kind {
            ElementKind::Field => Self::for_types(file),
            ElementKind::Return => Self::for_method(file, &key.owner, &key.name),
            ElementKind::Parameter => {
                let method = key.name.split_once('.').map_or(key.name.as_str(), |(m, _)| m);
                Self::for_method(file, &key.owner, method)
            }
        }
    }

    fn from_file(file: &JavaFile, method_type_vars: Vec<String>) -> Self {
        Self::new(
            file.package.clone(),
            file.imports.clone(),
            method_type_vars,
            file.type_decls.clone(),
            file.enums.clone(),
        )
    }

    fn compute_fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.package.hash(&mut hasher);
        self.imports.single.hash(&mut hasher);
        self.imports.on_demand.hash(&mut hasher);
        self.method_type_vars.hash(&mut hasher);
        self.type_params.hash(&mut hasher);
        self.enums.hash(&mut hasher);
        hasher.finish()
    }

    /// Stable hash of everything that influences qualification.
    pub fn fingerprint(&self) -> u64 {
        self.fingerprint
    }

    pub fn package(&self) -> &str {
        &self.package
    }

    pub fn imports(&self) -> &Imports {
        &self.imports
    }

    pub fn on_demand_imports(&self) -> &[String] {
        &self.imports.on_demand
    }

    /// A method-level or type-level generic parameter in scope.
    pub fn is_type_variable(&self, name: &str) -> bool {
        self.method_type_vars.iter().any(|v| v == name)
            || self
                .type_params
                .values()
                .any(|params| params.iter().any(|p| p == name))
    }

    /// Qualified name of a type declared in this file, matched by qualified or simple name.
    pub fn local_type(&self, name: &str) -> Option<&str> {
        find_declared(self.type_params.keys(), name)
    }

    pub fn local_enum(&self, name: &str) -> Option<&str> {
        find_declared(self.enums.iter(), name)
    }

    pub fn is_local_enum(&self, qualified: &str) -> bool {
        self.enums.contains(qualified)
    }
}

fn find_declared<'a>(mut names: impl Iterator<Item = &'a String> + Clone, lookup: &str) -> Option<&'a str> {
    names
        .clone()
        .find(|q| q.as_str() == lookup)
        .or_else(|| names.find(|q| q.rsplit('.').next() == Some(lookup)))
        .map(String::as_str)
}
