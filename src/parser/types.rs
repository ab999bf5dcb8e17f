use super::common::{descendants, has_token, is_name_of_parent, named_children, node_text, string_value};
use super::exports::{export_specifiers, NamedReexport, RawExports};
use indexmap::{IndexMap, IndexSet};
use std::collections::HashSet;
use tree_sitter::Node;

/// One `import type …` (or `import { type … }`) declaration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeImport {
    pub specifier: String,

    /// Imported type names; `"default"` for `import type D from …`
    pub names: Vec<String>,

    /// Local name of `import type * as NS from …`
    pub namespace: Option<String>,
}

/// Type-level surface of one file
#[derive(Debug, Clone, Default)]
pub struct TypeSurface {
    /// Exported interfaces and type aliases plus every re-export
    pub exports: RawExports,

    /// Type-only imports
    pub imports: Vec<TypeImport>,

    /// Every interface and type alias declared, mapped to whether it is exported
    pub declared: IndexMap<String, bool>,

    /// Type names referenced in type positions
    pub referenced: HashSet<String>,

    /// `NS.Member` references, keyed by `NS`
    pub qualified: IndexMap<String, IndexSet<String>>,
}

impl TypeSurface {
    /// Declared types that are not exported
    pub fn local_types(&self) -> impl Iterator<Item = &str> {
        self.declared
            .iter()
            .filter(|(_, exported)| !**exported)
            .map(|(name, _)| name.as_str())
    }
}

fn is_type_declaration(kind: &str) -> bool {
    matches!(kind, "interface_declaration" | "type_alias_declaration")
}

/// Extract the type surface of a parsed module
pub fn extract_type_surface(root: Node, source: &str) -> TypeSurface {
    let mut surface = TypeSurface::default();

    let mut cursor = root.walk();
    for child in root.children(&mut cursor) {
        match child.kind() {
            "export_statement" => collect_type_exports(child, source, &mut surface.exports),
            "import_statement" => {
                if let Some(import) = type_import(child, source) {
                    surface.imports.push(import);
                }
            }
            _ => {}
        }
    }

    for node in descendants(root) {
        let kind = node.kind();
        if is_type_declaration(kind) {
            if let Some(name) = node.child_by_field_name("name") {
                let exported = node
                    .parent()
                    .map(|p| p.kind() == "export_statement")
                    .unwrap_or(false);
                surface
                    .declared
                    .entry(node_text(name, source).to_string())
                    .and_modify(|e| *e |= exported)
                    .or_insert(exported);
            }
            continue;
        }

        match kind {
            "type_identifier" => {
                if !is_declaration_name(node) && !is_qualified_member(node) {
                    surface.referenced.insert(node_text(node, source).to_string());
                }
            }
            "nested_type_identifier" => {
                let module = node.child_by_field_name("module");
                let name = node.child_by_field_name("name");
                if let (Some(module), Some(name)) = (module, name) {
                    if module.kind() == "identifier" {
                        surface
                            .qualified
                            .entry(node_text(module, source).to_string())
                            .or_default()
                            .insert(node_text(name, source).to_string());
                    }
                }
            }
            // class A extends Base
            "extends_clause" => {
                for value in named_children(node) {
                    if value.kind() == "identifier" {
                        surface.referenced.insert(node_text(value, source).to_string());
                    }
                }
            }
            _ => {}
        }
    }

    surface
}

fn collect_type_exports(node: Node, source: &str, exports: &mut RawExports) {
    if let Some(declaration) = node.child_by_field_name("declaration") {
        if is_type_declaration(declaration.kind()) {
            if let Some(name) = declaration.child_by_field_name("name") {
                exports.local_named.push(node_text(name, source).to_string());
            }
        }
        return;
    }

    let Some(specifier) = node
        .child_by_field_name("source")
        .map(|s| string_value(s, source).to_string())
    else {
        return;
    };

    let clause = named_children(node)
        .into_iter()
        .find(|n| n.kind() == "export_clause");
    let has_namespace = named_children(node)
        .iter()
        .any(|n| n.kind() == "namespace_export");

    match clause {
        Some(clause) => {
            for (original_name, exported_as) in export_specifiers(clause, source) {
                exports.named_reexports.push(NamedReexport {
                    original_name,
                    exported_as,
                    specifier: specifier.clone(),
                });
            }
        }
        None if !has_namespace => exports.wildcard_reexports.push(specifier),
        None => {}
    }
}

fn type_import(node: Node, source: &str) -> Option<TypeImport> {
    let specifier = string_value(node.child_by_field_name("source")?, source).to_string();
    let clause = named_children(node)
        .into_iter()
        .find(|n| n.kind() == "import_clause")?;
    let type_only = has_token(node, "type");

    let mut import = TypeImport {
        specifier,
        ..Default::default()
    };

    for child in named_children(clause) {
        match child.kind() {
            "identifier" if type_only => import.names.push("default".to_string()),
            "namespace_import" if type_only => {
                import.namespace = named_children(child)
                    .into_iter()
                    .next()
                    .map(|n| node_text(n, source).to_string());
            }
            "named_imports" => {
                for spec in named_children(child) {
                    if spec.kind() != "import_specifier" {
                        continue;
                    }
                    if !type_only && !has_token(spec, "type") {
                        continue;
                    }
                    if let Some(name) = spec.child_by_field_name("name") {
                        import.names.push(string_value(name, source).to_string());
                    }
                }
            }
            _ => {}
        }
    }

    (!import.names.is_empty() || import.namespace.is_some()).then_some(import)
}

/// Name of an interface, type alias, class or type parameter
fn is_declaration_name(node: Node) -> bool {
    let Some(parent) = node.parent() else {
        return false;
    };
    matches!(
        parent.kind(),
        "interface_declaration"
            | "type_alias_declaration"
            | "class_declaration"
            | "abstract_class_declaration"
            | "type_parameter"
    ) && is_name_of_parent(node)
}

/// `Foo` in `NS.Foo`, which is recorded as a qualified reference instead
fn is_qualified_member(node: Node) -> bool {
    node.parent()
        .map(|p| p.kind() == "nested_type_identifier")
        .unwrap_or(false)
}
