use super::common::{collect_pattern_names, has_token, named_children, node_text, string_value};
use serde::Serialize;
use tree_sitter::Node;

/// Export surface of one file as written, before any specifier is resolved
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RawExports {
    /// `export default …`, `export = …` or `export { x as default }`
    pub has_default: bool,

    /// Names declared and exported by this file, in authored order
    pub local_named: Vec<String>,

    /// Specifiers of `export * from "…"`
    pub wildcard_reexports: Vec<String>,

    /// `export { a as b } from "…"`
    pub named_reexports: Vec<NamedReexport>,

    /// `export * as ns from "…"`
    pub namespace_reexports: Vec<NamespaceReexport>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NamedReexport {
    pub original_name: String,
    pub exported_as: String,
    pub specifier: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NamespaceReexport {
    pub exported_as: String,
    pub specifier: String,
}

impl RawExports {
    /// Every specifier this file re-exports from
    pub fn reexport_specifiers(&self) -> impl Iterator<Item = &str> {
        self.wildcard_reexports
            .iter()
            .map(String::as_str)
            .chain(self.named_reexports.iter().map(|r| r.specifier.as_str()))
            .chain(self.namespace_reexports.iter().map(|r| r.specifier.as_str()))
    }

    fn add_local(&mut self, name: String) {
        if name == "default" {
            self.has_default = true;
        } else if !self.local_named.contains(&name) {
            self.local_named.push(name);
        }
    }
}

/// Extract the top-level export surface of a parsed module
pub fn extract_exports(root: Node, source: &str) -> RawExports {
    let mut exports = RawExports::default();

    let mut cursor = root.walk();
    for child in root.children(&mut cursor) {
        if child.kind() == "export_statement" {
            extract_export_statement(child, source, &mut exports);
        }
    }

    exports
}

fn extract_export_statement(node: Node, source: &str, exports: &mut RawExports) {
    // export default …
    if has_token(node, "default") {
        exports.has_default = true;
        return;
    }

    // export = …
    if has_token(node, "=") {
        exports.has_default = true;
        return;
    }

    if let Some(declaration) = node.child_by_field_name("declaration") {
        for name in declared_names(declaration, source) {
            exports.add_local(name);
        }
        return;
    }

    let specifier = node
        .child_by_field_name("source")
        .map(|s| string_value(s, source).to_string());

    let mut clause = None;
    let mut namespace = None;
    for child in named_children(node) {
        match child.kind() {
            "export_clause" => clause = Some(child),
            "namespace_export" => namespace = Some(child),
            _ => {}
        }
    }

    match (specifier, clause, namespace) {
        // export * as ns from "x"
        (Some(specifier), _, Some(ns)) => {
            let exported_as = named_children(ns)
                .first()
                .map(|n| string_value(*n, source).to_string())
                .unwrap_or_default();
            exports.add_local(exported_as.clone());
            exports.namespace_reexports.push(NamespaceReexport {
                exported_as,
                specifier,
            });
        }
        // export { a as b } from "x"
        (Some(specifier), Some(clause), None) => {
            for (original_name, exported_as) in export_specifiers(clause, source) {
                exports.named_reexports.push(NamedReexport {
                    original_name,
                    exported_as,
                    specifier: specifier.clone(),
                });
            }
        }
        // export * from "x"
        (Some(specifier), None, None) => {
            exports.wildcard_reexports.push(specifier);
        }
        // export { a, b as c }
        (None, Some(clause), _) => {
            for (_, exported_as) in export_specifiers(clause, source) {
                exports.add_local(exported_as);
            }
        }
        _ => {}
    }
}

/// `(original, exported)` pairs of an `export { … }` clause
pub(super) fn export_specifiers(clause: Node, source: &str) -> Vec<(String, String)> {
    named_children(clause)
        .into_iter()
        .filter(|n| n.kind() == "export_specifier")
        .filter_map(|spec| {
            let name = spec.child_by_field_name("name")?;
            let original = string_value(name, source).to_string();
            let exported = spec
                .child_by_field_name("alias")
                .map(|alias| string_value(alias, source).to_string())
                .unwrap_or_else(|| original.clone());
            Some((original, exported))
        })
        .collect()
}

/// Names bound by a declaration that follows `export`
pub(super) fn declared_names(declaration: Node, source: &str) -> Vec<String> {
    match declaration.kind() {
        "lexical_declaration" | "variable_declaration" => {
            let mut names = Vec::new();
            for declarator in named_children(declaration) {
                if declarator.kind() != "variable_declarator" {
                    continue;
                }
                if let Some(pattern) = declarator.child_by_field_name("name") {
                    collect_pattern_names(pattern, source, &mut names);
                }
            }
            names
        }
        // export declare …
        "ambient_declaration" => named_children(declaration)
            .into_iter()
            .flat_map(|inner| declared_names(inner, source))
            .collect(),
        "function_declaration"
        | "generator_function_declaration"
        | "function_signature"
        | "class_declaration"
        | "abstract_class_declaration"
        | "interface_declaration"
        | "type_alias_declaration"
        | "enum_declaration"
        | "module"
        | "internal_module"
        | "import_alias" => declaration
            .child_by_field_name("name")
            .or_else(|| named_children(declaration).into_iter().next())
            .map(|name| vec![node_text(name, source).to_string()])
            .unwrap_or_default(),
        _ => Vec::new(),
    }
}
