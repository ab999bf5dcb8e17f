use super::common::{descendants, node_text};
use indexmap::IndexSet;
use std::collections::HashSet;
use tree_sitter::Node;

/// Identifiers declared in a file and the declared ones it references
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocalSymbols {
    /// Declared names in source order
    pub declared: IndexSet<String>,

    /// Declared names that occur outside their own declaration
    pub referenced: IndexSet<String>,
}

const NAMED_DECLARATIONS: &[&str] = &[
    "function_declaration",
    "generator_function_declaration",
    "class_declaration",
    "abstract_class_declaration",
    "interface_declaration",
    "type_alias_declaration",
    "enum_declaration",
];

/// Collect declared and referenced identifiers of a parsed module
///
/// Variables with a type annotation are only tracked when
/// `track_all_locals` is set. Exported declarations are skipped.
pub fn extract_local_symbols(root: Node, source: &str, track_all_locals: bool) -> LocalSymbols {
    let mut symbols = LocalSymbols::default();
    let mut declaration_names = HashSet::new();

    for node in descendants(root) {
        let kind = node.kind();

        let name = if NAMED_DECLARATIONS.contains(&kind) {
            node.child_by_field_name("name")
        } else if kind == "variable_declarator" {
            node.child_by_field_name("name").filter(|name| {
                name.kind() == "identifier"
                    && (track_all_locals || node.child_by_field_name("type").is_none())
            })
        } else {
            None
        };

        let Some(name) = name else {
            continue;
        };
        declaration_names.insert(name.id());
        if !is_exported(node) {
            symbols.declared.insert(node_text(name, source).to_string());
        }
    }

    for node in descendants(root) {
        if !matches!(
            node.kind(),
            "identifier" | "type_identifier" | "shorthand_property_identifier"
        ) {
            continue;
        }
        if declaration_names.contains(&node.id()) {
            continue;
        }
        let text = node_text(node, source);
        if symbols.declared.contains(text) {
            symbols.referenced.insert(text.to_string());
        }
    }

    symbols
}

/// Whether a declaration sits directly under `export`
fn is_exported(declaration: Node) -> bool {
    let mut current = declaration.parent();
    // variable_declarator -> lexical_declaration -> export_statement
    if declaration.kind() == "variable_declarator" {
        current = current.and_then(|p| p.parent());
    }
    // export declare …
    if current.map(|p| p.kind() == "ambient_declaration").unwrap_or(false) {
        current = current.and_then(|p| p.parent());
    }
    current
        .map(|p| p.kind() == "export_statement")
        .unwrap_or(false)
}
