use super::common::{descendants, has_token, named_children, node_text, string_value};
use super::exports::RawExports;
use serde::Serialize;
use tree_sitter::Node;

/// How a module was pulled in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ImportKind {
    /// `import … from "x"`
    Static,
    /// `import "x"`
    SideEffect,
    /// `import("x")`
    Dynamic,
    /// `require("x")` or `import x = require("x")`
    Require,
    /// Synthesized from `export * as ns from "x"`
    NamespaceReexport,
}

/// One runtime import of a file, before its specifier is resolved
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RawImport {
    pub specifier: String,

    /// Imported export names, `"default"` or `"*"`
    pub symbols: Vec<String>,

    pub kind: ImportKind,
}

impl RawImport {
    pub fn wildcard(specifier: impl Into<String>, kind: ImportKind) -> Self {
        Self {
            specifier: specifier.into(),
            symbols: vec!["*".to_string()],
            kind,
        }
    }
}

/// Extract every runtime import of a parsed module
///
/// Type-only imports and type-only specifiers never appear in the
/// result; a declaration left without runtime symbols yields nothing.
pub fn extract_imports(root: Node, source: &str, exports: &RawExports) -> Vec<RawImport> {
    let mut imports = Vec::new();

    let mut cursor = root.walk();
    for child in root.children(&mut cursor) {
        if child.kind() == "import_statement" {
            if let Some(import) = extract_import_statement(child, source) {
                imports.push(import);
            }
        }
    }

    for node in descendants(root) {
        if node.kind() == "call_expression" {
            if let Some(import) = extract_call_import(node, source) {
                imports.push(import);
            }
        }
    }

    for reexport in &exports.namespace_reexports {
        imports.push(RawImport::wildcard(
            reexport.specifier.clone(),
            ImportKind::NamespaceReexport,
        ));
    }

    imports
}

fn extract_import_statement(node: Node, source: &str) -> Option<RawImport> {
    if has_token(node, "type") || has_token(node, "typeof") {
        return None;
    }

    let mut clause = None;
    let mut require_clause = None;
    for child in named_children(node) {
        match child.kind() {
            "import_clause" => clause = Some(child),
            "import_require_clause" => require_clause = Some(child),
            _ => {}
        }
    }

    // import x = require("y")
    if let Some(require) = require_clause {
        let source_node = require.child_by_field_name("source")?;
        return Some(RawImport::wildcard(
            string_value(source_node, source),
            ImportKind::Require,
        ));
    }

    let specifier = string_value(node.child_by_field_name("source")?, source).to_string();

    let Some(clause) = clause else {
        return Some(RawImport::wildcard(specifier, ImportKind::SideEffect));
    };

    let symbols = clause_symbols(clause, source);
    if symbols.is_empty() {
        return None;
    }

    Some(RawImport {
        specifier,
        symbols,
        kind: ImportKind::Static,
    })
}

/// Runtime symbols bound by an import clause
fn clause_symbols(clause: Node, source: &str) -> Vec<String> {
    let mut symbols = Vec::new();

    for child in named_children(clause) {
        match child.kind() {
            "identifier" => symbols.push("default".to_string()),
            "namespace_import" => symbols.push("*".to_string()),
            "named_imports" => {
                for spec in named_children(child) {
                    if spec.kind() != "import_specifier" {
                        continue;
                    }
                    if has_token(spec, "type") || has_token(spec, "typeof") {
                        continue;
                    }
                    if let Some(name) = spec.child_by_field_name("name") {
                        symbols.push(string_value(name, source).to_string());
                    }
                }
            }
            _ => {}
        }
    }

    symbols
}

/// `import("x")` and `require("x")` with a literal specifier
fn extract_call_import(node: Node, source: &str) -> Option<RawImport> {
    let function = node.child_by_field_name("function")?;
    let kind = match function.kind() {
        "import" => ImportKind::Dynamic,
        "identifier" if node_text(function, source) == "require" => ImportKind::Require,
        _ => return None,
    };

    let arguments = node.child_by_field_name("arguments")?;
    let first = named_children(arguments).into_iter().next()?;
    let is_literal = first.kind() == "string"
        || (first.kind() == "template_string" && first.named_child_count() == 0);
    if !is_literal {
        return None;
    }

    Some(RawImport::wildcard(string_value(first, source), kind))
}
