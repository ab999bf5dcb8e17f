//! Structural extraction from JavaScript and TypeScript sources
//!
//! One tree-sitter parse per file feeds every extractor: the runtime
//! export surface, runtime imports, local identifiers and the type surface.

mod common;
mod exports;
mod imports;
mod locals;
mod types;

pub use common::{descendants, language_for, node_text, SourceParser};
pub use exports::{extract_exports, NamedReexport, NamespaceReexport, RawExports};
pub use imports::{extract_imports, ImportKind, RawImport};
pub use locals::{extract_local_symbols, LocalSymbols};
pub use types::{extract_type_surface, TypeImport, TypeSurface};

use crate::discovery::FileType;
use miette::Result;
use tree_sitter::Node;

/// Everything extracted from one source file
#[derive(Debug, Clone, Default)]
pub struct ModuleSyntax {
    pub exports: RawExports,
    pub imports: Vec<RawImport>,
    pub locals: LocalSymbols,
    pub types: TypeSurface,
    /// An immediately-invoked function runs at module top level
    pub top_level_iife: bool,
}

/// Options controlling per-file extraction
#[derive(Debug, Clone, Copy, Default)]
pub struct ExtractOptions {
    pub track_all_locals: bool,
    pub include_types: bool,
}

impl SourceParser {
    /// Parse `source` once and run every extractor over the tree
    pub fn extract(
        &mut self,
        file_type: FileType,
        source: &str,
        options: ExtractOptions,
    ) -> Result<ModuleSyntax> {
        let tree = self.parse(file_type, source)?;
        let root = tree.root_node();

        let exports = extract_exports(root, source);
        let imports = extract_imports(root, source, &exports);
        let locals = extract_local_symbols(root, source, options.track_all_locals);
        let types = if options.include_types && file_type.is_typescript() {
            extract_type_surface(root, source)
        } else {
            TypeSurface::default()
        };

        Ok(ModuleSyntax {
            exports,
            imports,
            locals,
            types,
            top_level_iife: has_top_level_iife(root),
        })
    }
}

/// Whether any top-level statement invokes a function expression in place:
/// `(function () {})()`, `(() => {})()`, `(function () {}())`,
/// `!function () {}()` or `void (async () => {})()`
pub fn has_top_level_iife(root: Node) -> bool {
    let mut cursor = root.walk();
    let found = root
        .named_children(&mut cursor)
        .filter(|stmt| stmt.kind() == "expression_statement")
        .filter_map(|stmt| stmt.named_child(0))
        .any(is_invoked_function);
    found
}

fn is_invoked_function(node: Node) -> bool {
    match node.kind() {
        "parenthesized_expression" => node.named_child(0).is_some_and(is_invoked_function),
        "unary_expression" => node
            .child_by_field_name("argument")
            .is_some_and(is_invoked_function),
        "call_expression" => node
            .child_by_field_name("function")
            .map(strip_parens)
            .is_some_and(|callee| {
                matches!(
                    callee.kind(),
                    "function_expression" | "function" | "arrow_function" | "generator_function"
                )
            }),
        _ => false,
    }
}

fn strip_parens(mut node: Node) -> Node {
    while node.kind() == "parenthesized_expression" {
        match node.named_child(0) {
            Some(inner) => node = inner,
            None => break,
        }
    }
    node
}
