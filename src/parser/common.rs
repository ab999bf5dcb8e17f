use crate::discovery::FileType;
use miette::{IntoDiagnostic, Result};
use tree_sitter::{Language, Node, Parser as TsParser, Tree};

/// Grammar used for a given source file type
pub fn language_for(file_type: FileType) -> Language {
    match file_type {
        FileType::TypeScript => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
        FileType::Tsx => tree_sitter_typescript::LANGUAGE_TSX.into(),
        FileType::JavaScript | FileType::Jsx => tree_sitter_javascript::LANGUAGE.into(),
    }
}

/// A tree-sitter parser that switches grammar per file type
pub struct SourceParser {
    parser: TsParser,
    current: Option<FileType>,
}

impl SourceParser {
    pub fn new() -> Self {
        Self {
            parser: TsParser::new(),
            current: None,
        }
    }

    /// Parse `source` with the grammar matching `file_type`
    pub fn parse(&mut self, file_type: FileType, source: &str) -> Result<Tree> {
        if self.current != Some(file_type) {
            self.parser
                .set_language(&language_for(file_type))
                .into_diagnostic()?;
            self.current = Some(file_type);
        }

        self.parser
            .parse(source, None)
            .ok_or_else(|| miette::miette!("Failed to parse {:?} source", file_type))
    }
}

impl Default for SourceParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Extract text from a node
pub fn node_text<'a>(node: Node<'a>, source: &'a str) -> &'a str {
    &source[node.start_byte()..node.end_byte()]
}

/// Text of a string literal node without its quotes
pub fn string_value<'a>(node: Node<'a>, source: &'a str) -> &'a str {
    node_text(node, source).trim_matches(|c| c == '"' || c == '\'' || c == '`')
}

/// Whether `node` has an anonymous child token `token` (e.g. `default`, `type`)
pub fn has_token(node: Node, token: &str) -> bool {
    let mut cursor = node.walk();
    let found = node
        .children(&mut cursor)
        .any(|child| !child.is_named() && child.kind() == token);
    found
}

/// All named children of a node
pub fn named_children(node: Node<'_>) -> Vec<Node<'_>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor).collect()
}

/// Whether `node` is the `name` field of its parent
pub fn is_name_of_parent(node: Node) -> bool {
    node.parent()
        .and_then(|parent| parent.child_by_field_name("name"))
        .map(|name| name.id() == node.id())
        .unwrap_or(false)
}

/// Collect every bound name in a binding pattern
///
/// Handles plain identifiers plus object/array destructuring with
/// renames, defaults and rest elements.
pub fn collect_pattern_names(node: Node, source: &str, out: &mut Vec<String>) {
    match node.kind() {
        "identifier" | "shorthand_property_identifier_pattern" => {
            out.push(node_text(node, source).to_string());
        }
        "pair_pattern" => {
            if let Some(value) = node.child_by_field_name("value") {
                collect_pattern_names(value, source, out);
            }
        }
        "assignment_pattern" | "object_assignment_pattern" => {
            if let Some(left) = node.child_by_field_name("left") {
                collect_pattern_names(left, source, out);
            }
        }
        "object_pattern" | "array_pattern" | "rest_pattern" => {
            for child in named_children(node) {
                collect_pattern_names(child, source, out);
            }
        }
        _ => {}
    }
}

/// Iterator over all descendant nodes, including `node` itself
pub fn descendants(node: Node) -> impl Iterator<Item = Node> {
    DescendantIterator::new(node)
}

struct DescendantIterator<'a> {
    cursor: tree_sitter::TreeCursor<'a>,
    done: bool,
}

impl<'a> DescendantIterator<'a> {
    fn new(node: Node<'a>) -> Self {
        Self {
            cursor: node.walk(),
            done: false,
        }
    }
}

impl<'a> Iterator for DescendantIterator<'a> {
    type Item = Node<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let node = self.cursor.node();

        if self.cursor.goto_first_child() {
            return Some(node);
        }

        loop {
            if self.cursor.goto_next_sibling() {
                return Some(node);
            }
            if !self.cursor.goto_parent() {
                self.done = true;
                return Some(node);
            }
        }
    }
}
