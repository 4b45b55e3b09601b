// ABOUTME: Collects module specifiers from a TypeScript/JavaScript syntax tree.
// ABOUTME: Covers static imports, re-exports, import-equals, require() and dynamic import().
use crate::{LanguageRegistry, ParserError, Result, SourceKind};
use serde::{Deserialize, Serialize};
use tree_sitter::{Node, Tree, TreeCursor};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportKind {
    EsImport,
    ReExport,
    ImportEquals,
    Require,
    DynamicImport,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportRef {
    pub specifier: String,
    pub kind: ImportKind,
    pub line: u32,
}

pub struct ImportExtractor;

impl ImportExtractor {
    /// Parses `content` with the grammar for `kind` and returns its imports
    /// in source order.
    pub fn extract(
        registry: &LanguageRegistry,
        kind: SourceKind,
        content: &str,
    ) -> Result<Vec<ImportRef>> {
        let mut parser = registry
            .create_parser(kind)
            .ok_or_else(|| ParserError::Language(format!("{:?}", kind)))?;
        let tree = parser
            .parse(content, None)
            .ok_or_else(|| ParserError::Parse("Failed to parse file".to_string()))?;
        Ok(Self::extract_from_tree(&tree, content))
    }

    pub fn extract_from_tree(tree: &Tree, content: &str) -> Vec<ImportRef> {
        let mut collector = ImportCollector::new(content);
        let mut cursor = tree.walk();
        collector.walk(&mut cursor);
        collector.imports
    }
}

struct ImportCollector<'a> {
    content: &'a str,
    imports: Vec<ImportRef>,
}

impl<'a> ImportCollector<'a> {
    fn new(content: &'a str) -> Self {
        Self {
            content,
            imports: Vec::new(),
        }
    }

    fn walk(&mut self, cursor: &mut TreeCursor) {
        let node = cursor.node();

        match node.kind() {
            "import_statement" => {
                if let Some(source) = node.child_by_field_name("source") {
                    self.push(&source, ImportKind::EsImport);
                } else if let Some(clause) = self.child_by_kind(node, "import_require_clause") {
                    if let Some(source) = clause.child_by_field_name("source") {
                        self.push(&source, ImportKind::ImportEquals);
                    }
                }
            }

            "export_statement" => {
                if let Some(source) = node.child_by_field_name("source") {
                    self.push(&source, ImportKind::ReExport);
                }
            }

            "call_expression" => {
                if let Some(function) = node.child_by_field_name("function") {
                    let kind = match function.kind() {
                        "import" => Some(ImportKind::DynamicImport),
                        "identifier" if self.node_text(&function) == "require" => {
                            Some(ImportKind::Require)
                        }
                        _ => None,
                    };
                    if let Some(kind) = kind {
                        if let Some(argument) = self.first_argument(&node) {
                            self.push(&argument, kind);
                        }
                    }
                }
            }

            _ => {}
        }

        // Recurse into children
        if cursor.goto_first_child() {
            loop {
                self.walk(cursor);
                if !cursor.goto_next_sibling() {
                    break;
                }
            }
            cursor.goto_parent();
        }
    }

    fn push(&mut self, node: &Node, kind: ImportKind) {
        if let Some(specifier) = self.string_literal(node) {
            self.imports.push(ImportRef {
                specifier,
                kind,
                line: node.start_position().row as u32 + 1,
            });
        }
    }

    fn first_argument<'t>(&self, call: &Node<'t>) -> Option<Node<'t>> {
        let arguments = call.child_by_field_name("arguments")?;
        let mut cursor = arguments.walk();
        let first = arguments.named_children(&mut cursor).next();
        first
    }

    /// Literal value of a string or substitution-free template string, read
    /// from its `string_fragment` and `escape_sequence` children.
    fn string_literal(&self, node: &Node) -> Option<String> {
        if !matches!(node.kind(), "string" | "template_string") {
            return None;
        }
        let mut value = String::new();
        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            match child.kind() {
                "string_fragment" => value.push_str(&self.node_text(&child)),
                "escape_sequence" => value.push_str(&unescape(&self.node_text(&child))),
                "template_substitution" => return None,
                _ => {}
            }
        }
        (!value.is_empty()).then_some(value)
    }

    fn node_text(&self, node: &Node) -> String {
        node.utf8_text(self.content.as_bytes())
            .unwrap_or("")
            .to_string()
    }

    fn child_by_kind<'t>(&self, node: Node<'t>, kind: &str) -> Option<Node<'t>> {
        let mut cursor = node.walk();
        if cursor.goto_first_child() {
            loop {
                let n = cursor.node();
                if n.kind() == kind {
                    return Some(n);
                }
                if !cursor.goto_next_sibling() {
                    break;
                }
            }
        }
        None
    }
}

fn unescape(sequence: &str) -> String {
    let Some(rest) = sequence.strip_prefix('\\') else {
        return sequence.to_string();
    };
    match rest {
        "n" => "\n".to_string(),
        "t" => "\t".to_string(),
        "r" => "\r".to_string(),
        "0" => "\0".to_string(),
        _ if rest.starts_with('u') || rest.starts_with('x') => {
            let hex = rest[1..].trim_start_matches('{').trim_end_matches('}');
            u32::from_str_radix(hex, 16)
                .ok()
                .and_then(char::from_u32)
                .map(String::from)
                .unwrap_or_else(|| sequence.to_string())
        }
        // Line continuations contribute nothing.
        _ if rest.starts_with('\n') || rest.starts_with('\r') => String::new(),
        other => other.to_string(),
    }
}
