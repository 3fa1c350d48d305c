//! tree-sitter parsing for fetched modules

use docserve_core::ExtractError;
use tree_sitter::{Language, Node, Parser, Tree};

/// Grammar used for a module.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    TypeScript,
    Tsx,
}

impl Dialect {
    /// Pick the grammar from the path of a module URL.
    pub fn for_url(url: &str) -> Self {
        let path = url.split(['?', '#']).next().unwrap_or(url);
        let ext = path.rsplit_once('.').map(|(_, ext)| ext).unwrap_or("");
        match ext.to_ascii_lowercase().as_str() {
            "tsx" | "jsx" => Dialect::Tsx,
            _ => Dialect::TypeScript,
        }
    }

    fn language(self) -> Language {
        match self {
            Dialect::TypeScript => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
            Dialect::Tsx => tree_sitter_typescript::LANGUAGE_TSX.into(),
        }
    }
}

/// Parse `source` with a fresh parser.
///
/// Parsers are cheap to create and not `Send`, so each call owns one rather
/// than holding it across an await point.
pub fn parse(source: &str, dialect: Dialect) -> Result<Tree, ExtractError> {
    let mut parser = Parser::new();
    parser
        .set_language(&dialect.language())
        .map_err(|e| ExtractError::Internal(format!("failed to set language: {e}")))?;
    parser
        .parse(source, None)
        .ok_or_else(|| ExtractError::Internal("parser returned no tree".to_string()))
}

/// One-based line and column of the first syntax error, if any.
pub fn first_error(tree: &Tree) -> Option<(u32, u32)> {
    let root = tree.root_node();
    if !root.has_error() {
        return None;
    }
    find_error(root).map(|node| {
        let point = node.start_position();
        (point.row as u32 + 1, point.column as u32 + 1)
    })
}

fn find_error(node: Node) -> Option<Node> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.has_error() {
            if let Some(found) = find_error(child) {
                return Some(found);
            }
        }
    }
    None
}
