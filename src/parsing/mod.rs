//! TypeScript extraction layer, built on `tree-sitter` + `tree-sitter-typescript`.
//!
//! One file per syntactic concern (classes, members, interfaces, imports,
//! call sites, composition), all operating over thin `Node` helpers from
//! `shared::tree_sitter_util`.

pub mod node_kinds;

pub mod calls;
pub mod class;
pub mod composition;
pub mod destructuring;
pub mod fixture_calls;
pub mod imports;
pub mod member;
pub mod types;

use crate::domain::ports::SourceAstParser;
use tree_sitter::{Parser, Tree};

/// An owned parsed file: the tree plus the source text it was parsed from
/// (tree-sitter nodes only borrow byte offsets, so the text must outlive
/// every `Node` produced from `tree`). `Tree` is a cheap, refcounted handle
/// onto the underlying C tree-sitter tree, so cloning is inexpensive.
#[derive(Clone)]
pub struct ParsedAst {
    pub tree: Tree,
    pub source: String,
}

impl ParsedAst {
    pub fn root(&self) -> tree_sitter::Node<'_> {
        self.tree.root_node()
    }
}

/// Default `SourceAstParser` adapter, backed by `tree-sitter-typescript`.
/// Handles both `.ts` and `.tsx` via the TSX grammar variant, which is a
/// strict superset for non-JSX files.
pub struct TreeSitterTsParser;

impl TreeSitterTsParser {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TreeSitterTsParser {
    fn default() -> Self {
        Self::new()
    }
}

impl SourceAstParser for TreeSitterTsParser {
    fn parse(&self, content: &str) -> Option<ParsedAst> {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_typescript::LANGUAGE_TSX.into())
            .ok()?;
        let tree = parser.parse(content, None)?;
        Some(ParsedAst {
            tree,
            source: content.to_string(),
        })
    }
}
