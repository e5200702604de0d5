//! Small tree-sitter node helpers shared by every extractor in `parsing`.
//!
//! Thin wrappers around `tree_sitter::Node` rather than a bespoke AST.

use super::Span;
use tree_sitter::Node;

/// Convert a tree-sitter `Node`'s position to a 1-indexed `Span`.
pub fn node_to_span(node: &Node) -> Span {
    let start = node.start_position();
    let end = node.end_position();
    Span::new(
        (start.row + 1) as u32,
        (start.column + 1) as u32,
        (end.row + 1) as u32,
        (end.column + 1) as u32,
    )
}

/// Raw source text covered by a node.
pub fn node_text<'a>(node: &Node, source: &'a str) -> &'a str {
    &source[node.start_byte()..node.end_byte()]
}

/// First direct child of the given kind.
pub fn find_child_by_kind<'a>(node: &'a Node, kind: &str) -> Option<Node<'a>> {
    let mut cursor = node.walk();
    node.children(&mut cursor).find(|c| c.kind() == kind)
}

/// All direct children of the given kind.
pub fn find_children_by_kind<'a>(node: &'a Node, kind: &str) -> Vec<Node<'a>> {
    let mut cursor = node.walk();
    node.children(&mut cursor)
        .filter(|c| c.kind() == kind)
        .collect()
}

/// First direct child bound to the given tree-sitter field name.
pub fn find_child_by_field<'a>(node: &'a Node, field: &str) -> Option<Node<'a>> {
    node.child_by_field_name(field)
}

/// Extract an identifier's text, whether the node itself is an identifier or
/// wraps one as a direct child (e.g. `property_identifier`).
pub fn extract_identifier(node: &Node, source: &str) -> Option<String> {
    match node.kind() {
        "identifier" | "property_identifier" | "type_identifier" => {
            Some(node_text(node, source).to_string())
        }
        _ => find_child_by_kind(node, "identifier").map(|n| node_text(&n, source).to_string()),
    }
}

/// Render a node's text with every `comment` descendant skipped and
/// whitespace collapsed — the normalized rendering that fingerprints are
/// computed over.
pub fn normalized_rendering(node: &Node, source: &str) -> String {
    let mut out = String::new();
    collect_normalized(node, source, &mut out);
    super::fingerprint::normalize_text(&out)
}

fn collect_normalized(node: &Node, source: &str, out: &mut String) {
    if node.kind() == "comment" {
        return;
    }
    if node.child_count() == 0 {
        out.push_str(node_text(node, source));
        out.push(' ');
        return;
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        collect_normalized(&child, source, out);
    }
}

/// Depth-first walk invoking `visit` on every descendant (including `node`
/// itself), pre-order.
pub fn walk_preorder<'a>(node: Node<'a>, visit: &mut impl FnMut(Node<'a>)) {
    visit(node);
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        walk_preorder(child, visit);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tree_sitter::Parser;

    fn parse(src: &str) -> tree_sitter::Tree {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into())
            .unwrap();
        parser.parse(src, None).unwrap()
    }

    #[test]
    fn normalized_rendering_skips_comments() {
        let src = "function open() { /* comment */ return 1; }";
        let tree = parse(src);
        let rendered = normalized_rendering(&tree.root_node(), src);
        assert!(!rendered.contains("comment"));
    }
}
