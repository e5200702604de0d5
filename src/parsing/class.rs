//! Class declarations: discovery, name, `extends` clause, body access.

use super::node_kinds as k;
use crate::shared::tree_sitter_util::{extract_identifier, find_child_by_field, find_child_by_kind, walk_preorder};
use tree_sitter::Node;

/// Every `class_declaration` node reachable from `root`, in source order.
/// Classes nested in namespaces/functions are included; this is a
/// lightweight pattern-matching extractor, not a full type checker.
pub fn class_nodes<'a>(root: Node<'a>) -> Vec<Node<'a>> {
    let mut out = Vec::new();
    walk_preorder(root, &mut |n| {
        if n.kind() == k::CLASS_DECLARATION {
            out.push(n);
        }
    });
    out
}

pub fn class_name(node: &Node, source: &str) -> Option<String> {
    find_child_by_field(node, "name").and_then(|n| extract_identifier(&n, source))
}

/// The single parent class named in `extends`, if any. Multiple
/// inheritance, mixins, and `implements` are ignored.
pub fn extends_name(node: &Node, source: &str) -> Option<String> {
    let heritage = find_child_by_kind(node, k::CLASS_HERITAGE)?;
    let extends_clause = find_child_by_kind(&heritage, k::EXTENDS_CLAUSE)?;
    let mut cursor = extends_clause.walk();
    for child in extends_clause.children(&mut cursor) {
        if child.kind() != "extends" {
            // `extends Base` or `extends Base<T>` — take the identifier,
            // not the full generic-argument text.
            return extract_identifier(&child, source)
                .or_else(|| find_child_by_field(&child, "name").and_then(|n| extract_identifier(&n, source)));
        }
    }
    None
}

pub fn class_body<'a>(node: &Node<'a>) -> Option<Node<'a>> {
    find_child_by_kind(node, k::CLASS_BODY)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsing::TreeSitterTsParser;
    use crate::domain::ports::SourceAstParser;

    #[test]
    fn finds_class_and_its_parent() {
        let parser = TreeSitterTsParser::new();
        let ast = parser
            .parse("class BasePage {} class MyPage extends BasePage { open() {} }")
            .unwrap();
        let classes = class_nodes(ast.root());
        assert_eq!(classes.len(), 2);
        let my_page = classes
            .iter()
            .find(|c| class_name(c, &ast.source).as_deref() == Some("MyPage"))
            .unwrap();
        assert_eq!(extends_name(my_page, &ast.source).as_deref(), Some("BasePage"));
    }

    #[test]
    fn class_without_extends_has_no_parent() {
        let parser = TreeSitterTsParser::new();
        let ast = parser.parse("class MyPage {}").unwrap();
        let class = &class_nodes(ast.root())[0];
        assert_eq!(extends_name(class, &ast.source), None);
    }
}
