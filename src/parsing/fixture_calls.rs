//! Call-site and alias extraction for the Spec Selection Pipeline's
//! method-level AST matching: classifies call expressions
//! against an arbitrary receiver chain (not just `this`/`super`, unlike
//! `calls.rs`), and finds alias/destructure declarations that forward a
//! fixture-bound variable's member.

use super::node_kinds as k;
use crate::shared::tree_sitter_util::{extract_identifier, node_text, walk_preorder};
use std::collections::HashSet;
use tree_sitter::Node;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FixtureCallShape {
    /// `var.name(...)`, `var.x.name(...)`, or `var["literal"](...)`, with
    /// `depth` hops from `root` to the callee name (Glossary "chain depth").
    Direct { root: String, name: String, depth: u32 },
    /// `var[<non-literal>](...)` — a non-literal index anywhere in the
    /// receiver chain.
    DynamicIndex { root: String },
    /// A bare call `name(...)` where `name` might be a tracked alias.
    BareCall { name: String },
}

/// Every call expression reachable from `root`, classified by receiver
/// shape. Calls whose receiver doesn't bottom out at a plain identifier
/// (e.g. a call chained off another call's return value) are skipped.
pub fn fixture_call_sites(root: Node, source: &str) -> Vec<FixtureCallShape> {
    let mut out = Vec::new();
    walk_preorder(root, &mut |node| {
        if node.kind() != k::CALL_EXPRESSION {
            return;
        }
        let Some(callee) = node.child_by_field_name("function") else {
            return;
        };
        if let Some(shape) = classify(&callee, source) {
            out.push(shape);
        }
    });
    out
}

fn classify(callee: &Node, source: &str) -> Option<FixtureCallShape> {
    match callee.kind() {
        k::IDENTIFIER => Some(FixtureCallShape::BareCall {
            name: node_text(callee, source).to_string(),
        }),
        k::MEMBER_EXPRESSION => {
            let property = callee.child_by_field_name("property")?;
            let name = extract_identifier(&property, source)?;
            let object = callee.child_by_field_name("object")?;
            let (root, depth, dynamic) = walk_receiver_chain(&object, source)?;
            if dynamic {
                return Some(FixtureCallShape::DynamicIndex { root });
            }
            Some(FixtureCallShape::Direct { root, name, depth: depth + 1 })
        }
        k::SUBSCRIPT_EXPRESSION => {
            let object = callee.child_by_field_name("object")?;
            let index = callee.child_by_field_name("index")?;
            let (root, depth, dynamic) = walk_receiver_chain(&object, source)?;
            if dynamic {
                return Some(FixtureCallShape::DynamicIndex { root });
            }
            match literal_string(&index, source) {
                Some(name) => Some(FixtureCallShape::Direct { root, name, depth: depth + 1 }),
                None => Some(FixtureCallShape::DynamicIndex { root }),
            }
        }
        _ => None,
    }
}

/// Walk a receiver expression down to its root identifier, returning
/// `(root_name, hop_count, saw_dynamic_index)`. `hop_count` is the number of
/// property/index accesses strictly between the root and this node.
fn walk_receiver_chain(node: &Node, source: &str) -> Option<(String, u32, bool)> {
    match node.kind() {
        k::IDENTIFIER => Some((node_text(node, source).to_string(), 0, false)),
        k::MEMBER_EXPRESSION => {
            let object = node.child_by_field_name("object")?;
            let (root, depth, dynamic) = walk_receiver_chain(&object, source)?;
            Some((root, depth + 1, dynamic))
        }
        k::SUBSCRIPT_EXPRESSION => {
            let object = node.child_by_field_name("object")?;
            let index = node.child_by_field_name("index")?;
            let (root, depth, dynamic) = walk_receiver_chain(&object, source)?;
            let is_literal = literal_string(&index, source).is_some();
            Some((root, depth + 1, dynamic || !is_literal))
        }
        _ => None,
    }
}

fn literal_string(node: &Node, source: &str) -> Option<String> {
    if node.kind() != k::STRING {
        return None;
    }
    let mut cursor = node.walk();
    let fragment = node.children(&mut cursor).find(|c| c.kind() == k::STRING_FRAGMENT)?;
    Some(node_text(&fragment, source).to_string())
}

/// Local names bound by `const f = var.name` (or `var["name"]`) or
/// `const { name } = var` — these alias-creation shapes are treated as
/// uncertain regardless of how the alias is later called.
pub fn alias_bindings(root: Node, source: &str) -> HashSet<String> {
    let mut out = HashSet::new();
    walk_preorder(root, &mut |node| {
        if node.kind() != k::VARIABLE_DECLARATOR {
            return;
        }
        let Some(name_node) = node.child_by_field_name("name") else {
            return;
        };
        let Some(value) = node.child_by_field_name("value") else {
            return;
        };
        match name_node.kind() {
            k::IDENTIFIER => {
                if matches!(value.kind(), k::MEMBER_EXPRESSION | k::SUBSCRIPT_EXPRESSION) {
                    if let Some(local) = extract_identifier(&name_node, source) {
                        out.insert(local);
                    }
                }
            }
            k::OBJECT_PATTERN => {
                if value.kind() == k::IDENTIFIER {
                    let mut cursor = name_node.walk();
                    for child in name_node.children(&mut cursor) {
                        match child.kind() {
                            k::SHORTHAND_PROPERTY_IDENTIFIER_PATTERN => {
                                if let Some(local) = extract_identifier(&child, source) {
                                    out.insert(local);
                                }
                            }
                            k::PAIR_PATTERN => {
                                if let Some(val) = child.child_by_field_name("value") {
                                    if let Some(local) = extract_identifier(&val, source) {
                                        out.insert(local);
                                    }
                                }
                            }
                            _ => {}
                        }
                    }
                }
            }
            _ => {}
        }
    });
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::SourceAstParser;
    use crate::parsing::TreeSitterTsParser;

    fn sites(src: &str) -> Vec<FixtureCallShape> {
        let parser = TreeSitterTsParser::new();
        let ast = parser.parse(src).unwrap();
        fixture_call_sites(ast.root(), &ast.source)
    }

    #[test]
    fn direct_call_depth_one() {
        let s = sites("myPage.open();");
        assert_eq!(
            s,
            vec![FixtureCallShape::Direct {
                root: "myPage".into(),
                name: "open".into(),
                depth: 1
            }]
        );
    }

    #[test]
    fn chained_call_depth_two() {
        let s = sites("myPage.header.click();");
        assert_eq!(
            s,
            vec![FixtureCallShape::Direct {
                root: "myPage".into(),
                name: "click".into(),
                depth: 2
            }]
        );
    }

    #[test]
    fn deep_chain_depth_three() {
        let s = sites("myPage.header.nav.click();");
        assert_eq!(
            s,
            vec![FixtureCallShape::Direct {
                root: "myPage".into(),
                name: "click".into(),
                depth: 3
            }]
        );
    }

    #[test]
    fn dynamic_index_call() {
        let s = sites("const k = 'open'; myPage[k]();");
        assert!(s.iter().any(|s| matches!(s, FixtureCallShape::DynamicIndex { root } if root == "myPage")));
    }

    #[test]
    fn literal_index_is_not_dynamic() {
        let s = sites("myPage['open']();");
        assert_eq!(
            s,
            vec![FixtureCallShape::Direct {
                root: "myPage".into(),
                name: "open".into(),
                depth: 1
            }]
        );
    }

    #[test]
    fn bare_call_is_recorded() {
        let s = sites("f();");
        assert_eq!(s, vec![FixtureCallShape::BareCall { name: "f".into() }]);
    }

    #[test]
    fn alias_via_member_expression_assignment() {
        let parser = TreeSitterTsParser::new();
        let ast = parser.parse("const f = myPage.open;").unwrap();
        let aliases = alias_bindings(ast.root(), &ast.source);
        assert!(aliases.contains("f"));
    }

    #[test]
    fn alias_via_destructuring_assignment() {
        let parser = TreeSitterTsParser::new();
        let ast = parser.parse("const { open } = myPage;").unwrap();
        let aliases = alias_bindings(ast.root(), &ast.source);
        assert!(aliases.contains("open"));
    }
}
