//! Class member extraction: constructors, call/get/set methods, fields,
//! grouped by `{kind, name}` into overload signatures plus an
//! implementation body.

use super::node_kinds as k;
use crate::domain::model::{MemberIdentity, MemberKind};
use crate::shared::tree_sitter_util::{extract_identifier, find_child_by_field, find_child_by_kind};
use std::collections::HashMap;
use tree_sitter::Node;

/// A `{kind, name}` group of AST nodes: zero or more bodiless overload
/// signatures, plus at most one node carrying an implementation.
#[derive(Default)]
pub struct MemberGroup<'a> {
    pub overload_nodes: Vec<Node<'a>>,
    pub implementation_node: Option<Node<'a>>,
}

/// Walk a `class_body` node's direct members and group them by identity.
pub fn members_in_class<'a>(class_body: Node<'a>, source: &str) -> HashMap<MemberIdentity, MemberGroup<'a>> {
    let mut groups: HashMap<MemberIdentity, MemberGroup<'a>> = HashMap::new();
    let mut cursor = class_body.walk();
    for child in class_body.children(&mut cursor) {
        let Some(identity) = member_identity(&child, source) else {
            continue;
        };
        let entry = groups.entry(identity).or_default();
        if child.kind() == k::PUBLIC_FIELD_DEFINITION {
            entry.implementation_node = Some(child);
        } else if has_body(&child) {
            entry.implementation_node = Some(child);
        } else {
            entry.overload_nodes.push(child);
        }
    }
    groups
}

fn has_body(node: &Node) -> bool {
    find_child_by_field(node, "body").is_some() || find_child_by_kind(node, k::STATEMENT_BLOCK).is_some()
}

/// Classify a class-body child as a member identity, or `None` if it isn't
/// a member we track (index signatures, static blocks, decorators-only
/// nodes, etc).
fn member_identity(node: &Node, source: &str) -> Option<MemberIdentity> {
    match node.kind() {
        k::METHOD_DEFINITION | k::METHOD_SIGNATURE | k::ABSTRACT_METHOD_SIGNATURE => {
            let name = member_name(node, source)?;
            let kind = if name == "constructor" {
                MemberKind::Constructor
            } else if has_accessor_keyword(node, k::GET) {
                MemberKind::Get
            } else if has_accessor_keyword(node, k::SET) {
                MemberKind::Set
            } else {
                MemberKind::Call
            };
            Some(MemberIdentity { kind, name })
        }
        k::PUBLIC_FIELD_DEFINITION => {
            let name = member_name(node, source)?;
            Some(MemberIdentity {
                kind: MemberKind::Field,
                name,
            })
        }
        _ => None,
    }
}

fn member_name(node: &Node, source: &str) -> Option<String> {
    find_child_by_field(node, "name").and_then(|n| extract_identifier(&n, source))
}

fn has_accessor_keyword(node: &Node, keyword: &str) -> bool {
    let mut cursor = node.walk();
    node.children(&mut cursor).any(|c| c.kind() == keyword)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::SourceAstParser;
    use crate::parsing::class;
    use crate::parsing::TreeSitterTsParser;

    fn parse_class_body(src: &str) -> (tree_sitter::Tree, String) {
        let parser = TreeSitterTsParser::new();
        let ast = parser.parse(src).unwrap();
        (ast.tree, ast.source)
    }

    #[test]
    fn constructor_call_get_set_and_field_are_distinguished() {
        let src = "class A {\n  x: number;\n  constructor() {}\n  get y() { return 1; }\n  set y(v) {}\n  open() { return 1; }\n}";
        let (tree, source) = parse_class_body(src);
        let root = tree.root_node();
        let class_node = class::class_nodes(root)[0];
        let body = class::class_body(&class_node).unwrap();
        let groups = members_in_class(body, &source);

        assert!(groups.contains_key(&MemberIdentity {
            kind: MemberKind::Constructor,
            name: "constructor".into()
        }));
        assert!(groups.contains_key(&MemberIdentity {
            kind: MemberKind::Get,
            name: "y".into()
        }));
        assert!(groups.contains_key(&MemberIdentity {
            kind: MemberKind::Set,
            name: "y".into()
        }));
        assert!(groups.contains_key(&MemberIdentity {
            kind: MemberKind::Field,
            name: "x".into()
        }));
        assert!(groups.contains_key(&MemberIdentity {
            kind: MemberKind::Call,
            name: "open".into()
        }));
    }

    #[test]
    fn overload_signatures_group_with_their_implementation() {
        let src = "class A {\n  open(a: string): void;\n  open(a: number): void;\n  open(a: any) { return; }\n}";
        let (tree, source) = parse_class_body(src);
        let class_node = class::class_nodes(tree.root_node())[0];
        let body = class::class_body(&class_node).unwrap();
        let groups = members_in_class(body, &source);
        let group = groups
            .get(&MemberIdentity {
                kind: MemberKind::Call,
                name: "open".into(),
            })
            .unwrap();
        assert_eq!(group.overload_nodes.len(), 2);
        assert!(group.implementation_node.is_some());
    }
}
