//! Call-site shape classification for the Impact Propagation Engine's
//! direct-edge extraction: `this.name()`, `super.name()`,
//! `this.field.name()`, `this["literal"]()`, `this[dynamic]()`, and chains
//! deeper than one field hop.

use super::node_kinds as k;
use crate::shared::tree_sitter_util::{extract_identifier, node_text, walk_preorder};
use tree_sitter::Node;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallShape {
    /// `this.name(...)` or the equivalent `this["name"](...)`.
    ThisDirect { name: String },
    /// `this.field.name(...)` — a single composed-field hop.
    ThisField { field: String, name: String },
    /// `this.<chain of depth >= 2>.name(...)` — resolvable only by a deep
    /// static-dispatch analysis this engine doesn't perform. Fail-open.
    ThisDeepChain,
    /// `this[<non-literal expression>](...)` — the callee name can't be
    /// determined statically. Fail-open.
    ThisDynamicIndex,
    /// `super.name(...)`.
    SuperCall { name: String },
}

#[derive(Debug, Clone)]
pub struct CallSite<'a> {
    pub node: Node<'a>,
    pub shape: CallShape,
}

/// Every `this`/`super`-rooted call reachable from `root`. Calls on any
/// other receiver (`this.field.helper()` aside) carry no resolvable
/// member identity and are not part of the direct-edge graph.
pub fn call_sites<'a>(root: Node<'a>, source: &str) -> Vec<CallSite<'a>> {
    let mut out = Vec::new();
    walk_preorder(root, &mut |node| {
        if node.kind() == k::CALL_EXPRESSION {
            if let Some(shape) = classify(&node, source) {
                out.push(CallSite { node, shape });
            }
        }
    });
    out
}

fn classify(call: &Node, source: &str) -> Option<CallShape> {
    let callee = call.child_by_field_name("function")?;
    match callee.kind() {
        k::MEMBER_EXPRESSION => classify_member_callee(&callee, source),
        k::SUBSCRIPT_EXPRESSION => classify_subscript_callee(&callee, source),
        _ => None,
    }
}

fn classify_member_callee(callee: &Node, source: &str) -> Option<CallShape> {
    let property = callee.child_by_field_name("property")?;
    let name = extract_identifier(&property, source)?;
    let object = callee.child_by_field_name("object")?;
    match object.kind() {
        k::THIS => Some(CallShape::ThisDirect { name }),
        k::SUPER => Some(CallShape::SuperCall { name }),
        k::MEMBER_EXPRESSION => {
            let prefix = this_chain(&object, source)?;
            match prefix.len() {
                0 => None,
                1 => Some(CallShape::ThisField {
                    field: prefix[0].clone(),
                    name,
                }),
                _ => Some(CallShape::ThisDeepChain),
            }
        }
        _ => None,
    }
}

fn classify_subscript_callee(callee: &Node, source: &str) -> Option<CallShape> {
    let object = callee.child_by_field_name("object")?;
    if object.kind() != k::THIS {
        return None;
    }
    let index = callee.child_by_field_name("index")?;
    match literal_string_text(&index, source) {
        Some(name) => Some(CallShape::ThisDirect { name }),
        None => Some(CallShape::ThisDynamicIndex),
    }
}

/// The chain of property-name hops from `this` down to (and including)
/// `node`'s own property, for a `member_expression` ultimately rooted at
/// `this`. Returns `None` if the chain doesn't bottom out at `this`.
fn this_chain(node: &Node, source: &str) -> Option<Vec<String>> {
    if node.kind() != k::MEMBER_EXPRESSION {
        return None;
    }
    let property = node.child_by_field_name("property")?;
    let name = extract_identifier(&property, source)?;
    let object = node.child_by_field_name("object")?;
    match object.kind() {
        k::THIS => Some(vec![name]),
        k::MEMBER_EXPRESSION => {
            let mut prefix = this_chain(&object, source)?;
            prefix.push(name);
            Some(prefix)
        }
        _ => None,
    }
}

fn literal_string_text(node: &Node, source: &str) -> Option<String> {
    if node.kind() != k::STRING {
        return None;
    }
    let mut cursor = node.walk();
    let fragment = node.children(&mut cursor).find(|c| c.kind() == k::STRING_FRAGMENT)?;
    Some(node_text(&fragment, source).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::SourceAstParser;
    use crate::parsing::TreeSitterTsParser;

    fn shapes(src: &str) -> Vec<CallShape> {
        let parser = TreeSitterTsParser::new();
        let ast = parser.parse(src).unwrap();
        call_sites(ast.root(), &ast.source).into_iter().map(|c| c.shape).collect()
    }

    #[test]
    fn this_direct_call() {
        let s = shapes("class A { open() { this.click(); } }");
        assert_eq!(s, vec![CallShape::ThisDirect { name: "click".into() }]);
    }

    #[test]
    fn super_call() {
        let s = shapes("class A extends B { open() { super.open(); } }");
        assert_eq!(s, vec![CallShape::SuperCall { name: "open".into() }]);
    }

    #[test]
    fn this_field_call_is_single_hop() {
        let s = shapes("class A { open() { this.header.click(); } }");
        assert_eq!(
            s,
            vec![CallShape::ThisField {
                field: "header".into(),
                name: "click".into()
            }]
        );
    }

    #[test]
    fn deep_chain_is_flagged() {
        let s = shapes("class A { open() { this.header.nav.click(); } }");
        assert_eq!(s, vec![CallShape::ThisDeepChain]);
    }

    #[test]
    fn literal_index_matches_direct_call() {
        let s = shapes("class A { open() { this['click'](); } }");
        assert_eq!(s, vec![CallShape::ThisDirect { name: "click".into() }]);
    }

    #[test]
    fn dynamic_index_is_flagged() {
        let s = shapes("class A { open(name) { this[name](); } }");
        assert_eq!(s, vec![CallShape::ThisDynamicIndex]);
    }

    #[test]
    fn unrelated_receiver_is_ignored() {
        let s = shapes("class A { open() { other.click(); } }");
        assert!(s.is_empty());
    }
}
