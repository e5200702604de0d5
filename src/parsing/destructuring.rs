//! Object-destructuring extraction from callable parameter lists, for the
//! fixture-key prefilter and fixture-variable → class map
//!: `{ myPage }`, `{ myPage: page }`, `{ myPage = default }`,
//! and nested patterns.

use super::node_kinds as k;
use crate::shared::tree_sitter_util::{extract_identifier, find_child_by_field, node_text, walk_preorder};
use tree_sitter::Node;

/// One destructured binding: the fixture key (source property name) and the
/// local variable name it's bound to — identical unless aliased.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixtureBinding {
    pub fixture_key: String,
    pub local_name: String,
}

/// Every fixture binding destructured from any function/arrow/method's
/// first parameter, anywhere in the file. Flat and scope-oblivious — Stage
/// A/B only need presence of a binding, not block-scoped shadowing.
pub fn fixture_bindings(root: Node, source: &str) -> Vec<FixtureBinding> {
    let mut out = Vec::new();
    walk_preorder(root, &mut |node| {
        if let Some(params) = parameter_list(&node) {
            if let Some(pattern) = first_parameter_pattern(&params) {
                collect_object_pattern_bindings(&pattern, source, &mut out);
            }
        }
    });
    out
}

fn parameter_list<'a>(node: &Node<'a>) -> Option<Node<'a>> {
    match node.kind() {
        k::ARROW_FUNCTION | k::FUNCTION_EXPRESSION | k::FUNCTION_DECLARATION | k::METHOD_DEFINITION => {
            find_child_by_field(node, "parameters")
        }
        _ => None,
    }
}

fn first_parameter_pattern<'a>(params: &Node<'a>) -> Option<Node<'a>> {
    let mut cursor = params.walk();
    let first = params.children(&mut cursor).find(|c| c.is_named())?;
    unwrap_parameter(first)
}

/// Strip `required_parameter`/`optional_parameter` wrappers and a
/// parameter-level default (`param = default`) down to the bare pattern.
fn unwrap_parameter(node: Node) -> Option<Node> {
    match node.kind() {
        k::REQUIRED_PARAMETER | k::OPTIONAL_PARAMETER => find_child_by_field(&node, "pattern").and_then(unwrap_parameter),
        k::ASSIGNMENT_PATTERN => find_child_by_field(&node, "left").and_then(unwrap_parameter),
        k::OBJECT_PATTERN => Some(node),
        _ => None,
    }
}

fn collect_object_pattern_bindings(pattern: &Node, source: &str, out: &mut Vec<FixtureBinding>) {
    let mut cursor = pattern.walk();
    for child in pattern.children(&mut cursor) {
        match child.kind() {
            k::SHORTHAND_PROPERTY_IDENTIFIER_PATTERN => {
                if let Some(name) = extract_identifier(&child, source) {
                    out.push(FixtureBinding {
                        fixture_key: name.clone(),
                        local_name: name,
                    });
                }
            }
            k::PAIR_PATTERN => {
                let Some(key_node) = find_child_by_field(&child, "key") else {
                    continue;
                };
                let Some(key) = extract_identifier(&key_node, source).or_else(|| Some(node_text(&key_node, source).trim_matches(['"', '\'']).to_string())) else {
                    continue;
                };
                let Some(value) = find_child_by_field(&child, "value") else {
                    continue;
                };
                if let Some(local_name) = leaf_identifier(&value, source) {
                    out.push(FixtureBinding { fixture_key: key, local_name });
                }
            }
            k::ASSIGNMENT_PATTERN => {
                // A shorthand default, `{ myPage = fallback }`: `left` is
                // the binding identifier, which is both key and local name.
                if let Some(left) = find_child_by_field(&child, "left") {
                    if let Some(name) = extract_identifier(&left, source) {
                        out.push(FixtureBinding {
                            fixture_key: name.clone(),
                            local_name: name,
                        });
                    }
                }
            }
            k::REST_PATTERN => {}
            _ => {}
        }
    }
}

/// The local identifier a `pair_pattern`'s `value` side ultimately binds to:
/// a plain identifier, or an identifier behind a default
/// (`{ myPage: page = fallback }`). A nested object/array pattern doesn't
/// bind a single local name to the outer fixture key, so it contributes
/// nothing here.
fn leaf_identifier(node: &Node, source: &str) -> Option<String> {
    match node.kind() {
        k::ASSIGNMENT_PATTERN => find_child_by_field(node, "left").and_then(|left| leaf_identifier(&left, source)),
        _ => extract_identifier(node, source),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::SourceAstParser;
    use crate::parsing::TreeSitterTsParser;

    fn bindings(src: &str) -> Vec<FixtureBinding> {
        let parser = TreeSitterTsParser::new();
        let ast = parser.parse(src).unwrap();
        fixture_bindings(ast.root(), &ast.source)
    }

    #[test]
    fn shorthand_binding() {
        let b = bindings("test('x', async ({ myPage }) => { myPage.open(); });");
        assert_eq!(b, vec![FixtureBinding { fixture_key: "myPage".into(), local_name: "myPage".into() }]);
    }

    #[test]
    fn aliased_binding() {
        let b = bindings("test('x', async ({ myPage: page }) => { page.open(); });");
        assert_eq!(b, vec![FixtureBinding { fixture_key: "myPage".into(), local_name: "page".into() }]);
    }

    #[test]
    fn binding_with_default() {
        let b = bindings("test('x', async ({ myPage = null }) => {});");
        assert_eq!(b, vec![FixtureBinding { fixture_key: "myPage".into(), local_name: "myPage".into() }]);
    }

    #[test]
    fn multiple_bindings_in_one_parameter() {
        let b = bindings("test('x', async ({ myPage, header }) => {});");
        assert_eq!(b.len(), 2);
        assert!(b.iter().any(|bi| bi.fixture_key == "myPage"));
        assert!(b.iter().any(|bi| bi.fixture_key == "header"));
    }

    #[test]
    fn non_destructured_parameter_yields_no_bindings() {
        let b = bindings("test('x', async (fixtures) => { fixtures.myPage.open(); });");
        assert!(b.is_empty());
    }
}
