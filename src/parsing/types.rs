//! Type-expression helpers used by the fixture-map parser: locating
//! top-level type-alias/interface declarations, unwrapping parenthesized
//! types, flattening unions/intersections, and reading an `object_type`'s
//! property signatures.

use super::node_kinds as k;
use crate::shared::tree_sitter_util::{extract_identifier, find_child_by_field, find_child_by_kind, find_children_by_kind, node_text};
use tree_sitter::Node;

pub fn type_alias_declarations<'a>(root: Node<'a>) -> Vec<Node<'a>> {
    let mut cursor = root.walk();
    root.children(&mut cursor)
        .flat_map(|top| unwrap_export(top))
        .filter(|n| n.kind() == k::TYPE_ALIAS_DECLARATION)
        .collect()
}

pub fn interface_declarations<'a>(root: Node<'a>) -> Vec<Node<'a>> {
    let mut cursor = root.walk();
    root.children(&mut cursor)
        .flat_map(|top| unwrap_export(top))
        .filter(|n| n.kind() == k::INTERFACE_DECLARATION)
        .collect()
}

fn unwrap_export(node: Node<'_>) -> Vec<Node<'_>> {
    if node.kind() == k::EXPORT_STATEMENT {
        let mut cursor = node.walk();
        node.children(&mut cursor).collect()
    } else {
        vec![node]
    }
}

pub fn decl_name(node: &Node, source: &str) -> Option<String> {
    find_child_by_field(node, "name").and_then(|n| extract_identifier(&n, source))
}

/// The right-hand side of `type X = <value>`.
pub fn type_alias_value<'a>(node: &Node<'a>) -> Option<Node<'a>> {
    find_child_by_field(node, "value")
}

/// The `{ ... }` body of an interface declaration.
pub fn interface_body<'a>(node: &Node<'a>) -> Option<Node<'a>> {
    find_child_by_field(node, "body")
}

/// Base interface names from an `extends` clause (multiple bases allowed).
pub fn interface_extends(node: &Node, source: &str) -> Vec<String> {
    let Some(clause) = find_child_by_kind(node, "extends_type_clause")
        .or_else(|| find_child_by_kind(node, k::EXTENDS_CLAUSE))
    else {
        return Vec::new();
    };
    let mut cursor = clause.walk();
    clause
        .children(&mut cursor)
        .filter(|c| c.kind() != "extends" && c.kind() != ",")
        .filter_map(|c| class_name_of_type(&c, source))
        .collect()
}

/// Strip a `(<type>)` wrapper, recursively.
pub fn unwrap_parenthesized<'a>(mut node: Node<'a>) -> Node<'a> {
    while node.kind() == k::PARENTHESIZED_TYPE {
        match find_child_by_field(&node, "type").or_else(|| {
            let mut cursor = node.walk();
            node.children(&mut cursor).find(|c| c.kind() != "(" && c.kind() != ")")
        }) {
            Some(inner) => node = inner,
            None => break,
        }
    }
    node
}

/// Flatten a union/intersection into its member type nodes; any other node
/// flattens to itself.
pub fn flatten_members<'a>(node: Node<'a>) -> Vec<Node<'a>> {
    let node = unwrap_parenthesized(node);
    match node.kind() {
        k::UNION_TYPE | k::INTERSECTION_TYPE => {
            let mut cursor = node.walk();
            node.children(&mut cursor)
                .filter(|c| c.kind() != "|" && c.kind() != "&")
                .flat_map(flatten_members)
                .collect()
        }
        _ => vec![node],
    }
}

/// If `type_node` names a class (identifier starting with an uppercase
/// letter; qualified names take the rightmost identifier), return that
/// name.
pub fn class_name_of_type(type_node: &Node, source: &str) -> Option<String> {
    let node = unwrap_parenthesized(*type_node);
    let name = match node.kind() {
        k::TYPE_IDENTIFIER => node_text(&node, source).to_string(),
        k::GENERIC_TYPE => {
            let name_node = find_child_by_field(&node, "name")?;
            class_name_of_type(&name_node, source)?
        }
        k::NESTED_IDENTIFIER => {
            // Qualified name `A.B.C` — rightmost identifier wins.
            let mut cursor = node.walk();
            node.children(&mut cursor).last().map(|n| node_text(&n, source).to_string())?
        }
        k::IDENTIFIER => node_text(&node, source).to_string(),
        _ => return None,
    };
    name.chars().next().filter(|c| c.is_ascii_uppercase())?;
    Some(name)
}

/// The identifier a `type_identifier`/`generic_type`/`nested_type_identifier`
/// node names, regardless of case — used to dereference a type reference to
/// its declaration, as opposed to [`class_name_of_type`] which additionally
/// rejects lowercase names because it's used to decide "is this a class".
pub fn type_ref_name(type_node: &Node, source: &str) -> Option<String> {
    let node = unwrap_parenthesized(*type_node);
    match node.kind() {
        k::TYPE_IDENTIFIER | k::IDENTIFIER => Some(node_text(&node, source).to_string()),
        k::GENERIC_TYPE => {
            let name_node = find_child_by_field(&node, "name")?;
            type_ref_name(&name_node, source)
        }
        k::NESTED_IDENTIFIER => {
            let mut cursor = node.walk();
            node.children(&mut cursor).last().map(|n| node_text(&n, source).to_string())
        }
        _ => None,
    }
}

/// `(property-name, type-node)` pairs declared directly in an `object_type`.
pub fn object_type_properties<'a>(object_type: Node<'a>, source: &str) -> Vec<(String, Node<'a>)> {
    find_children_by_kind(&object_type, k::PROPERTY_SIGNATURE)
        .into_iter()
        .filter_map(|prop| {
            let name = find_child_by_field(&prop, "name").and_then(|n| extract_identifier(&n, source))?;
            let annotation = find_child_by_kind(&prop, k::TYPE_ANNOTATION)?;
            let type_node = find_child_by_field(&annotation, "type").or_else(|| {
                let mut cursor = annotation.walk();
                annotation.children(&mut cursor).find(|c| c.kind() != ":")
            })?;
            Some((name, type_node))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::SourceAstParser;
    use crate::parsing::TreeSitterTsParser;

    #[test]
    fn flattens_union_of_two_classes() {
        let parser = TreeSitterTsParser::new();
        let ast = parser.parse("type X = A | B;").unwrap();
        let decl = type_alias_declarations(ast.root())[0];
        let value = type_alias_value(&decl).unwrap();
        let members = flatten_members(value);
        let names: Vec<_> = members
            .iter()
            .filter_map(|n| class_name_of_type(n, &ast.source))
            .collect();
        assert_eq!(names, vec!["A", "B"]);
    }

    #[test]
    fn unwraps_parenthesized_intersection() {
        let parser = TreeSitterTsParser::new();
        let ast = parser.parse("type X = (A & B);").unwrap();
        let decl = type_alias_declarations(ast.root())[0];
        let value = type_alias_value(&decl).unwrap();
        let members = flatten_members(value);
        assert_eq!(members.len(), 2);
    }

    #[test]
    fn lowercase_identifiers_are_not_class_names() {
        let parser = TreeSitterTsParser::new();
        let ast = parser.parse("type X = string;").unwrap();
        let decl = type_alias_declarations(ast.root())[0];
        let value = type_alias_value(&decl).unwrap();
        assert_eq!(class_name_of_type(&value, &ast.source), None);
    }
}
