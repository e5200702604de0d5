//! Composed-field extraction: maps a
//! class's field names to the class they're known to hold, so
//! `this.field.name()` call sites can be resolved to a concrete member.
//!
//! Two independent sources feed the same map, by design — a field can be
//! declared with a type annotation and never assigned in the constructor
//! (interfaces/abstract bases), or assigned without an annotation
//! (`private header;` then `this.header = new Header(this.page)`):
//!
//! 1. `field: FieldType` — the public-field-definition's type annotation.
//! 2. `this.field = new Type(...)` inside the constructor body.
//!
//! A field present in both is resolved by the constructor assignment,
//! since that's the concrete runtime type.

use super::node_kinds as k;
use super::types::class_name_of_type;
use crate::shared::tree_sitter_util::{extract_identifier, find_child_by_field, find_child_by_kind, walk_preorder};
use std::collections::HashMap;
use tree_sitter::Node;

/// `field-name -> composed class name` for the fields of a single class.
pub fn composed_field_class_by_name(class_body: Node, source: &str) -> HashMap<String, String> {
    let mut map = from_field_annotations(class_body, source);
    map.extend(from_constructor_assignments(class_body, source));
    map
}

fn from_field_annotations(class_body: Node, source: &str) -> HashMap<String, String> {
    let mut out = HashMap::new();
    let mut cursor = class_body.walk();
    for member in class_body.children(&mut cursor) {
        if member.kind() != k::PUBLIC_FIELD_DEFINITION {
            continue;
        }
        let Some(name) = find_child_by_field(&member, "name").and_then(|n| extract_identifier(&n, source)) else {
            continue;
        };
        let Some(annotation) = find_child_by_kind(&member, k::TYPE_ANNOTATION) else {
            continue;
        };
        let Some(type_node) = find_child_by_field(&annotation, "type").or_else(|| {
            let mut c = annotation.walk();
            annotation.children(&mut c).find(|c| c.kind() != ":")
        }) else {
            continue;
        };
        if let Some(class_name) = class_name_of_type(&type_node, source) {
            out.insert(name, class_name);
        }
    }
    out
}

fn from_constructor_assignments(class_body: Node, source: &str) -> HashMap<String, String> {
    let Some(constructor) = find_constructor(class_body, source) else {
        return HashMap::new();
    };
    let Some(body) = find_child_by_field(&constructor, "body") else {
        return HashMap::new();
    };
    let mut out = HashMap::new();
    walk_preorder(body, &mut |node| {
        if node.kind() != "assignment_expression" {
            return;
        }
        let Some(left) = find_child_by_field(&node, "left") else {
            return;
        };
        let Some(field) = this_field_name(&left, source) else {
            return;
        };
        let Some(right) = find_child_by_field(&node, "right") else {
            return;
        };
        if right.kind() != k::NEW_EXPRESSION {
            return;
        }
        let Some(ctor) = find_child_by_field(&right, "constructor") else {
            return;
        };
        if let Some(class_name) = class_name_of_type(&ctor, source) {
            out.insert(field, class_name);
        }
    });
    out
}

fn find_constructor<'a>(class_body: Node<'a>, source: &str) -> Option<Node<'a>> {
    let mut cursor = class_body.walk();
    class_body.children(&mut cursor).find(|m| {
        m.kind() == k::METHOD_DEFINITION
            && find_child_by_field(m, "name")
                .and_then(|n| extract_identifier(&n, source))
                .as_deref()
                == Some("constructor")
    })
}

/// `this.field` on the left-hand side of an assignment.
fn this_field_name(node: &Node, source: &str) -> Option<String> {
    if node.kind() != k::MEMBER_EXPRESSION {
        return None;
    }
    let object = find_child_by_field(node, "object")?;
    if object.kind() != k::THIS {
        return None;
    }
    let property = find_child_by_field(node, "property")?;
    extract_identifier(&property, source)
}
