//! Component C — Fixture Map Parser.
//!
//! Parses a single types-declaration file into a bidirectional mapping
//! between fixture keys and the POM classes they bind to.

use crate::domain::model::{ClassName, FixtureKey};
use crate::parsing::types::{
    class_name_of_type, decl_name, flatten_members, interface_body, interface_declarations, interface_extends,
    object_type_properties, type_alias_declarations, type_alias_value, type_ref_name,
};
use crate::parsing::ParsedAst;
use std::collections::{HashMap, HashSet};
use tree_sitter::Node;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FixtureMap {
    pub class_to_fixture_keys: HashMap<ClassName, HashSet<FixtureKey>>,
    pub fixture_key_to_class: HashMap<FixtureKey, ClassName>,
}

impl FixtureMap {
    fn insert(&mut self, key: FixtureKey, class: ClassName) {
        self.class_to_fixture_keys.entry(class.clone()).or_default().insert(key.clone());
        // First writer wins on key collisions: there's no defined
        // precedence for a fixture key bound twice, and the prefilter
        // only needs *a* class, not every candidate.
        self.fixture_key_to_class.entry(key).or_insert(class);
    }
}

struct Resolver<'a> {
    source: &'a str,
    aliases_by_name: HashMap<String, Node<'a>>,
    interfaces_by_name: HashMap<String, Node<'a>>,
    memo: HashMap<String, Vec<(String, String)>>,
    visiting: HashSet<String>,
}

impl<'a> Resolver<'a> {
    fn resolve(&mut self, node: Node<'a>) -> Vec<(String, String)> {
        if let Some(name) = type_ref_name(&node, self.source) {
            return self.resolve_named(&name);
        }
        match node.kind() {
            crate::parsing::node_kinds::OBJECT_TYPE => object_type_properties(node, self.source)
                .into_iter()
                .filter_map(|(prop, type_node)| class_name_of_type(&type_node, self.source).map(|class| (prop, class)))
                .collect(),
            crate::parsing::node_kinds::UNION_TYPE | crate::parsing::node_kinds::INTERSECTION_TYPE => {
                flatten_members(node).into_iter().flat_map(|m| self.resolve(m)).collect()
            }
            _ => Vec::new(),
        }
    }

    fn resolve_named(&mut self, name: &str) -> Vec<(String, String)> {
        if let Some(cached) = self.memo.get(name) {
            return cached.clone();
        }
        if self.visiting.contains(name) {
            return Vec::new();
        }
        self.visiting.insert(name.to_string());

        let pairs = if let Some(alias) = self.aliases_by_name.get(name).copied() {
            match type_alias_value(&alias) {
                Some(value) => self.resolve(value),
                None => Vec::new(),
            }
        } else if let Some(iface) = self.interfaces_by_name.get(name).copied() {
            let mut pairs = interface_body(&iface).map(|body| self.resolve(body)).unwrap_or_default();
            for base in interface_extends(&iface, self.source) {
                pairs.extend(self.resolve_named(&base));
            }
            pairs
        } else {
            Vec::new()
        };

        self.visiting.remove(name);
        self.memo.insert(name.to_string(), pairs.clone());
        pairs
    }
}

/// Build the fixture map from a parsed types-declaration file. A missing
/// file is represented upstream by the caller simply not invoking this
/// function — `build` itself always has an AST to work from.
pub fn build(ast: &ParsedAst) -> FixtureMap {
    let root = ast.root();
    let aliases_by_name: HashMap<String, Node> = type_alias_declarations(root)
        .into_iter()
        .filter_map(|n| decl_name(&n, &ast.source).map(|name| (name, n)))
        .collect();
    let interfaces_by_name: HashMap<String, Node> = interface_declarations(root)
        .into_iter()
        .filter_map(|n| decl_name(&n, &ast.source).map(|name| (name, n)))
        .collect();

    let mut resolver = Resolver {
        source: &ast.source,
        aliases_by_name: aliases_by_name.clone(),
        interfaces_by_name: interfaces_by_name.clone(),
        memo: HashMap::new(),
        visiting: HashSet::new(),
    };

    let mut map = FixtureMap::default();
    for name in aliases_by_name.keys().chain(interfaces_by_name.keys()) {
        for (key, class) in resolver.resolve_named(name) {
            map.insert(key, class);
        }
    }
    map
}

/// Empty maps, for the "missing file" case.
pub fn empty() -> FixtureMap {
    FixtureMap::default()
}

/// Every fixture key bound to any of `classes` — the Stage A prefilter set
/// a spec's destructured fixture keys are checked against.
pub fn fixture_keys_for_classes(map: &FixtureMap, classes: &HashSet<ClassName>) -> HashSet<FixtureKey> {
    classes
        .iter()
        .filter_map(|class| map.class_to_fixture_keys.get(class))
        .flat_map(|keys| keys.iter().cloned())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::SourceAstParser;
    use crate::parsing::TreeSitterTsParser;

    fn build_from(src: &str) -> FixtureMap {
        let parser = TreeSitterTsParser::new();
        let ast = parser.parse(src).unwrap();
        build(&ast)
    }

    #[test]
    fn object_type_alias_yields_direct_pairs() {
        let map = build_from("type Fixtures = { myPage: MyPage; header: Header };");
        assert_eq!(map.fixture_key_to_class.get("myPage"), Some(&"MyPage".to_string()));
        assert_eq!(map.fixture_key_to_class.get("header"), Some(&"Header".to_string()));
    }

    #[test]
    fn interface_declaration_yields_pairs() {
        let map = build_from("interface Fixtures { myPage: MyPage; }");
        assert_eq!(map.fixture_key_to_class.get("myPage"), Some(&"MyPage".to_string()));
    }

    #[test]
    fn intersection_of_two_object_types_flattens() {
        let map = build_from("type Fixtures = { myPage: MyPage } & { header: Header };");
        assert_eq!(map.class_to_fixture_keys.len(), 2);
    }

    #[test]
    fn interface_extends_contributes_base_pairs() {
        let map = build_from("interface Base { header: Header; } interface Fixtures extends Base { myPage: MyPage; }");
        assert_eq!(map.fixture_key_to_class.get("header"), Some(&"Header".to_string()));
        assert_eq!(map.fixture_key_to_class.get("myPage"), Some(&"MyPage".to_string()));
    }

    #[test]
    fn type_reference_dereferences_to_named_alias() {
        let map = build_from("type Inner = { myPage: MyPage }; type Fixtures = Inner;");
        assert_eq!(map.fixture_key_to_class.get("myPage"), Some(&"MyPage".to_string()));
    }

    #[test]
    fn lowercase_property_type_is_not_a_class_binding() {
        let map = build_from("type Fixtures = { timeout: number };");
        assert!(map.fixture_key_to_class.is_empty());
    }

    #[test]
    fn self_referential_alias_does_not_infinite_loop() {
        let map = build_from("type Fixtures = Fixtures;");
        assert!(map.fixture_key_to_class.is_empty());
    }

    #[test]
    fn missing_file_yields_empty_maps() {
        assert_eq!(empty(), FixtureMap::default());
    }
}
