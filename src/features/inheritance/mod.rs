//! Component D — Inheritance Graph Builder.
//!
//! A lightweight, forest-shaped single-inheritance extractor: scans the
//! configured analysis roots and records each class's direct `extends`
//! parent, if any. Multiple inheritance, mixins, and `implements` are
//! ignored by construction (the extractor only ever reads one base class).

use crate::domain::model::ClassName;
use crate::domain::ports::SourceAstParser;
use crate::parsing::class;
use rayon::prelude::*;
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InheritanceGraph {
    pub parents_by_child: HashMap<ClassName, ClassName>,
    pub children_by_parent: HashMap<ClassName, HashSet<ClassName>>,
}

impl InheritanceGraph {
    /// The class itself followed by each ancestor, per the Glossary's
    /// "Lineage of a class". A cycle guard protects against malformed
    /// `extends` chains (which shouldn't occur for a real forest, but the
    /// extractor doesn't verify acyclicity at construction time).
    pub fn lineage(&self, class: &str) -> Vec<ClassName> {
        let mut out = vec![class.to_string()];
        let mut seen: HashSet<&str> = HashSet::new();
        seen.insert(class);
        let mut current = class.to_string();
        while let Some(parent) = self.parents_by_child.get(&current) {
            if seen.contains(parent.as_str()) {
                break;
            }
            out.push(parent.clone());
            seen.insert(parent.as_str());
            current = parent.clone();
            // SAFETY note for the borrow checker's benefit: `seen` borrows
            // from `out`'s prior pushes via class names cloned above, not
            // from `current`, so this loop is sound despite the mutation.
        }
        out
    }

    /// Every descendant of `class` (children, grandchildren, ...), used by
    /// propagation's "descendants are equally impacted" projection rule.
    pub fn descendants(&self, class: &str) -> HashSet<ClassName> {
        let mut out = HashSet::new();
        let mut queue: Vec<ClassName> = self
            .children_by_parent
            .get(class)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default();
        while let Some(child) = queue.pop() {
            if out.insert(child.clone()) {
                if let Some(grandchildren) = self.children_by_parent.get(&child) {
                    queue.extend(grandchildren.iter().cloned());
                }
            }
        }
        out
    }
}

/// Build the graph from already-read file contents. This phase may fork
/// across files; each file is parsed independently and contributes at
/// most one `(child, parent)` pair per class it declares.
pub fn build(contents: &[(PathBuf, String)], parser: &dyn SourceAstParser) -> InheritanceGraph {
    let pairs: Vec<(ClassName, Option<ClassName>)> = contents
        .par_iter()
        .flat_map(|(_, source)| match parser.parse(source) {
            Some(ast) => class::class_nodes(ast.root())
                .into_iter()
                .filter_map(|node| {
                    let name = class::class_name(&node, &ast.source)?;
                    Some((name, class::extends_name(&node, &ast.source)))
                })
                .collect::<Vec<_>>(),
            None => Vec::new(),
        })
        .collect();

    let mut graph = InheritanceGraph::default();
    for (child, parent) in pairs {
        if let Some(parent) = parent {
            graph.parents_by_child.insert(child.clone(), parent.clone());
            graph.children_by_parent.entry(parent).or_default().insert(child);
        }
    }
    graph
}
