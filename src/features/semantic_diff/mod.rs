//! Component E — Semantic Change Detector.
//!
//! Computes, per changed source file, the set of class members whose
//! behavior differs between base and head, using normalized AST-subtree
//! fingerprints so formatting- and comment-only edits never register as a
//! change.

use crate::domain::model::{ChangeEntry, ClassName, MemberIdentity, MemberKind, MethodsByClass};
use crate::domain::ports::{FileContentReader, SourceAstParser};
use crate::errors::{Warning, WarningKind};
use crate::parsing::member::{members_in_class, MemberGroup};
use crate::parsing::node_kinds as k;
use crate::parsing::{class, ParsedAst};
use crate::shared::tree_sitter_util::{node_text, normalized_rendering};
use crate::shared::{Fingerprint, Revision};
use rayon::prelude::*;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use tree_sitter::Node;

#[derive(Debug, Clone, Default)]
pub struct SemanticDiffResult {
    pub changed_methods_by_class: MethodsByClass,
    pub top_level_runtime_changed_files: u64,
    pub warnings: Vec<Warning>,
}

impl SemanticDiffResult {
    /// Total `(class, member)` pairs recorded as changed, across every
    /// class — the `semantic_changed_methods_count` testable property.
    pub fn semantic_changed_methods_count(&self) -> usize {
        self.changed_methods_by_class.values().map(|set| set.len()).sum()
    }

    fn merge(mut self, other: SemanticDiffResult) -> Self {
        for (class, members) in other.changed_methods_by_class {
            self.changed_methods_by_class.entry(class).or_default().extend(members);
        }
        self.top_level_runtime_changed_files += other.top_level_runtime_changed_files;
        self.warnings.extend(other.warnings);
        self
    }
}

/// Run the detector over every changed entry within the profile filter.
/// Parallelized per-file; results merge order-independently.
pub fn detect(changed: &[ChangeEntry], reader: &dyn FileContentReader, parser: &dyn SourceAstParser) -> SemanticDiffResult {
    changed
        .par_iter()
        .map(|entry| diff_entry(entry, reader, parser))
        .reduce(SemanticDiffResult::default, SemanticDiffResult::merge)
}

fn diff_entry(entry: &ChangeEntry, reader: &dyn FileContentReader, parser: &dyn SourceAstParser) -> SemanticDiffResult {
    let path: &Path = &entry.effective_path;
    // A rename's base revision lives at `old_path`, not at the head-side
    // `effective_path` — reading the new path at `Revision::Base` would see
    // a file that doesn't exist there yet and manufacture a spurious diff.
    let base_path: &Path = entry.old_path.as_deref().unwrap_or(path);
    let base = read_text(base_path, Revision::Base, reader);
    let head = read_text(path, Revision::Head, reader);

    let (base_text, base_unreadable) = base;
    let (head_text, head_unreadable) = head;

    let mut warnings = Vec::new();
    if base_unreadable || head_unreadable {
        warnings.push(Warning::new(
            WarningKind::UnreadableFile,
            path.display().to_string(),
            "one or both revisions could not be read; file skipped".to_string(),
        ));
        return SemanticDiffResult {
            warnings,
            ..Default::default()
        };
    }

    if base_text == head_text {
        return SemanticDiffResult::default();
    }

    let base_ast = parser.parse(&base_text);
    let head_ast = parser.parse(&head_text);

    let base_classes = base_ast.as_ref().map(classes_in).unwrap_or_default();
    let head_classes = head_ast.as_ref().map(classes_in).unwrap_or_default();

    let base_runtime_fp = runtime_fingerprint(base_ast.as_ref());
    let head_runtime_fp = runtime_fingerprint(head_ast.as_ref());

    let mut changed_methods_by_class: MethodsByClass = HashMap::new();
    let mut top_level_runtime_changed_files = 0u64;

    if base_runtime_fp != head_runtime_fp {
        top_level_runtime_changed_files = 1;
        for (class, members) in base_classes.iter().chain(head_classes.iter()) {
            let callables = callable_names(members);
            changed_methods_by_class.entry(class.clone()).or_default().extend(callables);
        }
    }

    let class_names: HashSet<&ClassName> = base_classes.keys().chain(head_classes.keys()).collect();
    for class in class_names {
        let base_members = base_classes.get(class);
        let head_members = head_classes.get(class);
        let identities: HashSet<&MemberIdentity> = base_members
            .map(|m| m.keys())
            .into_iter()
            .flatten()
            .chain(head_members.map(|m| m.keys()).into_iter().flatten())
            .collect();

        for identity in identities {
            let base_fp = base_members.and_then(|m| m.get(identity)).and_then(|g| member_fingerprint(g, &base_text));
            let head_fp = head_members.and_then(|m| m.get(identity)).and_then(|g| member_fingerprint(g, &head_text));
            if base_fp == head_fp {
                continue;
            }
            if identity.kind.is_callable() {
                changed_methods_by_class.entry(class.clone()).or_default().insert(identity.name.clone());
            } else {
                let mut callables = HashSet::new();
                if let Some(members) = base_members {
                    callables.extend(callable_names(members));
                }
                if let Some(members) = head_members {
                    callables.extend(callable_names(members));
                }
                changed_methods_by_class.entry(class.clone()).or_default().extend(callables);
            }
        }
    }

    SemanticDiffResult {
        changed_methods_by_class,
        top_level_runtime_changed_files,
        warnings,
    }
}

fn read_text(path: &Path, revision: Revision, reader: &dyn FileContentReader) -> (String, bool) {
    match reader.read(path, revision) {
        Ok(Some(bytes)) => (String::from_utf8_lossy(&bytes).into_owned(), false),
        Ok(None) => (String::new(), false),
        Err(_) => (String::new(), true),
    }
}

fn classes_in(ast: &ParsedAst) -> HashMap<ClassName, HashMap<MemberIdentity, MemberGroup<'_>>> {
    let mut out = HashMap::new();
    for class_node in class::class_nodes(ast.root()) {
        let Some(name) = class::class_name(&class_node, &ast.source) else {
            continue;
        };
        let Some(body) = class::class_body(&class_node) else {
            continue;
        };
        out.insert(name, members_in_class(body, &ast.source));
    }
    out
}

fn callable_names(members: &HashMap<MemberIdentity, MemberGroup<'_>>) -> HashSet<String> {
    members
        .keys()
        .filter(|identity| identity.kind.is_callable())
        .map(|identity| identity.name.clone())
        .collect()
}

fn member_fingerprint(group: &MemberGroup<'_>, source: &str) -> Option<Fingerprint> {
    if group.overload_nodes.is_empty() && group.implementation_node.is_none() {
        return None;
    }
    let mut parts: Vec<String> = group.overload_nodes.iter().map(|n| normalized_rendering(n, source)).collect();
    parts.sort();
    if let Some(body) = &group.implementation_node {
        parts.push(normalized_rendering(body, source));
    }
    Some(Fingerprint::of_raw(&parts.join("|")))
}

/// A *runtime* top-level statement excludes type-only imports/exports,
/// interface and type-alias declarations, and class declarations — class
/// bodies are diffed member-by-member above instead, to avoid a file-wide
/// change from a single-method edit.
fn runtime_fingerprint(ast: Option<&ParsedAst>) -> Fingerprint {
    let Some(ast) = ast else {
        return Fingerprint::of_raw("");
    };
    let mut cursor = ast.root().walk();
    let mut rendered = String::new();
    for child in ast.root().children(&mut cursor) {
        if is_runtime_top_level(&child, &ast.source) {
            rendered.push_str(&normalized_rendering(&child, &ast.source));
            rendered.push(' ');
        }
    }
    Fingerprint::of_raw(&rendered)
}

fn is_runtime_top_level(node: &Node, source: &str) -> bool {
    match node.kind() {
        k::CLASS_DECLARATION | k::INTERFACE_DECLARATION | k::TYPE_ALIAS_DECLARATION => false,
        k::IMPORT_STATEMENT => !node_text(node, source).trim_start().starts_with("import type"),
        k::EXPORT_STATEMENT => {
            if node_text(node, source).trim_start().starts_with("export type") {
                return false;
            }
            let mut cursor = node.walk();
            !node
                .children(&mut cursor)
                .any(|c| matches!(c.kind(), k::CLASS_DECLARATION | k::INTERFACE_DECLARATION | k::TYPE_ALIAS_DECLARATION))
        }
        _ => true,
    }
}
