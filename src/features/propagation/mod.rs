//! Component F — Impact Propagation Engine.
//!
//! Builds a class-scoped call graph from the analysis roots — direct edges
//! for `this`/`super`/composed-field calls, conservative fan-out edges for
//! dynamic dispatch and deep chains — then seeds a reverse-edge BFS from the
//! Semantic Change Detector's output and projects the visited member keys
//! back onto classes via composition-owner and descendant closure.

use crate::domain::model::{ClassName, MemberKey, MemberName, MethodsByClass};
use crate::domain::ports::SourceAstParser;
use crate::errors::{Warning, WarningKind};
use crate::features::inheritance::InheritanceGraph;
use crate::parsing::calls::{call_sites, CallShape};
use crate::parsing::composition::composed_field_class_by_name;
use crate::parsing::member::members_in_class;
use crate::parsing::class;
use rayon::prelude::*;
use std::collections::{HashMap, HashSet, VecDeque};
use std::path::PathBuf;

/// The class-scoped call graph and composition maps built once from the
/// analysis roots.
#[derive(Debug, Clone, Default)]
pub struct PropagationGraph {
    pub callable_member_key_by_class_and_name: HashMap<ClassName, HashMap<MemberName, MemberKey>>,
    pub composed_field_class_by_name_by_class: HashMap<ClassName, HashMap<String, ClassName>>,
    pub composed_class_to_owner_classes: HashMap<ClassName, HashSet<ClassName>>,
    pub direct_edges: HashMap<MemberKey, HashSet<MemberKey>>,
    reverse_edges: HashMap<MemberKey, HashSet<MemberKey>>,
}

struct RawCallSite {
    caller_class: ClassName,
    caller_member: MemberName,
    shape: CallShape,
}

#[derive(Default)]
struct FileExtraction {
    callables: Vec<(ClassName, MemberName, MemberKey)>,
    composed_fields: Vec<(ClassName, String, ClassName)>,
    call_sites: Vec<RawCallSite>,
}

fn extract_file(source: &str, parser: &dyn SourceAstParser) -> FileExtraction {
    let mut out = FileExtraction::default();
    let Some(ast) = parser.parse(source) else {
        return out;
    };
    for class_node in class::class_nodes(ast.root()) {
        let Some(class_name) = class::class_name(&class_node, &ast.source) else {
            continue;
        };
        let Some(body) = class::class_body(&class_node) else {
            continue;
        };
        for (field, composed_class) in composed_field_class_by_name(body, &ast.source) {
            out.composed_fields.push((class_name.clone(), field, composed_class));
        }
        for (identity, group) in members_in_class(body, &ast.source) {
            if !identity.kind.is_callable() {
                continue;
            }
            let key = MemberKey::new(&class_name, &identity.name);
            out.callables.push((class_name.clone(), identity.name.clone(), key));
            if let Some(impl_node) = group.implementation_node {
                for site in call_sites(impl_node, &ast.source) {
                    out.call_sites.push(RawCallSite {
                        caller_class: class_name.clone(),
                        caller_member: identity.name.clone(),
                        shape: site.shape,
                    });
                }
            }
        }
    }
    out
}

/// Build the graph. Per-file extraction (`extract_file`) is parallelized;
/// edge resolution runs sequentially afterward since it reads the
/// merged global maps.
pub fn build(contents: &[(PathBuf, String)], inheritance: &InheritanceGraph, parser: &dyn SourceAstParser) -> (PropagationGraph, Vec<Warning>) {
    let extractions: Vec<FileExtraction> = contents.par_iter().map(|(_, source)| extract_file(source, parser)).collect();

    let mut graph = PropagationGraph::default();
    for ext in &extractions {
        for (class, name, key) in &ext.callables {
            graph
                .callable_member_key_by_class_and_name
                .entry(class.clone())
                .or_default()
                .insert(name.clone(), key.clone());
        }
        for (class, field, composed_class) in &ext.composed_fields {
            graph
                .composed_field_class_by_name_by_class
                .entry(class.clone())
                .or_default()
                .insert(field.clone(), composed_class.clone());
            graph
                .composed_class_to_owner_classes
                .entry(composed_class.clone())
                .or_default()
                .insert(class.clone());
        }
    }

    let mut warnings = Vec::new();
    for ext in &extractions {
        for site in &ext.call_sites {
            resolve_call_site(site, inheritance, &mut graph, &mut warnings);
        }
    }

    graph.reverse_edges = transpose(&graph.direct_edges);
    (graph, warnings)
}

fn resolve_call_site(site: &RawCallSite, inheritance: &InheritanceGraph, graph: &mut PropagationGraph, warnings: &mut Vec<Warning>) {
    let caller_key = MemberKey::new(&site.caller_class, &site.caller_member);
    match &site.shape {
        CallShape::ThisDirect { name } => match resolve_in_lineage(&site.caller_class, name, inheritance, &graph.callable_member_key_by_class_and_name) {
            Some(target) => add_edge(graph, caller_key, target),
            None => warnings.push(Warning::new(
                WarningKind::UnresolvedReference,
                caller_key.to_string(),
                format!("this.{name}(...) did not resolve in lineage"),
            )),
        },
        CallShape::SuperCall { name } => {
            let Some(parent) = inheritance.parents_by_child.get(&site.caller_class).cloned() else {
                warnings.push(Warning::new(
                    WarningKind::UnresolvedReference,
                    caller_key.to_string(),
                    format!("super.{name}(...) has no parent class"),
                ));
                return;
            };
            match resolve_in_lineage(&parent, name, inheritance, &graph.callable_member_key_by_class_and_name) {
                Some(target) => add_edge(graph, caller_key, target),
                None => warnings.push(Warning::new(
                    WarningKind::UnresolvedReference,
                    caller_key.to_string(),
                    format!("super.{name}(...) did not resolve in lineage"),
                )),
            }
        }
        CallShape::ThisField { field, name } => {
            match resolve_field_class_in_lineage(&site.caller_class, field, inheritance, &graph.composed_field_class_by_name_by_class) {
                Some(field_class) => match resolve_in_lineage(&field_class, name, inheritance, &graph.callable_member_key_by_class_and_name) {
                    Some(target) => add_edge(graph, caller_key, target),
                    None => warnings.push(Warning::new(
                        WarningKind::UnresolvedReference,
                        caller_key.to_string(),
                        format!("this.{field}.{name}(...) did not resolve on {field_class}"),
                    )),
                },
                None => warnings.push(Warning::new(
                    WarningKind::UnknownComposedFieldType,
                    caller_key.to_string(),
                    format!("composed field '{field}' has no known type"),
                )),
            }
        }
        CallShape::ThisDeepChain => {
            warnings.push(Warning::new(
                WarningKind::DeepChain,
                caller_key.to_string(),
                "this.*.* chain of depth >= 2; every callable of the caller's class is a potential callee".into(),
            ));
            fan_out_to_own_class(graph, &caller_key, &site.caller_class);
        }
        CallShape::ThisDynamicIndex => {
            warnings.push(Warning::new(
                WarningKind::DynamicDispatch,
                caller_key.to_string(),
                "this[<non-literal>](...); every callable of the caller's class is a potential callee".into(),
            ));
            fan_out_to_own_class(graph, &caller_key, &site.caller_class);
        }
    }
}

fn fan_out_to_own_class(graph: &mut PropagationGraph, caller_key: &MemberKey, class: &str) {
    let targets: Vec<MemberKey> = graph
        .callable_member_key_by_class_and_name
        .get(class)
        .map(|m| m.values().cloned().collect())
        .unwrap_or_default();
    for target in targets {
        add_edge(graph, caller_key.clone(), target);
    }
}

fn add_edge(graph: &mut PropagationGraph, from: MemberKey, to: MemberKey) {
    graph.direct_edges.entry(from).or_default().insert(to);
}

fn resolve_in_lineage(
    start_class: &str,
    name: &str,
    inheritance: &InheritanceGraph,
    callable_map: &HashMap<ClassName, HashMap<MemberName, MemberKey>>,
) -> Option<MemberKey> {
    inheritance
        .lineage(start_class)
        .into_iter()
        .find_map(|class| callable_map.get(&class).and_then(|m| m.get(name)).cloned())
}

fn resolve_field_class_in_lineage(
    start_class: &str,
    field: &str,
    inheritance: &InheritanceGraph,
    composed_map: &HashMap<ClassName, HashMap<String, ClassName>>,
) -> Option<ClassName> {
    inheritance
        .lineage(start_class)
        .into_iter()
        .find_map(|class| composed_map.get(&class).and_then(|m| m.get(field)).cloned())
}

fn transpose(direct: &HashMap<MemberKey, HashSet<MemberKey>>) -> HashMap<MemberKey, HashSet<MemberKey>> {
    let mut reverse: HashMap<MemberKey, HashSet<MemberKey>> = HashMap::new();
    for (from, tos) in direct {
        for to in tos {
            reverse.entry(to.clone()).or_default().insert(from.clone());
        }
    }
    reverse
}

/// Propagation output: `impacted_methods_by_class` and
/// `impacted_classes`.
#[derive(Debug, Clone, Default)]
pub struct PropagationResult {
    pub impacted_methods_by_class: MethodsByClass,
    pub impacted_classes: HashSet<ClassName>,
}

/// Seed from `changed`, BFS over reverse edges, then project back to
/// classes.
pub fn propagate(graph: &PropagationGraph, inheritance: &InheritanceGraph, changed: &MethodsByClass) -> PropagationResult {
    let mut queue: VecDeque<MemberKey> = VecDeque::new();
    let mut visited: HashSet<MemberKey> = HashSet::new();
    let mut seed_classes: HashSet<ClassName> = HashSet::new();

    for (class, members) in changed {
        seed_classes.insert(class.clone());
        for name in members {
            if let Some(key) = resolve_in_lineage(class, name, inheritance, &graph.callable_member_key_by_class_and_name) {
                if visited.insert(key.clone()) {
                    queue.push_back(key);
                }
            }
        }
    }

    while let Some(current) = queue.pop_front() {
        if let Some(callers) = graph.reverse_edges.get(&current) {
            for caller in callers {
                if visited.insert(caller.clone()) {
                    queue.push_back(caller.clone());
                }
            }
        }
    }

    let mut all_names: HashSet<MemberName> = visited.iter().map(|k| k.member().to_string()).collect();
    for members in changed.values() {
        all_names.extend(members.iter().cloned());
    }

    let mut impacted_classes: HashSet<ClassName> = visited.iter().map(|k| k.class().to_string()).collect();
    impacted_classes.extend(seed_classes);

    loop {
        let mut added = false;
        let snapshot: Vec<ClassName> = impacted_classes.iter().cloned().collect();
        for class in &snapshot {
            if let Some(owners) = graph.composed_class_to_owner_classes.get(class) {
                for owner in owners {
                    added |= impacted_classes.insert(owner.clone());
                }
            }
            for descendant in inheritance.descendants(class) {
                added |= impacted_classes.insert(descendant);
            }
        }
        if !added {
            break;
        }
    }

    let mut impacted_methods_by_class: MethodsByClass = HashMap::new();
    for class in &impacted_classes {
        for name in &all_names {
            if member_satisfies(class, name, inheritance, graph, changed, &visited) {
                impacted_methods_by_class.entry(class.clone()).or_default().insert(name.clone());
            }
        }
    }

    PropagationResult {
        impacted_methods_by_class,
        impacted_classes,
    }
}

fn member_satisfies(
    class: &str,
    name: &str,
    inheritance: &InheritanceGraph,
    graph: &PropagationGraph,
    changed: &MethodsByClass,
    visited: &HashSet<MemberKey>,
) -> bool {
    if resolves_to_visited(class, name, inheritance, graph, visited) {
        return true;
    }
    if changed_without_resolution(class, name, inheritance, graph, changed) {
        return true;
    }
    for ancestor in inheritance.lineage(class) {
        let Some(fields) = graph.composed_field_class_by_name_by_class.get(&ancestor) else {
            continue;
        };
        for field_class in fields.values() {
            if resolves_to_visited(field_class, name, inheritance, graph, visited)
                || changed_without_resolution(field_class, name, inheritance, graph, changed)
            {
                return true;
            }
        }
    }
    false
}

fn resolves_to_visited(class: &str, name: &str, inheritance: &InheritanceGraph, graph: &PropagationGraph, visited: &HashSet<MemberKey>) -> bool {
    resolve_in_lineage(class, name, inheritance, &graph.callable_member_key_by_class_and_name)
        .map(|key| visited.contains(&key))
        .unwrap_or(false)
}

/// The name was directly changed somewhere in `class`'s lineage but there is
/// no resolvable callable key for it (the member was removed or renamed).
fn changed_without_resolution(class: &str, name: &str, inheritance: &InheritanceGraph, graph: &PropagationGraph, changed: &MethodsByClass) -> bool {
    if resolve_in_lineage(class, name, inheritance, &graph.callable_member_key_by_class_and_name).is_some() {
        return false;
    }
    inheritance
        .lineage(class)
        .iter()
        .any(|c| changed.get(c).map(|set| set.contains(name)).unwrap_or(false))
}
