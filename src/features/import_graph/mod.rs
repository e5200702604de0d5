//! Component G — Import-Graph Selector.
//!
//! Builds a reverse-dependency graph over every known file — specs and
//! source files alike — from each file's resolved module references, then
//! traverses it from the changed-source seed set to find every spec
//! transitively dependent on a change.

use crate::domain::ports::SourceAstParser;
use crate::parsing::imports::{module_references, ImportSyntax};
use crate::shared::module_resolution::{ModuleResolver, PathAliases};
use rayon::prelude::*;
use std::collections::{HashMap, HashSet, VecDeque};
use std::path::PathBuf;

/// `dependency -> dependents`: the transpose of each file's resolved
/// module references.
pub type ReverseGraph = HashMap<PathBuf, HashSet<PathBuf>>;

/// Build the reverse graph. Per-file extraction is parallelized; the
/// transpose step is a cheap sequential fold over the collected edges.
pub fn build_reverse_graph(
    known_files: &HashSet<PathBuf>,
    contents: &HashMap<PathBuf, String>,
    aliases: &PathAliases,
    extensions: &[String],
    parser: &dyn SourceAstParser,
) -> ReverseGraph {
    let resolver = ModuleResolver::new(known_files, aliases, extensions);
    let edges: Vec<(PathBuf, PathBuf)> = contents
        .par_iter()
        .flat_map(|(path, source)| {
            let Some(ast) = parser.parse(source) else {
                return Vec::new();
            };
            module_references(ast.root(), source)
                .into_iter()
                .filter_map(|reference| {
                    let dep = if reference.syntax == ImportSyntax::StringLiteralAsset {
                        resolver.resolve_asset_fallback(path, &reference.specifier)
                    } else {
                        resolver.resolve(path, &reference.specifier)
                    }?;
                    Some((path.clone(), dep))
                })
                .collect::<Vec<_>>()
        })
        .collect();

    let mut reverse: ReverseGraph = HashMap::new();
    for (dependent, dependency) in edges {
        reverse.entry(dependency).or_default().insert(dependent);
    }
    reverse
}

/// Every spec reachable from `changed_sources` by following reverse edges,
/// restricted to `spec_files` and sorted. Excludes paths that are
/// themselves in `changed_sources` — those are tagged `direct-changed-spec`
/// elsewhere in the pipeline.
pub fn matched_specs(reverse: &ReverseGraph, changed_sources: &HashSet<PathBuf>, spec_files: &HashSet<PathBuf>) -> Vec<PathBuf> {
    let mut visited: HashSet<PathBuf> = HashSet::new();
    let mut queue: VecDeque<PathBuf> = changed_sources.iter().cloned().collect();
    while let Some(path) = queue.pop_front() {
        if !visited.insert(path.clone()) {
            continue;
        }
        if let Some(dependents) = reverse.get(&path) {
            for dependent in dependents {
                if !visited.contains(dependent) {
                    queue.push_back(dependent.clone());
                }
            }
        }
    }
    let mut out: Vec<PathBuf> = visited
        .into_iter()
        .filter(|p| spec_files.contains(p) && !changed_sources.contains(p))
        .collect();
    out.sort();
    out
}
