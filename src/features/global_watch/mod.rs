//! Component B — Global-Watch Evaluator.
//!
//! Matches the change set against configured "force-all" glob patterns and
//! expands the matched files through their transitive import closure; if
//! either set intersects the change set, every spec under the tests root
//! should run and the rest of the pipeline is bypassed.

use crate::domain::config::GlobalWatchMode;
use crate::domain::model::ChangeEntry;
use crate::domain::ports::SourceAstParser;
use crate::parsing::imports::{module_references, ImportSyntax};
use crate::shared::module_resolution::{ModuleResolver, PathAliases};
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use std::collections::{HashMap, HashSet, VecDeque};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default)]
pub struct GlobalWatchResult {
    pub force_all: bool,
    /// Sorted paths that matched a pattern directly, for the "global-watch
    /// summary" in the assembled report.
    pub matched_patterns: Vec<PathBuf>,
}

fn build_globset(patterns: &[String]) -> GlobSet {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        // `literal_separator(true)` keeps `*` within one path segment while
        // letting `**` cross segments.
        if let Ok(glob) = GlobBuilder::new(pattern).literal_separator(true).build() {
            builder.add(glob);
        }
    }
    builder.build().unwrap_or_else(|_| GlobSetBuilder::new().build().expect("empty globset always builds"))
}

fn normalize_for_glob(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

fn is_traversable_source(path: &Path, extensions: &[String]) -> bool {
    let name = path.to_string_lossy().to_lowercase();
    extensions.iter().any(|ext| name.ends_with(ext.as_str()))
}

/// Evaluate global-watch for this invocation. `known_files`/`contents` cover
/// every in-repo source file under the analysis roots (plus whatever asset
/// files the caller chose to include), keyed by repo-relative path.
pub fn evaluate(
    mode: GlobalWatchMode,
    patterns: &[String],
    changed: &[ChangeEntry],
    known_files: &HashSet<PathBuf>,
    contents: &HashMap<PathBuf, String>,
    aliases: &PathAliases,
    extensions: &[String],
    parser: &dyn SourceAstParser,
) -> GlobalWatchResult {
    if mode == GlobalWatchMode::Disabled {
        return GlobalWatchResult::default();
    }

    let globset = build_globset(patterns);
    let changed_paths: HashSet<PathBuf> = changed.iter().map(|e| e.effective_path.clone()).collect();

    // Patterns are evaluated against the full file universe, not just the
    // change set: an unchanged watched file (e.g. a `src/fixtures/**` file)
    // whose transitive imports reach a changed file must still force-all. A
    // changed file is trivially part of that universe even if it hasn't been
    // otherwise recorded as "known" (e.g. a newly added file).
    let mut pattern_matched: Vec<PathBuf> = known_files
        .iter()
        .chain(changed_paths.iter())
        .filter(|p| globset.is_match(normalize_for_glob(p)))
        .cloned()
        .collect();
    pattern_matched.sort();
    pattern_matched.dedup();

    let mut direct_matches: Vec<PathBuf> = changed_paths
        .iter()
        .filter(|p| globset.is_match(normalize_for_glob(p)))
        .cloned()
        .collect();
    direct_matches.sort();

    if pattern_matched.is_empty() {
        return GlobalWatchResult::default();
    }

    let resolver = ModuleResolver::new(known_files, aliases, extensions);
    let mut closure: HashSet<PathBuf> = HashSet::new();
    let mut queue: VecDeque<PathBuf> = pattern_matched.iter().cloned().collect();

    while let Some(path) = queue.pop_front() {
        if !closure.insert(path.clone()) {
            continue;
        }
        if !is_traversable_source(&path, extensions) {
            continue;
        }
        let Some(source) = contents.get(&path) else {
            continue;
        };
        let Some(ast) = parser.parse(source) else {
            continue;
        };
        for reference in module_references(ast.root(), source) {
            let resolved = if reference.syntax == ImportSyntax::StringLiteralAsset {
                resolver.resolve_asset_fallback(&path, &reference.specifier)
            } else {
                resolver.resolve(&path, &reference.specifier)
            };
            if let Some(dep) = resolved {
                if !closure.contains(&dep) {
                    queue.push_back(dep);
                }
            }
        }
    }

    // Force-all if either set intersects the change set: the pattern match
    // set directly (`direct_matches`, already `⊆ changed_paths`) or the
    // transitive import closure rooted at every pattern-matched file.
    GlobalWatchResult {
        force_all: !direct_matches.is_empty() || closure.iter().any(|p| changed_paths.contains(p)),
        matched_patterns: direct_matches,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{ChangeSource, ChangeStatus};
    use crate::domain::ports::SourceAstParser;
    use crate::parsing::TreeSitterTsParser;

    fn entry(path: &str) -> ChangeEntry {
        ChangeEntry {
            status: ChangeStatus::Modified,
            old_path: None,
            new_path: Some(PathBuf::from(path)),
            effective_path: PathBuf::from(path),
            raw_status: "M".into(),
        }
    }

    #[test]
    fn disabled_mode_never_forces_all() {
        let result = evaluate(
            GlobalWatchMode::Disabled,
            &["playwright.*.config.*".to_string()],
            &[entry("playwright.base.config.ts")],
            &HashSet::new(),
            &HashMap::new(),
            &PathAliases::default(),
            &[".ts".to_string()],
            &TreeSitterTsParser::new(),
        );
        assert!(!result.force_all);
    }

    #[test]
    fn direct_pattern_match_forces_all() {
        let result = evaluate(
            GlobalWatchMode::ForceAllInProject,
            &["src/fixtures/**".to_string()],
            &[entry("src/fixtures/types.ts")],
            &HashSet::new(),
            &HashMap::new(),
            &PathAliases::default(),
            &[".ts".to_string()],
            &TreeSitterTsParser::new(),
        );
        assert!(result.force_all);
        assert_eq!(result.matched_patterns, vec![PathBuf::from("src/fixtures/types.ts")]);
    }

    #[test]
    fn single_segment_star_does_not_cross_directories() {
        let result = evaluate(
            GlobalWatchMode::ForceAllInProject,
            &["playwright.*.config.ts".to_string()],
            &[entry("nested/playwright.base.config.ts")],
            &HashSet::new(),
            &HashMap::new(),
            &PathAliases::default(),
            &[".ts".to_string()],
            &TreeSitterTsParser::new(),
        );
        assert!(!result.force_all);
    }

    #[test]
    fn import_closure_reaches_a_different_changed_file() {
        // `src/config.ts` matches the pattern but is itself unchanged; only
        // its transitive import closure reaches the changed file. This is
        // the only path to `force_all` here, so it actually exercises the
        // closure walk rather than the direct-match shortcut.
        let known: HashSet<PathBuf> = [PathBuf::from("src/config.ts"), PathBuf::from("src/pages/my_page.ts")].into_iter().collect();
        let mut contents = HashMap::new();
        contents.insert(PathBuf::from("src/config.ts"), "import './pages/my_page';".to_string());

        let result = evaluate(
            GlobalWatchMode::ForceAllInProject,
            &["src/config.ts".to_string()],
            &[entry("src/pages/my_page.ts")],
            &known,
            &contents,
            &PathAliases::default(),
            &[".ts".to_string()],
            &TreeSitterTsParser::new(),
        );
        assert!(result.force_all);
    }

    #[test]
    fn unmatched_changes_do_not_force_all() {
        let result = evaluate(
            GlobalWatchMode::ForceAllInProject,
            &["src/fixtures/**".to_string()],
            &[entry("src/pages/my_page.ts")],
            &HashSet::new(),
            &HashMap::new(),
            &PathAliases::default(),
            &[".ts".to_string()],
            &TreeSitterTsParser::new(),
        );
        assert!(!result.force_all);
        assert!(result.matched_patterns.is_empty());
    }
}
