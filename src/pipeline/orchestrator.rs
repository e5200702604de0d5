//! Synchronous pipeline wiring for the nine components.
//!
//! ```text
//! A (normalize) -> B (global watch, may short-circuit)
//!   -> C + D (rayon::join)
//!   -> E (semantic diff)
//!   -> F (propagation)
//!   -> G + H-Stage-A (rayon::join)
//!   -> H-Stage-B
//!   -> I (assemble)
//! ```

use crate::domain::config::EngineConfig;
use crate::domain::model::{ChangeSource, RawChangeEntry};
use crate::domain::ports::{ChangeSetSource, DirectoryLister, FileContentReader, SourceAstParser};
use crate::errors::{EngineError, EngineResult, Warning, WarningKind};
use crate::features::assembler::{self, ChangeSourceBreakdown, CoverageStats, SelectionReport, SizeStats, StatusCounts};
use crate::features::{change_set, fixture_map, global_watch, import_graph, inheritance, propagation, spec_selection};
use crate::features::semantic_diff;
use crate::shared::ast_cache::{AstCache, CachingAstParser};
use crate::shared::module_resolution::{parse_path_aliases, PathAliases};
use crate::shared::Revision;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

/// Run the full pipeline. This is the only function `lib.rs`'s `analyze`
/// entry point calls.
pub fn run(
    config: &EngineConfig,
    change_source: &dyn ChangeSetSource,
    file_reader: &dyn FileContentReader,
    dir_lister: &dyn DirectoryLister,
    parser: &dyn SourceAstParser,
) -> EngineResult<SelectionReport> {
    config.validate()?;
    tracing::info!(repo_root = %config.repo_root.display(), "pom-impact-core: starting analysis");

    let extensions = config.normalized_extensions();

    // --- Component A: gather + normalize ---------------------------------
    let (raw_entries, change_source_breakdown) = gather_raw_entries(config, change_source)?;
    let (changed, mut warnings) = change_set::normalize(raw_entries, &config.profile.is_relevant_pom_path);
    let status_counts = StatusCounts::from_entries(&changed);
    tracing::debug!(changed = changed.len(), "change set normalized");

    // --- File-tree discovery ----------------------------------------------
    let tests_root_abs = config.repo_root.join(&config.profile.tests_root_relative);
    let spec_files = list_relative(dir_lister, &config.repo_root, &tests_root_abs)?
        .into_iter()
        .filter(|p| is_spec_file(p, &extensions))
        .collect::<HashSet<PathBuf>>();

    let mut source_files: HashSet<PathBuf> = HashSet::new();
    for root in &config.profile.analysis_roots_relative {
        let abs = config.repo_root.join(root);
        for path in list_relative(dir_lister, &config.repo_root, &abs)? {
            if has_extension(&path, &extensions) {
                source_files.insert(path);
            }
        }
    }

    let known_files: HashSet<PathBuf> = spec_files.union(&source_files).cloned().collect();

    // --- Content loading ----------------------------------------------------
    let (contents, spec_read_errors) = load_contents(&known_files, &spec_files, file_reader, &mut warnings);
    let source_contents: Vec<(PathBuf, String)> = source_files
        .iter()
        .filter_map(|p| contents.get(p).map(|c| (p.clone(), c.clone())))
        .collect();
    let spec_contents: HashMap<PathBuf, String> = spec_files
        .iter()
        .filter_map(|p| contents.get(p).map(|c| (p.clone(), c.clone())))
        .collect();

    let aliases = load_path_aliases(config, file_reader);

    // The Global-Watch closure walk and the Import-Graph Selector both parse
    // every known file's module references independently; a shared cache
    // keyed by content hash means a file touched by both only parses once.
    let ast_cache = AstCache::new();
    let cached_parser = CachingAstParser::new(parser, &ast_cache);

    // --- Component B: global watch ------------------------------------------
    let watch = global_watch::evaluate(
        config.profile.global_watch_mode,
        &config.profile.global_watch_patterns,
        &changed,
        &known_files,
        &contents,
        &aliases,
        &extensions,
        &cached_parser,
    );

    if watch.force_all {
        tracing::warn!(matched = watch.matched_patterns.len(), "global-watch force-all triggered; skipping remaining stages");
        let mut all_specs: Vec<PathBuf> = spec_files.into_iter().collect();
        all_specs.sort();
        return Ok(assembler::assemble_forced_all(
            &config.repo_root,
            &all_specs,
            status_counts,
            change_source_breakdown,
            watch.matched_patterns,
            warnings,
        ));
    }

    // --- Components C + D, independent ---------------------------------------
    let fixture_ast = read_fixture_source(config, file_reader).and_then(|src| parser.parse(&src));
    let (fixture_map, inheritance_graph) = rayon::join(
        || fixture_ast.as_ref().map(fixture_map::build).unwrap_or_else(fixture_map::empty),
        || inheritance::build(&source_contents, parser),
    );

    // --- Component E: semantic diff -------------------------------------------
    let diff = semantic_diff::detect(&changed, file_reader, parser);
    warnings.extend(diff.warnings.clone());
    tracing::debug!(
        changed_methods = diff.semantic_changed_methods_count(),
        top_level_changed_files = diff.top_level_runtime_changed_files,
        "semantic diff complete"
    );

    // --- Component F: propagation -----------------------------------------------
    let (propagation_graph, propagation_warnings) = propagation::build(&source_contents, &inheritance_graph, parser);
    warnings.extend(propagation_warnings);
    let propagation_result = propagation::propagate(&propagation_graph, &inheritance_graph, &diff.changed_methods_by_class);

    let impacted_fixture_keys = fixture_map::fixture_keys_for_classes(&fixture_map, &propagation_result.impacted_classes);

    let changed_sources: HashSet<PathBuf> = changed.iter().map(|e| e.effective_path.clone()).filter(|p| !spec_files.contains(p)).collect();

    let directly_changed_specs: HashSet<PathBuf> = changed
        .iter()
        .map(|e| e.effective_path.clone())
        .filter(|p| spec_files.contains(p))
        .collect();

    // --- Component G + H Stage A, independent -------------------------------------
    let spec_files_vec: Vec<PathBuf> = spec_files.iter().cloned().collect();

    let (import_matched_vec, stage_a_survivors) = rayon::join(
        || {
            let reverse = import_graph::build_reverse_graph(&known_files, &contents, &aliases, &extensions, &cached_parser);
            import_graph::matched_specs(&reverse, &changed_sources, &spec_files)
        },
        || spec_selection::stage_a_prefilter(&spec_files_vec, &spec_contents, &impacted_fixture_keys, parser),
    );
    let import_matched: HashSet<PathBuf> = import_matched_vec.into_iter().collect();
    let stage_a_survivor_count = stage_a_survivors.len();

    // --- Component H Stage B + merge ----------------------------------------------
    let candidates: HashSet<PathBuf> = stage_a_survivors
        .union(&directly_changed_specs)
        .cloned()
        .collect::<HashSet<PathBuf>>()
        .union(&import_matched)
        .cloned()
        .collect();

    let selection = spec_selection::stage_b_and_merge(
        &candidates,
        &spec_contents,
        &spec_read_errors,
        &directly_changed_specs,
        &import_matched,
        &fixture_map,
        &propagation_result.impacted_methods_by_class,
        config.selection_bias,
        parser,
        stage_a_survivor_count,
    );
    warnings.extend(selection.warnings.clone());

    // --- Component I: assemble -----------------------------------------------------
    let status_fallbacks = warnings.iter().filter(|w| w.kind == WarningKind::StatusFallback).count() as u64;
    let size_stats = SizeStats {
        changed_files: changed.len(),
        semantic_changed_methods_count: diff.semantic_changed_methods_count(),
        impacted_classes: propagation_result.impacted_classes.len(),
        impacted_methods: propagation_result.impacted_methods_by_class.values().map(|m| m.len()).sum(),
        fixture_keys: impacted_fixture_keys.len(),
        stage_a_survivors: selection.stage_a_survivors,
    };
    let coverage_stats = CoverageStats {
        uncertain_call_sites: selection.uncertain_call_sites,
        status_fallbacks,
    };

    Ok(assembler::assemble(
        &config.repo_root,
        selection.selected,
        status_counts,
        change_source_breakdown,
        size_stats,
        coverage_stats,
        diff.top_level_runtime_changed_files,
        warnings,
    ))
}

/// Calls the three `ChangeSetSource` methods according to config (base-vs-head
/// only when a base ref is set, working-tree-vs-head unless suppressed,
/// untracked files unless disabled), tagging each batch with its
/// `ChangeSource` for the breakdown in the assembled report.
fn gather_raw_entries(config: &EngineConfig, change_source: &dyn ChangeSetSource) -> EngineResult<(Vec<RawChangeEntry>, ChangeSourceBreakdown)> {
    let mut raw = Vec::new();
    let mut breakdown = ChangeSourceBreakdown::default();

    if let Some(base_ref) = &config.base_ref {
        let entries = change_source.base_vs_head(base_ref).map_err(EngineError::SourceEnumeration)?;
        breakdown.base_vs_head = entries.len();
        raw.extend(change_set::tag_source(entries, ChangeSource::BaseVsHead));
    }

    let run_working_tree = config.base_ref.is_none() || config.include_working_tree_with_base;
    if run_working_tree {
        let entries = change_source.working_tree_vs_head().map_err(EngineError::SourceEnumeration)?;
        breakdown.working_tree_vs_head = entries.len();
        raw.extend(change_set::tag_source(entries, ChangeSource::WorkingTreeVsHead));
    }

    if config.include_untracked_specs {
        let paths = change_source.untracked().map_err(EngineError::SourceEnumeration)?;
        breakdown.untracked = paths.len();
        let entries: Vec<RawChangeEntry> = paths
            .into_iter()
            .map(|path| RawChangeEntry {
                status: "A".to_string(),
                old_path: None,
                new_path: Some(path),
                source: ChangeSource::Untracked,
            })
            .collect();
        raw.extend(entries);
    }

    Ok((raw, breakdown))
}

fn list_relative(dir_lister: &dyn DirectoryLister, repo_root: &Path, abs_root: &Path) -> EngineResult<Vec<PathBuf>> {
    let listed = dir_lister
        .list_recursive(abs_root)
        .map_err(|e| EngineError::SourceEnumeration(format!("failed to list {}: {e}", abs_root.display())))?;
    Ok(listed.into_iter().filter_map(|p| p.strip_prefix(repo_root).ok().map(|p| p.to_path_buf())).collect())
}

fn is_spec_file(path: &Path, extensions: &[String]) -> bool {
    has_extension(path, extensions) && path.to_string_lossy().to_lowercase().contains(".spec.")
}

fn has_extension(path: &Path, extensions: &[String]) -> bool {
    let name = path.to_string_lossy().to_lowercase();
    extensions.iter().any(|ext| name.ends_with(ext.as_str()))
}

/// Read every known file at the head revision. Unreadable spec files are
/// tracked separately so Stage B can retain them with reason
/// `retained-read-error`; unreadable source files only
/// contribute a warning, since dropping a non-spec file from the graphs is
/// the conservative behavior already baked into the graph builders (it
/// simply never contributes edges).
fn load_contents(
    known_files: &HashSet<PathBuf>,
    spec_files: &HashSet<PathBuf>,
    file_reader: &dyn FileContentReader,
    warnings: &mut Vec<Warning>,
) -> (HashMap<PathBuf, String>, HashSet<PathBuf>) {
    let mut contents = HashMap::new();
    let mut spec_read_errors = HashSet::new();

    for path in known_files {
        match file_reader.read(path, Revision::Head) {
            Ok(Some(bytes)) => {
                contents.insert(path.clone(), String::from_utf8_lossy(&bytes).into_owned());
            }
            Ok(None) => {
                if spec_files.contains(path) {
                    spec_read_errors.insert(path.clone());
                }
            }
            Err(_) => {
                warnings.push(Warning::new(WarningKind::UnreadableFile, path.display().to_string(), "failed to read file content".to_string()));
                if spec_files.contains(path) {
                    spec_read_errors.insert(path.clone());
                }
            }
        }
    }

    (contents, spec_read_errors)
}

/// Missing or unreadable yields `None`, which callers treat as "no fixture
/// map".
fn read_fixture_source(config: &EngineConfig, file_reader: &dyn FileContentReader) -> Option<String> {
    let path = PathBuf::from(&config.profile.fixtures_types_relative);
    match file_reader.read(&path, Revision::Head) {
        Ok(Some(bytes)) => Some(String::from_utf8_lossy(&bytes).into_owned()),
        _ => None,
    }
}

fn load_path_aliases(config: &EngineConfig, file_reader: &dyn FileContentReader) -> PathAliases {
    let tsconfig_path = PathBuf::from(&config.profile.tsconfig_relative);
    match file_reader.read(&tsconfig_path, Revision::Head) {
        Ok(Some(bytes)) => parse_path_aliases(&String::from_utf8_lossy(&bytes)),
        _ => PathAliases::default(),
    }
}
