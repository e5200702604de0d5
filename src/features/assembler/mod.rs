//! Component I — Result Assembler.
//!
//! Aggregates every intermediate component's output into one deterministic,
//! sorted `SelectionReport`. Never reasons about impact itself — it only
//! counts, sorts, and labels what upstream components already decided.

use crate::domain::model::{ChangeEntry, ChangeStatus, SelectionReason};
use crate::errors::Warning;
use crate::features::spec_selection::SelectedSpec;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusCounts {
    pub added: usize,
    pub modified: usize,
    pub deleted: usize,
    pub renamed: usize,
}

impl StatusCounts {
    pub fn from_entries(entries: &[ChangeEntry]) -> Self {
        let mut counts = Self::default();
        for entry in entries {
            match entry.status {
                ChangeStatus::Added => counts.added += 1,
                ChangeStatus::Modified => counts.modified += 1,
                ChangeStatus::Deleted => counts.deleted += 1,
                ChangeStatus::Renamed => counts.renamed += 1,
            }
        }
        counts
    }
}

/// How many raw entries each of the three normalizer inputs
/// contributed, before dedup/merge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChangeSourceBreakdown {
    pub base_vs_head: usize,
    pub working_tree_vs_head: usize,
    pub untracked: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GlobalWatchSummary {
    pub forced_all: bool,
    pub matched_patterns: Vec<PathBuf>,
}

/// Size statistics for each intermediate set, zeroed when
/// global-watch short-circuits the pipeline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SizeStats {
    pub changed_files: usize,
    pub semantic_changed_methods_count: usize,
    pub impacted_classes: usize,
    pub impacted_methods: usize,
    pub fixture_keys: usize,
    pub stage_a_survivors: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CoverageStats {
    pub uncertain_call_sites: u64,
    pub status_fallbacks: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportedSpec {
    pub repo_relative_path: PathBuf,
    pub absolute_path: PathBuf,
    pub reason: SelectionReason,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionReport {
    pub selected_specs: Vec<ReportedSpec>,
    pub has_anything_to_run: bool,
    pub status_counts: StatusCounts,
    pub change_source_breakdown: ChangeSourceBreakdown,
    pub global_watch: GlobalWatchSummary,
    pub forced_all_specs: bool,
    pub size_stats: SizeStats,
    pub coverage_stats: CoverageStats,
    pub top_level_runtime_changed_files: u64,
    pub warnings: Vec<Warning>,
}

impl SelectionReport {
    /// `selected_specs` restricted to just the repo-relative paths, sorted
    /// with no duplicates.
    pub fn selected_paths(&self) -> Vec<&Path> {
        self.selected_specs.iter().map(|s| s.repo_relative_path.as_path()).collect()
    }
}

/// Build the forced "run everything" report for the global-watch
/// short-circuit: every statistic downstream of global-watch evaluation is
/// zeroed, since the rest of the pipeline never ran.
pub fn assemble_forced_all(
    repo_root: &Path,
    all_specs: &[PathBuf],
    status_counts: StatusCounts,
    change_source_breakdown: ChangeSourceBreakdown,
    matched_patterns: Vec<PathBuf>,
    warnings: Vec<Warning>,
) -> SelectionReport {
    let mut selected_specs: Vec<ReportedSpec> = all_specs
        .iter()
        .map(|path| ReportedSpec {
            repo_relative_path: path.clone(),
            absolute_path: repo_root.join(path),
            reason: SelectionReason::GlobalWatchForceAll,
        })
        .collect();
    selected_specs.sort_by(|a, b| a.repo_relative_path.cmp(&b.repo_relative_path));
    selected_specs.dedup_by(|a, b| a.repo_relative_path == b.repo_relative_path);

    let has_anything_to_run = !selected_specs.is_empty();
    SelectionReport {
        selected_specs,
        has_anything_to_run,
        status_counts,
        change_source_breakdown,
        global_watch: GlobalWatchSummary {
            forced_all: true,
            matched_patterns,
        },
        forced_all_specs: true,
        size_stats: SizeStats::default(),
        coverage_stats: CoverageStats::default(),
        top_level_runtime_changed_files: 0,
        warnings,
    }
}

#[allow(clippy::too_many_arguments)]
pub fn assemble(
    repo_root: &Path,
    selected: Vec<SelectedSpec>,
    status_counts: StatusCounts,
    change_source_breakdown: ChangeSourceBreakdown,
    size_stats: SizeStats,
    coverage_stats: CoverageStats,
    top_level_runtime_changed_files: u64,
    warnings: Vec<Warning>,
) -> SelectionReport {
    let mut selected_specs: Vec<ReportedSpec> = selected
        .into_iter()
        .map(|s| ReportedSpec {
            absolute_path: repo_root.join(&s.path),
            repo_relative_path: s.path,
            reason: s.reason,
        })
        .collect();
    selected_specs.sort_by(|a, b| a.repo_relative_path.cmp(&b.repo_relative_path));
    selected_specs.dedup_by(|a, b| a.repo_relative_path == b.repo_relative_path);

    let has_anything_to_run = !selected_specs.is_empty();
    SelectionReport {
        selected_specs,
        has_anything_to_run,
        status_counts,
        change_source_breakdown,
        global_watch: GlobalWatchSummary::default(),
        forced_all_specs: false,
        size_stats,
        coverage_stats,
        top_level_runtime_changed_files,
        warnings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::ChangeStatus;
    use std::path::PathBuf;

    fn entry(status: ChangeStatus) -> ChangeEntry {
        ChangeEntry {
            status,
            old_path: None,
            new_path: Some(PathBuf::from("a.ts")),
            effective_path: PathBuf::from("a.ts"),
            raw_status: "M".into(),
        }
    }

    #[test]
    fn status_counts_tally_by_status() {
        let entries = vec![entry(ChangeStatus::Added), entry(ChangeStatus::Added), entry(ChangeStatus::Deleted)];
        let counts = StatusCounts::from_entries(&entries);
        assert_eq!(counts.added, 2);
        assert_eq!(counts.deleted, 1);
    }

    #[test]
    fn empty_selection_has_nothing_to_run() {
        let report = assemble(
            Path::new("/repo"),
            Vec::new(),
            StatusCounts::default(),
            ChangeSourceBreakdown::default(),
            SizeStats::default(),
            CoverageStats::default(),
            0,
            Vec::new(),
        );
        assert!(!report.has_anything_to_run);
    }

    #[test]
    fn forced_all_report_zeroes_intermediate_stats() {
        let specs = vec![PathBuf::from("tests/a.spec.ts"), PathBuf::from("tests/b.spec.ts")];
        let report = assemble_forced_all(
            Path::new("/repo"),
            &specs,
            StatusCounts::default(),
            ChangeSourceBreakdown::default(),
            vec![PathBuf::from("src/fixtures/types.ts")],
            Vec::new(),
        );
        assert!(report.forced_all_specs);
        assert_eq!(report.size_stats, SizeStats::default());
        assert_eq!(report.selected_specs.len(), 2);
        assert!(report.selected_specs.iter().all(|s| s.reason == SelectionReason::GlobalWatchForceAll));
    }

    #[test]
    fn selected_specs_are_sorted_and_deduplicated() {
        let selected = vec![
            SelectedSpec {
                path: PathBuf::from("tests/z.spec.ts"),
                reason: SelectionReason::MatchedPrecise,
            },
            SelectedSpec {
                path: PathBuf::from("tests/a.spec.ts"),
                reason: SelectionReason::MatchedPrecise,
            },
        ];
        let report = assemble(
            Path::new("/repo"),
            selected,
            StatusCounts::default(),
            ChangeSourceBreakdown::default(),
            SizeStats::default(),
            CoverageStats::default(),
            0,
            Vec::new(),
        );
        assert_eq!(report.selected_specs[0].repo_relative_path, PathBuf::from("tests/a.spec.ts"));
        assert_eq!(report.selected_specs[1].repo_relative_path, PathBuf::from("tests/z.spec.ts"));
        assert_eq!(report.selected_specs[0].absolute_path, PathBuf::from("/repo/tests/a.spec.ts"));
    }
}
