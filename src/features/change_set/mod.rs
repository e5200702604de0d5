//! Component A — Change-Set Normalizer.
//!
//! Merges the base-vs-head comparison, the working-tree-vs-head comparison,
//! and the untracked-file list into one deduplicated, sorted list of
//! `ChangeEntry` values, with a single canonical `status` per
//! `effective_path`.

use crate::domain::config::PomPathPredicate;
use crate::domain::model::{ChangeEntry, ChangeSource, ChangeStatus, RawChangeEntry, RawStatus};
use crate::errors::{Warning, WarningKind};
use std::collections::HashMap;
use std::path::PathBuf;

/// The canonical status set is `{A, M, D, R}`.
/// `C` (copy) falls back to `Added`; `T`/`U` are explicit synonyms for
/// `Modified`; anything else falls back to `Modified`. Only the `C` and
/// "anything else" cases are warning-worthy fallbacks — `T`/`U` are a
/// specified mapping, not a fallback.
fn classify_status(raw: &RawStatus) -> (ChangeStatus, Option<WarningKind>) {
    match raw.as_str() {
        "A" => (ChangeStatus::Added, None),
        "M" => (ChangeStatus::Modified, None),
        "D" => (ChangeStatus::Deleted, None),
        "R" => (ChangeStatus::Renamed, None),
        "T" | "U" => (ChangeStatus::Modified, None),
        "C" => (ChangeStatus::Added, Some(WarningKind::StatusFallback)),
        _ => (ChangeStatus::Modified, Some(WarningKind::StatusFallback)),
    }
}

fn effective_path(status: ChangeStatus, old_path: &Option<PathBuf>, new_path: &Option<PathBuf>) -> Option<PathBuf> {
    match status {
        ChangeStatus::Deleted => old_path.clone().or_else(|| new_path.clone()),
        _ => new_path.clone().or_else(|| old_path.clone()),
    }
}

/// Richer records beat sparser ones when merge precedence ties: a record
/// with both `old_path` and `new_path` populated beats one with only one of
/// the two.
fn richness(entry: &ChangeEntry) -> u8 {
    entry.old_path.is_some() as u8 + entry.new_path.is_some() as u8
}

/// Normalize raw entries from all three sources into the final, sorted,
/// deduplicated change set. `is_relevant` filters by `effective_path`
/// *before* dedup: entries outside the configured profile filter are
/// dropped before they can influence merge precedence.
pub fn normalize(raw_entries: Vec<RawChangeEntry>, is_relevant: &PomPathPredicate) -> (Vec<ChangeEntry>, Vec<Warning>) {
    let mut warnings = Vec::new();
    let mut by_path: HashMap<PathBuf, ChangeEntry> = HashMap::new();

    for raw in raw_entries {
        let (status, fallback) = classify_status(&raw.status);
        if let Some(kind) = fallback {
            warnings.push(Warning::new(
                kind,
                raw.new_path
                    .as_ref()
                    .or(raw.old_path.as_ref())
                    .map(|p| p.display().to_string())
                    .unwrap_or_default(),
                format!("unrecognized change status {:?} fell back to {:?}", raw.status, status),
            ));
        }
        let Some(path) = effective_path(status, &raw.old_path, &raw.new_path) else {
            continue;
        };
        if !is_relevant(&path.to_string_lossy()) {
            continue;
        }
        let candidate = ChangeEntry {
            status,
            old_path: raw.old_path,
            new_path: raw.new_path,
            effective_path: path.clone(),
            raw_status: raw.status,
        };
        match by_path.get(&path) {
            None => {
                by_path.insert(path, candidate);
            }
            Some(existing) => {
                let replace = match candidate.status.precedence().cmp(&existing.status.precedence()) {
                    std::cmp::Ordering::Greater => true,
                    std::cmp::Ordering::Equal => richness(&candidate) > richness(existing),
                    std::cmp::Ordering::Less => false,
                };
                if replace {
                    by_path.insert(path, candidate);
                }
            }
        }
    }

    let mut out: Vec<ChangeEntry> = by_path.into_values().collect();
    out.sort_by(|a, b| a.effective_path.cmp(&b.effective_path));
    (out, warnings)
}

/// Tags a batch of raw entries from one collaborator call with their
/// `ChangeSource`, for the change-source breakdown in the assembled report.
pub fn tag_source(entries: Vec<RawChangeEntry>, source: ChangeSource) -> Vec<RawChangeEntry> {
    entries.into_iter().map(|e| e.with_source(source)).collect()
}
