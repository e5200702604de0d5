//! Core data model.

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

/// A class name: any identifier starting with an uppercase letter.
pub type ClassName = String;
/// A callable or field name on a class.
pub type MemberName = String;
/// A destructured fixture parameter's property name.
pub type FixtureKey = String;

/// `"<Class>#<Member>"` — uniquely identifies a callable member across the
/// whole analysis roots tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MemberKey(pub String);

impl MemberKey {
    pub fn new(class: &str, member: &str) -> Self {
        Self(format!("{class}#{member}"))
    }

    pub fn class(&self) -> &str {
        self.0.split('#').next().unwrap_or("")
    }

    pub fn member(&self) -> &str {
        self.0.split_once('#').map(|(_, m)| m).unwrap_or("")
    }
}

impl std::fmt::Display for MemberKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Canonical change status after normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ChangeStatus {
    Added,
    Modified,
    Deleted,
    Renamed,
}

impl ChangeStatus {
    /// Merge precedence for duplicate entries at the same `effective_path`:
    /// Deleted > Renamed > Modified > Added.
    pub fn precedence(self) -> u8 {
        match self {
            ChangeStatus::Deleted => 3,
            ChangeStatus::Renamed => 2,
            ChangeStatus::Modified => 1,
            ChangeStatus::Added => 0,
        }
    }
}

/// Which of the three normalizer inputs a raw entry came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeSource {
    BaseVsHead,
    WorkingTreeVsHead,
    Untracked,
}

/// An as-reported status string from the upstream enumerator, before
/// normalization, kept for diagnostics.
pub type RawStatus = String;

/// A single raw change record as reported by `ChangeSetSource`, before
/// dedup/merge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawChangeEntry {
    pub status: RawStatus,
    pub old_path: Option<PathBuf>,
    pub new_path: Option<PathBuf>,
    pub source: ChangeSource,
}

/// A normalized change entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEntry {
    pub status: ChangeStatus,
    pub old_path: Option<PathBuf>,
    pub new_path: Option<PathBuf>,
    /// Head-side path; for `Deleted`, the deleted path.
    pub effective_path: PathBuf,
    pub raw_status: RawStatus,
}

/// Which class member kind an identity refers to. A getter and setter
/// sharing a name are tracked separately, and a property replaced by a
/// method of the same name is detected as a change because the `kind`
/// differs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MemberKind {
    Constructor,
    Call,
    Get,
    Set,
    Field,
}

impl MemberKind {
    pub fn is_callable(self) -> bool {
        !matches!(self, MemberKind::Field)
    }
}

/// `{kind, name}` — the key under which a class's members are indexed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MemberIdentity {
    pub kind: MemberKind,
    pub name: MemberName,
}

/// Reasons a spec ended up selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SelectionReason {
    DirectChangedSpec,
    MatchedImportGraph,
    MatchedPrecise,
    MatchedUncertainFailOpen,
    RetainedNoImpactedMethods,
    RetainedNoBindings,
    RetainedReadError,
    GlobalWatchForceAll,
}

impl SelectionReason {
    pub fn as_str(self) -> &'static str {
        match self {
            SelectionReason::DirectChangedSpec => "direct-changed-spec",
            SelectionReason::MatchedImportGraph => "matched-import-graph",
            SelectionReason::MatchedPrecise => "matched-precise",
            SelectionReason::MatchedUncertainFailOpen => "matched-uncertain-fail-open",
            SelectionReason::RetainedNoImpactedMethods => "retained-no-impacted-methods",
            SelectionReason::RetainedNoBindings => "retained-no-bindings",
            SelectionReason::RetainedReadError => "retained-read-error",
            SelectionReason::GlobalWatchForceAll => "global-watch-force-all",
        }
    }
}

/// `changed_methods_by_class` / `impacted_methods_by_class`.
pub type MethodsByClass = HashMap<ClassName, HashSet<MemberName>>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deleted_beats_every_other_status() {
        assert!(ChangeStatus::Deleted.precedence() > ChangeStatus::Renamed.precedence());
        assert!(ChangeStatus::Renamed.precedence() > ChangeStatus::Modified.precedence());
        assert!(ChangeStatus::Modified.precedence() > ChangeStatus::Added.precedence());
    }

    #[test]
    fn member_key_format() {
        assert_eq!(MemberKey::new("MyPage", "open").0, "MyPage#open");
    }

    #[test]
    fn member_key_splits_class_and_member() {
        let key = MemberKey::new("MyPage", "open");
        assert_eq!(key.class(), "MyPage");
        assert_eq!(key.member(), "open");
    }
}
