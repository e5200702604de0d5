//! In-memory fakes for the four driven ports, shared by every
//! integration test file in this directory.

use pom_impact_core::{ChangeSetSource, DirectoryLister, EngineConfig, FileContentReader, GlobalWatchMode, Profile, RawChangeEntry, SelectionBias};
use pom_impact_core::shared::Revision;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// A repo-relative `(path, revision)` content store. Missing entries read
/// as `Ok(None)`, matching `WalkdirLister`/a real VCS adapter's treatment
/// of a path that doesn't exist on that side.
#[derive(Default)]
pub struct FakeFileReader {
    pub base: HashMap<PathBuf, String>,
    pub head: HashMap<PathBuf, String>,
}

impl FakeFileReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_head(mut self, path: &str, content: &str) -> Self {
        self.head.insert(PathBuf::from(path), content.to_string());
        self
    }

    pub fn with_base(mut self, path: &str, content: &str) -> Self {
        self.base.insert(PathBuf::from(path), content.to_string());
        self
    }
}

impl FileContentReader for FakeFileReader {
    fn read(&self, path: &Path, revision: Revision) -> std::io::Result<Option<Vec<u8>>> {
        let map = match revision {
            Revision::Base => &self.base,
            Revision::Head => &self.head,
        };
        Ok(map.get(path).map(|s| s.clone().into_bytes()))
    }
}

/// Lists whatever was registered under `repo_root` at construction time,
/// restricted to the subtree under the requested root — the same
/// "absolute path in, repo-relative-capable path out" contract
/// `WalkdirLister` has, without touching the filesystem.
pub struct FakeDirLister {
    files: Vec<PathBuf>,
}

impl FakeDirLister {
    pub fn new(repo_root: &Path, repo_relative_files: &[&str]) -> Self {
        Self {
            files: repo_relative_files.iter().map(|p| repo_root.join(p)).collect(),
        }
    }
}

impl DirectoryLister for FakeDirLister {
    fn list_recursive(&self, root: &Path) -> std::io::Result<Vec<PathBuf>> {
        Ok(self.files.iter().filter(|p| p.starts_with(root)).cloned().collect())
    }
}

/// A change-set source that always reports the same fixed batches,
/// regardless of the `base_ref` argument — these tests only ever compare
/// one synthetic base against one synthetic head.
#[derive(Default)]
pub struct FakeChangeSetSource {
    pub entries: Vec<RawChangeEntry>,
}

impl FakeChangeSetSource {
    pub fn new(entries: Vec<RawChangeEntry>) -> Self {
        Self { entries }
    }
}

impl ChangeSetSource for FakeChangeSetSource {
    fn base_vs_head(&self, _base_ref: &str) -> Result<Vec<RawChangeEntry>, String> {
        Ok(self.entries.clone())
    }

    fn working_tree_vs_head(&self) -> Result<Vec<RawChangeEntry>, String> {
        Ok(Vec::new())
    }

    fn untracked(&self) -> Result<Vec<PathBuf>, String> {
        Ok(Vec::new())
    }
}

pub fn modified(path: &str) -> RawChangeEntry {
    RawChangeEntry {
        status: "M".to_string(),
        old_path: None,
        new_path: Some(PathBuf::from(path)),
        source: pom_impact_core::ChangeSource::BaseVsHead,
    }
}

pub fn renamed(old_path: &str, new_path: &str) -> RawChangeEntry {
    RawChangeEntry {
        status: "R".to_string(),
        old_path: Some(PathBuf::from(old_path)),
        new_path: Some(PathBuf::from(new_path)),
        source: pom_impact_core::ChangeSource::BaseVsHead,
    }
}

/// A minimal valid `EngineConfig` rooted at `/repo`, with one analysis root
/// (`src`) and the default global-watch patterns disabled so individual
/// scenarios can opt into global-watch coverage explicitly.
pub fn config() -> EngineConfig {
    let profile = Profile {
        tests_root_relative: "tests".to_string(),
        changed_spec_prefix: "tests/".to_string(),
        is_relevant_pom_path: Arc::new(|_| true),
        analysis_roots_relative: vec!["src".to_string()],
        fixtures_types_relative: "src/fixtures/types.ts".to_string(),
        tsconfig_relative: Profile::default_tsconfig_relative(),
        global_watch_patterns: Profile::default_global_watch_patterns(),
        global_watch_mode: GlobalWatchMode::Disabled,
    };
    let mut cfg = EngineConfig::new(PathBuf::from("/repo"), profile);
    cfg.selection_bias = SelectionBias::FailOpen;
    cfg
}

/// Installs a `tracing` subscriber that writes to the test harness's
/// captured output, once per process. Lets `RUST_LOG=pom_impact_core=debug
/// cargo test -- --nocapture` surface the `tracing::debug!`/`warn!` spans
/// `pipeline::orchestrator` emits at each component boundary.
pub fn init_tracing() {
    static INIT: std::sync::Once = std::sync::Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt().with_test_writer().with_env_filter(tracing_subscriber::EnvFilter::from_default_env()).try_init();
    });
}
