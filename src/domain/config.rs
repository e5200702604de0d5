//! Invocation configuration.

use crate::errors::EngineError;
use std::path::PathBuf;
use std::sync::Arc;

/// `profile.global_watch_mode`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GlobalWatchMode {
    #[default]
    ForceAllInProject,
    Disabled,
}

/// `selection_bias`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionBias {
    #[default]
    FailOpen,
    /// Reserved; behaves as `FailClosed` for this engine.
    Balanced,
    FailClosed,
}

impl SelectionBias {
    /// Whether an uncertain-but-not-precise spec should be retained.
    pub fn keeps_on_uncertainty(self) -> bool {
        matches!(self, SelectionBias::FailOpen)
    }
}

/// A predicate over a repo-relative path string, deciding whether a changed
/// source file participates in semantic analysis. Boxed so callers can
/// supply a closure, a compiled `globset::GlobSet`, or anything else.
pub type PomPathPredicate = Arc<dyn Fn(&str) -> bool + Send + Sync>;

/// `profile.*` fields.
#[derive(Clone)]
pub struct Profile {
    pub tests_root_relative: String,
    pub changed_spec_prefix: String,
    pub is_relevant_pom_path: PomPathPredicate,
    pub analysis_roots_relative: Vec<String>,
    pub fixtures_types_relative: String,
    /// Project tsconfig-style file providing `compilerOptions.baseUrl` and
    /// `compilerOptions.paths`. A missing file is equivalent to an empty
    /// `PathAliases` — alias resolution simply never fires, it is not an
    /// error.
    pub tsconfig_relative: String,
    pub global_watch_patterns: Vec<String>,
    pub global_watch_mode: GlobalWatchMode,
}

impl Profile {
    /// Built-in global-watch pattern set used when a caller doesn't supply
    /// its own.
    pub fn default_global_watch_patterns() -> Vec<String> {
        vec![
            "playwright.*.config.*".to_string(),
            "src/fixtures/**".to_string(),
        ]
    }

    pub fn default_tsconfig_relative() -> String {
        "tsconfig.json".to_string()
    }

    fn validate(&self) -> Result<(), EngineError> {
        if self.tests_root_relative.is_empty() {
            return Err(EngineError::Configuration(
                "profile.tests_root_relative is required".into(),
            ));
        }
        if self.changed_spec_prefix.is_empty() {
            return Err(EngineError::Configuration(
                "profile.changed_spec_prefix is required".into(),
            ));
        }
        Ok(())
    }
}

/// Top-level entry-function configuration.
#[derive(Clone)]
pub struct EngineConfig {
    pub repo_root: PathBuf,
    pub base_ref: Option<String>,
    pub profile: Profile,
    pub include_untracked_specs: bool,
    pub include_working_tree_with_base: bool,
    pub file_extensions: Vec<String>,
    pub selection_bias: SelectionBias,
}

impl EngineConfig {
    pub fn new(repo_root: PathBuf, profile: Profile) -> Self {
        Self {
            repo_root,
            base_ref: None,
            profile,
            include_untracked_specs: true,
            include_working_tree_with_base: true,
            file_extensions: vec![".ts".to_string(), ".tsx".to_string()],
            selection_bias: SelectionBias::FailOpen,
        }
    }

    /// Normalize `file_extensions` to lowercase, leading-dot form.
    pub fn normalized_extensions(&self) -> Vec<String> {
        self.file_extensions
            .iter()
            .map(|ext| {
                let lower = ext.to_lowercase();
                if lower.starts_with('.') {
                    lower
                } else {
                    format!(".{lower}")
                }
            })
            .collect()
    }

    /// Enforce the fatal configuration-error cases. Must be called before
    /// the pipeline runs; on error no partial result is produced.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.repo_root.as_os_str().is_empty() {
            return Err(EngineError::Configuration("repo_root is required".into()));
        }
        if !self.repo_root.is_absolute() {
            return Err(EngineError::Configuration(
                "repo_root must be an absolute path".into(),
            ));
        }
        self.profile.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> Profile {
        Profile {
            tests_root_relative: "tests".into(),
            changed_spec_prefix: "tests/".into(),
            is_relevant_pom_path: Arc::new(|_| true),
            analysis_roots_relative: vec!["src".into()],
            fixtures_types_relative: "src/fixtures/types.ts".into(),
            tsconfig_relative: Profile::default_tsconfig_relative(),
            global_watch_patterns: Profile::default_global_watch_patterns(),
            global_watch_mode: GlobalWatchMode::ForceAllInProject,
        }
    }

    #[test]
    fn relative_repo_root_is_rejected() {
        let cfg = EngineConfig::new(PathBuf::from("relative/path"), profile());
        assert!(matches!(cfg.validate(), Err(EngineError::Configuration(_))));
    }

    #[test]
    fn missing_tests_root_is_rejected() {
        let mut p = profile();
        p.tests_root_relative.clear();
        let cfg = EngineConfig::new(PathBuf::from("/repo"), p);
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn extensions_are_normalized() {
        let mut cfg = EngineConfig::new(PathBuf::from("/repo"), profile());
        cfg.file_extensions = vec!["TS".into(), ".TSX".into()];
        assert_eq!(cfg.normalized_extensions(), vec![".ts", ".tsx"]);
    }
}
