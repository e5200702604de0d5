//! Driven ports for the four external collaborators the engine consumes:
//! a change-set enumerator, a revision-keyed file reader, a recursive
//! directory lister, and an AST parser for the target source language.
//!
//! The domain defines each interface; `infrastructure` implements the ones
//! that don't require a caller-supplied backend.

use super::model::{ChangeSource, RawChangeEntry};
use crate::shared::Revision;
use std::path::{Path, PathBuf};

/// Port (a): the change-set enumerator. Implementations typically wrap a
/// VCS CLI; invoking that CLI is explicitly out of scope for this crate,
/// so no default adapter ships for it.
pub trait ChangeSetSource: Send + Sync {
    /// Compares `base_ref` against head. Called only when
    /// `EngineConfig::base_ref` is set.
    fn base_vs_head(&self, base_ref: &str) -> Result<Vec<RawChangeEntry>, String>;

    /// Compares the working tree against head. Called unless
    /// `EngineConfig::include_working_tree_with_base` is false while a
    /// `base_ref` is also set.
    fn working_tree_vs_head(&self) -> Result<Vec<RawChangeEntry>, String>;

    /// Untracked file paths. Called only when
    /// `EngineConfig::include_untracked_specs` is true.
    fn untracked(&self) -> Result<Vec<PathBuf>, String>;
}

impl RawChangeEntry {
    pub fn with_source(mut self, source: ChangeSource) -> Self {
        self.source = source;
        self
    }
}

/// Port (b): file content keyed by `(path, revision)`.
pub trait FileContentReader: Send + Sync {
    fn read(&self, path: &Path, revision: Revision) -> std::io::Result<Option<Vec<u8>>>;
}

/// Port (c): recursive directory listing.
pub trait DirectoryLister: Send + Sync {
    fn list_recursive(&self, root: &Path) -> std::io::Result<Vec<PathBuf>>;
}

/// Port (d): a parser that yields abstract syntax trees for the target
/// source language. `ParsedAst` wraps a `tree_sitter::Tree` together with
/// the source text it was parsed from, since tree-sitter nodes borrow from
/// both.
pub trait SourceAstParser: Send + Sync {
    fn parse(&self, content: &str) -> Option<crate::parsing::ParsedAst>;
}
