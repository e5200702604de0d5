//! pom-impact-core — test-impact analysis for Page-Object-Model browser
//! test suites.
//!
//! Feature-first layout:
//!
//! - `domain`         : config, model types, and the driven ports the
//!                      four external collaborators implement.
//! - `parsing`         : the `tree-sitter`-backed TypeScript extraction layer
//!                      shared by every feature module.
//! - `features`        : one vertical slice per pipeline component.
//! - `pipeline`        : wires the components into a single synchronous run.
//! - `infrastructure`  : default adapters for the ports that don't require a
//!                      caller-supplied VCS backend.
//! - `shared`          : fingerprints, revisions, spans, AST cache, module
//!                      resolution — value types with no feature ownership.
//!
//! The only fatal errors are `EngineError::Configuration` and
//! `EngineError::SourceEnumeration`; everything else is carried as a
//! `Warning` on the returned `SelectionReport`.

pub mod domain;
pub mod errors;
pub mod features;
pub mod infrastructure;
pub mod parsing;
pub mod pipeline;
pub mod shared;

pub use domain::config::{EngineConfig, GlobalWatchMode, PomPathPredicate, Profile, SelectionBias};
pub use domain::model::{ChangeEntry, ChangeSource, ChangeStatus, RawChangeEntry, SelectionReason};
pub use domain::ports::{ChangeSetSource, DirectoryLister, FileContentReader, SourceAstParser};
pub use errors::{EngineError, EngineResult, Warning, WarningKind};
pub use features::assembler::{ChangeSourceBreakdown, CoverageStats, GlobalWatchSummary, ReportedSpec, SelectionReport, SizeStats, StatusCounts};
pub use infrastructure::WalkdirLister;
pub use parsing::TreeSitterTsParser;

/// The single entry function: runs the full batch pipeline once and returns
/// a deterministic `SelectionReport`, or a fatal `EngineError` if `config`
/// is invalid or the change-set source fails.
///
/// `change_source`, `file_reader`, and `dir_lister` are the caller's
/// adapters for ports (a)-(c); `parser` is the adapter for port (d). Callers
/// that don't need a custom directory lister or TypeScript parser can use
/// [`WalkdirLister`] and [`TreeSitterTsParser`].
pub fn analyze(
    config: &EngineConfig,
    change_source: &dyn ChangeSetSource,
    file_reader: &dyn FileContentReader,
    dir_lister: &dyn DirectoryLister,
    parser: &dyn SourceAstParser,
) -> EngineResult<SelectionReport> {
    pipeline::run(config, change_source, file_reader, dir_lister, parser)
}
