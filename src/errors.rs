//! Error types for pom-impact-core.
//!
//! Only the two *fatal* error kinds are represented as `Result::Err`
//! values. The two non-fatal kinds — per-file recoverable failures and
//! uncertainty warnings — never abort a run; they are pushed onto the
//! running `Vec<Warning>` collected in `features::assembler` instead.

use thiserror::Error;

/// Fatal errors that abort the invocation with no partial result.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Missing `repo_root`, missing profile, or a missing required profile
    /// field.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The change-enumerator backend exited non-zero or produced unreadable
    /// output.
    #[error("source enumeration failed: {0}")]
    SourceEnumeration(String),
}

pub type EngineResult<T> = std::result::Result<T, EngineError>;

/// A non-fatal, informational warning. `site` is a human-diagnosable
/// location (usually a path, sometimes `path:line`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Warning {
    pub kind: WarningKind,
    pub site: String,
    pub detail: String,
}

impl Warning {
    pub fn new(kind: WarningKind, site: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            kind,
            site: site.into(),
            detail: detail.into(),
        }
    }
}

/// The specific uncertainty/recoverable-failure categories a selection run
/// can surface without failing outright.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WarningKind {
    /// An individual file could not be read, parsed, or was malformed.
    UnreadableFile,
    /// An upstream change-status classifier fell back to `Modified` (or `Added`
    /// for a `copy` classifier).
    StatusFallback,
    /// `this["<literal computed at runtime>"]` or any other computed-index
    /// dynamic call.
    DynamicDispatch,
    /// A `this.a.b.c(...)` chain of depth >= 2.
    DeepChain,
    /// A call through an alias or a destructured local binding.
    AliasUsage,
    /// A `this`/`super` member reference that could not be resolved in the
    /// lineage.
    UnresolvedReference,
    /// A composed field whose declared type could not be mapped to a known
    /// class.
    UnknownComposedFieldType,
}
