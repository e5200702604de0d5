//! Shared value types used across every feature module.

mod fingerprint;
mod revision;
mod span;

pub mod ast_cache;
pub mod module_resolution;
pub mod tree_sitter_util;

pub use fingerprint::{Fingerprint, FingerprintKind};
pub use revision::Revision;
pub use span::Span;
