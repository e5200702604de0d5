//! Default adapters for the driven ports in `domain::ports` that don't
//! require a caller-supplied VCS backend.
//! `TreeSitterTsParser` already lives in `parsing`; this module adds the
//! `walkdir`-backed lister.

pub mod directory_lister;

pub use directory_lister::WalkdirLister;
