//! Which side of a diff a piece of content came from.

/// Distinguishes base-side from head/working-tree-side content so AST and
/// fingerprint cache keys never collide across the two revisions of the
/// same path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Revision {
    Base,
    Head,
}
