//! Normalized AST-subtree fingerprints.
//!
//! A fingerprint is a `blake3` digest of a normalized textual rendering of
//! an AST subtree: comments stripped, whitespace runs collapsed to a single
//! space. Two fingerprints are equal iff the underlying nodes are
//! semantically equivalent under that normalization, which is precisely
//! what lets whitespace- and comment-only edits produce no detected change.

use std::fmt;

/// What kind of subtree a fingerprint was computed over. Used as part of the
/// cache key `(revision, path, span, kind)` so that, e.g., an overload
/// signature and an implementation body covering overlapping spans never
/// collide in the memoization table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FingerprintKind {
    /// A single overload signature (no body).
    OverloadSignature,
    /// A callable's implementation body.
    ImplementationBody,
    /// The concatenation of a file's runtime (non-type, non-class) top-level
    /// statements.
    RuntimeTopLevel,
}

/// A `blake3`-backed fingerprint. Equality and hashing delegate to the
/// 32-byte digest, so comparing two fingerprints is O(1) regardless of the
/// size of the source text they were computed from.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint(blake3::Hash);

impl Fingerprint {
    /// Compute a fingerprint from already-normalized text.
    pub fn of_normalized(normalized: &str) -> Self {
        Self(blake3::hash(normalized.as_bytes()))
    }

    /// Normalize raw source text (comments removed, whitespace collapsed)
    /// and fingerprint it in one step.
    pub fn of_raw(raw: &str) -> Self {
        Self::of_normalized(&normalize_text(raw))
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fingerprint({})", &self.0.to_hex()[..12])
    }
}

/// Collapse whitespace runs to a single space and trim. Comment stripping
/// happens upstream, while walking the AST (comment nodes are simply never
/// visited when building the textual rendering) — this function only
/// normalizes whatever text it is given.
pub fn normalize_text(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut last_was_space = false;
    for ch in raw.chars() {
        if ch.is_whitespace() {
            if !last_was_space {
                out.push(' ');
                last_was_space = true;
            }
        } else {
            out.push(ch);
            last_was_space = false;
        }
    }
    out.trim().to_string()
}
