//! A bounded, concurrent AST cache shared by phases that would otherwise
//! re-parse the same file content more than once in one invocation — the
//! Global-Watch closure walk and the Import-Graph Selector
//! both parse every known file's module references independently.
//!
//! Reads never block on other reads (`DashMap`); a cache miss parses once
//! and, on the rare race where two threads miss simultaneously, the second
//! parse is simply discarded — safe since a `ParsedAst` is a pure function
//! of its content.

use crate::domain::ports::SourceAstParser;
use crate::parsing::ParsedAst;
use dashmap::DashMap;
use std::sync::Mutex;

/// Bounds the cache to roughly this many distinct contents before evicting
/// the least-recently-inserted entry.
const DEFAULT_CAPACITY: usize = 4096;

pub struct AstCache {
    entries: DashMap<blake3::Hash, ParsedAst>,
    eviction_order: Mutex<lru::LruCache<blake3::Hash, ()>>,
}

impl AstCache {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: DashMap::new(),
            eviction_order: Mutex::new(lru::LruCache::new(
                std::num::NonZeroUsize::new(capacity.max(1)).expect("capacity clamped to at least 1"),
            )),
        }
    }

    /// Parse `content` via `parser`, reusing a prior parse of identical
    /// content if one is cached. Returns `None` if `parser` itself fails to
    /// produce a tree — a recoverable per-file failure, not a cache error.
    pub fn get_or_parse(&self, content: &str, parser: &dyn SourceAstParser) -> Option<ParsedAst> {
        let key = blake3::hash(content.as_bytes());
        if let Some(hit) = self.entries.get(&key) {
            self.touch(key);
            return Some(hit.clone());
        }
        let parsed = parser.parse(content)?;
        self.entries.insert(key, parsed.clone());
        self.touch(key);
        Some(parsed)
    }

    fn touch(&self, key: blake3::Hash) {
        let mut order = self.eviction_order.lock().expect("ast cache eviction lock poisoned");
        if let Some(evicted) = order.push(key, ()).filter(|(k, _)| *k != key) {
            self.entries.remove(&evicted.0);
        }
    }
}

impl Default for AstCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Adapts an `AstCache` + inner parser pair to the `SourceAstParser` port,
/// so call sites that only know about the trait (global-watch, import-graph)
/// don't need to special-case the cached path.
pub struct CachingAstParser<'a> {
    inner: &'a dyn SourceAstParser,
    cache: &'a AstCache,
}

impl<'a> CachingAstParser<'a> {
    pub fn new(inner: &'a dyn SourceAstParser, cache: &'a AstCache) -> Self {
        Self { inner, cache }
    }
}

impl SourceAstParser for CachingAstParser<'_> {
    fn parse(&self, content: &str) -> Option<ParsedAst> {
        self.cache.get_or_parse(content, self.inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsing::TreeSitterTsParser;

    #[test]
    fn repeated_identical_content_hits_the_cache() {
        let inner = TreeSitterTsParser::new();
        let cache = AstCache::new();
        let parser = CachingAstParser::new(&inner, &cache);
        let first = parser.parse("class A {}").unwrap();
        let second = parser.parse("class A {}").unwrap();
        assert_eq!(first.source, second.source);
    }

    #[test]
    fn eviction_bounds_cache_size() {
        let inner = TreeSitterTsParser::new();
        let cache = AstCache::with_capacity(2);
        let parser = CachingAstParser::new(&inner, &cache);
        parser.parse("class A {}").unwrap();
        parser.parse("class B {}").unwrap();
        parser.parse("class C {}").unwrap();
        assert!(cache.entries.len() <= 2);
    }

    #[test]
    fn unparseable_content_returns_none() {
        struct AlwaysFails;
        impl SourceAstParser for AlwaysFails {
            fn parse(&self, _content: &str) -> Option<ParsedAst> {
                None
            }
        }
        let inner = AlwaysFails;
        let cache = AstCache::new();
        let parser = CachingAstParser::new(&inner, &cache);
        assert!(parser.parse("anything").is_none());
    }
}
