use std::num::NonZeroUsize;

use lru::LruCache;
use tracing::trace;
use typefact_graphs::TypeGraph;

/// Which resolution chain produced a cached graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pass {
    Local,
    /// Carries the generation of the global context consulted.
    Global(u64),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    fingerprint: u64,
    pass: Pass,
    graph: TypeGraph,
}

/// Counters exposed for diagnostics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub len: usize,
    pub capacity: usize,
}

/// Bounded memo of `(context fingerprint, graph) → resolved graph`.
///
/// Lookups use `peek`, so a hit does not refresh recency and the oldest
/// insertion is evicted first.
#[derive(Debug)]
pub struct QualificationCache {
    entries: LruCache<CacheKey, TypeGraph>,
    hits: u64,
    misses: u64,
    evictions: u64,
}

impl QualificationCache {
    /// A zero capacity is raised to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: LruCache::new(capacity),
            hits: 0,
            misses: 0,
            evictions: 0,
        }
    }

    pub fn get(&mut self, fingerprint: u64, pass: Pass, graph: &TypeGraph) -> Option<TypeGraph> {
        let key = CacheKey {
            fingerprint,
            pass,
            graph: graph.clone(),
        };
        if let Some(hit) = self.entries.peek(&key) {
            self.hits += 1;
            trace!(fingerprint, ?pass, "Qualification cache hit");
            Some(hit.clone())
        } else {
            self.misses += 1;
            trace!(fingerprint, ?pass, "Qualification cache miss");
            None
        }
    }

    pub fn insert(&mut self, fingerprint: u64, pass: Pass, graph: TypeGraph, resolved: TypeGraph) {
        let key = CacheKey {
            fingerprint,
            pass,
            graph,
        };
        if let Some((evicted, _)) = self.entries.push(key.clone(), resolved) {
            if evicted != key {
                self.evictions += 1;
                trace!(fingerprint = evicted.fingerprint, "Qualification cache evicted oldest entry");
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits,
            misses: self.misses,
            evictions: self.evictions,
            len: self.entries.len(),
            capacity: self.entries.cap().get(),
        }
    }
}
