//! Per-pruning-pass memoization of pairwise similarity scores.

use rustc_hash::FxHashMap;

use crate::error::Result;
use crate::NodeId;

/// Memoizes `similarity(a, b)` over the lifetime of a single pruning pass.
///
/// Deliberately asymmetric: callers always pass the same "anchor" node as `a`,
/// so the cache key can pack both ids into one `u64` without needing to
/// canonicalize the pair order. This mirrors every other hot-path map in this
/// codebase keyed by small integers: an `FxHashMap` trades DoS-resistance
/// (irrelevant for an in-process, single-pass cache keyed by node ids we
/// generated ourselves) for speed.
///
/// A `ScoreCache` is single-threaded and owned by one pruning pass; it is
/// discarded once that pass completes.
#[derive(Default)]
pub struct ScoreCache {
    cache: FxHashMap<u64, f32>,
}

impl ScoreCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the memoized score for `(a, b)`, computing and storing it via
    /// `provider(b)` on a miss. `provider` must be the score-function bound to
    /// anchor `a` (see [`Similarity::score_provider`](crate::Similarity::score_provider)).
    ///
    /// # Errors
    ///
    /// Propagates any error `provider` returns; nothing is cached on failure.
    pub fn get(&mut self, a: NodeId, b: NodeId, mut provider: impl FnMut(NodeId) -> Result<f32>) -> Result<f32> {
        let key = Self::key(a, b);
        if let Some(&score) = self.cache.get(&key) {
            return Ok(score);
        }
        let score = provider(b)?;
        self.cache.insert(key, score);
        Ok(score)
    }

    /// Number of memoized entries. Test/diagnostic only.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    /// Whether the cache holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    fn key(a: NodeId, b: NodeId) -> u64 {
        (u64::from(a as u32) << 32) | u64::from(b as u32)
    }
}

#[cfg(test)]
#[path = "score_cache_tests.rs"]
mod tests;
