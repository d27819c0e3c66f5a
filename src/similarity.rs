//! The similarity provider contract consumed by [`ConcurrentNeighborSet`](crate::ConcurrentNeighborSet).
//!
//! This crate never touches raw vectors or storage: callers supply a
//! `Similarity` implementation that knows how to score node ids, typically by
//! loading vectors from whatever index-side store backs them.

use crate::error::Result;
use crate::NodeId;

/// Symmetric similarity between graph nodes, keyed by node id.
///
/// Implementations must tolerate concurrent calls to [`score`](Self::score) from
/// multiple threads: a [`ConcurrentNeighborSet`](crate::ConcurrentNeighborSet) may
/// call it from within any of its CAS-retry loops at any time. The function
/// returned by [`score_provider`](Self::score_provider), by contrast, is used
/// single-threaded within one pruning pass and may hold state bound to its anchor.
pub trait Similarity: Send + Sync {
    /// Computes the similarity between two node ids. Larger means more similar.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying vector for either node cannot be
    /// loaded or scored (e.g. a failed disk read). The caller's in-flight
    /// mutation is aborted and its snapshot left unchanged.
    fn score(&self, a: NodeId, b: NodeId) -> Result<f32>;

    /// Returns a scorer bound to anchor `a`, letting implementations load the
    /// anchor's state once and reuse it across many calls to the returned
    /// closure. The default implementation just calls [`score`](Self::score)
    /// on every invocation; override when anchor state is expensive to load.
    fn score_provider<'a>(&'a self, a: NodeId) -> Box<dyn FnMut(NodeId) -> Result<f32> + 'a> {
        Box::new(move |b| self.score(a, b))
    }
}
