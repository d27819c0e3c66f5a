//! # Concurrent neighbor sets
//!
//! The per-node adjacency structure of an HNSW graph: a bounded, score-sorted
//! neighbor list per node, safe for concurrent mutation from multiple index
//! builder threads, that enforces the alpha-relaxed diversity rule HNSW
//! navigability depends on.
//!
//! This crate is deliberately narrow. It does not select layers, track entry
//! points, run beam search, store vectors, or persist anything: it is the
//! hard, concurrency- and geometry-sensitive core that a higher-level HNSW
//! builder calls into on every edge insertion, supplying its own
//! [`Similarity`] provider for the actual vector comparisons.
//!
//! ## Quick start
//!
//! ```
//! use std::sync::Arc;
//! use concurrent_neighbors::{ConcurrentNeighborSet, NodeId, Similarity};
//!
//! struct TableSimilarity(Vec<Vec<f32>>);
//!
//! impl Similarity for TableSimilarity {
//!     fn score(&self, a: NodeId, b: NodeId) -> concurrent_neighbors::Result<f32> {
//!         Ok(self.0[a as usize][b as usize])
//!     }
//! }
//!
//! # fn main() -> concurrent_neighbors::Result<()> {
//! let sim = Arc::new(TableSimilarity(vec![
//!     vec![1.0, 0.9, 0.8],
//!     vec![0.9, 1.0, 0.5],
//!     vec![0.8, 0.5, 1.0],
//! ]));
//! let set = ConcurrentNeighborSet::new(0, 4, Arc::clone(&sim), 1.0)?;
//! set.insert(1, 0.9)?;
//! set.insert(2, 0.8)?;
//! assert_eq!(set.size(), 2);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

mod concurrent_neighbor_array;
mod error;
mod neighbor_array;
mod neighbor_set;
mod score_cache;
mod similarity;
mod sync;

pub use concurrent_neighbor_array::ConcurrentNeighborArray;
pub use error::{Error, Result};
pub use neighbor_array::NeighborArray;
pub use neighbor_set::ConcurrentNeighborSet;
pub use score_cache::ScoreCache;
pub use similarity::Similarity;

/// Identifier for a node in the graph.
///
/// A plain 32-bit integer, matching the node-id space of the HNSW builder
/// this crate is designed to sit underneath, rather than the `usize` this
/// codebase otherwise favors for in-process indices: the 32-bit width
/// follows the original data model exactly.
pub type NodeId = i32;
