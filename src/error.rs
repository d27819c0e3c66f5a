//! Error types for the concurrent neighbor set.
//!
//! A single crate-wide error enum covers both programming errors (self-loops,
//! order violations, bad construction parameters: assertion-level bugs in the
//! calling builder) and propagated failures from the caller-supplied similarity
//! provider.

use thiserror::Error;

use crate::NodeId;

/// Result type alias for operations on a [`ConcurrentNeighborSet`](crate::ConcurrentNeighborSet).
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building or mutating a neighbor set.
#[derive(Error, Debug)]
pub enum Error {
    /// A node was inserted as its own neighbor. Indicates a builder bug.
    #[error("[NBR-001] node {0} cannot be its own neighbor")]
    SelfLoop(NodeId),

    /// `add_in_order` would have broken the array's configured ordering.
    #[error("[NBR-002] score {score} breaks ordering (descending={descending}, last={last})")]
    OrderViolation {
        /// The score that was rejected.
        score: f32,
        /// The score already at the tail of the array.
        last: f32,
        /// Whether the array orders entries in descending score order.
        descending: bool,
    },

    /// Construction-time validation failed (e.g. `alpha < 1.0`, `max_connections == 0`).
    #[error("[NBR-003] invalid configuration: {0}")]
    InvalidConfig(String),

    /// The similarity provider failed (e.g. the backing vector could not be read).
    /// The snapshot being built is discarded unmodified: the CAS step is never reached.
    #[error("[NBR-004] similarity provider failed")]
    SimilarityFailure(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
    /// Returns a short, stable machine-readable error code for log correlation.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::SelfLoop(_) => "NBR-001",
            Self::OrderViolation { .. } => "NBR-002",
            Self::InvalidConfig(_) => "NBR-003",
            Self::SimilarityFailure(_) => "NBR-004",
        }
    }
}
