//! The concurrent per-node adjacency structure: insertion, diversity pruning,
//! and size enforcement under compare-and-swap retry.

use crate::concurrent_neighbor_array::ConcurrentNeighborArray;
use crate::error::{Error, Result};
use crate::neighbor_array::NeighborArray;
use crate::score_cache::ScoreCache;
use crate::similarity::Similarity;
use crate::sync::{Arc, Snapshot};
use crate::NodeId;

/// The alpha-sweep step used by [`ConcurrentNeighborSet::insert_diverse`].
const ALPHA_STEP: f32 = 0.2;
/// Float slop tolerated when comparing the integer-stepped alpha ladder
/// against the set's configured `alpha`, to dodge the cumulative rounding
/// error a floating accumulator would otherwise pick up at the loop bound.
const ALPHA_EPSILON: f32 = 1e-4;

/// The bounded, diversity-pruned neighbor list of one graph node.
///
/// Holds one immutable [`ConcurrentNeighborArray`] snapshot behind an atomic
/// reference. Every mutator reads the current snapshot, computes a successor
/// from it, and attempts to publish the successor with a compare-and-swap;
/// on a lost race it retries from the (now current) snapshot. This makes
/// [`ConcurrentNeighborSet`] obstruction-free and every transition
/// linearizable, without ever blocking a reader.
pub struct ConcurrentNeighborSet<S: Similarity> {
    node_id: NodeId,
    max_connections: usize,
    alpha: f32,
    similarity: Arc<S>,
    snapshot: Snapshot<ConcurrentNeighborArray>,
}

impl<S: Similarity> ConcurrentNeighborSet<S> {
    /// Creates an empty neighbor set for `node_id`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if `alpha < 1.0` or `max_connections == 0`.
    /// These are checked once here rather than on every mutating call.
    pub fn new(node_id: NodeId, max_connections: usize, similarity: Arc<S>, alpha: f32) -> Result<Self> {
        if max_connections == 0 {
            return Err(Error::InvalidConfig("max_connections must be >= 1".into()));
        }
        if !(alpha >= 1.0) {
            return Err(Error::InvalidConfig(format!("alpha must be >= 1.0, got {alpha}")));
        }
        Ok(Self {
            node_id,
            max_connections,
            alpha,
            similarity,
            snapshot: Snapshot::new(Arc::new(ConcurrentNeighborArray::new(max_connections, true))),
        })
    }

    /// The node this set belongs to.
    #[must_use]
    pub const fn node_id(&self) -> NodeId {
        self.node_id
    }

    /// The configured upper bound on neighbor count.
    #[must_use]
    pub const fn max_connections(&self) -> usize {
        self.max_connections
    }

    /// The configured diversity relaxation parameter.
    #[must_use]
    pub const fn alpha(&self) -> f32 {
        self.alpha
    }

    /// Current neighbor count.
    #[must_use]
    pub fn size(&self) -> usize {
        self.snapshot.load().size()
    }

    /// Capacity of the backing snapshot's arrays. Test/diagnostic only.
    #[must_use]
    pub fn array_length(&self) -> usize {
        self.snapshot.load().capacity()
    }

    /// Whether `node` currently appears in the neighbor list. Linear;
    /// intended for tests and diagnostics, not the hot path.
    #[must_use]
    pub fn contains(&self, node: NodeId) -> bool {
        self.snapshot.load().contains_node(node)
    }

    /// Returns the current snapshot.
    #[must_use]
    pub fn get_current(&self) -> Arc<ConcurrentNeighborArray> {
        self.snapshot.load()
    }

    /// Iterator over the node ids in the current snapshot, best-to-worst.
    pub fn node_iterator(&self) -> impl Iterator<Item = NodeId> {
        let snap = self.snapshot.load();
        (0..snap.size()).map(move |i| snap.node(i))
    }

    /// Returns a new set sharing the current snapshot (copy-on-next-write): a
    /// mutation on the copy starts its own CAS loop from this snapshot and
    /// never touches `self`'s slot.
    #[must_use]
    pub fn copy(&self) -> Self {
        Self {
            node_id: self.node_id,
            max_connections: self.max_connections,
            alpha: self.alpha,
            similarity: Arc::clone(&self.similarity),
            snapshot: Snapshot::new(self.snapshot.load()),
        }
    }

    /// Inserts `(neighbor_id, score)`, enforcing the size limit with the
    /// strict `alpha = 1.0` RNG rule (the spec's default for this operation,
    /// independent of the set's own configured `alpha`). Use
    /// [`insert_with_alpha`](Self::insert_with_alpha) to enforce with a
    /// different value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SelfLoop`] if `neighbor_id == self.node_id()`, or
    /// propagates a [`Error::SimilarityFailure`] raised while enforcing the
    /// size limit.
    pub fn insert(&self, neighbor_id: NodeId, score: f32) -> Result<()> {
        self.insert_with_alpha(neighbor_id, score, 1.0)
    }

    /// Inserts `(neighbor_id, score)`, enforcing the size limit with the given
    /// `alpha` instead of the set's configured one.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SelfLoop`] if `neighbor_id == self.node_id()`.
    pub fn insert_with_alpha(&self, neighbor_id: NodeId, score: f32, alpha: f32) -> Result<()> {
        if neighbor_id == self.node_id {
            return Err(Error::SelfLoop(neighbor_id));
        }
        let mut attempt: u32 = 0;
        loop {
            let current = self.snapshot.load();
            let mut next = (*current).copy();
            next.insert_sorted(neighbor_id, score);
            self.enforce_max_conn_limit(&mut next, alpha, None)?;
            let next = Arc::new(next);
            if self.snapshot.compare_and_swap(&current, Arc::clone(&next)) {
                return Ok(());
            }
            attempt += 1;
            tracing::trace!(
                node_id = self.node_id,
                neighbor_id,
                attempt,
                "lost CAS race on insert, retrying"
            );
        }
    }

    /// Selects a diverse subset of `candidates` (see the module-level docs on
    /// [`is_diverse`](Self::is_diverse)) and splices it into the current
    /// snapshot with one CAS update, followed by a final, strict
    /// (`alpha = 1.0`) size enforcement pass.
    ///
    /// `candidates` must already be sorted in descending score order.
    ///
    /// # Errors
    ///
    /// Propagates [`Error::SimilarityFailure`] raised while scoring candidates
    /// or enforcing the size limit.
    pub fn insert_diverse(&self, candidates: &NeighborArray) -> Result<()> {
        let selected = self.select_diverse(candidates)?;
        let mut attempt: u32 = 0;
        loop {
            let current = self.snapshot.load();
            let mut next = (*current).copy();
            for &(node, score) in &selected {
                next.insert_sorted(node, score);
            }
            let mut cache = ScoreCache::new();
            self.enforce_max_conn_limit(&mut next, 1.0, Some(&mut cache))?;
            let next = Arc::new(next);
            if self.snapshot.compare_and_swap(&current, Arc::clone(&next)) {
                return Ok(());
            }
            attempt += 1;
            tracing::trace!(
                node_id = self.node_id,
                attempt,
                "lost CAS race on insertDiverse, retrying"
            );
        }
    }

    /// For each `(neighbor, score)` currently in the snapshot, installs the
    /// reverse edge on `neighborhood_of(neighbor)`. Each child insert is
    /// independently atomic; no ordering across neighbors is guaranteed, and
    /// this may interleave freely with unrelated inserts into their sets.
    ///
    /// # Errors
    ///
    /// Stops and returns the first error raised by a child `insert`.
    pub fn backlink<'a, F>(&self, mut neighborhood_of: F) -> Result<()>
    where
        F: FnMut(NodeId) -> &'a ConcurrentNeighborSet<S>,
        S: 'a,
    {
        let snap = self.snapshot.load();
        for i in 0..snap.size() {
            let (nbr, score) = (snap.node(i), snap.score(i));
            neighborhood_of(nbr).insert(self.node_id, score)?;
        }
        Ok(())
    }

    /// Runs the alpha-relaxed diversity sweep over `candidates` (worst to
    /// best, alpha stepping from `1.0` to `self.alpha` in `0.2` increments)
    /// and returns the accepted subset, in the same relative (descending)
    /// order as `candidates`.
    ///
    /// A candidate `c` is accepted with respect to the already-accepted set
    /// `S` under relaxation `a` iff `similarity(c, e) <= score(c) * a` for
    /// every `e` in `S`: the alpha-relaxed RNG rule. `alpha = 1.0` is the
    /// strict Relative Neighborhood Graph rule HNSW navigability depends on;
    /// the ladder only relaxes it as far as needed to reach `max_connections`.
    ///
    /// Each sweep always tests every not-yet-selected candidate to
    /// completion: it does not stop the instant `max_connections` entries
    /// are selected. The ladder itself stops advancing once a sweep leaves
    /// *more than* `max_connections` entries selected; the resulting
    /// over-selection is intentional slack, trimmed back down to exactly
    /// `max_connections` by the strict (`alpha = 1.0`) final
    /// `enforce_max_conn_limit` pass in [`insert_diverse`](Self::insert_diverse).
    /// See the design notes for why `>` rather than `>=` gates the ladder.
    fn select_diverse(&self, candidates: &NeighborArray) -> Result<Vec<(NodeId, f32)>> {
        let n = candidates.size();
        if n == 0 {
            return Ok(Vec::new());
        }
        let mut selected = vec![false; n];
        let mut selected_ids: Vec<NodeId> = Vec::new();
        let mut selected_count = 0usize;
        let mut cache = ScoreCache::new();

        let mut k: u32 = 0;
        loop {
            let a = 1.0_f32 + ALPHA_STEP * k as f32;
            if a > self.alpha + ALPHA_EPSILON {
                break;
            }
            for i in (0..n).rev() {
                if selected[i] {
                    continue;
                }
                let c_id = candidates.node(i);
                let c_score = candidates.score(i);
                if self.is_diverse(c_id, c_score, &selected_ids, a, &mut cache)? {
                    selected[i] = true;
                    selected_ids.push(c_id);
                    selected_count += 1;
                }
            }
            tracing::debug!(
                node_id = self.node_id,
                alpha = a,
                selected_count,
                "insertDiverse sweep finished"
            );
            if selected_count > self.max_connections {
                break;
            }
            k += 1;
        }

        let mut out = Vec::with_capacity(selected_count);
        for i in 0..n {
            if selected[i] {
                out.push((candidates.node(i), candidates.score(i)));
            }
        }
        Ok(out)
    }

    /// Whether candidate `c_id` (at distance `c_score` from this set's node)
    /// is diverse with respect to the already-accepted `selected` under
    /// relaxation `alpha`: no accepted neighbor may be strictly closer to `c`
    /// than `c` is to the base, scaled by `alpha`.
    ///
    /// A candidate list is expected injective; if `c_id` itself appears in
    /// `selected` (it was already chosen in an earlier sweep) that entry is
    /// skipped rather than disqualifying the candidate: see the open
    /// question in the design notes about this case.
    fn is_diverse(
        &self,
        c_id: NodeId,
        c_score: f32,
        selected: &[NodeId],
        alpha: f32,
        cache: &mut ScoreCache,
    ) -> Result<bool> {
        for &e_id in selected {
            if e_id == c_id {
                continue;
            }
            let sim = cache.get(c_id, e_id, |other| self.similarity.score(c_id, other))?;
            if sim > c_score * alpha {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Drops entries from `arr` until its size is at most `max_connections`,
    /// removing the least-diverse entry one at a time.
    fn enforce_max_conn_limit(
        &self,
        arr: &mut ConcurrentNeighborArray,
        alpha: f32,
        mut cache: Option<&mut ScoreCache>,
    ) -> Result<()> {
        while arr.size() > self.max_connections {
            self.remove_least_diverse(arr, alpha, cache.as_mut().map(|c| &mut **c))?;
        }
        Ok(())
    }

    /// Walks `arr` worst-to-best looking for an entry dominated by some
    /// better entry (i.e. not diverse), and removes the first one found. If
    /// every entry is diverse with respect to every better entry, falls back
    /// to removing the single farthest entry.
    fn remove_least_diverse(
        &self,
        arr: &mut ConcurrentNeighborArray,
        alpha: f32,
        mut cache: Option<&mut ScoreCache>,
    ) -> Result<()> {
        let size = arr.size();
        for i in (1..size).rev() {
            let e1_id = arr.node(i);
            let s1 = arr.score(i);
            for j in (0..i).rev() {
                let e2_id = arr.node(j);
                let sim = match cache.as_mut() {
                    Some(c) => c.get(e1_id, e2_id, |other| self.similarity.score(e1_id, other))?,
                    None => self.similarity.score(e1_id, e2_id)?,
                };
                if sim > s1 * alpha {
                    arr.remove_index(i);
                    return Ok(());
                }
            }
        }
        tracing::debug!(
            node_id = self.node_id,
            size,
            "enforceMaxConnLimit found no dominated entry, falling back to farthest removal"
        );
        arr.remove_index(arr.size() - 1);
        Ok(())
    }

    /// Merges two descending-score candidate arrays into their set-union,
    /// dropping pairs with an equal `(node id, score)` as duplicates.
    ///
    /// Implemented as a direct descending two-pointer merge: the historical
    /// build-ascending-then-reverse approach this was distilled from is
    /// explicitly not reproduced here. Equal scores emit the `a1` entry
    /// first; if the next `a2` entry shares that entry's node id, it is
    /// skipped as a duplicate. Once one side is exhausted, the first entry
    /// drained from the other side is skipped if its node id matches the
    /// most recently emitted entry from the exhausted side.
    #[must_use]
    pub fn merge_candidates(a1: &NeighborArray, a2: &NeighborArray) -> NeighborArray {
        debug_assert!(a1.descending() && a2.descending());
        let mut out = NeighborArray::new(a1.size() + a2.size(), true);
        let (n1, n2) = (a1.size(), a2.size());
        let (mut i, mut j) = (0usize, 0usize);
        let mut boundary_from_a1: Option<NodeId> = None;
        let mut boundary_from_a2: Option<NodeId> = None;

        while i < n1 && j < n2 {
            let (id1, s1) = (a1.node(i), a1.score(i));
            let (id2, s2) = (a2.node(j), a2.score(j));
            match s1.partial_cmp(&s2).unwrap_or(std::cmp::Ordering::Equal) {
                std::cmp::Ordering::Greater => {
                    out.add_in_order(id1, s1).expect("descending merge stays ordered");
                    boundary_from_a1 = Some(id1);
                    i += 1;
                }
                std::cmp::Ordering::Less => {
                    out.add_in_order(id2, s2).expect("descending merge stays ordered");
                    boundary_from_a2 = Some(id2);
                    j += 1;
                }
                std::cmp::Ordering::Equal => {
                    out.add_in_order(id1, s1).expect("descending merge stays ordered");
                    boundary_from_a1 = Some(id1);
                    i += 1;
                    if j < n2 && a2.node(j) == id1 {
                        j += 1;
                    }
                }
            }
        }

        while i < n1 {
            let (id1, s1) = (a1.node(i), a1.score(i));
            if boundary_from_a2.take() != Some(id1) {
                out.add_in_order(id1, s1).expect("descending merge stays ordered");
            }
            i += 1;
        }
        while j < n2 {
            let (id2, s2) = (a2.node(j), a2.score(j));
            if boundary_from_a1.take() != Some(id2) {
                out.add_in_order(id2, s2).expect("descending merge stays ordered");
            }
            j += 1;
        }

        out
    }
}

#[cfg(test)]
#[path = "neighbor_set_tests.rs"]
mod tests;
