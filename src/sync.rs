//! Synchronization primitives with loom support for concurrency testing.
//!
//! Production builds back every [`ConcurrentNeighborSet`](crate::ConcurrentNeighborSet)
//! snapshot slot with `arc-swap`'s lock-free `ArcSwap`. Under the `loom` feature the same
//! call sites run against a loom-aware stand-in instead, so `cargo test --features loom`
//! can exhaustively check every thread interleaving of the retry loop in
//! [`Snapshot::compare_and_swap`].
//!
//! # Testing with Loom
//!
//! ```bash
//! cargo +nightly test --features loom --test loom_cas
//! ```

#[cfg(not(loom))]
pub use std::sync::Arc;

#[cfg(loom)]
pub use loom::sync::Arc;

/// A single mutable slot holding an immutable `Arc<T>`, updated only via
/// compare-and-swap. Readers call [`Snapshot::load`] and never block; writers
/// retry [`Snapshot::compare_and_swap`] until it succeeds.
#[cfg(not(loom))]
pub struct Snapshot<T>(arc_swap::ArcSwap<T>);

#[cfg(not(loom))]
impl<T> Snapshot<T> {
    /// Publishes `value` as the initial snapshot.
    pub fn new(value: Arc<T>) -> Self {
        Self(arc_swap::ArcSwap::new(value))
    }

    /// Returns the currently published snapshot.
    pub fn load(&self) -> Arc<T> {
        self.0.load_full()
    }

    /// Publishes `new` iff the slot still holds `current`. Returns whether the
    /// swap succeeded; on failure the caller should reload and retry.
    pub fn compare_and_swap(&self, current: &Arc<T>, new: Arc<T>) -> bool {
        let prev = self.0.compare_and_swap(current, new);
        Arc::ptr_eq(&prev, current)
    }
}

/// Loom cannot instrument `arc-swap`'s internals, so under the `loom` feature the
/// slot is a loom `Mutex` guard exposing the identical `load`/`compare_and_swap`
/// surface. This keeps every call site in the crate unchanged between the two
/// builds: loom explores interleavings around the critical section instead of a
/// lock-free retry, which is sufficient to check that no update is ever lost.
#[cfg(loom)]
pub struct Snapshot<T>(loom::sync::Mutex<Arc<T>>);

#[cfg(loom)]
impl<T> Snapshot<T> {
    pub fn new(value: Arc<T>) -> Self {
        Self(loom::sync::Mutex::new(value))
    }

    pub fn load(&self) -> Arc<T> {
        Arc::clone(&self.0.lock().unwrap())
    }

    pub fn compare_and_swap(&self, current: &Arc<T>, new: Arc<T>) -> bool {
        let mut guard = self.0.lock().unwrap();
        if Arc::ptr_eq(&guard, current) {
            *guard = new;
            true
        } else {
            false
        }
    }
}
