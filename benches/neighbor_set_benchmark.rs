//! Neighbor set performance benchmarks.
//!
//! Run with: `cargo bench --bench neighbor_set_benchmark`

use std::sync::Arc;

use concurrent_neighbors::{ConcurrentNeighborSet, NeighborArray, NodeId, Result, Similarity};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

/// A dense similarity table over `n` synthetic nodes, seeded deterministically
/// so every benchmark iteration sees the same pairwise scores.
struct DenseSimilarity {
    scores: Vec<f32>,
    n: usize,
}

impl DenseSimilarity {
    fn new(n: usize) -> Self {
        let mut scores = vec![0.0; n * n];
        for a in 0..n {
            for b in 0..n {
                scores[a * n + b] = if a == b {
                    1.0
                } else {
                    let seed = (a * 2_654_435_761 + b) as f32;
                    ((seed * 0.618_034).sin() + 1.0) / 2.0
                };
            }
        }
        Self { scores, n }
    }
}

impl Similarity for DenseSimilarity {
    fn score(&self, a: NodeId, b: NodeId) -> Result<f32> {
        Ok(self.scores[a as usize * self.n + b as usize])
    }
}

/// Benchmark plain (non-diverse) insertion at realistic `max_connections` values.
fn bench_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("neighbor_set_insert");

    for &m in &[16usize, 32, 64] {
        let n = m * 8;
        let sim = Arc::new(DenseSimilarity::new(n + 1));
        group.throughput(Throughput::Elements(n as u64));

        group.bench_with_input(BenchmarkId::new("max_connections", m), &m, |b, &m| {
            b.iter(|| {
                let set = ConcurrentNeighborSet::new(0, m, Arc::clone(&sim), 1.0).unwrap();
                for i in 0..n {
                    let score = sim.score(0, (i + 1) as NodeId).unwrap();
                    set.insert((i + 1) as NodeId, score).unwrap();
                }
                black_box(set.size())
            });
        });
    }

    group.finish();
}

/// Benchmark `insert_diverse` (alpha-ladder selection + strict prune) at
/// realistic `max_connections` values.
fn bench_insert_diverse(c: &mut Criterion) {
    let mut group = c.benchmark_group("neighbor_set_insert_diverse");

    for &m in &[16usize, 32, 64] {
        let n = m * 4;
        let sim = Arc::new(DenseSimilarity::new(n + 1));

        let mut candidates = NeighborArray::new(n, true);
        let mut scored: Vec<(NodeId, f32)> = (0..n)
            .map(|i| ((i + 1) as NodeId, sim.score(0, (i + 1) as NodeId).unwrap()))
            .collect();
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap());
        for (node, score) in scored {
            candidates.add_in_order(node, score).unwrap();
        }

        group.throughput(Throughput::Elements(n as u64));
        group.bench_with_input(BenchmarkId::new("max_connections", m), &m, |b, &m| {
            b.iter(|| {
                let set = ConcurrentNeighborSet::new(0, m, Arc::clone(&sim), 1.4).unwrap();
                set.insert_diverse(&candidates).unwrap();
                black_box(set.size())
            });
        });
    }

    group.finish();
}

/// Benchmark repeated cap enforcement once a set is already saturated.
fn bench_enforce_max_conn_limit(c: &mut Criterion) {
    let mut group = c.benchmark_group("neighbor_set_enforce_cap");

    for &m in &[16usize, 32, 64] {
        let sim = Arc::new(DenseSimilarity::new(m + 2));
        let set = ConcurrentNeighborSet::new(0, m, Arc::clone(&sim), 1.0).unwrap();
        for i in 0..m {
            let score = sim.score(0, (i + 1) as NodeId).unwrap();
            set.insert((i + 1) as NodeId, score).unwrap();
        }

        group.bench_with_input(BenchmarkId::new("max_connections", m), &m, |b, _| {
            b.iter(|| {
                let score = sim.score(0, (m + 1) as NodeId).unwrap();
                set.insert((m + 1) as NodeId, score).unwrap();
                black_box(set.size())
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_insert, bench_insert_diverse, bench_enforce_max_conn_limit);
criterion_main!(benches);
