//! Seeded random graphs for tests, demos and benchmarks.

use std::ops::Range;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::graph::Edge;

/// About `n * avg_degree` directed edges with uniform endpoints and weights drawn from
/// `weights`. Self-loops are skipped, parallel edges are allowed.
pub fn random_graph(n: usize, avg_degree: f32, weights: Range<f32>, seed: u64) -> Vec<Edge> {
    let mut rng = SmallRng::seed_from_u64(seed);
    let m_est = (n as f32 * avg_degree.max(0.0)) as usize;
    let mut edges = Vec::with_capacity(m_est);
    if n < 2 {
        return edges;
    }
    for _ in 0..m_est {
        let u = rng.gen_range(0..n as u32);
        let v = rng.gen_range(0..n as u32);
        if u == v { continue; }
        let w = if weights.is_empty() { weights.start } else { rng.gen_range(weights.clone()) };
        edges.push(Edge::new(u, v, w));
    }
    edges
}

/// Integer-valued weights in `1..=max_weight`, handy where exact float comparison is wanted.
pub fn random_integer_graph(n: usize, avg_degree: f32, max_weight: u32, seed: u64) -> Vec<Edge> {
    let mut rng = SmallRng::seed_from_u64(seed);
    random_graph(n, avg_degree, 0.0..1.0, seed)
        .into_iter()
        .map(|e| Edge::new(e.source, e.target, rng.gen_range(1..=max_weight.max(1)) as f32))
        .collect()
}
