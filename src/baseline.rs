//! Sequential binary-heap Dijkstra over the same `GraphStore`; the oracle for parity checks.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use serde::Serialize;

use crate::error::{ConfigIssue, Result};
use crate::graph::GraphStore;
use crate::paths::ShortestPaths;
use crate::scheduler::RunStats;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HeapStats { pub pushes: u64, pub pops: u64, pub max_size: u64 }

#[derive(Copy, Clone, PartialEq)]
struct HeapItem { node: u32, dist: f32 }

impl Eq for HeapItem {}

// reversed so `BinaryHeap` pops the smallest distance first
impl Ord for HeapItem {
    fn cmp(&self, other: &Self) -> Ordering {
        other.dist.total_cmp(&self.dist).then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for HeapItem {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> { Some(self.cmp(other)) }
}

/// Lazy-deletion frontier: stale entries stay queued and are skipped on pop.
struct Frontier { heap: BinaryHeap<HeapItem>, stats: HeapStats }

impl Frontier {
    fn with_capacity(cap: usize) -> Self { Self { heap: BinaryHeap::with_capacity(cap), stats: HeapStats::default() } }

    fn push(&mut self, node: u32, dist: f32) {
        self.heap.push(HeapItem { node, dist });
        self.stats.pushes += 1;
        self.stats.max_size = self.stats.max_size.max(self.heap.len() as u64);
    }

    fn pop(&mut self) -> Option<HeapItem> {
        let item = self.heap.pop()?;
        self.stats.pops += 1;
        Some(item)
    }
}

/// Exact SSSP distances by Dijkstra. Uses every edge regardless of its light/heavy class.
pub fn dijkstra(graph: &GraphStore, source: u32) -> Result<ShortestPaths> {
    dijkstra_with_stats(graph, source).map(|(paths, _)| paths)
}

pub fn dijkstra_with_stats(graph: &GraphStore, source: u32) -> Result<(ShortestPaths, HeapStats)> {
    let n = graph.vertex_count();
    if source as usize >= n {
        return Err(ConfigIssue::SourceOutOfRange { vertex: source as u64, vertex_count: n }.into());
    }
    let mut dist = vec![f32::INFINITY; n];
    let mut pred: Vec<Option<u32>> = vec![None; n];
    let mut stats = RunStats::default();
    dist[source as usize] = 0.0;

    let mut heap = Frontier::with_capacity(n.min(1024));
    heap.push(source, 0.0);
    while let Some(item) = heap.pop() {
        if item.dist > dist[item.node as usize] { continue; }
        stats.settled += 1;
        for (v, w) in graph.edges_of(item.node) {
            stats.relax_attempts += 1;
            let nd = item.dist + w;
            if nd < dist[v as usize] {
                dist[v as usize] = nd;
                pred[v as usize] = Some(item.node);
                heap.push(v, nd);
                stats.relaxations += 1;
            }
        }
    }
    tracing::debug!(settled = stats.settled, relaxations = stats.relaxations, pushes = heap.stats.pushes, max_heap = heap.stats.max_size, "dijkstra finished");
    Ok((ShortestPaths::new(source, graph.delta(), dist, pred, stats), heap.stats))
}
