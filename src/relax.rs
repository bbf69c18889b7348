//! Batched edge relaxation. A batch fans out one task per frontier vertex over the executor and
//! joins before returning; the only shared writes are `DistanceTable::try_relax` calls.

use std::sync::Arc;

use rayon::prelude::*;

use crate::distance::DistanceTable;
use crate::error::Result;
use crate::graph::GraphStore;
use crate::observer::{Event, Observer};

/// Parallel-for backend the core runs on.
#[derive(Clone, Default)]
pub enum Executor {
    /// Plain loops on the calling thread.
    Sequential,
    /// rayon's global pool.
    #[default]
    Global,
    Pool(Arc<rayon::ThreadPool>),
}

impl std::fmt::Debug for Executor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Executor::Sequential => f.write_str("Sequential"),
            Executor::Global => f.write_str("Global"),
            Executor::Pool(p) => write!(f, "Pool({} threads)", p.current_num_threads()),
        }
    }
}

impl Executor {
    /// `1` gives the sequential executor, anything larger a dedicated pool of that size.
    pub fn with_threads(threads: usize) -> Result<Self> {
        if threads <= 1 {
            return Ok(Executor::Sequential);
        }
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("delta-sssp-{i}"))
            .build()?;
        Ok(Executor::Pool(Arc::new(pool)))
    }

    pub fn threads(&self) -> usize {
        match self {
            Executor::Sequential => 1,
            Executor::Global => rayon::current_num_threads(),
            Executor::Pool(p) => p.current_num_threads(),
        }
    }

    /// Run `f` once per item (in any order, possibly concurrently) letting each call append to a
    /// per-worker accumulator; the accumulators are merged after the join.
    pub fn fold_collect<T, F>(&self, items: &[u32], f: F) -> Batch<T>
    where
        T: Send,
        F: Fn(u32, &mut Batch<T>) + Sync + Send,
    {
        let par = || {
            items
                .par_iter()
                .fold(Batch::default, |mut acc, &u| { f(u, &mut acc); acc })
                .reduce(Batch::default, Batch::merge)
        };
        match self {
            Executor::Sequential => {
                let mut acc = Batch::default();
                for &u in items { f(u, &mut acc); }
                acc
            }
            Executor::Global => par(),
            Executor::Pool(p) => p.install(par),
        }
    }

    pub fn for_each<F>(&self, items: &[u32], f: F)
    where
        F: Fn(u32) + Sync + Send,
    {
        match self {
            Executor::Sequential => items.iter().for_each(|&u| f(u)),
            Executor::Global => items.par_iter().for_each(|&u| f(u)),
            Executor::Pool(p) => p.install(|| items.par_iter().for_each(|&u| f(u))),
        }
    }
}

/// Per-worker output of a relaxation batch.
#[derive(Debug)]
pub struct Batch<T> {
    pub items: Vec<T>,
    pub attempts: u64,
}

impl<T> Default for Batch<T> {
    fn default() -> Self { Self { items: Vec::new(), attempts: 0 } }
}

impl<T> Batch<T> {
    fn merge(mut self, mut other: Self) -> Self {
        if self.items.len() < other.items.len() { std::mem::swap(&mut self.items, &mut other.items); }
        self.items.append(&mut other.items);
        self.attempts += other.attempts;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeClass { Light, Heavy }

/// Result of one `relax_light`/`relax_heavy` call.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Relaxation {
    /// Vertices whose distance dropped, sorted and deduplicated.
    pub changed: Vec<u32>,
    /// Successful `try_relax` calls (a vertex may be lowered more than once per batch).
    pub improvements: u64,
    /// Edges examined.
    pub attempts: u64,
}

pub struct RelaxationEngine<'a> {
    graph: &'a GraphStore,
    distances: &'a DistanceTable,
    executor: &'a Executor,
    observer: &'a dyn Observer,
}

impl<'a> RelaxationEngine<'a> {
    pub fn new(graph: &'a GraphStore, distances: &'a DistanceTable, executor: &'a Executor, observer: &'a dyn Observer) -> Self {
        Self { graph, distances, executor, observer }
    }

    /// Relax every light out-edge of every vertex in `frontier`.
    pub fn relax_light(&self, frontier: &[u32]) -> Relaxation {
        self.relax(frontier, EdgeClass::Light)
    }

    /// Relax every heavy out-edge of every vertex in `frontier`. Called once per bucket.
    pub fn relax_heavy(&self, frontier: &[u32]) -> Relaxation {
        self.relax(frontier, EdgeClass::Heavy)
    }

    fn relax(&self, frontier: &[u32], class: EdgeClass) -> Relaxation {
        let (graph, dist, observer) = (self.graph, self.distances, self.observer);
        let emit = observer.wants_edge_events();
        let batch = self.executor.fold_collect(frontier, |u, acc: &mut Batch<u32>| {
            let base = dist.get(u);
            if !base.is_finite() {
                return;
            }
            let mut visit = |(v, w): (u32, f32)| {
                acc.attempts += 1;
                let nd = base + w;
                if dist.try_relax(v, nd, u) {
                    acc.items.push(v);
                    if emit { observer.on_event(&Event::EdgeRelaxed { from: u, to: v, new_distance: nd }); }
                }
            };
            match class {
                EdgeClass::Light => graph.light_edges_of(u).for_each(&mut visit),
                EdgeClass::Heavy => graph.heavy_edges_of(u).for_each(&mut visit),
            }
        });
        let improvements = batch.items.len() as u64;
        let mut changed = batch.items;
        changed.sort_unstable();
        changed.dedup();
        tracing::trace!(?class, frontier = frontier.len(), improvements, changed = changed.len(), "relaxation batch");
        Relaxation { changed, improvements, attempts: batch.attempts }
    }
}
