//! Bucket-processing driver.
//!
//! One control thread walks buckets in increasing index order. For bucket `b` it drains and
//! relaxes light edges until a drain comes back empty, then relaxes the heavy edges of every
//! vertex drained along the way exactly once, then moves on. Buckets below the cursor are never
//! written again: light relaxations out of `b` land in `b` or later, heavy ones strictly later.
//! The one exception is [`TOP_BUCKET`], which absorbs every larger distance; it is reopened until
//! a heavy pass leaves it empty.

use serde::Serialize;

use crate::bucket::BucketStructure;
use crate::distance::DistanceTable;
use crate::error::{ConfigIssue, Result};
use crate::graph::{GraphStore, TOP_BUCKET};
use crate::observer::{Event, Observer, NOOP};
use crate::paths::ShortestPaths;
use crate::relax::{Executor, Relaxation, RelaxationEngine};

/// Counters for one run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RunStats {
    pub relaxations: u64,       // successful try_relax calls
    pub light_relaxations: u64,
    pub heavy_relaxations: u64,
    pub relax_attempts: u64,    // edges examined
    pub settled: u32,           // vertices settled, once per bucket
    pub buckets_visited: u32,   // non-empty buckets processed
    pub light_pass_repeats: u32, // drain iterations summed over buckets
    pub max_bucket_index: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    AwaitingBucket,
    SettlingLight(usize),
    RelaxingHeavy(usize),
    Done,
}

/// Builder for a run over one graph.
pub struct Solver<'a> {
    graph: &'a GraphStore,
    executor: Executor,
    observer: &'a dyn Observer,
}

impl<'a> Solver<'a> {
    pub fn new(graph: &'a GraphStore) -> Self {
        Self { graph, executor: Executor::default(), observer: &NOOP }
    }

    pub fn executor(mut self, executor: Executor) -> Self {
        self.executor = executor;
        self
    }

    pub fn observer(mut self, observer: &'a dyn Observer) -> Self {
        self.observer = observer;
        self
    }

    /// Validate `source` and seed the tables.
    pub fn scheduler(self, source: u32) -> Result<Scheduler<'a>> {
        let n = self.graph.vertex_count();
        if source as usize >= n {
            return Err(ConfigIssue::SourceOutOfRange { vertex: source as u64, vertex_count: n }.into());
        }
        let buckets = BucketStructure::new(n);
        buckets.insert(source, 0);
        Ok(Scheduler {
            graph: self.graph,
            executor: self.executor,
            observer: self.observer,
            source,
            distances: DistanceTable::new(n, source),
            buckets,
            phase: Phase::AwaitingBucket,
            cursor: 0,
            settled: Vec::new(),
            settled_mark: vec![0; n],
            stats: RunStats::default(),
        })
    }

    pub fn run(self, source: u32) -> Result<ShortestPaths> {
        Ok(self.scheduler(source)?.run())
    }
}

pub struct Scheduler<'a> {
    graph: &'a GraphStore,
    executor: Executor,
    observer: &'a dyn Observer,
    source: u32,
    distances: DistanceTable,
    buckets: BucketStructure,
    phase: Phase,
    cursor: usize,
    settled: Vec<u32>,
    settled_mark: Vec<u32>, // visit (`buckets_visited`) a vertex was last added to `settled` in
    stats: RunStats,
}

impl<'a> Scheduler<'a> {
    pub fn phase(&self) -> Phase { self.phase }
    pub fn distances(&self) -> &DistanceTable { &self.distances }
    pub fn buckets(&self) -> &BucketStructure { &self.buckets }
    pub fn stats(&self) -> &RunStats { &self.stats }

    /// Perform one state transition and return the phase entered.
    pub fn step(&mut self) -> Phase {
        self.phase = match self.phase {
            Phase::AwaitingBucket => match self.buckets.first_non_empty_from(self.cursor) {
                Some(b) => {
                    self.cursor = b;
                    self.stats.buckets_visited += 1;
                    tracing::trace!(bucket = b, size = self.buckets.len(b), "bucket opened");
                    self.observer.on_event(&Event::BucketOpened { index: b });
                    Phase::SettlingLight(b)
                }
                None => Phase::Done,
            },
            Phase::SettlingLight(b) => {
                self.settle_light(b);
                Phase::RelaxingHeavy(b)
            }
            Phase::RelaxingHeavy(b) => {
                self.relax_heavy(b);
                if b == TOP_BUCKET && !self.buckets.is_empty(b) {
                    self.cursor = b;
                } else {
                    self.buckets.retire_through(b);
                    self.cursor = b + 1;
                }
                Phase::AwaitingBucket
            }
            Phase::Done => Phase::Done,
        };
        self.phase
    }

    /// Drive to `Done` and hand back the distance table.
    pub fn run(mut self) -> ShortestPaths {
        let span = tracing::info_span!(
            "delta_stepping",
            vertices = self.graph.vertex_count(),
            edges = self.graph.edge_count(),
            delta = self.graph.delta(),
            source = self.source,
        );
        let _enter = span.enter();
        while self.step() != Phase::Done {}
        tracing::debug!(stats = ?self.stats, "delta stepping finished");
        let (distances, predecessors) = self.distances.into_parts();
        ShortestPaths::new(self.source, self.graph.delta(), distances, predecessors, self.stats)
    }

    // Phase 1: light edges to a fixed point
    fn settle_light(&mut self, b: usize) {
        loop {
            let frontier = self.buckets.remove_all(b);
            if frontier.is_empty() {
                break;
            }
            self.stats.light_pass_repeats += 1;
            let visit = self.stats.buckets_visited;
            for &v in &frontier {
                if self.settled_mark[v as usize] != visit {
                    self.settled_mark[v as usize] = visit;
                    self.settled.push(v);
                }
            }
            let r = RelaxationEngine::new(self.graph, &self.distances, &self.executor, self.observer).relax_light(&frontier);
            tracing::trace!(bucket = b, frontier = frontier.len(), changed = r.changed.len(), "light pass");
            self.stats.light_relaxations += r.improvements;
            self.rebucket(&r, b);
        }
    }

    // Phase 2: heavy edges once, then close the bucket
    fn relax_heavy(&mut self, b: usize) {
        let settled = std::mem::take(&mut self.settled);
        let r = RelaxationEngine::new(self.graph, &self.distances, &self.executor, self.observer).relax_heavy(&settled);
        self.stats.heavy_relaxations += r.improvements;
        self.rebucket(&r, (b + 1).min(TOP_BUCKET));
        self.stats.settled += settled.len() as u32;
        for &v in &settled {
            self.observer.on_event(&Event::VertexSettled { vertex: v, distance: self.distances.get(v), bucket: b });
        }
        self.observer.on_event(&Event::BucketClosed { index: b });
        tracing::trace!(bucket = b, settled = settled.len(), heavy_changed = r.changed.len(), "bucket closed");
        self.settled = settled;
        self.settled.clear();
    }

    /// File every changed vertex under its new bucket, never below `floor`.
    fn rebucket(&mut self, r: &Relaxation, floor: usize) {
        self.stats.relaxations += r.improvements;
        self.stats.relax_attempts += r.attempts;
        let (graph, dist, buckets) = (self.graph, &self.distances, &self.buckets);
        let top = r.changed.iter().map(|&v| graph.bucket_index(dist.get(v)).max(floor)).max();
        let Some(top) = top else { return };
        self.executor.for_each(&r.changed, |v| {
            buckets.insert(v, graph.bucket_index(dist.get(v)).max(floor));
        });
        self.stats.max_bucket_index = self.stats.max_bucket_index.max(top.min(u32::MAX as usize) as u32);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Edge;
    use crate::observer::RecordingObserver;

    fn letters() -> GraphStore {
        // A..G = 0..6
        let edges: Vec<Edge> = [(0, 1, 3.0), (0, 3, 5.0), (0, 6, 3.0), (0, 4, 3.0), (1, 2, 3.0), (2, 3, 1.0), (4, 5, 5.0)]
            .into_iter()
            .map(|(s, t, w)| Edge::new(s, t, w))
            .collect();
        GraphStore::new(7, &edges, 4.0).unwrap()
    }

    #[test]
    fn walks_the_state_machine() {
        let g = letters();
        let mut s = Solver::new(&g).executor(Executor::Sequential).scheduler(0).unwrap();
        assert_eq!(s.phase(), Phase::AwaitingBucket);
        assert_eq!(s.step(), Phase::SettlingLight(0));
        assert_eq!(s.step(), Phase::RelaxingHeavy(0));
        // light fixed point of bucket 0 reached B, E, G; C went to bucket 1
        assert_eq!(s.distances().get(1), 3.0);
        assert_eq!(s.buckets().bucket_of(2), Some(1));
        assert_eq!(s.step(), Phase::AwaitingBucket);
        assert_eq!(s.buckets().bucket_of(3), Some(1)); // D via heavy edge
        assert_eq!(s.buckets().bucket_of(5), Some(2)); // F via heavy edge
        assert_eq!(s.step(), Phase::SettlingLight(1));
        while s.step() != Phase::Done {}
        assert_eq!(s.step(), Phase::Done);
        let out = s.run();
        assert_eq!(out.distances(), &[0.0, 3.0, 6.0, 5.0, 3.0, 8.0, 3.0]);
        assert_eq!(out.stats.buckets_visited, 3);
        assert_eq!(out.stats.settled, 7);
        assert_eq!(out.stats.max_bucket_index, 2);
        assert_eq!(out.stats.relaxations, out.stats.light_relaxations + out.stats.heavy_relaxations);
    }

    #[test]
    fn closed_buckets_stay_empty() {
        let edges = crate::generate::random_graph(300, 5.0, 0.0..10.0, 5);
        let g = GraphStore::new(300, &edges, 1.5).unwrap();
        let mut s = Solver::new(&g).scheduler(0).unwrap();
        let mut closed: Vec<usize> = Vec::new();
        loop {
            let phase = s.step();
            for &b in &closed {
                assert!(s.buckets().is_empty(b), "bucket {b} refilled after closing");
            }
            match phase {
                Phase::AwaitingBucket => closed.push(s.cursor - 1),
                Phase::Done => break,
                _ => {}
            }
        }
    }

    #[test]
    fn events_bracket_each_bucket() {
        let g = letters();
        let obs = RecordingObserver::new();
        Solver::new(&g).executor(Executor::Sequential).observer(&obs).run(0).unwrap();
        let events = obs.events();
        let opened: Vec<usize> = events.iter().filter_map(|e| match e { Event::BucketOpened { index } => Some(*index), _ => None }).collect();
        let closed: Vec<usize> = events.iter().filter_map(|e| match e { Event::BucketClosed { index } => Some(*index), _ => None }).collect();
        assert_eq!(opened, vec![0, 1, 2]);
        assert_eq!(opened, closed);
        let settled = events.iter().filter(|e| matches!(e, Event::VertexSettled { .. })).count();
        assert_eq!(settled, 7);
        assert!(events.contains(&Event::VertexSettled { vertex: 5, distance: 8.0, bucket: 2 }));
    }

    #[test]
    fn setup_rejects_bad_source() {
        let g = letters();
        assert!(matches!(
            Solver::new(&g).run(7),
            Err(crate::SsspError::InvalidConfiguration(ConfigIssue::SourceOutOfRange { vertex: 7, .. }))
        ));
    }

    #[test]
    fn tiny_delta_spreads_over_millions_of_sparse_buckets() {
        let tiny = letters().with_delta(1e-6).unwrap();
        let mut s = Solver::new(&tiny).executor(Executor::Sequential).scheduler(0).unwrap();
        while s.step() != Phase::Done {
            assert!(s.buckets().capacity() <= 8);
        }
        let out = s.run();
        assert_eq!(out.distances(), &[0.0, 3.0, 6.0, 5.0, 3.0, 8.0, 3.0]);
        assert_eq!(out.stats.buckets_visited, 5);
    }

    #[test]
    fn distances_past_the_top_bucket_still_settle() {
        // everything beyond 1 is filed in TOP_BUCKET with delta 1e-30; 0 -> 2 -> 1 beats 0 -> 1
        let edges: Vec<Edge> = [(0, 1, 9e20), (0, 2, 1e20), (2, 1, 1e20), (1, 3, 5.0)]
            .into_iter()
            .map(|(s, t, w)| Edge::new(s, t, w))
            .collect();
        let g = GraphStore::new(4, &edges, 1e-30).unwrap();
        let expected = crate::baseline::dijkstra(&g, 0).unwrap();
        let out = Solver::new(&g).executor(Executor::Sequential).run(0).unwrap();
        assert_eq!(out.distances(), expected.distances());
        assert_eq!(out.predecessor(1), Some(2));
        assert_eq!(out.stats.max_bucket_index, u32::MAX);
    }
}
