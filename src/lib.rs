//! Parallel delta-stepping single-source shortest paths.
//!
//! Vertices are bucketed by `floor(dist / delta)`. Buckets are processed in increasing order:
//! light edges (`w <= delta`) are relaxed repeatedly until the bucket stops refilling, then heavy
//! edges (`w > delta`) of everything settled in it are relaxed once. Each relaxation batch fans
//! out over a rayon pool and joins before the scheduler looks at the result; the shared distance
//! table is updated with per-cell atomic min, never a lock.
//!
//! ```
//! use delta_sssp::{solve, Edge, SsspConfig};
//!
//! let edges = [Edge::new(0, 1, 4.0), Edge::new(1, 2, 1.0), Edge::new(0, 2, 7.0)];
//! let paths = solve(4, &edges, 0, &SsspConfig::with_delta(2.0)).unwrap();
//! assert_eq!(paths.distance(2), Some(5.0));
//! assert_eq!(paths.distance(3), None);
//! assert_eq!(paths.path_to(2), Some(vec![0, 1, 2]));
//! ```
//!
//! A C ABI (`sssp_run_delta_stepping`, `sssp_run_baseline`) is exported from [`ffi`].

pub mod baseline;
pub mod bucket;
pub mod config;
pub mod distance;
pub mod error;
pub mod ffi;
pub mod generate;
pub mod graph;
pub mod observer;
pub mod paths;
pub mod relax;
pub mod scheduler;

pub use baseline::dijkstra;
pub use bucket::BucketStructure;
pub use config::{DeltaChoice, SsspConfig};
pub use distance::DistanceTable;
pub use error::{ConfigIssue, GraphIssue, Result, SsspError};
pub use graph::{Edge, GraphStore, TOP_BUCKET};
pub use observer::{Event, NoopObserver, Observer, RecordingObserver, TracingObserver};
pub use paths::ShortestPaths;
pub use relax::{Executor, Relaxation, RelaxationEngine};
pub use scheduler::{Phase, RunStats, Scheduler, Solver};

/// Validate, pick delta per `config`, build the store and run from `source`.
pub fn solve(vertex_count: usize, edges: &[Edge], source: u32, config: &SsspConfig) -> Result<ShortestPaths> {
    solve_observed(vertex_count, edges, source, config, &observer::NOOP)
}

pub fn solve_observed(
    vertex_count: usize,
    edges: &[Edge],
    source: u32,
    config: &SsspConfig,
    observer: &dyn Observer,
) -> Result<ShortestPaths> {
    graph::validate_edges(vertex_count, edges)?;
    let delta = config.resolve_delta(edges)?;
    let graph = GraphStore::new(vertex_count, edges, delta)?;
    tracing::debug!(vertices = vertex_count, edges = edges.len(), delta, light = graph.light_edge_count(), "graph ready");
    Solver::new(&graph)
        .executor(config.executor()?)
        .observer(observer)
        .run(source)
}
