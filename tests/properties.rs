use std::collections::HashMap;

use delta_sssp::{dijkstra, Edge, Event, Executor, GraphStore, RecordingObserver, Solver};
use proptest::prelude::*;

// Integer weights keep every path sum exact in f32, so distances can be compared with ==.
fn graph() -> impl Strategy<Value = (usize, Vec<Edge>, u32)> {
    (1usize..40).prop_flat_map(|n| {
        let edge = (0..n as u32, 0..n as u32, 0u32..20).prop_map(|(s, t, w)| Edge::new(s, t, w as f32));
        (Just(n), prop::collection::vec(edge, 0..n * 4), 0..n as u32)
    })
}

fn delta() -> impl Strategy<Value = f32> {
    prop_oneof![Just(0.5f32), Just(1.0), Just(3.0), Just(7.5), 0.25f32..40.0]
}

fn executor(parallel: bool) -> Executor {
    if parallel { Executor::Global } else { Executor::Sequential }
}

fn reachable(n: usize, edges: &[Edge], source: u32) -> Vec<bool> {
    let mut adj = vec![Vec::new(); n];
    for e in edges { adj[e.source as usize].push(e.target); }
    let mut seen = vec![false; n];
    let mut stack = vec![source];
    seen[source as usize] = true;
    while let Some(u) = stack.pop() {
        for &v in &adj[u as usize] {
            if !seen[v as usize] { seen[v as usize] = true; stack.push(v); }
        }
    }
    seen
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn matches_dijkstra((n, edges, source) in graph(), d in delta(), parallel in any::<bool>()) {
        let g = GraphStore::new(n, &edges, d).unwrap();
        let expected = dijkstra(&g, source).unwrap();
        let got = Solver::new(&g).executor(executor(parallel)).run(source).unwrap();
        prop_assert_eq!(got.distances(), expected.distances());
    }

    #[test]
    fn delta_does_not_change_distances((n, edges, source) in graph(), d1 in delta(), d2 in delta()) {
        let a = Solver::new(&GraphStore::new(n, &edges, d1).unwrap()).run(source).unwrap();
        let b = Solver::new(&GraphStore::new(n, &edges, d2).unwrap()).run(source).unwrap();
        prop_assert_eq!(a.distances(), b.distances());
    }

    #[test]
    fn reruns_are_identical((n, edges, source) in graph(), d in delta()) {
        let g = GraphStore::new(n, &edges, d).unwrap();
        let a = Solver::new(&g).run(source).unwrap();
        let b = Solver::new(&g).run(source).unwrap();
        prop_assert_eq!(a.distances(), b.distances());
    }

    #[test]
    fn unreachable_vertices_report_no_distance((n, edges, source) in graph(), d in delta()) {
        let g = GraphStore::new(n, &edges, d).unwrap();
        let p = Solver::new(&g).run(source).unwrap();
        let seen = reachable(n, &edges, source);
        for v in 0..n as u32 {
            prop_assert_eq!(p.distance(v).is_some(), seen[v as usize]);
        }
    }

    #[test]
    fn assigned_distances_only_decrease((n, edges, source) in graph(), d in delta()) {
        let g = GraphStore::new(n, &edges, d).unwrap();
        let obs = RecordingObserver::new();
        // sequential, so event order is update order
        let p = Solver::new(&g).executor(Executor::Sequential).observer(&obs).run(source).unwrap();
        let mut last: HashMap<u32, f32> = HashMap::new();
        for e in obs.events() {
            if let Event::EdgeRelaxed { to, new_distance, .. } = e {
                if let Some(&prev) = last.get(&to) {
                    prop_assert!(new_distance < prev, "vertex {} went {} -> {}", to, prev, new_distance);
                }
                last.insert(to, new_distance);
            }
        }
        for (v, dist) in last {
            prop_assert_eq!(p.distances()[v as usize], dist);
        }
    }

    #[test]
    fn buckets_close_in_order_and_stay_closed((n, edges, source) in graph(), d in delta(), parallel in any::<bool>()) {
        let g = GraphStore::new(n, &edges, d).unwrap();
        let obs = RecordingObserver::new();
        let p = Solver::new(&g).executor(executor(parallel)).observer(&obs).run(source).unwrap();
        let mut last_closed: Option<usize> = None;
        let mut open: Option<usize> = None;
        for e in obs.events() {
            match e {
                Event::BucketOpened { index } => {
                    prop_assert!(open.is_none());
                    if let Some(c) = last_closed { prop_assert!(index > c); }
                    open = Some(index);
                }
                Event::VertexSettled { vertex, distance, bucket } => {
                    prop_assert_eq!(Some(bucket), open);
                    prop_assert_eq!(g.bucket_index(distance), bucket);
                    prop_assert_eq!(p.distances()[vertex as usize], distance);
                }
                Event::BucketClosed { index } => {
                    prop_assert_eq!(Some(index), open);
                    last_closed = open.take();
                }
                Event::EdgeRelaxed { new_distance, .. } => {
                    // nothing may land below the bucket being processed
                    if let Some(b) = open { prop_assert!(g.bucket_index(new_distance) >= b); }
                }
            }
        }
        prop_assert!(open.is_none());
        prop_assert_eq!(p.stats.settled as usize, p.reachable_count());
    }
}
