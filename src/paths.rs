//! Output of a run: one distance per vertex, `f32::INFINITY` for unreachable ones.

use serde::Serialize;

use crate::scheduler::RunStats;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShortestPaths {
    pub source: u32,
    pub delta: f32,
    distances: Vec<f32>,
    predecessors: Vec<Option<u32>>,
    pub stats: RunStats,
}

impl ShortestPaths {
    pub(crate) fn new(source: u32, delta: f32, distances: Vec<f32>, predecessors: Vec<Option<u32>>, stats: RunStats) -> Self {
        Self { source, delta, distances, predecessors, stats }
    }

    /// Raw table indexed by vertex; unreachable entries hold `f32::INFINITY`.
    pub fn distances(&self) -> &[f32] { &self.distances }

    pub fn into_distances(self) -> Vec<f32> { self.distances }

    pub fn len(&self) -> usize { self.distances.len() }
    pub fn is_empty(&self) -> bool { self.distances.is_empty() }

    /// `None` when `v` is unreachable from the source.
    pub fn distance(&self, v: u32) -> Option<f32> {
        self.distances.get(v as usize).copied().filter(|d| d.is_finite())
    }

    pub fn is_reachable(&self, v: u32) -> bool { self.distance(v).is_some() }

    pub fn reachable_count(&self) -> usize { self.distances.iter().filter(|d| d.is_finite()).count() }

    pub fn predecessor(&self, v: u32) -> Option<u32> {
        self.predecessors.get(v as usize).copied().flatten()
    }

    pub fn predecessors(&self) -> &[Option<u32>] { &self.predecessors }

    /// Vertices from the source to `v` inclusive, following recorded predecessors.
    pub fn path_to(&self, v: u32) -> Option<Vec<u32>> {
        self.distance(v)?;
        let mut path = vec![v];
        let mut cur = v;
        while cur != self.source {
            cur = self.predecessor(cur)?;
            path.push(cur);
            // a predecessor chain is at most V long; anything longer is a corrupt table
            if path.len() > self.distances.len() {
                return None;
            }
        }
        path.reverse();
        Some(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ShortestPaths {
        ShortestPaths::new(
            0,
            1.0,
            vec![0.0, 2.0, 3.0, f32::INFINITY],
            vec![None, Some(0), Some(1), None],
            RunStats::default(),
        )
    }

    #[test]
    fn accessors_hide_the_sentinel() {
        let p = sample();
        assert_eq!(p.distance(2), Some(3.0));
        assert_eq!(p.distance(3), None);
        assert_eq!(p.distance(99), None);
        assert_eq!(p.reachable_count(), 3);
        assert!(!p.is_reachable(3));
    }

    #[test]
    fn paths_follow_predecessors() {
        let p = sample();
        assert_eq!(p.path_to(2), Some(vec![0, 1, 2]));
        assert_eq!(p.path_to(0), Some(vec![0]));
        assert_eq!(p.path_to(3), None);
    }

    #[test]
    fn unreachable_serializes_as_null() {
        let json = serde_json::to_string(&sample()).unwrap();
        assert!(json.contains(r#""distances":[0.0,2.0,3.0,null]"#));
    }
}
