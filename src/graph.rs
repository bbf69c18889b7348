//! Immutable adjacency store with each vertex's out-edges partitioned into light (`w <= delta`)
//! and heavy (`w > delta`) runs. Layout is CSR: for vertex `v` the edges live in
//! `offsets[v]..offsets[v+1]`, light first, heavy starting at `split[v]`.

use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigIssue, GraphIssue, Result};

/// One directed, weighted edge as supplied by the graph-loading side.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub source: u32,
    pub target: u32,
    pub weight: f32,
}

impl Edge {
    #[inline]
    pub fn new(source: u32, target: u32, weight: f32) -> Self {
        Self { source, target, weight }
    }
}

impl From<(u32, u32, f32)> for Edge {
    #[inline]
    fn from((source, target, weight): (u32, u32, f32)) -> Self {
        Self { source, target, weight }
    }
}

/// Highest bucket index. Every distance at or beyond `TOP_BUCKET * delta` shares this bucket.
pub const TOP_BUCKET: usize = usize::MAX - 1;

#[derive(Debug, Clone)]
pub struct GraphStore {
    delta: f32,
    offsets: Vec<usize>, // len n+1
    split: Vec<usize>,   // len n, first heavy edge of each vertex
    targets: Vec<u32>,
    weights: Vec<f32>,
}

pub(crate) fn check_delta(delta: f32) -> Result<()> {
    if delta.is_finite() && delta > 0.0 {
        Ok(())
    } else {
        Err(ConfigIssue::NonPositiveDelta { delta }.into())
    }
}

#[inline]
fn check_weight(edge: usize, weight: f32) -> Result<()> {
    if !weight.is_finite() {
        return Err(GraphIssue::NonFiniteWeight { edge }.into());
    }
    if weight < 0.0 {
        return Err(GraphIssue::NegativeWeight { edge, weight }.into());
    }
    Ok(())
}

#[inline]
fn check_vertex(edge: usize, vertex: u32, vertex_count: usize) -> Result<()> {
    if (vertex as usize) < vertex_count {
        Ok(())
    } else {
        Err(GraphIssue::VertexOutOfRange { edge, vertex: vertex as u64, vertex_count }.into())
    }
}

/// Validate an edge list against a vertex count without building anything.
pub fn validate_edges(vertex_count: usize, edges: &[Edge]) -> Result<()> {
    if vertex_count == 0 {
        return Err(GraphIssue::Empty.into());
    }
    if vertex_count > u32::MAX as usize {
        return Err(GraphIssue::VertexOutOfRange {
            edge: 0,
            vertex: vertex_count as u64,
            vertex_count: u32::MAX as usize,
        }
        .into());
    }
    for (i, e) in edges.iter().enumerate() {
        check_vertex(i, e.source, vertex_count)?;
        check_vertex(i, e.target, vertex_count)?;
        check_weight(i, e.weight)?;
    }
    Ok(())
}

impl GraphStore {
    /// Build the partitioned store in O(V + E). Edges keep their input order within each
    /// light/heavy run.
    pub fn new(vertex_count: usize, edges: &[Edge], delta: f32) -> Result<Self> {
        check_delta(delta)?;
        validate_edges(vertex_count, edges)?;

        // counting pass: light and heavy degree per vertex
        let mut light = vec![0usize; vertex_count];
        let mut heavy = vec![0usize; vertex_count];
        for e in edges {
            if e.weight <= delta {
                light[e.source as usize] += 1;
            } else {
                heavy[e.source as usize] += 1;
            }
        }
        let mut offsets = Vec::with_capacity(vertex_count + 1);
        let mut split = Vec::with_capacity(vertex_count);
        let mut acc = 0usize;
        offsets.push(0);
        for v in 0..vertex_count {
            split.push(acc + light[v]);
            acc += light[v] + heavy[v];
            offsets.push(acc);
        }

        // scatter pass: reuse the degree arrays as write cursors
        light.copy_from_slice(&offsets[..vertex_count]);
        heavy.copy_from_slice(&split);
        let mut targets = vec![0u32; edges.len()];
        let mut weights = vec![0f32; edges.len()];
        for e in edges {
            let u = e.source as usize;
            let slot = if e.weight <= delta { &mut light[u] } else { &mut heavy[u] };
            targets[*slot] = e.target;
            weights[*slot] = e.weight;
            *slot += 1;
        }

        Ok(Self { delta, offsets, split, targets, weights })
    }

    /// Build from a CSR triple (`offsets` of length n+1, `targets`/`weights` of length
    /// `offsets[n]`).
    pub fn from_csr(offsets: &[u32], targets: &[u32], weights: &[f32], delta: f32) -> Result<Self> {
        let Some((&last, _)) = offsets.split_last() else {
            return Err(GraphIssue::MalformedOffsets { reason: "offsets must have n+1 entries".into() }.into());
        };
        let n = offsets.len() - 1;
        if n == 0 {
            return Err(GraphIssue::Empty.into());
        }
        if offsets[0] != 0 || offsets.windows(2).any(|w| w[0] > w[1]) {
            return Err(GraphIssue::MalformedOffsets { reason: "offsets must start at 0 and be non-decreasing".into() }.into());
        }
        let m = last as usize;
        if targets.len() < m || weights.len() < m {
            return Err(GraphIssue::MalformedOffsets {
                reason: format!("offsets[n] = {m} but targets/weights have {}/{} entries", targets.len(), weights.len()),
            }
            .into());
        }
        let mut edges = Vec::with_capacity(m);
        for u in 0..n {
            for e in offsets[u] as usize..offsets[u + 1] as usize {
                edges.push(Edge::new(u as u32, targets[e], weights[e]));
            }
        }
        Self::new(n, &edges, delta)
    }

    /// Same graph, re-partitioned for another bucket width.
    pub fn with_delta(&self, delta: f32) -> Result<Self> {
        let edges: Vec<Edge> = self.edges().collect();
        Self::new(self.vertex_count(), &edges, delta)
    }

    #[inline] pub fn vertex_count(&self) -> usize { self.split.len() }
    #[inline] pub fn edge_count(&self) -> usize { self.targets.len() }
    #[inline] pub fn delta(&self) -> f32 { self.delta }

    pub fn light_edge_count(&self) -> usize {
        (0..self.vertex_count()).map(|v| self.split[v] - self.offsets[v]).sum()
    }

    pub fn heavy_edge_count(&self) -> usize {
        self.edge_count() - self.light_edge_count()
    }

    #[inline]
    fn run(&self, r: Range<usize>) -> impl ExactSizeIterator<Item = (u32, f32)> + '_ {
        self.targets[r.clone()].iter().copied().zip(self.weights[r].iter().copied())
    }

    /// `(target, weight)` pairs with `weight <= delta`.
    #[inline]
    pub fn light_edges_of(&self, v: u32) -> impl ExactSizeIterator<Item = (u32, f32)> + '_ {
        let v = v as usize;
        self.run(self.offsets[v]..self.split[v])
    }

    /// `(target, weight)` pairs with `weight > delta`.
    #[inline]
    pub fn heavy_edges_of(&self, v: u32) -> impl ExactSizeIterator<Item = (u32, f32)> + '_ {
        let v = v as usize;
        self.run(self.split[v]..self.offsets[v + 1])
    }

    /// All out-edges of `v`, light run first.
    #[inline]
    pub fn edges_of(&self, v: u32) -> impl ExactSizeIterator<Item = (u32, f32)> + '_ {
        let v = v as usize;
        self.run(self.offsets[v]..self.offsets[v + 1])
    }

    pub fn edges(&self) -> impl Iterator<Item = Edge> + '_ {
        (0..self.vertex_count() as u32)
            .flat_map(move |u| self.edges_of(u).map(move |(v, w)| Edge::new(u, v, w)))
    }

    pub fn weights(&self) -> &[f32] { &self.weights }

    /// Index of the bucket holding tentative distance `d`: `floor(d / delta)`, saturating at
    /// [`TOP_BUCKET`].
    #[inline(always)]
    pub fn bucket_index(&self, d: f32) -> usize {
        ((d / self.delta) as usize).min(TOP_BUCKET)
    }
}
