//! Stable C ABI. Graphs cross the boundary as a CSR triple:
//! `offsets[n+1]`, `targets[m]`, `weights[m]` with `m = offsets[n]`.
//! Return codes: 0 success, otherwise `SsspError::code()`; -3 means a required pointer was null.

use core::slice;

use parking_lot::Mutex;

use crate::config::SsspConfig;
use crate::error::{GraphIssue, Result, SsspError};
use crate::graph::GraphStore;
use crate::paths::ShortestPaths;
use crate::scheduler::{RunStats, Solver};

pub const SSSP_ABI_VERSION: u32 = 5;

#[repr(C)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SsspResultInfo {
    pub relaxations: u64,          // total successful relax operations
    pub light_relaxations: u64,
    pub heavy_relaxations: u64,
    pub settled: u32,
    pub error_code: i32,           // 0 == success
}

#[repr(C)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SsspBucketStats {
    pub buckets_visited: u32,
    pub light_pass_repeats: u32,
    pub max_bucket_index: u32,
    pub delta_x1000: u32,          // delta * 1000, for quick inspection
}

static LAST_BUCKET_STATS: Mutex<SsspBucketStats> = parking_lot::const_mutex(SsspBucketStats {
    buckets_visited: 0,
    light_pass_repeats: 0,
    max_bucket_index: 0,
    delta_x1000: 0,
});

impl From<&RunStats> for SsspResultInfo {
    fn from(s: &RunStats) -> Self {
        Self {
            relaxations: s.relaxations,
            light_relaxations: s.light_relaxations,
            heavy_relaxations: s.heavy_relaxations,
            settled: s.settled,
            error_code: 0,
        }
    }
}

struct CsrArgs<'a> { n: usize, off: &'a [u32], tgt: &'a [u32], wts: &'a [f32] }

/// # Safety
/// Pointers must be valid for the lengths described in the module docs.
unsafe fn csr_args<'a>(n: u32, offsets: *const u32, targets: *const u32, weights: *const f32) -> Result<CsrArgs<'a>> {
    if n == 0 { return Err(GraphIssue::Empty.into()); }
    let n = n as usize;
    let off = slice::from_raw_parts(offsets, n + 1);
    let m = off[n] as usize;
    let (tgt, wts) = if m == 0 { (&[][..], &[][..]) } else { (slice::from_raw_parts(targets, m), slice::from_raw_parts(weights, m)) };
    Ok(CsrArgs { n, off, tgt, wts })
}

/// # Safety
/// `out_dist` and `out_pred` must be valid for `n` writes; `info` may be null.
unsafe fn write_out(paths: &ShortestPaths, n: usize, out_dist: *mut f32, out_pred: *mut i32, info: *mut SsspResultInfo) {
    let dist = slice::from_raw_parts_mut(out_dist, n);
    let pred = slice::from_raw_parts_mut(out_pred, n);
    dist.copy_from_slice(paths.distances());
    for (p, src) in pred.iter_mut().zip(paths.predecessors()) {
        *p = src.map_or(-1, |v| v as i32);
    }
    if !info.is_null() { *info = SsspResultInfo::from(&paths.stats); }
}

#[inline]
unsafe fn fail(e: SsspError, info: *mut SsspResultInfo) -> i32 {
    tracing::warn!(error = %e, "sssp call rejected");
    let code = e.code();
    if !info.is_null() { *info = SsspResultInfo { error_code: code, ..Default::default() }; }
    code
}

/// Reference Dijkstra.
///
/// # Safety
/// See module docs; `out_dist`/`out_pred` need room for `n` entries.
#[no_mangle]
pub unsafe extern "C" fn sssp_run_baseline(
    n: u32,
    offsets: *const u32,
    targets: *const u32,
    weights: *const f32,
    source: u32,
    out_dist: *mut f32,
    out_pred: *mut i32,
    info: *mut SsspResultInfo,
) -> i32 {
    if offsets.is_null() || targets.is_null() || weights.is_null() || out_dist.is_null() || out_pred.is_null() { return -3; }
    let run = || -> Result<ShortestPaths> {
        let a = csr_args(n, offsets, targets, weights)?;
        // delta is irrelevant to Dijkstra; any valid width will do
        let g = GraphStore::from_csr(a.off, a.tgt, a.wts, 1.0)?;
        crate::baseline::dijkstra(&g, source)
    };
    match run() {
        Ok(p) => { write_out(&p, n as usize, out_dist, out_pred, info); 0 }
        Err(e) => fail(e, info),
    }
}

/// Delta-stepping. `delta <= 0` derives the width from `SsspConfig::from_env()`.
///
/// # Safety
/// See module docs; `out_dist`/`out_pred` need room for `n` entries.
#[no_mangle]
pub unsafe extern "C" fn sssp_run_delta_stepping(
    n: u32,
    offsets: *const u32,
    targets: *const u32,
    weights: *const f32,
    source: u32,
    delta: f32,
    out_dist: *mut f32,
    out_pred: *mut i32,
    info: *mut SsspResultInfo,
) -> i32 {
    if offsets.is_null() || targets.is_null() || weights.is_null() || out_dist.is_null() || out_pred.is_null() { return -3; }
    let run = || -> Result<ShortestPaths> {
        let a = csr_args(n, offsets, targets, weights)?;
        let mut cfg = SsspConfig::from_env()?;
        if delta > 0.0 { cfg.delta = crate::config::DeltaChoice::Fixed { delta }; }
        // validate before sampling weights for delta
        let probe = GraphStore::from_csr(a.off, a.tgt, a.wts, 1.0)?;
        let edges: Vec<_> = probe.edges().collect();
        let g = GraphStore::new(a.n, &edges, cfg.resolve_delta(&edges)?)?;
        Solver::new(&g).executor(cfg.executor()?).run(source)
    };
    match run() {
        Ok(p) => {
            *LAST_BUCKET_STATS.lock() = SsspBucketStats {
                buckets_visited: p.stats.buckets_visited,
                light_pass_repeats: p.stats.light_pass_repeats,
                max_bucket_index: p.stats.max_bucket_index,
                delta_x1000: (p.delta * 1000.0) as u32,
            };
            write_out(&p, n as usize, out_dist, out_pred, info);
            0
        }
        Err(e) => fail(e, info),
    }
}

/// Bucket statistics of the last successful `sssp_run_delta_stepping` call in this process.
///
/// # Safety
/// `out` must be null or valid for one write.
#[no_mangle]
pub unsafe extern "C" fn sssp_get_bucket_stats(out: *mut SsspBucketStats) {
    if out.is_null() { return; }
    *out = *LAST_BUCKET_STATS.lock();
}

#[no_mangle]
pub extern "C" fn sssp_version() -> u32 { SSSP_ABI_VERSION }
