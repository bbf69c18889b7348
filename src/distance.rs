//! Shared tentative-distance table. Each cell packs `(distance bits << 32) | predecessor` into
//! one `AtomicU64` so a single compare-and-swap moves both. Distances are non-negative `f32`, and
//! for those the IEEE bit pattern orders the same way as the value.

use std::sync::atomic::{AtomicU64, Ordering};

pub(crate) const NO_PRED: u32 = u32::MAX;

#[inline(always)]
fn pack(d: f32, pred: u32) -> u64 {
    (u64::from(d.to_bits()) << 32) | u64::from(pred)
}

#[inline(always)]
fn unpack(cell: u64) -> (f32, u32) {
    (f32::from_bits((cell >> 32) as u32), cell as u32)
}

pub struct DistanceTable {
    cells: Vec<AtomicU64>,
}

impl DistanceTable {
    /// Every vertex at +inf except `source`, which starts at 0.
    pub fn new(vertex_count: usize, source: u32) -> Self {
        let cells = (0..vertex_count)
            .map(|v| {
                let d = if v == source as usize { 0.0 } else { f32::INFINITY };
                AtomicU64::new(pack(d, NO_PRED))
            })
            .collect();
        Self { cells }
    }

    #[inline] pub fn len(&self) -> usize { self.cells.len() }
    #[inline] pub fn is_empty(&self) -> bool { self.cells.is_empty() }

    #[inline]
    pub fn get(&self, v: u32) -> f32 {
        unpack(self.cells[v as usize].load(Ordering::Acquire)).0
    }

    #[inline]
    pub fn predecessor(&self, v: u32) -> Option<u32> {
        match unpack(self.cells[v as usize].load(Ordering::Acquire)).1 {
            NO_PRED => None,
            p => Some(p),
        }
    }

    /// Lower `dist[v]` to `candidate` (reached via `via`) iff `candidate < dist[v]`. Returns
    /// whether this call performed the update. Lock-free; concurrent callers targeting the same
    /// cell retry until either they win or the cell already holds something no larger.
    #[inline]
    pub fn try_relax(&self, v: u32, candidate: f32, via: u32) -> bool {
        let cell = &self.cells[v as usize];
        let next = pack(candidate, via);
        let mut current = cell.load(Ordering::Acquire);
        loop {
            // false for NaN as well
            if !(candidate < unpack(current).0) {
                return false;
            }
            match cell.compare_exchange_weak(current, next, Ordering::AcqRel, Ordering::Acquire) {
                Ok(_) => return true,
                Err(actual) => current = actual,
            }
        }
    }

    pub fn snapshot(&self) -> Vec<f32> {
        (0..self.len() as u32).map(|v| self.get(v)).collect()
    }

    pub fn into_parts(self) -> (Vec<f32>, Vec<Option<u32>>) {
        self.cells
            .into_iter()
            .map(|c| {
                let (d, p) = unpack(c.into_inner());
                (d, (p != NO_PRED).then_some(p))
            })
            .unzip()
    }
}
