//! Distance-ordered buckets with duplicate-free membership.
//!
//! Only buckets that have been filed into exist: the map is keyed by bucket index, so distance
//! ranges far larger than `delta` cost nothing until a vertex actually lands there. Buckets at or
//! below the last closed index are retired by the scheduler.
//!
//! `location[v]` is the single source of truth for which bucket `v` belongs to. Bucket vectors may
//! hold stale entries for vertices that have since moved to a lower bucket; those are dropped when
//! the bucket is drained. `live` counts only current members, so emptiness checks ignore stale
//! entries. Inserts into existing buckets share a read lock and serialize only on the target
//! bucket's mutex.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::{Mutex, RwLock, RwLockWriteGuard};

const UNBUCKETED: usize = usize::MAX;

#[derive(Default)]
struct Bucket {
    members: Mutex<Vec<u32>>,
    live: AtomicUsize,
}

pub struct BucketStructure {
    buckets: RwLock<BTreeMap<usize, Bucket>>,
    location: Vec<AtomicUsize>,
}

impl BucketStructure {
    pub fn new(vertex_count: usize) -> Self {
        Self {
            buckets: RwLock::new(BTreeMap::new()),
            location: (0..vertex_count).map(|_| AtomicUsize::new(UNBUCKETED)).collect(),
        }
    }

    /// Number of bucket slots currently held, empty ones included.
    pub fn capacity(&self) -> usize { self.buckets.read().len() }

    /// Put `v` in bucket `index`, moving it out of whatever bucket it was in. Returns false when
    /// `v` already sits in `index`. Safe for concurrent callers.
    ///
    /// `index` must be below `usize::MAX`, which marks an unbucketed vertex.
    pub fn insert(&self, v: u32, index: usize) -> bool {
        debug_assert!(index != UNBUCKETED);
        {
            let buckets = self.buckets.read();
            if buckets.contains_key(&index) {
                return self.file(&buckets, v, index);
            }
        }
        let mut buckets = self.buckets.write();
        buckets.entry(index).or_default();
        let buckets = RwLockWriteGuard::downgrade(buckets);
        self.file(&buckets, v, index)
    }

    fn file(&self, buckets: &BTreeMap<usize, Bucket>, v: u32, index: usize) -> bool {
        let Some(target) = buckets.get(&index) else { return false };
        // count first so a concurrent mover never decrements a bucket below zero
        target.live.fetch_add(1, Ordering::AcqRel);
        let prev = self.location[v as usize].swap(index, Ordering::AcqRel);
        if prev == index {
            target.live.fetch_sub(1, Ordering::AcqRel);
            return false;
        }
        if let Some(old) = buckets.get(&prev) {
            old.live.fetch_sub(1, Ordering::AcqRel);
        }
        target.members.lock().push(v);
        true
    }

    /// Drain bucket `index`, returning its current members exactly once each.
    pub fn remove_all(&self, index: usize) -> Vec<u32> {
        let buckets = self.buckets.read();
        let Some(bucket) = buckets.get(&index) else { return Vec::new() };
        let drained = std::mem::take(&mut *bucket.members.lock());
        let mut out = Vec::with_capacity(drained.len());
        for v in drained {
            let claimed = self.location[v as usize]
                .compare_exchange(index, UNBUCKETED, Ordering::AcqRel, Ordering::Acquire)
                .is_ok();
            if claimed {
                bucket.live.fetch_sub(1, Ordering::AcqRel);
                out.push(v);
            }
        }
        out
    }

    /// Drop every bucket with index `<= index`. Callers guarantee none of them has live members.
    pub fn retire_through(&self, index: usize) {
        let mut buckets = self.buckets.write();
        let rest = buckets.split_off(&index.saturating_add(1));
        if index == usize::MAX {
            buckets.clear();
        } else {
            *buckets = rest;
        }
    }

    /// Current member count of bucket `index`.
    pub fn len(&self, index: usize) -> usize {
        self.buckets.read().get(&index).map_or(0, |b| b.live.load(Ordering::Acquire))
    }

    pub fn is_empty(&self, index: usize) -> bool { self.len(index) == 0 }

    pub fn first_non_empty_from(&self, start: usize) -> Option<usize> {
        let buckets = self.buckets.read();
        buckets.range(start..).find(|(_, b)| b.live.load(Ordering::Acquire) > 0).map(|(&i, _)| i)
    }

    /// Bucket `v` currently belongs to, if any.
    pub fn bucket_of(&self, v: u32) -> Option<usize> {
        match self.location[v as usize].load(Ordering::Acquire) {
            UNBUCKETED => None,
            b => Some(b),
        }
    }
}
