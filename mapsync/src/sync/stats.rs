//! Propagation counters.
//!
//! Lock-free atomics, updated from inside propagation passes and read
//! through point-in-time snapshots.

use std::sync::atomic::{AtomicU64, Ordering};

/// Live counters for one synchronized group.
#[derive(Debug)]
pub struct SyncStats {
    passes: AtomicU64,
    clone_updates: AtomicU64,
    failed_passes: AtomicU64,
    passes_by_master: Vec<AtomicU64>,
}

impl SyncStats {
    /// Counters for a group of `members` viewports.
    pub fn new(members: usize) -> Self {
        Self {
            passes: AtomicU64::new(0),
            clone_updates: AtomicU64::new(0),
            failed_passes: AtomicU64::new(0),
            passes_by_master: (0..members).map(|_| AtomicU64::new(0)).collect(),
        }
    }

    /// A pass started with the member at `master` as master.
    pub fn pass_started(&self, master: usize) {
        self.passes.fetch_add(1, Ordering::Relaxed);
        if let Some(counter) = self.passes_by_master.get(master) {
            counter.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// One clone accepted its new camera.
    pub fn clone_updated(&self) {
        self.clone_updates.fetch_add(1, Ordering::Relaxed);
    }

    /// A pass ended with a clone failure.
    pub fn pass_failed(&self) {
        self.failed_passes.fetch_add(1, Ordering::Relaxed);
    }

    /// Point-in-time copy of all counters.
    pub fn snapshot(&self) -> SyncStatsSnapshot {
        SyncStatsSnapshot {
            passes: self.passes.load(Ordering::Relaxed),
            clone_updates: self.clone_updates.load(Ordering::Relaxed),
            failed_passes: self.failed_passes.load(Ordering::Relaxed),
            passes_by_master: self
                .passes_by_master
                .iter()
                .map(|c| c.load(Ordering::Relaxed))
                .collect(),
        }
    }
}

/// Plain copy of [`SyncStats`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncStatsSnapshot {
    /// Propagation passes started.
    pub passes: u64,
    /// Clone camera updates applied.
    pub clone_updates: u64,
    /// Passes that ended with a clone failure.
    pub failed_passes: u64,
    /// Passes started per group member, in group order.
    pub passes_by_master: Vec<u64>,
}

impl SyncStatsSnapshot {
    /// Passes in which the member at `index` was the master.
    pub fn passes_from(&self, index: usize) -> u64 {
        self.passes_by_master.get(index).copied().unwrap_or(0)
    }
}
