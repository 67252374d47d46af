//! Memory-budgeted tick cache.
//!
//! Committed snapshots accumulate here in tick order. When the summed
//! footprint exceeds the byte budget the oldest ticks are evicted from
//! the front, so the retained range is always a contiguous suffix of
//! the run. Reads of evicted ticks fail rather than silently returning
//! the nearest survivor.

use std::collections::VecDeque;

use orrery_core::constants::ONE_MB;
use orrery_core::{CacheError, TickId};
use orrery_sim::TickSnapshot;

/// Bounded history of committed tick snapshots.
#[derive(Debug)]
pub struct TickCache {
    snapshots: VecDeque<TickSnapshot>,
    footprint: usize,
    budget: usize,
}

impl TickCache {
    /// Create a cache with a budget of `max_mb` mebibytes.
    pub fn new(max_mb: usize) -> Self {
        Self {
            snapshots: VecDeque::new(),
            footprint: 0,
            budget: max_mb * ONE_MB,
        }
    }

    /// Append the next snapshot and evict from the front while over
    /// budget. The newest tick is never evicted, even when it alone
    /// exceeds the budget. Returns the number of ticks evicted.
    pub fn append(&mut self, snapshot: TickSnapshot) -> usize {
        self.footprint += snapshot.footprint_bytes();
        self.snapshots.push_back(snapshot);

        let mut evicted = 0;
        while self.footprint > self.budget && self.snapshots.len() > 1 {
            if let Some(old) = self.snapshots.pop_front() {
                self.footprint -= old.footprint_bytes();
                evicted += 1;
            }
        }
        evicted
    }

    /// Look up the snapshot for `tick`.
    ///
    /// # Errors
    ///
    /// [`CacheError::Empty`] when nothing has been committed, and
    /// [`CacheError::OutOfRange`] when `tick` was evicted or has not
    /// been committed yet.
    pub fn get(&self, tick: TickId) -> Result<&TickSnapshot, CacheError> {
        let first = self.first_tick().ok_or(CacheError::Empty)?;
        let last = self.max_tick().unwrap_or(first);

        if tick < first || tick > last {
            return Err(CacheError::OutOfRange {
                tick: tick.0,
                first: first.0,
                last: last.0,
            });
        }
        let index = (tick.0 - first.0) as usize;
        self.snapshots.get(index).ok_or(CacheError::OutOfRange {
            tick: tick.0,
            first: first.0,
            last: last.0,
        })
    }

    /// Oldest retained tick, if any.
    pub fn first_tick(&self) -> Option<TickId> {
        self.snapshots.front().map(|s| s.tick)
    }

    /// Newest committed tick, if any.
    pub fn max_tick(&self) -> Option<TickId> {
        self.snapshots.back().map(|s| s.tick)
    }

    /// Number of retained ticks.
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Whether the cache holds no ticks.
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Current footprint of all retained snapshots, in bytes.
    pub fn footprint_bytes(&self) -> usize {
        self.footprint
    }

    /// Drop everything. Used when the body set is replaced and the old
    /// timeline is no longer addressable.
    pub fn clear(&mut self) {
        self.snapshots.clear();
        self.footprint = 0;
    }
}
