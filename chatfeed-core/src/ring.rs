//! Anti-repeat ring buffer.
//!
//! Fixed-capacity FIFO of the most recently emitted content ids. Samplers
//! consult it to avoid picking a line that was shown in the last N events.
//!
//! ```text
//!   push(D) with capacity 3:
//!   ┌───┬───┬───┐          ┌───┬───┬───┐
//!   │ A │ B │ C │  ──────▶ │ B │ C │ D │   (A evicted)
//!   └───┴───┴───┘          └───┴───┴───┘
//!   oldest    newest       oldest    newest
//! ```
//!
//! A capacity of zero turns the feature off: pushes are dropped and
//! [`RecentIdRing::contains`] is always false.

use std::collections::VecDeque;

/// Most slots reserved up front; larger windows grow as ids arrive.
const MAX_PREALLOCATED: usize = 256;

/// Bounded window of recently used content ids.
#[derive(Debug, Clone, Default)]
pub struct RecentIdRing {
    capacity: usize,
    entries: VecDeque<u64>,
}

impl RecentIdRing {
    /// Create a ring holding at most `capacity` ids.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: VecDeque::with_capacity(capacity.min(MAX_PREALLOCATED)),
        }
    }

    /// Configured capacity. Zero means disabled.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of ids currently held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no ids are held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether the window is active at all.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.capacity > 0
    }

    /// Record `id` as the newest entry, evicting the oldest once full.
    pub fn push(&mut self, id: u64) {
        if self.capacity == 0 {
            return;
        }
        while self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(id);
    }

    /// Linear membership test over the window.
    #[must_use]
    pub fn contains(&self, id: u64) -> bool {
        self.capacity > 0 && self.entries.contains(&id)
    }

    /// Change the capacity, keeping up to `new_capacity` of the most recent ids.
    pub fn resize(&mut self, new_capacity: usize) {
        if new_capacity == self.capacity {
            return;
        }
        let keep = self.entries.len().min(new_capacity);
        let drop = self.entries.len() - keep;
        self.entries.drain(..drop);
        self.entries.shrink_to(new_capacity.min(MAX_PREALLOCATED));
        self.capacity = new_capacity;
    }

    /// Forget every id, keeping the capacity.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Iterate ids newest first.
    pub fn iter_newest_first(&self) -> impl Iterator<Item = u64> + '_ {
        self.entries.iter().rev().copied()
    }
}
