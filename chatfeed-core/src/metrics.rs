//! Engine counters.
//!
//! Plain in-memory tallies owned by one engine. They are cheap enough to
//! update on every decision point and are meant for debug overlays, the
//! simulator summary and tests. Nothing here is persisted.

use serde::{Deserialize, Serialize};

use crate::types::KindId;

/// Running totals for one engine instance.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineStats {
    /// `tick` calls.
    pub ticks: u64,
    /// Decision points reached (including burst starts).
    pub decision_points: u64,
    /// Events handed to the output consumer.
    pub emitted: u64,
    /// Events emitted per kind, indexed by [`KindId`].
    pub emitted_by_kind: Vec<u64>,
    /// Decision points where the sampler had nothing to offer.
    pub sampler_misses: u64,
    /// Decision points where no kind had positive weight.
    pub silent_decisions: u64,
    /// Bursts entered.
    pub bursts_started: u64,
    /// Bursts that ran to completion.
    pub bursts_completed: u64,
    /// Ticks that hit the per-tick iteration ceiling.
    pub ceiling_hits: u64,
    /// External signals received.
    pub signals_pushed: u64,
    /// State resets caused by a profile shape change.
    pub resets: u64,
}

impl EngineStats {
    /// Zeroed counters sized for `kind_count` kinds.
    #[must_use]
    pub fn new(kind_count: usize) -> Self {
        Self {
            emitted_by_kind: vec![0; kind_count],
            ..Self::default()
        }
    }

    /// Count one emission of `kind`.
    pub fn record_emit(&mut self, kind: KindId) {
        self.emitted += 1;
        if let Some(n) = self.emitted_by_kind.get_mut(kind.index()) {
            *n += 1;
        }
    }

    /// Zero every counter, keeping the per-kind table's size.
    pub fn clear(&mut self) {
        *self = Self::new(self.emitted_by_kind.len());
    }

    /// Resize the per-kind table, dropping counts for kinds that no longer exist.
    pub fn resize_kinds(&mut self, kind_count: usize) {
        self.emitted_by_kind.resize(kind_count, 0);
    }

    /// Share of decision points that produced an event, in `[0, 1]`.
    #[must_use]
    pub fn emit_ratio(&self) -> f64 {
        if self.decision_points == 0 {
            0.0
        } else {
            self.emitted as f64 / self.decision_points as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clear_keeps_kind_slots() {
        let mut stats = EngineStats::new(3);
        stats.ticks = 9;
        stats.record_emit(KindId(2));
        stats.clear();
        assert_eq!(stats, EngineStats::new(3));
    }

    #[test]
    fn record_emit_counts_per_kind() {
        let mut stats = EngineStats::new(2);
        stats.record_emit(KindId(1));
        stats.record_emit(KindId(1));
        stats.record_emit(KindId(9));
        assert_eq!(stats.emitted, 3);
        assert_eq!(stats.emitted_by_kind, vec![0, 2]);
    }

    #[test]
    fn emit_ratio_handles_zero() {
        let mut stats = EngineStats::new(1);
        assert!(stats.emit_ratio().abs() < f64::EPSILON);
        stats.decision_points = 4;
        stats.emitted = 1;
        assert!((stats.emit_ratio() - 0.25).abs() < f64::EPSILON);
    }
}
