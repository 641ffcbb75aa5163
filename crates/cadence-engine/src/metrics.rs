//! Per-run counters for the two scheduler loops.

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters incremented by the scheduler loops while a run is active.
///
/// Shared between the physics thread (tick counters), the presentation
/// thread (refresh counter), and any control handle reading a
/// [`LoopMetrics`] snapshot.
#[derive(Debug, Default)]
pub(crate) struct LoopCounters {
    pub ticks_advanced: AtomicU64,
    pub ticks_paused: AtomicU64,
    pub steps_consumed: AtomicU64,
    pub presentation_refreshes: AtomicU64,
}

impl LoopCounters {
    /// Point-in-time snapshot of all counters.
    pub fn snapshot(&self) -> LoopMetrics {
        LoopMetrics {
            ticks_advanced: self.ticks_advanced.load(Ordering::Relaxed),
            ticks_paused: self.ticks_paused.load(Ordering::Relaxed),
            steps_consumed: self.steps_consumed.load(Ordering::Relaxed),
            presentation_refreshes: self.presentation_refreshes.load(Ordering::Relaxed),
        }
    }

    /// Zero all counters at the start of a new run.
    pub fn reset(&self) {
        self.ticks_advanced.store(0, Ordering::Relaxed);
        self.ticks_paused.store(0, Ordering::Relaxed);
        self.steps_consumed.store(0, Ordering::Relaxed);
        self.presentation_refreshes.store(0, Ordering::Relaxed);
    }
}

/// Snapshot of the loop counters for one run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LoopMetrics {
    /// Physics ticks that advanced simulated time.
    pub ticks_advanced: u64,
    /// Physics ticks taken while paused.
    pub ticks_paused: u64,
    /// Single-step requests consumed.
    pub steps_consumed: u64,
    /// Presentation refresh passes completed.
    pub presentation_refreshes: u64,
}

impl LoopMetrics {
    /// Total physics ticks, advancing or not.
    pub fn total_ticks(&self) -> u64 {
        self.ticks_advanced + self.ticks_paused
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_metrics_are_zero() {
        let m = LoopMetrics::default();
        assert_eq!(m.ticks_advanced, 0);
        assert_eq!(m.ticks_paused, 0);
        assert_eq!(m.steps_consumed, 0);
        assert_eq!(m.presentation_refreshes, 0);
        assert_eq!(m.total_ticks(), 0);
    }

    #[test]
    fn snapshot_reflects_counters() {
        let counters = LoopCounters::default();
        counters.ticks_advanced.store(10, Ordering::Relaxed);
        counters.ticks_paused.store(4, Ordering::Relaxed);
        counters.steps_consumed.store(2, Ordering::Relaxed);
        counters.presentation_refreshes.store(7, Ordering::Relaxed);

        let m = counters.snapshot();
        assert_eq!(m.ticks_advanced, 10);
        assert_eq!(m.ticks_paused, 4);
        assert_eq!(m.steps_consumed, 2);
        assert_eq!(m.presentation_refreshes, 7);
        assert_eq!(m.total_ticks(), 14);
    }

    #[test]
    fn reset_zeroes_everything() {
        let counters = LoopCounters::default();
        counters.ticks_advanced.store(10, Ordering::Relaxed);
        counters.reset();
        assert_eq!(counters.snapshot(), LoopMetrics::default());
    }
}
