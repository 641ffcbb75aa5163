//! Simulation clock: wall-clock baseline plus the simulated-time and
//! paused-time accumulators shared between the scheduler threads.
//!
//! The physics thread is the only writer of the accumulators; the
//! presentation thread and the controller read them lock-free. All
//! three counters are nanoseconds relative to a process-local monotonic
//! baseline, so no reader can ever observe a torn duration.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::OnceLock;
use std::time::{Duration, Instant};

/// Returns monotonic nanoseconds since an arbitrary process-local epoch.
///
/// Uses `OnceLock<Instant>` to lazily initialise a baseline. NOT
/// wall-clock time — only for relative duration comparisons. This is
/// the single source of truth for monotonic timestamps in the core;
/// all clock state is expressed against the same baseline to avoid
/// skew between independent `OnceLock` statics.
fn monotonic_nanos() -> u64 {
    static EPOCH: OnceLock<Instant> = OnceLock::new();
    let epoch = EPOCH.get_or_init(Instant::now);
    Instant::now().duration_since(*epoch).as_nanos() as u64
}

/// The three logical clocks of a simulation run.
///
/// * `sim_time` — accumulated simulated duration while running. Advances
///   by exactly one step per tick, only when the run is not paused (or
///   exactly once under single-step).
/// * `pause_time` — accumulated duration while paused. Advances by one
///   step per tick taken while paused.
/// * `real_time` — wall-clock elapsed since construction (or the last
///   [`reset`](SimClock::reset)).
///
/// At any instant exactly one of `sim_time` and `pause_time` is
/// advancing. Their sum is what the real-time-matching pacing mode
/// steers toward `real_time`.
pub struct SimClock {
    /// Monotonic nanos at construction or last reset.
    start_ns: AtomicU64,
    /// Accumulated simulated nanoseconds.
    sim_ns: AtomicU64,
    /// Accumulated paused nanoseconds.
    pause_ns: AtomicU64,
}

// Compile-time assertion: SimClock must be Send + Sync.
const _: fn() = || {
    fn assert<T: Send + Sync>() {}
    assert::<SimClock>();
};

impl SimClock {
    /// Create a clock with `real_time` starting now and both
    /// accumulators at zero.
    pub fn new() -> Self {
        Self {
            start_ns: AtomicU64::new(monotonic_nanos()),
            sim_ns: AtomicU64::new(0),
            pause_ns: AtomicU64::new(0),
        }
    }

    /// Current reading of the platform monotonic clock.
    pub fn now() -> Instant {
        Instant::now()
    }

    /// Elapsed duration since `t`.
    pub fn elapsed_since(t: Instant) -> Duration {
        t.elapsed()
    }

    /// Wall-clock time elapsed since construction or the last reset.
    pub fn real_time(&self) -> Duration {
        let start = self.start_ns.load(Ordering::Acquire);
        Duration::from_nanos(monotonic_nanos().saturating_sub(start))
    }

    /// Accumulated simulated time.
    pub fn sim_time(&self) -> Duration {
        Duration::from_nanos(self.sim_ns.load(Ordering::Acquire))
    }

    /// Accumulated paused time.
    pub fn pause_time(&self) -> Duration {
        Duration::from_nanos(self.pause_ns.load(Ordering::Acquire))
    }

    /// Advance simulated time by one fixed step.
    ///
    /// Called only by the physics thread, on ticks that advance.
    pub fn advance_sim(&self, step: Duration) {
        self.sim_ns
            .fetch_add(step.as_nanos() as u64, Ordering::AcqRel);
    }

    /// Advance paused time by one fixed step.
    ///
    /// Called only by the physics thread, on ticks taken while paused.
    pub fn advance_pause(&self, step: Duration) {
        self.pause_ns
            .fetch_add(step.as_nanos() as u64, Ordering::AcqRel);
    }

    /// Start a new run: re-arm the real-time baseline and zero both
    /// accumulators. The clock object itself survives reloads.
    pub fn reset(&self) {
        self.start_ns.store(monotonic_nanos(), Ordering::Release);
        self.sim_ns.store(0, Ordering::Release);
        self.pause_ns.store(0, Ordering::Release);
    }
}

impl Default for SimClock {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SimClock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimClock")
            .field("real_time", &self.real_time())
            .field("sim_time", &self.sim_time())
            .field("pause_time", &self.pause_time())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn new_clock_starts_at_zero() {
        let clock = SimClock::new();
        assert_eq!(clock.sim_time(), Duration::ZERO);
        assert_eq!(clock.pause_time(), Duration::ZERO);
    }

    #[test]
    fn advance_sim_accumulates_exact_steps() {
        let clock = SimClock::new();
        let step = Duration::from_millis(10);
        for _ in 0..7 {
            clock.advance_sim(step);
        }
        assert_eq!(clock.sim_time(), Duration::from_millis(70));
        assert_eq!(clock.pause_time(), Duration::ZERO);
    }

    #[test]
    fn advance_pause_does_not_touch_sim() {
        let clock = SimClock::new();
        let step = Duration::from_millis(5);
        clock.advance_sim(step);
        clock.advance_pause(step);
        clock.advance_pause(step);
        assert_eq!(clock.sim_time(), Duration::from_millis(5));
        assert_eq!(clock.pause_time(), Duration::from_millis(10));
    }

    #[test]
    fn real_time_is_monotonic() {
        let clock = SimClock::new();
        let a = clock.real_time();
        std::thread::sleep(Duration::from_millis(2));
        let b = clock.real_time();
        assert!(b > a);
    }

    #[test]
    fn reset_zeroes_accumulators_and_rearms_baseline() {
        let clock = SimClock::new();
        clock.advance_sim(Duration::from_secs(3));
        clock.advance_pause(Duration::from_secs(1));
        std::thread::sleep(Duration::from_millis(2));

        clock.reset();
        assert_eq!(clock.sim_time(), Duration::ZERO);
        assert_eq!(clock.pause_time(), Duration::ZERO);
        assert!(clock.real_time() < Duration::from_millis(100));
    }

    #[test]
    fn elapsed_since_measures_from_the_given_instant() {
        let t = SimClock::now();
        std::thread::sleep(Duration::from_millis(2));
        assert!(SimClock::elapsed_since(t) >= Duration::from_millis(2));
    }

    proptest! {
        /// Under any interleaving of running and paused ticks, both
        /// accumulators are non-decreasing, exactly one advances per
        /// tick, and their sum equals the total number of ticks times
        /// the step duration.
        #[test]
        fn accumulators_partition_total_ticks(ticks in proptest::collection::vec(any::<bool>(), 0..256)) {
            let clock = SimClock::new();
            let step = Duration::from_micros(100);
            let mut last_sim = Duration::ZERO;
            let mut last_pause = Duration::ZERO;

            for &advance in &ticks {
                if advance {
                    clock.advance_sim(step);
                } else {
                    clock.advance_pause(step);
                }
                let sim = clock.sim_time();
                let pause = clock.pause_time();
                prop_assert!(sim >= last_sim);
                prop_assert!(pause >= last_pause);
                // Exactly one of the two advanced this tick.
                prop_assert_eq!((sim - last_sim) + (pause - last_pause), step);
                last_sim = sim;
                last_pause = pause;
            }

            prop_assert_eq!(last_sim + last_pause, step * ticks.len() as u32);
        }
    }
}
