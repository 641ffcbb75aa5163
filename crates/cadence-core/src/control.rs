//! Shared run-state control flags for the dual-loop scheduler.
//!
//! [`RunState`] holds the paused / step-pending / quit / timeout flags
//! behind a single control lock shared by the physics and presentation
//! threads. Every read that affects control flow of either scheduler
//! goes through this lock, so a pause toggle can never race a step
//! decision: the decision point is [`begin_tick`](RunState::begin_tick),
//! which reads the pause flag and consumes the step flag under one
//! acquisition.

use std::time::Duration;

use crossbeam_channel::{unbounded, Receiver, Sender};
use parking_lot::Mutex;

/// Outcome of the locked per-tick control decision.
///
/// Returned by [`RunState::begin_tick`]. `advance` selects which clock
/// accumulator the tick charges; `stepped` records that a pending
/// single-step was consumed, obliging the physics loop to re-pause at
/// the end of the iteration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TickDecision {
    /// Whether simulated time advances this tick.
    pub advance: bool,
    /// Whether a pending single-step request was consumed.
    pub stepped: bool,
}

/// Fields guarded by the control lock.
#[derive(Default)]
struct ControlInner {
    paused: bool,
    step_pending: bool,
    quit: bool,
    timeout: Option<Duration>,
    pause_observers: Vec<Sender<bool>>,
}

/// Mutex-guarded control flags shared by both scheduler threads.
///
/// Created at controller construction, reset (not recreated) on reload.
pub struct RunState {
    inner: Mutex<ControlInner>,
}

// Compile-time assertion: RunState must be Send + Sync.
const _: fn() = || {
    fn assert<T: Send + Sync>() {}
    assert::<RunState>();
};

impl RunState {
    /// Create a run state: running (not paused), no step pending, no
    /// quit, no timeout.
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(ControlInner::default()),
        }
    }

    /// Set or clear the paused flag.
    ///
    /// No-op if the flag already has the requested value. On a real
    /// transition, pause observers receive the new value *before* the
    /// control lock is released, so no observer can see the flag
    /// without its notification.
    pub fn set_paused(&self, paused: bool) {
        let mut inner = self.inner.lock();
        if inner.paused == paused {
            return;
        }
        inner.pause_observers.retain(|tx| tx.send(paused).is_ok());
        inner.paused = paused;
    }

    /// Whether the simulation is currently paused.
    pub fn is_paused(&self) -> bool {
        self.inner.lock().paused
    }

    /// Register a pause observer.
    ///
    /// The receiver yields the new paused value at each transition.
    /// Dropping the receiver unregisters the observer at the next
    /// notification.
    pub fn subscribe_pause(&self) -> Receiver<bool> {
        let (tx, rx) = unbounded();
        self.inner.lock().pause_observers.push(tx);
        rx
    }

    /// Request a single-step: advance exactly one tick, then re-pause.
    ///
    /// Consumed and cleared exactly once, by the next
    /// [`begin_tick`](RunState::begin_tick).
    pub fn request_step(&self) {
        self.inner.lock().step_pending = true;
    }

    /// The locked per-tick decision.
    ///
    /// Reads the pause flag and consumes any pending step under a
    /// single lock acquisition: `advance = !paused || step_pending`.
    /// A pause toggle racing with a step request is therefore observed
    /// atomically at this tick boundary, never mid-tick, and each
    /// explicit step request yields at most one tick of advancement.
    pub fn begin_tick(&self) -> TickDecision {
        let mut inner = self.inner.lock();
        let stepped = inner.step_pending;
        let advance = !inner.paused || stepped;
        inner.step_pending = false;
        TickDecision { advance, stepped }
    }

    /// Request shutdown. Monotonic within a run: once set, only
    /// [`reset`](RunState::reset) (a new run) clears it.
    pub fn request_quit(&self) {
        self.inner.lock().quit = true;
    }

    /// Whether shutdown has been requested.
    pub fn quit_requested(&self) -> bool {
        self.inner.lock().quit
    }

    /// Set or clear the run deadline, measured against real time.
    /// `None` means no timeout.
    pub fn set_timeout(&self, timeout: Option<Duration>) {
        self.inner.lock().timeout = timeout;
    }

    /// The configured run deadline, if any.
    pub fn timeout(&self) -> Option<Duration> {
        self.inner.lock().timeout
    }

    /// Start a new run: clear all flags and the deadline.
    ///
    /// Registered pause observers survive a reset.
    pub fn reset(&self) {
        let mut inner = self.inner.lock();
        inner.paused = false;
        inner.step_pending = false;
        inner.quit = false;
        inner.timeout = None;
    }
}

impl Default for RunState {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for RunState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("RunState")
            .field("paused", &inner.paused)
            .field("step_pending", &inner.step_pending)
            .field("quit", &inner.quit)
            .field("timeout", &inner.timeout)
            .field("pause_observers", &inner.pause_observers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_state_is_running() {
        let state = RunState::new();
        assert!(!state.is_paused());
        assert!(!state.quit_requested());
        assert_eq!(state.timeout(), None);
    }

    #[test]
    fn set_paused_same_value_is_noop_and_silent() {
        let state = RunState::new();
        let rx = state.subscribe_pause();
        state.set_paused(false);
        assert!(rx.try_recv().is_err(), "no transition, no notification");
    }

    #[test]
    fn pause_transition_notifies_observers() {
        let state = RunState::new();
        let rx = state.subscribe_pause();

        state.set_paused(true);
        assert_eq!(rx.try_recv(), Ok(true));

        state.set_paused(false);
        assert_eq!(rx.try_recv(), Ok(false));
    }

    #[test]
    fn dropped_observer_is_pruned() {
        let state = RunState::new();
        let rx = state.subscribe_pause();
        drop(rx);
        // Must not panic or wedge; the dead sender is dropped on notify.
        state.set_paused(true);
        assert!(state.is_paused());
    }

    #[test]
    fn begin_tick_advances_while_running() {
        let state = RunState::new();
        let decision = state.begin_tick();
        assert!(decision.advance);
        assert!(!decision.stepped);
    }

    #[test]
    fn begin_tick_holds_while_paused() {
        let state = RunState::new();
        state.set_paused(true);
        let decision = state.begin_tick();
        assert!(!decision.advance);
        assert!(!decision.stepped);
    }

    #[test]
    fn step_is_consumed_exactly_once() {
        let state = RunState::new();
        state.set_paused(true);
        state.request_step();

        let first = state.begin_tick();
        assert!(first.advance);
        assert!(first.stepped);

        let second = state.begin_tick();
        assert!(!second.advance, "step must not survive its tick");
        assert!(!second.stepped);
    }

    #[test]
    fn step_while_running_still_reports_stepped() {
        // A step request that lands while unpaused advances one more
        // tick and then re-pauses.
        let state = RunState::new();
        state.request_step();
        let decision = state.begin_tick();
        assert!(decision.advance);
        assert!(decision.stepped);
    }

    #[test]
    fn pause_racing_step_yields_exactly_one_advance() {
        let state = RunState::new();
        state.set_paused(true);
        state.request_step();
        // Toggling pause between the request and the tick must not
        // produce a second advance for the same request.
        state.set_paused(false);
        state.set_paused(true);

        let first = state.begin_tick();
        assert!(first.advance);
        assert!(first.stepped);
        let second = state.begin_tick();
        assert!(!second.advance);
    }

    #[test]
    fn quit_is_monotonic_within_a_run() {
        let state = RunState::new();
        state.request_quit();
        state.request_quit();
        assert!(state.quit_requested());
    }

    #[test]
    fn timeout_roundtrip() {
        let state = RunState::new();
        state.set_timeout(Some(Duration::from_secs(5)));
        assert_eq!(state.timeout(), Some(Duration::from_secs(5)));
        state.set_timeout(None);
        assert_eq!(state.timeout(), None);
    }

    #[test]
    fn reset_clears_flags_but_keeps_observers() {
        let state = RunState::new();
        let rx = state.subscribe_pause();
        state.set_paused(true);
        state.request_step();
        state.request_quit();
        state.set_timeout(Some(Duration::from_secs(1)));
        assert_eq!(rx.try_recv(), Ok(true));

        state.reset();
        assert!(!state.is_paused());
        assert!(!state.quit_requested());
        assert_eq!(state.timeout(), None);
        let decision = state.begin_tick();
        assert!(!decision.stepped);

        // Observer still registered for the new run.
        state.set_paused(true);
        assert_eq!(rx.try_recv(), Ok(true));
    }
}
