//! Physics scheduler: the background loop that advances simulated time
//! and invokes the world's tick at a regulated rate.
//!
//! The loop owns no world state. Each iteration takes the locked
//! control decision, charges exactly one fixed step to either the
//! simulated or the paused clock, runs the world tick inside the
//! gate's tick section, then sleeps to hold the configured pace.
//! A tick failure is fatal: the loop raises quit so the presentation
//! loop winds down, and the error travels back through the join handle.

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use cadence_core::{RunState, SimClock, WorldError, WorldModel};
use tracing::{debug, error, info};

use crate::config::{Pacing, MIN_SLEEP_GRANULARITY};
use crate::gate::WorldUpdateGate;
use crate::metrics::LoopCounters;

/// State moved onto the physics thread.
pub(crate) struct PhysicsLoop {
    pub world: Arc<dyn WorldModel>,
    pub gate: Arc<WorldUpdateGate>,
    pub clock: Arc<SimClock>,
    pub control: Arc<RunState>,
    pub counters: Arc<LoopCounters>,
    pub step: Duration,
    pub pacing: Pacing,
}

impl PhysicsLoop {
    /// Main physics loop. Runs until quit is observed.
    pub fn run(self) -> Result<(), WorldError> {
        debug!(step = ?self.step, pacing = ?self.pacing, "physics loop started");

        loop {
            if self.control.quit_requested() {
                break;
            }

            // Locked decision: pause read and step consumption are one
            // acquisition, so a racing toggle lands on a tick boundary.
            let decision = self.control.begin_tick();
            if decision.advance {
                self.clock.advance_sim(self.step);
                self.counters.ticks_advanced.fetch_add(1, Ordering::Relaxed);
            } else {
                self.clock.advance_pause(self.step);
                self.counters.ticks_paused.fetch_add(1, Ordering::Relaxed);
            }
            if decision.stepped {
                self.counters.steps_consumed.fetch_add(1, Ordering::Relaxed);
            }

            let tick_start = self.clock.real_time();

            {
                let _section = self.gate.tick_section();
                if let Err(err) = self.world.tick() {
                    error!(%err, "world tick failed, terminating run");
                    self.control.request_quit();
                    return Err(err);
                }
            }

            let now = self.clock.real_time();
            let lead = (self.clock.sim_time() + self.clock.pause_time()).saturating_sub(now);
            let elapsed = now.saturating_sub(tick_start);
            thread::sleep(sleep_duration(self.pacing, lead, elapsed));

            self.world.service_inbound_messages();

            if let Some(deadline) = self.control.timeout() {
                if self.clock.real_time() > deadline {
                    info!(?deadline, "run timeout reached, quitting");
                    self.control.request_quit();
                    break;
                }
            }

            // A consumed single-step always re-pauses: advance exactly
            // one tick, then hold.
            if decision.stepped {
                self.control.set_paused(true);
            }
        }

        debug!("physics loop stopped");
        Ok(())
    }
}

/// Sleep needed to hold the configured pace for one iteration.
///
/// `lead` is how far accumulated simulated+paused time is ahead of
/// real time; `tick_elapsed` is the wall time this tick's world update
/// took. The result never drops below [`MIN_SLEEP_GRANULARITY`].
fn sleep_duration(pacing: Pacing, lead: Duration, tick_elapsed: Duration) -> Duration {
    let regulated = match pacing {
        Pacing::MatchRealTime => lead,
        Pacing::FixedPeriod(period) => period.saturating_sub(tick_elapsed),
        Pacing::FreeRun => Duration::ZERO,
    };
    regulated.max(MIN_SLEEP_GRANULARITY)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn free_run_sleeps_only_the_floor() {
        let d = sleep_duration(Pacing::FreeRun, Duration::from_secs(5), Duration::ZERO);
        assert_eq!(d, MIN_SLEEP_GRANULARITY);
    }

    #[test]
    fn match_real_time_sleeps_off_the_lead() {
        let lead = Duration::from_millis(3);
        let d = sleep_duration(Pacing::MatchRealTime, lead, Duration::ZERO);
        assert_eq!(d, lead);
    }

    #[test]
    fn match_real_time_behind_schedule_sleeps_the_floor() {
        let d = sleep_duration(Pacing::MatchRealTime, Duration::ZERO, Duration::ZERO);
        assert_eq!(d, MIN_SLEEP_GRANULARITY);
    }

    #[test]
    fn fixed_period_sleeps_the_remainder() {
        let period = Duration::from_millis(10);
        let d = sleep_duration(
            Pacing::FixedPeriod(period),
            Duration::ZERO,
            Duration::from_millis(4),
        );
        assert_eq!(d, Duration::from_millis(6));
    }

    #[test]
    fn fixed_period_overrun_sleeps_the_floor() {
        let period = Duration::from_millis(10);
        let d = sleep_duration(
            Pacing::FixedPeriod(period),
            Duration::ZERO,
            Duration::from_millis(25),
        );
        assert_eq!(d, MIN_SLEEP_GRANULARITY);
    }

    proptest! {
        /// The floor holds for every pacing mode and input, and a fixed
        /// period is never overshot.
        #[test]
        fn sleep_is_floored_and_bounded(
            lead_us in 0u64..2_000_000,
            elapsed_us in 0u64..2_000_000,
            period_us in 1u64..1_000_000,
        ) {
            let lead = Duration::from_micros(lead_us);
            let elapsed = Duration::from_micros(elapsed_us);
            let period = Duration::from_micros(period_us);

            for pacing in [
                Pacing::FreeRun,
                Pacing::MatchRealTime,
                Pacing::FixedPeriod(period),
            ] {
                let d = sleep_duration(pacing, lead, elapsed);
                prop_assert!(d >= MIN_SLEEP_GRANULARITY);
                if let Pacing::FixedPeriod(p) = pacing {
                    prop_assert!(d <= p.max(MIN_SLEEP_GRANULARITY));
                }
            }
        }
    }
}
