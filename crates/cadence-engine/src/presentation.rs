//! Presentation scheduler: the foreground loop refreshing GUI and
//! render-camera state at a fixed cadence.
//!
//! Runs on the thread that called
//! [`SimulationController::run`](crate::controller::SimulationController::run),
//! independent of the physics rate. Steady-state refreshes take no
//! gate lock at all; only the deferred entity add/remove processing
//! enters the removal section, never the update lock.

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use cadence_core::{Presentation, RunState, SimClock, WorldModel};
use tracing::debug;

use crate::gate::WorldUpdateGate;
use crate::metrics::LoopCounters;

/// State borrowed by the foreground loop for the duration of a run.
pub(crate) struct PresentationLoop<'a> {
    pub world: Arc<dyn WorldModel>,
    pub gate: Arc<WorldUpdateGate>,
    pub control: Arc<RunState>,
    pub counters: Arc<LoopCounters>,
    /// `None` in headless mode; refresh calls are skipped entirely.
    pub presentation: Option<&'a mut (dyn Presentation + 'static)>,
    pub period: Duration,
}

impl PresentationLoop<'_> {
    /// Main presentation loop. Runs until quit is observed.
    pub fn run(mut self) {
        debug!(period = ?self.period, headless = self.presentation.is_none(), "presentation loop started");

        let mut last_refresh = SimClock::now();
        while !self.control.quit_requested() {
            let since = SimClock::elapsed_since(last_refresh);
            if since < self.period {
                thread::sleep(self.period - since);
                continue;
            }
            last_refresh = SimClock::now();

            if let Some(p) = self.presentation.as_deref_mut() {
                p.refresh_widgets();
                p.refresh_cameras();
            }

            // Structural world mutation is deferred to this cadence so
            // topology never changes mid-integration.
            {
                let _section = self.gate.removal_section();
                self.world.process_pending_additions();
                self.world.process_pending_deletions();
            }
            self.counters
                .presentation_refreshes
                .fetch_add(1, Ordering::Relaxed);

            let spent = SimClock::elapsed_since(last_refresh);
            if spent < self.period {
                thread::sleep(self.period - spent);
            }
        }

        debug!("presentation loop stopped");
    }
}
