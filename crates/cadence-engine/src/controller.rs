//! Simulation controller: owns both schedulers, exposes the
//! pause/step/quit/timeout control surface, and sequences startup and
//! shutdown.
//!
//! # Lifecycle
//!
//! ```text
//! new() ──> Idle ──start()──> Running ──close()──> Stopped
//!                               │   ▲                 │
//!                             run() │                 └──start()──> Running
//!                               └───┘   (reload resets clock + run state)
//! ```
//!
//! `start()` spawns the physics thread; `run()` drives the presentation
//! loop on the calling thread until quit, then joins the physics thread
//! and surfaces its result. `close()` is idempotent and safe after a
//! failed `start()`.

use std::error::Error;
use std::fmt;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use cadence_core::{
    Presentation, PresentationError, RunState, SimClock, WorldError, WorldModel,
};
use crossbeam_channel::Receiver;
use tracing::{error, info};

use crate::config::{ConfigError, SimConfig};
use crate::gate::WorldUpdateGate;
use crate::metrics::{LoopCounters, LoopMetrics};
use crate::physics::PhysicsLoop;
use crate::presentation::PresentationLoop;

// ── Error types ────────────────────────────────────────────────────

/// Fatal startup failure from [`SimulationController::start`].
///
/// Every variant aborts startup and leaves no physics thread running.
#[derive(Debug)]
pub enum LoadError {
    /// The world collaborator failed its delegated load step.
    World(WorldError),
    /// The render/GUI collaborator failed its delegated load step.
    Presentation(PresentationError),
    /// The physics thread could not be spawned.
    ThreadSpawn {
        /// Description of the spawn failure.
        reason: String,
    },
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::World(e) => write!(f, "load failed: {e}"),
            Self::Presentation(e) => write!(f, "load failed: {e}"),
            Self::ThreadSpawn { reason } => {
                write!(f, "load failed: physics thread spawn: {reason}")
            }
        }
    }
}

impl Error for LoadError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::World(e) => Some(e),
            Self::Presentation(e) => Some(e),
            Self::ThreadSpawn { .. } => None,
        }
    }
}

/// Fatal run failure from [`SimulationController::run`].
#[derive(Debug)]
pub enum RunError {
    /// `run()` was called before a successful `start()`.
    NotStarted,
    /// The world's tick operation failed mid-run.
    Tick(WorldError),
    /// The physics thread panicked.
    PhysicsThreadPanicked,
}

impl fmt::Display for RunError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotStarted => write!(f, "simulation was not started"),
            Self::Tick(e) => write!(f, "run aborted: {e}"),
            Self::PhysicsThreadPanicked => write!(f, "physics thread panicked"),
        }
    }
}

impl Error for RunError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Tick(e) => Some(e),
            _ => None,
        }
    }
}

// ── Lifecycle state ────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum LifecycleState {
    Idle,
    Running,
    Stopped,
}

// ── ControlHandle ──────────────────────────────────────────────────

/// Cloneable handle onto the shared control surface.
///
/// Lets GUI callbacks, signal handlers, or test drivers toggle pause,
/// request steps, and read clocks while
/// [`SimulationController::run`] occupies the controller itself.
#[derive(Clone)]
pub struct ControlHandle {
    clock: Arc<SimClock>,
    control: Arc<RunState>,
    counters: Arc<LoopCounters>,
}

impl ControlHandle {
    /// Pause or resume the simulation. Observed at the next tick
    /// boundary, never mid-tick.
    pub fn pause(&self, paused: bool) {
        self.control.set_paused(paused);
    }

    /// Whether the simulation is currently paused.
    pub fn is_paused(&self) -> bool {
        self.control.is_paused()
    }

    /// Advance exactly one tick, then re-pause.
    pub fn step(&self) {
        self.control.request_step();
    }

    /// Request shutdown of both scheduler loops.
    pub fn request_quit(&self) {
        self.control.request_quit();
    }

    /// Whether shutdown has been requested.
    pub fn quit_requested(&self) -> bool {
        self.control.quit_requested()
    }

    /// Set or clear the run deadline against real time.
    pub fn set_timeout(&self, timeout: Option<Duration>) {
        self.control.set_timeout(timeout);
    }

    /// Register a pause observer; yields the new paused value at each
    /// transition.
    pub fn subscribe_pause(&self) -> Receiver<bool> {
        self.control.subscribe_pause()
    }

    /// Accumulated simulated time.
    pub fn sim_time(&self) -> Duration {
        self.clock.sim_time()
    }

    /// Accumulated paused time.
    pub fn pause_time(&self) -> Duration {
        self.clock.pause_time()
    }

    /// Wall-clock time elapsed in the current run.
    pub fn real_time(&self) -> Duration {
        self.clock.real_time()
    }

    /// Snapshot of the loop counters.
    pub fn metrics(&self) -> LoopMetrics {
        self.counters.snapshot()
    }
}

impl fmt::Debug for ControlHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ControlHandle")
            .field("paused", &self.is_paused())
            .field("quit", &self.quit_requested())
            .finish()
    }
}

// ── SimulationController ───────────────────────────────────────────

/// Owner of the dual-loop scheduler.
///
/// Holds explicit handles to the world and presentation collaborators
/// (passed in at construction, never reached through globals), the
/// shared clock and run state, and the world-update gate.
pub struct SimulationController {
    world: Arc<dyn WorldModel>,
    presentation: Option<Box<dyn Presentation>>,
    gate: Arc<WorldUpdateGate>,
    clock: Arc<SimClock>,
    control: Arc<RunState>,
    counters: Arc<LoopCounters>,
    config: SimConfig,
    physics_thread: Option<JoinHandle<Result<(), WorldError>>>,
    state: LifecycleState,
}

// Compile-time assertion: the controller must be Send so a host
// application can own it from a non-main thread.
const _: fn() = || {
    fn assert<T: Send>() {}
    assert::<SimulationController>();
};

impl SimulationController {
    /// Create a controller from a validated configuration and the
    /// collaborator handles. `presentation: None` is headless mode.
    ///
    /// # Errors
    ///
    /// Invalid rates or timeouts are rejected here, never clamped.
    pub fn new(
        config: SimConfig,
        world: Arc<dyn WorldModel>,
        presentation: Option<Box<dyn Presentation>>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            world,
            presentation,
            gate: Arc::new(WorldUpdateGate::new()),
            clock: Arc::new(SimClock::new()),
            control: Arc::new(RunState::new()),
            counters: Arc::new(LoopCounters::default()),
            config,
            physics_thread: None,
            state: LifecycleState::Idle,
        })
    }

    /// Cloneable handle onto the control surface and clocks.
    pub fn handle(&self) -> ControlHandle {
        ControlHandle {
            clock: Arc::clone(&self.clock),
            control: Arc::clone(&self.control),
            counters: Arc::clone(&self.counters),
        }
    }

    /// Load the collaborators and spawn the physics thread.
    ///
    /// If the controller is already running this is a reload: the
    /// previous run is closed first, and clock, run state, and
    /// counters are reset (not recreated).
    ///
    /// # Errors
    ///
    /// Any delegated load failure is fatal and leaves no dangling
    /// thread: the physics thread is spawned only after every load
    /// step has succeeded. A world that loaded before a later failure
    /// is closed again before returning.
    pub fn start(&mut self) -> Result<(), LoadError> {
        if self.state == LifecycleState::Running {
            self.close();
        }

        self.clock.reset();
        self.control.reset();
        self.counters.reset();
        self.control.set_timeout(self.config.timeout());

        self.world.load().map_err(LoadError::World)?;
        if let Some(p) = self.presentation.as_deref_mut() {
            if let Err(e) = p.load() {
                self.world.close();
                return Err(LoadError::Presentation(e));
            }
        }

        let physics = PhysicsLoop {
            world: Arc::clone(&self.world),
            gate: Arc::clone(&self.gate),
            clock: Arc::clone(&self.clock),
            control: Arc::clone(&self.control),
            counters: Arc::clone(&self.counters),
            step: self.config.step(),
            pacing: self.config.pacing(),
        };
        let spawned = thread::Builder::new()
            .name("cadence-physics".into())
            .spawn(move || physics.run());
        let handle = match spawned {
            Ok(h) => h,
            Err(e) => {
                self.world.close();
                if let Some(p) = self.presentation.as_deref_mut() {
                    p.close();
                }
                return Err(LoadError::ThreadSpawn {
                    reason: e.to_string(),
                });
            }
        };

        self.physics_thread = Some(handle);
        self.state = LifecycleState::Running;
        info!(config = ?self.config, "simulation started");
        Ok(())
    }

    /// Drive the presentation loop on the calling thread until quit,
    /// then join the physics thread.
    ///
    /// # Errors
    ///
    /// Returns [`RunError::Tick`] if the world's tick failed mid-run
    /// (fatal; the run is over), [`RunError::PhysicsThreadPanicked`]
    /// if the physics thread died, or [`RunError::NotStarted`] if
    /// `start()` has not succeeded.
    pub fn run(&mut self) -> Result<(), RunError> {
        if self.state != LifecycleState::Running {
            return Err(RunError::NotStarted);
        }

        let foreground = PresentationLoop {
            world: Arc::clone(&self.world),
            gate: Arc::clone(&self.gate),
            control: Arc::clone(&self.control),
            counters: Arc::clone(&self.counters),
            presentation: self.presentation.as_deref_mut(),
            period: self.config.presentation_period(),
        };
        foreground.run();

        self.join_physics()
    }

    /// Pause or resume the simulation.
    pub fn pause(&self, paused: bool) {
        self.control.set_paused(paused);
    }

    /// Whether the simulation is currently paused.
    pub fn is_paused(&self) -> bool {
        self.control.is_paused()
    }

    /// Advance exactly one tick, then re-pause.
    pub fn step(&self) {
        self.control.request_step();
    }

    /// Request shutdown of both scheduler loops.
    pub fn request_quit(&self) {
        self.control.request_quit();
    }

    /// Set or clear the run deadline against real time.
    pub fn set_timeout(&self, timeout: Option<Duration>) {
        self.control.set_timeout(timeout);
    }

    /// Accumulated simulated time.
    pub fn sim_time(&self) -> Duration {
        self.clock.sim_time()
    }

    /// Accumulated paused time.
    pub fn pause_time(&self) -> Duration {
        self.clock.pause_time()
    }

    /// Wall-clock time elapsed in the current run.
    pub fn real_time(&self) -> Duration {
        self.clock.real_time()
    }

    /// Snapshot of the loop counters.
    pub fn metrics(&self) -> LoopMetrics {
        self.counters.snapshot()
    }

    /// Release all resources.
    ///
    /// Idempotent: no-op if never started (including after a failed
    /// `start()`, which already unwound its own partial loads) and
    /// no-op on a second call. Stops and joins the physics thread if
    /// it is still running, then closes the world and the presentation
    /// collaborator, in that order.
    pub fn close(&mut self) {
        if self.state != LifecycleState::Running {
            return;
        }

        self.control.request_quit();
        if let Some(handle) = self.physics_thread.take() {
            match handle.join() {
                Ok(Ok(())) => {}
                Ok(Err(err)) => error!(%err, "physics thread exited with tick failure"),
                Err(_) => error!("physics thread panicked"),
            }
        }

        self.world.close();
        if let Some(p) = self.presentation.as_deref_mut() {
            p.close();
        }

        self.state = LifecycleState::Stopped;
        info!("simulation closed");
    }

    fn join_physics(&mut self) -> Result<(), RunError> {
        match self.physics_thread.take() {
            None => Ok(()),
            Some(handle) => match handle.join() {
                Ok(Ok(())) => Ok(()),
                Ok(Err(err)) => Err(RunError::Tick(err)),
                Err(_) => Err(RunError::PhysicsThreadPanicked),
            },
        }
    }
}

impl Drop for SimulationController {
    fn drop(&mut self) {
        self.close();
    }
}

impl fmt::Debug for SimulationController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimulationController")
            .field("state", &self.state)
            .field("headless", &self.presentation.is_none())
            .field("paused", &self.control.is_paused())
            .field("sim_time", &self.clock.sim_time())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cadence_test_utils::CountingWorld;

    #[test]
    fn new_rejects_invalid_config() {
        let config = SimConfig {
            step_duration: f64::NAN,
            ..SimConfig::default()
        };
        let world = Arc::new(CountingWorld::new());
        match SimulationController::new(config, world, None) {
            Err(ConfigError::InvalidStepDuration { .. }) => {}
            other => panic!("expected InvalidStepDuration, got {other:?}"),
        }
    }

    #[test]
    fn run_before_start_is_an_error() {
        let world = Arc::new(CountingWorld::new());
        let mut controller =
            SimulationController::new(SimConfig::default(), world, None).unwrap();
        match controller.run() {
            Err(RunError::NotStarted) => {}
            other => panic!("expected NotStarted, got {other:?}"),
        }
    }

    #[test]
    fn close_before_start_is_a_noop() {
        let world = Arc::new(CountingWorld::new());
        let world_probe = Arc::clone(&world);
        let mut controller =
            SimulationController::new(SimConfig::default(), world, None).unwrap();
        controller.close();
        controller.close();
        assert_eq!(world_probe.close_calls(), 0);
    }

    #[test]
    fn debug_impl_doesnt_panic() {
        let world = Arc::new(CountingWorld::new());
        let controller = SimulationController::new(SimConfig::default(), world, None).unwrap();
        let debug = format!("{controller:?}");
        assert!(debug.contains("SimulationController"));
        assert!(debug.contains("headless"));
    }

    #[test]
    fn error_display_formats() {
        let err = LoadError::ThreadSpawn {
            reason: "resource limit".to_string(),
        };
        assert!(format!("{err}").contains("physics thread spawn"));

        let err = RunError::Tick(WorldError::TickFailed {
            reason: "solver diverged".to_string(),
        });
        assert!(format!("{err}").contains("solver diverged"));
    }
}
