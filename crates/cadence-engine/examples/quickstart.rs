//! Cadence quickstart — a complete, minimal simulation from scratch.
//!
//! Demonstrates:
//!   1. Implementing the `WorldModel` collaborator (a falling point mass)
//!   2. Building a `SimConfig` and `SimulationController`
//!   3. Driving pause / single-step / quit from a control thread
//!   4. Reading the clocks and loop metrics after the run
//!
//! Run with:
//!   cargo run --example quickstart

use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use cadence_core::{WorldError, WorldModel};
use cadence_engine::{SimConfig, SimulationController};
use tracing::info;

// ─── World: a point mass under gravity ──────────────────────────

const GRAVITY: f64 = -9.81;
const STEP_SECONDS: f64 = 0.001;

#[derive(Debug, Default)]
struct MassState {
    height: f64,
    velocity: f64,
}

/// Semi-implicit Euler integration of a single falling mass, bouncing
/// at the ground plane.
struct FallingMass {
    state: Mutex<MassState>,
}

impl FallingMass {
    fn new(height: f64) -> Self {
        Self {
            state: Mutex::new(MassState {
                height,
                velocity: 0.0,
            }),
        }
    }

    fn height(&self) -> f64 {
        self.state.lock().unwrap().height
    }
}

impl WorldModel for FallingMass {
    fn load(&self) -> Result<(), WorldError> {
        info!("world loaded");
        Ok(())
    }

    fn tick(&self) -> Result<(), WorldError> {
        let mut state = self.state.lock().unwrap();
        state.velocity += GRAVITY * STEP_SECONDS;
        state.height += state.velocity * STEP_SECONDS;
        if state.height < 0.0 {
            state.height = 0.0;
            state.velocity = -state.velocity * 0.8;
        }
        Ok(())
    }

    fn process_pending_additions(&self) {}

    fn process_pending_deletions(&self) {}

    fn service_inbound_messages(&self) {}

    fn close(&self) {
        info!("world closed");
    }
}

// ─── Main ───────────────────────────────────────────────────────

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let world = Arc::new(FallingMass::new(10.0));

    // 1 ms steps paced to real time, 2 s run deadline, headless.
    let config = SimConfig {
        step_duration: STEP_SECONDS,
        target_update_rate: -1.0,
        timeout_seconds: 2.0,
        ..SimConfig::default()
    };
    let mut controller = SimulationController::new(config, world.clone(), None)?;
    let handle = controller.handle();

    controller.start()?;

    // Drive the control surface from a separate thread while run()
    // occupies this one: pause mid-flight, single-step three times,
    // then resume until the timeout quits the run.
    let driver = {
        let handle = handle.clone();
        let world = Arc::clone(&world);
        thread::spawn(move || {
            thread::sleep(Duration::from_millis(500));
            handle.pause(true);
            info!(height = world.height(), "paused mid-fall");

            for _ in 0..3 {
                let before = handle.sim_time();
                handle.step();
                while handle.sim_time() == before {
                    thread::sleep(Duration::from_millis(1));
                }
                info!(height = world.height(), sim = ?handle.sim_time(), "stepped one tick");
            }

            handle.pause(false);
            info!("resumed");
        })
    };

    controller.run()?;
    driver.join().expect("control thread panicked");

    let metrics = handle.metrics();
    info!(
        sim = ?handle.sim_time(),
        paused = ?handle.pause_time(),
        real = ?handle.real_time(),
        ticks = metrics.ticks_advanced,
        steps = metrics.steps_consumed,
        final_height = world.height(),
        "run complete"
    );

    controller.close();
    Ok(())
}
