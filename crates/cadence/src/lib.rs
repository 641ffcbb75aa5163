//! Cadence: a real-time simulation stepping core.
//!
//! This is the top-level facade crate that re-exports the public API
//! from the Cadence sub-crates. For most users, adding `cadence` as a
//! single dependency is sufficient.
//!
//! A [`engine::SimulationController`] runs two cooperating loops over
//! a shared world model: a background physics thread advancing
//! simulated time by a fixed step at a regulated rate, and a
//! foreground presentation loop refreshing GUI/camera state at its own
//! cadence. Pause, single-step, quit, and timeout control is shared
//! through one mutex-guarded run state; world mutation is fenced by a
//! pair of reentrant locks acquired in a fixed order.
//!
//! # Quick start
//!
//! ```rust
//! use std::sync::atomic::{AtomicU64, Ordering};
//! use std::sync::Arc;
//!
//! use cadence::prelude::*;
//!
//! // A minimal world: each tick just counts.
//! #[derive(Default)]
//! struct CounterWorld {
//!     ticks: AtomicU64,
//! }
//!
//! impl WorldModel for CounterWorld {
//!     fn load(&self) -> Result<(), WorldError> {
//!         Ok(())
//!     }
//!     fn tick(&self) -> Result<(), WorldError> {
//!         self.ticks.fetch_add(1, Ordering::Relaxed);
//!         Ok(())
//!     }
//!     fn process_pending_additions(&self) {}
//!     fn process_pending_deletions(&self) {}
//!     fn service_inbound_messages(&self) {}
//!     fn close(&self) {}
//! }
//!
//! // Headless run: 1 ms steps, unregulated pace, 50 ms deadline.
//! let world = Arc::new(CounterWorld::default());
//! let config = SimConfig {
//!     step_duration: 0.001,
//!     target_update_rate: 0.0,
//!     timeout_seconds: 0.05,
//!     ..SimConfig::default()
//! };
//! let mut controller = SimulationController::new(config, world.clone(), None).unwrap();
//! controller.start().unwrap();
//! controller.run().unwrap();
//!
//! assert!(world.ticks.load(Ordering::Relaxed) > 0);
//! assert_eq!(
//!     controller.sim_time(),
//!     std::time::Duration::from_millis(1) * world.ticks.load(Ordering::Relaxed) as u32,
//! );
//! controller.close();
//! ```
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate. Use them for types not in
//! the prelude:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `cadence-core` | Clock, run state, collaborator traits, entity index |
//! | [`engine`] | `cadence-engine` | Configuration, gate, schedulers, controller |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core types and traits (`cadence-core`).
///
/// Contains the simulation clock, the run-state control flags, the
/// [`types::WorldModel`] / [`types::Presentation`] collaborator
/// traits, the collaborator error enums, and the capability-tagged
/// entity index.
pub use cadence_core as types;

/// Scheduler engine (`cadence-engine`).
///
/// [`engine::SimulationController`] owns the dual-loop scheduler;
/// [`engine::ControlHandle`] is the cloneable control surface;
/// [`engine::WorldUpdateGate`] fences world mutation.
pub use cadence_engine as engine;

/// Common imports for typical Cadence usage.
///
/// ```rust
/// use cadence::prelude::*;
/// ```
pub mod prelude {
    // Core types and traits
    pub use cadence_core::{
        Capability, EntityId, EntityIndex, Presentation, PresentationError, RunState, SimClock,
        TickDecision, WorldError, WorldModel,
    };

    // Engine
    pub use cadence_engine::{
        ConfigError, ControlHandle, LoadError, LoopMetrics, Pacing, RunError, SimConfig,
        SimulationController, WorldUpdateGate,
    };
}
