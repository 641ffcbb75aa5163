//! Dual-loop scheduler orchestrating Cadence simulation runs.
//!
//! A [`SimulationController`] owns two cooperating loops over a shared
//! world model: the physics scheduler on a background thread advances
//! simulated time at a regulated rate, and the presentation scheduler
//! on the calling thread refreshes GUI/camera state at a fixed cadence.
//! Pause, single-step, quit, and timeout control is shared through a
//! single mutex-guarded run state.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod controller;
pub mod gate;
pub mod metrics;

mod physics;
mod presentation;

pub use config::{ConfigError, Pacing, SimConfig, MIN_SLEEP_GRANULARITY};
pub use controller::{ControlHandle, LoadError, RunError, SimulationController};
pub use gate::{RemovalSection, TickSection, WorldUpdateGate};
pub use metrics::LoopMetrics;
