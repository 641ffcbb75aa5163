//! Collaborator-side error types.
//!
//! The scheduler core treats every collaborator failure as fatal for
//! the current run: load failures abort startup, tick failures abort
//! the run. Nothing here is retried; recovery is the caller's concern
//! (close, then start again).

use std::error::Error;
use std::fmt;

/// Errors raised by the world model collaborator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WorldError {
    /// The world's delegated load step failed during startup.
    LoadFailed {
        /// Human-readable description of the failure.
        reason: String,
    },
    /// The world's tick operation failed mid-run.
    ///
    /// Fatal: shared-state invariants can no longer be trusted after a
    /// partial tick, so the run terminates.
    TickFailed {
        /// Human-readable description of the failure.
        reason: String,
    },
}

impl fmt::Display for WorldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LoadFailed { reason } => write!(f, "world load failed: {reason}"),
            Self::TickFailed { reason } => write!(f, "world tick failed: {reason}"),
        }
    }
}

impl Error for WorldError {}

/// Errors raised by the render/GUI collaborator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PresentationError {
    /// The render or GUI subsystem failed its delegated load step.
    LoadFailed {
        /// Human-readable description of the failure.
        reason: String,
    },
}

impl fmt::Display for PresentationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LoadFailed { reason } => write!(f, "presentation load failed: {reason}"),
        }
    }
}

impl Error for PresentationError {}
