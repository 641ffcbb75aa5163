//! Scheduler configuration, validation, and error types.
//!
//! [`SimConfig`] is the input the configuration loader supplies to
//! [`SimulationController::new`](crate::controller::SimulationController::new).
//! Validation rejects invalid rates at construction; nothing is
//! silently clamped except the minimum sleep granularity floor, which
//! is a deliberate clamp applied at runtime, not a validation concern.

use std::error::Error;
use std::fmt;
use std::time::Duration;

/// Floor applied to every computed scheduler sleep.
///
/// Prevents the regulation loops from degenerating into busy-spins
/// when the target period has already elapsed.
pub const MIN_SLEEP_GRANULARITY: Duration = Duration::from_micros(10);

// ── Pacing ─────────────────────────────────────────────────────────

/// Typed rendering of the signed physics update rate.
///
/// The configuration surface keeps the signed convention (negative =
/// match real time, zero = unregulated, positive = target Hz); the
/// schedulers only ever see this enum.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Pacing {
    /// Pace ticks so accumulated simulated+paused time tracks
    /// wall-clock elapsed time.
    MatchRealTime,
    /// Hold each tick to a fixed target period.
    FixedPeriod(Duration),
    /// No regulation beyond the minimum sleep granularity.
    FreeRun,
}

// ── ConfigError ────────────────────────────────────────────────────

/// Errors detected during [`SimConfig::validate`].
#[derive(Clone, Debug, PartialEq)]
pub enum ConfigError {
    /// `step_duration` is NaN, infinite, zero, or negative.
    InvalidStepDuration {
        /// The invalid value.
        value: f64,
    },
    /// `target_update_rate` is NaN or infinite, or its reciprocal is
    /// not finite (subnormal rates would overflow the tick period).
    InvalidUpdateRate {
        /// The invalid value.
        value: f64,
    },
    /// `presentation_hz` is NaN, infinite, zero, or negative, or its
    /// reciprocal is not finite.
    InvalidPresentationRate {
        /// The invalid value.
        value: f64,
    },
    /// `timeout_seconds` is NaN or infinite.
    InvalidTimeout {
        /// The invalid value.
        value: f64,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidStepDuration { value } => {
                write!(f, "step_duration must be finite and positive, got {value}")
            }
            Self::InvalidUpdateRate { value } => {
                write!(f, "target_update_rate must be finite with a finite period, got {value}")
            }
            Self::InvalidPresentationRate { value } => {
                write!(f, "presentation_hz must be finite and positive, got {value}")
            }
            Self::InvalidTimeout { value } => {
                write!(f, "timeout_seconds must be finite, got {value}")
            }
        }
    }
}

impl Error for ConfigError {}

// ── SimConfig ──────────────────────────────────────────────────────

/// Complete configuration for one simulation run.
///
/// Raw values mirror what the external configuration loader supplies;
/// the typed accessors ([`step`](SimConfig::step),
/// [`pacing`](SimConfig::pacing),
/// [`presentation_period`](SimConfig::presentation_period),
/// [`timeout`](SimConfig::timeout)) are what the schedulers consume.
#[derive(Clone, Debug)]
pub struct SimConfig {
    /// Simulated-time increment per physics tick, in seconds.
    pub step_duration: f64,
    /// Signed physics update rate: negative matches real time, zero
    /// disables regulation, positive is a target tick rate in Hz.
    pub target_update_rate: f64,
    /// Presentation refresh cadence in Hz.
    pub presentation_hz: f64,
    /// Run deadline against real time, in seconds. Negative disables
    /// the timeout.
    pub timeout_seconds: f64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            step_duration: 0.001,
            target_update_rate: -1.0,
            presentation_hz: 80.0,
            timeout_seconds: -1.0,
        }
    }
}

impl SimConfig {
    /// Validate all structural invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        // 1. Step duration must be finite and positive.
        if !self.step_duration.is_finite() || self.step_duration <= 0.0 {
            return Err(ConfigError::InvalidStepDuration {
                value: self.step_duration,
            });
        }
        // 2. Update rate must be finite. A positive rate must also
        //    have a finite reciprocal (rejects subnormals where
        //    1.0/hz = inf, which would panic in Duration::from_secs_f64).
        if !self.target_update_rate.is_finite()
            || (self.target_update_rate > 0.0 && !(1.0 / self.target_update_rate).is_finite())
        {
            return Err(ConfigError::InvalidUpdateRate {
                value: self.target_update_rate,
            });
        }
        // 3. Presentation cadence must be finite, positive, with a
        //    finite period.
        if !self.presentation_hz.is_finite()
            || self.presentation_hz <= 0.0
            || !(1.0 / self.presentation_hz).is_finite()
        {
            return Err(ConfigError::InvalidPresentationRate {
                value: self.presentation_hz,
            });
        }
        // 4. Timeout must be finite (negative = disabled is valid).
        if self.timeout_seconds.is_nan() || self.timeout_seconds.is_infinite() {
            return Err(ConfigError::InvalidTimeout {
                value: self.timeout_seconds,
            });
        }
        Ok(())
    }

    /// The fixed per-tick simulated-time increment.
    pub fn step(&self) -> Duration {
        Duration::from_secs_f64(self.step_duration)
    }

    /// The physics pacing policy.
    pub fn pacing(&self) -> Pacing {
        if self.target_update_rate < 0.0 {
            Pacing::MatchRealTime
        } else if self.target_update_rate > 0.0 {
            Pacing::FixedPeriod(Duration::from_secs_f64(1.0 / self.target_update_rate))
        } else {
            Pacing::FreeRun
        }
    }

    /// The presentation refresh period.
    pub fn presentation_period(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.presentation_hz)
    }

    /// The run deadline, if enabled.
    pub fn timeout(&self) -> Option<Duration> {
        if self.timeout_seconds > 0.0 {
            Some(Duration::from_secs_f64(self.timeout_seconds))
        } else {
            None
        }
    }
}
