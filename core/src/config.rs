//! Experiment configuration types

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::trace::{generate_cold_start, generate_warm_start, TraceError, TraceSet};

/// Which kind of arrival schedule to synthesize
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TraceMode {
    /// One continuous stream at the target rate
    #[default]
    WarmStart,

    /// Staggered streams, each idle for at least `cooldown_seconds`
    ColdStart {
        /// Idle time after which the platform evicts an instance
        cooldown_seconds: u32,
    },
}

/// Experiment configuration
///
/// Defines the arrival schedule of a run and the limits applied while
/// dispatching it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExperimentConfig {
    /// Experiment length in minutes
    pub duration_minutes: u32,

    /// Target aggregate requests per second
    pub rps_target: f64,

    /// Warm-start or cold-start schedule
    #[serde(default)]
    pub mode: TraceMode,

    /// Deadline for a single invocation
    #[serde(default = "default_invocation_timeout_ms")]
    pub invocation_timeout_ms: u64,

    /// Minimum good-outcome fraction for a healthy run
    #[serde(default = "default_overload_threshold")]
    pub overload_threshold: f64,
}

fn default_invocation_timeout_ms() -> u64 {
    15 * 60 * 1000
}

fn default_overload_threshold() -> f64 {
    0.8
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            duration_minutes: 1,
            rps_target: 1.0,
            mode: TraceMode::default(),
            invocation_timeout_ms: default_invocation_timeout_ms(),
            overload_threshold: default_overload_threshold(),
        }
    }
}

impl ExperimentConfig {
    /// Warm-start config for the given duration and rate
    pub fn warm_start(duration_minutes: u32, rps_target: f64) -> Self {
        Self {
            duration_minutes,
            rps_target,
            ..Default::default()
        }
    }

    /// Cold-start config for the given duration, rate and cooldown
    pub fn cold_start(duration_minutes: u32, rps_target: f64, cooldown_seconds: u32) -> Self {
        Self {
            duration_minutes,
            rps_target,
            mode: TraceMode::ColdStart { cooldown_seconds },
            ..Default::default()
        }
    }

    /// Set the invocation timeout
    pub fn with_invocation_timeout(mut self, timeout: Duration) -> Self {
        self.invocation_timeout_ms = timeout.as_millis() as u64;
        self
    }

    /// Set the overload threshold
    pub fn with_overload_threshold(mut self, threshold: f64) -> Self {
        self.overload_threshold = threshold;
        self
    }

    /// Invocation timeout as a `Duration`
    pub fn invocation_timeout(&self) -> Duration {
        Duration::from_millis(self.invocation_timeout_ms)
    }

    /// Load a JSON configuration file
    pub fn from_json_file(path: impl AsRef<Path>) -> crate::Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&raw)?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.duration_minutes == 0 {
            return Err(ConfigError::InvalidDuration(
                "duration must be at least one minute".into(),
            ));
        }

        if !self.rps_target.is_finite() || self.rps_target < 0.0 {
            return Err(ConfigError::InvalidRate(format!(
                "rps target must be finite and non-negative, got {}",
                self.rps_target
            )));
        }

        if let TraceMode::ColdStart { cooldown_seconds } = self.mode {
            if cooldown_seconds == 0 {
                return Err(ConfigError::InvalidCooldown(
                    "cooldown must be at least one second".into(),
                ));
            }
        }

        if self.invocation_timeout_ms == 0 {
            return Err(ConfigError::InvalidTimeout(
                "invocation timeout must be positive".into(),
            ));
        }

        if !(0.0..=1.0).contains(&self.overload_threshold) {
            return Err(ConfigError::InvalidThreshold(format!(
                "overload threshold must be within [0, 1], got {}",
                self.overload_threshold
            )));
        }

        Ok(())
    }

    /// Synthesize the arrival schedule described by this configuration
    pub fn generate_trace(&self) -> Result<TraceSet, TraceError> {
        let streams = match self.mode {
            TraceMode::WarmStart => {
                vec![generate_warm_start(self.duration_minutes, self.rps_target)?]
            }
            TraceMode::ColdStart { cooldown_seconds } => {
                generate_cold_start(self.duration_minutes, self.rps_target, cooldown_seconds)?
            }
        };
        Ok(TraceSet::new(self.duration_minutes, streams))
    }
}

/// Configuration validation errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Invalid experiment duration
    #[error("Invalid duration: {0}")]
    InvalidDuration(String),

    /// Invalid target rate
    #[error("Invalid rate: {0}")]
    InvalidRate(String),

    /// Invalid cold-start cooldown
    #[error("Invalid cooldown: {0}")]
    InvalidCooldown(String),

    /// Invalid invocation timeout
    #[error("Invalid timeout: {0}")]
    InvalidTimeout(String),

    /// Invalid overload threshold
    #[error("Invalid overload threshold: {0}")]
    InvalidThreshold(String),
}
