//! Run configuration and the engine-side error types.

use std::error::Error;
use std::fmt;
use std::io;

use orrery_core::constants::DEFAULT_MAX_MB;
use orrery_core::{ConfigError, PhysicsConfig, ProtocolError};

use crate::isolate::ExecStrategy;

/// Configuration for one integrator run.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RunConfig {
    /// Physics parameters, validated at spawn.
    pub physics: PhysicsConfig,
    /// Tick cache budget in mebibytes.
    pub max_cache_mb: usize,
    /// How the execution context is hosted.
    pub strategy: ExecStrategy,
    /// Target tick rate. `None` runs ticks back to back, which is what
    /// tests and offline baking want; interactive callers pace at the
    /// playback rate.
    pub tick_rate_hz: Option<f64>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            physics: PhysicsConfig::default(),
            max_cache_mb: DEFAULT_MAX_MB,
            strategy: ExecStrategy::Auto,
            tick_rate_hz: Some(1.0 / orrery_core::constants::TICK_DURATION),
        }
    }
}

impl RunConfig {
    /// Check structural invariants before any context is created.
    pub fn validate(&self) -> Result<(), SpawnError> {
        self.physics.validate()?;
        if self.max_cache_mb == 0 {
            return Err(SpawnError::ZeroCacheBudget);
        }
        if let Some(hz) = self.tick_rate_hz {
            if !hz.is_finite() || hz <= 0.0 {
                return Err(SpawnError::InvalidTickRate { value: hz });
            }
        }
        Ok(())
    }
}

/// Failure to bring up an execution context.
#[derive(Debug)]
pub enum SpawnError {
    /// The physics config or body batch failed validation.
    Config(ConfigError),
    /// The tick rate is not a positive finite number.
    InvalidTickRate {
        /// The rejected rate.
        value: f64,
    },
    /// A zero-mebibyte cache cannot retain even the newest tick.
    ZeroCacheBudget,
    /// The host refused to spawn the context thread.
    Thread(io::Error),
}

impl fmt::Display for SpawnError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "invalid run configuration: {e}"),
            Self::InvalidTickRate { value } => {
                write!(f, "tick rate must be positive and finite, got {value}")
            }
            Self::ZeroCacheBudget => write!(f, "tick cache budget must be at least 1 MiB"),
            Self::Thread(e) => write!(f, "failed to spawn execution context thread: {e}"),
        }
    }
}

impl Error for SpawnError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            Self::Thread(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigError> for SpawnError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

/// Failure to deliver a command to the execution context.
#[derive(Debug)]
pub enum SubmitError {
    /// The envelope did not decode to a known command.
    Protocol(ProtocolError),
    /// A body-set replacement failed to bring up its new context.
    Respawn(SpawnError),
    /// The context is gone; the integrator has shut down or the
    /// context thread exited.
    Terminated,
    /// The bounded command channel is full.
    Backlogged,
}

impl fmt::Display for SubmitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Protocol(e) => write!(f, "malformed envelope: {e}"),
            Self::Respawn(e) => write!(f, "body replacement failed: {e}"),
            Self::Terminated => write!(f, "execution context is terminated"),
            Self::Backlogged => write!(f, "command channel is full"),
        }
    }
}

impl Error for SubmitError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Protocol(e) => Some(e),
            Self::Respawn(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ProtocolError> for SubmitError {
    fn from(e: ProtocolError) -> Self {
        Self::Protocol(e)
    }
}
