//! Error types, organized by subsystem: configuration, boundary
//! protocol, step engine, and tick cache.
//!
//! Configuration and protocol errors are raised synchronously at the
//! call site before anything crosses the isolation boundary. Step
//! errors originate inside the isolated context and travel back as
//! structured failure messages.

use std::error::Error;
use std::fmt;

use crate::id::BodyId;

/// Errors detected while validating a physics configuration or a batch
/// of body specs. Fatal at construction; never retried.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ConfigError {
    /// `g` must be finite and above zero.
    InvalidG {
        /// The rejected value.
        value: f64,
    },
    /// `physics_steps` must be at least 1.
    InvalidPhysicsSteps {
        /// The rejected value.
        value: u32,
    },
    /// `real_mass_threshold` must be finite and non-negative.
    InvalidMassThreshold {
        /// The rejected value.
        value: f64,
    },
    /// A run needs at least one body; no context is created without one.
    NoBodies,
    /// A body spec's mass is non-finite or below the minimum.
    BodyMassBelowMin {
        /// Position of the offending spec in the submitted batch.
        index: usize,
        /// The rejected mass.
        mass: f64,
    },
    /// A body spec's position or velocity is non-finite.
    NonFiniteBody {
        /// Position of the offending spec in the submitted batch.
        index: usize,
        /// Which component was non-finite (`"position"` or `"velocity"`).
        component: &'static str,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidG { value } => {
                write!(f, "g must be finite and above zero, got {value}")
            }
            Self::InvalidPhysicsSteps { value } => {
                write!(f, "physics_steps must be at least 1, got {value}")
            }
            Self::InvalidMassThreshold { value } => {
                write!(
                    f,
                    "real_mass_threshold must be finite and non-negative, got {value}"
                )
            }
            Self::NoBodies => write!(f, "a run needs at least one body"),
            Self::BodyMassBelowMin { index, mass } => {
                write!(
                    f,
                    "body {index}: mass {mass} is below the minimum of {}",
                    crate::constants::MASS_MIN
                )
            }
            Self::NonFiniteBody { index, component } => {
                write!(f, "body {index}: {component} is not finite")
            }
        }
    }
}

impl Error for ConfigError {}

/// Errors from validating a message envelope before it crosses the
/// isolation boundary. Raised locally, before any send.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProtocolError {
    /// The envelope's command name is empty.
    EmptyName,
    /// The command name is not one the worker understands.
    UnknownCommand {
        /// The rejected name.
        name: String,
    },
    /// The payload does not match what the named command expects.
    PayloadMismatch {
        /// The command name.
        name: &'static str,
        /// The payload shape the command expects.
        expected: &'static str,
    },
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "envelope command name is empty"),
            Self::UnknownCommand { name } => write!(f, "unrecognized command: {name}"),
            Self::PayloadMismatch { name, expected } => {
                write!(f, "command '{name}' expects {expected} payload")
            }
        }
    }
}

impl Error for ProtocolError {}

/// Errors from the step engine during tick execution.
///
/// These are engine-fatal for the run: the isolated context reports the
/// failure across the boundary and stops ticking. The controlling side
/// may choose to respawn with a fresh body set.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum StepError {
    /// A body's position or velocity became non-finite after integration.
    ///
    /// The force law guards the zero-distance case with a separation
    /// floor, so this indicates corrupted state rather than an expected
    /// degeneracy.
    NonFiniteState {
        /// The corrupted body.
        body: BodyId,
        /// The tick being executed when the fault was detected.
        tick: u64,
    },
}

impl fmt::Display for StepError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonFiniteState { body, tick } => {
                write!(f, "body {body} has non-finite state at tick {tick}")
            }
        }
    }
}

impl Error for StepError {}

/// Errors from reading the tick cache.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CacheError {
    /// The requested tick was evicted or has not been committed yet.
    OutOfRange {
        /// The requested tick.
        tick: u64,
        /// Oldest retained tick.
        first: u64,
        /// Newest committed tick.
        last: u64,
    },
    /// The cache holds no ticks at all.
    Empty,
}

impl fmt::Display for CacheError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfRange { tick, first, last } => {
                write!(f, "tick {tick} is out of the retained range {first}..={last}")
            }
            Self::Empty => write!(f, "tick cache is empty"),
        }
    }
}

impl Error for CacheError {}
