//! Physics configuration and body specifications with startup validation.

use crate::constants::MASS_MIN;
use crate::error::ConfigError;
use crate::vec2::Vec2;

/// Physics parameters for one simulation run.
///
/// Immutable for the lifetime of a run; changing any of these requires
/// replacing the body set, which spawns a fresh isolated context.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PhysicsConfig {
    /// Gravitational constant. The higher, the more attractive bodies are.
    pub g: f64,
    /// Integration substeps per tick. More steps cost more computation
    /// but give more precision.
    pub physics_steps: u32,
    /// Bodies at or below this mass may be classified pseudo and excluded
    /// from exerting force on others. 0 disables the optimization.
    pub real_mass_threshold: f64,
    /// Minimum number of real bodies before any body may be classified
    /// pseudo. `usize::MAX` (the default) keeps every body real.
    pub real_bodies_min: usize,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            g: 1.0,
            physics_steps: 4,
            real_mass_threshold: 0.0,
            real_bodies_min: usize::MAX,
        }
    }
}

impl PhysicsConfig {
    /// Check structural invariants. Called once at run start; a failing
    /// config is a fatal error, not retried.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.g.is_finite() || self.g <= 0.0 {
            return Err(ConfigError::InvalidG { value: self.g });
        }
        if self.physics_steps == 0 {
            return Err(ConfigError::InvalidPhysicsSteps {
                value: self.physics_steps,
            });
        }
        if !self.real_mass_threshold.is_finite() || self.real_mass_threshold < 0.0 {
            return Err(ConfigError::InvalidMassThreshold {
                value: self.real_mass_threshold,
            });
        }
        Ok(())
    }

    /// Integration step size in seconds:
    /// [`TICK_DURATION`](crate::constants::TICK_DURATION) / `physics_steps`.
    pub fn dt(&self) -> f64 {
        crate::constants::TICK_DURATION / self.physics_steps as f64
    }
}

/// Initial state for one body, supplied by the controlling side.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BodySpec {
    /// Mass, at least [`MASS_MIN`].
    pub mass: f64,
    /// Starting position.
    pub pos: Vec2,
    /// Starting velocity.
    pub vel: Vec2,
}

impl BodySpec {
    /// Create a spec from components.
    pub const fn new(mass: f64, pos: Vec2, vel: Vec2) -> Self {
        Self { mass, pos, vel }
    }

    /// Validate a single spec. `index` is reported in the error so a
    /// caller submitting a batch can point at the offending entry.
    pub fn validate(&self, index: usize) -> Result<(), ConfigError> {
        if !self.mass.is_finite() || self.mass < MASS_MIN {
            return Err(ConfigError::BodyMassBelowMin {
                index,
                mass: self.mass,
            });
        }
        if !self.pos.is_finite() {
            return Err(ConfigError::NonFiniteBody {
                index,
                component: "position",
            });
        }
        if !self.vel.is_finite() {
            return Err(ConfigError::NonFiniteBody {
                index,
                component: "velocity",
            });
        }
        Ok(())
    }
}

/// Validate a batch of body specs for run start.
///
/// An empty batch is rejected: an isolated context is never created
/// without at least one body to integrate.
pub fn validate_specs(specs: &[BodySpec]) -> Result<(), ConfigError> {
    if specs.is_empty() {
        return Err(ConfigError::NoBodies);
    }
    for (index, spec) in specs.iter().enumerate() {
        spec.validate(index)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        PhysicsConfig::default().validate().unwrap();
    }

    #[test]
    fn non_positive_g_rejected() {
        for g in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let config = PhysicsConfig {
                g,
                ..Default::default()
            };
            assert!(matches!(
                config.validate(),
                Err(ConfigError::InvalidG { .. })
            ));
        }
    }

    #[test]
    fn zero_steps_rejected() {
        let config = PhysicsConfig {
            physics_steps: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidPhysicsSteps { value: 0 })
        ));
    }

    #[test]
    fn negative_threshold_rejected() {
        let config = PhysicsConfig {
            real_mass_threshold: -1.0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidMassThreshold { .. })
        ));
    }

    #[test]
    fn dt_divides_tick_duration() {
        let config = PhysicsConfig {
            physics_steps: 4,
            ..Default::default()
        };
        assert!((config.dt() - crate::constants::TICK_DURATION / 4.0).abs() < 1e-15);
    }

    #[test]
    fn empty_batch_rejected() {
        assert!(matches!(validate_specs(&[]), Err(ConfigError::NoBodies)));
    }

    #[test]
    fn undermassed_body_rejected_with_index() {
        let specs = [
            BodySpec::new(100.0, Vec2::ZERO, Vec2::ZERO),
            BodySpec::new(1.0, Vec2::ZERO, Vec2::ZERO),
        ];
        assert!(matches!(
            validate_specs(&specs),
            Err(ConfigError::BodyMassBelowMin { index: 1, .. })
        ));
    }

    #[test]
    fn non_finite_position_rejected() {
        let specs = [BodySpec::new(
            100.0,
            Vec2::new(f64::NAN, 0.0),
            Vec2::ZERO,
        )];
        assert!(matches!(
            validate_specs(&specs),
            Err(ConfigError::NonFiniteBody {
                index: 0,
                component: "position",
            })
        ));
    }
}
