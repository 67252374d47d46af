//! Physical and sizing constants shared across the workspace.
//!
//! These are kept in one module because the step engine runs in an
//! isolated execution context; it should not pull in anything beyond
//! the numbers it needs.

/// Duration of one simulation tick in seconds. 25 ticks represent one
/// second of simulated time.
pub const TICK_DURATION: f64 = 1.0 / 25.0;

/// Minimum mass a body may be created with.
pub const MASS_MIN: f64 = 50.0;

/// Radius of a body at `MASS_MIN`. Arbitrary unit, works for pixels.
pub const RADIUS_MIN: f64 = 0.5;

/// Scaler for the increase in radius in relation to mass.
pub const RADIUS_FACTOR: f64 = 0.25;

/// Values stored per body per tick in a flattened snapshot:
/// `pos_x, pos_y, vel_x, vel_y, mass, link`.
pub const CACHED_VALUES_PER_TICK: usize = 6;

/// Size of one cached value in bytes (`f64`).
pub const NUMBER_SIZE: usize = 8;

/// One megabyte, in bytes.
pub const ONE_MB: usize = 1024 * 1024;

/// Default tick cache memory budget, in megabytes.
pub const DEFAULT_MAX_MB: usize = 256;

/// Squared-distance floor applied in the pairwise force law.
///
/// `F = g·m / d²` is undefined at zero separation; clamping `d²` keeps
/// every accumulated force finite until the colliding pair is merged by
/// the narrow phase.
pub const SEPARATION_FLOOR_SQR: f64 = 1e-12;

/// Radius of a body derived from its mass:
/// `RADIUS_MIN + ∛(mass − MASS_MIN) · RADIUS_FACTOR`.
pub fn radius_from_mass(mass: f64) -> f64 {
    RADIUS_MIN + (mass - MASS_MIN).cbrt() * RADIUS_FACTOR
}

/// Inverse of [`radius_from_mass`].
pub fn mass_from_radius(radius: f64) -> f64 {
    ((radius - RADIUS_MIN) / RADIUS_FACTOR).powi(3) + MASS_MIN
}
