//! Pure geometry helpers used by collision handling and body placement.

use std::f64::consts::TAU;

use rand::Rng;

use crate::vec2::Vec2;

/// Closest point on the segment `start..end` to `point`, computed as the
/// perpendicular projection via a 2×2 linear solve.
///
/// When the segment is degenerate (`start == end`, zero determinant) the
/// query point is returned unchanged.
pub fn closest_point_on_segment(start: Vec2, end: Vec2, point: Vec2) -> Vec2 {
    let a = end.y - start.y;
    let b = start.x - end.x;

    let c1 = a * start.x + b * start.y;
    let c2 = -b * point.x + a * point.y;

    let det = a * a + b * b;
    if det == 0.0 {
        return point;
    }

    Vec2::new((a * c1 - b * c2) / det, (a * c2 + b * c1) / det)
}

/// Mass-weighted merge point of two bodies.
///
/// Lies on the segment between the two positions, closer to the heavier
/// body: `bary_radius = |a − b| / (1 + mass_a / mass_b)` measured from
/// `pos_b`. Coincident positions collapse to `pos_b`.
pub fn bary_center(mass_a: f64, pos_a: Vec2, mass_b: f64, pos_b: Vec2) -> Vec2 {
    let relative = pos_a - pos_b;
    let distance = relative.magnitude();
    let bary_radius = distance / (1.0 + mass_a / mass_b);

    relative.normalized() * bary_radius + pos_b
}

/// A point sampled uniformly by area from a disc of the given radius
/// centred on the origin.
///
/// Uses `r = radius·√u`, `θ = 2π·v`; sampling the radius linearly would
/// bias points toward the centre.
pub fn random_point_in_disc<R: Rng + ?Sized>(radius: f64, rng: &mut R) -> Vec2 {
    let r = radius * rng.random::<f64>().sqrt();
    let theta = TAU * rng.random::<f64>();
    Vec2::new(r * theta.cos(), r * theta.sin())
}

/// Velocity of a circular orbit around a parent body.
///
/// The returned vector is perpendicular to the line from the parent to
/// `pos`, with speed `√(g·parent_mass / dist)`, plus the parent's own
/// velocity so nested systems stay coherent.
pub fn orbital_velocity(pos: Vec2, parent_pos: Vec2, parent_vel: Vec2, parent_mass: f64, g: f64) -> Vec2 {
    let relative = pos - parent_pos;
    let dist = relative.magnitude();
    if dist == 0.0 {
        return parent_vel;
    }

    let speed = (g * parent_mass / dist).sqrt();
    let perpendicular = Vec2::new(-relative.y, relative.x).normalized();

    perpendicular * speed + parent_vel
}
