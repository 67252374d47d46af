//! Swept axis-aligned bounding boxes for the broad collision phase.

use orrery_core::Vec2;

/// An axis-aligned bounding box expanded by predicted motion.
///
/// `top` is the minimum y edge and `bottom` the maximum (screen-style
/// axis ordering). Each edge is placed at
/// `axis ± radius + predictive_shift`, where the shift extends the box
/// *opposite* to the direction of travel by one substep's worth of
/// displacement. Refreshed after integration moves the body, the box
/// therefore covers the positions before and after the step just
/// applied, so a fast body cannot tunnel past the broad phase. The
/// test is conservative: false positives are resolved by the exact
/// distance check in the narrow phase.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Bounds {
    /// Minimum x edge.
    pub left: f64,
    /// Maximum x edge.
    pub right: f64,
    /// Minimum y edge.
    pub top: f64,
    /// Maximum y edge.
    pub bottom: f64,
}

/// One edge value: position on the axis, pushed out by the radius and
/// shifted backwards when the body moves toward the opposite edge.
fn edge(axis: f64, displacement: f64, radius: f64, is_min: bool) -> f64 {
    let r = if is_min { -radius } else { radius };
    let toward = (is_min && displacement > 0.0) || (!is_min && displacement < 0.0);
    let shift = if toward { -displacement } else { 0.0 };
    axis + r + shift
}

impl Bounds {
    /// Bounds covering exactly the body's disc, with no sweep.
    pub fn of_disc(pos: Vec2, radius: f64) -> Self {
        Self {
            left: pos.x - radius,
            right: pos.x + radius,
            top: pos.y - radius,
            bottom: pos.y + radius,
        }
    }

    /// Recompute all four edges from the owning body's state.
    ///
    /// `dt` is the substep duration; `vel * dt` is the displacement the
    /// sweep must cover.
    pub fn refresh(&mut self, pos: Vec2, vel: Vec2, radius: f64, dt: f64) {
        let dx = vel.x * dt;
        let dy = vel.y * dt;
        self.left = edge(pos.x, dx, radius, true);
        self.right = edge(pos.x, dx, radius, false);
        self.top = edge(pos.y, dy, radius, true);
        self.bottom = edge(pos.y, dy, radius, false);
    }

    /// Symmetric overlap test: true unless the boxes are separated on
    /// either axis.
    pub fn overlap(&self, other: &Bounds) -> bool {
        if self.left > other.right || other.left > self.right {
            return false;
        }
        if self.top > other.bottom || other.top > self.bottom {
            return false;
        }
        true
    }

    /// Grow this box to the union with another.
    pub fn union(&mut self, other: &Bounds) {
        self.left = self.left.min(other.left);
        self.right = self.right.max(other.right);
        self.top = self.top.min(other.top);
        self.bottom = self.bottom.max(other.bottom);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn boxed(left: f64, top: f64, right: f64, bottom: f64) -> Bounds {
        Bounds {
            left,
            right,
            top,
            bottom,
        }
    }

    #[test]
    fn overlapping_boxes() {
        let a = boxed(0.0, 0.0, 10.0, 10.0);
        let b = boxed(5.0, 5.0, 15.0, 15.0);
        assert!(a.overlap(&b));
        assert!(b.overlap(&a));
    }

    #[test]
    fn separated_boxes() {
        let a = boxed(0.0, 0.0, 10.0, 10.0);
        let b = boxed(20.0, 20.0, 30.0, 30.0);
        assert!(!a.overlap(&b));
        assert!(!b.overlap(&a));
    }

    #[test]
    fn touching_edges_still_overlap() {
        let a = boxed(0.0, 0.0, 10.0, 10.0);
        let b = boxed(10.0, 0.0, 20.0, 10.0);
        assert!(a.overlap(&b));
    }

    #[test]
    fn separated_on_one_axis_only() {
        let a = boxed(0.0, 0.0, 10.0, 10.0);
        let b = boxed(0.0, 30.0, 10.0, 40.0);
        assert!(!a.overlap(&b));
    }

    #[test]
    fn sweep_extends_opposite_to_motion() {
        let mut bounds = Bounds::default();
        // Moving right at 100 units/s with dt = 0.1: displacement 10.
        bounds.refresh(Vec2::new(0.0, 0.0), Vec2::new(100.0, 0.0), 1.0, 0.1);
        // Left edge swept back to cover the pre-step position.
        assert_eq!(bounds.left, -11.0);
        assert_eq!(bounds.right, 1.0);
        assert_eq!(bounds.top, -1.0);
        assert_eq!(bounds.bottom, 1.0);
    }

    #[test]
    fn sweep_contains_both_endpoints() {
        let pos = Vec2::new(5.0, -3.0);
        let vel = Vec2::new(-40.0, 25.0);
        let dt = 0.01;
        let radius = 2.0;
        let mut bounds = Bounds::default();
        bounds.refresh(pos, vel, radius, dt);

        // The sweep reaches backwards: it covers the position the body
        // just moved from, not where it is heading next.
        let before = pos - vel * dt;
        for p in [pos, before] {
            assert!(bounds.left <= p.x - radius && p.x + radius <= bounds.right);
            assert!(bounds.top <= p.y - radius && p.y + radius <= bounds.bottom);
        }
    }

    #[test]
    fn union_grows_to_cover_both() {
        let mut a = boxed(0.0, 0.0, 10.0, 10.0);
        let b = boxed(-5.0, 5.0, 3.0, 20.0);
        a.union(&b);
        assert_eq!(a, boxed(-5.0, 0.0, 10.0, 20.0));
    }
}
