//! Bodies and the generational body table that owns them.

use orrery_core::constants::radius_from_mass;
use orrery_core::{BodyId, BodySpec, Vec2};

use crate::bounds::Bounds;

/// One simulated body. Owned exclusively by the step engine during a
/// run; the outside world only ever sees per-tick snapshots.
#[derive(Clone, Debug)]
pub struct Body {
    /// Stable id for this body's lifetime.
    pub id: BodyId,
    /// Current mass.
    pub mass: f64,
    /// Position.
    pub pos: Vec2,
    /// Velocity.
    pub vel: Vec2,
    /// Radius, derived from mass.
    pub radius: f64,
    /// Whether this body exerts force on others. Pseudo bodies still
    /// receive force; their own mass is funneled into their link.
    pub real: bool,
    /// The body currently exerting the greatest force on this one, or
    /// `None` when undetermined (fresh creation, sole survivor).
    pub link: Option<BodyId>,
    /// Mass funneled in from pseudo bodies linked to this body. Reset
    /// at the start of every force pass.
    pub(crate) pseudo_mass: f64,
    /// Acceleration accumulator for the current substep.
    pub(crate) acc: Vec2,
    /// Swept bounding box, recomputed every substep.
    pub(crate) bounds: Bounds,
}

impl Body {
    fn from_spec(id: BodyId, spec: &BodySpec) -> Self {
        Self {
            id,
            mass: spec.mass,
            pos: spec.pos,
            vel: spec.vel,
            radius: radius_from_mass(spec.mass),
            real: true,
            link: None,
            pseudo_mass: 0.0,
            acc: Vec2::ZERO,
            bounds: Bounds::of_disc(spec.pos, radius_from_mass(spec.mass)),
        }
    }

    /// Mass as seen by the force law: own mass plus funneled pseudo mass.
    pub(crate) fn attracting_mass(&self) -> f64 {
        self.mass + self.pseudo_mass
    }
}

/// A slot in the table. The generation is bumped when the occupant is
/// destroyed, invalidating every id handed out for the previous
/// occupant.
#[derive(Clone, Debug)]
struct Slot {
    generation: u32,
    body: Option<Body>,
}

/// Arena of bodies with generational liveness.
///
/// Slot indices are assigned in creation order and never reused within
/// a run, so iteration order is deterministic. Destroying a body bumps
/// its slot generation; a stale [`BodyId`] then fails to resolve and
/// any link held to it reads as `None` instead of dangling.
#[derive(Clone, Debug, Default)]
pub struct BodyTable {
    slots: Vec<Slot>,
    destroyed: Vec<BodyId>,
    live: usize,
}

impl BodyTable {
    /// Build a table from validated specs. Ids are assigned in order:
    /// the i-th spec becomes `BodyId::initial(i)`.
    pub fn from_specs(specs: &[BodySpec]) -> Self {
        let mut table = Self::default();
        for spec in specs {
            table.insert(spec);
        }
        table
    }

    /// Insert a body into a fresh slot, returning its id.
    pub fn insert(&mut self, spec: &BodySpec) -> BodyId {
        let id = BodyId {
            index: self.slots.len() as u32,
            generation: 0,
        };
        self.slots.push(Slot {
            generation: 0,
            body: Some(Body::from_spec(id, spec)),
        });
        self.live += 1;
        id
    }

    /// Number of live bodies.
    pub fn len(&self) -> usize {
        self.live
    }

    /// Whether no live bodies remain.
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Resolve an id to its body, if the occupant is still alive and of
    /// the same generation.
    pub fn get(&self, id: BodyId) -> Option<&Body> {
        let slot = self.slots.get(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.body.as_ref()
    }

    /// Whether an id still resolves to a live body.
    pub fn contains(&self, id: BodyId) -> bool {
        self.get(id).is_some()
    }

    /// Destroy a body, bumping its slot generation and logging the id
    /// in the destroyed ledger. Returns the removed body.
    pub fn kill(&mut self, id: BodyId) -> Option<Body> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        let body = slot.body.take()?;
        slot.generation += 1;
        self.live -= 1;
        self.destroyed.push(id);
        Some(body)
    }

    /// Drain the ids destroyed since the last snapshot.
    pub fn drain_destroyed(&mut self) -> Vec<BodyId> {
        std::mem::take(&mut self.destroyed)
    }

    /// Iterate live bodies in slot order.
    pub fn iter(&self) -> impl Iterator<Item = &Body> {
        self.slots.iter().filter_map(|s| s.body.as_ref())
    }

    /// Iterate live bodies mutably in slot order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Body> {
        self.slots.iter_mut().filter_map(|s| s.body.as_mut())
    }

    /// Slot indices of live bodies, in slot order.
    pub(crate) fn live_indices(&self) -> Vec<u32> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, s)| s.body.is_some())
            .map(|(i, _)| i as u32)
            .collect()
    }

    /// Borrow the body in a slot, ignoring generation.
    pub(crate) fn at(&self, index: u32) -> Option<&Body> {
        self.slots.get(index as usize)?.body.as_ref()
    }

    /// Mutably borrow the body in a slot, ignoring generation.
    pub(crate) fn at_mut(&mut self, index: u32) -> Option<&mut Body> {
        self.slots.get_mut(index as usize)?.body.as_mut()
    }

    /// Reclassify every live body as real or pseudo.
    ///
    /// Bodies are ranked by descending mass. The heaviest
    /// `min(real_bodies_min, n)` are real unconditionally; the rest are
    /// real only when their mass exceeds the threshold. With the
    /// default gate (`usize::MAX`) every body stays real regardless of
    /// mass.
    pub fn classify(&mut self, real_mass_threshold: f64, real_bodies_min: usize) {
        let mut ranked = self.live_indices();
        ranked.sort_by(|&a, &b| {
            let ma = self.at(a).map(|b| b.mass).unwrap_or(0.0);
            let mb = self.at(b).map(|b| b.mass).unwrap_or(0.0);
            mb.partial_cmp(&ma).unwrap_or(std::cmp::Ordering::Equal)
        });

        let forced_real = real_bodies_min.min(ranked.len());
        for (rank, &index) in ranked.iter().enumerate() {
            if let Some(body) = self.at_mut(index) {
                body.real = rank < forced_real || body.mass > real_mass_threshold;
            }
        }
    }
}
