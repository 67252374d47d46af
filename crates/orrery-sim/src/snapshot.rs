//! Flattened per-tick snapshots of body state.

use orrery_core::constants::{CACHED_VALUES_PER_TICK, NUMBER_SIZE};
use orrery_core::{BodyId, RunGeneration, TickId, Vec2};

use crate::body::BodyTable;

/// Sentinel stored in the flattened link slot when a body has no link.
pub const NO_LINK: f64 = -1.0;

/// State of every live body at one committed tick, flattened into a
/// fixed-width numeric buffer for cheap transfer and bounded caching.
///
/// Layout per body: `[pos_x, pos_y, vel_x, vel_y, mass, link]`, where
/// `link` is the slot index of the linked body or [`NO_LINK`]. The
/// parallel `ids` vec carries the full generational ids in the same
/// order.
#[derive(Clone, Debug, PartialEq)]
pub struct TickSnapshot {
    /// The committed tick this snapshot describes.
    pub tick: TickId,
    /// Which isolated-context lifetime produced it.
    pub generation: RunGeneration,
    /// Ids destroyed by merges since the previous snapshot.
    pub destroyed: Vec<BodyId>,
    /// Ids of the live bodies, in value order.
    pub ids: Vec<BodyId>,
    /// Flattened values, `ids.len() × CACHED_VALUES_PER_TICK` long.
    pub values: Vec<f64>,
}

impl TickSnapshot {
    /// Capture the current table state. Drains the table's destroyed
    /// ledger into the snapshot.
    ///
    /// Links to bodies that no longer resolve are written as
    /// [`NO_LINK`]; a merge may destroy a body that others still link
    /// to, and those references must never dangle.
    pub fn capture(tick: TickId, generation: RunGeneration, table: &mut BodyTable) -> Self {
        let destroyed = table.drain_destroyed();
        let count = table.len();
        let mut ids = Vec::with_capacity(count);
        let mut values = Vec::with_capacity(count * CACHED_VALUES_PER_TICK);

        for body in table.iter() {
            ids.push(body.id);
            let link = match body.link {
                Some(id) if table.contains(id) => id.index as f64,
                _ => NO_LINK,
            };
            values.extend_from_slice(&[
                body.pos.x, body.pos.y, body.vel.x, body.vel.y, body.mass, link,
            ]);
        }

        Self {
            tick,
            generation,
            destroyed,
            ids,
            values,
        }
    }

    /// Number of bodies recorded.
    pub fn body_count(&self) -> usize {
        self.ids.len()
    }

    /// Memory footprint of the value buffer in bytes, as accounted by
    /// the tick cache budget.
    pub fn footprint_bytes(&self) -> usize {
        self.body_count() * CACHED_VALUES_PER_TICK * NUMBER_SIZE
    }

    /// View of the i-th body's record.
    ///
    /// # Panics
    ///
    /// Panics if `i >= body_count()`.
    pub fn body(&self, i: usize) -> BodyView<'_> {
        let start = i * CACHED_VALUES_PER_TICK;
        BodyView {
            id: self.ids[i],
            values: &self.values[start..start + CACHED_VALUES_PER_TICK],
        }
    }

    /// Find a body's record by id.
    pub fn find(&self, id: BodyId) -> Option<BodyView<'_>> {
        let i = self.ids.iter().position(|&other| other == id)?;
        Some(self.body(i))
    }

    /// Iterate all body records.
    pub fn bodies(&self) -> impl Iterator<Item = BodyView<'_>> {
        (0..self.body_count()).map(|i| self.body(i))
    }
}

/// Read-only view of one body's record within a snapshot.
#[derive(Clone, Copy, Debug)]
pub struct BodyView<'a> {
    /// The body's id.
    pub id: BodyId,
    values: &'a [f64],
}

impl BodyView<'_> {
    /// Position at this tick.
    pub fn pos(&self) -> Vec2 {
        Vec2::new(self.values[0], self.values[1])
    }

    /// Velocity at this tick.
    pub fn vel(&self) -> Vec2 {
        Vec2::new(self.values[2], self.values[3])
    }

    /// Mass at this tick.
    pub fn mass(&self) -> f64 {
        self.values[4]
    }

    /// Slot index of the linked body, or `None`.
    pub fn link_index(&self) -> Option<u32> {
        let raw = self.values[5];
        if raw < 0.0 {
            None
        } else {
            Some(raw as u32)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orrery_core::BodySpec;

    fn table() -> BodyTable {
        BodyTable::from_specs(&[
            BodySpec::new(100.0, Vec2::new(1.0, 2.0), Vec2::new(0.1, 0.2)),
            BodySpec::new(200.0, Vec2::new(3.0, 4.0), Vec2::new(0.3, 0.4)),
        ])
    }

    #[test]
    fn capture_flattens_in_slot_order() {
        let mut t = table();
        let snap = TickSnapshot::capture(TickId(5), RunGeneration(1), &mut t);

        assert_eq!(snap.tick, TickId(5));
        assert_eq!(snap.body_count(), 2);
        assert_eq!(snap.values.len(), 2 * CACHED_VALUES_PER_TICK);

        let first = snap.body(0);
        assert_eq!(first.id, BodyId::initial(0));
        assert_eq!(first.pos(), Vec2::new(1.0, 2.0));
        assert_eq!(first.vel(), Vec2::new(0.1, 0.2));
        assert_eq!(first.mass(), 100.0);
        assert_eq!(first.link_index(), None);
    }

    #[test]
    fn footprint_matches_value_buffer() {
        let mut t = table();
        let snap = TickSnapshot::capture(TickId(0), RunGeneration(0), &mut t);
        assert_eq!(snap.footprint_bytes(), 2 * 6 * 8);
    }

    #[test]
    fn stale_link_reads_as_no_link() {
        let mut t = table();
        let victim = BodyId::initial(1);
        // Body 0 links to body 1, which is then destroyed.
        t.iter_mut().next().unwrap().link = Some(victim);
        t.kill(victim);

        let snap = TickSnapshot::capture(TickId(1), RunGeneration(0), &mut t);
        assert_eq!(snap.destroyed, vec![victim]);
        assert_eq!(snap.body_count(), 1);
        assert_eq!(snap.body(0).link_index(), None);
    }

    #[test]
    fn live_link_records_slot_index() {
        let mut t = table();
        t.iter_mut().next().unwrap().link = Some(BodyId::initial(1));

        let snap = TickSnapshot::capture(TickId(1), RunGeneration(0), &mut t);
        assert_eq!(snap.body(0).link_index(), Some(1));
        assert_eq!(snap.find(BodyId::initial(1)).unwrap().mass(), 200.0);
    }
}
