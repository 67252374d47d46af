//! The step engine: one tick of N-body integration.
//!
//! Each tick runs `physics_steps` substeps, and each substep walks the
//! same pipeline: force accumulation → semi-implicit integration →
//! broad-phase partitioning → exact collision checks → barycenter
//! merges → real/pseudo reclassification. The tick then commits by
//! capturing a [`TickSnapshot`].

use std::time::Instant;

use orrery_core::config::validate_specs;
use orrery_core::constants::{radius_from_mass, SEPARATION_FLOOR_SQR};
use orrery_core::geom::bary_center;
use orrery_core::{BodyId, BodySpec, ConfigError, PhysicsConfig, RunGeneration, StepError, TickId, Vec2};

use crate::body::BodyTable;
use crate::bounds::Bounds;
use crate::metrics::StepMetrics;
use crate::partition::build_partitions;
use crate::snapshot::TickSnapshot;

/// Owns all body state for one run and advances it tick by tick.
///
/// Constructed on the controlling side, then moved whole into the
/// isolated execution context. Nothing outside the context ever holds a
/// reference into the table; state leaves only as snapshots.
#[derive(Debug)]
pub struct StepEngine {
    config: PhysicsConfig,
    table: BodyTable,
    tick: TickId,
    metrics: StepMetrics,
}

impl StepEngine {
    /// Validate the configuration and body specs and build the engine.
    ///
    /// Rejecting an invalid config here, before any context exists, is
    /// what makes configuration errors synchronous and fatal.
    pub fn new(config: PhysicsConfig, specs: &[BodySpec]) -> Result<Self, ConfigError> {
        config.validate()?;
        validate_specs(specs)?;

        let mut table = BodyTable::from_specs(specs);
        table.classify(config.real_mass_threshold, config.real_bodies_min);

        Ok(Self {
            config,
            table,
            tick: TickId(0),
            metrics: StepMetrics::default(),
        })
    }

    /// The physics configuration for this run.
    pub fn config(&self) -> &PhysicsConfig {
        &self.config
    }

    /// The last committed tick.
    pub fn tick(&self) -> TickId {
        self.tick
    }

    /// The body table. Exposed read-only; mutation happens only through
    /// tick execution.
    pub fn table(&self) -> &BodyTable {
        &self.table
    }

    /// Metrics for the most recent committed tick.
    pub fn metrics(&self) -> &StepMetrics {
        &self.metrics
    }

    /// Snapshot the current state without advancing.
    ///
    /// Used to publish the starting state as tick 0 when a context
    /// spawns, so playback ranges include the initial body layout.
    pub fn snapshot_now(&mut self, generation: RunGeneration) -> TickSnapshot {
        TickSnapshot::capture(self.tick, generation, &mut self.table)
    }

    /// Advance one tick and commit a snapshot of the result.
    ///
    /// # Errors
    ///
    /// [`StepError::NonFiniteState`] if any body's position or velocity
    /// stops being finite. The force law's separation floor makes this
    /// unreachable from well-formed input; if it happens anyway the run
    /// is corrupt and the engine must not keep ticking.
    pub fn execute_tick(&mut self, generation: RunGeneration) -> Result<TickSnapshot, StepError> {
        let tick_start = Instant::now();
        let mut force_us = 0u64;
        let mut collision_us = 0u64;
        let mut pairs_checked = 0u64;
        let mut merges = 0u64;

        for _ in 0..self.config.physics_steps {
            let t = Instant::now();
            self.accumulate_forces();
            force_us += t.elapsed().as_micros() as u64;

            self.integrate()?;

            let t = Instant::now();
            let (pairs, merged) = self.resolve_collisions();
            collision_us += t.elapsed().as_micros() as u64;
            pairs_checked += pairs;
            merges += merged;

            if merged > 0 {
                self.table
                    .classify(self.config.real_mass_threshold, self.config.real_bodies_min);
            }
        }

        self.tick = TickId(self.tick.0 + 1);
        self.metrics = StepMetrics {
            total_us: tick_start.elapsed().as_micros() as u64,
            force_us,
            collision_us,
            pairs_checked,
            merges,
            body_count: self.table.len(),
        };

        Ok(TickSnapshot::capture(self.tick, generation, &mut self.table))
    }

    /// Accumulate gravitational acceleration and link choice for every
    /// body.
    ///
    /// Only real bodies exert force; pseudo bodies still receive it.
    /// Pseudo bodies run first so the mass they funnel into their links
    /// is already visible when the real bodies accumulate. The
    /// asymmetric ordering is what the optimization is built around.
    fn accumulate_forces(&mut self) {
        for body in self.table.iter_mut() {
            body.pseudo_mass = 0.0;
        }

        let live = self.table.live_indices();
        let mut reals = Vec::with_capacity(live.len());
        let mut pseudos = Vec::new();
        for &i in &live {
            if self.table.at(i).is_some_and(|b| b.real) {
                reals.push(i);
            } else {
                pseudos.push(i);
            }
        }

        for &i in pseudos.iter().chain(reals.iter()) {
            self.accumulate_one(i, &reals);
        }
    }

    /// Force pass for a single body: sum pull from every real body,
    /// track the strongest contributor as the link, and funnel pseudo
    /// mass into that link.
    fn accumulate_one(&mut self, index: u32, reals: &[u32]) {
        let g = self.config.g;
        let Some((pos, mass, is_real)) = self.table.at(index).map(|b| (b.pos, b.mass, b.real))
        else {
            return;
        };

        let mut acc = Vec2::ZERO;
        let mut link: Option<BodyId> = None;
        let mut strongest = f64::NEG_INFINITY;

        for &j in reals {
            if j == index {
                continue;
            }
            let Some(other) = self.table.at(j) else { continue };

            let relative = other.pos - pos;
            // The pairwise law is undefined at zero separation; the
            // floor keeps the accumulated value finite until the merge
            // phase removes the overlapping pair.
            let dist_sqr = relative.sqr_magnitude().max(SEPARATION_FLOOR_SQR);
            let dist = dist_sqr.sqrt();

            let pull = g * other.attracting_mass() / dist_sqr;
            if pull > strongest {
                strongest = pull;
                link = Some(other.id);
            }

            acc += relative * (pull / dist);
        }

        if let Some(body) = self.table.at_mut(index) {
            body.acc = acc;
            body.link = link;
        }
        if !is_real {
            if let Some(parent) = link.and_then(|id| self.table.at_mut(id.index)) {
                parent.pseudo_mass += mass;
            }
        }
    }

    /// Semi-implicit update: velocity first, then position from the new
    /// velocity.
    fn integrate(&mut self) -> Result<(), StepError> {
        let dt = self.config.dt();
        let tick = self.tick.0 + 1;

        for body in self.table.iter_mut() {
            body.vel += body.acc * dt;
            body.pos += body.vel * dt;

            if !body.pos.is_finite() || !body.vel.is_finite() {
                return Err(StepError::NonFiniteState { body: body.id, tick });
            }
        }
        Ok(())
    }

    /// Broad phase (swept bounds → partitions) followed by exact
    /// distance checks within each multi-body partition. Returns
    /// `(pairs_checked, merges)`.
    fn resolve_collisions(&mut self) -> (u64, u64) {
        let dt = self.config.dt();
        for body in self.table.iter_mut() {
            let (pos, vel, radius) = (body.pos, body.vel, body.radius);
            body.bounds.refresh(pos, vel, radius, dt);
        }

        let entries: Vec<(u32, Bounds)> = self
            .table
            .iter()
            .map(|b| (b.id.index, b.bounds))
            .collect();
        let partitions = build_partitions(entries.iter().map(|(i, b)| (*i, b)));

        let mut pairs = 0u64;
        let mut merges = 0u64;

        for partition in &partitions {
            if partition.members.len() < 2 {
                continue;
            }
            for ai in 0..partition.members.len() {
                for bi in (ai + 1)..partition.members.len() {
                    let ia = partition.members[ai];
                    let ib = partition.members[bi];
                    // Either side may have been consumed by an earlier
                    // merge in this same partition.
                    let (Some(a), Some(b)) = (self.table.at(ia), self.table.at(ib)) else {
                        continue;
                    };

                    pairs += 1;
                    let dist = (a.pos - b.pos).magnitude();
                    if dist < a.radius + b.radius {
                        self.merge(ia, ib);
                        merges += 1;
                    }
                }
            }
        }

        (pairs, merges)
    }

    /// Merge two colliding bodies. The heavier keeps its id; ties keep
    /// the earlier slot. Position is the barycenter point on the
    /// connecting segment, velocity conserves momentum.
    fn merge(&mut self, ia: u32, ib: u32) {
        let mass_a = self.table.at(ia).map(|b| b.mass).unwrap_or(0.0);
        let mass_b = self.table.at(ib).map(|b| b.mass).unwrap_or(0.0);
        let (survivor, victim) = if mass_b > mass_a { (ib, ia) } else { (ia, ib) };

        let Some(victim_id) = self.table.at(victim).map(|b| b.id) else {
            return;
        };
        let Some(victim_body) = self.table.kill(victim_id) else {
            return;
        };
        let Some(body) = self.table.at_mut(survivor) else {
            return;
        };

        let total = body.mass + victim_body.mass;
        body.pos = bary_center(victim_body.mass, victim_body.pos, body.mass, body.pos);
        body.vel = (body.vel * body.mass + victim_body.vel * victim_body.mass) / total;
        body.mass = total;
        body.radius = radius_from_mass(total);
        if body.link == Some(victim_id) {
            body.link = None;
        }
    }
}
