//! High-level simulation facade.
//!
//! [`Simulation`] wires an [`Integrator`] to a [`TickCache`] and adds a
//! playback cursor over the cached timeline. The caller creates bodies,
//! starts the run, pumps events in, and scrubs through the retained
//! tick range.

use std::time::Duration;

use indexmap::IndexMap;

use orrery_core::{BodyId, BodySpec, CacheError, StepError, TickId};
use orrery_sim::{BodyView, StepMetrics, TickSnapshot};

use crate::cache::TickCache;
use crate::config::{RunConfig, SpawnError, SubmitError};
use crate::envelope::Envelope;
use crate::integrator::{Integrator, IntegratorEvent, ShutdownReport};

/// A simulation with a cached, scrubable timeline.
pub struct Simulation {
    config: RunConfig,
    integrator: Option<Integrator>,
    registry: IndexMap<BodyId, BodySpec>,
    cache: TickCache,
    cursor: TickId,
    last_failure: Option<StepError>,
    last_metrics: StepMetrics,
}

impl Simulation {
    /// Create an empty simulation. No context exists until bodies are
    /// created.
    pub fn new(config: RunConfig) -> Result<Self, SpawnError> {
        config.validate()?;
        Ok(Self {
            integrator: None,
            registry: IndexMap::new(),
            cache: TickCache::new(config.max_cache_mb),
            cursor: TickId(0),
            last_failure: None,
            last_metrics: StepMetrics::default(),
            config,
        })
    }

    /// Replace the body set and return the assigned ids, in spec order.
    ///
    /// Ids are predictable: the i-th spec gets slot `i` at generation
    /// 0, matching what later snapshots report. The previous timeline,
    /// if any, is discarded; it indexed a body set that no longer
    /// exists.
    pub fn create_bodies(&mut self, specs: Vec<BodySpec>) -> Result<Vec<BodyId>, SpawnError> {
        match self.integrator.as_mut() {
            Some(integrator) => integrator.replace_bodies(&specs)?,
            None => self.integrator = Some(Integrator::spawn(self.config, &specs)?),
        }

        let ids: Vec<BodyId> = (0..specs.len() as u32).map(BodyId::initial).collect();
        self.registry = ids.iter().copied().zip(specs).collect();
        self.cache.clear();
        self.cursor = TickId(0);
        self.last_failure = None;
        self.last_metrics = StepMetrics::default();
        Ok(ids)
    }

    /// The specs the current body set was created from, in id order.
    pub fn bodies(&self) -> impl Iterator<Item = (BodyId, &BodySpec)> {
        self.registry.iter().map(|(id, spec)| (*id, spec))
    }

    /// Begin (or resume) integrating.
    pub fn start(&mut self) -> Result<(), SubmitError> {
        self.integrator_mut()?.start()
    }

    /// Pause integrating. The cached timeline stays addressable.
    pub fn stop(&mut self) -> Result<(), SubmitError> {
        self.integrator_mut()?.stop()
    }

    /// Submit a raw envelope, for callers speaking the protocol
    /// directly.
    pub fn submit(&mut self, envelope: Envelope) -> Result<(), SubmitError> {
        self.integrator_mut()?.submit(envelope)
    }

    /// Absorb pending events into the cache. Returns the number of
    /// ticks committed.
    ///
    /// Failures are recorded in [`last_failure`](Self::last_failure)
    /// rather than returned; the cached timeline up to the failure
    /// remains readable.
    pub fn pump(&mut self) -> usize {
        let Some(integrator) = self.integrator.as_mut() else {
            return 0;
        };

        let mut committed = 0;
        for event in integrator.poll() {
            match event {
                IntegratorEvent::Tick { snapshot, metrics } => {
                    self.cache.append(snapshot);
                    self.last_metrics = metrics;
                    committed += 1;
                }
                IntegratorEvent::Failed(error) => self.last_failure = Some(error),
            }
        }
        committed
    }

    /// Engine metrics for the most recently committed tick.
    pub fn metrics(&self) -> &StepMetrics {
        &self.last_metrics
    }

    /// The playback cursor.
    pub fn tick(&self) -> TickId {
        self.cursor
    }

    /// Move the playback cursor, clamped to the retained range.
    pub fn set_tick(&mut self, tick: TickId) {
        let Some(first) = self.cache.first_tick() else {
            return;
        };
        let last = self.cache.max_tick().unwrap_or(first);
        self.cursor = tick.clamp(first, last);
    }

    /// Oldest retained tick.
    pub fn first_tick(&self) -> Option<TickId> {
        self.cache.first_tick()
    }

    /// Newest committed tick.
    pub fn max_tick(&self) -> Option<TickId> {
        self.cache.max_tick()
    }

    /// Snapshot under the playback cursor.
    pub fn snapshot(&self) -> Result<&TickSnapshot, CacheError> {
        self.cache.get(self.cursor)
    }

    /// Snapshot for an arbitrary tick.
    pub fn snapshot_at(&self, tick: TickId) -> Result<&TickSnapshot, CacheError> {
        self.cache.get(tick)
    }

    /// A body's state under the playback cursor. `Ok(None)` means the
    /// tick is retained but the body was destroyed before it.
    pub fn body_state(&self, id: BodyId) -> Result<Option<BodyView<'_>>, CacheError> {
        Ok(self.snapshot()?.find(id))
    }

    /// A body's state at an arbitrary retained tick.
    pub fn body_state_at_tick(
        &self,
        id: BodyId,
        tick: TickId,
    ) -> Result<Option<BodyView<'_>>, CacheError> {
        Ok(self.snapshot_at(tick)?.find(id))
    }

    /// The cache, for direct range inspection.
    pub fn cache(&self) -> &TickCache {
        &self.cache
    }

    /// The failure that stopped the current run, if any.
    pub fn last_failure(&self) -> Option<&StepError> {
        self.last_failure.as_ref()
    }

    /// Whether an execution context exists and can make progress.
    pub fn is_running(&self) -> bool {
        self.integrator.as_ref().is_some_and(|i| i.is_alive())
    }

    /// Tear down the execution context, keeping the cached timeline
    /// readable. Returns `None` when no context was ever created.
    pub fn shutdown(&mut self, grace: Duration) -> Option<ShutdownReport> {
        self.integrator.as_mut().map(|i| i.shutdown(grace))
    }

    fn integrator_mut(&mut self) -> Result<&mut Integrator, SubmitError> {
        self.integrator.as_mut().ok_or(SubmitError::Terminated)
    }
}
