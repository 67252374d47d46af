//! The integrator: controlling-side handle for one execution context.
//!
//! The integrator owns the context for the current run generation. It
//! decodes envelopes before anything crosses the boundary, spawns a
//! fresh context (and bumps the generation) whenever the body set is
//! replaced, and filters the event stream so ticks from a superseded
//! generation never reach the caller.

use std::time::{Duration, Instant};

use orrery_core::{BodySpec, RunGeneration, StepError};
use orrery_sim::{StepEngine, StepMetrics, TickSnapshot};

use crate::config::{RunConfig, SpawnError, SubmitError};
use crate::envelope::{Control, Envelope};
use crate::isolate::{self, Isolate};
use crate::tick_thread::{WorkerCommand, WorkerEvent};

/// Grace period granted to a superseded context before it is detached.
const REPLACE_GRACE: Duration = Duration::from_secs(1);

/// An event surfaced by [`Integrator::poll`], always from the current
/// run generation.
#[derive(Clone, Debug)]
pub enum IntegratorEvent {
    /// A committed tick.
    Tick {
        /// The committed snapshot.
        snapshot: TickSnapshot,
        /// Engine metrics for the tick that produced it. Zeroed for
        /// the initial tick-0 snapshot, which no tick produced.
        metrics: StepMetrics,
    },
    /// The run failed; the context has stopped ticking.
    Failed(StepError),
}

/// Timing and outcome of a shutdown sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ShutdownReport {
    /// Total time spent in the shutdown sequence.
    pub total_ms: u64,
    /// Events discarded from the stream during teardown.
    pub events_discarded: usize,
    /// Whether the context ended within the grace period. `false`
    /// means it was detached and will exit on its own.
    pub joined: bool,
}

/// Controlling-side handle for an isolated run.
pub struct Integrator {
    config: RunConfig,
    generation: RunGeneration,
    context: Option<Box<dyn Isolate>>,
    report: Option<ShutdownReport>,
}

impl Integrator {
    /// Validate everything and bring up the first execution context.
    ///
    /// The context immediately publishes the starting state as tick 0;
    /// it does not advance until [`start`](Self::start).
    pub fn spawn(config: RunConfig, specs: &[BodySpec]) -> Result<Self, SpawnError> {
        config.validate()?;
        let engine = StepEngine::new(config.physics, specs)?;
        let generation = RunGeneration(0);
        let context = isolate::spawn(config.strategy, engine, generation, config.tick_rate_hz)?;

        Ok(Self {
            config,
            generation,
            context: Some(context),
            report: None,
        })
    }

    /// The current run generation.
    pub fn generation(&self) -> RunGeneration {
        self.generation
    }

    /// Whether a context exists and can still make progress.
    pub fn is_alive(&self) -> bool {
        self.context.as_ref().is_some_and(|c| c.is_alive())
    }

    /// Submit an envelope. Decoding failures are synchronous; nothing
    /// malformed ever reaches a context.
    pub fn submit(&mut self, envelope: Envelope) -> Result<(), SubmitError> {
        match envelope.decode()? {
            Control::Start => self.start(),
            Control::Stop => self.stop(),
            Control::Terminate => {
                self.shutdown(REPLACE_GRACE);
                Ok(())
            }
            Control::SetBodies(specs) => {
                self.replace_bodies(&specs).map_err(SubmitError::Respawn)
            }
        }
    }

    /// Begin (or resume) ticking.
    pub fn start(&mut self) -> Result<(), SubmitError> {
        self.send(WorkerCommand::Start)
    }

    /// Pause ticking. State is retained and [`start`](Self::start)
    /// resumes from the same tick.
    pub fn stop(&mut self) -> Result<(), SubmitError> {
        self.send(WorkerCommand::Stop)
    }

    /// Replace the body set: tear down the current context, bump the
    /// run generation, and spawn a fresh context for the new bodies.
    ///
    /// The new specs are validated before the old run is touched, so an
    /// invalid batch leaves the current run intact.
    pub fn replace_bodies(&mut self, specs: &[BodySpec]) -> Result<(), SpawnError> {
        let engine = StepEngine::new(self.config.physics, specs)?;

        if let Some(mut old) = self.context.take() {
            old.terminate(REPLACE_GRACE);
        }
        self.generation = self.generation.next();
        self.context = Some(isolate::spawn(
            self.config.strategy,
            engine,
            self.generation,
            self.config.tick_rate_hz,
        )?);
        self.report = None;
        Ok(())
    }

    /// Collect pending events from the context.
    ///
    /// Events tagged with a superseded generation are discarded here:
    /// after a body replacement, stragglers from the old context must
    /// not leak into the new timeline.
    pub fn poll(&mut self) -> Vec<IntegratorEvent> {
        let generation = self.generation;
        let Some(context) = self.context.as_mut() else {
            return Vec::new();
        };

        context
            .drain()
            .into_iter()
            .filter_map(|event| match event {
                WorkerEvent::Tick { snapshot, metrics } if snapshot.generation == generation => {
                    Some(IntegratorEvent::Tick { snapshot, metrics })
                }
                WorkerEvent::Failed { generation: g, error } if g == generation => {
                    Some(IntegratorEvent::Failed(error))
                }
                _ => None,
            })
            .collect()
    }

    /// Tear down the context. Idempotent: repeated calls return the
    /// report of the first.
    pub fn shutdown(&mut self, grace: Duration) -> ShutdownReport {
        if let Some(report) = self.report {
            return report;
        }

        let started = Instant::now();
        let mut events_discarded = 0;
        let mut joined = true;
        if let Some(mut context) = self.context.take() {
            events_discarded = context.drain().len();
            joined = context.terminate(grace);
        }

        let report = ShutdownReport {
            total_ms: started.elapsed().as_millis() as u64,
            events_discarded,
            joined,
        };
        self.report = Some(report);
        report
    }

    fn send(&mut self, command: WorkerCommand) -> Result<(), SubmitError> {
        match self.context.as_mut() {
            Some(context) => context.send(command),
            None => Err(SubmitError::Terminated),
        }
    }
}

impl Drop for Integrator {
    fn drop(&mut self) {
        self.shutdown(Duration::from_millis(250));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::isolate::ExecStrategy;
    use orrery_core::{TickId, Vec2};

    fn inline_config() -> RunConfig {
        RunConfig {
            strategy: ExecStrategy::Inline,
            tick_rate_hz: None,
            ..Default::default()
        }
    }

    fn pair() -> Vec<BodySpec> {
        vec![
            BodySpec::new(100.0, Vec2::new(0.0, 0.0), Vec2::ZERO),
            BodySpec::new(100.0, Vec2::new(1000.0, 0.0), Vec2::ZERO),
        ]
    }

    #[test]
    fn spawn_publishes_tick_zero() {
        let mut integrator = Integrator::spawn(inline_config(), &pair()).unwrap();
        let events = integrator.poll();
        assert_eq!(events.len(), 1);
        assert!(matches!(
            &events[0],
            IntegratorEvent::Tick { snapshot, .. }
                if snapshot.tick == TickId(0) && snapshot.generation == RunGeneration(0)
        ));
    }

    #[test]
    fn spawn_rejects_invalid_bodies() {
        let specs = [BodySpec::new(1.0, Vec2::ZERO, Vec2::ZERO)];
        assert!(matches!(
            Integrator::spawn(inline_config(), &specs),
            Err(SpawnError::Config(_))
        ));
    }

    #[test]
    fn ticks_flow_after_start() {
        let mut integrator = Integrator::spawn(inline_config(), &pair()).unwrap();
        integrator.submit(Envelope::start()).unwrap();
        let mut ticks = 0;
        for _ in 0..5 {
            ticks += integrator.poll().len();
        }
        assert!(ticks >= 5, "initial snapshot plus one tick per poll");

        integrator.submit(Envelope::stop()).unwrap();
        integrator.poll();
        assert!(integrator.poll().is_empty());
    }

    #[test]
    fn malformed_envelope_fails_synchronously() {
        let mut integrator = Integrator::spawn(inline_config(), &pair()).unwrap();
        let envelope = Envelope {
            name: "warp".into(),
            payload: crate::envelope::Payload::Empty,
        };
        assert!(matches!(
            integrator.submit(envelope),
            Err(SubmitError::Protocol(_))
        ));
    }

    #[test]
    fn replace_bodies_bumps_generation_and_restarts_timeline() {
        let mut integrator = Integrator::spawn(inline_config(), &pair()).unwrap();
        integrator.start().unwrap();
        integrator.poll();
        assert_eq!(integrator.generation(), RunGeneration(0));

        integrator.replace_bodies(&pair()).unwrap();
        assert_eq!(integrator.generation(), RunGeneration(1));

        // The fresh context is stopped and re-publishes tick 0 under
        // the new generation.
        let events = integrator.poll();
        assert_eq!(events.len(), 1);
        assert!(matches!(
            &events[0],
            IntegratorEvent::Tick { snapshot, .. }
                if snapshot.tick == TickId(0) && snapshot.generation == RunGeneration(1)
        ));
    }

    #[test]
    fn invalid_replacement_leaves_run_intact() {
        let mut integrator = Integrator::spawn(inline_config(), &pair()).unwrap();
        integrator.start().unwrap();
        integrator.poll();

        let bad = [BodySpec::new(1.0, Vec2::ZERO, Vec2::ZERO)];
        assert!(integrator.replace_bodies(&bad).is_err());
        assert_eq!(integrator.generation(), RunGeneration(0));
        assert!(!integrator.poll().is_empty(), "old run still ticking");
    }

    #[test]
    fn stale_generation_events_are_discarded() {
        // Drive a threaded context, replace the bodies, and confirm no
        // generation-0 event survives the swap.
        let config = RunConfig {
            strategy: ExecStrategy::Thread,
            tick_rate_hz: None,
            ..Default::default()
        };
        let mut integrator = Integrator::spawn(config, &pair()).unwrap();
        integrator.start().unwrap();
        std::thread::sleep(Duration::from_millis(20));

        integrator.replace_bodies(&pair()).unwrap();
        let deadline = Instant::now() + Duration::from_secs(5);
        let mut saw_new = false;
        while Instant::now() < deadline && !saw_new {
            for event in integrator.poll() {
                match event {
                    IntegratorEvent::Tick { snapshot, .. } => {
                        assert_eq!(snapshot.generation, RunGeneration(1));
                        saw_new = true;
                    }
                    IntegratorEvent::Failed(e) => panic!("unexpected failure: {e}"),
                }
            }
        }
        assert!(saw_new);
    }

    #[test]
    fn shutdown_is_idempotent() {
        let mut integrator = Integrator::spawn(inline_config(), &pair()).unwrap();
        let first = integrator.shutdown(Duration::from_secs(1));
        assert!(first.joined);
        let second = integrator.shutdown(Duration::from_secs(1));
        assert_eq!(first, second);
        assert!(!integrator.is_alive());
        assert!(matches!(integrator.start(), Err(SubmitError::Terminated)));
    }

    #[test]
    fn terminate_envelope_shuts_down() {
        let mut integrator = Integrator::spawn(inline_config(), &pair()).unwrap();
        integrator.submit(Envelope::terminate()).unwrap();
        assert!(!integrator.is_alive());
    }
}
