//! Execution context hosting.
//!
//! A run's [`StepEngine`](orrery_sim::StepEngine) lives inside an
//! isolate: either a dedicated thread with channels at the boundary, or
//! an inline fallback that executes ticks on the calling thread when
//! threads are unavailable. Both present the same command/event surface
//! so the integrator does not care which one it got.

use std::collections::VecDeque;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};

use orrery_core::RunGeneration;
use orrery_sim::StepEngine;

use crate::config::{SpawnError, SubmitError};
use crate::tick_thread::{WorkerCommand, WorkerEvent, WorkerState};

/// Capacity of the command and event channels. Commands are rare so the
/// bound only matters for events, where it is the backpressure point: a
/// context that outruns the consumer parks instead of growing a queue.
const CHANNEL_CAPACITY: usize = 256;

/// How an execution context is hosted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ExecStrategy {
    /// Prefer a dedicated thread, fall back to inline execution if the
    /// host refuses to spawn one.
    #[default]
    Auto,
    /// Require a dedicated thread; spawning fails if the host refuses.
    Thread,
    /// Execute ticks on the calling thread, one per drain.
    Inline,
}

/// Common surface over the two context hosts.
pub(crate) trait Isolate: Send {
    /// Deliver a command to the context.
    fn send(&mut self, command: WorkerCommand) -> Result<(), SubmitError>;

    /// Collect all events the context has produced since the last call.
    fn drain(&mut self) -> Vec<WorkerEvent>;

    /// Whether the context can still make progress.
    fn is_alive(&self) -> bool;

    /// Tear the context down, waiting up to `grace` for a clean exit.
    /// Returns `true` if the context ended within the grace period.
    fn terminate(&mut self, grace: Duration) -> bool;
}

/// Bring up a context for `engine` under the given strategy.
pub(crate) fn spawn(
    strategy: ExecStrategy,
    engine: StepEngine,
    generation: RunGeneration,
    tick_rate_hz: Option<f64>,
) -> Result<Box<dyn Isolate>, SpawnError> {
    match strategy {
        ExecStrategy::Thread => match ThreadIsolate::spawn(engine, generation, tick_rate_hz) {
            Ok(isolate) => Ok(Box::new(isolate)),
            Err((e, _)) => Err(e),
        },
        ExecStrategy::Inline => Ok(Box::new(InlineIsolate::new(engine, generation))),
        ExecStrategy::Auto => match ThreadIsolate::spawn(engine, generation, tick_rate_hz) {
            Ok(isolate) => Ok(Box::new(isolate)),
            // The engine was moved into the failed spawn attempt and
            // comes back out of the error, so the fallback reuses it.
            Err((_, engine)) => Ok(Box::new(InlineIsolate::new(engine, generation))),
        },
    }
}

/// A context hosted on its own named thread.
struct ThreadIsolate {
    command_tx: Sender<WorkerCommand>,
    event_rx: Receiver<WorkerEvent>,
    handle: Option<JoinHandle<Option<StepEngine>>>,
}

impl ThreadIsolate {
    /// The thread is spawned before the engine moves, so on spawn
    /// failure the engine comes back and `Auto` can fall back to inline
    /// execution without losing the run state.
    fn spawn(
        engine: StepEngine,
        generation: RunGeneration,
        tick_rate_hz: Option<f64>,
    ) -> Result<Self, (SpawnError, StepEngine)> {
        let (command_tx, command_rx) = bounded(CHANNEL_CAPACITY);
        let (event_tx, event_rx) = bounded(CHANNEL_CAPACITY);
        let (handoff_tx, handoff_rx) = bounded::<WorkerState>(1);

        let builder = std::thread::Builder::new().name("orrery-tick".into());
        let handle = match builder.spawn(move || handoff_rx.recv().ok().map(WorkerState::run)) {
            Ok(handle) => handle,
            Err(e) => return Err((SpawnError::Thread(e), engine)),
        };

        let state = WorkerState::new(engine, generation, command_rx, event_tx, tick_rate_hz);
        // The thread is alive and blocked on the handoff; the send can
        // only fail if it panicked, in which case run() never starts.
        let _ = handoff_tx.send(state);

        Ok(Self {
            command_tx,
            event_rx,
            handle: Some(handle),
        })
    }
}

impl Isolate for ThreadIsolate {
    fn send(&mut self, command: WorkerCommand) -> Result<(), SubmitError> {
        match self.command_tx.try_send(command) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => Err(SubmitError::Backlogged),
            Err(TrySendError::Disconnected(_)) => Err(SubmitError::Terminated),
        }
    }

    fn drain(&mut self) -> Vec<WorkerEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.event_rx.try_recv() {
            events.push(event);
        }
        events
    }

    fn is_alive(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    fn terminate(&mut self, grace: Duration) -> bool {
        let Some(handle) = self.handle.take() else {
            return true;
        };
        let _ = self.command_tx.try_send(WorkerCommand::Terminate);

        let deadline = Instant::now() + grace;
        while !handle.is_finished() {
            // The context may be parked on a full event channel; keep
            // draining so the terminate command gets seen.
            while self.event_rx.try_recv().is_ok() {}
            if Instant::now() >= deadline {
                // Detach. The thread exits on its own once it observes
                // the disconnected channels.
                return false;
            }
            std::thread::sleep(Duration::from_millis(1));
        }
        handle.join().is_ok()
    }
}

impl Drop for ThreadIsolate {
    fn drop(&mut self) {
        self.terminate(Duration::from_millis(250));
    }
}

/// A context executed on the calling thread.
///
/// Runs exactly one tick per [`drain`](Isolate::drain) while started,
/// which keeps progress deterministic for tests and for hosts without
/// threads.
struct InlineIsolate {
    engine: StepEngine,
    generation: RunGeneration,
    pending: VecDeque<WorkerEvent>,
    running: bool,
    alive: bool,
}

impl InlineIsolate {
    fn new(mut engine: StepEngine, generation: RunGeneration) -> Self {
        let initial = WorkerEvent::Tick {
            snapshot: engine.snapshot_now(generation),
            metrics: Default::default(),
        };
        let mut pending = VecDeque::new();
        pending.push_back(initial);
        Self {
            engine,
            generation,
            pending,
            running: false,
            alive: true,
        }
    }
}

impl Isolate for InlineIsolate {
    fn send(&mut self, command: WorkerCommand) -> Result<(), SubmitError> {
        if !self.alive {
            return Err(SubmitError::Terminated);
        }
        match command {
            WorkerCommand::Start => self.running = true,
            WorkerCommand::Stop => self.running = false,
            WorkerCommand::Terminate => {
                self.running = false;
                self.alive = false;
            }
        }
        Ok(())
    }

    fn drain(&mut self) -> Vec<WorkerEvent> {
        if self.alive && self.running {
            match self.engine.execute_tick(self.generation) {
                Ok(snapshot) => {
                    let metrics = *self.engine.metrics();
                    self.pending.push_back(WorkerEvent::Tick { snapshot, metrics });
                }
                Err(error) => {
                    self.pending.push_back(WorkerEvent::Failed {
                        generation: self.generation,
                        error,
                    });
                    self.running = false;
                }
            }
        }
        self.pending.drain(..).collect()
    }

    fn is_alive(&self) -> bool {
        self.alive
    }

    fn terminate(&mut self, _grace: Duration) -> bool {
        self.running = false;
        self.alive = false;
        true
    }
}

// The integrator moves isolates across threads during shutdown.
const _: fn() = || {
    fn assert_send<T: Send>() {}
    assert_send::<ThreadIsolate>();
    assert_send::<InlineIsolate>();
};

#[cfg(test)]
mod tests {
    use super::*;
    use orrery_core::{BodySpec, PhysicsConfig, TickId, Vec2};

    fn engine() -> StepEngine {
        let specs = [
            BodySpec::new(100.0, Vec2::new(0.0, 0.0), Vec2::ZERO),
            BodySpec::new(100.0, Vec2::new(1000.0, 0.0), Vec2::ZERO),
        ];
        StepEngine::new(PhysicsConfig::default(), &specs).unwrap()
    }

    #[test]
    fn inline_emits_initial_snapshot_without_start() {
        let mut isolate = InlineIsolate::new(engine(), RunGeneration(0));
        let events = isolate.drain();
        assert_eq!(events.len(), 1);
        assert!(matches!(
            &events[0],
            WorkerEvent::Tick { snapshot, .. } if snapshot.tick == TickId(0)
        ));
        // Not started, so no further ticks appear.
        assert!(isolate.drain().is_empty());
    }

    #[test]
    fn inline_ticks_once_per_drain_while_started() {
        let mut isolate = InlineIsolate::new(engine(), RunGeneration(0));
        isolate.send(WorkerCommand::Start).unwrap();
        let events = isolate.drain();
        assert_eq!(events.len(), 2, "initial snapshot plus one tick");
        assert_eq!(isolate.drain().len(), 1);
        isolate.send(WorkerCommand::Stop).unwrap();
        assert!(isolate.drain().is_empty());
    }

    #[test]
    fn inline_rejects_commands_after_terminate() {
        let mut isolate = InlineIsolate::new(engine(), RunGeneration(0));
        assert!(isolate.terminate(Duration::ZERO));
        assert!(!isolate.is_alive());
        assert!(matches!(
            isolate.send(WorkerCommand::Start),
            Err(SubmitError::Terminated)
        ));
    }

    #[test]
    fn thread_isolate_round_trip() {
        let mut isolate =
            ThreadIsolate::spawn(engine(), RunGeneration(3), None).unwrap_or_else(|_| {
                panic!("thread spawn failed");
            });
        assert!(isolate.is_alive());
        isolate.send(WorkerCommand::Start).unwrap();

        let deadline = Instant::now() + Duration::from_secs(5);
        let mut ticks = 0;
        while ticks < 3 && Instant::now() < deadline {
            ticks += isolate
                .drain()
                .iter()
                .filter(|e| matches!(e, WorkerEvent::Tick { .. }))
                .count();
        }
        assert!(ticks >= 3, "context should have ticked");
        assert!(isolate.terminate(Duration::from_secs(5)));
    }
}
